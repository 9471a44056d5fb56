mod invoice;
mod reconcile;
mod settlement;
mod usage;
mod withdrawal;

pub use self::{invoice::*, reconcile::*, settlement::*, usage::*, withdrawal::*};
