mod aggregate;
mod invoice;
mod reconcile;
mod settlement;
mod withdrawal;

pub use self::{aggregate::*, invoice::*, reconcile::*, settlement::*, withdrawal::*};
