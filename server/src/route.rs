mod invoice;
mod settlement;
mod withdrawal;

pub use self::{invoice::*, settlement::*, withdrawal::*};
