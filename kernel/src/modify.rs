mod billing;
mod settlement;

pub use self::{billing::*, settlement::*};
