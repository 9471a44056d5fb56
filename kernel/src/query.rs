mod billing;
mod lending;
mod settlement;
mod tenant;

pub use self::{billing::*, lending::*, settlement::*, tenant::*};
