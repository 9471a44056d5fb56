mod billing;
mod common;
mod lending;
mod settlement;
mod tenant;

pub use self::{billing::*, common::*, lending::*, settlement::*, tenant::*};
