mod bank;
mod document;
mod notification;

pub use self::{bank::*, document::*, notification::*};
