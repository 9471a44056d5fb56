use std::fmt::Display;

use error_stack::Context;

#[derive(Debug)]
pub enum KernelError {
    Validation(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    Dependency(&'static str),
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Validation(message) => write!(f, "{message}"),
            KernelError::NotFound(target) => write!(f, "{target} not found"),
            KernelError::Conflict(message) => write!(f, "{message}"),
            KernelError::Dependency(target) => write!(f, "{target} is unavailable"),
            KernelError::Timeout => write!(f, "external service timed out"),
            KernelError::Internal => write!(f, "internal kernel error"),
        }
    }
}

impl Context for KernelError {}
