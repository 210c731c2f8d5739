//! Errors raised by the pure domain logic

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Missing context for code generation: {0}")]
    MissingContext(&'static str),
}
