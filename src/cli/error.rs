//! CLI-specific error types

use thiserror::Error;

use crate::error::LoadError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Message for the terminal, with a hint where one helps
    pub fn user_message(&self) -> String {
        match self {
            CliError::Load(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
