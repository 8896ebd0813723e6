//! Error types for attune startup and configuration.
//!
//! Request handling never surfaces these; they only stop the daemon from
//! starting with an unusable configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttuneError {
    #[error("{0} is not set. Export it before starting attuned.")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
