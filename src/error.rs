//! Unified error types for flint.
//!
//! A child that runs and fails is not an error: its status comes back as a
//! plain `i32`. `FlintError` only covers the cases where no status exists.

/// Errors surfaced by commands, the rebuild controller and config loading.
#[derive(thiserror::Error, Debug)]
pub enum FlintError {
    #[error("refusing to run an empty command")]
    EmptyCommand,
    #[error("could not spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for FlintError {
    fn from(err: figment::Error) -> Self {
        FlintError::Config(Box::new(err))
    }
}

/// Result type alias used across the crate.
pub type FlintResult<T> = Result<T, FlintError>;
