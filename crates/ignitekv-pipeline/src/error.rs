//! Error types for ignitekv-pipeline

use thiserror::Error;

/// Result type alias using ignitekv-pipeline's StageError type
pub type Result<T> = std::result::Result<T, StageError>;

/// A fatal stage failure. Any of these aborts the remaining pipeline.
#[derive(Error, Debug)]
pub enum StageError {
    /// The stage process could not be spawned (e.g. executable not found)
    #[error("Unexpected error happened when running [ {command} ]: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The stage process wrote to its error stream
    #[error("Unexpected error happened with [ {command} ] command\nError details:\n{stderr}")]
    Stderr { command: String, stderr: String },

    /// Reading the stage's output stream failed
    #[error("Failed reading output of [ {command} ]: {source}")]
    OutputRead {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// The command line of the failing stage
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::Stderr { command, .. }
            | Self::OutputRead { command, .. } => command,
        }
    }
}
