//! Error types for checkpoint generation and parallel sampling.

use std::fmt;
use std::process::ExitCode;

/// Errors raised by the generator, the checkpoint codec and the sampler.
#[derive(Debug, thiserror::Error)]
pub enum MontePiError {
    /// Bad counts, unknown algorithm names or missing options.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Open/read/write failure, tagged with what was being accessed.
    #[error("IO error ({context}): {source}")]
    Io {
        /// What was being accessed, e.g. the file path.
        context: IoContext,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A checkpoint record is malformed, truncated or missing.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal synchronization invariant broken. Never recovered from.
    #[error("Concurrency invariant violated: {0}")]
    ConcurrencyInvariant(String),
}

/// Which resource an I/O error refers to. Drives the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoContext {
    /// Output sink (checkpoint file or report file).
    Output(String),
    /// Checkpoint source being opened.
    CheckpointSource(String),
    /// Checkpoint source being read.
    CheckpointRead,
    /// Worker thread creation.
    Spawn,
}

impl fmt::Display for IoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoContext::Output(path) => write!(f, "output {path}"),
            IoContext::CheckpointSource(path) => write!(f, "checkpoint source {path}"),
            IoContext::CheckpointRead => f.write_str("reading checkpoint"),
            IoContext::Spawn => f.write_str("spawning worker thread"),
        }
    }
}

impl MontePiError {
    /// Shorthand for an I/O error on an output sink.
    pub fn output(path: impl Into<String>, source: std::io::Error) -> Self {
        MontePiError::Io {
            context: IoContext::Output(path.into()),
            source,
        }
    }

    /// Process exit status for this failure class.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            MontePiError::Configuration(_) => ExitStatus::InvalidArguments,
            MontePiError::Io { context, .. } => match context {
                IoContext::Output(_) => ExitStatus::OutputFailure,
                IoContext::CheckpointSource(_) => ExitStatus::CheckpointOpenFailure,
                IoContext::CheckpointRead => ExitStatus::CheckpointReadFailure,
                IoContext::Spawn => ExitStatus::InternalFailure,
            },
            MontePiError::Serialization(_) => ExitStatus::CheckpointReadFailure,
            MontePiError::ConcurrencyInvariant(_) => ExitStatus::InternalFailure,
        }
    }
}

/// Documented process exit codes shared by both binaries.
///
/// | code | meaning |
/// |------|---------|
/// | 0 | success |
/// | 1 | argument validation failure |
/// | 2 | output file open/write failure |
/// | 3 | checkpoint source open failure |
/// | 4 | checkpoint read/deserialization failure |
/// | 5 | internal failure (thread spawn, concurrency invariant) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    InvalidArguments = 1,
    OutputFailure = 2,
    CheckpointOpenFailure = 3,
    CheckpointReadFailure = 4,
    InternalFailure = 5,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Result type for Monte Carlo operations.
pub type Result<T> = std::result::Result<T, MontePiError>;
