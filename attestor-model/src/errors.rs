//! Error taxonomy for the contract model (§7).

/// Stable exit code for error kinds that escalate all the way to a
/// process boundary, mirroring the teacher's `DriftErrorCode` pattern
/// (`error_code() -> &'static str`) but returning the numeric exit codes
/// §6 assigns downstream tooling.
pub trait CliExitCode {
    fn exit_code(&self) -> i32;
}

/// Errors that can occur while building or validating a `Contract` (§4.1, §7).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid contract: endpoint '{path}': {reason}")]
    InvalidContract { path: String, reason: String },

    #[error("trace shape error: {0}")]
    TraceShape(String),
}

impl CliExitCode for ModelError {
    fn exit_code(&self) -> i32 {
        match self {
            ModelError::InvalidContract { .. } => 2,
            ModelError::TraceShape(_) => 3,
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
