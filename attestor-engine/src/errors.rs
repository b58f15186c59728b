//! Error taxonomy for the inference and alignment engines (§7).

use attestor_model::CliExitCode;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("inference input error: {0}")]
    InferenceInput(String),

    #[error(transparent)]
    Model(#[from] attestor_model::ModelError),
}

impl CliExitCode for EngineError {
    fn exit_code(&self) -> i32 {
        match self {
            EngineError::InferenceInput(_) => 3,
            EngineError::Model(inner) => inner.exit_code(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
