// opchain/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpchainError {
  /// Setup-time failure: missing terminal logic, empty operation name and similar.
  #[error("Configuration error for operation '{operation}': {message}")]
  Configuration { operation: String, message: String },

  /// A continuation was invoked after the terminal logic already ran.
  #[error("Pipeline for operation '{operation}' already completed")]
  ChainCompleted { operation: String },

  /// Returned by `Next::fail` and by any continuation called after an abort.
  /// The compiled operation itself reports the error handed to `fail`.
  #[error("Pipeline for operation '{operation}' was aborted")]
  PipelineAborted { operation: String },

  #[error("No operation table declared for group {group}")]
  Lookup { group: String },

  #[error("Error in user-provided handler or terminal logic. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl OpchainError {
  pub(crate) fn configuration(operation: impl Into<String>, message: impl Into<String>) -> Self {
    OpchainError::Configuration {
      operation: operation.into(),
      message: message.into(),
    }
  }
}

impl From<AnyhowError> for OpchainError {
  fn from(err: AnyhowError) -> Self {
    // An anyhow error that already wraps an OpchainError stays wrapped; it is not Clone.
    OpchainError::HandlerError { source: err }
  }
}

pub type OpchainResult<T, E = OpchainError> = std::result::Result<T, E>;
