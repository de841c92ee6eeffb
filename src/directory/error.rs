use thiserror::Error;

/// Errors raised by the project directory backend.
///
/// These pass through the catalog service unchanged.
#[derive(Debug, Error)]
pub enum DirectoryError {
  /// The request never produced an HTTP response
  #[error("directory request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("project {id} not found")]
  NotFound { id: String },

  /// Any other non-success status
  #[error("directory returned {status}: {body}")]
  Backend {
    status: reqwest::StatusCode,
    body: String,
  },

  #[error("failed to decode directory response: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
