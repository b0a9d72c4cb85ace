use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Page returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// HTTP status a serving layer should map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidUrl(_) => 400,
            EngineError::Timeout(_) | EngineError::Network(_) | EngineError::HttpStatus(_) => 422,
            EngineError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
