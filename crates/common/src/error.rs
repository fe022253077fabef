/// ragvec error types
#[derive(Debug, thiserror::Error)]
pub enum RagVecError {
    /// Store dimension must be positive
    #[error("Invalid dimension: {0}")]
    InvalidDimension(usize),

    /// Vector length does not match the store dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Bad argument (k, non-finite components, empty text)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// On-disk image is unreadable or inconsistent
    #[error("Corrupt index image: {0}")]
    CorruptImage(String),

    /// Embedding collaborator failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RagVecError {
    /// Create dimension mismatch error
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create corrupt image error
    pub fn corrupt_image<S: Into<String>>(msg: S) -> Self {
        Self::CorruptImage(msg.into())
    }

    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable name of the error kind, reported to HTTP clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidDimension(_) => "InvalidDimension",
            Self::DimensionMismatch { .. } => "DimensionMismatch",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::CorruptImage(_) => "CorruptImage",
            Self::Embedding(_) => "EmbeddingError",
            Self::Config(_) => "ConfigError",
            Self::NotFound(_) => "NotFound",
            Self::Internal(_) => "InternalError",
            Self::Io(_) => "IOError",
            Self::Json(_) => "InvalidJson",
            Self::Other(_) => "InternalError",
        }
    }
}

// HTTP response conversion
impl RagVecError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDimension(_) => 400,
            Self::DimensionMismatch { .. } => 400,
            Self::InvalidArgument(_) => 400,
            Self::Json(_) => 400,
            Self::NotFound(_) => 404,
            Self::Embedding(_) => 502,
            Self::CorruptImage(_) => 500,
            Self::Io(_) => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_4xx() {
        assert_eq!(RagVecError::dimension_mismatch(3, 2).status_code(), 400);
        assert_eq!(RagVecError::invalid_argument("k must be positive").status_code(), 400);
        assert_eq!(RagVecError::InvalidDimension(0).status_code(), 400);
        assert_eq!(RagVecError::not_found("record 9").status_code(), 404);
    }

    #[test]
    fn test_backend_errors_are_5xx() {
        let io = RagVecError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.status_code(), 500);
        assert_eq!(io.kind(), "IOError");
        assert_eq!(RagVecError::corrupt_image("bad magic").status_code(), 500);
        assert_eq!(RagVecError::embedding("model down").status_code(), 502);
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = RagVecError::dimension_mismatch(384, 768);
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 768");
        assert_eq!(err.kind(), "DimensionMismatch");
    }
}
