use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    /// The caller supplied an unusable reference. Never retried.
    #[error("Invalid reference: {0}")]
    InvalidInput(String),

    /// Unexpected internal fault, distinct from an ordinary not-found.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResolverError {
    /// HTTP status a route layer serves this error with.
    pub fn status_code(&self) -> u16 {
        match self {
            ResolverError::InvalidInput(_) => 400,
            ResolverError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ResolverError::InvalidInput("empty".to_string()).status_code(),
            400
        );
        assert_eq!(
            ResolverError::Internal("boom".to_string()).status_code(),
            500
        );
    }
}
