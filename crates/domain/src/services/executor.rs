//! Attempt executor abstraction.
//!
//! An executor drives one portal check-in for one employee. Recognized page
//! states (including negative ones) are returned as [`AttemptOutcome`]s;
//! only failures that prevent reaching the form are errors.

use thiserror::Error;

use crate::models::{AttemptOutcome, AttemptRequest};

#[derive(Debug, Error)]
pub enum AttemptError {
    /// The portal could not be loaded after all retries.
    #[error("Navigation failed after {attempts} attempts: {message}")]
    Navigation { attempts: u32, message: String },

    /// The login form never appeared.
    #[error("Login form not found at {url}")]
    FormNotFound { url: String },

    /// Browser launch or protocol failure mid-attempt.
    #[error("Browser error: {0}")]
    Browser(String),
}

#[async_trait::async_trait]
pub trait AttemptExecutor: Send + Sync {
    async fn attempt(&self, request: &AttemptRequest) -> Result<AttemptOutcome, AttemptError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AttemptError::Navigation {
            attempts: 3,
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "Navigation failed after 3 attempts: timeout");

        let err = AttemptError::FormNotFound {
            url: "https://portal.example/login".to_string(),
        };
        assert!(err.to_string().contains("portal.example/login"));
    }
}
