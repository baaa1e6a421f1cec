use thiserror::Error;

/// Errors surfaced by the rep tracker library.
///
/// Per-frame conditions (no body detected, low-visibility joints, degenerate
/// geometry) are not errors; frames in that state are skipped.
#[derive(Debug, Error)]
pub enum RepError {
    #[error("no exercise profile registered for '{0}'")]
    ProfileNotFound(String),

    #[error("landmark stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("invalid exercise profile '{key}': {reason}")]
    InvalidProfile { key: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session controller is no longer running")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, RepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_not_found_message() {
        let err = RepError::ProfileNotFound("not-a-real-exercise".to_string());
        assert_eq!(
            err.to_string(),
            "no exercise profile registered for 'not-a-real-exercise'"
        );
    }

    #[test]
    fn test_invalid_profile_message() {
        let err = RepError::InvalidProfile {
            key: "plank".to_string(),
            reason: "empty label".to_string(),
        };
        assert!(err.to_string().contains("plank"));
        assert!(err.to_string().contains("empty label"));
    }
}
