use rapidboard_protocol::ProtocolError;

/// Errors that can occur while talking to a leaderboard backend.
///
/// These never cross the [`LeaderboardService`](crate::LeaderboardService)
/// boundary as errors: backends render them into a failed response, and
/// the `Display` text becomes that response's error message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request could not be sent or its body not read.
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status. `message` is the
    /// backend's own error text.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text from the response body.
        message: String,
    },

    /// The response body didn't decode.
    #[error(transparent)]
    Decode(#[from] ProtocolError),

    /// The call needs a session token and no guest session is active.
    #[error("no active session")]
    NoSession,

    /// The service was configured with unusable settings.
    #[error("invalid service configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_displays_backend_message_verbatim() {
        let err = ServiceError::Status {
            status: 429,
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_no_session_display() {
        assert_eq!(ServiceError::NoSession.to_string(), "no active session");
    }
}
