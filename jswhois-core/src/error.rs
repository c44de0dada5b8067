use thiserror::Error;

#[derive(Error, Debug)]
pub enum JswhoisError {
    #[error("Unable to connect to {server}: {reason}")]
    Connection { server: String, reason: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Response from {server} exceeds {limit} bytes")]
    ResponseTooLarge { server: String, limit: usize },

    #[error("{query} does not resolve; use '-f' to proceed anyway ({reason})")]
    InvalidQuery { query: String, reason: String },

    #[error("Port must be a number: {0}")]
    InvalidPort(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot merge {incoming} into {existing}")]
    MergeConflict {
        existing: &'static str,
        incoming: &'static str,
    },
}

impl JswhoisError {
    /// Errors that abort the whole run rather than a single chain step.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            JswhoisError::InvalidQuery { .. } | JswhoisError::InvalidPort(_)
        )
    }

    /// Transport failures: the step yields an empty document and the walk ends.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            JswhoisError::Connection { .. }
                | JswhoisError::Timeout(_)
                | JswhoisError::ResponseTooLarge { .. }
                | JswhoisError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, JswhoisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let invalid = JswhoisError::InvalidQuery {
            query: "nope".to_string(),
            reason: "no such host".to_string(),
        };
        assert!(invalid.is_fatal());
        assert!(!invalid.is_transport());
        assert!(JswhoisError::InvalidPort("abc".to_string()).is_fatal());
    }

    #[test]
    fn test_transport_classification() {
        let conn = JswhoisError::Connection {
            server: "whois.example".to_string(),
            reason: "refused".to_string(),
        };
        assert!(conn.is_transport());
        assert!(!conn.is_fatal());
        assert!(JswhoisError::Timeout("read".to_string()).is_transport());
    }

    #[test]
    fn test_invalid_query_message_mentions_force() {
        let err = JswhoisError::InvalidQuery {
            query: "nope.invalid".to_string(),
            reason: "NXDOMAIN".to_string(),
        };
        assert!(err.to_string().starts_with("nope.invalid does not resolve"));
    }
}
