//! Cloud reconciliation error types

use thiserror::Error;
use vdcflow_core::FlowError;

/// Errors raised while reconciling desired state against the remote API
///
/// Every variant is terminal for the current invocation. Nothing is retried
/// apart from the polling inside the availability barrier.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: String, name: String },

    #[error("Server '{0}' already exists")]
    AlreadyExists(String),

    #[error(
        "Duplicate firewall rule name '{name}' on nic '{nic}'. Firewall rule names must be unique per NIC"
    )]
    DuplicateName { nic: String, name: String },

    #[error("Timeout: {pending:?} still not AVAILABLE after {attempts} attempts")]
    Timeout { pending: Vec<String>, attempts: u32 },

    #[error("Invalid firewall rule pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Aborted: {0}")]
    Declined(String),

    #[error("{0}")]
    Config(#[from] FlowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Whether the named resource is missing, remotely or in the declared configuration
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Config(FlowError::ServerNotDeclared { .. })
                | Self::Config(FlowError::ComponentNotDeclared { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_covers_declared_config() {
        assert!(CloudError::not_found("server", "web1").is_not_found());
        assert!(
            CloudError::from(FlowError::ServerNotDeclared {
                name: "web1".to_string(),
                available: vec![],
            })
            .is_not_found()
        );
        assert!(!CloudError::AlreadyExists("web1".to_string()).is_not_found());
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = CloudError::DuplicateName {
            nic: "public".to_string(),
            name: "ssh".to_string(),
        };
        assert!(err.to_string().contains("'ssh'"));
        assert!(err.to_string().contains("'public'"));
    }
}
