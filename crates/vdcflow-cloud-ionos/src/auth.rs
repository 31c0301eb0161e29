//! Authentication header bundle
//!
//! Every request carries a basic-auth `Authorization` header and the
//! `X-Contract-Number` header. The bundle is cached on disk as
//! `{"headers": {"Authorization": ..., "X-Contract-Number": ...}}`.

use crate::error::{IonosError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const CONTRACT_NUMBER_HEADER: &str = "X-Contract-Number";

/// Headers attached to every API call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHeaders {
    #[serde(rename = "Authorization")]
    pub authorization: String,
    #[serde(rename = "X-Contract-Number")]
    pub contract_number: String,
}

#[derive(Serialize, Deserialize)]
struct AuthHeadersFile {
    headers: AuthHeaders,
}

impl AuthHeaders {
    /// Build the bundle from a username, password and contract number
    ///
    /// Surrounding whitespace is trimmed from each value.
    pub fn from_credentials(username: &str, password: &str, contract_number: &str) -> Result<Self> {
        let (username, password, contract_number) =
            (username.trim(), password.trim(), contract_number.trim());
        if username.is_empty() || password.is_empty() {
            return Err(IonosError::InvalidCredentials(
                "username and password must not be empty".to_string(),
            ));
        }
        if contract_number.is_empty() {
            return Err(IonosError::InvalidCredentials(
                "contract number must not be empty".to_string(),
            ));
        }

        let token = STANDARD.encode(format!("{username}:{password}"));
        Ok(Self {
            authorization: format!("Basic {token}"),
            contract_number: contract_number.to_string(),
        })
    }

    /// Load a cached bundle
    pub fn from_file(path: &Path) -> Result<Self> {
        let unreadable = |message: String| IonosError::AuthHeadersUnreadable {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let file: AuthHeadersFile =
            serde_json::from_str(&content).map_err(|e| unreadable(e.to_string()))?;
        Ok(file.headers)
    }

    /// Cache the bundle on disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = AuthHeadersFile {
            headers: self.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("authorization", &"***")
            .field("contract_number", &self.contract_number)
            .finish()
    }
}
