//! Image password generation

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use serde::{Serialize, Serializer};
use std::fmt;

/// Length of generated image passwords
pub const PASSWORD_LENGTH: usize = 32;

/// A generated image password
///
/// Only serialization into a request payload reveals the value. `Debug` and
/// `Display` are redacted so it cannot reach logs or summaries by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePassword(String);

impl ImagePassword {
    /// 32 characters drawn from `[A-Za-z0-9]` using the OS random source
    pub fn generate() -> Self {
        let password = OsRng
            .sample_iter(&Alphanumeric)
            .take(PASSWORD_LENGTH)
            .map(char::from)
            .collect();
        Self(password)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImagePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ImagePassword(***)")
    }
}

impl fmt::Display for ImagePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for ImagePassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_shape() {
        let password = ImagePassword::generate();
        assert_eq!(password.expose().len(), PASSWORD_LENGTH);
        assert!(password.expose().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_passwords_differ() {
        assert_ne!(ImagePassword::generate(), ImagePassword::generate());
    }

    #[test]
    fn test_redacted_formatting() {
        let password = ImagePassword::generate();
        assert!(!format!("{:?}", password).contains(password.expose()));
        assert!(!password.to_string().contains(password.expose()));
        assert_eq!(
            serde_json::to_value(&password).unwrap(),
            serde_json::Value::String(password.expose().to_string())
        );
    }
}
