//! Secure credential handling using the secrecy crate
//!
//! Sensitive settings (the listener's PKCS#12 password) are held in a
//! [`SecretString`]: zeroized on drop, redacted in `Debug`, and only readable
//! through an explicit `expose_secret()` call.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype satisfying the `secrecy` marker traits
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl SecretValue {
    /// Whether the secret is the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroizing, redacted string secret
pub type SecretString = Secret<SecretValue>;

/// Wraps a `String` as a [`SecretString`]
///
/// ```rust
/// use pharmagate::config::secret_string;
/// use secrecy::ExposeSecret;
///
/// let password = secret_string("changeit".to_string());
/// assert_eq!(password.expose_secret().as_ref(), "changeit");
/// ```
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("identity-password".to_string());
        assert_eq!(secret.expose_secret(), "identity-password");
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-data"));
    }

    #[test]
    fn test_secret_from_toml() {
        #[derive(Deserialize)]
        struct Listener {
            tls_identity_password: SecretString,
        }

        let parsed: Listener = toml::from_str("tls_identity_password = \"p12pass\"").unwrap();
        assert_eq!(parsed.tls_identity_password.expose_secret(), "p12pass");
    }
}
