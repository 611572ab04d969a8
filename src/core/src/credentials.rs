//! Per-plugin broker credentials.
//!
//! A fresh secret is generated on every `run` invocation; credentials are
//! never reused across runs. The salted hash matches RabbitMQ's internal
//! `rabbit_password_hashing_sha256` scheme so the management API can compare
//! stored hashes without a round trip through plaintext.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Secret length in raw bytes; hex-encoded to twice as many characters.
const PASSWORD_BYTES: usize = 20;

/// Salt used by RabbitMQ's SHA-256 password hashing.
const PASSWORD_HASH_SALT: [u8; 4] = [0x90, 0x8d, 0xc6, 0x0a];

/// A generated secret bound to one plugin identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Generate a fresh hex-encoded secret from the OS random source.
pub fn generate_password() -> String {
    let mut bytes = [0u8; PASSWORD_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// RabbitMQ salted password hash: base64(salt || SHA-256(salt || password)).
pub fn rabbitmq_password_hash(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(PASSWORD_HASH_SALT);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    let mut salted = Vec::with_capacity(PASSWORD_HASH_SALT.len() + digest.len());
    salted.extend_from_slice(&PASSWORD_HASH_SALT);
    salted.extend_from_slice(&digest);
    BASE64.encode(salted)
}

impl Credential {
    /// Create a credential with a freshly generated secret.
    pub fn generate(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: generate_password(),
        }
    }

    /// Flat key=value rendering consumed by plugins at startup.
    pub fn render(&self) -> String {
        format!(
            "[credentials]\nusername={}\npassword={}\n",
            self.username, self.password
        )
    }

    /// Write the credentials file under `<root>/private/plugins/<username>/`.
    ///
    /// Returns the path written. Old credential files from prior runs are
    /// left in place; `down` does not collect them either.
    pub fn write_file(&self, root: &Path) -> Result<PathBuf> {
        let dir = root.join("private").join("plugins").join(&self.username);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("plugin.credentials");
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn password_is_forty_hex_chars() {
        let password = generate_password();
        assert_eq!(password.len(), 40);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn successive_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
    }

    #[test]
    fn password_hash_matches_reference_vector() {
        assert_eq!(
            rabbitmq_password_hash("test12"),
            "kI3GCqW5JLMJa4iX1lo7X4D6XbYqlLgxIs30+P6tENUV2POR"
        );
    }

    #[test]
    fn render_is_flat_key_value() {
        let credential = Credential {
            username: "plugin-37-0.1.0-0".to_string(),
            password: "abc123".to_string(),
        };
        assert_eq!(
            credential.render(),
            "[credentials]\nusername=plugin-37-0.1.0-0\npassword=abc123\n"
        );
    }

    #[test]
    fn write_file_creates_private_tree() {
        let root = tempdir().unwrap();
        let credential = Credential {
            username: "plugin-37-0.1.0-0".to_string(),
            password: "abc123".to_string(),
        };
        let path = credential.write_file(root.path()).unwrap();
        assert_eq!(
            path,
            root.path()
                .join("private/plugins/plugin-37-0.1.0-0/plugin.credentials")
        );
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("username=plugin-37-0.1.0-0"));
        assert!(written.contains("password=abc123"));
    }
}
