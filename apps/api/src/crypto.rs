//! Encryption at rest for user-supplied API keys.
//!
//! Keys are wrapped with Fernet (AES-128-CBC + HMAC-SHA256, authenticated)
//! using the server-wide `ENCRYPTION_KEY`. Plaintext keys never touch the
//! database or the logs.

use anyhow::{anyhow, Result};
use fernet::Fernet;

/// Wraps and unwraps user API keys for storage.
pub struct ApiKeyCipher {
    fernet: Fernet,
}

impl ApiKeyCipher {
    /// Builds a cipher from a base64 Fernet key (as produced by
    /// `Fernet::generate_key()`). Fails on malformed keys.
    pub fn new(key: &str) -> Result<Self> {
        let fernet = Fernet::new(key)
            .ok_or_else(|| anyhow!("ENCRYPTION_KEY is not a valid base64 Fernet key"))?;
        Ok(Self { fernet })
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        self.fernet.encrypt(plaintext.as_bytes())
    }

    /// Decrypts a stored token. Fails if the token was tampered with or was
    /// encrypted under a different key.
    pub fn decrypt(&self, token: &str) -> Result<String> {
        let bytes = self
            .fernet
            .decrypt(token)
            .map_err(|_| anyhow!("Stored API key failed decryption"))?;
        String::from_utf8(bytes).map_err(|_| anyhow!("Decrypted API key is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> ApiKeyCipher {
        ApiKeyCipher::new(&Fernet::generate_key()).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = test_cipher();
        let token = cipher.encrypt("sk-test-1234567890");
        assert_ne!(token, "sk-test-1234567890");
        assert_eq!(cipher.decrypt(&token).unwrap(), "sk-test-1234567890");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let cipher = test_cipher();
        let mut token = cipher.encrypt("sk-test-1234567890");
        token.push('A');
        assert!(cipher.decrypt(&token).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = test_cipher().encrypt("sk-test-1234567890");
        assert!(test_cipher().decrypt(&token).is_err());
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(ApiKeyCipher::new("not-a-fernet-key").is_err());
    }
}
