//! Reversible obfuscation of stored passwords
//!
//! Passwords are sealed with AES-256-GCM under a key compiled into the
//! binary and written as hex text (`nonce || ciphertext || tag`). Anyone with
//! the binary can recover them: this keeps plaintext out of the document
//! file and nothing more. It is not a security boundary.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};

use crate::error::CredentialError;

/// Embedded obfuscation key
const OBFUSCATION_KEY: &[u8; 32] = b"connbook-credential-obfuscation!";

/// Hex length of the nonce plus the authentication tag.
///
/// Stored values of this length or shorter cannot carry any plaintext and are
/// read back as an empty password.
pub const MIN_ENCRYPTED_LEN: usize = (NONCE_LEN + 16) * 2;

fn cipher_key() -> Result<LessSafeKey, CredentialError> {
    let unbound =
        UnboundKey::new(&AES_256_GCM, OBFUSCATION_KEY).map_err(|_| CredentialError::Encrypt)?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypts a plaintext password into its stored text form.
///
/// The empty string encrypts to the empty string.
///
/// # Errors
///
/// Returns `CredentialError::Encrypt` if the random nonce cannot be generated
/// or sealing fails.
pub fn encrypt(plaintext: &str) -> Result<String, CredentialError> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }

    let key = cipher_key()?;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| CredentialError::Encrypt)?;

    let mut sealed = plaintext.as_bytes().to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut sealed,
    )
    .map_err(|_| CredentialError::Encrypt)?;

    let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&sealed);
    Ok(hex::encode(output))
}

/// Decrypts a stored password back into plaintext.
///
/// The empty string decrypts to the empty string.
///
/// # Errors
///
/// Returns `CredentialError::InvalidEncoding` for malformed text and
/// `CredentialError::Decrypt` if the ciphertext does not authenticate.
pub fn decrypt(text: &str) -> Result<String, CredentialError> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let data = hex::decode(text).map_err(|e| CredentialError::InvalidEncoding(e.to_string()))?;
    if data.len() < NONCE_LEN + AES_256_GCM.tag_len() {
        return Err(CredentialError::InvalidEncoding(
            "ciphertext too short".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| CredentialError::InvalidEncoding("bad nonce".to_string()))?;

    let key = cipher_key()?;
    let mut buffer = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut buffer)
        .map_err(|_| CredentialError::Decrypt)?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|e| CredentialError::InvalidEncoding(e.to_string()))
}

/// A password held in memory together with its cached stored form.
///
/// The cache is filled when the value comes from a document and dropped as
/// soon as the plaintext is replaced, so an unchanged password is written back
/// byte-for-byte.
#[derive(Debug, Clone)]
pub struct Credential {
    plain: SecretString,
    encrypted: Option<String>,
}

impl Default for Credential {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.plain.expose_secret() == other.plain.expose_secret()
    }
}

impl Eq for Credential {}

impl Credential {
    /// Creates a credential from plaintext
    #[must_use]
    pub fn new(plain: impl Into<String>) -> Self {
        Self {
            plain: SecretString::from(plain.into()),
            encrypted: None,
        }
    }

    /// Restores a credential from its stored text.
    ///
    /// Text no longer than [`MIN_ENCRYPTED_LEN`] is treated as an empty
    /// password and written back unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if longer text fails to decrypt.
    pub fn from_stored(text: &str) -> Result<Self, CredentialError> {
        if text.len() <= MIN_ENCRYPTED_LEN {
            return Ok(Self {
                plain: SecretString::from(String::new()),
                encrypted: Some(text.to_string()),
            });
        }
        let plain = decrypt(text)?;
        Ok(Self {
            plain: SecretString::from(plain),
            encrypted: Some(text.to_string()),
        })
    }

    /// Returns the plaintext
    #[must_use]
    pub fn expose(&self) -> &str {
        self.plain.expose_secret()
    }

    /// Returns true if no password is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plain.expose_secret().is_empty()
    }

    /// Replaces the plaintext and drops the cached stored form
    pub fn set(&mut self, plain: impl Into<String>) {
        self.plain = SecretString::from(plain.into());
        self.encrypted = None;
    }

    /// Returns the text to write into a document
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub fn to_stored(&self) -> Result<String, CredentialError> {
        match &self.encrypted {
            Some(cached) => Ok(cached.clone()),
            None => encrypt(self.expose()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let stored = encrypt("s3cr3t!").unwrap();
        assert_ne!(stored, "s3cr3t!");
        assert!(stored.len() > MIN_ENCRYPTED_LEN);
        assert_eq!(decrypt(&stored).unwrap(), "s3cr3t!");
    }

    #[test]
    fn test_empty_passthrough() {
        assert_eq!(encrypt("").unwrap(), "");
        assert_eq!(decrypt("").unwrap(), "");
    }

    #[test]
    fn test_nonce_makes_output_differ() {
        let a = encrypt("password").unwrap();
        let b = encrypt("password").unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt(&a).unwrap(), decrypt(&b).unwrap());
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let mut stored = encrypt("password").unwrap();
        let last = stored.pop().unwrap();
        stored.push(if last == '0' { '1' } else { '0' });
        assert_eq!(decrypt(&stored), Err(CredentialError::Decrypt));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            decrypt("not-hex"),
            Err(CredentialError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_credential_short_text_is_empty() {
        let cred = Credential::from_stored("abcd").unwrap();
        assert!(cred.is_empty());
        assert_eq!(cred.to_stored().unwrap(), "abcd");
    }

    #[test]
    fn test_credential_caches_stored_form() {
        let stored = encrypt("hunter2").unwrap();
        let mut cred = Credential::from_stored(&stored).unwrap();
        assert_eq!(cred.expose(), "hunter2");
        assert_eq!(cred.to_stored().unwrap(), stored);

        cred.set("hunter3");
        let restored = cred.to_stored().unwrap();
        assert_ne!(restored, stored);
        assert_eq!(decrypt(&restored).unwrap(), "hunter3");
    }
}
