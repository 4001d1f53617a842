//! Credential encryption/decryption for storing secrets in the settings TOML.
//!
//! Encrypted format: `enc:<nonce_hex>:<ciphertext_base64>`
//! If a value doesn't start with `enc:`, it's returned as-is (plaintext passthrough).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

use crate::error::{CoreError, Result};

const ENC_PREFIX: &str = "enc:";
const KDF_SALT: &[u8] = b"sentinela-settings-kdf-v1";

/// Derive the 32-byte settings key from a passphrase (Argon2id).
pub fn derive_key(passphrase: &str) -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), KDF_SALT, &mut key)
        .map_err(|e| CoreError::Encryption(format!("key derivation failed: {e}")))?;
    Ok(key)
}

pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENC_PREFIX)
}

/// Encrypt a plaintext credential using a 32-byte key.
/// Returns a string in the format `enc:<nonce_hex>:<ciphertext_base64>`.
pub fn encrypt_credential(plaintext: &str, key: &[u8; 32]) -> Result<String> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("AES key error: {e}")))?;

    let mut nonce_bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| CoreError::Encryption(format!("encryption failed: {e}")))?;

    Ok(format!(
        "{ENC_PREFIX}{}:{}",
        hex::encode(nonce_bytes),
        STANDARD.encode(ciphertext)
    ))
}

/// Decrypt a credential value. If it doesn't start with `enc:`, returns it as-is.
pub fn decrypt_credential(value: &str, key: &[u8; 32]) -> Result<String> {
    if !is_encrypted(value) {
        return Ok(value.to_string());
    }

    let parts: Vec<&str> = value.splitn(3, ':').collect();
    if parts.len() != 3 {
        return Err(CoreError::Decryption(
            "invalid encrypted credential format".into(),
        ));
    }

    let nonce_bytes =
        hex::decode(parts[1]).map_err(|e| CoreError::Decryption(format!("invalid nonce: {e}")))?;
    if nonce_bytes.len() != 12 {
        return Err(CoreError::Decryption(format!(
            "invalid nonce length: expected 12, got {}",
            nonce_bytes.len()
        )));
    }

    let ciphertext = STANDARD
        .decode(parts[2])
        .map_err(|e| CoreError::Decryption(format!("invalid ciphertext: {e}")))?;

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Decryption(format!("AES key error: {e}")))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| CoreError::Decryption("wrong passphrase or corrupted value".into()))?;

    String::from_utf8(plaintext).map_err(|e| CoreError::Decryption(e.to_string()))
}

/// Mask a secret for display: keeps the last four characters of plaintext
/// values and hides encrypted values entirely.
pub fn mask_secret(value: &str) -> String {
    if is_encrypted(value) {
        return "enc:****".to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
