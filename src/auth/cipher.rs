//! Symmetric cipher for encrypted API keys.
//!
//! Wire format is `base64url(iv || aes_cfb(plaintext))`. The IV is one AES
//! block wide and freshly drawn from the OS random source on every call.
//!
//! CFB carries no authentication tag: a corrupted ciphertext decrypts to
//! garbage instead of failing. Callers must treat structured parsing of the
//! plaintext as the only integrity check.

use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use cfb_mode::cipher::{AsyncStreamCipher, InvalidLength, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

/// AES block size, which is also the IV width.
pub const BLOCK_SIZE: usize = 16;

/// Errors raised by [`encrypt`] and [`decrypt`].
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid encryption key: {0}")]
    Key(String),

    #[error("secure random source unavailable: {0}")]
    RandomSource(String),

    #[error("ciphertext too short")]
    CiphertextTooShort,

    #[error("invalid ciphertext encoding: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Decode a hex key and check it is a valid AES key length.
pub fn parse_key(key_hex: &str) -> Result<Vec<u8>, CipherError> {
    let key = hex::decode(key_hex.trim()).map_err(|e| CipherError::Key(e.to_string()))?;

    match key.len() {
        16 | 24 | 32 => Ok(key),
        n => Err(CipherError::Key(format!(
            "expected 16, 24 or 32 bytes, got {}",
            n
        ))),
    }
}

/// Encrypt `plaintext` under the hex-encoded `key_hex`.
pub fn encrypt(key_hex: &str, plaintext: &[u8]) -> Result<String, CipherError> {
    let key = parse_key(key_hex)?;

    let mut blob = vec![0u8; BLOCK_SIZE + plaintext.len()];
    let (iv, body) = blob.split_at_mut(BLOCK_SIZE);
    OsRng.try_fill_bytes(iv).map_err(|e| {
        tracing::error!(error = %e, "Failed to draw IV");
        CipherError::RandomSource(e.to_string())
    })?;

    body.copy_from_slice(plaintext);
    match key.len() {
        16 => cfb_mode::Encryptor::<Aes128>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .encrypt(body),
        24 => cfb_mode::Encryptor::<Aes192>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .encrypt(body),
        _ => cfb_mode::Encryptor::<Aes256>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .encrypt(body),
    }

    Ok(URL_SAFE.encode(&blob))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Returns raw bytes: without an authentication tag there is no guarantee the
/// plaintext is valid UTF-8.
pub fn decrypt(key_hex: &str, encoded: &str) -> Result<Vec<u8>, CipherError> {
    let key = parse_key(key_hex)?;
    let blob = URL_SAFE.decode(encoded.trim())?;

    if blob.len() < BLOCK_SIZE {
        tracing::debug!(len = blob.len(), "Ciphertext shorter than one block");
        return Err(CipherError::CiphertextTooShort);
    }

    let (iv, body) = blob.split_at(BLOCK_SIZE);
    let mut plaintext = body.to_vec();
    match key.len() {
        16 => cfb_mode::Decryptor::<Aes128>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt(&mut plaintext),
        24 => cfb_mode::Decryptor::<Aes192>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt(&mut plaintext),
        _ => cfb_mode::Decryptor::<Aes256>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt(&mut plaintext),
    }

    Ok(plaintext)
}

fn invalid_length(e: InvalidLength) -> CipherError {
    CipherError::Key(e.to_string())
}
