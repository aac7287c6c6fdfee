//! AES-256-GCM encryption keyed from the device fingerprint.
//!
//! The cipher key is derived per record with PBKDF2-HMAC-SHA256 over the
//! fingerprint string plus a random salt. The fingerprint itself is never
//! stored, so a record is only decryptable on the device that produced it.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{CredentialError, Result};

pub(crate) const NONCE_SIZE: usize = 12;
pub(crate) const SALT_SIZE: usize = 32;
const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count. The fingerprint is low-entropy compared to a
/// random master key, so the derivation has to be deliberately slow.
const KDF_ROUNDS: u32 = 100_000;

/// Derive a 256-bit cipher key from `fingerprint` and `salt`.
fn derive_key(fingerprint: &str, salt: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(fingerprint.as_bytes(), salt, KDF_ROUNDS, &mut key);
    key
}

/// Encrypt `plaintext` under a key derived from `fingerprint`.
///
/// Returns `(ciphertext_with_tag, nonce, salt)`. Salt and nonce are freshly
/// random, so encrypting the same pair twice produces different records.
pub fn encrypt(fingerprint: &str, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let mut salt = vec![0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut nonce_bytes = vec![0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut key = derive_key(fingerprint, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CredentialError::EncryptionFailed(e.to_string()));
    key.zeroize();
    let cipher = cipher?;

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CredentialError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce_bytes, salt))
}

/// Decrypt a record previously produced by [`encrypt`].
///
/// Fails when the fingerprint differs from the one the record was written
/// under, or when the ciphertext was tampered with.
pub fn decrypt(
    fingerprint: &str,
    ciphertext: &[u8],
    nonce_bytes: &[u8],
    salt: &[u8],
) -> Result<Vec<u8>> {
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(CredentialError::DecryptionFailed(format!(
            "nonce has wrong length: {} (expected {NONCE_SIZE})",
            nonce_bytes.len()
        )));
    }

    let mut key = derive_key(fingerprint, salt);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CredentialError::DecryptionFailed(e.to_string()));
    key.zeroize();
    let cipher = cipher?;

    let nonce = Nonce::from_slice(nonce_bytes);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| CredentialError::DecryptionFailed(e.to_string()))
}
