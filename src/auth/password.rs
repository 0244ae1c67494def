//! Salted PBKDF2 password digests.
//!
//! Digest format is `base64(salt) "." base64(derived_key)` with a 16-byte
//! random salt and a 32-byte PBKDF2-HMAC-SHA256 key. Verification is
//! constant time and fails closed on malformed input.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

    format!("{}.{}", BASE64.encode(salt), BASE64.encode(key))
}

/// Returns false on any mismatch, including a digest that does not parse.
pub fn verify_password(password: &str, digest: &str, iterations: u32) -> bool {
    let Some((salt_b64, key_b64)) = digest.split_once('.') else {
        return false;
    };
    let Ok(salt) = BASE64.decode(salt_b64) else {
        return false;
    };
    let Ok(stored_key) = BASE64.decode(key_b64) else {
        return false;
    };
    if stored_key.len() != KEY_LEN {
        return false;
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

    bool::from(key.ct_eq(&stored_key))
}
