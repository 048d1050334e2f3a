//! PCI helpers.
//!
//! Nothing sensitive should reach logs or the audit trail unmasked.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub use paygate_types::mask_document;

const REDACTED: &str = "[REDACTED]";

/// Keys whose values are replaced wholesale.
const SENSITIVE_FIELDS: &[&str] = &[
    "cvv",
    "cvc",
    "securityCode",
    "security_code",
    "password",
    "secret",
    "token",
    "access_token",
    "apiKey",
    "api_key",
];

/// Keys holding a CPF/CNPJ, masked with [`mask_document`].
const DOCUMENT_FIELDS: &[&str] = &["cpfCnpj", "cpf_cnpj", "document"];

/// Keys holding a card number, masked with [`mask_card_number`].
const CARD_FIELDS: &[&str] = &["cardNumber", "card_number"];

/// Masks a card number, keeping only the last 4 digits.
///
/// Spaces and dashes are dropped first; `"4111 1111 1111 1111"` becomes
/// `"************1111"`. Anything shorter than 4 characters becomes `"****"`.
pub fn mask_card_number(card_number: &str) -> String {
    let cleaned: Vec<char> = card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if cleaned.len() < 4 {
        return "****".to_string();
    }

    let visible: String = cleaned[cleaned.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(cleaned.len() - 4), visible)
}

/// Returns a copy of `data` with secrets redacted and documents masked,
/// at any depth.
pub fn sanitize_for_log(data: &Value) -> Value {
    match data {
        Value::Object(fields) => Value::Object(sanitize_object(fields)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_for_log).collect()),
        other => other.clone(),
    }
}

fn sanitize_object(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| {
            let sanitized = if SENSITIVE_FIELDS.contains(&key.as_str()) {
                Value::String(REDACTED.to_string())
            } else if DOCUMENT_FIELDS.contains(&key.as_str()) {
                mask_scalar(value, mask_document)
            } else if CARD_FIELDS.contains(&key.as_str()) {
                mask_scalar(value, mask_card_number)
            } else {
                sanitize_for_log(value)
            };
            (key.clone(), sanitized)
        })
        .collect()
}

fn mask_scalar(value: &Value, mask: fn(&str) -> String) -> Value {
    match value {
        Value::String(raw) => Value::String(mask(raw)),
        Value::Null => Value::Null,
        other => Value::String(mask(&other.to_string())),
    }
}

/// Compares a presented webhook token against the configured one.
///
/// Both sides are hashed first so the comparison runs in constant time
/// regardless of length.
pub fn verify_webhook_token(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.as_slice().ct_eq(expected.as_slice()).into()
}

/// Hex SHA-256 fingerprint, for logging which secret was used without revealing it.
pub fn fingerprint(secret: &str) -> String {
    let digest = hex::encode(Sha256::digest(secret.as_bytes()));
    digest[..12].to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Field encryption
// ─────────────────────────────────────────────────────────────────────────────

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Encryption key must be 64 hex characters (32 bytes)")]
    InvalidKey,

    #[error("Ciphertext is not valid base64 or is too short")]
    Malformed,

    /// Wrong key, or the payload was altered.
    #[error("Ciphertext failed authentication")]
    Authentication,
}

/// AES-256-GCM cipher for sensitive fields at rest.
///
/// Output is base64 of `nonce (12 bytes) || ciphertext || tag (16 bytes)`,
/// with a fresh random nonce per call.
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Builds a cipher from a hex-encoded 256-bit key.
    pub fn from_hex_key(key_hex: &str) -> Result<Self, CryptoError> {
        let key = hex::decode(key_hex.trim()).map_err(|_| CryptoError::InvalidKey)?;
        if key.len() != 32 {
            return Err(CryptoError::InvalidKey);
        }
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Authentication)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + sealed.len());
        combined.extend_from_slice(nonce.as_slice());
        combined.extend_from_slice(&sealed);
        Ok(STANDARD.encode(combined))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let combined = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::Malformed)?;
        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Malformed);
        }

        let (nonce, sealed) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Authentication)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::Malformed)
    }
}

/// Encrypts `plaintext` under a hex-encoded AES-256 key.
pub fn encrypt(plaintext: &str, key_hex: &str) -> Result<String, CryptoError> {
    FieldCipher::from_hex_key(key_hex)?.encrypt(plaintext)
}

/// Decrypts a value produced by [`encrypt`].
pub fn decrypt(encoded: &str, key_hex: &str) -> Result<String, CryptoError> {
    FieldCipher::from_hex_key(key_hex)?.decrypt(encoded)
}
