//! Signature helpers for Plisio payment notifications.
//!
//! Plisio signs each notification by HMAC-ing the payload with the account's secret key and
//! placing the hex digest in the payload itself, as `verify_hash`. The signed message is the
//! JSON serialization of the payload with `verify_hash` removed and object keys sorted
//! (serde_json serializes maps in key order, which gives us the canonical form for free).
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

pub const VERIFY_HASH_FIELD: &str = "verify_hash";

/// The canonical string a notification signature covers: the payload minus `verify_hash`,
/// serialized with sorted keys. Nested arrays and objects are stringified first, matching how
/// the gateway flattens them before signing.
pub fn canonical_payload(payload: &Value) -> String {
    let mut payload = payload.clone();
    if let Some(object) = payload.as_object_mut() {
        object.remove(VERIFY_HASH_FIELD);
        for value in object.values_mut() {
            if value.is_object() || value.is_array() {
                *value = Value::String(value.to_string());
            }
        }
    }
    payload.to_string()
}

/// The hex HMAC-SHA256 signature for a payload, as it would appear in `verify_hash`.
pub fn sign_callback(secret: &str, payload: &Value) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(canonical_payload(payload).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies the `verify_hash` signature carried inside a notification payload. The comparison
/// happens in constant time via [`Mac::verify_slice`].
pub fn verify_callback(secret: &str, payload: &Value) -> Result<(), SignatureError> {
    let provided = payload
        .get(VERIFY_HASH_FIELD)
        .and_then(|v| v.as_str())
        .ok_or(SignatureError::MissingSignature)?;
    let provided = hex::decode(provided).map_err(|_| SignatureError::MalformedSignature)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(canonical_payload(payload).as_bytes());
    mac.verify_slice(&provided).map_err(|_| SignatureError::InvalidSignature)
}
