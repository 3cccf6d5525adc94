//! HMAC helpers for the Meta platform.
//!
//! - Webhook deliveries carry `X-Hub-Signature-256: sha256=<hex>`, an
//!   HMAC-SHA256 of the raw body keyed with the app secret.
//! - Graph API calls may carry `appsecret_proof`, an HMAC-SHA256 of the
//!   access token keyed with the app secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix Meta puts in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Hex-encoded HMAC-SHA256 of `payload` keyed with `secret`.
pub fn hmac_sha256_hex(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex_encode(&mac.finalize().into_bytes())
}

/// The `appsecret_proof` parameter for an access token.
pub fn appsecret_proof(app_secret: &str, access_token: &str) -> String {
    hmac_sha256_hex(app_secret, access_token.as_bytes())
}

/// Check an `X-Hub-Signature-256` header value against the raw body.
///
/// Comparison is constant time (delegated to `Mac::verify_slice`).
pub fn verify_webhook_signature(app_secret: &str, body: &[u8], header: &str) -> bool {
    let Some(hex) = header.trim().strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Some(expected) = hex_decode(hex) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_is_hex_sha256() {
        let sig = hmac_sha256_hex("secret", b"payload");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sig, hmac_sha256_hex("secret", b"payload"));
    }

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = format!("{SIGNATURE_PREFIX}{}", hmac_sha256_hex("app-secret", body));
        assert!(verify_webhook_signature("app-secret", body, &header));
    }

    #[test]
    fn tampered_body_fails() {
        let header = format!("{SIGNATURE_PREFIX}{}", hmac_sha256_hex("app-secret", b"a"));
        assert!(!verify_webhook_signature("app-secret", b"b", &header));
    }

    #[test]
    fn malformed_header_fails() {
        assert!(!verify_webhook_signature("s", b"x", "md5=abcd"));
        assert!(!verify_webhook_signature("s", b"x", "sha256=zz"));
        assert!(!verify_webhook_signature("s", b"x", "sha256=abc"));
    }

    #[test]
    fn proof_depends_on_token() {
        assert_ne!(appsecret_proof("s", "token-a"), appsecret_proof("s", "token-b"));
    }
}
