//! Webhook payload authentication.
//!
//! Meta signs every delivery with HMAC-SHA256 over the raw body, keyed by
//! the app secret, and sends the hex digest in `X-Hub-Signature-256`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check a delivery signature against the raw request body.
///
/// The comparison goes through `verify_slice`, which is constant-time.
pub fn signature_is_valid(app_secret: &str, header: Option<&str>, body: &[u8]) -> bool {
    let Some(header) = header else {
        return false;
    };
    let Some(hex_digest) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_passes() {
        let body = br#"{"entry":[]}"#;
        let header = sign("secret", body);
        assert!(signature_is_valid("secret", Some(&header), body));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = br#"{"entry":[]}"#;
        let header = sign("other", body);
        assert!(!signature_is_valid("secret", Some(&header), body));
    }

    #[test]
    fn tampered_body_fails() {
        let header = sign("secret", br#"{"entry":[]}"#);
        assert!(!signature_is_valid(
            "secret",
            Some(&header),
            br#"{"entry":[{}]}"#
        ));
    }

    #[test]
    fn missing_header_fails() {
        assert!(!signature_is_valid("secret", None, b"body"));
    }

    #[test]
    fn malformed_header_fails() {
        assert!(!signature_is_valid("secret", Some("md5=abcd"), b"body"));
        assert!(!signature_is_valid("secret", Some("sha256=zz!!"), b"body"));
    }
}
