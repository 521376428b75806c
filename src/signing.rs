//! HMAC-SHA256 signing of webhook payloads.
//!
//! The signed string is `"<timestamp>." + body`, where `body` is the exact
//! byte string transmitted to the subscriber. The delivery header is
//! `t=<timestamp>,v1=<lowercase hex signature>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase-hex HMAC-SHA256 signature for `body` at
/// `timestamp` (unix seconds).
pub fn sign(body: &str, timestamp: i64, secret: &str) -> String {
    hex::encode(mac_over(timestamp.to_string().as_bytes(), body.as_bytes(), secret))
}

/// Formats the `X-PL-Signature` header value.
pub fn signature_header(timestamp: i64, signature: &str) -> String {
    format!("t={timestamp},v1={signature}")
}

/// Verifies a received body against its signature header.
///
/// Fails closed: malformed headers, missing parts, bad hex, or a secret
/// mismatch all return `false`. The comparison is constant-time.
pub fn verify(body: &[u8], header: &str, secret: &str) -> bool {
    let Some((timestamp, signature)) = parse_header(header) else {
        return false;
    };
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    let expected = mac_over(timestamp.as_bytes(), body, secret);
    expected.as_slice().ct_eq(&provided).into()
}

fn mac_over(timestamp: &[u8], body: &[u8], secret: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp);
    mac.update(b".");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Splits `t=<ts>,v1=<sig>` into its parts, tolerating extra segments.
fn parse_header(header: &str) -> Option<(&str, &str)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }
    Some((timestamp?, signature?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_123";

    #[test]
    fn test_sign_verify_round_trip() {
        let body = r#"{"id":"evt_abc","type":"payment.succeeded"}"#;
        let ts = 1_700_000_000;
        let sig = sign(body, ts, SECRET);
        let header = signature_header(ts, &sig);
        assert!(verify(body.as_bytes(), &header, SECRET));
    }

    #[test]
    fn test_tampered_body_fails() {
        let ts = 1_700_000_000;
        let sig = sign("{\"a\":1}", ts, SECRET);
        let header = signature_header(ts, &sig);
        assert!(!verify(b"{\"a\":2}", &header, SECRET));
    }

    #[test]
    fn test_tampered_timestamp_fails() {
        let body = "{}";
        let sig = sign(body, 1_700_000_000, SECRET);
        let header = signature_header(1_700_000_001, &sig);
        assert!(!verify(body.as_bytes(), &header, SECRET));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let body = "{}";
        let ts = 1_700_000_000;
        let mut sig = sign(body, ts, SECRET);
        // flip one hex digit
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify(body.as_bytes(), &signature_header(ts, &sig), SECRET));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = "{}";
        let ts = 1_700_000_000;
        let sig = sign(body, ts, SECRET);
        assert!(!verify(
            body.as_bytes(),
            &signature_header(ts, &sig),
            "whsec_other"
        ));
    }

    #[test]
    fn test_malformed_headers_fail_closed() {
        for header in [
            "",
            "garbage",
            "t=123",
            "v1=abcd",
            "t=,v1=",
            "t=123,v1=not-hex",
            "timestamp=123,sig=abcd",
        ] {
            assert!(!verify(b"{}", header, SECRET), "header {header:?}");
        }
    }

    #[test]
    fn test_header_tolerates_extra_segments() {
        let body = "{}";
        let ts = 42;
        let sig = sign(body, ts, SECRET);
        let header = format!("t={ts},v0=ignored,v1={sig}");
        assert!(verify(body.as_bytes(), &header, SECRET));
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let sig = sign("{}", 42, SECRET);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
