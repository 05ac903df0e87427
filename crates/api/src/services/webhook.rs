//! Stripe webhook signature verification.
//!
//! Stripe signs webhook deliveries with a `Stripe-Signature` header of the
//! form `t=<unix-timestamp>,v1=<hex-hmac>[,v1=...]`. The signed payload is
//! `"{timestamp}.{raw-body}"`, keyed with the endpoint's signing secret
//! (`whsec_...`). Comparison is constant-time and timestamps outside the
//! tolerance window are rejected to prevent replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Replay tolerance for the signed timestamp.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Errors from parsing or verifying a webhook signature.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Header is missing a timestamp or any `v1` signature.
    #[error("malformed Stripe-Signature header")]
    Malformed,

    /// A `v1` entry is not valid hex.
    #[error("signature is not valid hex")]
    InvalidHex,

    /// Timestamp is outside the tolerance window.
    #[error("signature timestamp outside tolerance")]
    Expired,

    /// No candidate signature matched the payload.
    #[error("no matching signature")]
    Mismatch,
}

/// A parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp from the `t=` element.
    pub timestamp: i64,
    /// All `v1=` candidates (Stripe sends several during secret rotation).
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parse a `Stripe-Signature` header value.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::Malformed` if the timestamp or every `v1`
    /// signature is missing.
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for element in header.split(',') {
            let Some((key, value)) = element.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                "v1" => signatures.push(value.to_owned()),
                // v0 (test-mode legacy scheme) and unknown keys are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
        if signatures.is_empty() {
            return Err(SignatureError::Malformed);
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Verify a webhook payload against a parsed signature header.
///
/// `now_unix` is passed in rather than read from the clock so the tolerance
/// check is deterministic under test.
///
/// # Errors
///
/// Returns `SignatureError::Expired` when the signed timestamp is outside
/// the tolerance window, `InvalidHex`/`Mismatch` when no candidate
/// signature verifies.
pub fn verify_signature(
    secret: &str,
    header: &SignatureHeader,
    payload: &[u8],
    now_unix: i64,
) -> Result<(), SignatureError> {
    if (now_unix - header.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let mut matched_any_hex = false;
    for candidate in &header.signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };
        matched_any_hex = true;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::Mismatch)?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice is constant-time
        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }

    if matched_any_hex {
        Err(SignatureError::Mismatch)
    } else {
        Err(SignatureError::InvalidHex)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;
    const TIMESTAMP: i64 = 1_700_000_000;

    /// Sign a payload the way Stripe does.
    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_header(secret: &str) -> SignatureHeader {
        SignatureHeader {
            timestamp: TIMESTAMP,
            signatures: vec![sign(secret, TIMESTAMP, PAYLOAD)],
        }
    }

    #[test]
    fn test_parse_header() {
        let parsed = SignatureHeader::parse("t=1700000000,v1=abc123,v1=def456").unwrap();
        assert_eq!(parsed.timestamp, 1_700_000_000);
        assert_eq!(parsed.signatures, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_header_ignores_unknown_schemes() {
        let parsed = SignatureHeader::parse("t=1700000000,v0=legacy,v1=abc123").unwrap();
        assert_eq!(parsed.signatures, vec!["abc123"]);
    }

    #[test]
    fn test_parse_header_rejects_missing_parts() {
        assert_eq!(
            SignatureHeader::parse("v1=abc123").unwrap_err(),
            SignatureError::Malformed
        );
        assert_eq!(
            SignatureHeader::parse("t=1700000000").unwrap_err(),
            SignatureError::Malformed
        );
        assert_eq!(
            SignatureHeader::parse("").unwrap_err(),
            SignatureError::Malformed
        );
    }

    #[test]
    fn test_accepts_valid_signature_within_tolerance() {
        let header = signed_header(SECRET);
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, TIMESTAMP + 60),
            Ok(())
        );
    }

    #[test]
    fn test_accepts_any_matching_rotation_candidate() {
        let mut header = signed_header(SECRET);
        header
            .signatures
            .insert(0, sign("whsec_old_secret", TIMESTAMP, PAYLOAD));
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, TIMESTAMP),
            Ok(())
        );
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let header = signed_header(SECRET);
        assert_eq!(
            verify_signature(SECRET, &header, b"{\"tampered\":true}", TIMESTAMP),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let header = signed_header("whsec_other_secret");
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, TIMESTAMP),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let header = signed_header(SECRET);
        assert_eq!(
            verify_signature(
                SECRET,
                &header,
                PAYLOAD,
                TIMESTAMP + SIGNATURE_TOLERANCE_SECS + 1
            ),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_rejects_non_hex_signature() {
        let header = SignatureHeader {
            timestamp: TIMESTAMP,
            signatures: vec!["not-hex!".to_string()],
        };
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, TIMESTAMP),
            Err(SignatureError::InvalidHex)
        );
    }
}
