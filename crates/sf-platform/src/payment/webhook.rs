//! Webhook Signature Verification
//!
//! Verifies the processor's `Stripe-Signature`-style header:
//! `t=<unix>,v1=<hex hmac-sha256 of "<t>.<body>">`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::shared::error::{PlatformError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted clock skew between the signature timestamp and now
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed signature header
#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = value.parse::<i64>().ok();
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| PlatformError::WebhookSignature {
        message: "Missing timestamp in signature header".to_string(),
    })?;
    if signatures.is_empty() {
        return Err(PlatformError::WebhookSignature {
            message: "No v1 signature in header".to_string(),
        });
    }

    Ok(SignatureHeader { timestamp, signatures })
}

/// Verify a webhook payload against its signature header.
///
/// `now_unix` is passed in rather than read from the clock so the check
/// is deterministic under test.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now_unix: i64,
) -> Result<()> {
    let parsed = parse_header(header)?;

    if (now_unix - parsed.timestamp).abs() > tolerance_secs {
        return Err(PlatformError::WebhookSignature {
            message: "Signature timestamp outside tolerance".to_string(),
        });
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PlatformError::WebhookSignature {
            message: "Invalid webhook secret".to_string(),
        })?;
    mac.update(parsed.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    let matched = parsed.signatures.iter().any(|candidate| {
        candidate.len() == expected.len()
            && candidate.as_slice().ct_eq(expected.as_slice()).into()
    });

    if matched {
        Ok(())
    } else {
        Err(PlatformError::WebhookSignature {
            message: "Signature mismatch".to_string(),
        })
    }
}

/// Compute a signature header for a payload (test helper and local dev).
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={},v1={}", timestamp, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign_payload(payload, SECRET, 1_700_000_000);

        assert!(verify_signature(payload, &header, SECRET, DEFAULT_TOLERANCE_SECS, 1_700_000_010).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign_payload(payload, SECRET, 1_700_000_000);

        let tampered = br#"{"type":"checkout.session.expired"}"#;
        assert!(verify_signature(tampered, &header, SECRET, DEFAULT_TOLERANCE_SECS, 1_700_000_010).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{}";
        let header = sign_payload(payload, SECRET, 1_700_000_000);

        assert!(verify_signature(payload, &header, "whsec_other", DEFAULT_TOLERANCE_SECS, 1_700_000_010).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let header = sign_payload(payload, SECRET, 1_700_000_000);

        let err = verify_signature(payload, &header, SECRET, DEFAULT_TOLERANCE_SECS, 1_700_001_000)
            .unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(verify_signature(b"{}", "garbage", SECRET, DEFAULT_TOLERANCE_SECS, 0).is_err());
        assert!(verify_signature(b"{}", "t=123", SECRET, DEFAULT_TOLERANCE_SECS, 0).is_err());
        assert!(verify_signature(b"{}", "v1=abcd", SECRET, DEFAULT_TOLERANCE_SECS, 0).is_err());
    }
}
