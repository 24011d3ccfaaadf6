//! Ed25519 verification of inbound interaction requests.
//!
//! The platform signs `timestamp ++ raw body` with the application's key
//! and sends the hex signature and the timestamp as headers. Verification
//! is byte-exact, so the body must be the bytes as received.
//!
//! Every function here fails closed: malformed hex, wrong lengths, or a
//! missing header all yield `false`, never an error or a panic.

use ed25519_dalek::{Signature, VerifyingKey};

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
/// Header carrying the decimal timestamp string.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Decode a hex string leniently.
///
/// Decoding stops at the first pair that is not two hex digits, and a
/// dangling final nibble is dropped, so malformed input yields a truncated
/// (possibly empty) byte vector instead of an error.
pub fn hex_to_bytes(hex: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for pair in hex.as_bytes().chunks(2) {
        match pair {
            [hi, lo] => match (nibble(*hi), nibble(*lo)) {
                (Some(hi), Some(lo)) => bytes.push((hi << 4) | lo),
                _ => break,
            },
            _ => break,
        }
    }
    bytes
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Encode bytes to a lowercase hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse a hex public key into a verifying key.
pub fn parse_public_key(public_key_hex: &str) -> Option<VerifyingKey> {
    let bytes: [u8; 32] = hex_to_bytes(public_key_hex).try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

/// Verify `signature_hex` over `timestamp ++ body` against `public_key_hex`.
pub fn verify(public_key_hex: &str, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
    let Some(key) = parse_public_key(public_key_hex) else {
        return false;
    };
    verify_with_key(&key, signature_hex, timestamp, body)
}

fn verify_with_key(key: &VerifyingKey, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
    let Ok(signature) = Signature::from_slice(&hex_to_bytes(signature_hex)) else {
        return false;
    };

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    key.verify_strict(&message, &signature).is_ok()
}

/// One inbound request as seen by the verifier.
///
/// `signature_hex` and `timestamp` are `None` when the header was absent.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    pub raw_body: &'a [u8],
    pub signature_hex: Option<&'a str>,
    pub timestamp: Option<&'a str>,
    pub public_key_hex: &'a str,
}

impl SignedRequest<'_> {
    /// `false` when either header is missing or the signature does not verify.
    pub fn verify(&self) -> bool {
        match (self.signature_hex, self.timestamp) {
            (Some(signature), Some(timestamp)) => {
                verify(self.public_key_hex, signature, timestamp, self.raw_body)
            }
            _ => false,
        }
    }
}

/// Verifier bound to one application's public key.
///
/// Holds no mutable state; share it freely across requests.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: Option<VerifyingKey>,
}

impl SignatureVerifier {
    pub fn new(public_key_hex: impl AsRef<str>) -> Self {
        Self {
            key: parse_public_key(public_key_hex.as_ref()),
        }
    }

    /// Verify one request's headers and raw body.
    pub fn verify_request(
        &self,
        signature_hex: Option<&str>,
        timestamp: Option<&str>,
        raw_body: &[u8],
    ) -> bool {
        let (Some(key), Some(signature), Some(timestamp)) = (self.key.as_ref(), signature_hex, timestamp)
        else {
            return false;
        };
        verify_with_key(key, signature, timestamp, raw_body)
    }
}
