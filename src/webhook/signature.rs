//! HMAC-SHA256 webhook signatures with a timestamp tolerance window.
//!
//! Header format: `t=<unix-seconds>,v1=<hex>[,v1=<hex>...]`. The digest is
//! computed over `"{t}.{payload}"` with the shared secret as key. Several
//! `v1` entries may be present while a secret is being rotated; any one
//! matching is enough.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use thiserror::Error;

use crate::time::{Clock, SystemClock};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature on inbound deliveries.
pub const SIGNATURE_HEADER: &str = "x-agentflow-signature";

/// Accepted clock skew between signer and verifier.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Why a signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No `t=` element in the header.
    #[error("Missing timestamp in signature")]
    MissingTimestamp,

    /// `t` is further from now than the tolerance allows, in either direction.
    #[error("Timestamp outside tolerance window")]
    OutsideTolerance,

    /// No `v1` digest matched the payload.
    #[error("Signature mismatch")]
    Mismatch,

    /// The header could not be parsed or decoded.
    #[error("Signature verification failed: {0}")]
    Malformed(String),

    /// The signing secret is empty.
    #[error("Webhook secret must not be empty")]
    InvalidSecret,
}

/// Signs and verifies payloads with one secret and tolerance.
///
/// # Example
///
/// ```
/// use agentflow::webhook::SignatureVerifier;
///
/// let verifier = SignatureVerifier::new("whsec_test");
/// let header = verifier.sign(br#"{"id":"evt-1"}"#).unwrap();
/// assert!(verifier.verify(&header, br#"{"id":"evt-1"}"#).is_ok());
/// ```
#[derive(Clone)]
pub struct SignatureVerifier<C = SystemClock> {
    secret: String,
    tolerance: Duration,
    clock: C,
}

impl<C> std::fmt::Debug for SignatureVerifier<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl SignatureVerifier<SystemClock> {
    /// Creates a verifier with the default tolerance and the system clock.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance: DEFAULT_TOLERANCE,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> SignatureVerifier<C> {
    /// Sets the accepted clock skew.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replaces the clock used for timestamps.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SignatureVerifier<C2> {
        SignatureVerifier {
            secret: self.secret,
            tolerance: self.tolerance,
            clock,
        }
    }

    /// Returns the configured tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Signs `payload` stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidSecret`] if the secret is empty.
    pub fn sign(&self, payload: &[u8]) -> Result<String, SignatureError> {
        generate_signature(&self.secret, self.clock.unix_seconds(), payload)
    }

    /// Checks `header` against `payload`.
    ///
    /// # Errors
    ///
    /// Returns the first reason the header is unacceptable, in this order:
    /// unparsable timestamp, missing timestamp, stale or future timestamp,
    /// no `v1` entry, undecodable digest, no matching digest.
    pub fn verify(&self, header: &str, payload: &[u8]) -> Result<(), SignatureError> {
        let parsed = ParsedHeader::parse(header)?;

        let timestamp = parsed.timestamp.ok_or(SignatureError::MissingTimestamp)?;

        let skew_ms = (self.clock.unix_millis() - i128::from(timestamp) * 1000).abs();
        if skew_ms > i128::try_from(self.tolerance.as_millis()).unwrap_or(i128::MAX) {
            return Err(SignatureError::OutsideTolerance);
        }

        if parsed.digests.is_empty() {
            return Err(SignatureError::Malformed(
                "no v1 signature present".to_string(),
            ));
        }

        let candidates = parsed
            .digests
            .iter()
            .map(|value| {
                hex::decode(value)
                    .map_err(|e| SignatureError::Malformed(format!("invalid v1 digest: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected = digest(&self.secret, timestamp, payload)?;
        let matched = candidates
            .iter()
            .fold(Choice::from(0), |acc, candidate| {
                acc | expected.as_slice().ct_eq(candidate.as_slice())
            });

        if bool::from(matched) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

/// Builds `t={timestamp},v1={hex}` for `payload`.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidSecret`] if the secret is empty.
///
/// # Example
///
/// ```
/// use agentflow::webhook::generate_signature;
///
/// let header = generate_signature("whsec_test", 1_700_000_000, b"{}").unwrap();
/// assert!(header.starts_with("t=1700000000,v1="));
/// ```
pub fn generate_signature(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, SignatureError> {
    let digest = digest(secret, timestamp, payload)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(digest)))
}

/// Signs `payload` stamped with the system clock.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidSecret`] if the secret is empty.
pub fn sign_now(secret: &str, payload: &[u8]) -> Result<String, SignatureError> {
    generate_signature(secret, SystemClock.unix_seconds(), payload)
}

/// Verifies `header` against the system clock.
///
/// # Errors
///
/// See [`SignatureVerifier::verify`].
pub fn verify_signature(
    header: &str,
    payload: &[u8],
    secret: &str,
    tolerance: Duration,
) -> Result<(), SignatureError> {
    SignatureVerifier::new(secret)
        .with_tolerance(tolerance)
        .verify(header, payload)
}

fn digest(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::InvalidSecret);
    }
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Header elements, split but not yet decoded.
///
/// Elements without `=` and unknown schemes (`v0`, ...) are skipped; `v1`
/// values stay raw so a bad digest is only reported once the timestamp
/// has been accepted.
#[derive(Debug, Default)]
struct ParsedHeader<'a> {
    timestamp: Option<i64>,
    digests: Vec<&'a str>,
}

impl<'a> ParsedHeader<'a> {
    fn parse(header: &'a str) -> Result<Self, SignatureError> {
        let mut parsed = Self::default();

        for element in header.split(',').map(str::trim) {
            let Some((key, value)) = element.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "t" => {
                    let timestamp = value.parse::<i64>().map_err(|e| {
                        SignatureError::Malformed(format!("invalid timestamp '{value}': {e}"))
                    })?;
                    parsed.timestamp = Some(timestamp);
                }
                "v1" => parsed.digests.push(value),
                _ => {}
            }
        }

        Ok(parsed)
    }
}
