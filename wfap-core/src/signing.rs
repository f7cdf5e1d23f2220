//! Signing codec for WFAP messages.
//!
//! Implements:
//! - Sorted-key JSON canonicalization (JCS-style, RFC 8785)
//! - HMAC-SHA256 message authentication over the canonical bytes
//! - Constant-time signature comparison
//! - Signed Intent/Offer construction and verification
//!
//! The protocol deliberately uses a single pre-shared secret rather than
//! public-key signatures; the secret is injected configuration, never a
//! hard-coded constant.

use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{WfapError, WfapResult};
use crate::message::{prefixed_id, Intent, Offer};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the shared signing secret.
pub const SIGNING_SECRET_ENV: &str = "WFAP_SIGNING_SECRET";

/// Pre-shared signing secret.
///
/// Process-wide, fixed configuration injected into the [`Codec`]. Test
/// fixtures construct distinct keys to exercise verification failures.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Create a key from raw secret bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(secret.as_ref().to_vec())
    }

    /// Load the key from `WFAP_SIGNING_SECRET`.
    pub fn from_env() -> WfapResult<Self> {
        let secret = std::env::var(SIGNING_SECRET_ENV)
            .map_err(|_| WfapError::Crypto(format!("{} is not set", SIGNING_SECRET_ENV)))?;
        Ok(Self::new(secret))
    }

    fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    // Never print secret material.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(..)")
    }
}

/// Sorted-key JSON canonicalization.
///
/// For signature computation we need deterministic serialization:
/// 1. Object keys sorted lexicographically
/// 2. No whitespace
/// 3. Numbers in shortest form
pub fn canonicalize(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                format!("{}", f)
            } else {
                n.to_string()
            }
        }
        serde_json::Value::String(s) => {
            serde_json::to_string(s).unwrap_or_default()
        }
        serde_json::Value::Array(arr) => {
            let elements: Vec<String> = arr.iter().map(canonicalize).collect();
            format!("[{}]", elements.join(","))
        }
        serde_json::Value::Object(obj) => {
            let mut keys: Vec<_> = obj.keys().collect();
            keys.sort();
            let pairs: Vec<String> = keys
                .iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonicalize(&obj[*k])
                    )
                })
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
    }
}

/// A timestamped, signed trace entry for decision auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub log_id: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Signing codec bound to one shared secret.
pub struct Codec {
    key: SigningKey,
}

impl Codec {
    /// Create a codec with the given key.
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Sign a JSON payload: canonicalize with sorted keys, HMAC-SHA256,
    /// base64-encode the digest.
    pub fn sign(&self, payload: &serde_json::Value) -> WfapResult<String> {
        if !payload.is_object() {
            return Err(WfapError::Encoding(<serde_json::Error as serde::ser::Error>::custom(
                "payload must be a JSON object",
            )));
        }
        let canonical = canonicalize(payload);
        let mut mac = HmacSha256::new_from_slice(self.key.bytes())
            .map_err(|e| WfapError::Crypto(format!("invalid key length: {}", e)))?;
        mac.update(canonical.as_bytes());
        let digest = mac.finalize().into_bytes();
        Ok(base64::engine::general_purpose::STANDARD.encode(digest))
    }

    /// Verify a signature against a payload.
    ///
    /// Recomputes the MAC and compares in constant time; no early exit on
    /// the first mismatched byte.
    pub fn verify(&self, payload: &serde_json::Value, signature: &str) -> WfapResult<bool> {
        let provided = base64::engine::general_purpose::STANDARD
            .decode(signature)
            .map_err(|e| WfapError::Crypto(format!("invalid base64 signature: {}", e)))?;

        let canonical = canonicalize(payload);
        let mut mac = HmacSha256::new_from_slice(self.key.bytes())
            .map_err(|e| WfapError::Crypto(format!("invalid key length: {}", e)))?;
        mac.update(canonical.as_bytes());
        let expected = mac.finalize().into_bytes();

        Ok(expected.ct_eq(provided.as_slice()).into())
    }

    /// Build and sign an Intent.
    ///
    /// The signature covers the company-identity subset of the fields.
    pub fn create_intent(
        &self,
        company_id: impl Into<String>,
        amount: f64,
        duration: u32,
        purpose: impl Into<String>,
        expected_income: Option<f64>,
    ) -> WfapResult<Intent> {
        let mut intent = Intent::new(company_id, amount, duration, purpose, expected_income);
        intent.signature = Some(self.sign(&Self::intent_payload(&intent))?);
        Ok(intent)
    }

    /// Build and sign an Offer.
    ///
    /// The signature covers the full field set minus `signature`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_offer(
        &self,
        request_id: impl Into<String>,
        lender_id: impl Into<String>,
        interest_rate: f64,
        amount_approved: f64,
        repayment_period: u32,
        esg_summary: impl Into<String>,
        carbon_adjusted_rate: f64,
    ) -> WfapResult<Offer> {
        let mut offer = Offer::new(
            request_id,
            lender_id,
            interest_rate,
            amount_approved,
            repayment_period,
            esg_summary,
            carbon_adjusted_rate,
        );
        self.sign_offer(&mut offer)?;
        Ok(offer)
    }

    /// Re-sign an offer after mutation (e.g. a negotiated rate change).
    pub fn sign_offer(&self, offer: &mut Offer) -> WfapResult<()> {
        offer.signature = Some(self.sign(&Self::offer_payload(offer)?)?);
        Ok(())
    }

    /// Verify an Intent's signature.
    pub fn verify_intent(&self, intent: &Intent) -> WfapResult<bool> {
        let Some(ref signature) = intent.signature else {
            return Ok(false);
        };
        self.verify(&Self::intent_payload(intent), signature)
    }

    /// Verify an Offer's signature.
    pub fn verify_offer(&self, offer: &Offer) -> WfapResult<bool> {
        let Some(ref signature) = offer.signature else {
            return Ok(false);
        };
        self.verify(&Self::offer_payload(offer)?, signature)
    }

    /// Build and sign an audit record.
    pub fn create_audit_record(
        &self,
        actor: impl Into<String>,
        action: impl Into<String>,
        details: serde_json::Value,
    ) -> WfapResult<AuditRecord> {
        let mut record = AuditRecord {
            log_id: prefixed_id("log"),
            timestamp: Utc::now(),
            actor: actor.into(),
            action: action.into(),
            details,
            signature: None,
        };
        let mut payload = serde_json::to_value(&record)?;
        if let serde_json::Value::Object(ref mut map) = payload {
            map.remove("signature");
        }
        record.signature = Some(self.sign(&payload)?);
        Ok(record)
    }

    /// Canonical signing subset for an Intent.
    fn intent_payload(intent: &Intent) -> serde_json::Value {
        serde_json::json!({ "company_id": intent.company_id })
    }

    /// Canonical signing payload for an Offer: all fields except `signature`.
    fn offer_payload(offer: &Offer) -> WfapResult<serde_json::Value> {
        let mut value = serde_json::to_value(offer)?;
        if let serde_json::Value::Object(ref mut map) = value {
            map.remove("signature");
        }
        Ok(value)
    }
}
