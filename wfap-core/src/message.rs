//! Message types for the WFAP protocol.
//!
//! Defines the signed Intent (loan request) and Offer (lender response)
//! records together with their structural validation rules. Both are
//! transmitted as flat key-value objects; signatures are computed over the
//! sorted-key canonical serialization (see [`crate::signing`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WfapError, WfapResult};

/// Generate a short prefixed id, e.g. `req_1a2b3c4d`.
pub(crate) fn prefixed_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..8])
}

/// A signed loan request submitted by a borrower.
///
/// Immutable once signed: every policy engine consumes it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub request_id: String,
    pub company_id: String,
    pub amount: f64,
    /// Requested duration in months.
    pub duration: u32,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_income: Option<f64>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Intent {
    /// Build an unsigned intent. Use [`crate::signing::Codec::create_intent`]
    /// to obtain a signed one.
    pub fn new(
        company_id: impl Into<String>,
        amount: f64,
        duration: u32,
        purpose: impl Into<String>,
        expected_income: Option<f64>,
    ) -> Self {
        Self {
            request_id: prefixed_id("req"),
            company_id: company_id.into(),
            amount,
            duration,
            purpose: purpose.into(),
            expected_income,
            timestamp: Utc::now(),
            signature: None,
        }
    }
}

/// A signed loan proposal returned by one lender for one Intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: String,
    /// Back-reference to the originating Intent.
    pub request_id: String,
    pub lender_id: String,
    pub interest_rate: f64,
    pub amount_approved: f64,
    /// Repayment period in months.
    pub repayment_period: u32,
    pub esg_summary: String,
    pub carbon_adjusted_rate: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Offer {
    /// Build an unsigned offer. Use [`crate::signing::Codec::create_offer`]
    /// to obtain a signed one.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: impl Into<String>,
        lender_id: impl Into<String>,
        interest_rate: f64,
        amount_approved: f64,
        repayment_period: u32,
        esg_summary: impl Into<String>,
        carbon_adjusted_rate: f64,
    ) -> Self {
        Self {
            offer_id: prefixed_id("off"),
            request_id: request_id.into(),
            lender_id: lender_id.into(),
            interest_rate,
            amount_approved,
            repayment_period,
            esg_summary: esg_summary.into(),
            carbon_adjusted_rate,
            timestamp: Utc::now(),
            signature: None,
        }
    }

    /// Whether the offer represents a rejection (excluded industry).
    pub fn is_rejection(&self) -> bool {
        self.amount_approved == 0.0
    }
}

/// Structural validation of an Intent.
///
/// Checks required fields and value ranges; signature validity is checked
/// separately by the codec.
pub fn validate_intent(intent: &Intent) -> WfapResult<()> {
    if intent.request_id.is_empty() {
        return Err(WfapError::validation("request_id", "field cannot be empty"));
    }
    if intent.company_id.is_empty() {
        return Err(WfapError::validation("company_id", "field cannot be empty"));
    }
    if intent.purpose.trim().is_empty() {
        return Err(WfapError::validation("purpose", "field cannot be empty"));
    }
    if !intent.amount.is_finite() || intent.amount <= 0.0 {
        return Err(WfapError::validation("amount", "must be a positive number"));
    }
    if intent.duration == 0 {
        return Err(WfapError::validation("duration", "must be a positive integer"));
    }
    if let Some(income) = intent.expected_income {
        if !income.is_finite() || income < 0.0 {
            return Err(WfapError::validation(
                "expected_income",
                "must be a non-negative number",
            ));
        }
    }
    Ok(())
}

/// Structural validation of an Offer.
///
/// A rejected offer carries `amount_approved = 0`, so zero is accepted here.
pub fn validate_offer(offer: &Offer) -> WfapResult<()> {
    if offer.offer_id.is_empty() {
        return Err(WfapError::validation("offer_id", "field cannot be empty"));
    }
    if offer.request_id.is_empty() {
        return Err(WfapError::validation("request_id", "field cannot be empty"));
    }
    if offer.lender_id.is_empty() {
        return Err(WfapError::validation("lender_id", "field cannot be empty"));
    }
    if !offer.interest_rate.is_finite() || offer.interest_rate < 0.0 {
        return Err(WfapError::validation(
            "interest_rate",
            "must be a non-negative number",
        ));
    }
    if !offer.amount_approved.is_finite() || offer.amount_approved < 0.0 {
        return Err(WfapError::validation(
            "amount_approved",
            "must be a non-negative number",
        ));
    }
    if !offer.carbon_adjusted_rate.is_finite() || offer.carbon_adjusted_rate < 0.0 {
        return Err(WfapError::validation(
            "carbon_adjusted_rate",
            "must be a non-negative number",
        ));
    }
    if offer.repayment_period == 0 {
        return Err(WfapError::validation(
            "repayment_period",
            "must be a positive integer",
        ));
    }
    Ok(())
}

/// Boundary form of intent validation: `(valid, reason)`.
pub fn check_intent(intent: &Intent) -> (bool, Option<String>) {
    match validate_intent(intent) {
        Ok(()) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    }
}

/// Boundary form of offer validation: `(valid, reason)`.
pub fn check_offer(offer: &Offer) -> (bool, Option<String>) {
    match validate_offer(offer) {
        Ok(()) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_intent() -> Intent {
        Intent::new("company_x", 500_000.0, 24, "solar farm expansion", None)
    }

    fn sample_offer() -> Offer {
        Offer::new(
            "req_12345678",
            "lender_1",
            0.06,
            450_000.0,
            24,
            "Strong sustainability profile. ESG score: 0.85",
            0.055,
        )
    }

    #[test]
    fn intent_ids_are_prefixed_and_unique() {
        let a = sample_intent();
        let b = sample_intent();
        assert!(a.request_id.starts_with("req_"));
        assert_eq!(a.request_id.len(), "req_".len() + 8);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn intent_serialization_round_trip() {
        let intent = sample_intent();
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"purpose\":\"solar farm expansion\""));
        // Unsigned: no signature key on the wire.
        assert!(!json.contains("\"signature\""));

        let parsed: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, intent);
    }

    #[test]
    fn validate_intent_rejects_bad_fields() {
        let mut intent = sample_intent();
        intent.amount = 0.0;
        let err = validate_intent(&intent).unwrap_err();
        assert!(err.to_string().contains("amount"));

        let mut intent = sample_intent();
        intent.duration = 0;
        assert!(validate_intent(&intent).is_err());

        let mut intent = sample_intent();
        intent.purpose = "   ".to_string();
        let err = validate_intent(&intent).unwrap_err();
        assert!(err.to_string().contains("purpose"));

        let mut intent = sample_intent();
        intent.expected_income = Some(-1.0);
        assert!(validate_intent(&intent).is_err());
    }

    #[test]
    fn validate_offer_accepts_rejection_amount() {
        let mut offer = sample_offer();
        offer.amount_approved = 0.0;
        assert!(validate_offer(&offer).is_ok());
        assert!(offer.is_rejection());
    }

    #[test]
    fn validate_offer_rejects_negative_rate() {
        let mut offer = sample_offer();
        offer.interest_rate = -0.01;
        let (valid, reason) = check_offer(&offer);
        assert!(!valid);
        assert!(reason.unwrap().contains("interest_rate"));
    }
}
