//! Defensive offer ingestion.
//!
//! Lender responses arrive as typed offers, loose JSON, or free text with a
//! JSON object embedded somewhere inside. Everything is funneled through
//! [`sanitize`], which extracts the scoring fields under permissive aliases
//! and replaces missing or nonsensical values with worst-case defaults, so a
//! half-broken offer competes badly instead of crashing the evaluation.

use serde_json::Value;
use wfap_core::{Offer, ParseDiagnostic};

/// Rate substituted when a carbon-adjusted rate is missing or non-positive.
/// High enough to push the offer to the bottom of any ranking.
pub const PENALTY_CARBON_RATE: f64 = 1.0;
/// Rate substituted when an interest rate is missing or non-positive.
pub const PENALTY_INTEREST_RATE: f64 = 100.0;

/// One lender response in whatever shape it arrived.
#[derive(Debug, Clone)]
pub enum OfferInput {
    Offer(Offer),
    Value(Value),
    Text(String),
}

impl From<Offer> for OfferInput {
    fn from(offer: Offer) -> Self {
        Self::Offer(offer)
    }
}

impl From<Value> for OfferInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for OfferInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OfferInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// An offer reduced to the fields scoring needs, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedOffer {
    pub offer_id: Option<String>,
    pub lender_id: Option<String>,
    pub carbon_adjusted_rate: f64,
    pub amount_approved: f64,
    pub interest_rate: f64,
    pub esg_summary: String,
    pub repayment_period: u32,
}

/// Extract and bound-check one offer. Failures carry the input index so the
/// caller can report which entry of the batch was dropped.
pub fn sanitize(index: usize, input: &OfferInput) -> Result<SanitizedOffer, ParseDiagnostic> {
    let object = match input {
        OfferInput::Offer(offer) => {
            return Ok(SanitizedOffer {
                offer_id: Some(offer.offer_id.clone()),
                lender_id: Some(offer.lender_id.clone()),
                carbon_adjusted_rate: bounded_rate(offer.carbon_adjusted_rate, PENALTY_CARBON_RATE),
                amount_approved: offer.amount_approved.max(0.0),
                interest_rate: bounded_rate(offer.interest_rate, PENALTY_INTEREST_RATE),
                esg_summary: offer.esg_summary.clone(),
                repayment_period: offer.repayment_period,
            });
        }
        OfferInput::Value(value) => value
            .as_object()
            .cloned()
            .ok_or_else(|| diagnostic(index, "offer is not a JSON object"))?,
        OfferInput::Text(text) => extract_object(text)
            .ok_or_else(|| diagnostic(index, "unable to parse JSON from text"))?,
    };

    let object = Value::Object(object);
    Ok(SanitizedOffer {
        offer_id: string_field(&object, &["offer_id"]),
        lender_id: string_field(&object, &["lender_id", "bank_id"]),
        carbon_adjusted_rate: bounded_rate(
            numeric_field(&object, &["carbon_adjusted_rate", "carbon_rate"])
                .unwrap_or(PENALTY_CARBON_RATE),
            PENALTY_CARBON_RATE,
        ),
        amount_approved: numeric_field(&object, &["amount_approved", "amount"])
            .unwrap_or(0.0)
            .max(0.0),
        interest_rate: bounded_rate(
            numeric_field(&object, &["interest_rate", "rate"]).unwrap_or(PENALTY_INTEREST_RATE),
            PENALTY_INTEREST_RATE,
        ),
        esg_summary: string_field(&object, &["esg_summary", "esg"]).unwrap_or_default(),
        repayment_period: numeric_field(&object, &["repayment_period", "duration"])
            .map(|p| if p < 0.0 { 0 } else { p as u32 })
            .unwrap_or(0),
    })
}

fn diagnostic(index: usize, reason: &str) -> ParseDiagnostic {
    ParseDiagnostic {
        index,
        reason: reason.to_string(),
    }
}

/// Non-positive rates mean the field was absent or garbage; substitute the
/// penalty rate so the offer still ranks, badly.
fn bounded_rate(rate: f64, penalty: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        penalty
    }
}

/// Parse a JSON object from free text: the whole string first, then the
/// outermost `{...}` span if the message wraps the object in prose.
fn extract_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str(text) {
        return Some(map);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn string_field(object: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| object.get(*name))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// First present field among `names`, coerced to f64. Numeric strings such
/// as `"0.05"` are accepted.
fn numeric_field(object: &Value, names: &[&str]) -> Option<f64> {
    let value = names.iter().find_map(|name| object.get(*name))?;
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wfap_core::{Codec, SigningKey};

    fn typed_offer() -> Offer {
        Codec::new(SigningKey::new("wfap_test_secret"))
            .create_offer("req_12345678", "lender_1", 0.05, 450_000.0, 24, "ESG score: 0.8.", 0.045)
            .unwrap()
    }

    #[test]
    fn typed_offer_passes_through() {
        let sanitized = sanitize(0, &typed_offer().into()).unwrap();
        assert_eq!(sanitized.lender_id.as_deref(), Some("lender_1"));
        assert_eq!(sanitized.carbon_adjusted_rate, 0.045);
        assert_eq!(sanitized.amount_approved, 450_000.0);
        assert_eq!(sanitized.repayment_period, 24);
    }

    #[test]
    fn json_value_with_alias_fields() {
        let value = json!({
            "offer_id": "off_aabbccdd",
            "bank_id": "lender_2",
            "carbon_rate": 0.052,
            "amount": 300_000.0,
            "rate": 0.055,
            "esg": "Good ESG foundation.",
            "duration": 36
        });
        let sanitized = sanitize(0, &value.into()).unwrap();
        assert_eq!(sanitized.lender_id.as_deref(), Some("lender_2"));
        assert_eq!(sanitized.carbon_adjusted_rate, 0.052);
        assert_eq!(sanitized.amount_approved, 300_000.0);
        assert_eq!(sanitized.interest_rate, 0.055);
        assert_eq!(sanitized.repayment_period, 36);
    }

    #[test]
    fn embedded_json_in_prose_is_extracted() {
        let text = r#"Here is our offer: {"lender_id": "lender_3", "interest_rate": 0.07, "amount_approved": 600000, "carbon_adjusted_rate": 0.065, "repayment_period": 24} — regards."#;
        let sanitized = sanitize(2, &text.into()).unwrap();
        assert_eq!(sanitized.lender_id.as_deref(), Some("lender_3"));
        assert_eq!(sanitized.interest_rate, 0.07);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let value = json!({"interest_rate": "0.06", "amount_approved": "250000"});
        let sanitized = sanitize(0, &value.into()).unwrap();
        assert_eq!(sanitized.interest_rate, 0.06);
        assert_eq!(sanitized.amount_approved, 250_000.0);
    }

    #[test]
    fn missing_rates_get_penalty_defaults() {
        let sanitized = sanitize(0, &json!({"amount_approved": 100.0}).into()).unwrap();
        assert_eq!(sanitized.carbon_adjusted_rate, PENALTY_CARBON_RATE);
        assert_eq!(sanitized.interest_rate, PENALTY_INTEREST_RATE);
        assert!(sanitized.lender_id.is_none());
    }

    #[test]
    fn negative_values_are_floored() {
        let value = json!({
            "carbon_adjusted_rate": -0.5,
            "interest_rate": 0.0,
            "amount_approved": -100.0,
            "repayment_period": -3
        });
        let sanitized = sanitize(0, &value.into()).unwrap();
        assert_eq!(sanitized.carbon_adjusted_rate, PENALTY_CARBON_RATE);
        assert_eq!(sanitized.interest_rate, PENALTY_INTEREST_RATE);
        assert_eq!(sanitized.amount_approved, 0.0);
        assert_eq!(sanitized.repayment_period, 0);
    }

    #[test]
    fn garbage_text_is_rejected_with_index() {
        let err = sanitize(4, &"no json here at all".into()).unwrap_err();
        assert_eq!(err.index, 4);
        assert!(err.reason.contains("parse"));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = sanitize(1, &json!([1, 2, 3]).into()).unwrap_err();
        assert_eq!(err.index, 1);
    }
}
