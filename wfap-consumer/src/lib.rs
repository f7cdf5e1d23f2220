//! # wfap-consumer
//!
//! Consumer-side WFAP: broadcast a signed loan Intent to a set of lenders,
//! collect and verify their Offers, pick the best one under weighted
//! multi-criteria scoring, and optionally run one rate-negotiation round
//! with the chosen lender.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wfap_consumer::{Consumer, DecisionCriteria};
//! use wfap_core::SigningKey;
//! use wfap_lender::{presets, PolicyEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = SigningKey::new("shared-secret");
//!     let mut consumer = Consumer::new("company_42", key.clone());
//!     for policy in presets::all() {
//!         consumer = consumer.with_lender(Arc::new(PolicyEngine::new(policy, key.clone())));
//!     }
//!
//!     let intent = consumer.create_intent(500_000.0, 24, "solar farm expansion", None)?;
//!     let offers = consumer.request_offers(&intent).await?;
//!     let selection = consumer.select_best(offers, &DecisionCriteria::default())?;
//!     println!("{}", selection.reasoning);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod ingest;
pub mod selection;

pub use aggregator::collect_offers;
pub use ingest::{OfferInput, SanitizedOffer};
pub use selection::{
    select_best, DecisionCriteria, FactorScore, ScoreBreakdown, ScoredOffer, SelectionResult,
};

use std::sync::Arc;

use wfap_core::{Codec, Intent, Offer, SigningKey, WfapError, WfapResult};
use wfap_lender::{Lender, NegotiationOutcome};

/// High-level consumer-side facade over the full request/select/negotiate
/// round.
pub struct Consumer {
    company_id: String,
    codec: Codec,
    lenders: Vec<Arc<dyn Lender>>,
}

impl Consumer {
    pub fn new(company_id: impl Into<String>, key: SigningKey) -> Self {
        Self {
            company_id: company_id.into(),
            codec: Codec::new(key),
            lenders: Vec::new(),
        }
    }

    /// Register a lender to query.
    pub fn with_lender(mut self, lender: Arc<dyn Lender>) -> Self {
        self.lenders.push(lender);
        self
    }

    pub fn lenders(&self) -> &[Arc<dyn Lender>] {
        &self.lenders
    }

    /// Build a signed Intent for this consumer's company.
    pub fn create_intent(
        &self,
        amount: f64,
        duration: u32,
        purpose: &str,
        expected_income: Option<f64>,
    ) -> WfapResult<Intent> {
        self.codec
            .create_intent(&self.company_id, amount, duration, purpose, expected_income)
    }

    /// Query all registered lenders concurrently; failing lenders are
    /// skipped.
    pub async fn request_offers(&self, intent: &Intent) -> WfapResult<Vec<Offer>> {
        collect_offers(intent, &self.lenders, &self.codec).await
    }

    /// Score the offers and pick the best, recording a signed audit entry
    /// for the decision.
    pub fn select_best(
        &self,
        offers: Vec<Offer>,
        criteria: &DecisionCriteria,
    ) -> WfapResult<SelectionResult> {
        let inputs: Vec<OfferInput> = offers.into_iter().map(OfferInput::from).collect();
        let result = selection::select_best(&inputs, criteria)?;

        let audit = self.codec.create_audit_record(
            &self.company_id,
            "select_best_offer",
            serde_json::json!({
                "selected_offer_id": result.best.offer.offer_id,
                "selected_lender_id": result.best.offer.lender_id,
                "total_score": result.best.total_score,
                "candidates": result.all.len(),
                "dropped": result.diagnostics.len(),
            }),
        )?;
        tracing::debug!(log_id = %audit.log_id, "selection audited");

        Ok(result)
    }

    /// One bounded rate-reduction round with the named lender.
    pub fn negotiate(
        &self,
        lender_id: &str,
        current: &Offer,
        target_rate: f64,
    ) -> WfapResult<NegotiationOutcome> {
        let lender = self
            .lenders
            .iter()
            .find(|l| l.lender_id() == lender_id)
            .ok_or_else(|| {
                WfapError::validation("lender_id", format!("unknown lender: {lender_id}"))
            })?;
        lender.negotiate(current, target_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfap_lender::{presets, PolicyEngine};

    fn key() -> SigningKey {
        SigningKey::new("wfap_test_secret")
    }

    fn consumer() -> Consumer {
        let mut consumer = Consumer::new("company_x", key());
        for policy in presets::all() {
            consumer = consumer.with_lender(Arc::new(PolicyEngine::new(policy, key())));
        }
        consumer
    }

    #[tokio::test]
    async fn full_round_selects_a_signed_offer() {
        let consumer = consumer();
        let intent = consumer
            .create_intent(500_000.0, 24, "solar farm expansion", None)
            .unwrap();
        let offers = consumer.request_offers(&intent).await.unwrap();
        assert_eq!(offers.len(), 3);

        let selection = consumer
            .select_best(offers, &DecisionCriteria::default())
            .unwrap();
        assert!(selection.best.offer.lender_id.is_some());
        assert!(selection.best.total_score > 0.0);
        assert!(!selection.reasoning.is_empty());
    }

    #[tokio::test]
    async fn negotiation_targets_the_selected_lender() {
        let consumer = consumer();
        let intent = consumer
            .create_intent(500_000.0, 24, "solar farm expansion", None)
            .unwrap();
        let offers = consumer.request_offers(&intent).await.unwrap();
        let selection = consumer
            .select_best(offers.clone(), &DecisionCriteria::default())
            .unwrap();

        let lender_id = selection.best.offer.lender_id.clone().unwrap();
        let current = offers
            .iter()
            .find(|o| o.lender_id == lender_id)
            .unwrap();
        let outcome = consumer
            .negotiate(&lender_id, current, current.interest_rate - 0.001)
            .unwrap();
        match outcome {
            NegotiationOutcome::Agreed { offer, new_rate } => {
                assert!(new_rate < current.interest_rate);
                assert_eq!(offer.lender_id, lender_id);
            }
            NegotiationOutcome::Refused { floor_rate, .. } => {
                // Already at the lender's floor.
                assert!(current.interest_rate <= floor_rate);
            }
        }
    }

    #[test]
    fn unknown_lender_is_a_validation_error() {
        let consumer = consumer();
        let offer = Codec::new(key())
            .create_offer("req_12345678", "lender_9", 0.06, 100.0, 12, "ESG score: 0.5.", 0.06)
            .unwrap();
        let err = consumer.negotiate("lender_9", &offer, 0.05).unwrap_err();
        assert!(matches!(err, WfapError::Validation { ref field, .. } if field == "lender_id"));
    }
}
