//! The generic per-lender policy engine.
//!
//! `PolicyEngine` is a pure function from a signed Intent to a signed Offer,
//! parameterized entirely by [`LenderPolicy`] configuration data. Three
//! lenders means three engine instances with three policies, never three
//! engine implementations.

use wfap_core::{esg, message, Codec, Intent, Offer, SigningKey, WfapResult};

use crate::negotiation::{NegotiationHandler, NegotiationOutcome};
use crate::policy::LenderPolicy;

/// Seam consumed by the aggregator: any offer-producing lender.
///
/// In-process engines implement this directly; a remote lender would
/// implement it over an RPC stub.
pub trait Lender: Send + Sync {
    fn lender_id(&self) -> &str;

    /// Produce a signed Offer for the Intent.
    fn evaluate(&self, intent: &Intent) -> WfapResult<Offer>;

    /// One bounded rate-reduction round against an already-issued offer.
    fn negotiate(&self, current: &Offer, target_rate: f64) -> WfapResult<NegotiationOutcome>;
}

/// Outcome of the lender's internal risk scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    /// Risk score in [0, 100]; higher means safer.
    pub risk_score: u32,
    /// Rate premium derived from the score, `>= 0`.
    pub risk_premium: f64,
    /// Whether the score clears the lender's approval threshold.
    pub recommended: bool,
}

/// Deterministic per-lender policy engine.
pub struct PolicyEngine {
    policy: LenderPolicy,
    codec: Codec,
    negotiation: NegotiationHandler,
}

impl PolicyEngine {
    /// Create an engine for one lender, signing with the shared secret.
    pub fn new(policy: LenderPolicy, key: SigningKey) -> Self {
        let negotiation = NegotiationHandler::new(policy.negotiation);
        Self {
            policy,
            codec: Codec::new(key),
            negotiation,
        }
    }

    pub fn policy(&self) -> &LenderPolicy {
        &self.policy
    }

    /// Risk scoring: base score from the requested amount, adjusted by the
    /// lender's keyword appetite and large-amount penalty, clamped to
    /// [0, 100]. The premium grows as the score falls.
    pub fn assess_risk(&self, intent: &Intent) -> RiskAssessment {
        let purpose = intent.purpose.to_lowercase();
        let profile = &self.policy.risk_profile;

        let mut score = 100 - (intent.amount / 100_000.0).floor() as i64;
        score = score.clamp(0, 100);

        for adjustment in &profile.adjustments {
            if adjustment.keywords.iter().any(|k| purpose.contains(k)) {
                score += i64::from(adjustment.delta);
            }
        }
        if let Some((threshold, delta)) = profile.large_amount_penalty {
            if intent.amount > threshold {
                score += i64::from(delta);
            }
        }

        let risk_score = score.clamp(0, 100) as u32;
        let risk_premium =
            ((1.0 - f64::from(risk_score) / 100.0) * profile.premium_ceiling).max(0.0);

        RiskAssessment {
            risk_score,
            risk_premium,
            recommended: risk_score >= self.policy.approval_threshold,
        }
    }

    /// Evaluate an Intent into a signed Offer.
    ///
    /// Malformed intents fail with a validation error naming the offending
    /// field before any scoring is applied.
    pub fn evaluate(&self, intent: &Intent) -> WfapResult<Offer> {
        message::validate_intent(intent)?;

        let purpose = intent.purpose.to_lowercase();

        // Exclusion check short-circuits all scoring.
        let excluded = self.policy.excluded_matches(&intent.purpose);
        if !excluded.is_empty() {
            let summary = format!(
                "Loan rejected due to excluded industry: {}",
                excluded.join(", ")
            );
            tracing::info!(
                lender = %self.policy.lender_id,
                request = %intent.request_id,
                excluded = ?excluded,
                "rejecting intent"
            );
            return self.codec.create_offer(
                &intent.request_id,
                &self.policy.lender_id,
                self.policy.max_interest_rate,
                0.0,
                intent.duration,
                summary,
                self.policy.max_interest_rate,
            );
        }

        let esg_score = esg::esg_score(&intent.purpose);
        let carbon_rate =
            esg::carbon_adjusted_rate(self.policy.base_rate(), esg_score, &intent.purpose);
        let risk = self.assess_risk(intent);

        // Growth discount applies before the purpose-rule walk.
        let mut interest_delta = match self.policy.growth_discount {
            Some(g) if intent.duration >= g.min_duration => -g.discount,
            _ => 0.0,
        };
        let mut amount_multiplier = 1.0;
        for rule in &self.policy.purpose_rules {
            if purpose.contains(&rule.keyword) {
                amount_multiplier *= rule.amount_multiplier;
                interest_delta += rule.interest_delta;
            }
        }

        let mut amount_approved = self
            .policy
            .max_loan_amount
            .min((intent.amount * amount_multiplier).max(0.0))
            .floor();
        // A cautious multiplier never grants more than was asked for.
        if amount_multiplier <= 1.0 {
            amount_approved = amount_approved.min(intent.amount);
        }

        let interest_rate = (carbon_rate + risk.risk_premium + interest_delta)
            .clamp(self.policy.min_interest_rate, self.policy.max_interest_rate);

        let mut summary = format!(
            "{} ESG score: {:.2}.",
            self.policy.summary_template(esg_score),
            esg_score
        );

        // Affordability clamp against stated income, simple interest over
        // the full duration.
        if let Some(income) = intent.expected_income.filter(|i| *i > 0.0) {
            let duration = f64::from(intent.duration);
            let interest_factor = 1.0 + interest_rate * duration / 12.0;
            let monthly_payment = amount_approved * interest_factor / duration;
            let income_threshold = monthly_payment * 3.0;

            if income < income_threshold && amount_approved > 0.0 {
                let max_affordable = (income / 3.0) * duration / interest_factor;
                let factor = (max_affordable / amount_approved).min(1.0);
                amount_approved = (amount_approved * factor).floor();
                summary.push_str(&format!(
                    " Loan amount reduced due to insufficient expected income (${:.0} < required ${:.0}).",
                    income, income_threshold
                ));
            }
        }

        tracing::debug!(
            lender = %self.policy.lender_id,
            request = %intent.request_id,
            esg_score,
            carbon_rate,
            risk_score = risk.risk_score,
            amount_approved,
            "evaluated intent"
        );

        self.codec.create_offer(
            &intent.request_id,
            &self.policy.lender_id,
            round4(interest_rate),
            amount_approved,
            intent.duration,
            summary,
            carbon_rate,
        )
    }
}

impl Lender for PolicyEngine {
    fn lender_id(&self) -> &str {
        &self.policy.lender_id
    }

    fn evaluate(&self, intent: &Intent) -> WfapResult<Offer> {
        PolicyEngine::evaluate(self, intent)
    }

    fn negotiate(&self, current: &Offer, target_rate: f64) -> WfapResult<NegotiationOutcome> {
        self.negotiation.negotiate(&self.codec, current, target_rate)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
