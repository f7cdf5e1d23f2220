//! Per-lender policy configuration.
//!
//! Every lender is the same generic [`crate::PolicyEngine`] instantiated with
//! different configuration data: rule tables, exclusion lists, risk-appetite
//! adjustments, and negotiation bounds. Policies are loaded at process start
//! and never mutated at runtime.

/// One purpose-pricing rule: a keyword mapped to an amount multiplier and an
/// interest delta. Multipliers combine multiplicatively across matching
/// rules, deltas additively.
#[derive(Debug, Clone, PartialEq)]
pub struct PurposeRule {
    pub keyword: String,
    pub amount_multiplier: f64,
    pub interest_delta: f64,
}

impl PurposeRule {
    pub fn new(keyword: impl Into<String>, amount_multiplier: f64, interest_delta: f64) -> Self {
        Self {
            keyword: keyword.into(),
            amount_multiplier,
            interest_delta,
        }
    }
}

/// A signed risk-score adjustment applied when the purpose matches any of
/// the listed keywords. Positive deltas reward favored sectors, negative
/// deltas penalize them.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAdjustment {
    pub keywords: Vec<String>,
    pub delta: i32,
}

impl RiskAdjustment {
    pub fn new(keywords: &[&str], delta: i32) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            delta,
        }
    }
}

/// Risk-appetite configuration for one lender.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfile {
    /// Keyword-driven adjustments to the base risk score.
    pub adjustments: Vec<RiskAdjustment>,
    /// Optional penalty for requests above an amount threshold:
    /// `(threshold, delta)`.
    pub large_amount_penalty: Option<(f64, i32)>,
    /// Ceiling K of the risk premium: `premium = (1 - score/100) * K`.
    pub premium_ceiling: f64,
}

/// Flat interest discount for long-duration growth financing, applied before
/// the purpose-rule walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthDiscount {
    /// Minimum duration in months for the discount to apply.
    pub min_duration: u32,
    pub discount: f64,
}

/// Bounds of the one-step rate-reduction protocol for one lender.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegotiationTerms {
    /// Absolute rate floor the lender never goes below.
    pub min_rate: f64,
    /// Largest reduction granted in a single negotiation round.
    pub max_reduction: f64,
}

/// Static per-lender configuration.
#[derive(Debug, Clone)]
pub struct LenderPolicy {
    pub lender_id: String,
    pub lender_name: String,
    pub max_loan_amount: f64,
    pub min_interest_rate: f64,
    pub max_interest_rate: f64,
    pub min_credit_score: u32,
    /// Keyword exclusion list; a match rejects the request outright.
    pub excluded_industries: Vec<String>,
    pub esg_weight: f64,
    /// Keyword -> (amount multiplier, interest delta) pricing table.
    pub purpose_rules: Vec<PurposeRule>,
    /// Risk score at or above which approval is recommended.
    pub approval_threshold: u32,
    pub risk_profile: RiskProfile,
    pub growth_discount: Option<GrowthDiscount>,
    pub negotiation: NegotiationTerms,
    /// ESG summary templates by score band: high (>= 0.7), mid (>= 0.4), low.
    pub summary_templates: [String; 3],
}

impl LenderPolicy {
    /// Midpoint of the lender's rate range, the base for carbon adjustment.
    pub fn base_rate(&self) -> f64 {
        (self.min_interest_rate + self.max_interest_rate) / 2.0
    }

    /// Excluded-industry keywords present in the purpose
    /// (case-insensitive substring match).
    pub fn excluded_matches(&self, purpose: &str) -> Vec<&str> {
        let purpose = purpose.to_lowercase();
        self.excluded_industries
            .iter()
            .filter(|industry| purpose.contains(&industry.to_lowercase()))
            .map(String::as_str)
            .collect()
    }

    /// Template for the given ESG score band.
    pub fn summary_template(&self, esg_score: f64) -> &str {
        if esg_score >= 0.7 {
            &self.summary_templates[0]
        } else if esg_score >= 0.4 {
            &self.summary_templates[1]
        } else {
            &self.summary_templates[2]
        }
    }
}
