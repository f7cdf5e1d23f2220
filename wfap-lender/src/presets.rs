//! Built-in lender configurations.
//!
//! Three lenders with distinct risk appetites, all running the same generic
//! engine: a green-financing specialist, a conservative traditional bank,
//! and an innovation-focused growth lender.

use crate::policy::{
    GrowthDiscount, LenderPolicy, NegotiationTerms, PurposeRule, RiskAdjustment, RiskProfile,
};

fn rules(table: &[(&str, f64, f64)]) -> Vec<PurposeRule> {
    table
        .iter()
        .map(|(keyword, multiplier, delta)| PurposeRule::new(*keyword, *multiplier, *delta))
        .collect()
}

fn templates(high: &str, mid: &str, low: &str) -> [String; 3] {
    [high.to_string(), mid.to_string(), low.to_string()]
}

/// EcoGreen Financial: strict ESG focus, generous green discounts.
pub fn eco_green() -> LenderPolicy {
    LenderPolicy {
        lender_id: "lender_1".to_string(),
        lender_name: "EcoGreen Financial".to_string(),
        max_loan_amount: 1_500_000.0,
        min_interest_rate: 0.045,
        max_interest_rate: 0.12,
        min_credit_score: 680,
        excluded_industries: vec![
            "fossil fuels".to_string(),
            "mining".to_string(),
            "deforestation".to_string(),
            "high-pollution".to_string(),
        ],
        esg_weight: 0.6,
        purpose_rules: rules(&[
            // Highly preferred green sectors.
            ("solar", 1.05, -0.01),
            ("renewable", 1.05, -0.01),
            ("sustainable", 1.05, -0.01),
            ("wind", 1.03, -0.008),
            ("reforestation", 1.02, -0.005),
            ("ev", 1.02, -0.005),
            ("battery", 1.02, -0.005),
            ("hydrogen", 1.01, -0.003),
            // Neutral.
            ("manufacturing", 0.95, 0.0),
            ("infrastructure", 0.95, 0.0),
            ("equipment", 0.95, 0.0),
            // Less preferred: shrink the grant, raise the rate.
            ("fossil", 0.5, 0.04),
            ("tobacco", 0.5, 0.05),
            ("gambling", 0.6, 0.04),
            ("crypto", 0.6, 0.04),
            ("waste", 0.9, 0.01),
            ("speculative", 0.7, 0.03),
            ("startup", 0.85, 0.02),
            ("expansion", 0.95, 0.01),
            ("refinance", 0.9, 0.005),
        ]),
        approval_threshold: 55,
        risk_profile: RiskProfile {
            adjustments: vec![RiskAdjustment::new(&["solar", "renewable", "sustainable"], 15)],
            large_amount_penalty: None,
            premium_ceiling: 0.02,
        },
        growth_discount: None,
        negotiation: NegotiationTerms {
            min_rate: 0.045,
            max_reduction: 0.005,
        },
        summary_templates: templates(
            "Excellent ESG alignment with outstanding environmental leadership.",
            "Good ESG foundation meeting high environmental standards.",
            "Weak ESG profile; significant environmental concerns identified.",
        ),
    }
}

/// Traditional Trust Bank: conservative, risk-averse, low ESG emphasis.
pub fn traditional_trust() -> LenderPolicy {
    LenderPolicy {
        lender_id: "lender_2".to_string(),
        lender_name: "Traditional Trust Bank".to_string(),
        max_loan_amount: 750_000.0,
        min_interest_rate: 0.048,
        max_interest_rate: 0.12,
        min_credit_score: 700,
        excluded_industries: vec![
            "crypto".to_string(),
            "gambling".to_string(),
            "tobacco".to_string(),
            "high-risk tech".to_string(),
            "speculative".to_string(),
        ],
        esg_weight: 0.2,
        purpose_rules: rules(&[
            // Established, collateralized uses.
            ("equipment", 0.95, 0.0),
            ("property", 1.0, -0.005),
            ("real estate", 1.0, -0.005),
            ("refinance", 1.0, -0.005),
            ("infrastructure", 0.95, 0.0),
            ("manufacturing", 0.95, 0.0),
            // Growth plays priced cautiously.
            ("expansion", 0.9, 0.01),
            ("solar", 1.0, -0.005),
            ("renewable", 1.0, -0.005),
            // Unproven ventures.
            ("startup", 0.7, 0.03),
            ("experimental", 0.7, 0.03),
            ("new market", 0.8, 0.02),
            ("fossil", 0.8, 0.02),
            ("waste", 0.9, 0.01),
        ]),
        approval_threshold: 70,
        risk_profile: RiskProfile {
            adjustments: vec![RiskAdjustment::new(&["new", "experimental", "startup"], -20)],
            large_amount_penalty: Some((300_000.0, -10)),
            premium_ceiling: 0.02,
        },
        growth_discount: None,
        negotiation: NegotiationTerms {
            min_rate: 0.05,
            max_reduction: 0.003,
        },
        summary_templates: templates(
            "Standard ESG compliance meeting basic environmental requirements.",
            "Moderate ESG assessment requiring standard due diligence.",
            "Below-standard ESG profile requiring enhanced due diligence.",
        ),
    }
}

/// InnovateTech Financial: tech-focused, risk-tolerant, growth discounts.
pub fn innovate_tech() -> LenderPolicy {
    LenderPolicy {
        lender_id: "lender_3".to_string(),
        lender_name: "InnovateTech Financial".to_string(),
        max_loan_amount: 2_000_000.0,
        min_interest_rate: 0.055,
        max_interest_rate: 0.18,
        min_credit_score: 620,
        excluded_industries: vec![
            "fossil fuels".to_string(),
            "weapons".to_string(),
            "tobacco".to_string(),
            "declining industries".to_string(),
        ],
        esg_weight: 0.4,
        purpose_rules: rules(&[
            // Strong support for tech and AI.
            ("tech", 1.05, -0.015),
            ("ai", 1.05, -0.015),
            ("innovation", 1.04, -0.012),
            ("digital", 1.03, -0.01),
            ("software", 1.03, -0.01),
            ("saas", 1.03, -0.01),
            // Hardware and manufacturing get moderate support.
            ("manufacturing", 0.95, 0.01),
            ("equipment", 0.95, 0.01),
            ("infrastructure", 0.95, 0.005),
            // Green tech combines benefits.
            ("solar", 1.03, -0.01),
            ("renewable", 1.03, -0.01),
            ("ev", 1.02, -0.008),
            // Risky categories.
            ("crypto", 0.6, 0.04),
            ("speculative", 0.7, 0.03),
            ("startup", 0.9, 0.02),
        ]),
        approval_threshold: 45,
        risk_profile: RiskProfile {
            adjustments: vec![RiskAdjustment::new(&["tech", "ai", "innovation", "digital"], 25)],
            large_amount_penalty: None,
            premium_ceiling: 0.015,
        },
        growth_discount: Some(GrowthDiscount {
            min_duration: 30,
            discount: 0.02,
        }),
        negotiation: NegotiationTerms {
            min_rate: 0.04,
            max_reduction: 0.007,
        },
        summary_templates: templates(
            "Innovation-focused ESG with high potential for future sustainability impact.",
            "Tech-driven ESG profile combining innovation with environmental considerations.",
            "Limited ESG alignment; innovation value outweighs sustainability profile.",
        ),
    }
}

/// All built-in lender policies.
pub fn all() -> Vec<LenderPolicy> {
    vec![eco_green(), traditional_trust(), innovate_tech()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lender_ids_are_unique() {
        let policies = all();
        let mut ids: Vec<_> = policies.iter().map(|p| p.lender_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), policies.len());
    }

    #[test]
    fn rate_ranges_are_well_formed() {
        for policy in all() {
            assert!(policy.min_interest_rate > 0.0, "{}", policy.lender_id);
            assert!(
                policy.min_interest_rate < policy.max_interest_rate,
                "{}",
                policy.lender_id
            );
            assert!(policy.max_loan_amount > 0.0, "{}", policy.lender_id);
        }
    }

    #[test]
    fn negotiation_floors_respect_policy_floors() {
        for policy in all() {
            assert!(
                policy.negotiation.min_rate <= policy.max_interest_rate,
                "{}",
                policy.lender_id
            );
            assert!(policy.negotiation.max_reduction > 0.0, "{}", policy.lender_id);
        }
    }

    #[test]
    fn purpose_rule_multipliers_are_positive() {
        for policy in all() {
            for rule in &policy.purpose_rules {
                assert!(rule.amount_multiplier > 0.0, "{}", rule.keyword);
            }
        }
    }
}
