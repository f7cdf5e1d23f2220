//! ESG scoring and carbon-rate adjustment.
//!
//! Deterministic keyword heuristics shared by the lender-side policy engines
//! (scoring a stated purpose) and the consumer-side selection engine
//! (recovering a score from an offer's ESG summary text).

use regex::Regex;
use std::sync::OnceLock;

/// Purpose keywords with a positive environmental impact.
const POSITIVE_KEYWORDS: &[(&str, f64)] = &[
    ("solar", 0.30),
    ("wind", 0.25),
    ("renewable", 0.20),
    ("sustainable", 0.15),
    ("green", 0.10),
    ("ev", 0.20),
    ("electric vehicle", 0.20),
    ("carbon", 0.15),
    ("emission", 0.10),
    ("environment", 0.10),
    ("clean", 0.15),
    ("energy efficiency", 0.20),
];

/// Purpose keywords with a negative environmental impact.
const NEGATIVE_KEYWORDS: &[(&str, f64)] = &[
    ("fossil", -0.30),
    ("coal", -0.40),
    ("oil", -0.30),
    ("mining", -0.25),
    ("pollution", -0.30),
    ("waste", -0.20),
    ("deforestation", -0.40),
    ("high emission", -0.30),
];

/// Purpose categories granting an extra carbon-rate discount.
/// First matching category wins.
const CATEGORY_BONUSES: &[(&[&str], f64)] = &[
    (&["solar", "wind", "renewable"], 0.015),
    (&["ev", "electric vehicle", "sustainable"], 0.010),
    (&["tech", "innovation", "digital"], 0.005),
];

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Heuristic ESG score for a stated purpose, in `[0.1, 1.0]`.
///
/// Starts neutral at 0.5, applies fixed keyword deltas, clamps, rounds to
/// 2 decimals.
pub fn esg_score(purpose: &str) -> f64 {
    let purpose = purpose.to_lowercase();
    let mut score = 0.5;

    for (keyword, delta) in POSITIVE_KEYWORDS.iter().chain(NEGATIVE_KEYWORDS) {
        if purpose.contains(keyword) {
            score += delta;
        }
    }

    round_to(score.clamp(0.1, 1.0), 2)
}

/// Carbon-adjusted interest rate: the base rate reduced by an ESG discount
/// (up to 3%) plus a purpose-category bonus. Never negative; rounded to
/// 4 decimals.
pub fn carbon_adjusted_rate(base_rate: f64, esg_score: f64, purpose: &str) -> f64 {
    let purpose = purpose.to_lowercase();
    let esg_discount = esg_score * 0.03;

    let purpose_bonus = CATEGORY_BONUSES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| purpose.contains(k)))
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0);

    round_to((base_rate - esg_discount - purpose_bonus).max(0.0), 4)
}

fn score_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // A bare [0-9.] class would swallow a trailing sentence period
            // ("ESG score: 0.80.") and break the parse.
            Regex::new(r"esg[\s_-]*score[\s:]*([0-9]+(?:\.[0-9]+)?)").unwrap(),
            Regex::new(r"score[\s:]*([0-9]+(?:\.[0-9]+)?)").unwrap(),
            Regex::new(r"rating[\s:]*([0-9]+(?:\.[0-9]+)?)").unwrap(),
        ]
    })
}

/// Recover an ESG score from free-form summary text, in `[0.1, 1.0]`.
///
/// Tries numeric patterns first (`ESG score: 0.85`, `rating: 7`; values
/// above 1 are treated as a 10-point scale), then falls back to sentiment
/// keywords.
pub fn extract_esg_score(summary: &str) -> f64 {
    let lower = summary.to_lowercase();

    for pattern in score_patterns() {
        if let Some(caps) = pattern.captures(&lower) {
            if let Ok(score) = caps[1].parse::<f64>() {
                let score = if score > 1.0 { score / 10.0 } else { score };
                return score.clamp(0.1, 1.0);
            }
        }
    }

    let positive = ["excellent", "outstanding", "strong", "good", "positive"];
    let negative = ["poor", "weak", "negative", "concern", "risk"];

    let mut score: f64 = 0.5;
    for keyword in positive {
        if lower.contains(keyword) {
            score += 0.1;
        }
    }
    for keyword in negative {
        if lower.contains(keyword) {
            score -= 0.1;
        }
    }

    score.clamp(0.1, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solar_scores_high() {
        // 0.5 + 0.30 (solar) = 0.8
        assert_eq!(esg_score("solar farm expansion"), 0.8);
    }

    #[test]
    fn fossil_mining_scores_low() {
        // 0.5 - 0.30 (fossil) - 0.25 (mining) = -0.05 -> clamped to 0.1
        assert_eq!(esg_score("fossil fuel mining expansion"), 0.1);
    }

    #[test]
    fn neutral_purpose_stays_neutral() {
        assert_eq!(esg_score("office furniture purchase"), 0.5);
    }

    #[test]
    fn score_is_clamped_to_one() {
        assert_eq!(
            esg_score("solar wind renewable sustainable green clean project"),
            1.0
        );
    }

    #[test]
    fn carbon_rate_applies_esg_and_category_discounts() {
        // base 0.0825, esg 0.8 -> 0.024 discount, solar category -> 0.015
        let rate = carbon_adjusted_rate(0.0825, 0.8, "solar farm expansion");
        assert_eq!(rate, 0.0435);
    }

    #[test]
    fn carbon_rate_first_category_only() {
        // Matches both renewable (0.015) and tech (0.005); only 0.015 applies.
        let with_both = carbon_adjusted_rate(0.10, 0.5, "solar tech platform");
        let renewable_only = carbon_adjusted_rate(0.10, 0.5, "solar platform");
        assert_eq!(with_both, renewable_only);
    }

    #[test]
    fn carbon_rate_never_negative() {
        assert_eq!(carbon_adjusted_rate(0.01, 1.0, "solar"), 0.0);
    }

    #[test]
    fn extract_prefers_explicit_score() {
        assert_eq!(extract_esg_score("Strong profile. ESG score: 0.85"), 0.85);
    }

    #[test]
    fn extract_ignores_trailing_sentence_period() {
        // Lender summaries end the score sentence with a period; the number
        // must still win over the sentiment keywords around it.
        let summary =
            "Excellent ESG alignment with outstanding environmental leadership. ESG score: 0.80.";
        assert_eq!(extract_esg_score(summary), 0.8);
    }

    #[test]
    fn extract_scales_ten_point_ratings() {
        assert_eq!(extract_esg_score("rating: 7"), 0.7);
    }

    #[test]
    fn extract_falls_back_to_sentiment() {
        let score = extract_esg_score("Excellent alignment, strong impact expected");
        assert!((score - 0.7).abs() < 1e-9);

        let score = extract_esg_score("Significant concern over pollution risk");
        assert!((score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn extract_clamps_low_end() {
        assert_eq!(extract_esg_score(""), 0.5);
        assert_eq!(extract_esg_score("esg score: 0.01"), 0.1);
    }
}
