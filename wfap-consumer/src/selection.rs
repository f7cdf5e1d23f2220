//! Multi-criteria offer selection.
//!
//! Every sanitized offer is scored on five factors, each normalized against
//! the best value in the batch and weighted by the caller's criteria. Rates
//! score reciprocally (lower is better), the interest factor is ranked
//! linearly between the batch's best and worst rate, and offers that arrive
//! without a lender identity are docked a confidence penalty. The result
//! carries a full per-factor breakdown and a human-readable reasoning trace.

use wfap_core::{esg, ParseDiagnostic, WfapError, WfapResult};

use crate::ingest::{self, OfferInput, SanitizedOffer};

/// Multiplier applied to the total score of an offer missing a lender id.
const MISSING_LENDER_PENALTY: f64 = 0.9;

/// Relative importance of each scoring factor. Weights need not sum to one;
/// they are normalized before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionCriteria {
    pub carbon_adjusted_rate: f64,
    pub amount_approved: f64,
    pub esg_score: f64,
    pub interest_rate: f64,
    pub repayment_period: f64,
}

impl Default for DecisionCriteria {
    fn default() -> Self {
        Self {
            carbon_adjusted_rate: 0.35,
            amount_approved: 0.30,
            esg_score: 0.20,
            interest_rate: 0.10,
            repayment_period: 0.05,
        }
    }
}

impl DecisionCriteria {
    /// Scale the weights to sum to 1.0. Negative weights or an all-zero set
    /// are rejected.
    pub fn normalized(&self) -> WfapResult<Self> {
        let weights = [
            self.carbon_adjusted_rate,
            self.amount_approved,
            self.esg_score,
            self.interest_rate,
            self.repayment_period,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(WfapError::InvalidCriteria);
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(WfapError::InvalidCriteria);
        }
        Ok(Self {
            carbon_adjusted_rate: self.carbon_adjusted_rate / total,
            amount_approved: self.amount_approved / total,
            esg_score: self.esg_score / total,
            interest_rate: self.interest_rate / total,
            repayment_period: self.repayment_period / total,
        })
    }
}

/// One factor's contribution to an offer's total score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorScore {
    pub raw: f64,
    pub normalized: f64,
    pub weight: f64,
    pub weighted: f64,
}

/// Per-factor breakdown of a scored offer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub carbon_adjusted_rate: FactorScore,
    pub amount_approved: FactorScore,
    pub esg_score: FactorScore,
    pub interest_rate: FactorScore,
    pub repayment_period: FactorScore,
}

impl ScoreBreakdown {
    fn factors(&self) -> [(&'static str, &FactorScore); 5] {
        [
            ("carbon adjusted rate", &self.carbon_adjusted_rate),
            ("amount approved", &self.amount_approved),
            ("esg score", &self.esg_score),
            ("interest rate", &self.interest_rate),
            ("repayment period", &self.repayment_period),
        ]
    }
}

/// A sanitized offer with its score and breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredOffer {
    pub offer: SanitizedOffer,
    /// Weighted sum over all factors, kept at full precision so ordering is
    /// not distorted by display rounding.
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    /// Whether the missing-lender-id confidence penalty was applied.
    pub penalized: bool,
}

/// Outcome of a selection run over one batch of offers.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub best: ScoredOffer,
    /// Every offer that survived sanitization, in input order.
    pub all: Vec<ScoredOffer>,
    /// Inputs dropped during sanitization.
    pub diagnostics: Vec<ParseDiagnostic>,
    pub reasoning: String,
}

/// Score a batch of lender responses and pick the best.
///
/// Unparsable inputs are dropped with a diagnostic rather than failing the
/// batch; only an empty batch or a batch with no survivors is an error.
/// Ties break toward the larger approved amount, then the lower interest
/// rate.
pub fn select_best(
    inputs: &[OfferInput],
    criteria: &DecisionCriteria,
) -> WfapResult<SelectionResult> {
    if inputs.is_empty() {
        return Err(WfapError::NoOffers(
            "no offers provided for evaluation".to_string(),
        ));
    }
    let weights = criteria.normalized()?;

    let mut offers = Vec::with_capacity(inputs.len());
    let mut diagnostics = Vec::new();
    for (index, input) in inputs.iter().enumerate() {
        match ingest::sanitize(index, input) {
            Ok(offer) => offers.push(offer),
            Err(diagnostic) => {
                tracing::warn!(index, reason = %diagnostic.reason, "dropping offer");
                diagnostics.push(diagnostic);
            }
        }
    }
    if offers.is_empty() {
        return Err(WfapError::NoValidOffers(diagnostics));
    }

    // Interest is ranked linearly within the batch: best rate scores 1,
    // worst scores 0.
    let min_interest = offers.iter().map(|o| o.interest_rate).fold(f64::INFINITY, f64::min);
    let max_interest = offers.iter().map(|o| o.interest_rate).fold(0.0, f64::max);
    let interest_range = (max_interest - min_interest).max(1e-6);

    struct RawScores {
        carbon: f64,
        amount: f64,
        esg: f64,
        interest: f64,
        repayment: f64,
    }
    let raw: Vec<RawScores> = offers
        .iter()
        .map(|o| RawScores {
            carbon: 1.0 / (o.carbon_adjusted_rate + 0.001),
            amount: o.amount_approved,
            esg: esg::extract_esg_score(&o.esg_summary),
            interest: ((max_interest - o.interest_rate) / interest_range).clamp(0.0, 1.0),
            repayment: f64::from(o.repayment_period),
        })
        .collect();

    let batch_max = |f: fn(&RawScores) -> f64| -> f64 {
        let max = raw.iter().map(f).fold(0.0, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    };
    let max_carbon = batch_max(|r| r.carbon);
    let max_amount = batch_max(|r| r.amount);
    let max_esg = batch_max(|r| r.esg);
    let max_interest_score = batch_max(|r| r.interest);
    let max_repayment = batch_max(|r| r.repayment);

    let factor = |raw: f64, max: f64, weight: f64| -> FactorScore {
        let normalized = raw / max;
        FactorScore {
            raw,
            normalized,
            weight,
            weighted: normalized * weight,
        }
    };

    let scored: Vec<ScoredOffer> = offers
        .into_iter()
        .zip(raw)
        .map(|(offer, r)| {
            let breakdown = ScoreBreakdown {
                carbon_adjusted_rate: factor(r.carbon, max_carbon, weights.carbon_adjusted_rate),
                amount_approved: factor(r.amount, max_amount, weights.amount_approved),
                esg_score: factor(r.esg, max_esg, weights.esg_score),
                interest_rate: factor(r.interest, max_interest_score, weights.interest_rate),
                repayment_period: factor(r.repayment, max_repayment, weights.repayment_period),
            };
            let mut total_score: f64 =
                breakdown.factors().iter().map(|(_, f)| f.weighted).sum();
            let penalized = offer.lender_id.is_none();
            if penalized {
                total_score *= MISSING_LENDER_PENALTY;
            }
            ScoredOffer {
                offer,
                total_score,
                breakdown,
                penalized,
            }
        })
        .collect();

    let best = scored
        .iter()
        .max_by(|a, b| {
            a.total_score
                .total_cmp(&b.total_score)
                .then(a.offer.amount_approved.total_cmp(&b.offer.amount_approved))
                .then(b.offer.interest_rate.total_cmp(&a.offer.interest_rate))
        })
        .cloned()
        .ok_or(WfapError::NoValidOffers(Vec::new()))?;

    let reasoning = generate_reasoning(&best, &scored);
    tracing::info!(
        lender = best.offer.lender_id.as_deref().unwrap_or("<unknown>"),
        total_score = best.total_score,
        candidates = scored.len(),
        dropped = diagnostics.len(),
        "offer selected"
    );

    Ok(SelectionResult {
        best,
        all: scored,
        diagnostics,
        reasoning,
    })
}

fn generate_reasoning(best: &ScoredOffer, all: &[ScoredOffer]) -> String {
    let lender = best.offer.lender_id.as_deref().unwrap_or("<unknown>");
    let mut out = format!(
        "Selected offer from {} with total score {:.3}\n\nPrimary factors influencing this decision:\n",
        lender, best.total_score
    );

    let mut factors = best.breakdown.factors();
    factors.sort_by(|a, b| b.1.weighted.total_cmp(&a.1.weighted));
    for (name, score) in factors {
        if score.weighted > 0.0 {
            out.push_str(&format!(
                "- {}: {:.3} (normalized: {:.3}, weight: {:.3})\n",
                name, score.weighted, score.normalized, score.weight
            ));
        }
    }

    out.push_str(&format!(
        "\nKey offer details:\n- Carbon-adjusted rate: {:.3}%\n- Amount approved: ${:.2}\n- Base interest rate: {:.3}%\n- Repayment period: {} months\n",
        best.offer.carbon_adjusted_rate * 100.0,
        best.offer.amount_approved,
        best.offer.interest_rate * 100.0,
        best.offer.repayment_period
    ));

    let others: Vec<_> = all
        .iter()
        .filter(|o| o.offer.lender_id != best.offer.lender_id)
        .collect();
    if !others.is_empty() {
        out.push_str("\nComparison with other offers:\n");
        for other in others {
            out.push_str(&format!(
                "- {}: score {:.3} (difference: {:+.3})\n",
                other.offer.lender_id.as_deref().unwrap_or("<unknown>"),
                other.total_score,
                best.total_score - other.total_score
            ));
        }
    }

    if best.penalized {
        out.push_str("\nConfidence penalty applied: lender identity missing.\n");
    }
    out.push_str(&format!("\nESG considerations:\n{}\n", best.offer.esg_summary));
    out
}
