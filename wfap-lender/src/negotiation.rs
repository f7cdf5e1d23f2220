//! Bounded one-shot rate renegotiation.
//!
//! A requester may ask one lender, once, to reduce an already-issued offer's
//! rate. The lender grants at most `max_reduction` in the round and never
//! goes below its private floor. No state survives between calls.

use wfap_core::{Codec, Offer, WfapResult};

use crate::policy::NegotiationTerms;

/// Outcome of a negotiation round. Refusal is a normal, explained result,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationOutcome {
    /// The lender agreed; the offer is re-issued at the new rate.
    Agreed { offer: Offer, new_rate: f64 },
    /// The lender declined, reporting its binding constraints.
    Refused {
        reason: String,
        /// Absolute floor the lender will not cross.
        floor_rate: f64,
        /// Largest single-round reduction the lender grants.
        max_reduction: f64,
        /// Best rate the lender could have offered this round.
        best_rate: f64,
    },
}

impl NegotiationOutcome {
    pub fn is_agreed(&self) -> bool {
        matches!(self, Self::Agreed { .. })
    }
}

/// Single-lender negotiation handler, bound to that lender's private terms.
#[derive(Debug, Clone, Copy)]
pub struct NegotiationHandler {
    terms: NegotiationTerms,
}

impl NegotiationHandler {
    pub fn new(terms: NegotiationTerms) -> Self {
        Self { terms }
    }

    /// Run one bounded reduction round against `current`.
    ///
    /// `new_rate = max(min_rate, min(target_rate, current - max_reduction))`;
    /// the lender agrees iff that is a genuine reduction at or above its
    /// floor. On agreement the offer is re-signed with
    /// `interest_rate = carbon_adjusted_rate = new_rate`.
    pub fn negotiate(
        &self,
        codec: &Codec,
        current: &Offer,
        target_rate: f64,
    ) -> WfapResult<NegotiationOutcome> {
        let NegotiationTerms {
            min_rate,
            max_reduction,
        } = self.terms;

        let max_allowed = current.interest_rate - max_reduction;
        let new_rate = min_rate.max(target_rate.min(max_allowed));
        let agreed = new_rate < current.interest_rate && new_rate >= min_rate;

        if !agreed {
            let best_rate = min_rate.max(max_allowed);
            return Ok(NegotiationOutcome::Refused {
                reason: format!(
                    "lender cannot reduce rate below {:.2}% or by more than {:.2}% in one round",
                    min_rate * 100.0,
                    max_reduction * 100.0
                ),
                floor_rate: min_rate,
                max_reduction,
                best_rate,
            });
        }

        let new_rate = round4(new_rate);
        let mut offer = current.clone();
        offer.interest_rate = new_rate;
        offer.carbon_adjusted_rate = new_rate;
        offer
            .esg_summary
            .push_str(&format!(" Interest rate negotiated down to {:.2}%.", new_rate * 100.0));
        codec.sign_offer(&mut offer)?;

        tracing::info!(
            offer = %offer.offer_id,
            lender = %offer.lender_id,
            new_rate,
            "negotiation agreed"
        );
        Ok(NegotiationOutcome::Agreed { offer, new_rate })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfap_core::SigningKey;

    fn codec() -> Codec {
        Codec::new(SigningKey::new("wfap_test_secret"))
    }

    fn offer_at(rate: f64) -> Offer {
        codec()
            .create_offer("req_12345678", "lender_1", rate, 450_000.0, 24, "ESG score: 0.8.", rate)
            .unwrap()
    }

    #[test]
    fn target_below_floor_is_clamped_to_floor() {
        let handler = NegotiationHandler::new(NegotiationTerms {
            min_rate: 0.055,
            max_reduction: 0.005,
        });
        // Asking for far below the floor: the round yields the floor, which
        // equals the one-step limit 0.06 - 0.005 = 0.055.
        let outcome = handler.negotiate(&codec(), &offer_at(0.06), 0.04).unwrap();
        match outcome {
            NegotiationOutcome::Agreed { new_rate, ref offer } => {
                assert_eq!(new_rate, 0.055);
                assert_eq!(offer.interest_rate, 0.055);
                assert_eq!(offer.carbon_adjusted_rate, 0.055);
                assert!(offer.esg_summary.contains("negotiated down to 5.50%"));
            }
            NegotiationOutcome::Refused { .. } => panic!("expected agreement"),
        }
    }

    #[test]
    fn offer_already_at_floor_is_refused() {
        let handler = NegotiationHandler::new(NegotiationTerms {
            min_rate: 0.06,
            max_reduction: 0.005,
        });
        let outcome = handler.negotiate(&codec(), &offer_at(0.06), 0.05).unwrap();
        match outcome {
            NegotiationOutcome::Refused {
                floor_rate,
                max_reduction,
                best_rate,
                ref reason,
            } => {
                assert_eq!(floor_rate, 0.06);
                assert_eq!(max_reduction, 0.005);
                // The one-step limit is still reported even though the floor
                // blocks it.
                assert_eq!(best_rate, 0.06);
                assert!(reason.contains("cannot reduce rate below 6.00%"));
            }
            NegotiationOutcome::Agreed { .. } => panic!("expected refusal"),
        }
    }

    #[test]
    fn target_above_current_is_refused() {
        let handler = NegotiationHandler::new(NegotiationTerms {
            min_rate: 0.045,
            max_reduction: 0.005,
        });
        let outcome = handler.negotiate(&codec(), &offer_at(0.06), 0.07).unwrap();
        assert!(!outcome.is_agreed());
    }

    #[test]
    fn reasonable_target_is_granted_exactly() {
        let handler = NegotiationHandler::new(NegotiationTerms {
            min_rate: 0.045,
            max_reduction: 0.005,
        });
        let outcome = handler.negotiate(&codec(), &offer_at(0.06), 0.055).unwrap();
        match outcome {
            NegotiationOutcome::Agreed { new_rate, .. } => assert_eq!(new_rate, 0.055),
            NegotiationOutcome::Refused { .. } => panic!("expected agreement"),
        }
    }

    #[test]
    fn renegotiated_offer_is_resigned_and_valid() {
        let codec = codec();
        let handler = NegotiationHandler::new(NegotiationTerms {
            min_rate: 0.045,
            max_reduction: 0.005,
        });
        let original = offer_at(0.06);
        let outcome = handler.negotiate(&codec, &original, 0.055).unwrap();
        let NegotiationOutcome::Agreed { offer, .. } = outcome else {
            panic!("expected agreement");
        };
        assert!(codec.verify_offer(&offer).unwrap());
        assert_ne!(offer.signature, original.signature);
    }

    #[test]
    fn no_state_is_retained_between_rounds() {
        let handler = NegotiationHandler::new(NegotiationTerms {
            min_rate: 0.045,
            max_reduction: 0.005,
        });
        let offer = offer_at(0.06);
        let first = handler.negotiate(&codec(), &offer, 0.055).unwrap();
        let second = handler.negotiate(&codec(), &offer, 0.055).unwrap();
        assert_eq!(first, second);
    }
}
