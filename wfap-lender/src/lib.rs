//! # wfap-lender
//!
//! Lender-side implementation of WFAP: a deterministic, policy-driven engine
//! that turns a signed loan Intent into a signed Offer, plus the bounded
//! one-shot rate negotiation protocol.
//!
//! All lenders run the same [`PolicyEngine`]; their differences live entirely
//! in [`LenderPolicy`] data. Three ready-made policies ship in [`presets`].

pub mod engine;
pub mod negotiation;
pub mod policy;
pub mod presets;

pub use engine::{Lender, PolicyEngine, RiskAssessment};
pub use negotiation::{NegotiationHandler, NegotiationOutcome};
pub use policy::{
    GrowthDiscount, LenderPolicy, NegotiationTerms, PurposeRule, RiskAdjustment, RiskProfile,
};
