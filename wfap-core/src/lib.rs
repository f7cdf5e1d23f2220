//! # wfap-core
//!
//! Core library for WFAP, a signed loan negotiation protocol.
//!
//! This crate provides the tamper-evident message types (Intent/Offer), the
//! HMAC signing codec, the deterministic ESG scoring math, and the error
//! taxonomy used by lender and consumer implementations.

pub mod error;
pub mod esg;
pub mod message;
pub mod signing;

pub use error::{ParseDiagnostic, WfapError, WfapResult};
pub use esg::{carbon_adjusted_rate, esg_score, extract_esg_score};
pub use message::{check_intent, check_offer, validate_intent, validate_offer, Intent, Offer};
pub use signing::{canonicalize, AuditRecord, Codec, SigningKey};

/// Protocol version
pub const PROTOCOL_VERSION: &str = "0.1";
