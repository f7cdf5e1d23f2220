//! End-to-end WFAP demo: one Intent, three lenders, selection, and one
//! negotiation round with the winner.

use std::sync::Arc;

use wfap_consumer::{Consumer, DecisionCriteria};
use wfap_core::{SigningKey, WfapError};
use wfap_lender::{presets, NegotiationOutcome, PolicyEngine};

#[tokio::main]
async fn main() -> Result<(), WfapError> {
    tracing_subscriber::fmt::init();

    let key = SigningKey::from_env()
        .unwrap_or_else(|_| SigningKey::new("wfap-demo-secret-change-me"));

    let mut consumer = Consumer::new("company_demo", key.clone());
    for policy in presets::all() {
        consumer = consumer.with_lender(Arc::new(PolicyEngine::new(policy, key.clone())));
    }

    let intent = consumer.create_intent(500_000.0, 24, "solar farm expansion", None)?;
    tracing::info!(request = %intent.request_id, "intent issued");

    let offers = consumer.request_offers(&intent).await?;
    for offer in &offers {
        println!(
            "{}: rate {:.2}%, carbon-adjusted {:.2}%, amount ${:.0}",
            offer.lender_id,
            offer.interest_rate * 100.0,
            offer.carbon_adjusted_rate * 100.0,
            offer.amount_approved
        );
    }

    let selection = consumer.select_best(offers.clone(), &DecisionCriteria::default())?;
    println!("\n{}", selection.reasoning);

    if let Some(lender_id) = selection.best.offer.lender_id.clone() {
        let current = offers
            .iter()
            .find(|o| o.lender_id == lender_id)
            .ok_or_else(|| WfapError::validation("lender_id", "selected offer not in batch"))?;
        let target = current.interest_rate - 0.005;
        match consumer.negotiate(&lender_id, current, target)? {
            NegotiationOutcome::Agreed { new_rate, .. } => {
                println!("Negotiated {} down to {:.2}%", lender_id, new_rate * 100.0);
            }
            NegotiationOutcome::Refused {
                reason, best_rate, ..
            } => {
                println!(
                    "{} declined: {} (best available {:.2}%)",
                    lender_id,
                    reason,
                    best_rate * 100.0
                );
            }
        }
    }

    Ok(())
}
