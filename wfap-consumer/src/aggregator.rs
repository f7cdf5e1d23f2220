//! Fan-out of one Intent to many lenders.
//!
//! All lenders are queried concurrently; a lender that errors, panics,
//! returns a malformed offer, or fails signature verification is logged and
//! skipped. Only a batch with zero surviving offers is an error.

use std::sync::Arc;

use tokio::task::JoinSet;
use wfap_core::{message, Codec, Intent, Offer, WfapError, WfapResult};

use wfap_lender::Lender;

/// Query every lender with the Intent and collect the verified offers, in
/// lender order.
pub async fn collect_offers(
    intent: &Intent,
    lenders: &[Arc<dyn Lender>],
    codec: &Codec,
) -> WfapResult<Vec<Offer>> {
    let mut tasks = JoinSet::new();
    for (index, lender) in lenders.iter().enumerate() {
        let lender = Arc::clone(lender);
        let intent = intent.clone();
        tasks.spawn(async move { (index, lender.evaluate(&intent)) });
    }

    let mut collected: Vec<(usize, Offer)> = Vec::with_capacity(lenders.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = match joined {
            Ok(pair) => pair,
            Err(join_error) => {
                tracing::warn!(%join_error, "lender task aborted");
                continue;
            }
        };
        let lender_id = lenders[index].lender_id();
        let offer = match outcome {
            Ok(offer) => offer,
            Err(error) => {
                tracing::warn!(lender = %lender_id, %error, "lender failed, skipping");
                continue;
            }
        };
        match codec.verify_offer(&offer) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(lender = %lender_id, offer = %offer.offer_id, "bad offer signature, skipping");
                continue;
            }
            Err(error) => {
                tracing::warn!(lender = %lender_id, %error, "signature check failed, skipping");
                continue;
            }
        }
        if let Err(error) = message::validate_offer(&offer) {
            tracing::warn!(lender = %lender_id, %error, "malformed offer, skipping");
            continue;
        }
        collected.push((index, offer));
    }

    if collected.is_empty() {
        return Err(WfapError::NoOffers(format!(
            "no usable offers from {} lender(s)",
            lenders.len()
        )));
    }
    collected.sort_by_key(|(index, _)| *index);
    tracing::info!(
        request = %intent.request_id,
        received = collected.len(),
        queried = lenders.len(),
        "offers collected"
    );
    Ok(collected.into_iter().map(|(_, offer)| offer).collect())
}
