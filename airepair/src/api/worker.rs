//! Background thread that owns the service gateways.
//!
//! Requests are not serialised: each one becomes its own task, so a slow repair
//! never holds up a chat reply. Ordering between responses is the sessions'
//! concern, not the worker's.

use crossbeam_channel::Receiver;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use airepair_core::Gateway;

use crate::api::types::{ApiRequest, ApiResultPayload};
use crate::event::AppEvent;

/// Loops over incoming requests until every sender is dropped.
///
/// `review` serves analyze and repair; `chat` serves solve. Tasks are spawned
/// on `runtime` and post their results to `event_tx`.
pub fn api_worker_loop(
    review: Gateway,
    chat: Gateway,
    rx: Receiver<ApiRequest>,
    event_tx: UnboundedSender<AppEvent>,
    runtime: Handle,
) {
    for request in rx {
        let review = review.clone();
        let chat = chat.clone();
        let tx = event_tx.clone();
        runtime.spawn(async move {
            let payload = handle_request(&review, &chat, request).await;
            let _ = tx.send(AppEvent::ApiResult(Box::new(payload)));
        });
    }
    debug!("api worker exiting");
}

async fn handle_request(review: &Gateway, chat: &Gateway, request: ApiRequest) -> ApiResultPayload {
    match request {
        ApiRequest::Analyze { seq, body } => {
            ApiResultPayload::Analyzed { seq, outcome: review.analyze(&body).await }
        }
        ApiRequest::Repair { seq, body } => {
            ApiResultPayload::Repaired { seq, outcome: review.repair(&body).await }
        }
        ApiRequest::Solve { ticket, body } => {
            ApiResultPayload::Solved { ticket, outcome: chat.solve(&body).await }
        }
    }
}
