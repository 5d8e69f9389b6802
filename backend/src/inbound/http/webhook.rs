//! Media server admission webhook.
//!
//! ```text
//! POST /webhooks/media-server
//! ```
//!
//! The media server treats any non-`allowed` answer as a refusal to open the
//! session, so reconciliation outcomes never reach the response.

use actix_web::{HttpRequest, post, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::domain::ports::ReconcileOutcome;
use crate::domain::{StreamEvent, StreamStatus};
use crate::inbound::http::state::HttpState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Connection details of the publishing client.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookClient {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default, alias = "real_ip")]
    pub real_ip: Option<String>,
    #[serde(default, alias = "user_agent")]
    pub user_agent: Option<String>,
}

/// The admission request the media server is asking about.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// `incoming` for publishers, `outgoing` for players.
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    #[schema(example = "whip")]
    pub protocol: String,
    #[schema(example = "opening")]
    pub status: String,
    /// URL whose last path segment is the stream id.
    #[schema(example = "http://10.0.0.5:3333/app/3fa85f64-5717-4562-b3fc-2c963f66afa6?direction=whip")]
    pub url: String,
    #[serde(default, alias = "new_url")]
    pub new_url: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// Admission webhook body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookBody {
    #[serde(default)]
    pub client: WebhookClient,
    pub request: WebhookRequest,
}

/// Admission verdict returned to the media server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookVerdict {
    pub allowed: bool,
}

/// Address of the node that delivered the webhook.
///
/// The first `X-Forwarded-For` hop wins; the socket peer is the fallback.
fn reporter_address(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());
    match forwarded {
        Some(hop) => hop.to_owned(),
        None => req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default(),
    }
}

impl WebhookBody {
    fn into_event(self, reporter_address: String) -> StreamEvent {
        StreamEvent {
            url: self.request.url,
            status: StreamStatus::reported(self.request.status),
            protocol: self.request.protocol,
            reporter_address,
        }
    }
}

/// Reconcile a media server status report into the stored stream.
#[utoipa::path(
    post,
    path = "/webhooks/media-server",
    request_body = WebhookBody,
    responses(
        (status = 200, description = "Admission granted", body = WebhookVerdict),
        (status = 400, description = "Body did not decode")
    ),
    tags = ["webhooks"],
    operation_id = "mediaServerWebhook"
)]
#[post("/webhooks/media-server")]
pub async fn media_server_webhook(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<WebhookBody>,
) -> web::Json<WebhookVerdict> {
    let body = payload.into_inner();
    debug!(
        direction = %body.request.direction,
        client = %body.client.address,
        "media server webhook received"
    );
    let event = body.into_event(reporter_address(&req));
    let url = event.url.clone();
    match state.events.reconcile_event(event).await {
        Ok(ReconcileOutcome::Applied { stream_id, opening }) => {
            debug!(%stream_id, opening, "webhook reconciled");
        }
        Ok(ReconcileOutcome::Dropped { reason }) => {
            warn!(%url, %reason, "webhook dropped");
        }
        Err(err) => {
            error!(%url, error = %err, "webhook reconciliation failed");
        }
    }
    web::Json(WebhookVerdict { allowed: true })
}
