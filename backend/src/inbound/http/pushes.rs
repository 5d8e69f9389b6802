//! Push HTTP handlers.
//!
//! ```text
//! POST   /api/v1/streams/{stream_id}/push
//! DELETE /api/v1/streams/{stream_id}/push
//! ```

use actix_web::{delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{PushPayload, StartPushRequest, StopPushRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_rtmp_destination, parse_stream_id};

/// Request payload for starting a push.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartPushBody {
    /// `rtmp://` or `rtmps://` destination.
    #[schema(example = "rtmp://live.example.com/app/stream-key")]
    pub rtmp_url: Option<String>,
}

/// Push as exposed over HTTP.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushResponse {
    pub id: String,
    pub stream_id: String,
    pub rtmp_url: String,
    /// `active` or `inactive`.
    #[schema(example = "active")]
    pub status: String,
    /// Media server node the push runs on.
    pub server_ip_address: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PushPayload> for PushResponse {
    fn from(value: PushPayload) -> Self {
        Self {
            id: value.id.to_string(),
            stream_id: value.stream_id.to_string(),
            rtmp_url: value.rtmp_url,
            status: value.status.to_string(),
            server_ip_address: value.server_ip_address,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Envelope for a started or stopped push.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushEnvelope {
    pub push: PushResponse,
    /// Push that was stopped to make room for this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_push_id: Option<String>,
}

/// Start republishing a stream, stopping any active push first.
#[utoipa::path(
    post,
    path = "/api/v1/streams/{stream_id}/push",
    params(("stream_id" = String, Path, description = "Stream identifier")),
    request_body = StartPushBody,
    responses(
        (status = 200, description = "Push started", body = PushEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown stream", body = ErrorSchema),
        (status = 409, description = "Stream not hosted yet or push raced", body = ErrorSchema),
        (status = 502, description = "Media server refused", body = ErrorSchema)
    ),
    tags = ["pushes"],
    operation_id = "startPush"
)]
#[post("/streams/{stream_id}/push")]
pub async fn start_push(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StartPushBody>,
) -> ApiResult<web::Json<PushEnvelope>> {
    let stream_id = parse_stream_id(&path.into_inner())?;
    let destination = parse_rtmp_destination(payload.into_inner().rtmp_url)?;
    let response = state
        .pushes
        .start_push(StartPushRequest {
            stream_id,
            destination,
        })
        .await?;
    Ok(web::Json(PushEnvelope {
        push: response.push.into(),
        replaced_push_id: response.replaced.map(|id| id.to_string()),
    }))
}

/// Stop the active push of a stream.
#[utoipa::path(
    delete,
    path = "/api/v1/streams/{stream_id}/push",
    params(("stream_id" = String, Path, description = "Stream identifier")),
    responses(
        (status = 200, description = "Push stopped", body = PushEnvelope),
        (status = 400, description = "Invalid stream id", body = ErrorSchema),
        (status = 404, description = "Unknown stream or no active push", body = ErrorSchema),
        (status = 502, description = "Media server refused", body = ErrorSchema)
    ),
    tags = ["pushes"],
    operation_id = "stopPush"
)]
#[delete("/streams/{stream_id}/push")]
pub async fn stop_push(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PushEnvelope>> {
    let stream_id = parse_stream_id(&path.into_inner())?;
    let response = state.pushes.stop_push(StopPushRequest { stream_id }).await?;
    Ok(web::Json(PushEnvelope {
        push: response.push.into(),
        replaced_push_id: None,
    }))
}

#[cfg(test)]
#[path = "pushes_tests.rs"]
mod tests;
