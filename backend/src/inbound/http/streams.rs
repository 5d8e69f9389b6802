//! Stream HTTP handlers.
//!
//! ```text
//! POST   /api/v1/streams
//! GET    /api/v1/streams/{stream_id}
//! DELETE /api/v1/streams/{stream_id}
//! GET    /api/v1/streams/{stream_id}/pushes
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CloseStreamRequest, CreateStreamRequest, CreateStreamResponse, PushHistory, StreamPayload,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pushes::PushResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_external_id, parse_stream_id};

/// Request payload for creating a stream.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreamBody {
    /// Caller-supplied idempotency key.
    #[schema(example = "ext-1")]
    pub external_id: Option<String>,
}

/// Stream as exposed over HTTP.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub external_id: String,
    /// `initiated` until the media server reports; free-form afterwards.
    #[schema(example = "opening")]
    pub status: String,
    #[schema(example = "10.0.0.5")]
    pub server_ip_address: Option<String>,
    #[schema(example = "whip")]
    pub protocol: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<StreamPayload> for StreamResponse {
    fn from(value: StreamPayload) -> Self {
        Self {
            id: value.id.to_string(),
            external_id: value.external_id,
            status: value.status,
            server_ip_address: value.server_ip_address,
            protocol: value.protocol,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Response for `POST /api/v1/streams`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreamResponseBody {
    pub stream: StreamResponse,
    /// WHIP URL the publisher should send media to.
    #[schema(example = "https://media.example.com/app/3fa85f64-5717-4562-b3fc-2c963f66afa6?direction=whip")]
    pub ingest_url: String,
}

impl From<CreateStreamResponse> for CreateStreamResponseBody {
    fn from(value: CreateStreamResponse) -> Self {
        Self {
            stream: value.stream.into(),
            ingest_url: value.ingest_url,
        }
    }
}

/// Envelope for a single stream.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StreamEnvelope {
    pub stream: StreamResponse,
}

/// Push history of one stream, newest first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushHistoryResponse {
    pub stream_id: String,
    pub pushes: Vec<PushResponse>,
}

impl From<PushHistory> for PushHistoryResponse {
    fn from(value: PushHistory) -> Self {
        Self {
            stream_id: value.stream_id.to_string(),
            pushes: value.pushes.into_iter().map(PushResponse::from).collect(),
        }
    }
}

/// Create the stream for an external id, or return the existing one.
#[utoipa::path(
    post,
    path = "/api/v1/streams",
    request_body = CreateStreamBody,
    responses(
        (status = 200, description = "Stream and its ingest URL", body = CreateStreamResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Lifecycle store unavailable", body = ErrorSchema)
    ),
    tags = ["streams"],
    operation_id = "createStream"
)]
#[post("/streams")]
pub async fn create_stream(
    state: web::Data<HttpState>,
    payload: web::Json<CreateStreamBody>,
) -> ApiResult<web::Json<CreateStreamResponseBody>> {
    let external_id = parse_external_id(payload.into_inner().external_id)?;
    let response = state
        .streams
        .create_stream(CreateStreamRequest { external_id })
        .await?;
    Ok(web::Json(response.into()))
}

/// Fetch one stream.
#[utoipa::path(
    get,
    path = "/api/v1/streams/{stream_id}",
    params(("stream_id" = String, Path, description = "Stream identifier")),
    responses(
        (status = 200, description = "Stream", body = StreamEnvelope),
        (status = 400, description = "Invalid stream id", body = ErrorSchema),
        (status = 404, description = "Unknown stream", body = ErrorSchema)
    ),
    tags = ["streams"],
    operation_id = "getStream"
)]
#[get("/streams/{stream_id}")]
pub async fn get_stream(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<StreamEnvelope>> {
    let stream_id = parse_stream_id(&path.into_inner())?;
    let stream = state.streams_query.get_stream(stream_id).await?;
    Ok(web::Json(StreamEnvelope {
        stream: stream.into(),
    }))
}

/// Delete the stream's resource on the media server node hosting it.
///
/// The stored stream record is kept.
#[utoipa::path(
    delete,
    path = "/api/v1/streams/{stream_id}",
    params(("stream_id" = String, Path, description = "Stream identifier")),
    responses(
        (status = 204, description = "Remote stream removed or never existed"),
        (status = 400, description = "Invalid stream id", body = ErrorSchema),
        (status = 404, description = "Unknown stream", body = ErrorSchema),
        (status = 502, description = "Media server refused", body = ErrorSchema)
    ),
    tags = ["streams"],
    operation_id = "closeStream"
)]
#[delete("/streams/{stream_id}")]
pub async fn close_stream(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let stream_id = parse_stream_id(&path.into_inner())?;
    state
        .streams
        .close_stream(CloseStreamRequest { stream_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List every push of a stream, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/streams/{stream_id}/pushes",
    params(("stream_id" = String, Path, description = "Stream identifier")),
    responses(
        (status = 200, description = "Push history", body = PushHistoryResponse),
        (status = 400, description = "Invalid stream id", body = ErrorSchema),
        (status = 404, description = "Unknown stream", body = ErrorSchema)
    ),
    tags = ["pushes"],
    operation_id = "listPushes"
)]
#[get("/streams/{stream_id}/pushes")]
pub async fn list_pushes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PushHistoryResponse>> {
    let stream_id = parse_stream_id(&path.into_inner())?;
    let history = state.streams_query.list_pushes(stream_id).await?;
    Ok(web::Json(history.into()))
}

#[cfg(test)]
#[path = "streams_tests.rs"]
mod tests;
