//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the stream, push, webhook and health endpoints plus
//! the schema wrappers for domain types that do not derive `ToSchema`. The
//! document backs Swagger UI in debug builds.

use crate::inbound::http::pushes::{PushEnvelope, PushResponse, StartPushBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::streams::{
    CreateStreamBody, CreateStreamResponseBody, PushHistoryResponse, StreamEnvelope,
    StreamResponse,
};
use crate::inbound::http::webhook::{WebhookBody, WebhookClient, WebhookRequest, WebhookVerdict};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stream relay API",
        description = "Stream lifecycle and push control plane for a WebRTC media server."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::streams::create_stream,
        crate::inbound::http::streams::get_stream,
        crate::inbound::http::streams::close_stream,
        crate::inbound::http::streams::list_pushes,
        crate::inbound::http::pushes::start_push,
        crate::inbound::http::pushes::stop_push,
        crate::inbound::http::webhook::media_server_webhook,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CreateStreamBody,
        CreateStreamResponseBody,
        StreamResponse,
        StreamEnvelope,
        PushHistoryResponse,
        StartPushBody,
        PushResponse,
        PushEnvelope,
        WebhookBody,
        WebhookClient,
        WebhookRequest,
        WebhookVerdict
    )),
    tags(
        (name = "streams", description = "Stream creation, lookup and teardown"),
        (name = "pushes", description = "RTMP republishing of a stream"),
        (name = "webhooks", description = "Callbacks from the media server"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
