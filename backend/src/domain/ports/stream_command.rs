//! Driving port for stream mutations issued by clients.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ExternalId, Stream, StreamId};

/// Serializable stream payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamPayload {
    pub id: StreamId,
    pub external_id: String,
    pub status: String,
    pub server_ip_address: Option<String>,
    pub protocol: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Stream> for StreamPayload {
    fn from(value: Stream) -> Self {
        Self {
            id: value.id(),
            external_id: value.external_id().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
            server_ip_address: value.server_ip_address().map(str::to_owned),
            protocol: value.protocol().map(str::to_owned),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to create (or fetch) the stream for an external id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStreamRequest {
    pub external_id: ExternalId,
}

/// Stream plus the URL the client publishes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreamResponse {
    pub stream: StreamPayload,
    pub ingest_url: String,
    /// `false` when an existing stream was returned for the external id.
    pub created: bool,
}

/// Request to tear down the remote resource of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseStreamRequest {
    pub stream_id: StreamId,
}

/// Driving port for stream write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamCommand: Send + Sync {
    /// Create the stream for an external id, or return the existing one.
    async fn create_stream(
        &self,
        request: CreateStreamRequest,
    ) -> Result<CreateStreamResponse, Error>;

    /// Delete the stream resource on its hosting node. Local state is left for
    /// the media server's `closing` report to update.
    async fn close_stream(&self, request: CloseStreamRequest) -> Result<(), Error>;
}

/// Fixture command returning a fresh initiated stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStreamCommand;

#[async_trait]
impl StreamCommand for FixtureStreamCommand {
    async fn create_stream(
        &self,
        request: CreateStreamRequest,
    ) -> Result<CreateStreamResponse, Error> {
        let stream = Stream::initiate(StreamId::random(), request.external_id, Utc::now());
        let ingest_url = format!("http://localhost:3333/app/{}?direction=whip", stream.id());
        Ok(CreateStreamResponse {
            stream: stream.into(),
            ingest_url,
            created: true,
        })
    }

    async fn close_stream(&self, _request: CloseStreamRequest) -> Result<(), Error> {
        Ok(())
    }
}
