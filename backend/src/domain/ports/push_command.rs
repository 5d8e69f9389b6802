//! Driving port for push start and stop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Push, PushId, PushStatus, RtmpDestination, StreamId};

/// Serializable push payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub id: PushId,
    pub stream_id: StreamId,
    pub rtmp_url: String,
    pub status: PushStatus,
    pub server_ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Push> for PushPayload {
    fn from(value: Push) -> Self {
        Self {
            id: value.id(),
            stream_id: value.stream_id(),
            rtmp_url: value.rtmp_url().to_owned(),
            status: value.status(),
            server_ip_address: value.server_ip_address().to_owned(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to start republishing a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPushRequest {
    pub stream_id: StreamId,
    pub destination: RtmpDestination,
}

/// Result of a successful start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPushResponse {
    pub push: PushPayload,
    /// Push that was stopped to make room for the new one.
    pub replaced: Option<PushId>,
}

/// Request to stop the active push of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPushRequest {
    pub stream_id: StreamId,
}

/// Result of a successful stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPushResponse {
    pub push: PushPayload,
}

/// Driving port for push write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushCommand: Send + Sync {
    /// Start a push, stopping any active push of the stream first.
    async fn start_push(&self, request: StartPushRequest) -> Result<StartPushResponse, Error>;

    /// Stop the active push. Fails with `not_found` when nothing is active.
    async fn stop_push(&self, request: StopPushRequest) -> Result<StopPushResponse, Error>;
}

/// Fixture command that accepts starts and has nothing to stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePushCommand;

#[async_trait]
impl PushCommand for FixturePushCommand {
    async fn start_push(&self, request: StartPushRequest) -> Result<StartPushResponse, Error> {
        let push = Push::activate(
            PushId::random(),
            request.stream_id,
            &request.destination,
            "127.0.0.1",
            Utc::now(),
        );
        Ok(StartPushResponse {
            push: push.into(),
            replaced: None,
        })
    }

    async fn stop_push(&self, request: StopPushRequest) -> Result<StopPushResponse, Error> {
        Err(Error::not_found(format!(
            "stream {} has no active push",
            request.stream_id
        )))
    }
}
