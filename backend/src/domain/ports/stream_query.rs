//! Driving port for stream and push read models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, StreamId};

use super::{PushPayload, StreamPayload};

/// Driving port for reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamQuery: Send + Sync {
    async fn get_stream(&self, stream_id: StreamId) -> Result<StreamPayload, Error>;

    /// Push history of a stream, newest first.
    async fn list_pushes(&self, stream_id: StreamId) -> Result<PushHistory, Error>;
}

/// Push history response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushHistory {
    pub stream_id: StreamId,
    pub pushes: Vec<PushPayload>,
}

/// Fixture query with no stored streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStreamQuery;

#[async_trait]
impl StreamQuery for FixtureStreamQuery {
    async fn get_stream(&self, stream_id: StreamId) -> Result<StreamPayload, Error> {
        Err(Error::not_found(format!("stream {stream_id} not found")))
    }

    async fn list_pushes(&self, stream_id: StreamId) -> Result<PushHistory, Error> {
        Ok(PushHistory {
            stream_id,
            pushes: Vec::new(),
        })
    }
}
