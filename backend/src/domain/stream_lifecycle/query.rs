//! Read-side service for streams and push history.

use std::sync::Arc;

use async_trait::async_trait;

use super::{map_push_repository_error, map_stream_repository_error};
use crate::domain::ports::{PushHistory, PushRepository, StreamPayload, StreamQuery, StreamRepository};
use crate::domain::{Error, Stream, StreamId};

/// Query service implementing [`StreamQuery`].
#[derive(Clone)]
pub struct StreamQueryService<S, P> {
    streams: Arc<S>,
    pushes: Arc<P>,
}

impl<S, P> StreamQueryService<S, P>
where
    S: StreamRepository,
    P: PushRepository,
{
    pub fn new(streams: Arc<S>, pushes: Arc<P>) -> Self {
        Self { streams, pushes }
    }

    async fn require_stream(&self, stream_id: &StreamId) -> Result<Stream, Error> {
        self.streams
            .find_by_id(stream_id)
            .await
            .map_err(map_stream_repository_error)?
            .ok_or_else(|| Error::not_found(format!("stream {stream_id} not found")))
    }
}

#[async_trait]
impl<S, P> StreamQuery for StreamQueryService<S, P>
where
    S: StreamRepository,
    P: PushRepository,
{
    async fn get_stream(&self, stream_id: StreamId) -> Result<StreamPayload, Error> {
        self.require_stream(&stream_id).await.map(Into::into)
    }

    async fn list_pushes(&self, stream_id: StreamId) -> Result<PushHistory, Error> {
        self.require_stream(&stream_id).await?;
        let pushes = self
            .pushes
            .list_for_stream(&stream_id)
            .await
            .map_err(map_push_repository_error)?;
        Ok(PushHistory {
            stream_id,
            pushes: pushes.into_iter().map(Into::into).collect(),
        })
    }
}
