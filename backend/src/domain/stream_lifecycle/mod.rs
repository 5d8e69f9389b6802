//! Stream lifecycle services.
//!
//! [`StreamLifecycleService`] is the only writer of stream and push state. It
//! creates streams idempotently, folds webhook reports into stored streams and
//! orchestrates push start/stop against the media server so that a stream has
//! at most one active push.
//!
//! The service holds no state between calls. Multi-step sequences (stop the old
//! push, mark it inactive, start the new one) are not atomic; a crash between
//! the remote stop and the local mark leaves a push marked active that is
//! already gone remotely, which the next stop tolerates by treating a remote
//! not-found as success.

mod events;
mod pushes;
mod query;

pub use query::StreamQueryService;

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CloseStreamRequest, CreateStreamRequest, CreateStreamResponse, MediaServerClient,
    MediaServerError, PushRepository, PushRepositoryError, StreamCommand, StreamRepository,
    StreamRepositoryError,
};
use crate::domain::{Error, ExternalId, IngestEndpoint, Stream, StreamId};

pub(crate) fn map_stream_repository_error(error: StreamRepositoryError) -> Error {
    match error {
        StreamRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("stream store unavailable: {message}"))
        }
        StreamRepositoryError::Query { message } => {
            Error::internal(format!("stream store error: {message}"))
        }
        StreamRepositoryError::DuplicateExternalId { external_id } => {
            Error::conflict(format!("stream with external id {external_id} already exists"))
        }
    }
}

pub(crate) fn map_push_repository_error(error: PushRepositoryError) -> Error {
    match error {
        PushRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("push store unavailable: {message}"))
        }
        PushRepositoryError::Query { message } => {
            Error::internal(format!("push store error: {message}"))
        }
        PushRepositoryError::DuplicateActive { stream_id } => {
            Error::conflict(format!("stream {stream_id} already has an active push"))
        }
    }
}

fn map_media_server_error(action: &str, node_address: &str, error: &MediaServerError) -> Error {
    Error::remote_command_failed(format!("{action} failed on {node_address}: {error}"))
}

/// Lifecycle service implementing [`StreamCommand`],
/// [`crate::domain::ports::PushCommand`] and
/// [`crate::domain::ports::StreamEventIngest`].
#[derive(Clone)]
pub struct StreamLifecycleService<S, P, M> {
    streams: Arc<S>,
    pushes: Arc<P>,
    media_server: Arc<M>,
    clock: Arc<dyn Clock>,
    ingest: IngestEndpoint,
}

impl<S, P, M> StreamLifecycleService<S, P, M>
where
    S: StreamRepository,
    P: PushRepository,
    M: MediaServerClient,
{
    /// Create a service over the given store and media server adapters.
    pub fn new(
        streams: Arc<S>,
        pushes: Arc<P>,
        media_server: Arc<M>,
        clock: Arc<dyn Clock>,
        ingest: IngestEndpoint,
    ) -> Self {
        Self {
            streams,
            pushes,
            media_server,
            clock,
            ingest,
        }
    }

    async fn require_stream(&self, stream_id: &StreamId) -> Result<Stream, Error> {
        self.streams
            .find_by_id(stream_id)
            .await
            .map_err(map_stream_repository_error)?
            .ok_or_else(|| Error::not_found(format!("stream {stream_id} not found")))
    }

    async fn find_by_external_id(&self, external_id: &ExternalId) -> Result<Option<Stream>, Error> {
        self.streams
            .find_by_external_id(external_id)
            .await
            .map_err(map_stream_repository_error)
    }

    fn create_response(&self, stream: Stream, created: bool) -> CreateStreamResponse {
        let ingest_url = self.ingest.url_for(&stream.id());
        CreateStreamResponse {
            stream: stream.into(),
            ingest_url,
            created,
        }
    }
}

#[async_trait]
impl<S, P, M> StreamCommand for StreamLifecycleService<S, P, M>
where
    S: StreamRepository,
    P: PushRepository,
    M: MediaServerClient,
{
    async fn create_stream(
        &self,
        request: CreateStreamRequest,
    ) -> Result<CreateStreamResponse, Error> {
        let CreateStreamRequest { external_id } = request;

        if let Some(existing) = self.find_by_external_id(&external_id).await? {
            debug!(
                stream_id = %existing.id(),
                external_id = %external_id,
                "returning existing stream for external id"
            );
            return Ok(self.create_response(existing, false));
        }

        let stream = Stream::initiate(StreamId::random(), external_id.clone(), self.clock.utc());
        match self.streams.insert(&stream).await {
            Ok(()) => {
                info!(
                    stream_id = %stream.id(),
                    external_id = %external_id,
                    "stream created"
                );
                Ok(self.create_response(stream, true))
            }
            Err(StreamRepositoryError::DuplicateExternalId { .. }) => {
                // A concurrent create won the unique index; hand back its record.
                let winner = self.find_by_external_id(&external_id).await?.ok_or_else(|| {
                    Error::internal(format!(
                        "stream for external id {external_id} vanished after a duplicate insert"
                    ))
                })?;
                debug!(
                    stream_id = %winner.id(),
                    external_id = %external_id,
                    "concurrent create resolved to existing stream"
                );
                Ok(self.create_response(winner, false))
            }
            Err(err) => Err(map_stream_repository_error(err)),
        }
    }

    async fn close_stream(&self, request: CloseStreamRequest) -> Result<(), Error> {
        let stream = self.require_stream(&request.stream_id).await?;
        let Some(node_address) = stream.server_ip_address() else {
            debug!(stream_id = %stream.id(), "stream never opened; nothing to delete remotely");
            return Ok(());
        };

        self.media_server
            .delete_stream(&stream.media_server_name(), node_address)
            .await
            .map_err(|err| {
                warn!(
                    stream_id = %stream.id(),
                    node = node_address,
                    error = %err,
                    "media server stream deletion failed"
                );
                map_media_server_error("delete stream", node_address, &err)
            })?;

        info!(stream_id = %stream.id(), node = node_address, "stream deleted on media server");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
