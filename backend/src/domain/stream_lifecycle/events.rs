//! Webhook reconciliation.
//!
//! Events carry no sequence number, so every report is a blind overwrite and
//! the last delivered event wins. A stale `closing` arriving after a fresh
//! `opening` therefore downgrades a live stream.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{StreamLifecycleService, map_stream_repository_error};
use crate::domain::ports::{
    MediaServerClient, PushRepository, ReconcileOutcome, StreamEventIngest, StreamRepository,
};
use crate::domain::{Error, Stream, StreamEvent, StreamId, StreamOpening};

fn dropped(event: &StreamEvent, reason: String) -> ReconcileOutcome {
    warn!(
        url = event.url.as_str(),
        status = event.status.as_str(),
        reason = reason.as_str(),
        "dropping media server event"
    );
    ReconcileOutcome::Dropped { reason }
}

impl<S, P, M> StreamLifecycleService<S, P, M>
where
    S: StreamRepository,
    P: PushRepository,
    M: MediaServerClient,
{
    /// Remove a leftover stream with the same name from the reporting node.
    async fn clean_up_stale_stream(&self, stream: &Stream, reporter_address: &str) {
        if reporter_address.trim().is_empty() {
            debug!(stream_id = %stream.id(), "no reporter address; skipping stale stream cleanup");
            return;
        }
        if let Err(err) = self
            .media_server
            .delete_stream(&stream.media_server_name(), reporter_address)
            .await
        {
            warn!(
                stream_id = %stream.id(),
                node = reporter_address,
                error = %err,
                "stale stream cleanup failed"
            );
        }
    }

    async fn apply_opening(
        &self,
        stream: &Stream,
        event: &StreamEvent,
    ) -> Result<Option<Stream>, Error> {
        self.clean_up_stale_stream(stream, &event.reporter_address)
            .await;
        let opening = StreamOpening {
            status: event.status.clone(),
            protocol: event.protocol.clone(),
            server_ip_address: event.reporter_address.clone(),
        };
        self.streams
            .record_opening(&stream.id(), &opening, self.clock.utc())
            .await
            .map_err(map_stream_repository_error)
    }
}

#[async_trait]
impl<S, P, M> StreamEventIngest for StreamLifecycleService<S, P, M>
where
    S: StreamRepository,
    P: PushRepository,
    M: MediaServerClient,
{
    async fn reconcile_event(&self, event: StreamEvent) -> Result<ReconcileOutcome, Error> {
        let Some(reference) = event.stream_reference() else {
            return Ok(dropped(&event, "reported url has no stream segment".to_owned()));
        };
        let Ok(stream_id) = reference.parse::<StreamId>() else {
            return Ok(dropped(
                &event,
                format!("stream reference {reference} is not a stream id"),
            ));
        };
        let Some(stream) = self
            .streams
            .find_by_id(&stream_id)
            .await
            .map_err(map_stream_repository_error)?
        else {
            return Ok(dropped(&event, format!("stream {stream_id} is unknown")));
        };

        let opening = event.status.is_opening();
        let updated = if opening {
            self.apply_opening(&stream, &event).await?
        } else {
            self.streams
                .update_status(&stream_id, &event.status, self.clock.utc())
                .await
                .map_err(map_stream_repository_error)?
        };

        if updated.is_none() {
            return Ok(dropped(
                &event,
                format!("stream {stream_id} disappeared before the update"),
            ));
        }

        info!(
            stream_id = %stream_id,
            status = event.status.as_str(),
            node = event.reporter_address.as_str(),
            "stream state reconciled"
        );
        Ok(ReconcileOutcome::Applied { stream_id, opening })
    }
}
