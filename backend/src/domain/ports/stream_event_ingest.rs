//! Driving port for media server webhook events.

use async_trait::async_trait;

use crate::domain::{Error, StreamEvent, StreamId};

/// What reconciliation did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The stream record was overwritten.
    Applied { stream_id: StreamId, opening: bool },
    /// The event could not be tied to a stored stream and was discarded.
    Dropped { reason: String },
}

/// Driving port for webhook reconciliation.
///
/// Unresolvable events yield `Ok(Dropped)`; `Err` is reserved for store
/// failures so the webhook adapter can log them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamEventIngest: Send + Sync {
    async fn reconcile_event(&self, event: StreamEvent) -> Result<ReconcileOutcome, Error>;
}

/// Fixture ingest that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStreamEventIngest;

#[async_trait]
impl StreamEventIngest for FixtureStreamEventIngest {
    async fn reconcile_event(&self, _event: StreamEvent) -> Result<ReconcileOutcome, Error> {
        Ok(ReconcileOutcome::Dropped {
            reason: "no lifecycle store configured".to_owned(),
        })
    }
}
