//! In-memory lifecycle store.
//!
//! Implements both `StreamRepository` and `PushRepository` over maps guarded
//! by one `tokio::sync::RwLock`. It serves development runs without a database
//! and the integration tests.
//!
//! State is lost on restart. The database constraints are emulated under the
//! write lock: external ids are unique and each stream has at most one active
//! push.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    PushRepository, PushRepositoryError, StreamRepository, StreamRepositoryError,
};
use crate::domain::{ExternalId, Push, PushId, Stream, StreamId, StreamOpening, StreamStatus};

#[derive(Debug, Default)]
struct LifecycleState {
    streams: HashMap<StreamId, Stream>,
    /// `external_id -> stream id`, mirrors the unique constraint.
    external_ids: HashMap<String, StreamId>,
    /// Insertion order doubles as history order.
    pushes: Vec<Push>,
}

/// Shared in-memory store; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLifecycleStore {
    state: Arc<RwLock<LifecycleState>>,
}

impl InMemoryLifecycleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamRepository for InMemoryLifecycleStore {
    async fn insert(&self, stream: &Stream) -> Result<(), StreamRepositoryError> {
        let mut state = self.state.write().await;
        let external_id = stream.external_id().as_str();
        if state.external_ids.contains_key(external_id) {
            return Err(StreamRepositoryError::duplicate_external_id(external_id));
        }
        state
            .external_ids
            .insert(external_id.to_owned(), stream.id());
        state.streams.insert(stream.id(), stream.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &StreamId) -> Result<Option<Stream>, StreamRepositoryError> {
        Ok(self.state.read().await.streams.get(id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .external_ids
            .get(external_id.as_str())
            .and_then(|id| state.streams.get(id))
            .cloned())
    }

    async fn record_opening(
        &self,
        id: &StreamId,
        opening: &StreamOpening,
        at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.streams.get_mut(id).map(|stream| {
            stream.apply_opening(opening, at);
            stream.clone()
        }))
    }

    async fn update_status(
        &self,
        id: &StreamId,
        status: &StreamStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.streams.get_mut(id).map(|stream| {
            stream.apply_status(status.clone(), at);
            stream.clone()
        }))
    }
}

#[async_trait]
impl PushRepository for InMemoryLifecycleStore {
    async fn insert(&self, push: &Push) -> Result<(), PushRepositoryError> {
        let mut state = self.state.write().await;
        let stream_id = push.stream_id();
        if push.is_active()
            && state
                .pushes
                .iter()
                .any(|existing| existing.stream_id() == stream_id && existing.is_active())
        {
            return Err(PushRepositoryError::duplicate_active(stream_id.to_string()));
        }
        state.pushes.push(push.clone());
        Ok(())
    }

    async fn find_active_for_stream(
        &self,
        stream_id: &StreamId,
    ) -> Result<Option<Push>, PushRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .pushes
            .iter()
            .find(|push| push.stream_id() == *stream_id && push.is_active())
            .cloned())
    }

    async fn mark_inactive(
        &self,
        push_id: &PushId,
        at: DateTime<Utc>,
    ) -> Result<Option<Push>, PushRepositoryError> {
        let mut state = self.state.write().await;
        Ok(state
            .pushes
            .iter_mut()
            .find(|push| push.id() == *push_id && push.is_active())
            .map(|push| {
                push.deactivate(at);
                push.clone()
            }))
    }

    async fn list_for_stream(&self, stream_id: &StreamId) -> Result<Vec<Push>, PushRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .pushes
            .iter()
            .rev()
            .filter(|push| push.stream_id() == *stream_id)
            .cloned()
            .collect())
    }
}
