//! Driven port for push persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Push, PushId, StreamId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by push repository adapters.
    pub enum PushRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "push repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "push repository query failed: {message}",
        /// The stream already has an active push.
        DuplicateActive { stream_id: String } =>
            "stream {stream_id} already has an active push",
    }
}

/// Port for the append-only push history of each stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushRepository: Send + Sync {
    /// Insert a new push. Adapters reject a second active push for the same
    /// stream with `DuplicateActive`.
    async fn insert(&self, push: &Push) -> Result<(), PushRepositoryError>;

    async fn find_active_for_stream(
        &self,
        stream_id: &StreamId,
    ) -> Result<Option<Push>, PushRepositoryError>;

    /// Flip an active push to inactive.
    ///
    /// The update only matches while the push is still active; `None` means
    /// another caller already deactivated it or it does not exist.
    async fn mark_inactive(
        &self,
        push_id: &PushId,
        at: DateTime<Utc>,
    ) -> Result<Option<Push>, PushRepositoryError>;

    /// All pushes of a stream, newest first.
    async fn list_for_stream(&self, stream_id: &StreamId) -> Result<Vec<Push>, PushRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePushRepository;

#[async_trait]
impl PushRepository for FixturePushRepository {
    async fn insert(&self, _push: &Push) -> Result<(), PushRepositoryError> {
        Ok(())
    }

    async fn find_active_for_stream(
        &self,
        _stream_id: &StreamId,
    ) -> Result<Option<Push>, PushRepositoryError> {
        Ok(None)
    }

    async fn mark_inactive(
        &self,
        _push_id: &PushId,
        _at: DateTime<Utc>,
    ) -> Result<Option<Push>, PushRepositoryError> {
        Ok(None)
    }

    async fn list_for_stream(
        &self,
        _stream_id: &StreamId,
    ) -> Result<Vec<Push>, PushRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_list_returns_empty() {
        let listed = FixturePushRepository
            .list_for_stream(&StreamId::random())
            .await
            .expect("fixture list succeeds");
        assert!(listed.is_empty());
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = PushRepositoryError::connection("pool exhausted");
        assert!(err.to_string().contains("pool exhausted"));
    }
}
