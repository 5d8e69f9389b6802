//! Driven port for stream persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ExternalId, Stream, StreamId, StreamOpening, StreamStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by stream repository adapters.
    pub enum StreamRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "stream repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "stream repository query failed: {message}",
        /// Another stream already owns the external id.
        DuplicateExternalId { external_id: String } =>
            "stream with external id {external_id} already exists",
    }
}

/// Port for storing streams and applying webhook-reported state.
///
/// Updates are single-record overwrites; each returns the stored stream after
/// the write, or `None` when no stream has the identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// Insert a new stream. Fails with `DuplicateExternalId` when the external
    /// id is already taken.
    async fn insert(&self, stream: &Stream) -> Result<(), StreamRepositoryError>;

    async fn find_by_id(&self, id: &StreamId) -> Result<Option<Stream>, StreamRepositoryError>;

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Stream>, StreamRepositoryError>;

    /// Overwrite status, protocol and hosting node.
    async fn record_opening(
        &self,
        id: &StreamId,
        opening: &StreamOpening,
        at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError>;

    /// Overwrite the status only.
    async fn update_status(
        &self,
        id: &StreamId,
        status: &StreamStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStreamRepository;

#[async_trait]
impl StreamRepository for FixtureStreamRepository {
    async fn insert(&self, _stream: &Stream) -> Result<(), StreamRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &StreamId) -> Result<Option<Stream>, StreamRepositoryError> {
        Ok(None)
    }

    async fn find_by_external_id(
        &self,
        _external_id: &ExternalId,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        Ok(None)
    }

    async fn record_opening(
        &self,
        _id: &StreamId,
        _opening: &StreamOpening,
        _at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        Ok(None)
    }

    async fn update_status(
        &self,
        _id: &StreamId,
        _status: &StreamStatus,
        _at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_return_none() {
        let repo = FixtureStreamRepository;
        let external_id = ExternalId::new("ext-1").expect("valid external id");

        assert!(
            repo.find_by_external_id(&external_id)
                .await
                .expect("fixture lookup succeeds")
                .is_none()
        );
        assert!(
            repo.update_status(&StreamId::random(), &StreamStatus::reported("closing"), Utc::now())
                .await
                .expect("fixture update succeeds")
                .is_none()
        );
    }

    #[rstest]
    fn duplicate_error_names_external_id() {
        let err = StreamRepositoryError::duplicate_external_id("ext-1");
        assert_eq!(err.to_string(), "stream with external id ext-1 already exists");
    }
}
