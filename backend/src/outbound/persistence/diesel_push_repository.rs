//! PostgreSQL-backed `PushRepository` implementation using Diesel ORM.
//!
//! The partial unique index `pushes_one_active_per_stream_idx` enforces the
//! single-active-push rule; inserts that would violate it surface as
//! `DuplicateActive`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PushRepository, PushRepositoryError};
use crate::domain::{Push, PushId, PushStatus, StreamId};

use super::diesel_basic_error_mapping::{
    DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewPushRow, PushRow};
use super::pool::{DbPool, PoolError};
use super::schema::pushes;

/// Diesel-backed implementation of the `PushRepository` port.
#[derive(Clone)]
pub struct DieselPushRepository {
    pool: DbPool,
}

impl DieselPushRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PushRepositoryError {
    map_basic_pool_error(error, PushRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error, stream_id: &StreamId) -> PushRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: PushRepositoryError::query,
            connection: PushRepositoryError::connection,
            unique_violation: || PushRepositoryError::duplicate_active(stream_id.to_string()),
        },
    )
}

fn map_query_error(error: diesel::result::Error) -> PushRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: PushRepositoryError::query,
            connection: PushRepositoryError::connection,
            unique_violation: || PushRepositoryError::query("unexpected unique violation"),
        },
    )
}

fn row_to_push(row: PushRow) -> Result<Push, PushRepositoryError> {
    row.into_domain().map_err(PushRepositoryError::query)
}

#[async_trait]
impl PushRepository for DieselPushRepository {
    async fn insert(&self, push: &Push) -> Result<(), PushRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(pushes::table)
            .values(NewPushRow::from(push))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, &push.stream_id()))
    }

    async fn find_active_for_stream(
        &self,
        stream_id: &StreamId,
    ) -> Result<Option<Push>, PushRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PushRow> = pushes::table
            .filter(pushes::stream_id.eq(stream_id.as_uuid()))
            .filter(pushes::status.eq(PushStatus::Active.as_str()))
            .select(PushRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_push).transpose()
    }

    async fn mark_inactive(
        &self,
        push_id: &PushId,
        at: DateTime<Utc>,
    ) -> Result<Option<Push>, PushRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = pushes::table
            .filter(pushes::id.eq(push_id.as_uuid()))
            .filter(pushes::status.eq(PushStatus::Active.as_str()));
        let row: Option<PushRow> = diesel::update(target)
            .set((
                pushes::status.eq(PushStatus::Inactive.as_str()),
                pushes::updated_at.eq(at),
            ))
            .returning(PushRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_push).transpose()
    }

    async fn list_for_stream(&self, stream_id: &StreamId) -> Result<Vec<Push>, PushRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PushRow> = pushes::table
            .filter(pushes::stream_id.eq(stream_id.as_uuid()))
            .order((pushes::created_at.desc(), pushes::id.desc()))
            .select(PushRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;
        rows.into_iter().map(row_to_push).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::build("invalid URL"));
        assert!(matches!(repo_err, PushRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn active_index_violation_maps_to_duplicate_active() {
        let stream_id = StreamId::random();
        let diesel_err = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );

        let repo_err = map_diesel_error(diesel_err, &stream_id);

        assert_eq!(
            repo_err,
            PushRepositoryError::duplicate_active(stream_id.to_string())
        );
    }

    #[rstest]
    fn closed_connections_map_to_connection_error() {
        let diesel_err = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        let repo_err = map_query_error(diesel_err);
        assert!(matches!(repo_err, PushRepositoryError::Connection { .. }));
    }
}
