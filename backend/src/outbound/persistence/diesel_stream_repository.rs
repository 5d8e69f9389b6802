//! PostgreSQL-backed `StreamRepository` implementation using Diesel ORM.
//!
//! Status updates are single `UPDATE ... RETURNING` statements, so a webhook
//! report either overwrites the row or finds nothing to update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StreamRepository, StreamRepositoryError};
use crate::domain::{ExternalId, Stream, StreamId, StreamOpening, StreamStatus};

use super::diesel_basic_error_mapping::{
    DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewStreamRow, StreamOpeningUpdate, StreamRow, StreamStatusUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::streams;

/// Diesel-backed implementation of the `StreamRepository` port.
#[derive(Clone)]
pub struct DieselStreamRepository {
    pool: DbPool,
}

impl DieselStreamRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StreamRepositoryError {
    map_basic_pool_error(error, StreamRepositoryError::connection)
}

/// Map Diesel errors; a unique violation on insert can only be the external id.
fn map_diesel_error(error: diesel::result::Error, external_id: &str) -> StreamRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: StreamRepositoryError::query,
            connection: StreamRepositoryError::connection,
            unique_violation: || StreamRepositoryError::duplicate_external_id(external_id),
        },
    )
}

fn map_query_error(error: diesel::result::Error) -> StreamRepositoryError {
    map_diesel_error(error, "")
}

fn row_to_stream(row: StreamRow) -> Result<Stream, StreamRepositoryError> {
    row.into_domain().map_err(StreamRepositoryError::query)
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[async_trait]
impl StreamRepository for DieselStreamRepository {
    async fn insert(&self, stream: &Stream) -> Result<(), StreamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(streams::table)
            .values(NewStreamRow::from(stream))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, stream.external_id().as_str()))
    }

    async fn find_by_id(&self, id: &StreamId) -> Result<Option<Stream>, StreamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StreamRow> = streams::table
            .filter(streams::id.eq(id.as_uuid()))
            .select(StreamRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_stream).transpose()
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StreamRow> = streams::table
            .filter(streams::external_id.eq(external_id.as_str()))
            .select(StreamRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_stream).transpose()
    }

    async fn record_opening(
        &self,
        id: &StreamId,
        opening: &StreamOpening,
        at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = StreamOpeningUpdate {
            status: opening.status.as_str(),
            protocol: non_blank(&opening.protocol),
            server_ip_address: non_blank(&opening.server_ip_address),
            updated_at: at,
        };
        let row: Option<StreamRow> =
            diesel::update(streams::table.filter(streams::id.eq(id.as_uuid())))
                .set(&changes)
                .returning(StreamRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_query_error)?;
        row.map(row_to_stream).transpose()
    }

    async fn update_status(
        &self,
        id: &StreamId,
        status: &StreamStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Stream>, StreamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = StreamStatusUpdate {
            status: status.as_str(),
            updated_at: at,
        };
        let row: Option<StreamRow> =
            diesel::update(streams::table.filter(streams::id.eq(id.as_uuid())))
                .set(&changes)
                .returning(StreamRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_query_error)?;
        row.map(row_to_stream).transpose()
    }
}
