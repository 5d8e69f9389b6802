//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records live next
//! to the rows so both repositories share them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    ExternalId, Push, PushDraft, PushId, PushStatus, Stream, StreamDraft, StreamId, StreamStatus,
};

use super::schema::{pushes, streams};

/// Row struct for reading from the streams table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = streams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StreamRow {
    pub id: Uuid,
    pub external_id: String,
    pub status: String,
    pub server_ip_address: Option<String>,
    pub protocol: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StreamRow {
    /// Rehydrate a domain stream. Fails only when the stored external id no
    /// longer satisfies domain validation.
    pub(crate) fn into_domain(self) -> Result<Stream, String> {
        let external_id = ExternalId::new(self.external_id)
            .map_err(|err| format!("stream {} has invalid external id: {err}", self.id))?;
        Ok(Stream::from_draft(StreamDraft {
            id: StreamId::from_uuid(self.id),
            external_id,
            status: StreamStatus::reported(self.status),
            server_ip_address: self.server_ip_address,
            protocol: self.protocol,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Insertable struct for creating stream records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = streams)]
pub(crate) struct NewStreamRow<'a> {
    pub id: Uuid,
    pub external_id: &'a str,
    pub status: &'a str,
    pub server_ip_address: Option<&'a str>,
    pub protocol: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Stream> for NewStreamRow<'a> {
    fn from(stream: &'a Stream) -> Self {
        Self {
            id: *stream.id().as_uuid(),
            external_id: stream.external_id().as_str(),
            status: stream.status().as_str(),
            server_ip_address: stream.server_ip_address(),
            protocol: stream.protocol(),
            created_at: stream.created_at(),
            updated_at: stream.updated_at(),
        }
    }
}

/// Changeset applied when a node reports a stream opening. Blank values
/// clear the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = streams)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct StreamOpeningUpdate<'a> {
    pub status: &'a str,
    pub protocol: Option<&'a str>,
    pub server_ip_address: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied for every other reported status.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = streams)]
pub(crate) struct StreamStatusUpdate<'a> {
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Push models
// ---------------------------------------------------------------------------

/// Row struct for reading from the pushes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pushes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PushRow {
    pub id: Uuid,
    pub stream_id: Uuid,
    pub rtmp_url: String,
    pub status: String,
    pub server_ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PushRow {
    pub(crate) fn into_domain(self) -> Result<Push, String> {
        let status: PushStatus = self
            .status
            .parse()
            .map_err(|err| format!("push {} has {err}", self.id))?;
        Ok(Push::from_draft(PushDraft {
            id: PushId::from_uuid(self.id),
            stream_id: StreamId::from_uuid(self.stream_id),
            rtmp_url: self.rtmp_url,
            status,
            server_ip_address: self.server_ip_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Insertable struct for creating push records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pushes)]
pub(crate) struct NewPushRow<'a> {
    pub id: Uuid,
    pub stream_id: Uuid,
    pub rtmp_url: &'a str,
    pub status: &'a str,
    pub server_ip_address: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Push> for NewPushRow<'a> {
    fn from(push: &'a Push) -> Self {
        Self {
            id: *push.id().as_uuid(),
            stream_id: *push.stream_id().as_uuid(),
            rtmp_url: push.rtmp_url(),
            status: push.status().as_str(),
            server_ip_address: push.server_ip_address(),
            created_at: push.created_at(),
            updated_at: push.updated_at(),
        }
    }
}
