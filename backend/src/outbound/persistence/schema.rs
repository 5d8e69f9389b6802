//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. `diesel print-schema`
//! regenerates them from a migrated database.

diesel::table! {
    /// Logical live streams.
    ///
    /// `external_id` carries a unique constraint so concurrent creates for the
    /// same caller identifier resolve to one row.
    streams (id) {
        /// Primary key: UUID v4, also the media server stream name.
        id -> Uuid,
        /// Caller-supplied idempotency key.
        external_id -> Varchar,
        /// Last reported status, free-form.
        status -> Varchar,
        /// Node that last reported the stream opening.
        server_ip_address -> Nullable<Varchar>,
        /// Ingest protocol reported with the opening.
        protocol -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only push history.
    ///
    /// A partial unique index on `stream_id` where `status = 'active'` keeps
    /// at most one active push per stream.
    pushes (id) {
        /// Primary key: UUID v4, also the media server push id.
        id -> Uuid,
        stream_id -> Uuid,
        /// RTMP destination as supplied by the caller.
        rtmp_url -> Varchar,
        /// Either `active` or `inactive`.
        status -> Varchar,
        /// Node the push was started on.
        server_ip_address -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(pushes -> streams (stream_id));
diesel::allow_tables_to_appear_in_same_query!(streams, pushes);
