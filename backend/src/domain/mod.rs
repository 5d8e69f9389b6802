//! Domain primitives, ports and lifecycle services.
//!
//! Purpose: model streams, pushes and media server events independently of
//! HTTP and storage. Adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - Stream / Push: lifecycle records and their validated inputs.
//! - StreamEvent: decoded webhook report.
//! - StreamLifecycleService / StreamQueryService: port implementations.

pub mod error;
pub mod ports;
mod push;
mod stream;
mod stream_event;
mod stream_lifecycle;
mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorDto, ErrorValidationError, TRACE_ID_HEADER};
pub use self::push::{
    Push, PushDraft, PushId, PushStatus, RtmpDestination, RtmpDestinationError,
    UnknownPushStatus,
};
pub use self::stream::{
    EXTERNAL_ID_MAX_LEN, ExternalId, ExternalIdValidationError, IngestEndpoint, Stream,
    StreamDraft, StreamId, StreamOpening, StreamStatus,
};
pub use self::stream_event::StreamEvent;
pub use self::stream_lifecycle::{StreamLifecycleService, StreamQueryService};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use stream_relay::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("stream missing"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
