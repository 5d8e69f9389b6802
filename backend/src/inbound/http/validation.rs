//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure is an `invalid_request` error whose details name the
//! offending field in the wire casing.

use serde_json::json;

use crate::domain::{
    Error, ExternalId, ExternalIdValidationError, RtmpDestination, RtmpDestinationError, StreamId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidExternalId,
    InvalidRtmpUrl,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidExternalId => "invalid_external_id",
            ErrorCode::InvalidRtmpUrl => "invalid_rtmp_url",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const STREAM_ID: FieldName = FieldName::new("streamId");
pub(crate) const EXTERNAL_ID: FieldName = FieldName::new("externalId");
pub(crate) const RTMP_URL: FieldName = FieldName::new("rtmpUrl");

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn parse_stream_id(value: &str) -> Result<StreamId, Error> {
    value.trim().parse().map_err(|_| {
        let field = STREAM_ID.as_str();
        ValidationError::new(field, format!("{field} must be a valid UUID"))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_external_id(value: Option<String>) -> Result<ExternalId, Error> {
    let raw = value.ok_or_else(|| missing_field_error(EXTERNAL_ID))?;
    ExternalId::new(raw).map_err(|err| {
        let field = EXTERNAL_ID.as_str();
        match err {
            ExternalIdValidationError::Empty => missing_field_error(EXTERNAL_ID),
            ExternalIdValidationError::TooLong { .. } => {
                ValidationError::new(field, err.to_string())
                    .with_code(ErrorCode::InvalidExternalId)
            }
        }
    })
}

pub(crate) fn parse_rtmp_destination(value: Option<String>) -> Result<RtmpDestination, Error> {
    let raw = value.ok_or_else(|| missing_field_error(RTMP_URL))?;
    RtmpDestination::parse(raw.as_str()).map_err(|err| match err {
        RtmpDestinationError::Empty => missing_field_error(RTMP_URL),
        other => ValidationError::new(RTMP_URL.as_str(), other.to_string())
            .with_value(ErrorCode::InvalidRtmpUrl, raw.as_str()),
    })
}
