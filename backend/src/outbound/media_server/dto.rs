//! Wire payloads for the media server control API.

use serde::{Deserialize, Serialize};

use crate::domain::ports::StartPushCommand;

const PUSH_PROTOCOL: &str = "rtmp";

#[derive(Debug, Serialize)]
pub(super) struct StartPushBodyDto<'a> {
    pub(super) id: String,
    pub(super) stream: PushStreamDto,
    pub(super) protocol: &'a str,
    pub(super) url: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct PushStreamDto {
    pub(super) name: String,
}

impl<'a> StartPushBodyDto<'a> {
    /// Build the body for `startPush`; the pushed stream carries `suffix`.
    pub(super) fn from_command(command: &'a StartPushCommand, suffix: &str) -> Self {
        Self {
            id: command.push_id.to_string(),
            stream: PushStreamDto {
                name: format!("{}{suffix}", command.stream_name),
            },
            protocol: PUSH_PROTOCOL,
            url: command.destination.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct StopPushBodyDto {
    pub(super) id: String,
}

/// Envelope returned by the control API. Only the fields worth logging are
/// decoded.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ControlResponseDto {
    #[serde(default)]
    pub(super) status_code: Option<u16>,
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) response: Option<PushStateDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PushStateDto {
    #[serde(default)]
    pub(super) state: Option<String>,
}

impl ControlResponseDto {
    pub(super) fn decode_lenient(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub(super) fn push_state(&self) -> Option<&str> {
        self.response.as_ref()?.state.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PushId, RtmpDestination};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn start_push_body_matches_control_api_shape() {
        let command = StartPushCommand {
            node_address: "10.0.0.5".to_owned(),
            stream_name: "6f1c2f54".to_owned(),
            destination: RtmpDestination::parse("rtmp://dest/a").expect("valid destination"),
            push_id: PushId::from_uuid(Uuid::nil()),
        };

        let body = serde_json::to_value(StartPushBodyDto::from_command(&command, "_rtmp"))
            .expect("body serialises");

        assert_eq!(
            body,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "stream": { "name": "6f1c2f54_rtmp" },
                "protocol": "rtmp",
                "url": "rtmp://dest/a",
            })
        );
    }

    #[test]
    fn decodes_push_state_from_envelope() {
        let body = br#"{"statusCode":200,"message":"OK","response":{"state":"ready","id":"x"}}"#;
        let decoded = ControlResponseDto::decode_lenient(body);
        assert_eq!(decoded.status_code, Some(200));
        assert_eq!(decoded.push_state(), Some("ready"));
    }

    #[test]
    fn tolerates_non_json_bodies() {
        let decoded = ControlResponseDto::decode_lenient(b"<html>ok</html>");
        assert!(decoded.message.is_none());
        assert!(decoded.push_state().is_none());
    }
}
