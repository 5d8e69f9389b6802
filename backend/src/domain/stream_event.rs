//! Status events reported by the media server through its admission webhook.

use url::Url;

use super::StreamStatus;

/// A lifecycle report for one stream, decoded from the webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// URL the media server reports; its last path segment names the stream.
    pub url: String,
    pub status: StreamStatus,
    pub protocol: String,
    /// Address of the node that delivered the event.
    pub reporter_address: String,
}

impl StreamEvent {
    /// Last path segment of the reported URL, taken verbatim.
    ///
    /// Returns `None` when the URL does not parse or the segment is empty.
    ///
    /// # Examples
    /// ```
    /// use stream_relay::domain::{StreamEvent, StreamStatus};
    ///
    /// let event = StreamEvent {
    ///     url: "http://10.0.0.5:3333/app/abc?direction=whip".to_owned(),
    ///     status: StreamStatus::reported("opening"),
    ///     protocol: "whip".to_owned(),
    ///     reporter_address: "10.0.0.5".to_owned(),
    /// };
    /// assert_eq!(event.stream_reference().as_deref(), Some("abc"));
    /// ```
    #[must_use]
    pub fn stream_reference(&self) -> Option<String> {
        last_path_segment(&self.url)
    }
}

fn last_path_segment(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    parsed
        .path()
        .trim_start_matches('/')
        .split('/')
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whip("http://146.190.194.9:3333/app/test?direction=whip", Some("test"))]
    #[case::rtmp("rtmp://10.0.0.5:1935/app/6f1c2f54", Some("6f1c2f54"))]
    #[case::encoded("http://node/app/a%20b", Some("a%20b"))]
    #[case::trailing_slash("http://node/app/", None)]
    #[case::root_only("http://node", None)]
    #[case::not_a_url("app/test", None)]
    fn extracts_last_segment(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(last_path_segment(url).as_deref(), expected);
    }
}
