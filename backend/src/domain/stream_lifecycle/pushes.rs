//! Push start/stop with failover.

use async_trait::async_trait;
use tracing::{info, warn};

use super::{StreamLifecycleService, map_media_server_error, map_push_repository_error};
use crate::domain::ports::{
    MediaServerClient, PushCommand, PushRepository, StartPushCommand, StartPushRequest,
    StartPushResponse, StopPushRequest, StopPushResponse, StreamRepository,
};
use crate::domain::{Error, Push, PushId, Stream, StreamId};

/// Node a push has to be stopped on. Records written before the node was
/// tracked fall back to the stream's current host.
fn push_node<'a>(push: &'a Push, stream: &'a Stream) -> &'a str {
    if push.server_ip_address().is_empty() {
        stream.server_ip_address().unwrap_or_default()
    } else {
        push.server_ip_address()
    }
}

impl<S, P, M> StreamLifecycleService<S, P, M>
where
    S: StreamRepository,
    P: PushRepository,
    M: MediaServerClient,
{
    async fn find_active_push(&self, stream_id: &StreamId) -> Result<Option<Push>, Error> {
        self.pushes
            .find_active_for_stream(stream_id)
            .await
            .map_err(map_push_repository_error)
    }

    /// Stop a push remotely, then mark it inactive.
    ///
    /// A remote not-found means the push already stopped and is not an error.
    async fn retire_push(&self, stream: &Stream, push: &Push) -> Result<Push, Error> {
        let node_address = push_node(push, stream);
        match self.media_server.stop_push(node_address, &push.id()).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                info!(
                    push_id = %push.id(),
                    node = node_address,
                    "push already absent on media server"
                );
            }
            Err(err) => {
                warn!(
                    push_id = %push.id(),
                    node = node_address,
                    error = %err,
                    "media server refused to stop push"
                );
                return Err(map_media_server_error("stop push", node_address, &err));
            }
        }

        let now = self.clock.utc();
        let marked = self
            .pushes
            .mark_inactive(&push.id(), now)
            .await
            .map_err(map_push_repository_error)?;

        Ok(marked.unwrap_or_else(|| {
            let mut retired = push.clone();
            retired.deactivate(now);
            retired
        }))
    }

    /// Undo a remote start whose local record could not be written.
    async fn abandon_started_push(&self, node_address: &str, push_id: &PushId) {
        if let Err(err) = self.media_server.stop_push(node_address, push_id).await {
            warn!(
                push_id = %push_id,
                node = node_address,
                error = %err,
                "could not stop push after failing to record it"
            );
        }
    }
}

#[async_trait]
impl<S, P, M> PushCommand for StreamLifecycleService<S, P, M>
where
    S: StreamRepository,
    P: PushRepository,
    M: MediaServerClient,
{
    async fn start_push(&self, request: StartPushRequest) -> Result<StartPushResponse, Error> {
        let StartPushRequest {
            stream_id,
            destination,
        } = request;

        let stream = self.require_stream(&stream_id).await?;
        let node_address = stream
            .server_ip_address()
            .ok_or_else(|| {
                Error::conflict(format!(
                    "stream {stream_id} is not hosted by a media server node yet"
                ))
            })?
            .to_owned();

        let replaced = match self.find_active_push(&stream_id).await? {
            Some(active) => {
                let retired = self.retire_push(&stream, &active).await?;
                info!(
                    stream_id = %stream_id,
                    push_id = %retired.id(),
                    "stopped active push before starting a new one"
                );
                Some(retired.id())
            }
            None => None,
        };

        let push_id = PushId::random();
        let command = StartPushCommand {
            node_address: node_address.clone(),
            stream_name: stream.media_server_name(),
            destination: destination.clone(),
            push_id,
        };
        self.media_server.start_push(&command).await.map_err(|err| {
            warn!(
                stream_id = %stream_id,
                push_id = %push_id,
                node = node_address.as_str(),
                error = %err,
                "media server refused to start push"
            );
            map_media_server_error("start push", &node_address, &err)
        })?;

        let push = Push::activate(
            push_id,
            stream_id,
            &destination,
            node_address.as_str(),
            self.clock.utc(),
        );
        if let Err(err) = self.pushes.insert(&push).await {
            self.abandon_started_push(&node_address, &push_id).await;
            return Err(map_push_repository_error(err));
        }

        info!(
            stream_id = %stream_id,
            push_id = %push_id,
            destination = %destination,
            node = node_address.as_str(),
            "push started"
        );
        Ok(StartPushResponse {
            push: push.into(),
            replaced,
        })
    }

    async fn stop_push(&self, request: StopPushRequest) -> Result<StopPushResponse, Error> {
        let StopPushRequest { stream_id } = request;
        let stream = self.require_stream(&stream_id).await?;
        let active = self
            .find_active_push(&stream_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("stream {stream_id} has no active push")))?;

        let stopped = self.retire_push(&stream, &active).await?;
        info!(stream_id = %stream_id, push_id = %stopped.id(), "push stopped");
        Ok(StopPushResponse {
            push: stopped.into(),
        })
    }
}
