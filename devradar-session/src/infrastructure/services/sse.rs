use devradar_config::RetryPolicy;
use devradar_model::{Dev, SubscriptionScope};
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use tokio::runtime::Handle;
use url::Url;

use crate::error::{SessionError, StreamError};
use crate::infrastructure::services::stream::{
    StreamEvent, StreamEventKind, StreamService, StreamSink, SubscriptionHandle, SubscriptionId,
};

/// Event name the server uses for newly registered devs.
pub const NEW_DEV_EVENT: &str = "new-dev";

/// Server-sent events implementation of [`StreamService`].
///
/// Each subscription runs in its own task that reconnects with the configured
/// backoff until the handle is closed or the retry budget runs out.
#[derive(Debug, Clone)]
pub struct SseStreamService {
    client: reqwest::Client,
    events_url: String,
    retry: RetryPolicy,
}

impl SseStreamService {
    /// `events_url` is the absolute URL of the events route, without query.
    pub fn new(events_url: impl Into<String>, retry: RetryPolicy) -> Result<Self, SessionError> {
        // No request timeout here: the response body is the long-lived stream.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| SessionError::Setup(format!("failed to create SSE client: {err}")))?;

        Ok(Self {
            client,
            events_url: events_url.into(),
            retry,
        })
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

impl StreamService for SseStreamService {
    fn open(
        &self,
        id: SubscriptionId,
        scope: SubscriptionScope,
        sink: StreamSink,
    ) -> Result<SubscriptionHandle, StreamError> {
        let runtime = Handle::try_current()
            .map_err(|_| StreamError::Connect("no async runtime available".into()))?;
        let url = Url::parse_with_params(&self.events_url, scope.query_pairs())
            .map_err(|err| StreamError::Connect(format!("invalid events url: {err}")))?;

        log::info!("Opening subscription {} at {}", id, url);

        let connection = SseConnection {
            id,
            url,
            client: self.client.clone(),
            sink,
            retry: self.retry,
            retry_count: 0,
        };
        let task = runtime.spawn(connection.run());

        Ok(SubscriptionHandle::new(id, scope).with_task(task))
    }
}

enum PumpOutcome {
    /// The session dropped its receiver; nothing left to deliver to.
    ReceiverGone,
    /// Connection failed or ended; eligible for reconnect.
    Failed(String),
}

/// State machine for one subscription's SSE connection.
struct SseConnection {
    id: SubscriptionId,
    url: Url,
    client: reqwest::Client,
    sink: StreamSink,
    retry: RetryPolicy,
    retry_count: u32,
}

impl SseConnection {
    async fn run(mut self) {
        loop {
            if self.retry_count > 0 {
                let delay = self.retry.backoff_for(self.retry_count);
                log::info!(
                    "Retrying subscription {} after {:?} (attempt #{})",
                    self.id,
                    delay,
                    self.retry_count + 1
                );
                tokio::time::sleep(delay).await;
            }

            match self.pump().await {
                PumpOutcome::ReceiverGone => {
                    log::debug!("Subscription {} has no listener left", self.id);
                    return;
                }
                PumpOutcome::Failed(reason) => {
                    log::warn!("Subscription {} interrupted: {}", self.id, reason);
                    self.retry_count += 1;
                    if !self.retry.allows(self.retry_count) {
                        log::error!("Max retries exceeded for subscription {}", self.id);
                        let _ = self.sink.send(StreamEvent::new(
                            self.id,
                            StreamEventKind::Closed { reason },
                        ));
                        return;
                    }
                }
            }
        }
    }

    async fn pump(&mut self) -> PumpOutcome {
        let request = self.client.get(self.url.clone());
        let mut source = match EventSource::new(request) {
            Ok(source) => source,
            Err(err) => return PumpOutcome::Failed(err.to_string()),
        };

        while let Some(event) = source.next().await {
            let kind = match event {
                Ok(Event::Open) => {
                    log::info!("Subscription {} connection opened", self.id);
                    self.retry_count = 0;
                    StreamEventKind::Opened
                }
                Ok(Event::Message(message)) => match decode_message(&message) {
                    Some(dev) => StreamEventKind::Pushed(dev),
                    None => continue,
                },
                Err(err) => {
                    source.close();
                    return PumpOutcome::Failed(err.to_string());
                }
            };

            if self.sink.send(StreamEvent::new(self.id, kind)).is_err() {
                source.close();
                return PumpOutcome::ReceiverGone;
            }
        }

        PumpOutcome::Failed("event stream ended".into())
    }
}

/// Decode a `new-dev` message; keepalives and unknown events yield `None`.
fn decode_message(message: &eventsource_stream::Event) -> Option<Dev> {
    // Skip keepalive messages silently
    if message.data == "keepalive" || message.data.is_empty() {
        log::debug!("Received subscription keepalive");
        return None;
    }

    if message.event != NEW_DEV_EVENT {
        log::debug!(
            "Unknown subscription event type: {} with data: {}",
            message.event,
            message.data
        );
        return None;
    }

    match serde_json::from_str::<Dev>(&message.data) {
        Ok(dev) => {
            log::debug!("Received new dev {}", dev.id);
            Some(dev)
        }
        Err(err) => {
            let err = StreamError::Decode(err.to_string());
            log::error!("{} - Data: {}", err, message.data);
            None
        }
    }
}
