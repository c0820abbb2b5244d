//! §4.3 Fan-Out Publisher: dual-write an envelope to the stream and the
//! event bus. Never throws to the caller — both destinations are
//! best-effort and independent.

use std::sync::Arc;

use async_trait::async_trait;
use ingestgate_core::envelope::EnvelopeV1;
use ingestgate_core::ports::{EventBusPublisher, FanOutPublisher, PublishOutcome, StreamPublisher};
use tracing::{error, warn};

pub struct FanOutPublisherImpl {
    /// `None` when the stream client was never initialized (no credentials).
    stream: Option<Arc<dyn StreamPublisher>>,
    bus: Arc<dyn EventBusPublisher>,
    event_source: String,
}

impl FanOutPublisherImpl {
    pub fn new(
        stream: Option<Arc<dyn StreamPublisher>>,
        bus: Arc<dyn EventBusPublisher>,
        event_source: impl Into<String>,
    ) -> Self {
        Self {
            stream,
            bus,
            event_source: event_source.into(),
        }
    }
}

#[derive(serde::Serialize)]
struct StreamRecord<'a> {
    envelope: &'a EnvelopeV1,
    trace_id: &'a str,
    tenant_id: uuid::Uuid,
    schema_version: &'a str,
}

#[async_trait]
impl FanOutPublisher for FanOutPublisherImpl {
    async fn publish(&self, envelope: &EnvelopeV1) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        match &self.stream {
            Some(stream) => {
                let record = StreamRecord {
                    envelope,
                    trace_id: &envelope.trace_id,
                    tenant_id: envelope.tenant_id,
                    schema_version: &envelope.schema_version,
                };
                match serde_json::to_vec(&record) {
                    Ok(payload) => {
                        let partition_key = envelope.tenant_id.to_string();
                        match stream.put_record(&partition_key, &payload).await {
                            Ok(ack) => outcome.stream_ack = Some(ack),
                            Err(e) => error!(
                                interaction_id = %envelope.interaction_id,
                                tenant_id = %envelope.tenant_id,
                                error = %e,
                                "stream publish failed"
                            ),
                        }
                    }
                    Err(e) => error!(
                        interaction_id = %envelope.interaction_id,
                        error = %e,
                        "failed to serialize stream record"
                    ),
                }
            }
            None => warn!(
                interaction_id = %envelope.interaction_id,
                "stream publisher not configured, skipping stream publish"
            ),
        }

        let detail_json = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(e) => {
                error!(
                    interaction_id = %envelope.interaction_id,
                    error = %e,
                    "failed to serialize envelope for event bus, skipping bus publish"
                );
                return outcome;
            }
        };

        match self
            .bus
            .put_event(&self.event_source, "BatchProcessingCompleted", &detail_json)
            .await
        {
            Ok(ack) => outcome.bus_ack = Some(ack),
            Err(e) => error!(
                interaction_id = %envelope.interaction_id,
                tenant_id = %envelope.tenant_id,
                error = %e,
                "event bus publish failed"
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestgate_core::envelope::{ContentFormat, EnvelopeBuilder, EnvelopeSource, InteractionType};
    use ingestgate_core::error::Result;
    use uuid::Uuid;

    struct FailingStream;
    #[async_trait]
    impl StreamPublisher for FailingStream {
        async fn put_record(&self, _partition_key: &str, _payload: &[u8]) -> Result<ingestgate_core::ports::PublishAck> {
            Err(ingestgate_core::error::Error::PublishFailed("boom".to_string()))
        }
    }

    struct OkBus;
    #[async_trait]
    impl EventBusPublisher for OkBus {
        async fn put_event(&self, _source: &str, _detail_type: &str, _detail_json: &str) -> Result<ingestgate_core::ports::PublishAck> {
            Ok(ingestgate_core::ports::PublishAck("evt-1".to_string()))
        }
    }

    fn sample_envelope() -> EnvelopeV1 {
        EnvelopeBuilder::new().build(
            Uuid::new_v4(),
            "user-1",
            InteractionType::Note,
            "hello",
            ContentFormat::Plain,
            EnvelopeSource::Api,
            Uuid::new_v4(),
            Uuid::new_v4().to_string(),
        )
    }

    #[tokio::test]
    async fn stream_failure_does_not_block_bus_publish() {
        let publisher = FanOutPublisherImpl::new(
            Some(Arc::new(FailingStream)),
            Arc::new(OkBus),
            "com.yourapp.transcription",
        );
        let outcome = publisher.publish(&sample_envelope()).await;
        assert!(outcome.stream_ack.is_none());
        assert!(outcome.bus_ack.is_some());
    }

    #[tokio::test]
    async fn missing_stream_client_still_attempts_bus() {
        let publisher = FanOutPublisherImpl::new(None, Arc::new(OkBus), "com.yourapp.transcription");
        let outcome = publisher.publish(&sample_envelope()).await;
        assert!(outcome.stream_ack.is_none());
        assert!(outcome.bus_ack.is_some());
    }
}
