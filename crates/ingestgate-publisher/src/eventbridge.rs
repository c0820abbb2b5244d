//! Routed event bus publish (§4.3 step 2).

use async_trait::async_trait;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use aws_sdk_eventbridge::Client;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::{EventBusPublisher, PublishAck};

pub struct EventBridgeBusPublisher {
    client: Client,
    bus_name: String,
}

impl EventBridgeBusPublisher {
    pub fn new(client: Client, bus_name: impl Into<String>) -> Self {
        Self {
            client,
            bus_name: bus_name.into(),
        }
    }

    pub async fn from_env(bus_name: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), bus_name)
    }
}

#[async_trait]
impl EventBusPublisher for EventBridgeBusPublisher {
    async fn put_event(&self, source: &str, detail_type: &str, detail_json: &str) -> Result<PublishAck> {
        let entry = PutEventsRequestEntry::builder()
            .event_bus_name(&self.bus_name)
            .source(source)
            .detail_type(detail_type)
            .detail(detail_json)
            .build();

        let output = self
            .client
            .put_events()
            .entries(entry)
            .send()
            .await
            .map_err(|e| Error::PublishFailed(format!("eventbridge put_events failed: {e}")))?;

        if output.failed_entry_count() > 0 {
            let reason = output
                .entries()
                .first()
                .and_then(|e| e.error_message())
                .unwrap_or("unknown reason")
                .to_string();
            return Err(Error::PublishFailed(format!(
                "eventbridge rejected the event: {reason}"
            )));
        }

        let ack = output
            .entries()
            .first()
            .and_then(|e| e.event_id())
            .unwrap_or_default()
            .to_string();
        Ok(PublishAck(ack))
    }
}
