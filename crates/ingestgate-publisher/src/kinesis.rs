//! Ordered, partitioned stream publish (§4.3 step 1).

use async_trait::async_trait;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::{PublishAck, StreamPublisher};

pub struct KinesisStreamPublisher {
    client: Client,
    stream_name: String,
}

impl KinesisStreamPublisher {
    pub fn new(client: Client, stream_name: impl Into<String>) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
        }
    }

    pub async fn from_env(stream_name: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), stream_name)
    }
}

#[async_trait]
impl StreamPublisher for KinesisStreamPublisher {
    async fn put_record(&self, partition_key: &str, payload: &[u8]) -> Result<PublishAck> {
        let output = self
            .client
            .put_record()
            .stream_name(&self.stream_name)
            .partition_key(partition_key)
            .data(Blob::new(payload.to_vec()))
            .send()
            .await
            .map_err(|e| Error::PublishFailed(format!("kinesis put_record failed: {e}")))?;

        Ok(PublishAck(output.sequence_number().to_string()))
    }
}
