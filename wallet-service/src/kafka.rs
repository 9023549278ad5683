use crate::errors::{WalletError, WalletResult};
use crate::models::WalletCreatedEvent;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tokio::sync::Mutex;

/// Publishes `wallet.created` once a wallet is persisted. Partitioned by
/// `"{user_id}:{network}"` so per-user ordering is preserved.
pub struct EventProducer {
    brokers: String,
    topic: String,
    inner: Mutex<Option<FutureProducer>>,
}

impl EventProducer {
    pub fn new(brokers: String, topic: String) -> Self {
        Self {
            brokers,
            topic,
            inner: Mutex::new(None),
        }
    }

    async fn producer(&self) -> WalletResult<FutureProducer> {
        let mut guard = self.inner.lock().await;
        if let Some(p) = guard.as_ref() {
            return Ok(p.clone());
        }

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("compression.type", "gzip")
            .set("batch.size", "16384")
            .set("linger.ms", "10")
            .create()
            .map_err(|e| WalletError::KafkaError(format!("failed to create producer: {e}")))?;

        *guard = Some(producer.clone());
        Ok(producer)
    }

    pub async fn publish_wallet_created(&self, event: &WalletCreatedEvent) -> WalletResult<()> {
        let producer = self.producer().await?;
        let key = event.partition_key();
        let payload = serde_json::to_string(event)
            .map_err(|e| WalletError::InternalError(format!("failed to serialize event: {e}")))?;
        let timestamp = event.timestamp.timestamp().to_string();

        let record = FutureRecord::to(&self.topic)
            .key(&key)
            .payload(&payload)
            .headers(
                rdkafka::message::OwnedHeaders::new()
                    .insert(rdkafka::message::Header {
                        key: "event_type",
                        value: Some(event.event),
                    })
                    .insert(rdkafka::message::Header {
                        key: "timestamp",
                        value: Some(timestamp.as_str()),
                    })
                    .insert(rdkafka::message::Header {
                        key: "network",
                        value: Some(event.network.as_str()),
                    }),
            );

        match producer.send(record, Duration::from_secs(5)).await {
            Ok((partition, offset)) => {
                tracing::debug!(partition, offset, key = %key, "wallet.created published");
                Ok(())
            }
            Err((e, _)) => Err(WalletError::PublishFailed(format!("failed to publish event: {e}"))),
        }
    }

    /// Fire-and-forget publish with 3-attempt exponential backoff. Never
    /// propagates a failure — the wallet row is already committed.
    pub async fn publish_with_retry(&self, event: WalletCreatedEvent) {
        let mut delay = Duration::from_secs(1);
        for attempt in 1..=3 {
            match self.publish_wallet_created(&event).await {
                Ok(()) => return,
                Err(e) if attempt < 3 => {
                    tracing::warn!(attempt, error = %e, "wallet.created publish failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    tracing::error!(error = %e, "wallet.created publish failed permanently");
                }
            }
        }
    }
}
