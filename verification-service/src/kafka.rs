use crate::errors::{VerificationError, VerificationResult};
use crate::models::Network;
use chrono::{DateTime, Utc};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::message::OwnedHeaders;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;

/// Event published once a verification attempt transitions to VERIFIED.
#[derive(Debug, Clone, Serialize)]
pub struct UserVerifiedEvent {
    pub event: &'static str,
    pub user_id: String,
    pub network: Network,
    pub timestamp: DateTime<Utc>,
}

impl UserVerifiedEvent {
    pub fn new(user_id: String, network: Network) -> Self {
        Self {
            event: "user.verified",
            user_id,
            network,
            timestamp: Utc::now(),
        }
    }
}

/// Kafka producer wrapper for the `user.verified` topic.
///
/// Construction is lazy (a single producer behind a mutex, built on first
/// use) rather than eager, matching the source's `_get_producer` pattern
/// rather than the teacher's eager `new`.
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

    async fn producer(&self) -> VerificationResult<FutureProducer> {
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
            .map_err(|e| VerificationError::KafkaError(format!("Failed to create producer: {}", e)))?;

        *guard = Some(producer.clone());
        Ok(producer)
    }

    /// Publish a `user.verified` event, keyed by the raw user_id bytes.
    pub async fn publish_user_verified(&self, event: UserVerifiedEvent) -> VerificationResult<()> {
        let producer = self.producer().await?;

        let payload = serde_json::to_string(&event).map_err(|e| {
            VerificationError::InternalError(format!("Failed to serialize event: {}", e))
        })?;

        let headers = OwnedHeaders::new()
            .insert(rdkafka::message::Header {
                key: "event_type",
                value: Some("user.verified"),
            })
            .insert(rdkafka::message::Header {
                key: "timestamp",
                value: Some(&event.timestamp.timestamp().to_string()),
            });

        tracing::info!(
            user_id = %event.user_id,
            network = %event.network,
            "Publishing user.verified event"
        );

        let record = FutureRecord::to(&self.topic)
            .key(event.user_id.as_bytes())
            .payload(&payload)
            .headers(headers);

        let delivery_status = producer.send(record, Duration::from_secs(5)).await;

        match delivery_status {
            Ok((partition, offset)) => {
                tracing::debug!(partition = partition, offset = offset, "Event published");
                Ok(())
            }
            Err((e, _)) => {
                tracing::error!(error = %e, "Failed to publish user.verified event");
                Err(VerificationError::PublishFailed(e.to_string()))
            }
        }
    }

    /// Publish with a fixed three-attempt exponential-backoff retry
    /// (1s, 2s between attempts). Used from the fire-and-forget path so
    /// callers never block on Kafka.
    pub async fn publish_with_retry(&self, event: UserVerifiedEvent) {
        let delays = [Duration::from_secs(1), Duration::from_secs(2)];
        let mut attempt = 0;

        loop {
            match self.publish_user_verified(event.clone()).await {
                Ok(()) => return,
                Err(e) => {
                    if attempt >= delays.len() {
                        tracing::error!(
                            error = %e,
                            user_id = %event.user_id,
                            "Exhausted retries publishing user.verified event, dropping"
                        );
                        return;
                    }
                    tokio::time::sleep(delays[attempt]).await;
                    attempt += 1;
                }
            }
        }
    }
}
