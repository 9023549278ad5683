use crate::errors::{WalletError, WalletResult};
use crate::event_handler::EventHandler;
use crate::models::UserVerifiedEvent;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Message, OwnedMessage};
use rdkafka::TopicPartitionList;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Batched, manually-committed consumer for `user.verified`. A batch is
/// only committed once every message in it processed without error — a
/// single failure replays the whole batch next poll, which the handler's
/// dedup filter and the database unique constraint both tolerate.
pub struct EventConsumer {
    consumer: StreamConsumer,
    handler: Arc<EventHandler>,
    batch_processing_size: usize,
    consumer_poll_timeout_ms: u64,
    running: Arc<AtomicBool>,
}

impl EventConsumer {
    pub fn new(
        brokers: &str,
        group_id: &str,
        topic: &str,
        handler: Arc<EventHandler>,
        batch_processing_size: usize,
        consumer_poll_timeout_ms: u64,
    ) -> WalletResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "10000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| WalletError::KafkaError(format!("failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| WalletError::KafkaError(format!("failed to subscribe: {e}")))?;

        Ok(Self {
            consumer,
            handler,
            batch_processing_size,
            consumer_poll_timeout_ms,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub async fn run(self) {
        tracing::info!("starting user.verified consumer");

        while self.running.load(Ordering::SeqCst) {
            let batch = self.collect_batch().await;
            if batch.is_empty() {
                continue;
            }

            let mut tasks = Vec::with_capacity(batch.len());
            let mut last_in_partition = std::collections::HashMap::new();

            for message in &batch {
                last_in_partition.insert(
                    (message.topic().to_string(), message.partition()),
                    message.offset(),
                );
            }

            for message in batch {
                let handler = Arc::clone(&self.handler);
                tasks.push(tokio::spawn(async move { dispatch(handler, message).await }));
            }

            let results = futures::future::join_all(tasks).await;
            let all_succeeded = results.iter().all(|r| matches!(r, Ok(Ok(()))));

            if !all_succeeded {
                tracing::error!("batch had failures, not committing offsets; will retry");
                continue;
            }

            let mut tpl = TopicPartitionList::new();
            for ((topic, partition), offset) in last_in_partition {
                let _ = tpl.add_partition_offset(
                    &topic,
                    partition,
                    rdkafka::Offset::Offset(offset + 1),
                );
            }

            self.commit_with_retry(&tpl).await;
        }

        tracing::info!("user.verified consumer stopped");
    }

    async fn collect_batch(&self) -> Vec<OwnedMessage> {
        let deadline = Duration::from_millis(self.consumer_poll_timeout_ms);
        let mut batch = Vec::new();

        let start = tokio::time::Instant::now();
        while batch.len() < self.batch_processing_size {
            let remaining = deadline.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }

            match tokio::time::timeout(remaining, self.consumer.recv()).await {
                Ok(Ok(message)) => batch.push(message.detach()),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "kafka recv error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    break;
                }
                Err(_elapsed) => break,
            }
        }

        batch
    }

    async fn commit_with_retry(&self, tpl: &TopicPartitionList) {
        let mut delay = Duration::from_secs(1);
        for attempt in 1..=3 {
            match self.consumer.commit(tpl, CommitMode::Sync) {
                Ok(()) => return,
                Err(e) if attempt < 3 => {
                    tracing::warn!(attempt, error = %e, "offset commit failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    tracing::error!(error = %e, "offset commit failed permanently");
                }
            }
        }
    }
}

async fn dispatch(handler: Arc<EventHandler>, message: OwnedMessage) -> WalletResult<()> {
    let payload = message
        .payload()
        .ok_or_else(|| WalletError::InternalError("empty message payload".to_string()))?;

    let event: UserVerifiedEvent = serde_json::from_slice(payload).map_err(|e| {
        tracing::warn!(error = %e, "failed to deserialize user.verified event");
        WalletError::InternalError(format!("deserialization failed: {e}"))
    })?;

    handler.handle_user_verified(event).await
}
