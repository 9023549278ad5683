use crate::errors::{VerificationError, VerificationResult};
use crate::kafka::{EventProducer, UserVerifiedEvent};
use crate::models::{Network, Verification, VerificationStatus};
use crate::repository::VerificationRepository;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Orchestrates the ingest -> delay -> emit pipeline for one verification
/// attempt, bounded by a concurrency semaphore the way the teacher bounds
/// its own request handling with a connection pool.
pub struct VerificationCore {
    repository: VerificationRepository,
    producer: Arc<EventProducer>,
    semaphore: Arc<Semaphore>,
    verification_delay_seconds: f64,
}

impl VerificationCore {
    pub fn new(
        repository: VerificationRepository,
        producer: Arc<EventProducer>,
        max_concurrent_verifications: usize,
        verification_delay_seconds: f64,
    ) -> Self {
        Self {
            repository,
            producer,
            semaphore: Arc::new(Semaphore::new(max_concurrent_verifications)),
            verification_delay_seconds,
        }
    }

    /// Accepts a verification request, persists it, waits out the
    /// configured delay, transitions it to VERIFIED, and fires a
    /// best-effort `user.verified` publish that the caller does not await.
    pub async fn verify_user(
        &self,
        user_id: &str,
        network: Network,
        document_bytes: &[u8],
        max_document_size_bytes: u64,
    ) -> VerificationResult<Verification> {
        if user_id.is_empty() || user_id.len() > 255 {
            return Err(VerificationError::InvalidInput(
                "user_id must be 1..255 bytes".to_string(),
            ));
        }

        if document_bytes.len() as u64 > max_document_size_bytes {
            return Err(VerificationError::DocumentTooLarge);
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| VerificationError::InternalError(e.to_string()))?;

        // Idempotence: an already-VERIFIED attempt is returned unchanged,
        // no new row and no event re-emit.
        if let Some(existing) = self
            .repository
            .get_by_user_and_network(user_id, network)
            .await?
        {
            if existing.status == VerificationStatus::Verified {
                return Ok(existing);
            }
        }

        let document_hash = hex::encode(Sha256::digest(document_bytes));
        let pending = self.repository.save(user_id, network, &document_hash).await?;

        tokio::time::sleep(std::time::Duration::from_secs_f64(
            self.verification_delay_seconds,
        ))
        .await;

        let verified_at = Utc::now();
        let verified = self
            .repository
            .update_status(pending.id, VerificationStatus::Verified, Some(verified_at))
            .await?;

        let producer = Arc::clone(&self.producer);
        let event = UserVerifiedEvent::new(verified.user_id.clone(), verified.network);
        tokio::spawn(async move {
            producer.publish_with_retry(event).await;
        });

        Ok(verified)
    }
}
