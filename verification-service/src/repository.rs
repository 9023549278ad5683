use crate::errors::{VerificationError, VerificationResult};
use crate::models::{Network, Verification, VerificationStatus};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for verification-attempt persistence.
///
/// Design principle (teacher's): handlers don't know SQL, the repository
/// doesn't know HTTP.
#[derive(Clone)]
pub struct VerificationRepository {
    pool: PgPool,
}

impl VerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new PENDING verification row.
    pub async fn save(
        &self,
        user_id: &str,
        network: Network,
        document_hash: &str,
    ) -> VerificationResult<Verification> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let verification = sqlx::query_as::<_, Verification>(
            r#"
            INSERT INTO verifications (id, user_id, network, document_hash, status, created_at, verified_at)
            VALUES ($1, $2, $3, $4, 'PENDING', $5, NULL)
            RETURNING id, user_id, network, document_hash, status, created_at, verified_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(network)
        .bind(document_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(verification)
    }

    /// Look up an existing attempt for (user_id, network); used for the
    /// idempotence check in VerificationCore.
    pub async fn get_by_user_and_network(
        &self,
        user_id: &str,
        network: Network,
    ) -> VerificationResult<Option<Verification>> {
        let verification = sqlx::query_as::<_, Verification>(
            r#"
            SELECT id, user_id, network, document_hash, status, created_at, verified_at
            FROM verifications
            WHERE user_id = $1 AND network = $2
            "#,
        )
        .bind(user_id)
        .bind(network)
        .fetch_optional(&self.pool)
        .await?;

        Ok(verification)
    }

    /// Transition a row to VERIFIED, stamping verified_at.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
        verified_at: Option<chrono::DateTime<Utc>>,
    ) -> VerificationResult<Verification> {
        let verification = sqlx::query_as::<_, Verification>(
            r#"
            UPDATE verifications
            SET status = $1, verified_at = $2
            WHERE id = $3
            RETURNING id, user_id, network, document_hash, status, created_at, verified_at
            "#,
        )
        .bind(status)
        .bind(verified_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| VerificationError::InternalError(format!("verification {id} vanished")))?;

        Ok(verification)
    }
}
