use crate::errors::{WalletError, WalletResult};
use crate::models::{Network, Wallet};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for wallet persistence.
#[derive(Clone)]
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Constructs (spec §4.2 step 5: address-format validation, fails with
    /// `INVALID_ADDRESS`) and inserts a newly generated wallet. A
    /// unique-constraint violation on `(user_id, network)` or
    /// `wallet_address` is surfaced as `WalletAlreadyExists`, which the
    /// event handler treats as success.
    pub async fn create(
        &self,
        user_id: &str,
        network: Network,
        wallet_address: &str,
        derivation_index: i64,
    ) -> WalletResult<Wallet> {
        let wallet = Wallet::new(
            Uuid::new_v4(),
            user_id.to_string(),
            network,
            wallet_address.to_string(),
            derivation_index,
            Utc::now(),
        )?;

        let result = sqlx::query(
            r#"
            INSERT INTO wallets (id, user_id, network, wallet_address, derivation_index, created_at, last_accessed_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            "#,
        )
        .bind(wallet.id)
        .bind(&wallet.user_id)
        .bind(wallet.network)
        .bind(&wallet.wallet_address)
        .bind(wallet.derivation_index)
        .bind(wallet.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(wallet),
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                Err(WalletError::WalletAlreadyExists(format!("{user_id}:{network}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_user_and_network(
        &self,
        user_id: &str,
        network: Network,
    ) -> WalletResult<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT id, user_id, network, wallet_address, derivation_index, created_at, last_accessed_at
            FROM wallets
            WHERE user_id = $1 AND network = $2
            "#,
        )
        .bind(user_id)
        .bind(network)
        .fetch_optional(&self.pool)
        .await?;

        Ok(wallet)
    }

    /// `MAX(derivation_index)+1` over the network, or 0 if empty — used to
    /// seed the DerivationAllocator's per-network cache.
    pub async fn get_next_derivation_index(&self, network: Network) -> WalletResult<i64> {
        let max: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(derivation_index) FROM wallets WHERE network = $1
            "#,
        )
        .bind(network)
        .fetch_one(&self.pool)
        .await?;

        Ok(max.map(|m| m + 1).unwrap_or(0))
    }

    pub async fn update_last_accessed(&self, id: Uuid) -> WalletResult<()> {
        sqlx::query(
            r#"
            UPDATE wallets SET last_accessed_at = $1 WHERE id = $2
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
