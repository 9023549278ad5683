use crate::cache::Cache;
use crate::derivation::DerivationAllocator;
use crate::errors::{WalletError, WalletResult};
use crate::generators;
use crate::kafka::EventProducer;
use crate::models::{Network, Wallet, WalletCreatedEvent};
use crate::repository::WalletRepository;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct WalletCore {
    repository: WalletRepository,
    cache: Arc<Cache>,
    allocator: Arc<DerivationAllocator>,
    producer: Arc<EventProducer>,
    semaphore: Arc<Semaphore>,
    mnemonic: String,
}

impl WalletCore {
    pub fn new(
        repository: WalletRepository,
        cache: Arc<Cache>,
        allocator: Arc<DerivationAllocator>,
        producer: Arc<EventProducer>,
        mnemonic: String,
        max_concurrent_generations: usize,
    ) -> Self {
        Self {
            repository,
            cache,
            allocator,
            producer,
            semaphore: Arc::new(Semaphore::new(max_concurrent_generations)),
            mnemonic,
        }
    }

    fn cache_key(user_id: &str, network: Network) -> String {
        format!("wallet:{user_id}:{network}")
    }

    pub async fn create_wallet(&self, user_id: &str, network: Network) -> WalletResult<Wallet> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| WalletError::InternalError(e.to_string()))?;

        let cache_key = Self::cache_key(user_id, network);

        if let Some(wallet) = self.cache.get::<Wallet>(&cache_key).await {
            return Ok(wallet);
        }

        if let Some(wallet) = self.repository.get_by_user_and_network(user_id, network).await? {
            self.cache.set(&cache_key, &wallet, None).await;
            return Ok(wallet);
        }

        // Index is intentionally not reclaimed if any step below fails —
        // indices are monotone, holes are permitted.
        let index = self.allocator.get_next_index(network).await?;

        let generator = generators::for_network(network);
        let address = generator
            .generate(&self.mnemonic, user_id, index as u32)
            .await?;

        let wallet = self
            .repository
            .create(user_id, network, &address, index)
            .await?;

        self.cache.set(&cache_key, &wallet, None).await;

        let event = WalletCreatedEvent::new(
            wallet.user_id.clone(),
            wallet.network,
            wallet.wallet_address.clone(),
        );
        let producer = Arc::clone(&self.producer);
        tokio::spawn(async move {
            producer.publish_with_retry(event).await;
        });

        Ok(wallet)
    }

    pub async fn get_wallet(&self, user_id: &str, network: Network) -> WalletResult<Option<Wallet>> {
        let cache_key = Self::cache_key(user_id, network);

        if let Some(wallet) = self.cache.get::<Wallet>(&cache_key).await {
            let repository = self.repository.clone();
            let id = wallet.id;
            tokio::spawn(async move {
                let _ = repository.update_last_accessed(id).await;
            });
            return Ok(Some(wallet));
        }

        let Some(wallet) = self.repository.get_by_user_and_network(user_id, network).await? else {
            return Ok(None);
        };

        self.cache.set(&cache_key, &wallet, None).await;
        self.repository.update_last_accessed(wallet.id).await?;

        Ok(Some(wallet))
    }
}
