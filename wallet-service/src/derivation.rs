use crate::errors::WalletResult;
use crate::models::Network;
use crate::repository::WalletRepository;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Per-network monotonically increasing derivation-index generator.
/// Indices are never reclaimed on a failed `create_wallet` — holes are
/// permitted, strictly-increasing-within-a-process is the only contract.
pub struct DerivationAllocator {
    repository: WalletRepository,
    cached_next: Mutex<HashMap<Network, i64>>,
}

impl DerivationAllocator {
    pub fn new(repository: WalletRepository) -> Self {
        Self {
            repository,
            cached_next: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_next_index(&self, network: Network) -> WalletResult<i64> {
        let mut cache = self.cached_next.lock().await;
        if let Some(next) = cache.get(&network).copied() {
            cache.insert(network, next + 1);
            return Ok(next);
        }

        let base = self.repository.get_next_derivation_index(network).await?;
        cache.insert(network, base + 1);
        Ok(base)
    }
}
