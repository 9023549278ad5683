use crate::core::WalletCore;
use crate::errors::{WalletError, WalletResult};
use crate::models::UserVerifiedEvent;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

const MAX_CAPACITY: usize = 10_000;
const TRIM_TO: usize = 5_000;

/// In-memory recent-dedup filter for `user.verified`. Hot-path idempotency;
/// the database unique constraint on (user_id, network) is the durable
/// guarantee behind it.
struct Dedup {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl Dedup {
    fn new() -> Self {
        Self {
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    fn insert(&mut self, key: String) {
        self.seen.insert(key.clone());
        self.order.push_back(key);

        if self.order.len() > MAX_CAPACITY {
            while self.order.len() > TRIM_TO {
                if let Some(oldest) = self.order.pop_front() {
                    self.seen.remove(&oldest);
                }
            }
        }
    }

    fn remove(&mut self, key: &str) {
        self.seen.remove(key);
        self.order.retain(|k| k != key);
    }
}

pub struct EventHandler {
    core: Arc<WalletCore>,
    dedup: Mutex<Dedup>,
}

impl EventHandler {
    pub fn new(core: Arc<WalletCore>) -> Self {
        Self {
            core,
            dedup: Mutex::new(Dedup::new()),
        }
    }

    pub async fn handle_user_verified(&self, event: UserVerifiedEvent) -> WalletResult<()> {
        let key = event.dedup_key();

        {
            let mut dedup = self.dedup.lock().await;
            if dedup.contains(&key) {
                tracing::debug!(key = %key, "duplicate user.verified event, skipping");
                return Ok(());
            }
            dedup.insert(key.clone());
        }

        match self.core.create_wallet(&event.user_id, event.network).await {
            Ok(_) => Ok(()),
            Err(WalletError::WalletAlreadyExists(_)) => Ok(()),
            Err(e) => {
                self.dedup.lock().await.remove(&key);
                Err(e)
            }
        }
    }
}
