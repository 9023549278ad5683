use super::base::{base58check_encode, hash160, WalletGenerator};
use crate::errors::{WalletError, WalletResult};
use crate::models::Network;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

pub struct BitcoinGenerator;

#[async_trait::async_trait]
impl WalletGenerator for BitcoinGenerator {
    fn network(&self) -> Network {
        Network::Bitcoin
    }

    fn generate_address(&self, child_key: &[u8; 32]) -> WalletResult<String> {
        let secret_key = SecretKey::from_slice(child_key)
            .map_err(|e| WalletError::WalletGenerationFailed(format!("invalid scalar: {e}")))?;
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        let compressed = public_key.serialize();
        let payload = hash160(&compressed);

        Ok(base58check_encode(0x00, &payload))
    }
}
