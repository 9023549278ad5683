use super::base::{base58check_encode, WalletGenerator};
use crate::errors::{WalletError, WalletResult};
use crate::models::Network;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

pub struct TronGenerator;

#[async_trait::async_trait]
impl WalletGenerator for TronGenerator {
    fn network(&self) -> Network {
        Network::Tron
    }

    fn generate_address(&self, child_key: &[u8; 32]) -> WalletResult<String> {
        let secret_key = SecretKey::from_slice(child_key)
            .map_err(|e| WalletError::WalletGenerationFailed(format!("invalid scalar: {e}")))?;
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        // Tron derives its address the Ethereum way (Keccak256 of the
        // uncompressed point, sans 0x04 prefix, last 20 bytes) then wraps
        // it in Base58Check with version 0x41 instead of EIP-55 + 0x.
        let uncompressed = public_key.serialize_uncompressed();
        let hash = Keccak256::digest(&uncompressed[1..]);
        let payload = &hash[12..];

        Ok(base58check_encode(0x41, payload))
    }
}
