use super::base::WalletGenerator;
use crate::errors::{WalletError, WalletResult};
use crate::models::{eip55_checksum, Network};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

pub struct EthereumGenerator;

#[async_trait::async_trait]
impl WalletGenerator for EthereumGenerator {
    fn network(&self) -> Network {
        Network::Ethereum
    }

    fn generate_address(&self, child_key: &[u8; 32]) -> WalletResult<String> {
        let secret_key = SecretKey::from_slice(child_key)
            .map_err(|e| WalletError::WalletGenerationFailed(format!("invalid scalar: {e}")))?;
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        // Skip the leading 0x04 uncompressed-point prefix.
        let uncompressed = public_key.serialize_uncompressed();
        let hash = Keccak256::digest(&uncompressed[1..]);
        let address_bytes = &hash[12..];

        Ok(eip55_checksum(address_bytes))
    }
}
