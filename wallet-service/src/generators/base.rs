use crate::errors::{WalletError, WalletResult};
use crate::models::Network;
use bip39::Mnemonic;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use std::str::FromStr;

type HmacSha512 = Hmac<Sha512>;

/// Shared generate() template: derive_seed -> derivation_path ->
/// derive_child_key -> generate_address -> validate_address. Each network
/// implementation only supplies `network` and `generate_address`; the
/// derivation path and address-format validation are both delegated to
/// `Network` so there is one definition of each, not one per generator.
#[async_trait::async_trait]
pub trait WalletGenerator: Send + Sync {
    fn network(&self) -> Network;

    fn generate_address(&self, child_key: &[u8; 32]) -> WalletResult<String>;

    fn validate_address(&self, address: &str) -> bool {
        self.network().validate_address_format(address)
    }

    async fn generate(&self, mnemonic: &str, user_id: &str, index: u32) -> WalletResult<String> {
        let seed = derive_seed(mnemonic, user_id)?;
        let path = derivation_path(self.network().base_path(), index);
        let child_key = derive_child_key(&seed, &path);

        let address = self.generate_address(&child_key)?;

        if !self.validate_address(&address) {
            return Err(WalletError::WalletGenerationFailed(format!(
                "generated address failed validation: {address}"
            )));
        }

        Ok(address)
    }
}

/// BIP-39 seed, passphrase-bound to the user so the same mnemonic + index
/// yields distinct addresses per user.
fn derive_seed(mnemonic: &str, user_id: &str) -> WalletResult<[u8; 64]> {
    let mnemonic = Mnemonic::from_str(mnemonic)
        .map_err(|e| WalletError::WalletGenerationFailed(format!("invalid mnemonic: {e}")))?;
    let passphrase = format!("wallet-service:{user_id}");
    Ok(mnemonic.to_seed(&passphrase))
}

fn derivation_path(base_path: &str, index: u32) -> String {
    format!("{base_path}/{index}")
}

/// Non-hardened child key derivation stand-in: HMAC-SHA512(key=seed,
/// msg=path), truncated to the first 32 bytes and used as a secp256k1
/// scalar.
fn derive_child_key(seed: &[u8; 64], path: &str) -> [u8; 32] {
    let mut mac = HmacSha512::new_from_slice(seed).expect("HMAC accepts any key length");
    mac.update(path.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    key.copy_from_slice(&digest[..32]);
    key
}

/// RIPEMD160(SHA256(data)) - the Bitcoin/Tron "HASH160" used to shorten a
/// public key into an address payload.
pub(crate) fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}

/// Base58Check-encodes `version || payload` with a 4-byte double-SHA256
/// checksum appended, per Bitcoin's address format (also used by Tron).
pub(crate) fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut body = Vec::with_capacity(1 + payload.len() + 4);
    body.push(version);
    body.extend_from_slice(payload);

    let checksum = Sha256::digest(Sha256::digest(&body));
    body.extend_from_slice(&checksum[..4]);

    bs58::encode(body).into_string()
}
