use crate::errors::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use sqlx::FromRow;
use std::fmt;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Chain a wallet is provisioned on. Kept identical in shape to the
/// verification side's enum — the two services agree on the wire
/// representation but do not share a crate, matching the event contract
/// boundary between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Network {
    Ethereum,
    Bitcoin,
    Tron,
}

impl Network {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "ethereum" => Some(Network::Ethereum),
            "bitcoin" => Some(Network::Bitcoin),
            "tron" => Some(Network::Tron),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Bitcoin => "bitcoin",
            Network::Tron => "tron",
        }
    }

    /// HD derivation base path, fixed per network.
    pub fn base_path(&self) -> &'static str {
        match self {
            Network::Ethereum => "m/44'/60'/0'/0",
            Network::Bitcoin => "m/44'/0'/0'/0",
            Network::Tron => "m/44'/195'/0'/0",
        }
    }

    /// The per-network address-format rule from spec §3: EIP-55 checksum
    /// recheck for Ethereum; `T` + length 34 + valid Base58Check decode for
    /// Tron; length 26..35 + Base58-alphabet-only check for Bitcoin (format
    /// only, not a full checksum). Used both by `WalletGenerator::validate_address`
    /// and by `Wallet::new` as the construction-time check.
    pub fn validate_address_format(&self, address: &str) -> bool {
        match self {
            Network::Ethereum => validate_ethereum_address(address),
            Network::Bitcoin => {
                (26..=35).contains(&address.len()) && address.chars().all(|c| BASE58_ALPHABET.contains(c))
            }
            Network::Tron => validate_tron_address(address),
        }
    }
}

fn validate_ethereum_address(address: &str) -> bool {
    let Some(hex_part) = address.strip_prefix("0x") else {
        return false;
    };
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let Ok(bytes) = hex::decode(hex_part.to_ascii_lowercase()) else {
        return false;
    };
    eip55_checksum(&bytes) == address
}

fn validate_tron_address(address: &str) -> bool {
    if !address.starts_with('T') || address.len() != 34 {
        return false;
    }
    matches!(base58check_decode(address), Some((version, payload)) if version == 0x41 && payload.len() == 20)
}

/// EIP-55 mixed-case checksum of a 20-byte address. Shared by
/// `generators::ethereum` (to build the address) and `validate_ethereum_address`
/// above (to recheck one).
pub(crate) fn eip55_checksum(address_bytes: &[u8]) -> String {
    let lower_hex = hex::encode(address_bytes);
    let hash = Keccak256::digest(lower_hex.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in lower_hex.chars().enumerate() {
        if c.is_ascii_digit() {
            checksummed.push(c);
            continue;
        }
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// Decodes and checksum-verifies a Base58Check string, returning
/// `(version, payload)` on success.
fn base58check_decode(address: &str) -> Option<(u8, Vec<u8>)> {
    use sha2::Sha256;

    let raw = bs58::decode(address).into_vec().ok()?;
    if raw.len() < 5 {
        return None;
    }
    let (body, checksum) = raw.split_at(raw.len() - 4);
    let expected = Sha256::digest(Sha256::digest(body));
    if &expected[..4] != checksum {
        return None;
    }
    Some((body[0], body[1..].to_vec()))
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wallet entity - unique per (user_id, network).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub network: Network,
    pub wallet_address: String,
    pub derivation_index: i64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Constructs a `Wallet`, re-validating the address format against its
    /// network. This is the second validation layer spec §4.2 step 5 calls
    /// for: the generator already validated before returning the address
    /// (`WALLET_GENERATION_FAILED` on mismatch there); this constructor
    /// rejects construction with `INVALID_ADDRESS` if it still doesn't match.
    pub fn new(
        id: uuid::Uuid,
        user_id: String,
        network: Network,
        wallet_address: String,
        derivation_index: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, WalletError> {
        if !network.validate_address_format(&wallet_address) {
            return Err(WalletError::InvalidAddress(wallet_address));
        }

        Ok(Self {
            id,
            user_id,
            network,
            wallet_address,
            derivation_index,
            created_at,
            last_accessed_at: None,
        })
    }
}

/// Inbound `user.verified` event consumed from the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserVerifiedEvent {
    pub event: String,
    pub user_id: String,
    pub network: Network,
    pub timestamp: DateTime<Utc>,
}

impl UserVerifiedEvent {
    /// Dedup key used by the EventHandler: "{user_id}:{network}:{timestamp}".
    pub fn dedup_key(&self) -> String {
        format!("{}:{}:{}", self.user_id, self.network, self.timestamp.timestamp())
    }
}

/// Outbound `wallet.created` event published once a wallet is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct WalletCreatedEvent {
    pub event: &'static str,
    pub user_id: String,
    pub network: Network,
    pub wallet_address: String,
    pub timestamp: DateTime<Utc>,
}

impl WalletCreatedEvent {
    pub fn new(user_id: String, network: Network, wallet_address: String) -> Self {
        Self {
            event: "wallet.created",
            user_id,
            network,
            wallet_address,
            timestamp: Utc::now(),
        }
    }

    /// Partition key: "{user_id}:{network}".
    pub fn partition_key(&self) -> String {
        format!("{}:{}", self.user_id, self.network)
    }
}

// === API response models ===

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub user_id: String,
    pub network: Network,
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            user_id: wallet.user_id,
            network: wallet.network,
            wallet_address: wallet.wallet_address,
            created_at: wallet.created_at,
        }
    }
}
