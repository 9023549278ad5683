/// Pure unit tests for address generation - no database required.

use wallet_service::generators::{self, WalletGenerator};
use wallet_service::models::Network;

const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[tokio::test]
async fn test_generate_is_deterministic() {
    for network in [Network::Ethereum, Network::Bitcoin, Network::Tron] {
        let generator = generators::for_network(network);
        let a = generator.generate(MNEMONIC, "user-1", 0).await.unwrap();
        let b = generator.generate(MNEMONIC, "user-1", 0).await.unwrap();
        assert_eq!(a, b, "{network} generation should be deterministic");
    }
}

#[tokio::test]
async fn test_generate_differs_per_user() {
    for network in [Network::Ethereum, Network::Bitcoin, Network::Tron] {
        let generator = generators::for_network(network);
        let a = generator.generate(MNEMONIC, "user-a", 0).await.unwrap();
        let b = generator.generate(MNEMONIC, "user-b", 0).await.unwrap();
        assert_ne!(a, b, "{network} addresses should differ across users");
    }
}

#[tokio::test]
async fn test_generate_differs_per_index() {
    for network in [Network::Ethereum, Network::Bitcoin, Network::Tron] {
        let generator = generators::for_network(network);
        let a = generator.generate(MNEMONIC, "user-1", 0).await.unwrap();
        let b = generator.generate(MNEMONIC, "user-1", 1).await.unwrap();
        assert_ne!(a, b, "{network} addresses should differ across indices");
    }
}

#[tokio::test]
async fn test_ethereum_address_is_eip55_checksummed() {
    let generator = generators::for_network(Network::Ethereum);
    let address = generator.generate(MNEMONIC, "user-1", 0).await.unwrap();

    assert!(address.starts_with("0x"));
    assert_eq!(address.len(), 42);
    assert!(generator.validate_address(&address));
}

#[tokio::test]
async fn test_tron_address_starts_with_t() {
    let generator = generators::for_network(Network::Tron);
    let address = generator.generate(MNEMONIC, "user-1", 0).await.unwrap();

    assert!(address.starts_with('T'));
    assert_eq!(address.len(), 34);
    assert!(generator.validate_address(&address));
}

#[tokio::test]
async fn test_bitcoin_address_matches_format() {
    let generator = generators::for_network(Network::Bitcoin);
    let address = generator.generate(MNEMONIC, "user-1", 0).await.unwrap();

    assert!((26..=35).contains(&address.len()));
    assert!(generator.validate_address(&address));
}

#[test]
fn test_network_parse_is_case_insensitive() {
    assert_eq!(Network::parse("Ethereum"), Some(Network::Ethereum));
    assert_eq!(Network::parse("BITCOIN"), Some(Network::Bitcoin));
    assert_eq!(Network::parse("tron"), Some(Network::Tron));
    assert_eq!(Network::parse("dogecoin"), None);
}
