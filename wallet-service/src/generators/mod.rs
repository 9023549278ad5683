mod base;
mod bitcoin;
mod ethereum;
mod tron;

pub use base::WalletGenerator;

use crate::models::Network;
use std::sync::Arc;

pub fn for_network(network: Network) -> Arc<dyn WalletGenerator> {
    match network {
        Network::Ethereum => Arc::new(ethereum::EthereumGenerator),
        Network::Bitcoin => Arc::new(bitcoin::BitcoinGenerator),
        Network::Tron => Arc::new(tron::TronGenerator),
    }
}
