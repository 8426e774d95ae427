//! The `storage` subcommand: reads a raw storage word at a given block.
use std::{str::FromStr, time::Duration};

use alloy::primitives::{Address, U256};
use clap::Parser;
use tracing::debug;
use txlens_common::{
    constants::DEFAULT_RPC_TIMEOUT_SECS,
    ether::{
        network::Network,
        rpc::{ChainClient, EndpointUrls},
    },
    utils::hex::ToLowerHex,
};

use crate::error::Error;

#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Read a contract storage slot at a given block",
    override_usage = "txlens storage <ADDRESS> <SLOT> --block <BLOCK> [OPTIONS]"
)]
pub struct StorageArgs {
    /// The contract address.
    #[clap(required = true)]
    pub address: String,

    /// The storage slot, in hex (`0x`-prefixed) or decimal.
    #[clap(required = true)]
    pub slot: String,

    /// The block number to read at.
    #[clap(long, short)]
    pub block: u64,

    /// The network the contract lives on.
    #[clap(long, short, value_enum, default_value_t = Network::Mainnet)]
    pub network: Network,

    /// The RPC provider to use. Defaults to the configured node of `--network`.
    #[clap(long, short, default_value = "", hide_default_value = true)]
    pub rpc_url: String,

    /// Per-request RPC timeout in seconds.
    #[clap(long, default_value_t = DEFAULT_RPC_TIMEOUT_SECS)]
    pub rpc_timeout: u64,
}

impl StorageArgs {
    fn parse_target(&self) -> Result<(Address, U256), Error> {
        let address = Address::from_str(&self.address)
            .map_err(|e| Error::Generic(format!("invalid address '{}': {}", self.address, e)))?;
        let slot = U256::from_str(&self.slot)
            .map_err(|e| Error::Generic(format!("invalid slot '{}': {}", self.slot, e)))?;

        Ok((address, slot))
    }
}

/// Reads the slot and returns the word as 32-byte lowercase hex.
pub async fn storage(args: StorageArgs) -> Result<String, Error> {
    let (address, slot) = args.parse_target()?;

    let urls = EndpointUrls { rpc_url: args.rpc_url.clone(), archive_rpc_url: None };
    let (mainnet, testnet) = match args.network {
        Network::Mainnet => (urls, EndpointUrls::default()),
        Network::Testnet => (EndpointUrls::default(), urls),
    };
    let client = ChainClient::connect(mainnet, testnet, Duration::from_secs(args.rpc_timeout))
        .await
        .map_err(txlens_inspect::error::Error::from)?;

    debug!("reading slot {} of {} at block {}", slot, address, args.block);
    let word = client
        .get_storage_at(address, slot, args.block, args.network)
        .await
        .map_err(txlens_inspect::error::Error::from)?;

    Ok(word.to_lower_hex())
}
