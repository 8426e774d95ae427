use clap::Parser;
use derive_builder::Builder;
use txlens_common::{constants::DEFAULT_RPC_TIMEOUT_SECS, ether::network::Network};

#[derive(Debug, Clone, Parser, Builder)]
#[clap(
    about = "Decodes a transaction's call trace, events and state changes",
    override_usage = "txlens inspect <TARGET> [OPTIONS]"
)]
/// Arguments for the inspect operation
///
/// Endpoint and cache settings left empty here are filled in from the configuration file and
/// environment before the inspection runs.
pub struct InspectArgs {
    /// The target transaction hash to inspect.
    #[clap(required = true)]
    pub target: String,

    /// The network the transaction lives on.
    #[clap(long, short, value_enum, default_value_t = Network::Mainnet)]
    pub network: Network,

    /// The mainnet RPC provider to use.
    #[clap(long, short, default_value = "", hide_default_value = true)]
    pub rpc_url: String,

    /// The mainnet archive node, queried when the regular node lacks data.
    #[clap(long, default_value = "", hide_default_value = true)]
    pub archive_rpc_url: String,

    /// The testnet RPC provider to use.
    #[clap(long, default_value = "", hide_default_value = true)]
    pub testnet_rpc_url: String,

    /// The testnet archive node.
    #[clap(long, default_value = "", hide_default_value = true)]
    pub testnet_archive_rpc_url: String,

    /// Per-request RPC timeout in seconds.
    #[clap(long, default_value_t = DEFAULT_RPC_TIMEOUT_SECS)]
    pub rpc_timeout: u64,

    /// Directory of the result cache. Defaults to ~/.txlens/cache.
    #[clap(long, default_value = "", hide_default_value = true)]
    pub cache_dir: String,

    /// Seconds a cached result stays valid.
    #[clap(long, default_value_t = txlens_cache::DEFAULT_TTL_SECS)]
    pub cache_ttl: u64,

    /// Whether to bypass the on-disk cache.
    #[clap(long = "no-cache")]
    pub no_cache: bool,

    /// The output file to write the JSON result to, or 'print' to print to the console.
    #[clap(long = "output", short = 'o', default_value = "print", hide_default_value = true)]
    pub output: String,
}

impl InspectArgsBuilder {
    /// Creates a new InspectArgsBuilder with default values
    pub fn new() -> Self {
        Self {
            target: Some(String::new()),
            network: Some(Network::Mainnet),
            rpc_url: Some(String::new()),
            archive_rpc_url: Some(String::new()),
            testnet_rpc_url: Some(String::new()),
            testnet_archive_rpc_url: Some(String::new()),
            rpc_timeout: Some(DEFAULT_RPC_TIMEOUT_SECS),
            cache_dir: Some(String::new()),
            cache_ttl: Some(txlens_cache::DEFAULT_TTL_SECS),
            no_cache: Some(false),
            output: Some(String::from("print")),
        }
    }
}
