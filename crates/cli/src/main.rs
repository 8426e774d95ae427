pub(crate) mod error;
pub(crate) mod log_args;
pub(crate) mod output;
pub(crate) mod storage;

use error::Error;
use log_args::LogArgs;
use output::build_output_path;
use storage::{storage, StorageArgs};
use tracing::{info, Level};

use clap::{Parser, Subcommand};

use txlens_cache::{cache, CacheArgs, FileCache};
use txlens_common::{
    ether::network::Network,
    utils::io::{short_path, write_file},
};
use txlens_config::{config, ConfigArgs, Configuration};
use txlens_inspect::{inspect, InspectArgs};

#[derive(Debug, Parser)]
#[clap(name = "txlens", version)]
pub struct Arguments {
    #[clap(subcommand)]
    pub sub: Subcommands,

    #[clap(flatten)]
    logs: LogArgs,
}

#[derive(Debug, Subcommand)]
#[clap(
    about = "txlens decodes Rootstock transactions into call traces, events and state changes."
)]
pub enum Subcommands {
    #[clap(
        name = "inspect",
        about = "Decode a transaction's call trace, events and storage changes"
    )]
    Inspect(InspectArgs),

    #[clap(name = "storage", about = "Read a contract storage slot at a given block")]
    Storage(StorageArgs),

    #[clap(name = "config", about = "Display and edit the current configuration")]
    Config(ConfigArgs),

    #[clap(name = "cache", about = "Manage txlens' cached transactions")]
    Cache(CacheArgs),
}

/// Fills endpoint and cache settings the user didn't pass from the configuration.
fn apply_configuration(cmd: &mut InspectArgs, configuration: &Configuration) {
    let defaults = [
        (&mut cmd.rpc_url, &configuration.mainnet_rpc_url),
        (&mut cmd.archive_rpc_url, &configuration.mainnet_archive_rpc_url),
        (&mut cmd.testnet_rpc_url, &configuration.testnet_rpc_url),
        (&mut cmd.testnet_archive_rpc_url, &configuration.testnet_archive_rpc_url),
        (&mut cmd.cache_dir, &configuration.cache_dir),
    ];
    for (arg, configured) in defaults {
        if arg.is_empty() {
            arg.clone_from(configured);
        }
    }

    if cmd.cache_ttl == txlens_cache::DEFAULT_TTL_SECS {
        cmd.cache_ttl = configuration.cache_ttl;
    }
    if cmd.rpc_timeout == txlens_common::constants::DEFAULT_RPC_TIMEOUT_SECS {
        cmd.rpc_timeout = configuration.rpc_timeout;
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Arguments::parse();

    // setup logging
    let _ = args.logs.init_tracing();

    let configuration = Configuration::load()
        .map_err(|e| Error::Generic(format!("failed to load configuration: {}", e)))?;
    match args.sub {
        Subcommands::Inspect(mut cmd) => {
            apply_configuration(&mut cmd, &configuration);

            let inspect_result = inspect(cmd.clone()).await?;
            let json = inspect_result.to_json()?;

            if cmd.output == "print" {
                println!("{json}");
            } else {
                let output_path = build_output_path(
                    &cmd.output,
                    cmd.network.as_str(),
                    &cmd.target,
                    "decoded_transaction.json",
                )
                .map_err(|e| Error::Generic(format!("failed to build output path: {}", e)))?;

                write_file(&output_path, &json).map_err(|e| {
                    Error::Generic(format!("failed to write decoded transaction: {}", e))
                })?;
                info!("wrote decoded transaction to '{}'", short_path(&output_path));
            }

            if args.logs.verbosity.level() >= Level::DEBUG {
                let tx = &inspect_result.transaction;
                info!(
                    "{} {:?} in block {}: {} calls at the root, {} events, {} state changes",
                    tx.tx_hash,
                    tx.status,
                    tx.block_number,
                    tx.call_trace.calls.len(),
                    tx.events.len(),
                    tx.state_changes.len()
                );
            }
        }

        Subcommands::Storage(mut cmd) => {
            // if the user has not specified a rpc url, use the configured one
            if cmd.rpc_url.is_empty() {
                cmd.rpc_url = match cmd.network {
                    Network::Mainnet => configuration.mainnet_rpc_url,
                    Network::Testnet => configuration.testnet_rpc_url,
                };
            }

            println!("{}", storage(cmd).await?);
        }

        Subcommands::Config(cmd) => {
            config(cmd).map_err(|e| Error::Generic(format!("failed to configure: {}", e)))?;
        }

        Subcommands::Cache(cmd) => {
            let store = FileCache::new(&configuration.cache_dir, configuration.cache_ttl);
            cache(cmd, &store)
                .map_err(|e| Error::Generic(format!("failed to manage cache: {}", e)))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_fills_unset_args() {
        let mut cmd = InspectArgs::parse_from([
            "inspect",
            "0x1234",
            "--rpc-url",
            "http://localhost:4444",
            "--cache-ttl",
            "60",
        ]);
        let configuration = Configuration {
            mainnet_rpc_url: "https://mainnet.example".to_string(),
            mainnet_archive_rpc_url: "https://archive.example".to_string(),
            testnet_rpc_url: String::new(),
            testnet_archive_rpc_url: String::new(),
            cache_ttl: 3600,
            rpc_timeout: 30,
            cache_dir: "/tmp/txlens-cache".to_string(),
        };

        apply_configuration(&mut cmd, &configuration);

        assert_eq!(cmd.rpc_url, "http://localhost:4444");
        assert_eq!(cmd.archive_rpc_url, "https://archive.example");
        assert_eq!(cmd.testnet_rpc_url, "");
        assert_eq!(cmd.cache_dir, "/tmp/txlens-cache");
        assert_eq!(cmd.cache_ttl, 60);
        assert_eq!(cmd.rpc_timeout, 30);
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Arguments::parse_from(["txlens", "storage", "0x01", "0x0", "--block", "7"]);
        assert!(matches!(args.sub, Subcommands::Storage(ref cmd) if cmd.block == 7));

        let args = Arguments::parse_from(["txlens", "cache", "size"]);
        assert!(matches!(args.sub, Subcommands::Cache(_)));
    }
}
