//! Configuration management for txlens
//!
//! This crate provides functionality for managing the txlens configuration, including loading,
//! saving and updating configuration settings. Settings live in
//! `~/.txlens/config.toml` and can be overridden from the environment.

/// Error types for the configuration module
pub mod error;

use std::path::{Path, PathBuf};

use crate::error::Error;
use clap::Parser;
use serde::{Deserialize, Serialize};
#[allow(deprecated)]
use std::env::home_dir;
use tracing::{debug, error, info};
use txlens_common::{
    constants::DEFAULT_RPC_TIMEOUT_SECS,
    utils::{
        env::{get_env, get_env_parsed},
        io::{read_file, write_file},
    },
};

/// Default retention of cached results: 7 days.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Command line arguments for the configuration command
#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Display and edit the current configuration",
    override_usage = "txlens config [KEY] [VALUE]"
)]
pub struct ConfigArgs {
    /// The target key to update.
    #[clap(required = false, default_value = "")]
    key: String,

    /// The value to set the key to.
    #[clap(required = false, default_value = "")]
    value: String,
}

/// The [`Configuration`] struct represents the configuration of the CLI. Endpoint and cache
/// settings not given on the command line are read from here.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Configuration {
    /// The mainnet RPC endpoint. Required for mainnet lookups.
    pub mainnet_rpc_url: String,

    /// The mainnet archive node. Falls back to `mainnet_rpc_url` when empty.
    pub mainnet_archive_rpc_url: String,

    /// The testnet RPC endpoint. Falls back to the public testnet node when empty.
    pub testnet_rpc_url: String,

    /// The testnet archive node. Falls back to `testnet_rpc_url` when empty.
    pub testnet_archive_rpc_url: String,

    /// Seconds a cached result stays valid.
    pub cache_ttl: u64,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout: u64,

    /// Directory of the result cache.
    pub cache_dir: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            mainnet_rpc_url: String::new(),
            mainnet_archive_rpc_url: String::new(),
            testnet_rpc_url: String::new(),
            testnet_archive_rpc_url: String::new(),
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            rpc_timeout: DEFAULT_RPC_TIMEOUT_SECS,
            cache_dir: txlens_dir()
                .map(|dir| dir.join("cache").to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// The directory txlens keeps its configuration and cache in, `$HOME/.txlens`.
#[allow(deprecated)]
pub fn txlens_dir() -> Result<PathBuf, Error> {
    let home = home_dir().ok_or_else(|| {
        Error::Generic(
            "failed to get home directory. does your os support `std::env::home_dir()`?"
                .to_string(),
        )
    })?;
    Ok(home.join(".txlens"))
}

/// The location of the configuration file, `$HOME/.txlens/config.toml`.
pub fn config_path() -> Result<PathBuf, Error> {
    Ok(txlens_dir()?.join("config.toml"))
}

impl Configuration {
    /// Returns the current configuration, with environment overrides applied.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&config_path()?)
    }

    /// Loads the configuration file at `path`, creating it with defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        // if the config file doesn't exist, create it
        if !path.exists() {
            Configuration::default().save_to(path)?;
        }

        let contents = read_file(path)
            .map_err(|e| Error::Generic(format!("failed to read config file: {e}")))?;

        let mut config: Configuration = toml::from_str(&contents)
            .map_err(|e| Error::ParseError(format!("failed to parse config file: {e}")))?;
        config.apply_env();

        Ok(config)
    }

    /// Overrides settings from the `ROOTSTOCK_*` and `CACHE_TTL` environment variables.
    fn apply_env(&mut self) {
        let overrides = [
            ("ROOTSTOCK_RPC_URL", &mut self.mainnet_rpc_url),
            ("ROOTSTOCK_ARCHIVE_NODE_URL", &mut self.mainnet_archive_rpc_url),
            ("ROOTSTOCK_TESTNET_RPC_URL", &mut self.testnet_rpc_url),
            ("ROOTSTOCK_TESTNET_ARCHIVE_NODE_URL", &mut self.testnet_archive_rpc_url),
        ];
        for (key, setting) in overrides {
            if let Some(value) = get_env(key) {
                debug!("overriding configuration from {}", key);
                *setting = value;
            }
        }

        if let Some(ttl) = get_env_parsed::<u64>("CACHE_TTL") {
            debug!("overriding cache_ttl from CACHE_TTL");
            self.cache_ttl = ttl;
        }
    }

    /// Saves the current configuration to disk.
    pub fn save(&self) -> Result<(), Error> {
        self.save_to(&config_path()?)
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        write_file(
            path,
            &toml::to_string(&self)
                .map_err(|e| Error::ParseError(format!("failed to serialize config: {e}")))?,
        )
        .map_err(|e| Error::Generic(format!("failed to write config file: {e}")))
    }

    /// Sets a single key, checking that the value has the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let parse_secs = |value: &str| {
            value.parse::<u64>().map_err(|_| {
                Error::ParseError(format!("'{key}' must be a number of seconds, got '{value}'"))
            })
        };

        match key {
            "mainnet_rpc_url" => self.mainnet_rpc_url = value.to_string(),
            "mainnet_archive_rpc_url" => self.mainnet_archive_rpc_url = value.to_string(),
            "testnet_rpc_url" => self.testnet_rpc_url = value.to_string(),
            "testnet_archive_rpc_url" => self.testnet_archive_rpc_url = value.to_string(),
            "cache_ttl" => self.cache_ttl = parse_secs(value)?,
            "rpc_timeout" => self.rpc_timeout = parse_secs(value)?,
            "cache_dir" => self.cache_dir = value.to_string(),
            _ => {
                return Err(Error::Generic(format!(
                    "invalid key: \'{key}\' is not a valid configuration key."
                )))
            }
        }

        Ok(())
    }

    /// Update a single key/value pair in the configuration and write it to disk.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.set(key, value)?;
        self.save()
    }
}

/// The `config` command is used to display and edit the current configuration.
pub fn config(args: ConfigArgs) -> Result<(), Error> {
    if !args.key.is_empty() {
        if !args.value.is_empty() {
            // read the config file and update the key/value pair
            let mut config = Configuration::load()?;
            config.update(&args.key, &args.value)?;
            info!("updated configuration! Set \'{}\' = \'{}\' .", &args.key, &args.value);
        } else {
            // key is set, but no value is set
            error!("found key but no value to set. Please specify a value to set, use `txlens config --help` for more information.");
        }
    } else {
        // no key is set, print the config file
        println!("{:#?}", Configuration::load()?);
        info!("use `txlens config <KEY> <VALUE>` to set a key/value pair.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use txlens_common::utils::io::delete_path;

    const ENV_KEYS: [&str; 5] = [
        "ROOTSTOCK_RPC_URL",
        "ROOTSTOCK_ARCHIVE_NODE_URL",
        "ROOTSTOCK_TESTNET_RPC_URL",
        "ROOTSTOCK_TESTNET_ARCHIVE_NODE_URL",
        "CACHE_TTL",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn scratch_config(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join("txlens-config-tests")
            .join(format!("{}-{name}.toml", std::process::id()));
        delete_path(&path);
        path
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.mainnet_rpc_url, "");
        assert_eq!(config.testnet_rpc_url, "");
        assert_eq!(config.cache_ttl, 604800);
        assert_eq!(config.rpc_timeout, 90);
        assert!(config.cache_dir.ends_with("cache"));
    }

    #[test]
    #[serial]
    fn test_load_creates_missing_file() {
        clear_env();
        let path = scratch_config("create");

        let config = Configuration::load_from(&path).expect("failed to load config file");

        assert!(path.exists());
        assert_eq!(config, Configuration::default());
    }

    #[test]
    #[serial]
    fn test_save_and_load_configuration() {
        clear_env();
        let path = scratch_config("roundtrip");
        let mut config = Configuration::default();

        config.set("mainnet_rpc_url", "https://public-node.rsk.co").expect("failed to set");
        config.set("cache_ttl", "3600").expect("failed to set");
        config.save_to(&path).expect("failed to save config file");

        let loaded = Configuration::load_from(&path).expect("failed to load config file");

        assert_eq!(loaded.mainnet_rpc_url, "https://public-node.rsk.co");
        assert_eq!(loaded.cache_ttl, 3600);
        assert_eq!(loaded.rpc_timeout, 90);
    }

    #[test]
    #[serial]
    fn test_partial_file_uses_defaults() {
        clear_env();
        let path = scratch_config("partial");
        write_file(&path, "testnet_rpc_url = \"http://localhost:4444\"\n").expect("failed to write");

        let config = Configuration::load_from(&path).expect("failed to load config file");

        assert_eq!(config.testnet_rpc_url, "http://localhost:4444");
        assert_eq!(config.cache_ttl, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let path = scratch_config("env");
        Configuration::default().save_to(&path).expect("failed to save config file");

        std::env::set_var("ROOTSTOCK_RPC_URL", "https://mainnet.example");
        std::env::set_var("ROOTSTOCK_TESTNET_ARCHIVE_NODE_URL", "https://archive.testnet.example");
        std::env::set_var("CACHE_TTL", "60");
        let config = Configuration::load_from(&path).expect("failed to load config file");
        clear_env();

        assert_eq!(config.mainnet_rpc_url, "https://mainnet.example");
        assert_eq!(config.mainnet_archive_rpc_url, "");
        assert_eq!(config.testnet_archive_rpc_url, "https://archive.testnet.example");
        assert_eq!(config.cache_ttl, 60);
    }

    #[test]
    #[serial]
    fn test_set_rejects_bad_input() {
        let mut config = Configuration::default();

        assert!(matches!(config.set("rpc_timeout", "soon"), Err(Error::ParseError(_))));
        assert!(matches!(config.set("etherscan_api_key", "x"), Err(Error::Generic(_))));
        assert_eq!(config.rpc_timeout, 90);
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_a_parse_error() {
        clear_env();
        let path = scratch_config("malformed");
        write_file(&path, "cache_ttl = \"a week\"\n").expect("failed to write");

        assert!(matches!(Configuration::load_from(&path), Err(Error::ParseError(_))));
    }
}
