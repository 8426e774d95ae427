//! A simple cache system for txlens
//! Stores objects with an expiry time, either on disk in ~/.txlens/cache as hex-encoded bincode
//! files or in memory. Expired objects are deleted when they are read.

use std::{fmt::Debug, path::PathBuf};

use async_trait::async_trait;
use clap::Parser;
use serde::{Deserialize, Serialize};

use error::Error;
use util::prettify_bytes;

pub mod error;
mod memory;
mod store;
pub(crate) mod util;

pub use memory::MemoryCache;
pub use store::FileCache;

/// Default retention of cached objects: 7 days.
pub const DEFAULT_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Clap argument parser for the cache subcommand
#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Manage txlens' cached objects",
    override_usage = "txlens cache <SUBCOMMAND>"
)]
pub struct CacheArgs {
    /// Cache subcommand
    #[clap(subcommand)]
    pub sub: Subcommands,
}

/// A simple clap subcommand with no arguments
#[derive(Debug, Clone, Parser)]
pub struct NoArguments {}

/// Clap subcommand parser for cache subcommands
#[derive(Debug, Clone, Parser)]
#[clap(about = "Manage txlens' cached objects")]
pub enum Subcommands {
    /// Clear the cache, removing all objects
    #[clap(name = "clean", about = "Removes all cached objects")]
    Clean(NoArguments),

    /// List all cached objects
    #[clap(name = "ls", about = "Lists all cached objects")]
    Ls(NoArguments),

    /// Print the size of the cache
    #[clap(name = "size", about = "Prints the size of the cache")]
    Size(NoArguments),
}

/// A simple cache object that stores a value and an expiry time \
/// The expiry time is a unix timestamp
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entry<T> {
    /// The value stored in the cache
    pub value: T,
    /// The expiry time of the cache object
    pub expiry: u64,
}

impl<T> Entry<T> {
    /// Whether the entry expired before `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiry < now
    }
}

/// A key-value store with TTL eviction.
///
/// Callers treat every error as recoverable: a failed read is a miss, and a failed write only
/// means the value isn't materialised.
#[async_trait]
pub trait Cache<T>: Send + Sync + Debug
where
    T: Send + 'static,
{
    /// Reads a value. Expired or absent entries are `None`.
    async fn get(&self, key: &str) -> Result<Option<T>, Error>;

    /// Stores a value with the cache's retention window.
    async fn set(&self, key: &str, value: T) -> Result<(), Error>;
}

/// The directory used by the file cache when none is configured.
#[allow(deprecated)]
pub fn default_cache_dir() -> Result<PathBuf, Error> {
    let home = std::env::home_dir().ok_or_else(|| {
        Error::Generic(
            "failed to get home directory. does your os support `std::env::home_dir()`?"
                .to_string(),
        )
    })?;
    Ok(home.join(".txlens").join("cache"))
}

/// Cache subcommand handler
pub fn cache(args: CacheArgs, store: &FileCache) -> Result<(), Error> {
    match args.sub {
        Subcommands::Clean(_) => {
            store.clear()?;
            println!("Cache cleared.")
        }
        Subcommands::Ls(_) => {
            let keys = store.keys("*")?;
            println!("Displaying {} cached objects:", keys.len());

            for (i, key) in keys.iter().enumerate() {
                println!("{i:>5} : {key}");
            }
        }
        Subcommands::Size(_) => {
            println!("Cached objects: {}", store.keys("*")?.len());
            println!("Cache size: {}", prettify_bytes(store.size()?));
        }
    }

    Ok(())
}
