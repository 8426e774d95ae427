pub(crate) mod normalizer;

use std::{path::PathBuf, sync::Arc, time::Duration};

use tracing::{debug, info, trace, warn};
use txlens_cache::{Cache, FileCache, MemoryCache};
use txlens_common::{
    error::Error as ChainError,
    ether::{
        network::Network,
        rpc::{ChainClient, EndpointUrls},
    },
    utils::hex::{parse_tx_hash, ToLowerHex},
};
use txlens_decoder::SignatureRegistry;

use crate::{
    error::Error,
    interfaces::{InspectArgs, TransactionData, TransactionStatus},
    utils::format::{format_gas_price, format_gas_used, format_timestamp, format_wei},
};

pub use normalizer::{TraceNormalizer, MAX_TRACE_DEPTH};

/// Turns a transaction hash into a decoded [`TransactionData`], reading through a cache.
///
/// Every call runs the full fetch path on a cache miss. Concurrent calls for the same hash
/// are not coalesced; each writes its own result and the last write wins.
#[derive(Debug, Clone)]
pub struct DecodePipeline {
    client: ChainClient,
    normalizer: TraceNormalizer,
    cache: Arc<dyn Cache<TransactionData>>,
}

impl DecodePipeline {
    /// Creates a pipeline over `client`, decoding with `registry` and caching into `cache`.
    pub fn new(
        client: ChainClient,
        registry: Arc<SignatureRegistry>,
        cache: Arc<dyn Cache<TransactionData>>,
    ) -> Self {
        Self { client, normalizer: TraceNormalizer::new(registry), cache }
    }

    /// The normalizer, and through it the signature registry.
    pub fn normalizer(&self) -> &TraceNormalizer {
        &self.normalizer
    }

    /// The key a decoded transaction is cached under.
    pub fn cache_key(network: Network, hash: &str) -> String {
        format!("{}:{}", network, hash.to_lowercase())
    }

    /// Decodes the transaction `hash` on `network`.
    ///
    /// A cached result is returned unchanged. Otherwise the transaction, receipt, block
    /// timestamp and trace are fetched and normalized, and the result is written back to the
    /// cache. Cache failures never fail the decode.
    pub async fn decode(&self, hash: &str, network: Network) -> Result<TransactionData, Error> {
        let tx_hash = parse_tx_hash(hash)?;
        let key = Self::cache_key(network, hash);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!("cache hit for '{}'", key);
                return Ok(cached);
            }
            Ok(None) => trace!("cache miss for '{}'", key),
            Err(e) => warn!("failed to read '{}' from cache: {}", key, e),
        }

        let start_time = std::time::Instant::now();

        let tx = self.client.get_transaction(tx_hash, network).await?.ok_or_else(|| {
            ChainError::NotFound(format!("Transaction not found on {network}"))
        })?;

        let receipt = self.client.get_transaction_receipt(tx_hash, network).await?.ok_or_else(
            || {
                ChainError::NotFound(
                    "Transaction receipt not found. Transaction may not be fully mined yet."
                        .to_string(),
                )
            },
        )?;

        let block_number = receipt.block_number.to::<u64>();
        let timestamp = self.client.get_block_timestamp(block_number, network).await?;

        let raw_trace = self.client.trace_transaction(tx_hash, network).await?;
        let state_diff = if raw_trace.is_some() {
            self.client.trace_state_diff(tx_hash, network).await.unwrap_or_else(|e| {
                warn!("failed to fetch state diff, skipping state changes: {}", e);
                None
            })
        } else {
            None
        };
        let raw_trace = raw_trace.unwrap_or_else(|| {
            debug!("tracing unavailable, using a basic call trace");
            ChainClient::create_basic_call_trace(&tx, &receipt)
        });
        debug!("fetched transaction data in {:?}", start_time.elapsed());

        let status = receipt.status.to::<u64>();
        let data = TransactionData {
            tx_hash: tx_hash.to_lower_hex(),
            status: if receipt.succeeded() {
                TransactionStatus::Success
            } else {
                TransactionStatus::Failed
            },
            block_number: block_number.to_string(),
            timestamp: format_timestamp(timestamp),
            gas_used: format_gas_used(receipt.gas_used),
            gas_price: format_gas_price(receipt.effective_gas_price),
            from: tx.from.to_checksum(None),
            to: tx.to.map(|to| to.to_checksum(None)).unwrap_or_default(),
            value: format_wei(tx.value),
            call_trace: self.normalizer.parse_call_trace(&raw_trace, Some(status)),
            events: self.normalizer.parse_events(&receipt.logs),
            state_changes: self.normalizer.parse_state_changes(
                &raw_trace,
                block_number,
                state_diff.as_ref(),
            ),
        };

        if let Err(e) = self.cache.set(&key, data.clone()).await {
            warn!("failed to cache '{}': {}", key, e);
        }

        info!("decoded {} in {:?}", key, start_time.elapsed());
        Ok(data)
    }
}

/// The result of the `inspect` command.
#[derive(Debug, Clone)]
pub struct InspectResult {
    /// The decoded transaction.
    pub transaction: TransactionData,
}

impl InspectResult {
    /// The decoded transaction as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.transaction)?)
    }
}

/// Connects to the configured endpoints and decodes `args.target`.
pub async fn inspect(args: InspectArgs) -> Result<InspectResult, Error> {
    let timeout = Duration::from_secs(args.rpc_timeout);
    let client = ChainClient::connect(
        EndpointUrls {
            rpc_url: args.rpc_url.clone(),
            archive_rpc_url: Some(args.archive_rpc_url.clone()),
        },
        EndpointUrls {
            rpc_url: args.testnet_rpc_url.clone(),
            archive_rpc_url: Some(args.testnet_archive_rpc_url.clone()),
        },
        timeout,
    )
    .await?;

    let cache: Arc<dyn Cache<TransactionData>> = if args.no_cache {
        Arc::new(MemoryCache::new(args.cache_ttl))
    } else if args.cache_dir.is_empty() {
        Arc::new(FileCache::new(txlens_cache::default_cache_dir()?, args.cache_ttl))
    } else {
        Arc::new(FileCache::new(PathBuf::from(&args.cache_dir), args.cache_ttl))
    };

    let pipeline = DecodePipeline::new(client, Arc::new(SignatureRegistry::new()), cache);
    let transaction = pipeline.decode(&args.target, args.network).await?;

    Ok(InspectResult { transaction })
}
