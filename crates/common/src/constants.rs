/// Public testnet node used when no testnet endpoint is configured.
pub const DEFAULT_TESTNET_RPC_URL: &str = "https://public-node.testnet.rsk.co";

/// Default per-request timeout for JSON-RPC calls, in seconds.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 90;

/// Timeout handed to the node's tracer for `debug_traceTransaction`.
pub const TRACER_TIMEOUT: &str = "60s";

/// Number of decimals of the chain's base currency.
pub const BASE_UNIT_DECIMALS: u32 = 18;
