//! The chain client: typed node access with standard/archive fallback.
use std::{sync::Arc, time::Duration};

use alloy::primitives::{Address, B256, U256, U64};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, value::RawValue, Value};
use tracing::{debug, error, trace, warn};

use crate::{
    constants::{DEFAULT_TESTNET_RPC_URL, TRACER_TIMEOUT},
    error::Error,
    ether::{
        network::Network,
        provider::{HttpEndpoint, RpcEndpoint},
        strategy::{self, EndpointRole, FallbackPlan, Fallthrough},
        types::{RawTraceCall, StateDiff, Transaction, TransactionReceipt},
    },
};

/// The standard and archive endpoints of one network.
#[derive(Clone, Debug)]
pub struct NetworkEndpoints {
    /// The regular node.
    pub standard: Arc<dyn RpcEndpoint>,
    /// The archive node. May point at the same node as `standard`.
    pub archive: Arc<dyn RpcEndpoint>,
}

impl NetworkEndpoints {
    /// Uses a single endpoint for both roles.
    pub fn single(endpoint: Arc<dyn RpcEndpoint>) -> Self {
        Self { standard: endpoint.clone(), archive: endpoint }
    }

    fn get(&self, role: EndpointRole) -> &Arc<dyn RpcEndpoint> {
        match role {
            EndpointRole::Standard => &self.standard,
            EndpointRole::Archive => &self.archive,
        }
    }
}

/// Endpoint URLs of one network, as configured by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointUrls {
    /// The regular node.
    pub rpc_url: String,
    /// The archive node. Falls back to `rpc_url` when unset.
    pub archive_rpc_url: Option<String>,
}

/// Fetches transactions, receipts, blocks, traces and storage from the mainnet and testnet
/// endpoints, applying the fallback plans in [`strategy`].
#[derive(Clone, Debug)]
pub struct ChainClient {
    mainnet: Option<NetworkEndpoints>,
    testnet: NetworkEndpoints,
}

impl ChainClient {
    /// Creates a client from already-built endpoints.
    pub fn new(mainnet: NetworkEndpoints, testnet: NetworkEndpoints) -> Self {
        Self { mainnet: Some(mainnet), testnet }
    }

    /// Creates a client that only serves testnet.
    pub fn testnet_only(testnet: NetworkEndpoints) -> Self {
        Self { mainnet: None, testnet }
    }

    /// Connects HTTP endpoints for both networks.
    ///
    /// Without a mainnet `rpc_url` the client serves testnet only, and every mainnet request
    /// fails with [`Error::Config`]. An empty testnet `rpc_url` uses the public testnet node,
    /// and a missing archive URL reuses the standard URL of the same network.
    pub async fn connect(
        mainnet: EndpointUrls,
        testnet: EndpointUrls,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mainnet = if mainnet.rpc_url.is_empty() {
            warn!("no mainnet RPC URL configured, mainnet requests will fail");
            None
        } else {
            Some(connect_network(mainnet, timeout).await?)
        };

        let testnet = EndpointUrls {
            rpc_url: if testnet.rpc_url.is_empty() {
                DEFAULT_TESTNET_RPC_URL.to_string()
            } else {
                testnet.rpc_url
            },
            archive_rpc_url: testnet.archive_rpc_url,
        };

        Ok(Self { mainnet, testnet: connect_network(testnet, timeout).await? })
    }

    fn endpoints(&self, network: Network) -> Result<&NetworkEndpoints, Error> {
        match network {
            Network::Mainnet => self
                .mainnet
                .as_ref()
                .ok_or_else(|| Error::Config("a mainnet RPC URL is required".to_string())),
            Network::Testnet => Ok(&self.testnet),
        }
    }

    /// Runs `plan` for one request. `convert` turns a non-null result into the typed value;
    /// an error from `convert` aborts the plan immediately.
    async fn run_plan<T>(
        &self,
        network: Network,
        plan: &FallbackPlan,
        method: &str,
        params: Value,
        convert: impl Fn(&RawValue) -> Result<T, Error>,
    ) -> Result<Option<T>, Error> {
        let endpoints = self.endpoints(network)?;

        for strategy in plan.strategies {
            let endpoint = endpoints.get(strategy.role);
            trace!("{} via {:?} endpoint '{}'", method, strategy.role, endpoint.url());

            match endpoint.request(method, params.clone()).await {
                Ok(raw) if is_null(&raw) => {
                    debug!("{:?} endpoint returned null for {}", strategy.role, method);
                }
                Ok(raw) => return convert(&*raw).map(Some),
                Err(e) => match (strategy.on_error)(&e) {
                    Fallthrough::Next => {
                        warn!("{:?} endpoint failed {}: {}", strategy.role, method, e);
                    }
                    Fallthrough::Miss => {
                        debug!("{:?} endpoint missed {}: {}", strategy.role, method, e);
                        return Ok(None);
                    }
                    Fallthrough::Abort => {
                        error!("{}: {}", plan.context, e);
                        return Err(Error::Rpc {
                            context: plan.context.to_string(),
                            message: e.message,
                        });
                    }
                },
            }
        }

        Ok(None)
    }

    /// Get a transaction by hash, falling back to the archive node.
    ///
    /// Returns [`Error::PendingTransaction`] if the transaction has no block yet, wherever it
    /// was found.
    pub async fn get_transaction(
        &self,
        hash: B256,
        network: Network,
    ) -> Result<Option<Transaction>, Error> {
        const METHOD: &str = "eth_getTransactionByHash";

        self.run_plan(network, &strategy::TRANSACTION, METHOD, json!([hash]), |raw| {
            let tx: Transaction = decode(METHOD, raw)?;
            if tx.is_pending() {
                return Err(Error::PendingTransaction);
            }
            Ok(tx)
        })
        .await
    }

    /// Get a transaction receipt by hash, falling back to the archive node.
    pub async fn get_transaction_receipt(
        &self,
        hash: B256,
        network: Network,
    ) -> Result<Option<TransactionReceipt>, Error> {
        const METHOD: &str = "eth_getTransactionReceipt";

        self.run_plan(network, &strategy::RECEIPT, METHOD, json!([hash]), |raw| decode(METHOD, raw))
        .await
    }

    /// Get the timestamp of a block from the standard node. A missing block is an error.
    pub async fn get_block_timestamp(
        &self,
        block_number: u64,
        network: Network,
    ) -> Result<DateTime<Utc>, Error> {
        const METHOD: &str = "eth_getBlockByNumber";
        const CONTEXT: &str = "Failed to fetch block timestamp";

        #[derive(serde::Deserialize)]
        struct BlockHeader {
            timestamp: U64,
        }

        let raw = self
            .endpoints(network)?
            .standard
            .request(METHOD, json!([format!("{block_number:#x}"), false]))
            .await
            .map_err(|e| Error::Rpc { context: CONTEXT.to_string(), message: e.message })?;

        if is_null(&raw) {
            return Err(Error::Rpc {
                context: CONTEXT.to_string(),
                message: format!("Block {block_number} not found"),
            });
        }

        let header: BlockHeader = decode(METHOD, &raw)?;
        let seconds = i64::try_from(header.timestamp.to::<u64>()).map_err(|_| {
            Error::InvalidResponse {
                method: METHOD.to_string(),
                reason: format!("timestamp {} out of range", header.timestamp),
            }
        })?;

        DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| Error::InvalidResponse {
            method: METHOD.to_string(),
            reason: format!("timestamp {seconds} out of range"),
        })
    }

    /// Trace a transaction with the node's `callTracer`, archive node first.
    ///
    /// Returns `Ok(None)` when neither node supports tracing.
    pub async fn trace_transaction(
        &self,
        hash: B256,
        network: Network,
    ) -> Result<Option<RawTraceCall>, Error> {
        const METHOD: &str = "debug_traceTransaction";

        let params = json!([
            hash,
            {
                "tracer": "callTracer",
                "tracerConfig": { "withLog": true, "timeout": TRACER_TIMEOUT }
            }
        ]);

        let trace = self
            .run_plan(network, &strategy::TRACE, METHOD, params, |raw| {
                RawTraceCall::from_json(raw.get()).map_err(|e| invalid_response(METHOD, e))
            })
            .await?;
        if trace.is_none() {
            warn!("debug_traceTransaction is not supported by the {} nodes", network);
        }

        Ok(trace)
    }

    /// Trace a transaction with the node's `prestateTracer` in diff mode, archive node first.
    ///
    /// Returns `Ok(None)` when neither node supports it.
    pub async fn trace_state_diff(
        &self,
        hash: B256,
        network: Network,
    ) -> Result<Option<StateDiff>, Error> {
        const METHOD: &str = "debug_traceTransaction";

        let params = json!([
            hash,
            {
                "tracer": "prestateTracer",
                "tracerConfig": { "diffMode": true },
                "timeout": TRACER_TIMEOUT
            }
        ]);

        self.run_plan(network, &strategy::STATE_DIFF, METHOD, params, |raw| decode(METHOD, raw))
        .await
    }

    /// Read a raw storage word at the given block from the standard node.
    pub async fn get_storage_at(
        &self,
        address: Address,
        slot: U256,
        block_number: u64,
        network: Network,
    ) -> Result<B256, Error> {
        const METHOD: &str = "eth_getStorageAt";

        let raw = self
            .endpoints(network)?
            .standard
            .request(METHOD, json!([address, slot, format!("{block_number:#x}")]))
            .await
            .map_err(|e| Error::Rpc {
                context: "Failed to fetch storage".to_string(),
                message: e.message,
            })?;

        decode(METHOD, &raw)
    }

    /// Build a single-frame trace from a transaction and its receipt, for nodes that don't
    /// support tracing.
    pub fn create_basic_call_trace(
        tx: &Transaction,
        receipt: &TransactionReceipt,
    ) -> RawTraceCall {
        RawTraceCall {
            typ: if tx.to.is_some() { "CALL" } else { "CREATE" }.to_string(),
            from: Some(tx.from),
            to: tx.to,
            value: Some(tx.value),
            gas: Some(tx.gas_limit),
            gas_used: Some(receipt.gas_used),
            input: Some(tx.input.clone()),
            output: None,
            error: None,
            calls: Vec::new(),
        }
    }
}

async fn connect_network(urls: EndpointUrls, timeout: Duration) -> Result<NetworkEndpoints, Error> {
    let standard: Arc<dyn RpcEndpoint> = Arc::new(HttpEndpoint::connect(&urls.rpc_url, timeout).await?);

    let archive: Arc<dyn RpcEndpoint> = match urls.archive_rpc_url.filter(|url| !url.is_empty()) {
        Some(url) if url != urls.rpc_url => Arc::new(HttpEndpoint::connect(&url, timeout).await?),
        _ => standard.clone(),
    };

    Ok(NetworkEndpoints { standard, archive })
}

fn is_null(raw: &RawValue) -> bool {
    raw.get() == "null"
}

fn decode<T: DeserializeOwned>(method: &str, raw: &RawValue) -> Result<T, Error> {
    serde_json::from_str(raw.get()).map_err(|e| invalid_response(method, e))
}

fn invalid_response(method: &str, e: serde_json::Error) -> Error {
    Error::InvalidResponse { method: method.to_string(), reason: e.to_string() }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::Mutex,
    };

    use alloy::primitives::{address, Bytes};
    use async_trait::async_trait;

    use super::*;
    use crate::ether::provider::RpcError;

    /// Answers each method with a canned result and records every call.
    #[derive(Debug, Default)]
    struct ScriptedEndpoint {
        name: &'static str,
        responses: HashMap<&'static str, Result<Value, RpcError>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedEndpoint {
        fn new(name: &'static str) -> Self {
            Self { name, ..Default::default() }
        }

        fn with(mut self, method: &'static str, response: Result<Value, RpcError>) -> Self {
            self.responses.insert(method, response);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().expect("poisoned").len()
        }
    }

    #[async_trait]
    impl RpcEndpoint for ScriptedEndpoint {
        fn url(&self) -> &str {
            self.name
        }

        async fn request(&self, method: &str, _params: Value) -> Result<Box<RawValue>, RpcError> {
            self.calls.lock().expect("poisoned").push(method.to_string());
            self.responses
                .get(method)
                .cloned()
                .unwrap_or(Ok(Value::Null))
                .map(|value| serde_json::value::to_raw_value(&value).expect("invalid json"))
        }
    }

    fn client(standard: ScriptedEndpoint, archive: ScriptedEndpoint) -> (ChainClient, Arc<ScriptedEndpoint>, Arc<ScriptedEndpoint>) {
        let standard = Arc::new(standard);
        let archive = Arc::new(archive);
        let endpoints = NetworkEndpoints { standard: standard.clone(), archive: archive.clone() };
        (ChainClient::new(endpoints.clone(), endpoints), standard, archive)
    }

    fn tx_json(block_number: Value) -> Value {
        json!({
            "hash": format!("0x{}", "11".repeat(32)),
            "blockNumber": block_number,
            "from": "0x0000000000000000000000000000000000000001",
            "to": "0x0000000000000000000000000000000000000002",
            "value": "0x6f05b59d3b20000",
            "gasPrice": "0x3938700",
            "gas": "0x5208",
            "input": "0x"
        })
    }

    #[tokio::test]
    async fn test_get_transaction_falls_back_to_archive_on_not_found() {
        let (client, standard, archive) = client(
            ScriptedEndpoint::new("standard")
                .with("eth_getTransactionByHash", Err(RpcError::new("transaction not found"))),
            ScriptedEndpoint::new("archive")
                .with("eth_getTransactionByHash", Ok(tx_json(json!("0x10")))),
        );

        let tx = client
            .get_transaction(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect("failed to get transaction")
            .expect("transaction missing");

        assert_eq!(tx.block_number, Some(U64::from(16)));
        assert_eq!(standard.call_count(), 1);
        assert_eq!(archive.call_count(), 1);
    }

    #[tokio::test]
    async fn test_get_transaction_pending_on_archive_aborts() {
        let (client, _, _) = client(
            ScriptedEndpoint::new("standard"),
            ScriptedEndpoint::new("archive")
                .with("eth_getTransactionByHash", Ok(tx_json(Value::Null))),
        );

        let result = client.get_transaction(B256::repeat_byte(0x11), Network::Mainnet).await;
        assert!(matches!(result, Err(Error::PendingTransaction)));
    }

    #[tokio::test]
    async fn test_get_transaction_wraps_fatal_errors() {
        let (client, _, archive) = client(
            ScriptedEndpoint::new("standard")
                .with("eth_getTransactionByHash", Err(RpcError::new("connection refused"))),
            ScriptedEndpoint::new("archive"),
        );

        let err = client
            .get_transaction(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect_err("expected an error");

        assert_eq!(err.to_string(), "Failed to fetch transaction: connection refused");
        assert_eq!(archive.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_transaction_missing_everywhere_is_none() {
        let (client, _, _) = client(ScriptedEndpoint::new("standard"), ScriptedEndpoint::new("archive"));

        let tx = client
            .get_transaction(B256::repeat_byte(0x11), Network::Testnet)
            .await
            .expect("failed to get transaction");
        assert!(tx.is_none());
    }

    #[tokio::test]
    async fn test_get_receipt_archive_failure_is_a_miss() {
        let (client, _, _) = client(
            ScriptedEndpoint::new("standard"),
            ScriptedEndpoint::new("archive")
                .with("eth_getTransactionReceipt", Err(RpcError::new("connection reset"))),
        );

        let receipt = client
            .get_transaction_receipt(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect("archive failures should not be raised");
        assert!(receipt.is_none());
    }

    #[tokio::test]
    async fn test_trace_unsupported_is_none() {
        let unsupported = || {
            Err(RpcError::new("the method debug_traceTransaction does not exist/is not available"))
        };
        let (client, standard, archive) = client(
            ScriptedEndpoint::new("standard").with("debug_traceTransaction", unsupported()),
            ScriptedEndpoint::new("archive").with("debug_traceTransaction", unsupported()),
        );

        let trace = client
            .trace_transaction(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect("unsupported tracing should not be raised");

        assert!(trace.is_none());
        assert_eq!(archive.call_count(), 1);
        assert_eq!(standard.call_count(), 1);
    }

    #[tokio::test]
    async fn test_trace_archive_failure_falls_back_to_standard() {
        let (client, standard, archive) = client(
            ScriptedEndpoint::new("standard").with(
                "debug_traceTransaction",
                Ok(json!({ "type": "CALL", "calls": [{ "type": "STATICCALL" }] })),
            ),
            ScriptedEndpoint::new("archive")
                .with("debug_traceTransaction", Err(RpcError::new("connection reset by peer"))),
        );

        let trace = client
            .trace_transaction(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect("archive failures should fall through")
            .expect("standard node returned a trace");

        assert_eq!(trace.typ, "CALL");
        assert_eq!(trace.calls[0].typ, "STATICCALL");
        assert_eq!(archive.call_count(), 1);
        assert_eq!(standard.call_count(), 1);
    }

    #[tokio::test]
    async fn test_trace_other_failure_is_raised() {
        let (client, _, _) = client(
            ScriptedEndpoint::new("standard")
                .with("debug_traceTransaction", Err(RpcError::new("execution timeout"))),
            ScriptedEndpoint::new("archive")
                .with("debug_traceTransaction", Err(RpcError::new("execution timeout"))),
        );

        let err = client
            .trace_transaction(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect_err("expected an error");
        assert_eq!(err.to_string(), "Failed to trace transaction: execution timeout");
    }

    #[tokio::test]
    async fn test_get_block_timestamp() {
        let (client, _, _) = client(
            ScriptedEndpoint::new("standard")
                .with("eth_getBlockByNumber", Ok(json!({ "timestamp": "0x6553f100" }))),
            ScriptedEndpoint::new("archive"),
        );

        let timestamp = client
            .get_block_timestamp(16, Network::Mainnet)
            .await
            .expect("failed to get block timestamp");
        assert_eq!(timestamp.timestamp(), 0x6553f100);
    }

    #[tokio::test]
    async fn test_get_block_timestamp_missing_block_is_fatal() {
        let (client, _, _) = client(ScriptedEndpoint::new("standard"), ScriptedEndpoint::new("archive"));

        let err = client
            .get_block_timestamp(16, Network::Mainnet)
            .await
            .expect_err("expected an error");
        assert_eq!(err.to_string(), "Failed to fetch block timestamp: Block 16 not found");
    }

    #[tokio::test]
    async fn test_get_storage_at() {
        let word = format!("0x{}", "00".repeat(31) + "2a");
        let (client, _, _) = client(
            ScriptedEndpoint::new("standard").with("eth_getStorageAt", Ok(json!(word))),
            ScriptedEndpoint::new("archive"),
        );

        let value = client
            .get_storage_at(Address::ZERO, U256::ZERO, 16, Network::Mainnet)
            .await
            .expect("failed to get storage");
        assert_eq!(value, B256::with_last_byte(0x2a));
    }

    #[tokio::test]
    async fn test_testnet_only_client_rejects_mainnet() {
        let client = ChainClient::testnet_only(NetworkEndpoints::single(Arc::new(
            ScriptedEndpoint::new("testnet"),
        )));

        let result = client.get_transaction(B256::repeat_byte(0x11), Network::Mainnet).await;
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(client.get_transaction(B256::repeat_byte(0x11), Network::Testnet).await.is_ok());
    }

    /// Serves every JSON-RPC request on `listener` with `result`, echoing the request id.
    async fn serve_result(listener: tokio::net::TcpListener, result: String) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];

            let body = loop {
                let read = socket.read(&mut chunk).await.expect("failed to read request");
                if read == 0 {
                    break None;
                }
                request.extend_from_slice(&chunk[..read]);

                let text = String::from_utf8_lossy(&request).to_string();
                let Some(header_end) = text.find("\r\n\r\n") else { continue };
                let length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + length {
                    break Some(request[header_end + 4..header_end + 4 + length].to_vec());
                }
            };
            let Some(body) = body else { continue };

            let id = serde_json::from_slice::<Value>(&body).expect("invalid request")["id"].clone();
            let payload = format!(r#"{{"jsonrpc":"2.0","id":{id},"result":{result}}}"#);
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                payload.len(),
                payload
            );
            socket.write_all(response.as_bytes()).await.expect("failed to write response");
            let _ = socket.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_trace_deeper_than_json_recursion_limit_over_http() {
        let depth = 200;
        let trace = format!(
            "{}{}{}",
            r#"{"type":"CALL","calls":["#.repeat(depth),
            r#"{"type":"STATICCALL","input":"0x70a08231"}"#,
            "]}".repeat(depth)
        );

        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind listener");
        let url = format!("http://{}", listener.local_addr().expect("no local address"));
        tokio::spawn(serve_result(listener, trace));

        let urls = EndpointUrls { rpc_url: url, archive_rpc_url: None };
        let client = ChainClient::connect(urls.clone(), urls, Duration::from_secs(10))
            .await
            .expect("failed to connect");

        let trace = client
            .trace_transaction(B256::repeat_byte(0x11), Network::Mainnet)
            .await
            .expect("failed to trace transaction")
            .expect("trace missing");

        let mut levels = 0;
        let mut frame = &trace;
        while let Some(child) = frame.calls.first() {
            levels += 1;
            frame = child;
        }
        assert_eq!(levels, depth);
        assert_eq!(frame.typ, "STATICCALL");
    }

    #[test]
    fn test_create_basic_call_trace() {
        let to = address!("00000000000000000000000000000000000000aa");
        let tx = Transaction {
            hash: B256::ZERO,
            block_number: Some(U64::from(1)),
            from: Address::ZERO,
            to: Some(to),
            value: U256::from(5),
            gas_price: U256::ZERO,
            gas_limit: U256::from(21000),
            input: Bytes::new(),
        };
        let receipt = TransactionReceipt {
            transaction_hash: B256::ZERO,
            block_number: U64::from(1),
            block_hash: B256::ZERO,
            transaction_index: U64::ZERO,
            from: Address::ZERO,
            to: Some(to),
            gas_used: U256::from(21000),
            effective_gas_price: U256::ZERO,
            status: U64::from(1),
            logs: vec![],
        };

        let trace = ChainClient::create_basic_call_trace(&tx, &receipt);
        assert_eq!(trace.typ, "CALL");
        assert_eq!(trace.to, Some(to));
        assert!(trace.calls.is_empty());

        let creation = Transaction { to: None, ..tx };
        assert_eq!(ChainClient::create_basic_call_trace(&creation, &receipt).typ, "CREATE");
    }
}
