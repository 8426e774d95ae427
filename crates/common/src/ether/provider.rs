//! The JSON-RPC endpoint seam, and its HTTP implementation.
use std::{fmt::Debug, time::Duration};

use alloy::{
    network::Ethereum,
    providers::{Provider, ProviderBuilder, RootProvider},
};
use async_trait::async_trait;
use serde_json::{value::RawValue, Value};
use tracing::trace;

use crate::error::Error;

/// Message fragments a node uses when the requested object does not exist.
const NOT_FOUND_MARKERS: [&str; 3] = ["not found", "does not exist", "unknown transaction"];

/// Message fragments a node uses when it doesn't support a debug method.
const METHOD_UNAVAILABLE_MARKERS: [&str; 4] =
    ["debug_tracetransaction", "does not exist", "not available", "method not found"];

/// Longest message kept in an [`RpcError`]. Transport errors may quote the whole response.
const MAX_MESSAGE_CHARS: usize = 512;

/// An error returned by a single JSON-RPC request, with the node's message preserved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RpcError {
    /// The transport or node error message.
    pub message: String,
}

impl RpcError {
    /// Creates a new [`RpcError`] from any message, cut to [`MAX_MESSAGE_CHARS`] characters.
    pub fn new(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if let Some((end, _)) = message.char_indices().nth(MAX_MESSAGE_CHARS) {
            message.truncate(end);
            message.push_str("...");
        }
        Self { message }
    }

    fn mentions_any(&self, markers: &[&str]) -> bool {
        let message = self.message.to_lowercase();
        markers.iter().any(|marker| message.contains(marker))
    }

    /// Whether the node reported that the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.mentions_any(&NOT_FOUND_MARKERS)
    }

    /// Whether the node reported that the called method is unsupported.
    pub fn is_method_unavailable(&self) -> bool {
        self.mentions_any(&METHOD_UNAVAILABLE_MARKERS)
    }
}

/// A single JSON-RPC endpoint.
///
/// Implementations return the `result` member of the response as unparsed JSON; validation
/// into typed models is the caller's job. The trait is object safe and is shared as
/// `Arc<dyn RpcEndpoint>`.
#[async_trait]
pub trait RpcEndpoint: Send + Sync + Debug {
    /// The endpoint's URL, or any identifier for in-process endpoints.
    fn url(&self) -> &str;

    /// Sends `method` with positional `params` and returns the raw result.
    async fn request(&self, method: &str, params: Value) -> Result<Box<RawValue>, RpcError>;
}

/// [`HttpEndpoint`] is a convenience wrapper around an alloy [`RootProvider`] which enforces a
/// per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    url: String,
    provider: RootProvider<Ethereum>,
    timeout: Duration,
}

impl HttpEndpoint {
    /// Connect to a provider using the given rpc_url.
    pub async fn connect(rpc_url: &str, timeout: Duration) -> Result<Self, Error> {
        if rpc_url.is_empty() {
            return Err(Error::Config("No RPC URL provided".to_string()));
        }

        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|e| Error::Rpc {
                context: format!("failed to connect to provider '{rpc_url}'"),
                message: e.to_string(),
            })?
            .root()
            .clone();

        Ok(Self { url: rpc_url.to_string(), provider, timeout })
    }
}

#[async_trait]
impl RpcEndpoint for HttpEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Box<RawValue>, RpcError> {
        trace!("sending {} to '{}'", method, self.url);

        let call =
            self.provider.raw_request::<_, Box<RawValue>>(method.to_string().into(), params);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(RpcError::new(e.to_string())),
            Err(_) => Err(RpcError::new(format!(
                "request {} to '{}' timed out after {}s",
                method,
                self.url,
                self.timeout.as_secs()
            ))),
        }
    }
}
