//! Typed shapes of the node responses txlens consumes.
//!
//! Every payload returned by an [`RpcEndpoint`](super::provider::RpcEndpoint) is converted into
//! one of these types inside [`ChainClient`](super::rpc::ChainClient); nothing downstream ever
//! sees an untyped JSON value.

use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use serde::{de::Error as _, Deserialize, Serialize};
use serde_json::value::RawValue;

/// A transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The transaction hash.
    pub hash: B256,
    /// The block the transaction was mined in. `None` while pending.
    #[serde(default)]
    pub block_number: Option<U64>,
    /// The sender.
    pub from: Address,
    /// The recipient. `None` for contract creations.
    #[serde(default)]
    pub to: Option<Address>,
    /// Value transferred, in wei.
    #[serde(default)]
    pub value: U256,
    /// The gas price offered by the sender, in wei.
    #[serde(default)]
    pub gas_price: U256,
    /// The gas limit.
    #[serde(rename = "gas", default)]
    pub gas_limit: U256,
    /// Raw call data.
    #[serde(default)]
    pub input: Bytes,
}

impl Transaction {
    /// Whether the transaction has not been included in a block yet.
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// An event log emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// The emitting contract.
    pub address: Address,
    /// Indexed topics, `topics[0]` being the event's topic hash.
    #[serde(default)]
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed parameters.
    #[serde(default)]
    pub data: Bytes,
}

/// A transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// The hash of the transaction this receipt belongs to.
    pub transaction_hash: B256,
    /// The block the transaction was mined in.
    pub block_number: U64,
    /// The hash of that block.
    pub block_hash: B256,
    /// Position of the transaction within the block.
    pub transaction_index: U64,
    /// The sender.
    pub from: Address,
    /// The recipient. `None` for contract creations.
    #[serde(default)]
    pub to: Option<Address>,
    /// Gas consumed by this transaction.
    pub gas_used: U256,
    /// The gas price actually paid, in wei.
    #[serde(default)]
    pub effective_gas_price: U256,
    /// `1` on success, `0` on failure.
    #[serde(default)]
    pub status: U64,
    /// Logs in emission order.
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Whether the receipt reports successful execution.
    pub fn succeeded(&self) -> bool {
        self.status == U64::from(1)
    }
}

/// A single frame of a `callTracer` trace.
///
/// The tree shape mirrors the node's output exactly; depth is implied by nesting. Parse node
/// output with [`RawTraceCall::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTraceCall {
    /// The call kind as reported by the node, e.g. `CALL` or `CREATE2`.
    #[serde(rename = "type")]
    pub typ: String,
    /// The caller.
    #[serde(default)]
    pub from: Option<Address>,
    /// The callee. Absent for some failed creations.
    #[serde(default)]
    pub to: Option<Address>,
    /// Value transferred with the call, in wei.
    #[serde(default)]
    pub value: Option<U256>,
    /// Gas made available to the call.
    #[serde(default)]
    pub gas: Option<U256>,
    /// Gas consumed by the call.
    #[serde(default)]
    pub gas_used: Option<U256>,
    /// Call data.
    #[serde(default)]
    pub input: Option<Bytes>,
    /// Return data.
    #[serde(default)]
    pub output: Option<Bytes>,
    /// Set when this frame failed, e.g. `execution reverted`.
    #[serde(default)]
    pub error: Option<String>,
    /// Nested calls in execution order.
    #[serde(default)]
    pub calls: Vec<RawTraceCall>,
}

/// A trace frame whose nested calls are left unparsed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame<'a> {
    #[serde(rename = "type")]
    typ: String,
    #[serde(default)]
    from: Option<Address>,
    #[serde(default)]
    to: Option<Address>,
    #[serde(default)]
    value: Option<U256>,
    #[serde(default)]
    gas: Option<U256>,
    #[serde(default)]
    gas_used: Option<U256>,
    #[serde(default)]
    input: Option<Bytes>,
    #[serde(default)]
    output: Option<Bytes>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, borrow)]
    calls: Vec<&'a RawValue>,
}

impl RawTraceCall {
    /// Parses a `callTracer` result.
    ///
    /// Frames are parsed one at a time from an explicit stack, so the nesting depth of the
    /// trace is not bounded by the JSON parser's recursion limit.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut nodes: Vec<Option<RawTraceCall>> = Vec::new();
        let mut children: Vec<Vec<usize>> = Vec::new();
        let mut stack: Vec<(&str, Option<usize>)> = vec![(json, None)];

        while let Some((text, parent)) = stack.pop() {
            let frame: RawFrame<'_> = serde_json::from_str(text)?;
            let index = nodes.len();
            if let Some(parent) = parent {
                children[parent].push(index);
            }

            // reversed, so siblings are popped in execution order
            stack.extend(frame.calls.into_iter().rev().map(|call| (call.get(), Some(index))));
            nodes.push(Some(RawTraceCall {
                typ: frame.typ,
                from: frame.from,
                to: frame.to,
                value: frame.value,
                gas: frame.gas,
                gas_used: frame.gas_used,
                input: frame.input,
                output: frame.output,
                error: frame.error,
                calls: Vec::new(),
            }));
            children.push(Vec::new());
        }

        // children always come after their parent, so build the tree from the back
        for index in (0..nodes.len()).rev() {
            let calls = children[index].iter().filter_map(|&child| nodes[child].take()).collect();
            if let Some(node) = nodes[index].as_mut() {
                node.calls = calls;
            }
        }

        nodes
            .first_mut()
            .and_then(Option::take)
            .ok_or_else(|| serde_json::Error::custom("empty call trace"))
    }
}

/// Storage of a single account as reported by the `prestateTracer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStorage {
    /// Slot to value. Slots the tracer did not report are absent.
    #[serde(default)]
    pub storage: BTreeMap<B256, B256>,
}

/// The `prestateTracer` output in diff mode: storage before and after execution for every
/// account the transaction modified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiff {
    /// Account state before execution.
    #[serde(default)]
    pub pre: BTreeMap<Address, AccountStorage>,
    /// Account state after execution.
    #[serde(default)]
    pub post: BTreeMap<Address, AccountStorage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_deserializes_pending() {
        let tx: Transaction = serde_json::from_value(json!({
            "hash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": null,
            "from": "0x0000000000000000000000000000000000000001",
            "to": null,
            "value": "0x0",
            "gasPrice": "0x3b9aca00",
            "gas": "0x5208",
            "input": "0x"
        }))
        .expect("failed to deserialize transaction");

        assert!(tx.is_pending());
        assert!(tx.to.is_none());
        assert_eq!(tx.gas_limit, U256::from(21000));
    }

    #[test]
    fn test_receipt_status() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x10",
            "blockHash": format!("0x{}", "cd".repeat(32)),
            "transactionIndex": "0x0",
            "from": "0x0000000000000000000000000000000000000001",
            "to": "0x0000000000000000000000000000000000000002",
            "gasUsed": "0x39447",
            "effectiveGasPrice": "0x3938700",
            "status": "0x1",
            "logs": []
        }))
        .expect("failed to deserialize receipt");

        assert!(receipt.succeeded());
        assert_eq!(receipt.gas_used, U256::from(234567));
        assert_eq!(receipt.effective_gas_price, U256::from(60000000));
    }

    #[test]
    fn test_raw_trace_call_defaults_missing_fields() {
        let trace = RawTraceCall::from_json(
            &json!({
                "type": "STATICCALL",
                "from": "0x0000000000000000000000000000000000000001",
                "to": "0x0000000000000000000000000000000000000002",
                "gas": "0x100",
                "gasUsed": "0x10",
                "input": "0x70a08231"
            })
            .to_string(),
        )
        .expect("failed to deserialize trace");

        assert_eq!(trace.typ, "STATICCALL");
        assert!(trace.value.is_none());
        assert!(trace.calls.is_empty());
    }

    #[test]
    fn test_raw_trace_call_keeps_sibling_order() {
        let trace = RawTraceCall::from_json(
            &json!({
                "type": "CALL",
                "calls": [
                    { "type": "STATICCALL", "calls": [{ "type": "CREATE2" }] },
                    { "type": "DELEGATECALL", "error": "execution reverted" },
                    { "type": "CALL" }
                ]
            })
            .to_string(),
        )
        .expect("failed to deserialize trace");

        let types: Vec<&str> = trace.calls.iter().map(|call| call.typ.as_str()).collect();
        assert_eq!(types, ["STATICCALL", "DELEGATECALL", "CALL"]);
        assert_eq!(trace.calls[0].calls[0].typ, "CREATE2");
        assert_eq!(trace.calls[1].error.as_deref(), Some("execution reverted"));
    }

    #[test]
    fn test_raw_trace_call_parses_past_the_json_recursion_limit() {
        let depth = 600;
        let json = format!(
            "{}{}{}",
            r#"{"type":"CALL","calls":["#.repeat(depth),
            r#"{"type":"STATICCALL"}"#,
            "]}".repeat(depth)
        );

        let trace = RawTraceCall::from_json(&json).expect("failed to deserialize deep trace");

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
    fn test_raw_trace_call_rejects_malformed_frames() {
        assert!(RawTraceCall::from_json(r#"{"type":"CALL","calls":[{"from":"0x01"}]}"#).is_err());
    }
}
