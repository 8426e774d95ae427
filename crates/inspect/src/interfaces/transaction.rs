use serde::{Deserialize, Serialize};
use txlens_decoder::Event;

/// Normalized call kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallType {
    /// A regular message call.
    Call,
    /// A call executing the callee's code in the caller's context.
    DelegateCall,
    /// A read-only call.
    StaticCall,
    /// A contract creation, including `CREATE2`.
    Create,
    /// A reverted frame or a self-destruct.
    Revert,
}

impl CallType {
    /// Maps a node-reported call type. `CREATE2` is a [`CallType::Create`], `SELFDESTRUCT` a
    /// [`CallType::Revert`], and anything unrecognised a [`CallType::Call`].
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "DELEGATECALL" => Self::DelegateCall,
            "STATICCALL" => Self::StaticCall,
            "CREATE" | "CREATE2" => Self::Create,
            "REVERT" | "SELFDESTRUCT" => Self::Revert,
            _ => Self::Call,
        }
    }
}

/// A normalized call frame. `depth` is 0 for the root and grows by one per nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTrace {
    /// The call kind.
    #[serde(rename = "type")]
    pub call_type: CallType,
    /// The caller, or `0x` if unknown.
    pub from: String,
    /// The callee, or `0x` if unknown.
    pub to: String,
    /// Value transferred, formatted in base units.
    pub value: String,
    /// Gas made available to the call, in base 10.
    pub gas: String,
    /// Gas consumed by the call, in base 10.
    pub gas_used: String,
    /// Call data as hex.
    pub input: String,
    /// Return data as hex.
    pub output: String,
    /// The decoded function name, or the raw selector if unknown.
    pub function_name: Option<String>,
    /// Whether this frame succeeded.
    pub success: bool,
    /// Nesting level.
    pub depth: usize,
    /// Nested calls in execution order.
    pub calls: Vec<CallTrace>,
}

/// Decoded meaning of a storage change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedStateChange {
    /// The state variable name.
    pub variable: String,
    /// The rendered value before execution.
    pub before_value: String,
    /// The rendered value after execution.
    pub after_value: String,
}

/// A storage slot whose value changed during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// The checksummed account address.
    pub address: String,
    /// The slot as 32-byte hex.
    pub slot: String,
    /// The word before execution.
    pub before: String,
    /// The word after execution.
    pub after: String,
    /// Present only when the contract's storage layout is known.
    pub decoded: Option<DecodedStateChange>,
}

/// Execution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Receipt status 1.
    Success,
    /// Any other receipt status.
    Failed,
}

/// The decoded transaction. Built once per network and hash, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// The transaction hash as lowercase hex.
    pub tx_hash: String,
    /// Execution outcome.
    pub status: TransactionStatus,
    /// The block number in base 10.
    pub block_number: String,
    /// The block timestamp, e.g. `2023-11-14 22:13:20 UTC`.
    pub timestamp: String,
    /// Gas used, with thousands separators.
    pub gas_used: String,
    /// Effective gas price in gwei with 2 decimals.
    pub gas_price: String,
    /// The checksummed sender.
    pub from: String,
    /// The checksummed recipient, empty for contract creations.
    pub to: String,
    /// Value transferred, formatted in base units.
    pub value: String,
    /// The root call frame.
    pub call_trace: CallTrace,
    /// Decoded logs in emission order.
    pub events: Vec<Event>,
    /// Storage changes.
    pub state_changes: Vec<StateChange>,
}
