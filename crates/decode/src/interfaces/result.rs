use serde::{Deserialize, Serialize};

/// A single decoded parameter of a call or an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedParam {
    /// The declared parameter name, or `param{N}` (1-based) if the signature has none.
    pub name: String,
    /// The canonical ABI type, e.g. `uint256`.
    #[serde(rename = "type")]
    pub ty: String,
    /// The rendered value.
    pub value: String,
}

/// Event parameters share the shape of call parameters.
pub type EventParam = DecodedParam;

/// Result of decoding call data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFunction {
    /// The function name, or the raw selector if it isn't known.
    pub name: String,
    /// Decoded arguments. `None` for unknown selectors, functions without arguments, and
    /// arguments that failed to decode.
    pub params: Option<Vec<DecodedParam>>,
}

/// The decoded part of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// The event name.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<EventParam>,
}

/// An event log, decoded when its topic hash is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event name, or the topic hash (or `Unknown`) if it isn't known.
    pub name: String,
    /// The checksummed address of the emitting contract.
    pub address: String,
    /// The raw topics as lowercase hex.
    pub topics: Vec<String>,
    /// The raw data as lowercase hex.
    pub data: String,
    /// Present only for known events.
    pub decoded: Option<DecodedEvent>,
}
