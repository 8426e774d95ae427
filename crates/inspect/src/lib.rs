//! Detailed inspection of Rootstock transactions.
//!
//! Given a transaction hash and a network, [`DecodePipeline::decode`] fetches the transaction, its
//! receipt, block timestamp and execution trace, normalizes them with a [`TraceNormalizer`],
//! and caches the resulting [`TransactionData`].
pub mod error;

mod core;
mod interfaces;
mod utils;

// re-export the public interface
pub use core::{inspect, DecodePipeline, InspectResult, TraceNormalizer, MAX_TRACE_DEPTH};
pub use interfaces::{
    CallTrace, CallType, DecodedStateChange, InspectArgs, InspectArgsBuilder, StateChange,
    TransactionData, TransactionStatus,
};
pub use txlens_decoder::{DecodedEvent, Event, EventParam};
pub use utils::format::{format_gas_price, format_gas_used, format_timestamp, format_value, format_wei};
