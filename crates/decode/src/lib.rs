//! Decodes ABI-encoded function calls and event logs against a registry of known signatures.
//!
//! The [`SignatureRegistry`] is built once at startup, seeded with common ERC-20 and ERC-721
//! signatures, and shared by reference. Decoding never fails: unknown selectors and topics,
//! as well as known signatures whose arguments don't decode, degrade to a minimal result.
pub mod error;

mod core;
mod interfaces;
mod utils;

// re-export the public interface
pub use core::{signature::ResolvedSignature, SignatureRegistry};
pub use interfaces::{DecodedEvent, DecodedFunction, DecodedParam, Event, EventParam};
