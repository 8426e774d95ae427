//! Common utilities, constants, and resources used across the txlens codebase.
//!
//! This crate provides the chain-facing half of txlens: the typed models returned by a
//! node, the [`ether::provider::RpcEndpoint`] seam, and the [`ether::rpc::ChainClient`]
//! which applies the standard/archive fallback policy.

/// Constants used throughout the txlens codebase.
pub mod constants;

/// Errors raised while talking to a chain.
pub mod error;

/// Utilities for interacting with EVM chains, including typed models and RPC functionality.
pub mod ether;

/// General utility functions and types for common tasks.
pub mod utils;
