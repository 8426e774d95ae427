pub mod network;
pub mod provider;
pub mod rpc;
pub mod strategy;
pub mod types;
