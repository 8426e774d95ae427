pub(crate) mod signature;

use std::sync::{Arc, PoisonError, RwLock};

use alloy::primitives::{Address, Selector, B256};
use hashbrown::HashMap;
use tracing::{debug, trace, warn};
use txlens_common::utils::hex::ToLowerHex;

use crate::{
    error::Error,
    interfaces::{DecodedEvent, DecodedFunction, DecodedParam, Event},
    utils::{try_decode, try_decode_word, Render},
};
use signature::ResolvedSignature;

/// Well-known ERC-20 and ERC-721 functions.
const SEED_FUNCTIONS: [&str; 12] = [
    "transfer(address to, uint256 amount)",
    "approve(address spender, uint256 amount)",
    "transferFrom(address from, address to, uint256 amount)",
    "balanceOf(address account)",
    "allowance(address owner, address spender)",
    "totalSupply()",
    "name()",
    "symbol()",
    "decimals()",
    "safeTransferFrom(address from, address to, uint256 tokenId)",
    "ownerOf(uint256 tokenId)",
    "tokenURI(uint256 tokenId)",
];

/// Well-known ERC-20 and ERC-721 events.
const SEED_EVENTS: [&str; 3] = [
    "Transfer(address indexed from, address indexed to, uint256 value)",
    "Approval(address indexed owner, address indexed spender, uint256 value)",
    "ApprovalForAll(address indexed owner, address indexed operator, bool approved)",
];

/// Selector and topic-hash tables of known signatures.
///
/// Lookups clone an [`Arc`] out of a read lock, and registration swaps a fully built entry in
/// under the write lock, so concurrent readers never observe a partial entry.
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    functions: RwLock<HashMap<Selector, Arc<ResolvedSignature>>>,
    events: RwLock<HashMap<B256, Arc<ResolvedSignature>>>,
}

impl SignatureRegistry {
    /// Creates a registry seeded with common ERC-20 and ERC-721 signatures.
    pub fn new() -> Self {
        let registry = Self::empty();

        for signature in SEED_FUNCTIONS {
            if let Err(e) = registry.register_function(signature) {
                warn!("failed to seed function signature: {}", e);
            }
        }
        for signature in SEED_EVENTS {
            if let Err(e) = registry.register_event(signature) {
                warn!("failed to seed event signature: {}", e);
            }
        }

        registry
    }

    /// Creates a registry without any signatures.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers a function signature and returns its selector.
    ///
    /// ```
    /// use txlens_decoder::SignatureRegistry;
    ///
    /// let registry = SignatureRegistry::empty();
    /// let selector = registry.register_function("mint(address to, uint256 amount)").unwrap();
    /// assert_eq!(selector.to_string(), "0x40c10f19");
    /// ```
    pub fn register_function(&self, signature: &str) -> Result<Selector, Error> {
        let (selector, resolved) = ResolvedSignature::parse_function(signature)?;
        trace!("registering function {} as {}", resolved.signature, selector);

        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(selector, Arc::new(resolved));
        Ok(selector)
    }

    /// Registers an event signature and returns its topic hash.
    pub fn register_event(&self, signature: &str) -> Result<B256, Error> {
        let (topic, resolved) = ResolvedSignature::parse_event(signature)?;
        trace!("registering event {} as {}", resolved.signature, topic);

        self.events.write().unwrap_or_else(PoisonError::into_inner).insert(topic, Arc::new(resolved));
        Ok(topic)
    }

    /// Looks up a function by selector.
    pub fn function(&self, selector: &Selector) -> Option<Arc<ResolvedSignature>> {
        self.functions.read().unwrap_or_else(PoisonError::into_inner).get(selector).cloned()
    }

    /// Looks up an event by topic hash.
    pub fn event(&self, topic: &B256) -> Option<Arc<ResolvedSignature>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner).get(topic).cloned()
    }

    /// Decodes call data.
    ///
    /// Returns `None` if the input is shorter than a selector. Unknown selectors yield the
    /// selector as the name. A known function whose arguments fail to decode yields its name
    /// without params.
    pub fn decode_function(&self, input: &[u8]) -> Option<DecodedFunction> {
        if input.len() < 4 {
            return None;
        }

        let selector = Selector::from_slice(&input[..4]);
        let Some(function) = self.function(&selector) else {
            trace!("unknown selector {}", selector);
            return Some(DecodedFunction { name: selector.to_lower_hex(), params: None });
        };

        let args = &input[4..];
        if function.inputs.is_empty() || args.is_empty() {
            return Some(DecodedFunction { name: function.name.clone(), params: None });
        }

        match try_decode(&function.types(), args) {
            Ok(values) => {
                let params = function
                    .inputs
                    .iter()
                    .zip(values.iter())
                    .enumerate()
                    .map(|(i, (param, value))| DecodedParam {
                        name: param.display_name(i + 1),
                        ty: param.ty.clone(),
                        value: value.render(),
                    })
                    .collect();

                Some(DecodedFunction { name: function.name.clone(), params: Some(params) })
            }
            Err(e) => {
                warn!("failed to decode function parameters for {}: {}", function.name, e);
                Some(DecodedFunction { name: function.name.clone(), params: None })
            }
        }
    }

    /// Decodes an event log emitted by `address`.
    ///
    /// Returns `None` if there are no topics. An unknown `topics[0]` yields an event named
    /// after the topic hash with no decoded part. For known events, `topics[1..]` are assigned
    /// to the leading parameters one by one, and the remaining parameters are decoded
    /// together from `data`.
    pub fn decode_event(&self, address: Address, topics: &[B256], data: &[u8]) -> Option<Event> {
        let topic = topics.first()?;

        let mut event = Event {
            name: topic.to_lower_hex(),
            address: address.to_checksum(None),
            topics: topics.iter().map(ToLowerHex::to_lower_hex).collect(),
            data: alloy::primitives::Bytes::copy_from_slice(data).to_lower_hex(),
            decoded: None,
        };

        let Some(signature) = self.event(topic) else {
            trace!("unknown event topic {}", event.name);
            return Some(event);
        };

        let indexed_count = (topics.len() - 1).min(signature.inputs.len());
        let mut params = Vec::with_capacity(signature.inputs.len());

        for (i, (param, topic)) in signature.inputs.iter().zip(&topics[1..]).enumerate() {
            let value = match try_decode_word(&param.kind, topic.as_slice()) {
                Ok(value) => value.render(),
                Err(e) => {
                    debug!("failed to decode topic {} of {}: {}", i + 1, signature.name, e);
                    topic.to_lower_hex()
                }
            };
            params.push(DecodedParam { name: param.display_name(i + 1), ty: param.ty.clone(), value });
        }

        let remaining = &signature.inputs[indexed_count..];
        if !remaining.is_empty() {
            let types = remaining.iter().map(|param| param.kind.clone()).collect::<Vec<_>>();
            match try_decode(&types, data) {
                Ok(values) => {
                    for (offset, (param, value)) in remaining.iter().zip(values.iter()).enumerate() {
                        params.push(DecodedParam {
                            name: param.display_name(indexed_count + offset + 1),
                            ty: param.ty.clone(),
                            value: value.render(),
                        });
                    }
                }
                Err(e) => warn!("failed to decode event data for {}: {}", signature.name, e),
            }
        }

        event.name = signature.name.clone();
        event.decoded = Some(DecodedEvent { name: signature.name.clone(), params });
        Some(event)
    }
}
