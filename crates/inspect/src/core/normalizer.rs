use std::{collections::BTreeSet, sync::Arc};

use alloy::primitives::{Address, Bytes, B256};
use hashbrown::HashSet;
use tracing::{debug, trace, warn};
use txlens_common::{
    ether::types::{Log, RawTraceCall, StateDiff},
    utils::hex::ToLowerHex,
};
use txlens_decoder::{Event, SignatureRegistry};

use crate::{
    interfaces::{CallTrace, CallType, StateChange},
    utils::format::format_wei,
};

/// The deepest call frame kept, matching the EVM's call depth limit. Deeper frames are dropped.
pub const MAX_TRACE_DEPTH: usize = 1024;

/// Converts raw node traces and logs into normalized, decoded structures.
#[derive(Debug, Clone)]
pub struct TraceNormalizer {
    registry: Arc<SignatureRegistry>,
}

impl TraceNormalizer {
    /// Creates a normalizer decoding against `registry`.
    pub fn new(registry: Arc<SignatureRegistry>) -> Self {
        Self { registry }
    }

    /// The registry used for decoding.
    pub fn registry(&self) -> &Arc<SignatureRegistry> {
        &self.registry
    }

    /// Normalizes a raw trace into a [`CallTrace`] tree of the same shape, rooted at depth 0.
    ///
    /// `receipt_status` decides the success of frames without their own error; without it
    /// such frames are successful. The tree is built without recursion.
    pub fn parse_call_trace(&self, raw: &RawTraceCall, receipt_status: Option<u64>) -> CallTrace {
        let mut root = self.normalize_frame(raw, 0, receipt_status);

        // pre-order walk; a frame's position is its path of child indices from the root. by the
        // time a frame is visited, its parent and all of its earlier siblings are in place, so
        // pushing onto the parent's calls puts it at the index its path says.
        let mut stack: Vec<(Vec<usize>, &RawTraceCall)> =
            raw.calls.iter().enumerate().rev().map(|(i, call)| (vec![i], call)).collect();

        'frames: while let Some((trace_address, frame)) = stack.pop() {
            let depth = trace_address.len();
            if depth > MAX_TRACE_DEPTH {
                warn!("dropping call frame {:?} beyond depth {}", trace_address, MAX_TRACE_DEPTH);
                continue;
            }

            let mut parent = &mut root;
            for &index in &trace_address[..depth - 1] {
                parent = match parent.calls.get_mut(index) {
                    Some(child) => child,
                    None => {
                        warn!("invalid trace address {:?}", trace_address);
                        continue 'frames;
                    }
                };
            }
            parent.calls.push(self.normalize_frame(frame, depth, receipt_status));

            for (i, call) in frame.calls.iter().enumerate().rev() {
                let mut child_address = trace_address.clone();
                child_address.push(i);
                stack.push((child_address, call));
            }
        }

        root
    }

    /// Normalizes a single frame, without its children.
    fn normalize_frame(
        &self,
        raw: &RawTraceCall,
        depth: usize,
        receipt_status: Option<u64>,
    ) -> CallTrace {
        let success = match (&raw.error, receipt_status) {
            (Some(error), _) => {
                trace!("frame at depth {} failed: {}", depth, error);
                false
            }
            (None, Some(status)) => status == 1,
            (None, None) => true,
        };

        let input = raw.input.clone().unwrap_or_default();
        let function_name = if input.len() >= 4 {
            self.registry.decode_function(&input).map(|decoded| decoded.name)
        } else {
            None
        };

        CallTrace {
            call_type: CallType::from_raw(&raw.typ),
            from: raw.from.map(|a| a.to_checksum(None)).unwrap_or_else(|| "0x".to_string()),
            to: raw.to.map(|a| a.to_checksum(None)).unwrap_or_else(|| "0x".to_string()),
            value: format_wei(raw.value.unwrap_or_default()),
            gas: raw.gas.unwrap_or_default().to_string(),
            gas_used: raw.gas_used.unwrap_or_default().to_string(),
            input: input.to_lower_hex(),
            output: raw.output.as_ref().map(Bytes::to_lower_hex).unwrap_or_else(|| "0x".to_string()),
            function_name,
            success,
            depth,
            calls: Vec::new(),
        }
    }

    /// Decodes receipt logs in order. A log without topics is kept as an event named
    /// `Unknown`.
    pub fn parse_events(&self, logs: &[Log]) -> Vec<Event> {
        logs.iter()
            .map(|log| {
                self.registry.decode_event(log.address, &log.topics, &log.data).unwrap_or_else(|| {
                    Event {
                        name: "Unknown".to_string(),
                        address: log.address.to_checksum(None),
                        topics: Vec::new(),
                        data: log.data.to_lower_hex(),
                        decoded: None,
                    }
                })
            })
            .collect()
    }

    /// Derives storage changes from a `prestateTracer` diff.
    ///
    /// One change is emitted per slot whose value differs before and after execution, a side
    /// missing from the diff being the zero word. Accounts come in the order the trace first
    /// touches them, then any other diffed accounts in ascending order; slots are ascending.
    /// Without a diff there are no changes.
    pub fn parse_state_changes(
        &self,
        raw: &RawTraceCall,
        block_number: u64,
        diff: Option<&StateDiff>,
    ) -> Vec<StateChange> {
        let Some(diff) = diff else {
            debug!("no state diff for block {}, skipping state changes", block_number);
            return Vec::new();
        };

        let diffed: BTreeSet<Address> = diff.pre.keys().chain(diff.post.keys()).copied().collect();

        let mut ordered = touched_addresses(raw)
            .into_iter()
            .filter(|address| diffed.contains(address))
            .collect::<Vec<_>>();
        let seen: HashSet<Address> = ordered.iter().copied().collect();
        ordered.extend(diffed.iter().filter(|address| !seen.contains(*address)).copied());

        let mut changes = Vec::new();
        for address in ordered {
            let pre = diff.pre.get(&address).map(|account| &account.storage);
            let post = diff.post.get(&address).map(|account| &account.storage);

            let slots: BTreeSet<B256> = pre
                .into_iter()
                .flat_map(|storage| storage.keys())
                .chain(post.into_iter().flat_map(|storage| storage.keys()))
                .copied()
                .collect();

            for slot in slots {
                let before = pre.and_then(|storage| storage.get(&slot)).copied().unwrap_or_default();
                let after = post.and_then(|storage| storage.get(&slot)).copied().unwrap_or_default();
                if before == after {
                    continue;
                }

                changes.push(StateChange {
                    address: address.to_checksum(None),
                    slot: slot.to_lower_hex(),
                    before: before.to_lower_hex(),
                    after: after.to_lower_hex(),
                    decoded: None,
                });
            }
        }

        trace!("derived {} state changes at block {}", changes.len(), block_number);
        changes
    }
}

/// Addresses in the order a pre-order walk of the trace first meets them, callers before
/// callees.
fn touched_addresses(raw: &RawTraceCall) -> Vec<Address> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    let mut stack = vec![(0usize, raw)];

    while let Some((depth, frame)) = stack.pop() {
        if depth > MAX_TRACE_DEPTH {
            continue;
        }

        for address in [frame.from, frame.to].into_iter().flatten() {
            if seen.insert(address) {
                ordered.push(address);
            }
        }
        stack.extend(frame.calls.iter().rev().map(|call| (depth + 1, call)));
    }

    ordered
}
