//! Ordered endpoint fallback plans.
//!
//! Each chain operation is described by a [`FallbackPlan`]: the endpoints to try in order, and
//! for each one how a request error is treated. A `null` result from a node is never an error;
//! it always moves on to the next strategy, and an exhausted plan is a miss.

use super::provider::RpcError;

/// Which endpoint of a network a strategy queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    /// The regular node.
    Standard,
    /// The archive node.
    Archive,
}

/// What to do after an endpoint returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallthrough {
    /// Try the next strategy. If none is left, the operation is a miss.
    Next,
    /// Stop and report a miss.
    Miss,
    /// Stop and raise the error.
    Abort,
}

/// One step of a fallback plan.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    /// The endpoint to query.
    pub role: EndpointRole,
    /// Classifies a request error into a [`Fallthrough`].
    pub on_error: fn(&RpcError) -> Fallthrough,
}

/// The ordered strategies of an operation, and the context its raised errors carry.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPlan {
    /// Prefix of raised errors, e.g. `Failed to fetch transaction`.
    pub context: &'static str,
    /// Strategies in the order they are attempted.
    pub strategies: &'static [Strategy],
}

fn next_if_not_found(e: &RpcError) -> Fallthrough {
    if e.is_not_found() {
        Fallthrough::Next
    } else {
        Fallthrough::Abort
    }
}

fn miss_if_not_found(e: &RpcError) -> Fallthrough {
    if e.is_not_found() {
        Fallthrough::Miss
    } else {
        Fallthrough::Abort
    }
}

fn miss_if_unavailable(e: &RpcError) -> Fallthrough {
    if e.is_method_unavailable() {
        Fallthrough::Miss
    } else {
        Fallthrough::Abort
    }
}

fn always_next(_: &RpcError) -> Fallthrough {
    Fallthrough::Next
}

fn always_miss(_: &RpcError) -> Fallthrough {
    Fallthrough::Miss
}

/// Standard node first, then the archive node for older transactions.
pub const TRANSACTION: FallbackPlan = FallbackPlan {
    context: "Failed to fetch transaction",
    strategies: &[
        Strategy { role: EndpointRole::Standard, on_error: next_if_not_found },
        Strategy { role: EndpointRole::Archive, on_error: miss_if_not_found },
    ],
};

/// Like [`TRANSACTION`], but any archive failure is a plain miss.
pub const RECEIPT: FallbackPlan = FallbackPlan {
    context: "Failed to fetch transaction receipt",
    strategies: &[
        Strategy { role: EndpointRole::Standard, on_error: next_if_not_found },
        Strategy { role: EndpointRole::Archive, on_error: always_miss },
    ],
};

/// Archive node first since tracing needs historical state. A node without debug methods is a
/// miss, which callers answer with a synthetic trace.
pub const TRACE: FallbackPlan = FallbackPlan {
    context: "Failed to trace transaction",
    strategies: &[
        Strategy { role: EndpointRole::Archive, on_error: always_next },
        Strategy { role: EndpointRole::Standard, on_error: miss_if_unavailable },
    ],
};

/// Same endpoints and error classes as [`TRACE`].
pub const STATE_DIFF: FallbackPlan =
    FallbackPlan { context: "Failed to trace state diff", strategies: TRACE.strategies };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_plan_classification() {
        let not_found = RpcError::new("transaction not found");
        let refused = RpcError::new("connection refused");

        let [standard, archive] = TRANSACTION.strategies else { panic!("expected two strategies") };
        assert_eq!(standard.role, EndpointRole::Standard);
        assert_eq!((standard.on_error)(&not_found), Fallthrough::Next);
        assert_eq!((standard.on_error)(&refused), Fallthrough::Abort);
        assert_eq!(archive.role, EndpointRole::Archive);
        assert_eq!((archive.on_error)(&not_found), Fallthrough::Miss);
        assert_eq!((archive.on_error)(&refused), Fallthrough::Abort);
    }

    #[test]
    fn test_receipt_plan_swallows_archive_errors() {
        let refused = RpcError::new("connection refused");
        let archive = RECEIPT.strategies[1];
        assert_eq!((archive.on_error)(&refused), Fallthrough::Miss);
    }

    #[test]
    fn test_trace_plan_classification() {
        let unavailable = RpcError::new("the method debug_traceTransaction does not exist");
        let timeout = RpcError::new("execution timeout");

        let [archive, standard] = TRACE.strategies else { panic!("expected two strategies") };
        assert_eq!(archive.role, EndpointRole::Archive);
        assert_eq!((archive.on_error)(&timeout), Fallthrough::Next);
        assert_eq!((standard.on_error)(&unavailable), Fallthrough::Miss);
        assert_eq!((standard.on_error)(&timeout), Fallthrough::Abort);
    }
}
