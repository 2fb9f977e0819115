use serde::{Deserialize, Serialize};

/// What to do when more than one transaction in a block owns an output with
/// the resolved public key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerPolicy {
    /// Take the first owner in scan order: reward transaction, then regular
    /// transactions in block order.
    #[default]
    FirstMatch,
    /// Scan the whole block and fail if a second transaction also matches.
    RejectAmbiguous,
}

/// Tracer settings. Passed explicitly; the tracer reads no global state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Also trace the block-reward transaction when selecting a whole block.
    pub include_coinbase: bool,
    pub owner_policy: OwnerPolicy,
    /// Fail a trace that would need more than this many steps.
    pub max_depth: Option<u64>,
    /// Trace independent starting transactions on the rayon pool.
    pub parallel: bool,
}
