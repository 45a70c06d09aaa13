use shared::models::network::Network;
use shared::models::staker::StakerRole;
use thiserror::Error;

/// Failure taxonomy of the orchestration engine. Every variant surfaces to
/// the immediate caller; only the reconciliation pass tolerates failures of
/// individual candidates.
#[derive(Debug, Error)]
pub enum StakerError {
    #[error("no compatible {role} implementation exists on {network}")]
    UnsupportedCombination { role: StakerRole, network: Network },

    #[error("{requested} is not a compatible implementation (expected {expected})")]
    CompatibilityMismatch { requested: String, expected: String },

    #[error("another switch for {role} on {network} is still in progress")]
    ConcurrentSwitch { role: StakerRole, network: Network },

    #[error("container runtime operation failed: {0}")]
    RuntimeOperation(#[source] anyhow::Error),

    #[error("selection flag persistence failed: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("compose override access failed: {0}")]
    Compose(#[source] anyhow::Error),
}
