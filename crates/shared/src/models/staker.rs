use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Functional slot filled by exactly one package implementation at a time
/// per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StakerRole {
    Execution,
    Consensus,
    MevBoost,
}

impl StakerRole {
    pub const ALL: [StakerRole; 3] = [
        StakerRole::Execution,
        StakerRole::Consensus,
        StakerRole::MevBoost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StakerRole::Execution => "execution",
            StakerRole::Consensus => "consensus",
            StakerRole::MevBoost => "mev-boost",
        }
    }
}

impl std::fmt::Display for StakerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role-specific parameters for a switch, passed as a variant payload into
/// the generic orchestrator operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum StakerParams {
    Execution,
    Consensus {
        graffiti: Option<String>,
        fee_recipient: Option<String>,
        checkpoint_sync_url: Option<String>,
    },
    MevBoost {
        relays: Vec<String>,
    },
}

/// Per-service network attachment inside a compose override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkAttachment {
    pub aliases: Vec<String>,
}

/// Docker network section of a compose override: the networks declared at
/// the compose root plus each service's attachments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub root_networks: Vec<String>,
    pub service_networks: BTreeMap<String, BTreeMap<String, NetworkAttachment>>,
}

/// Compose-override payload handed to the compose editor. Computed fresh on
/// every switch, never persisted directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// service name -> variable name -> value
    #[serde(default)]
    pub environment: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub networks: NetworkSettings,
}

/// Read model describing one candidate implementation for a role/network.
/// Presentation only; produced by the state reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakerItem {
    pub dnp_name: String,
    pub is_installed: bool,
    pub is_running: bool,
    pub is_selected: bool,
    /// Installed version satisfies the registry's minimum.
    pub is_updated: bool,
    /// MEV-boost only: relays read from the live compose override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relays: Option<Vec<String>>,
}

/// Reconciled pair of runtime observation and persisted intent. Recomputed
/// on every read; the underlying state can change out-of-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedStatus {
    pub running: Option<String>,
    pub selected: bool,
}
