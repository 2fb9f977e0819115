//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which ledger a data directory belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    #[default]
    Mainnet,
    /// The public test network.
    Testnet,
    /// The staging network.
    Stagenet,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Stagenet => "stagenet",
        }
    }

    /// Sub-directory of the data directory holding this network's ledger.
    /// Mainnet lives directly in the data directory.
    pub fn data_subdir(&self) -> Option<&'static str> {
        match self {
            Self::Mainnet => None,
            Self::Testnet => Some("testnet"),
            Self::Stagenet => Some("stagenet"),
        }
    }
}
