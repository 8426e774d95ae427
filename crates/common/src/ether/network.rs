use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The chain a transaction lives on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Rootstock mainnet.
    #[default]
    Mainnet,
    /// Rootstock testnet.
    Testnet,
}

impl Network {
    /// The lower-case name used in cache keys and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network '{other}', expected 'mainnet' or 'testnet'")),
        }
    }
}
