use serde::{Deserialize, Serialize};

/// Independent blockchain deployment context. All staker state is
/// partitioned per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Gnosis,
    Prater,
    Holesky,
    Lukso,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::Mainnet,
        Network::Gnosis,
        Network::Prater,
        Network::Holesky,
        Network::Lukso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Gnosis => "gnosis",
            Network::Prater => "prater",
            Network::Holesky => "holesky",
            Network::Lukso => "lukso",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "gnosis" => Ok(Network::Gnosis),
            "prater" => Ok(Network::Prater),
            "holesky" => Ok(Network::Holesky),
            "lukso" => Ok(Network::Lukso),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_network_round_trips_through_str() {
        for network in Network::ALL {
            assert_eq!(Network::from_str(network.as_str()), Ok(network));
        }
        assert!(Network::from_str("sepolia").is_err());
    }
}
