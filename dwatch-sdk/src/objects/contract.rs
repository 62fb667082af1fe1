use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contract on a named Tezos network, written `<network>/<address>`,
/// e.g. `mainnet/KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractId {
    pub network: String,
    pub address: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid contract id {0:?}, expected <network>/<address>")]
pub struct InvalidContractId(pub String);

impl FromStr for ContractId {
    type Err = InvalidContractId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((network, address)) = s.split_once('/') else {
            return Err(InvalidContractId(s.to_string()));
        };
        if network.is_empty() || address.is_empty() || address.contains('/') {
            return Err(InvalidContractId(s.to_string()));
        }
        Ok(Self {
            network: network.to_string(),
            address: address.to_string(),
        })
    }
}

impl TryFrom<String> for ContractId {
    type Error = InvalidContractId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContractId> for String {
    fn from(value: ContractId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.address)
    }
}
