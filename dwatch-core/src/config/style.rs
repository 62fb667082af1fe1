use std::collections::HashMap;

/// Friendly names for contract addresses that show up as call destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownContracts(HashMap<String, String>);

impl KnownContracts {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self(names)
    }

    /// The friendly name for `address`, or the address itself.
    pub fn display_name<'a>(&'a self, address: &'a str) -> &'a str {
        self.0.get(address).map(String::as_str).unwrap_or(address)
    }

    pub fn insert(&mut self, address: impl Into<String>, name: impl Into<String>) {
        self.0.insert(address.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Names and links baked into notification text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationStyle {
    pub dao_name: String,
    pub token_symbol: String,
    pub governance_url: String,
    pub known_contracts: KnownContracts,
}

impl Default for NotificationStyle {
    fn default() -> Self {
        let mut known_contracts = KnownContracts::default();
        known_contracts.insert("KT1E3aVbNwX5AwpSQ151dp3Qg4Wf9mGEs3ex", "The Kolibri DAO");

        Self {
            dao_name: "Kolibri DAO".to_string(),
            token_symbol: "kDAO".to_string(),
            governance_url: "https://governance.kolibri.finance".to_string(),
            known_contracts,
        }
    }
}
