//! Chain/network support validator

use crate::config::SupportedConfig;
use std::collections::HashSet;

/// Pure predicate over (chain, network) pairs.
///
/// Both checks are conjunctive, and absence of support is expressed as
/// `false`, never as an error. The supported sets are injected from
/// configuration; the check path never hardcodes chain names.
#[derive(Debug, Clone)]
pub struct ChainValidator {
    chains: HashSet<String>,
    networks: HashSet<String>,
}

impl ChainValidator {
    /// Build a validator from explicit supported sets
    pub fn new<I, J>(chains: I, networks: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            chains: chains.into_iter().collect(),
            networks: networks.into_iter().collect(),
        }
    }

    /// Build a validator from the configured supported sets
    pub fn from_config(supported: &SupportedConfig) -> Self {
        Self::new(supported.chains.clone(), supported.networks.clone())
    }

    /// Returns true iff both the chain and the network are supported
    pub fn is_supported(&self, chain: &str, network: &str) -> bool {
        self.chains.contains(chain) && self.networks.contains(network)
    }
}

impl Default for ChainValidator {
    fn default() -> Self {
        Self::from_config(&SupportedConfig::default())
    }
}
