use std::collections::BTreeSet;
use std::fmt;

use crate::constants::{DEFAULT_FORKED_NETWORKS, DEFAULT_LOCAL_NETWORKS};

/// Bucket an active network falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkClass {
    /// Local development chain, mocks are deployed on demand
    LocalDev,
    /// Local fork of a live network, real contract addresses apply
    ForkedLocal,
    /// Anything else
    Live,
}

impl NetworkClass {
    /// Whether the network runs on this machine with unlocked dev accounts
    pub fn is_local(&self) -> bool {
        matches!(self, NetworkClass::LocalDev | NetworkClass::ForkedLocal)
    }
}

impl fmt::Display for NetworkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkClass::LocalDev => write!(f, "local"),
            NetworkClass::ForkedLocal => write!(f, "forked"),
            NetworkClass::Live => write!(f, "live"),
        }
    }
}

/// Membership test of network names against the local and forked sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkClassifier {
    local: BTreeSet<String>,
    forked: BTreeSet<String>,
}

impl NetworkClassifier {
    pub fn new<L, F>(local: L, forked: F) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            local: local.into_iter().map(Into::into).collect(),
            forked: forked.into_iter().map(Into::into).collect(),
        }
    }

    /// A name listed in both sets is treated as local.
    pub fn classify(&self, network: &str) -> NetworkClass {
        if self.local.contains(network) {
            NetworkClass::LocalDev
        } else if self.forked.contains(network) {
            NetworkClass::ForkedLocal
        } else {
            NetworkClass::Live
        }
    }

    pub fn local_networks(&self) -> impl Iterator<Item = &str> {
        self.local.iter().map(String::as_str)
    }

    pub fn forked_networks(&self) -> impl Iterator<Item = &str> {
        self.forked.iter().map(String::as_str)
    }
}

impl Default for NetworkClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_NETWORKS, DEFAULT_FORKED_NETWORKS)
    }
}
