//! Capability gate consulted before each conversion step.
//!
//! Representations and converter edges name the optional capabilities they
//! need (an SDK being installed, a feature being enabled). Whether a
//! capability is present is decided outside the engine by a
//! [`CapabilityProvider`].

use rustc_hash::FxHashSet;

/// Answers whether a named capability is available.
pub trait CapabilityProvider: Send + Sync {
    /// Check whether `capability` is available.
    fn is_available(&self, capability: &str) -> bool;
}

/// A fixed set of available capabilities.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    names: FxHashSet<String>,
}

impl CapabilitySet {
    /// Create an empty set (nothing optional is available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a capability as available.
    pub fn insert(&mut self, capability: impl Into<String>) {
        self.names.insert(capability.into());
    }

    /// Builder-style [`CapabilitySet::insert`].
    #[must_use]
    pub fn with(mut self, capability: impl Into<String>) -> Self {
        self.insert(capability);
        self
    }

    /// Number of available capabilities.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if no capability is available.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl CapabilityProvider for CapabilitySet {
    fn is_available(&self, capability: &str) -> bool {
        self.names.contains(capability)
    }
}

/// Reports every capability as available.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllCapabilities;

impl CapabilityProvider for AllCapabilities {
    fn is_available(&self, _capability: &str) -> bool {
        true
    }
}
