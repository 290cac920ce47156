//! Registry of known representation identifiers.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{TranspilerError, TranspilerResult};

/// A representation and the capabilities needed to use it at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentationNode {
    /// Unique identifier (`"qasm3"`, `"qasm3_program"`, ...).
    pub id: String,
    /// Capability names required to use this representation.
    pub requires: BTreeSet<String>,
}

/// Tracks representation ids in registration order.
#[derive(Debug, Default)]
pub struct RepresentationRegistry {
    nodes: Vec<RepresentationNode>,
    index: FxHashMap<String, usize>,
}

impl RepresentationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a representation.
    ///
    /// Registering the same id again with the same requirements is a no-op;
    /// different requirements fail with `DuplicateRepresentation`.
    pub fn register<I, S>(&mut self, id: impl Into<String>, requires: I) -> TranspilerResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let requires: BTreeSet<String> = requires.into_iter().map(Into::into).collect();

        if let Some(&pos) = self.index.get(&id) {
            if self.nodes[pos].requires == requires {
                return Ok(());
            }
            return Err(TranspilerError::DuplicateRepresentation { id });
        }

        debug!("Registering representation: {} (requires {:?})", id, requires);
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(RepresentationNode { id, requires });
        Ok(())
    }

    /// Register `id` with no requirements unless it is already known.
    pub(crate) fn ensure(&mut self, id: &str) {
        if !self.index.contains_key(id) {
            debug!("Implicitly registering representation: {}", id);
            self.index.insert(id.to_string(), self.nodes.len());
            self.nodes.push(RepresentationNode {
                id: id.to_string(),
                requires: BTreeSet::new(),
            });
        }
    }

    /// Look up a representation by id.
    pub fn get(&self, id: &str) -> Option<&RepresentationNode> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Check if a representation is registered.
    pub fn has_representation(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.nodes.iter().map(|n| n.id.clone()).collect();
        ids.sort();
        ids
    }

    /// Registered nodes in registration order.
    pub fn nodes(&self) -> &[RepresentationNode] {
        &self.nodes
    }

    /// Get the number of registered representations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = RepresentationRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.ids().is_empty());
        assert!(!registry.has_representation("qasm3"));
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RepresentationRegistry::new();
        registry.register("qasm3", Vec::<String>::new()).unwrap();
        registry.register("cirq", ["cirq"]).unwrap();

        assert_eq!(registry.ids(), vec!["cirq", "qasm3"]);
        assert_eq!(registry.nodes()[0].id, "qasm3");
        assert!(registry.get("cirq").unwrap().requires.contains("cirq"));
    }

    #[test]
    fn test_reregister_same_requirements_is_noop() {
        let mut registry = RepresentationRegistry::new();
        registry.register("cirq", ["cirq"]).unwrap();
        registry.register("cirq", ["cirq"]).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregister_different_requirements_fails() {
        let mut registry = RepresentationRegistry::new();
        registry.register("cirq", ["cirq"]).unwrap();
        let err = registry.register("cirq", ["cirq", "numpy"]).unwrap_err();
        assert!(matches!(err, TranspilerError::DuplicateRepresentation { id } if id == "cirq"));
    }

    #[test]
    fn test_ensure_keeps_existing_requirements() {
        let mut registry = RepresentationRegistry::new();
        registry.register("braket", ["braket"]).unwrap();
        registry.ensure("braket");
        registry.ensure("qasm2");
        assert_eq!(registry.len(), 2);
        assert!(!registry.get("braket").unwrap().requires.is_empty());
        assert!(registry.get("qasm2").unwrap().requires.is_empty());
    }
}
