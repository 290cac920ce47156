//! Conversion graph: representations as nodes, converters as weighted edges.
//!
//! A [`GraphBuilder`] collects registrations and freezes them into a
//! [`ConversionGraph`]. The frozen graph has no mutation API and is shared
//! read-only between concurrent resolutions.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::converter::Converter;
use crate::error::{TranspilerError, TranspilerResult};
use crate::registry::{RepresentationNode, RepresentationRegistry};

/// A converter edge between two representations.
pub struct ConversionEdge {
    /// Source representation id.
    pub source: String,
    /// Target representation id.
    pub target: String,
    /// The converter applied along this edge.
    pub converter: Arc<dyn Converter>,
    /// Non-negative cost; cheaper chains are preferred.
    pub weight: f64,
    /// Capabilities the converter needs.
    pub requires: BTreeSet<String>,
    /// Position in registration order, used to break weight ties.
    pub order: usize,
}

impl fmt::Debug for ConversionEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEdge")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("converter", &self.converter.name())
            .field("weight", &self.weight)
            .field("requires", &self.requires)
            .field("order", &self.order)
            .finish()
    }
}

/// Collects representations and converters, then builds a frozen graph.
#[derive(Debug)]
pub struct GraphBuilder {
    name: String,
    registry: RepresentationRegistry,
    edges: Vec<ConversionEdge>,
}

impl GraphBuilder {
    /// Create a builder for a graph called `name` (used in error messages).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: RepresentationRegistry::new(),
            edges: Vec::new(),
        }
    }

    /// Register a representation and the capabilities it requires.
    pub fn register_representation<I, S>(
        &mut self,
        id: impl Into<String>,
        requires: I,
    ) -> TranspilerResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.register(id, requires)?;
        Ok(self)
    }

    /// Register a converter edge from `source` to `target`.
    ///
    /// Unknown endpoints are registered with no requirements. Several edges
    /// may connect the same pair; self loops and negative or non-finite
    /// weights are rejected.
    pub fn register_converter<I, S>(
        &mut self,
        source: &str,
        target: &str,
        converter: impl Converter + 'static,
        weight: f64,
        requires: I,
    ) -> TranspilerResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if source == target {
            return Err(TranspilerError::SelfLoop {
                id: source.to_string(),
            });
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(TranspilerError::InvalidWeight {
                source_id: source.to_string(),
                target_id: target.to_string(),
                weight,
            });
        }

        self.registry.ensure(source);
        self.registry.ensure(target);

        debug!(
            "Registering converter {}: {} -> {} (weight {})",
            converter.name(),
            source,
            target,
            weight
        );
        let order = self.edges.len();
        self.edges.push(ConversionEdge {
            source: source.to_string(),
            target: target.to_string(),
            converter: Arc::new(converter),
            weight,
            requires: requires.into_iter().map(Into::into).collect(),
            order,
        });
        Ok(self)
    }

    /// Freeze the registrations into a graph.
    pub fn build(self) -> ConversionGraph {
        let mut graph = DiGraph::with_capacity(self.registry.len(), self.edges.len());
        let mut index = FxHashMap::default();

        for node in self.registry.nodes() {
            let idx = graph.add_node(node.clone());
            index.insert(node.id.clone(), idx);
        }
        for edge in self.edges {
            let (Some(&from), Some(&to)) = (index.get(&edge.source), index.get(&edge.target))
            else {
                continue;
            };
            graph.add_edge(from, to, Arc::new(edge));
        }

        info!(
            "Built {} conversion graph with {} representations and {} converters",
            self.name,
            graph.node_count(),
            graph.edge_count()
        );

        ConversionGraph {
            name: self.name,
            graph,
            index,
        }
    }
}

/// Immutable directed graph of converters.
///
/// Edge indices follow registration order, which the resolver relies on for
/// deterministic tie-breaking.
pub struct ConversionGraph {
    name: String,
    pub(crate) graph: DiGraph<RepresentationNode, Arc<ConversionEdge>>,
    index: FxHashMap<String, NodeIndex>,
}

impl ConversionGraph {
    /// Name of the graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a representation is part of the graph.
    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a representation.
    pub fn node(&self, id: &str) -> Option<&RepresentationNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// All representation ids, sorted.
    pub fn node_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.index.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All edges in registration order.
    pub fn edges(&self) -> impl Iterator<Item = &Arc<ConversionEdge>> {
        self.graph.edge_weights()
    }

    /// Edges leaving `id`, in registration order.
    pub fn edges_from(&self, id: &str) -> Vec<&Arc<ConversionEdge>> {
        let mut out: Vec<_> = self
            .index
            .get(id)
            .map(|&idx| self.graph.edges(idx).map(|e| e.weight()).collect())
            .unwrap_or_default();
        out.sort_by_key(|e| e.order);
        out
    }

    /// Number of representations.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of converter edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node index for `id`, or `NodeNotFound` listing every known id.
    pub(crate) fn node_index(&self, id: &str) -> TranspilerResult<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TranspilerError::NodeNotFound {
                graph: self.name.clone(),
                id: id.to_string(),
                known: self.node_ids(),
            })
    }
}

impl fmt::Debug for ConversionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionGraph")
            .field("name", &self.name)
            .field("nodes", &self.node_ids())
            .field("edges", &self.edge_count())
            .finish()
    }
}
