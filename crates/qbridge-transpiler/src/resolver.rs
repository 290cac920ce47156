//! Depth-bounded cheapest-path search over the conversion graph.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::error::{TranspilerError, TranspilerResult};
use crate::graph::{ConversionEdge, ConversionGraph};

/// An ordered chain of converter edges. Empty for the identity conversion.
#[derive(Debug, Clone, Default)]
pub struct ConversionPath {
    edges: Vec<Arc<ConversionEdge>>,
}

impl ConversionPath {
    /// The edges in application order.
    pub fn edges(&self) -> &[Arc<ConversionEdge>] {
        &self.edges
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether this is the identity conversion.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of edge weights.
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Representation ids visited, source first. Empty for the identity path.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.edges.iter().map(|e| e.source.as_str()).collect();
        if let Some(last) = self.edges.last() {
            ids.push(&last.target);
        }
        ids
    }
}

impl fmt::Display for ConversionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(identity)");
        }
        f.write_str(&self.node_ids().join(" -> "))
    }
}

/// Best way found so far to reach a node in a fixed number of hops.
#[derive(Clone)]
struct Label {
    weight: f64,
    /// Edge indices, which equal registration order.
    edges: Vec<usize>,
}

impl Label {
    /// Lower weight wins; equal weights fall back to the lexicographically
    /// smaller sequence of registration indices.
    fn cmp_same_hops(&self, other: &Label) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.edges.cmp(&other.edges))
    }
}

impl ConversionGraph {
    /// Find the cheapest chain of at most `max_depth` converters from
    /// `source` to `target`.
    ///
    /// Among paths of equal total weight the one with fewer hops wins, then
    /// the one whose edges were registered first. Identical ids resolve to
    /// the empty path for any bound.
    #[instrument(skip(self))]
    pub fn resolve_path(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
    ) -> TranspilerResult<ConversionPath> {
        let from = self.node_index(source)?;
        let to = self.node_index(target)?;

        if from == to {
            return Ok(ConversionPath::default());
        }

        // Layer h holds, per node, the best label among walks of exactly h
        // edges. With non-negative weights the overall optimum is a simple
        // path: dropping a cycle never adds weight and always removes hops.
        // A simple path has fewer edges than the graph has nodes.
        let hop_limit = max_depth.min(self.graph.node_count().saturating_sub(1));
        let mut layer: FxHashMap<NodeIndex, Label> = FxHashMap::default();
        layer.insert(
            from,
            Label {
                weight: 0.0,
                edges: Vec::new(),
            },
        );
        let mut best: Option<Label> = None;

        for hop in 1..=hop_limit {
            let mut next: FxHashMap<NodeIndex, Label> = FxHashMap::default();
            for (&node, label) in &layer {
                for edge in self.graph.edges(node) {
                    let mut edges = label.edges.clone();
                    edges.push(edge.id().index());
                    let candidate = Label {
                        weight: label.weight + edge.weight().weight,
                        edges,
                    };
                    next.entry(edge.target())
                        .and_modify(|current| {
                            if candidate.cmp_same_hops(current).is_lt() {
                                *current = candidate.clone();
                            }
                        })
                        .or_insert_with(|| candidate.clone());
                }
            }

            if let Some(reached) = next.get(&to) {
                let improves = best
                    .as_ref()
                    .is_none_or(|b| reached.weight.total_cmp(&b.weight).is_lt());
                if improves {
                    debug!("Reached {} in {} hops (weight {})", target, hop, reached.weight);
                    best = Some(reached.clone());
                }
            }

            if next.is_empty() {
                break;
            }
            layer = next;
        }

        let best = best.ok_or_else(|| TranspilerError::ConversionPathNotFound {
            source_id: source.to_string(),
            target_id: target.to_string(),
            max_depth,
        })?;

        let edges = best
            .edges
            .iter()
            .filter_map(|&i| {
                self.graph
                    .edge_weight(petgraph::graph::EdgeIndex::new(i))
                    .cloned()
            })
            .collect();
        let path = ConversionPath { edges };
        debug!("Resolved path {} (weight {})", path, path.total_weight());
        Ok(path)
    }
}
