//! High-level conversion entry point.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::builtin::default_graph;
use crate::capability::CapabilityProvider;
use crate::config::TranspilerConfig;
use crate::error::TranspilerResult;
use crate::executor::ConversionExecutor;
use crate::graph::ConversionGraph;
use crate::program::QuantumProgram;
use crate::resolver::ConversionPath;

/// Resolves and runs conversions against a frozen graph.
pub struct Transpiler {
    graph: Arc<ConversionGraph>,
    capabilities: Box<dyn CapabilityProvider>,
    default_max_depth: usize,
}

impl Transpiler {
    /// Create a transpiler over `graph`.
    pub fn new(
        graph: Arc<ConversionGraph>,
        capabilities: impl CapabilityProvider + 'static,
        default_max_depth: usize,
    ) -> Self {
        Self {
            graph,
            capabilities: Box::new(capabilities),
            default_max_depth,
        }
    }

    /// Use the default graph with the configured capabilities and depth.
    pub fn from_config(config: &TranspilerConfig) -> Self {
        Self::new(
            default_graph(),
            config.capability_set(),
            config.max_path_depth,
        )
    }

    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    pub fn default_max_depth(&self) -> usize {
        self.default_max_depth
    }

    /// Resolve the cheapest path without running it.
    pub fn resolve_path(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
    ) -> TranspilerResult<ConversionPath> {
        self.graph.resolve_path(source, target, max_depth)
    }

    /// Convert `program` from `source` to `target` in at most `max_depth` hops.
    #[instrument(skip(self, program))]
    pub fn convert(
        &self,
        program: &dyn QuantumProgram,
        source: &str,
        target: &str,
        max_depth: usize,
    ) -> TranspilerResult<Box<dyn QuantumProgram>> {
        let path = self.graph.resolve_path(source, target, max_depth)?;
        info!("Converting {} -> {} via {}", source, target, path);
        ConversionExecutor::new(&self.graph, self.capabilities.as_ref()).execute(program, &path)
    }

    /// [`Transpiler::convert`] bounded by the configured depth.
    pub fn convert_with_default_depth(
        &self,
        program: &dyn QuantumProgram,
        source: &str,
        target: &str,
    ) -> TranspilerResult<Box<dyn QuantumProgram>> {
        self.convert(program, source, target, self.default_max_depth)
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::from_config(&TranspilerConfig::default())
    }
}

impl fmt::Debug for Transpiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transpiler")
            .field("graph", &self.graph.name())
            .field("default_max_depth", &self.default_max_depth)
            .finish_non_exhaustive()
    }
}
