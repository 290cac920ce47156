//! Applies a resolved path to a program.

use tracing::{debug, info, instrument};

use crate::capability::CapabilityProvider;
use crate::error::{TranspilerError, TranspilerResult};
use crate::graph::{ConversionEdge, ConversionGraph};
use crate::program::QuantumProgram;
use crate::resolver::ConversionPath;

/// Runs converter chains, enforcing capability requirements.
///
/// The caller's program is only ever borrowed: the chain starts from a
/// clone, so a failure at any step leaves the original untouched.
pub struct ConversionExecutor<'a> {
    graph: &'a ConversionGraph,
    capabilities: &'a dyn CapabilityProvider,
}

impl<'a> ConversionExecutor<'a> {
    /// Create an executor over `graph` gated by `capabilities`.
    pub fn new(graph: &'a ConversionGraph, capabilities: &'a dyn CapabilityProvider) -> Self {
        Self {
            graph,
            capabilities,
        }
    }

    /// Apply every edge of `path` in order.
    #[instrument(skip_all, fields(path = %path))]
    pub fn execute(
        &self,
        program: &dyn QuantumProgram,
        path: &ConversionPath,
    ) -> TranspilerResult<Box<dyn QuantumProgram>> {
        let mut current = program.clone_boxed();

        for edge in path.edges() {
            self.check_capabilities(edge)?;

            debug!(
                "Applying converter {}: {} -> {}",
                edge.converter.name(),
                edge.source,
                edge.target
            );
            current = edge
                .converter
                .convert(current)
                .map_err(|cause| TranspilerError::CircuitConversion {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    cause,
                })?;
        }

        info!("Conversion completed in {} steps", path.len());
        Ok(current)
    }

    /// The edge's own requirements, then those of the representation it produces.
    fn check_capabilities(&self, edge: &ConversionEdge) -> TranspilerResult<()> {
        let target_requires = self
            .graph
            .node(&edge.target)
            .map(|node| &node.requires)
            .into_iter()
            .flatten();

        for capability in edge.requires.iter().chain(target_requires) {
            if !self.capabilities.is_available(capability) {
                return Err(TranspilerError::MissingCapability {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    capability: capability.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::capability::{AllCapabilities, CapabilitySet};
    use crate::converter::FnConverter;
    use crate::graph::GraphBuilder;
    use crate::program::Qasm3;

    fn append(name: &'static str, suffix: &'static str) -> FnConverter {
        FnConverter::typed(name, move |p: Qasm3| Ok(Qasm3(p.0 + suffix)))
    }

    #[test]
    fn test_execute_chain() {
        let mut builder = GraphBuilder::new("Test");
        builder
            .register_converter("a", "b", append("ab", "b"), 1.0, Vec::<String>::new())
            .unwrap()
            .register_converter("b", "c", append("bc", "c"), 1.0, Vec::<String>::new())
            .unwrap();
        let graph = builder.build();
        let path = graph.resolve_path("a", "c", 2).unwrap();

        let input = Qasm3::new("a");
        let out = ConversionExecutor::new(&graph, &AllCapabilities)
            .execute(&input, &path)
            .unwrap();
        assert_eq!(out.downcast_ref::<Qasm3>().unwrap().as_str(), "abc");
        assert_eq!(input.as_str(), "a");
    }

    #[test]
    fn test_identity_path_returns_copy() {
        let graph = GraphBuilder::new("Test").build();
        let out = ConversionExecutor::new(&graph, &AllCapabilities)
            .execute(&Qasm3::new("x"), &ConversionPath::default())
            .unwrap();
        assert_eq!(out.downcast_ref::<Qasm3>().unwrap().as_str(), "x");
    }

    #[test]
    fn test_missing_capability_aborts_before_converter_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counting = FnConverter::new("counting", move |p| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(p)
        });

        let mut builder = GraphBuilder::new("Test");
        builder
            .register_converter("a", "b", counting, 1.0, ["braket"])
            .unwrap();
        let graph = builder.build();
        let path = graph.resolve_path("a", "b", 1).unwrap();

        let err = ConversionExecutor::new(&graph, &CapabilitySet::new())
            .execute(&Qasm3::new(""), &path)
            .unwrap_err();
        assert!(matches!(
            err,
            TranspilerError::MissingCapability { ref capability, .. } if capability == "braket"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let caps = CapabilitySet::new().with("braket");
        ConversionExecutor::new(&graph, &caps)
            .execute(&Qasm3::new(""), &path)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_target_representation_requirements_are_checked() {
        let mut builder = GraphBuilder::new("Test");
        builder
            .register_representation("cirq", ["cirq"])
            .unwrap()
            .register_converter("qasm3", "cirq", append("to_cirq", ""), 1.0, Vec::<String>::new())
            .unwrap();
        let graph = builder.build();
        let path = graph.resolve_path("qasm3", "cirq", 1).unwrap();

        let err = ConversionExecutor::new(&graph, &CapabilitySet::new())
            .execute(&Qasm3::new(""), &path)
            .unwrap_err();
        assert!(matches!(err, TranspilerError::MissingCapability { ref target_id, .. } if target_id == "cirq"));
    }

    #[test]
    fn test_failure_is_wrapped_and_input_untouched() {
        let mut builder = GraphBuilder::new("Test");
        builder
            .register_converter("a", "b", append("ab", "b"), 1.0, Vec::<String>::new())
            .unwrap()
            .register_converter("b", "c", FnConverter::new("fails", |_| Err("bad input".into())), 1.0, Vec::<String>::new())
            .unwrap();
        let graph = builder.build();
        let path = graph.resolve_path("a", "c", 2).unwrap();

        let input = Qasm3::new("a");
        let err = ConversionExecutor::new(&graph, &AllCapabilities)
            .execute(&input, &path)
            .unwrap_err();

        match err {
            TranspilerError::CircuitConversion {
                source_id,
                target_id,
                cause,
            } => {
                assert_eq!(source_id, "b");
                assert_eq!(target_id, "c");
                assert_eq!(cause.to_string(), "bad input");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(input, Qasm3::new("a"));
    }
}
