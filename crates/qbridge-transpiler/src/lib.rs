//! Conversion graph for quantum programs
//!
//! Representations (`OpenQASM` 2 text, `OpenQASM` 3 text, a parsed
//! [`qbridge_qasm3::Program`], or any type you register) are nodes of a
//! directed graph. Converters are weighted edges. Converting a program means
//! resolving the cheapest chain of converters within a hop bound, then
//! running it on a copy of the input.
//!
//! # Example: Built-in conversions
//!
//! ```rust
//! use qbridge_transpiler::{Qasm2, Transpiler, QASM2, QASM3_PROGRAM};
//!
//! let transpiler = Transpiler::default();
//! let source = Qasm2::new("OPENQASM 2.0;\nqreg q[2];\nh q[0];\ncx q[0], q[1];\n");
//!
//! let path = transpiler.resolve_path(QASM2, QASM3_PROGRAM, 5).unwrap();
//! assert_eq!(path.to_string(), "qasm2 -> qasm3 -> qasm3_program");
//!
//! let out = transpiler.convert(&source, QASM2, QASM3_PROGRAM, 5).unwrap();
//! let program = out.downcast_ref::<qbridge_qasm3::Program>().unwrap();
//! assert_eq!(program.depth(), 2);
//! ```
//!
//! # Example: Custom graph
//!
//! ```rust
//! use std::sync::Arc;
//! use qbridge_transpiler::{CapabilitySet, FnConverter, GraphBuilder, Qasm3, Transpiler};
//!
//! let mut builder = GraphBuilder::new("Lab");
//! builder
//!     .register_representation("device", ["device_sdk"])?
//!     .register_converter(
//!         "qasm3",
//!         "device",
//!         FnConverter::typed("to_device", |p: Qasm3| Ok(p.as_str().len())),
//!         2.0,
//!         Vec::<String>::new(),
//!     )?;
//!
//! let caps = CapabilitySet::new().with("device_sdk");
//! let transpiler = Transpiler::new(Arc::new(builder.build()), caps, 4);
//! let out = transpiler.convert_with_default_depth(&Qasm3::new("qubit q;"), "qasm3", "device")?;
//! assert_eq!(out.downcast_ref::<usize>(), Some(&8));
//! # Ok::<(), qbridge_transpiler::TranspilerError>(())
//! ```

pub mod builtin;
mod capability;
pub mod config;
mod converter;
mod engine;
mod error;
mod executor;
mod graph;
pub mod logging;
mod program;
mod registry;
mod resolver;

pub use builtin::{
    LegacyConversionError, QASM2, QASM3, QASM3_PROGRAM, default_graph, qasm2_to_qasm3,
    qasm3_to_qasm2, register_builtins,
};
pub use capability::{AllCapabilities, CapabilityProvider, CapabilitySet};
pub use config::{ConfigError, LoggingConfig, TranspilerConfig};
pub use converter::{Converter, ConverterError, FnConverter, ProgramTypeMismatch};
pub use engine::Transpiler;
pub use error::{TranspilerError, TranspilerResult};
pub use executor::ConversionExecutor;
pub use graph::{ConversionEdge, ConversionGraph, GraphBuilder};
pub use logging::{init_tracing, init_tracing_from_config};
pub use program::{Qasm2, Qasm3, QuantumProgram};
pub use registry::{RepresentationNode, RepresentationRegistry};
pub use resolver::ConversionPath;
