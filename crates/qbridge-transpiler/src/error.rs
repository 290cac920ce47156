//! Error types for the transpiler crate.

use qbridge_qasm3::{MappingValidationError, ParseError};
use thiserror::Error;

/// Errors that can occur while building a conversion graph, resolving a path
/// or executing a conversion.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranspilerError {
    /// A representation id the graph does not know.
    #[error("{graph} conversion graph does not contain node '{id}'. Supported nodes are: {known:?}")]
    NodeNotFound {
        graph: String,
        id: String,
        known: Vec<String>,
    },

    /// Both ids are known but no path fits within the hop bound.
    #[error("No conversion path found from '{source_id}' to '{target_id}' with depth <= {max_depth}")]
    ConversionPathNotFound {
        source_id: String,
        target_id: String,
        max_depth: usize,
    },

    /// A capability required by an edge or its target is unavailable.
    #[error(
        "Conversion from '{source_id}' to '{target_id}' requires capability '{capability}', which is not available"
    )]
    MissingCapability {
        source_id: String,
        target_id: String,
        capability: String,
    },

    /// A converter failed.
    #[error("Error converting '{source_id}' to '{target_id}': {cause}")]
    CircuitConversion {
        source_id: String,
        target_id: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Program text failed to parse.
    #[error("Program parse error: {0}")]
    ProgramParse(#[from] ParseError),

    /// Qubit mapping failed validation.
    #[error("Invalid qubit mapping: {0}")]
    MappingValidation(#[from] MappingValidationError),

    /// A representation was registered twice with different requirements.
    #[error("Representation '{id}' is already registered with different capability requirements")]
    DuplicateRepresentation { id: String },

    /// A converter from a representation to itself.
    #[error("Converter from '{id}' to itself is not allowed")]
    SelfLoop { id: String },

    /// Edge weights must be finite and non-negative.
    #[error("Converter weight {weight} from '{source_id}' to '{target_id}' must be finite and non-negative")]
    InvalidWeight {
        source_id: String,
        target_id: String,
        weight: f64,
    },
}

/// Result type for transpiler operations.
pub type TranspilerResult<T> = Result<T, TranspilerError>;
