//! Error types for the QASM program model.

use thiserror::Error;

/// Errors that can occur while parsing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at line {line} (offset {position}): {message}")]
    LexerError {
        line: usize,
        position: usize,
        message: String,
    },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// Invalid version.
    #[error("Invalid OPENQASM version: {0}")]
    InvalidVersion(String),

    /// Reference to a register that was never declared.
    #[error("Undefined register: {0}")]
    UndefinedRegister(String),

    /// Duplicate declaration.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: u32,
        size: u32,
    },

    /// Integer literal too large for a register size or index.
    #[error("Integer literal {0} is out of range")]
    IntegerOverflow(u64),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A qubit mapping that is incomplete, non-bijective or out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MappingValidationError {
    /// A declared register has no entry in the mapping.
    #[error("Register '{register}' not present in the qubit mapping")]
    MissingRegister { register: String },

    /// The mapping names a register that is not declared.
    #[error("Register '{register}' in the qubit mapping is not declared")]
    UnknownRegister { register: String },

    /// An index of the register has no image.
    #[error("Index {index} of register '{register}' not present in the mapping")]
    MissingIndex { register: String, index: u32 },

    /// An old or new index lies outside `[0, size)`.
    #[error("Index {index} of register '{register}' is out of range for size {size}")]
    OutOfRange {
        register: String,
        index: u32,
        size: u32,
    },

    /// Two old indices map to the same new index.
    #[error("Index map of register '{register}' is not a bijection: {index} is targeted twice")]
    NotBijective { register: String, index: u32 },
}

impl MappingValidationError {
    /// The register the violation was found in.
    pub fn register(&self) -> &str {
        match self {
            MappingValidationError::MissingRegister { register }
            | MappingValidationError::UnknownRegister { register }
            | MappingValidationError::MissingIndex { register, .. }
            | MappingValidationError::OutOfRange { register, .. }
            | MappingValidationError::NotBijective { register, .. } => register,
        }
    }

    /// The offending index, if the violation concerns one.
    pub fn index(&self) -> Option<u32> {
        match self {
            MappingValidationError::MissingIndex { index, .. }
            | MappingValidationError::OutOfRange { index, .. }
            | MappingValidationError::NotBijective { index, .. } => Some(*index),
            _ => None,
        }
    }
}
