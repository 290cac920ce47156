//! `OpenQASM` program model and structural transforms for qbridge
//!
//! This crate parses `OpenQASM` 2 and 3 source into a structured statement
//! list, analyzes it, rewrites it in place and serializes it back. It is the
//! textual representation that the conversion graph in `qbridge-transpiler`
//! moves programs through.
//!
//! # Supported Syntax
//!
//! | Feature | Legacy form | Modern form |
//! |---------|-------------|-------------|
//! | Qubit declarations | `qreg q[5];` | `qubit[5] q;`, `qubit q;` |
//! | Classical bits | `creg c[5];` | `bit[5] c;`, `bit c;` |
//! | Gate calls | `u3(pi/2, 0, pi) q[0];` | `rx(pi/4) q[0];` |
//! | Measurements | `measure q -> c;` | `c = measure q;` |
//! | Conditionals | `if (c == 1) x q[0];` | `if (c[0]) { x q[0]; } else { z q[0]; }` |
//! | Barriers, resets | `barrier q;`, `reset q[0];` | same |
//! | Gate definitions | `gate bell a, b { h a; cx a, b; }` | same |
//!
//! Declarations remember their form, so a program emits the way it was written.
//!
//! # Example: Analysis
//!
//! ```rust
//! use qbridge_qasm3::Program;
//!
//! let program = Program::parse(r#"
//!     OPENQASM 3.0;
//!     qubit[3] q;
//!     h q[0];
//!     cx q[0], q[1];
//! "#).unwrap();
//!
//! assert_eq!(program.num_qubits(), 3);
//! assert_eq!(program.depth(), 2);
//! assert_eq!(program.idle_qubits()["q"].len(), 1);
//! ```
//!
//! # Example: Cycle-safe remapping
//!
//! ```rust
//! use qbridge_qasm3::{Program, QubitMapping};
//!
//! let mut program = Program::parse("qubit[2] q; cx q[0], q[1];").unwrap();
//! let mut mapping = QubitMapping::new();
//! mapping.insert("q".into(), [(0, 1), (1, 0)].into_iter().collect());
//!
//! program.apply_qubit_mapping(&mapping).unwrap();
//! assert_eq!(program.to_qasm(), "qubit[2] q;\ncx q[1], q[0];\n");
//! ```
//!
//! # Example: Idle-qubit compaction
//!
//! ```rust
//! use qbridge_qasm3::Program;
//!
//! let mut program = Program::parse("qubit[3] q; h q[0]; x q[1];").unwrap();
//! program.remove_idle_qubits();
//! assert_eq!(program.to_qasm(), "qubit[2] q;\nh q[0];\nx q[1];\n");
//! ```

mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;
mod program;
pub mod transform;

pub use emitter::emit;
pub use error::{MappingValidationError, ParseError, ParseResult};
pub use program::{Program, Register};
pub use transform::{IdleQubits, QubitMapping, validate_mapping};

/// Parse and validate QASM source into a [`Program`].
pub fn parse(source: &str) -> ParseResult<Program> {
    Program::parse(source)
}

// Re-export AST types for advanced users
pub mod syntax {
    pub use crate::ast::*;
}
