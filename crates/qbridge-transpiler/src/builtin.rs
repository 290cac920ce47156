//! Built-in representations, converters and the process-wide default graph.

use std::sync::{Arc, OnceLock};

use qbridge_qasm3::Program;
use qbridge_qasm3::syntax::{BinOp, DeclStyle, Expression, MeasureStyle, Statement};
use qbridge_qasm3::transform::compat::{QELIB1_INCLUDE, STDGATES_INCLUDE};
use thiserror::Error;
use tracing::warn;

use crate::converter::{ConverterError, FnConverter};
use crate::error::TranspilerResult;
use crate::graph::{ConversionGraph, GraphBuilder};
use crate::program::{Qasm2, Qasm3};

/// `OpenQASM` 2 source text ([`Qasm2`]).
pub const QASM2: &str = "qasm2";

/// `OpenQASM` 3 source text ([`Qasm3`]).
pub const QASM3: &str = "qasm3";

/// Parsed `OpenQASM` program ([`qbridge_qasm3::Program`]).
pub const QASM3_PROGRAM: &str = "qasm3_program";

/// Legacy gate names and their `stdgates.inc` equivalents.
const GATE_RENAMES: [(&str, &str); 3] = [("u1", "p"), ("u3", "u"), ("cu1", "cp")];

/// `OpenQASM` 3 constructs with no `OpenQASM` 2 equivalent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LegacyConversionError {
    #[error("OpenQASM 2 has no else branches")]
    ElseBranch,

    #[error("OpenQASM 2 conditions must compare a register to an integer, found '{0}'")]
    UnsupportedCondition(String),

    #[error("OpenQASM 2 conditionals guard exactly one quantum operation")]
    ConditionalBody,

    #[error("OpenQASM 2 measurements need a classical target: measure {0}")]
    MissingMeasureTarget(String),
}

/// Rewrite `OpenQASM` 2 source as `OpenQASM` 3.
pub fn qasm2_to_qasm3(source: Qasm2) -> Result<Qasm3, ConverterError> {
    let mut program = Program::parse(source.as_str())?;
    program.set_version("3.0");
    program.set_declaration_style(DeclStyle::Modern);
    program.set_measure_style(MeasureStyle::Assign);
    program.replace_include(QELIB1_INCLUDE, STDGATES_INCLUDE);
    for (legacy, modern) in GATE_RENAMES {
        program.replace_gate_name(legacy, modern);
    }
    Ok(Qasm3(program.to_qasm()))
}

/// Rewrite `OpenQASM` 3 source as `OpenQASM` 2.
///
/// Fails with [`LegacyConversionError`] on constructs the legacy dialect
/// lacks.
pub fn qasm3_to_qasm2(source: Qasm3) -> Result<Qasm2, ConverterError> {
    let mut program = Program::parse(source.as_str())?;
    check_legacy_expressible(&program)?;

    program.set_version("2.0");
    program.set_declaration_style(DeclStyle::Legacy);
    program.set_measure_style(MeasureStyle::Arrow);
    program.replace_include(STDGATES_INCLUDE, QELIB1_INCLUDE);
    for (legacy, modern) in GATE_RENAMES {
        program.replace_gate_name(modern, legacy);
    }
    Ok(Qasm2(program.to_qasm()))
}

fn check_legacy_expressible(program: &Program) -> Result<(), LegacyConversionError> {
    let mut problem = None;
    for stmt in program.statements() {
        stmt.walk(&mut |s| {
            if problem.is_none() {
                problem = legacy_problem(s);
            }
        });
        if let Some(err) = problem.take() {
            return Err(err);
        }
    }
    Ok(())
}

fn legacy_problem(stmt: &Statement) -> Option<LegacyConversionError> {
    match stmt {
        Statement::If {
            condition,
            then_body,
            else_body,
        } => {
            if else_body.is_some() {
                return Some(LegacyConversionError::ElseBranch);
            }
            let register_equals_int = matches!(
                condition,
                Expression::BinOp { left, op: BinOp::Eq, right }
                    if matches!(**left, Expression::Identifier(_))
                        && matches!(**right, Expression::Int(_))
            );
            if !register_equals_int {
                return Some(LegacyConversionError::UnsupportedCondition(
                    condition.to_string(),
                ));
            }
            match then_body.as_slice() {
                [Statement::Gate(_) | Statement::Measure { .. } | Statement::Reset { .. }] => None,
                _ => Some(LegacyConversionError::ConditionalBody),
            }
        }
        Statement::Measure { qubits, bits, .. } if bits.is_empty() => {
            let operands: Vec<String> = qubits.iter().map(ToString::to_string).collect();
            Some(LegacyConversionError::MissingMeasureTarget(operands.join(", ")))
        }
        _ => None,
    }
}

/// Register the built-in representations and converters.
pub fn register_builtins(builder: &mut GraphBuilder) -> TranspilerResult<()> {
    builder
        .register_representation(QASM2, Vec::<String>::new())?
        .register_representation(QASM3, Vec::<String>::new())?
        .register_representation(QASM3_PROGRAM, Vec::<String>::new())?
        .register_converter(
            QASM2,
            QASM3,
            FnConverter::typed("qasm2_to_qasm3", qasm2_to_qasm3),
            1.0,
            Vec::<String>::new(),
        )?
        .register_converter(
            QASM3,
            QASM2,
            FnConverter::typed("qasm3_to_qasm2", qasm3_to_qasm2),
            1.0,
            Vec::<String>::new(),
        )?
        .register_converter(
            QASM3,
            QASM3_PROGRAM,
            FnConverter::typed("qasm3_to_program", |source: Qasm3| {
                Ok(Program::parse(source.as_str())?)
            }),
            1.0,
            Vec::<String>::new(),
        )?
        .register_converter(
            QASM3_PROGRAM,
            QASM3,
            FnConverter::typed("program_to_qasm3", |program: Program| {
                Ok(Qasm3(program.to_qasm()))
            }),
            1.0,
            Vec::<String>::new(),
        )?;
    Ok(())
}

static DEFAULT_GRAPH: OnceLock<Arc<ConversionGraph>> = OnceLock::new();

/// The process-wide graph of built-in converters.
///
/// Built on first use and frozen afterwards.
pub fn default_graph() -> Arc<ConversionGraph> {
    let graph = DEFAULT_GRAPH.get_or_init(|| {
        let mut builder = GraphBuilder::new("Default");
        if let Err(e) = register_builtins(&mut builder) {
            warn!("Failed to register built-in converters: {}", e);
        }
        Arc::new(builder.build())
    });
    Arc::clone(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
u3(pi/2, 0, pi) q[0];
cu1(pi/4) q[0], q[1];
measure q -> c;
if (c == 1) u1(pi) q[1];
"#;

    const MODERN: &str = "OPENQASM 3.0;
include \"stdgates.inc\";
qubit[2] q;
bit[2] c;
u(pi / 2, 0, pi) q[0];
cp(pi / 4) q[0], q[1];
c = measure q;
if (c == 1) p(pi) q[1];
";

    #[test]
    fn test_qasm2_to_qasm3() {
        let out = qasm2_to_qasm3(Qasm2::new(LEGACY)).unwrap();
        assert_eq!(out.as_str(), MODERN);
    }

    #[test]
    fn test_qasm3_to_qasm2() {
        let out = qasm3_to_qasm2(Qasm3::new(MODERN)).unwrap();
        assert_eq!(
            out.as_str(),
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\n\
             u3(pi / 2, 0, pi) q[0];\ncu1(pi / 4) q[0], q[1];\nmeasure q -> c;\nif (c == 1) u1(pi) q[1];\n"
        );
    }

    #[test]
    fn test_qasm3_scalars_become_single_registers() {
        let out = qasm3_to_qasm2(Qasm3::new("qubit q; bit b; b = measure q;")).unwrap();
        assert_eq!(
            out.as_str(),
            "OPENQASM 2.0;\nqreg q[1];\ncreg b[1];\nmeasure q -> b;\n"
        );
    }

    #[test]
    fn test_qasm3_to_qasm2_rejects_else() {
        let err = qasm3_to_qasm2(Qasm3::new("qubit q; bit c; if (c == 1) x q; else z q;"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LegacyConversionError>(),
            Some(LegacyConversionError::ElseBranch)
        ));
    }

    #[test]
    fn test_qasm3_to_qasm2_rejects_bit_condition() {
        let err = qasm3_to_qasm2(Qasm3::new("qubit q; bit[2] c; if (c[0] == 1) x q;"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "OpenQASM 2 conditions must compare a register to an integer, found 'c[0] == 1'"
        );
    }

    #[test]
    fn test_qasm3_to_qasm2_rejects_blocks_and_bare_measure() {
        assert!(qasm3_to_qasm2(Qasm3::new("qubit[2] q; bit c; if (c == 1) { x q[0]; x q[1]; }")).is_err());
        let err = qasm3_to_qasm2(Qasm3::new("qubit[2] q; measure q[1];")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "OpenQASM 2 measurements need a classical target: measure q[1]"
        );
    }

    #[test]
    fn test_parse_errors_propagate() {
        let err = qasm2_to_qasm3(Qasm2::new("qreg q[1]; h r[0];")).unwrap_err();
        assert!(err.downcast_ref::<qbridge_qasm3::ParseError>().is_some());
    }

    #[test]
    fn test_default_graph() {
        let graph = default_graph();
        assert_eq!(graph.name(), "Default");
        assert_eq!(graph.node_ids(), vec![QASM2, QASM3, QASM3_PROGRAM]);
        assert_eq!(graph.edge_count(), 4);
        assert!(Arc::ptr_eq(&graph, &default_graph()));

        let path = graph.resolve_path(QASM2, QASM3_PROGRAM, 5).unwrap();
        assert_eq!(path.to_string(), "qasm2 -> qasm3 -> qasm3_program");
    }

    #[test]
    fn test_default_graph_with_unbounded_depth() {
        let path = default_graph()
            .resolve_path(QASM2, QASM3_PROGRAM, usize::MAX)
            .unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "qasm2 -> qasm3 -> qasm3_program");
    }
}
