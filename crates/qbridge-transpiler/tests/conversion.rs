//! End-to-end conversions through the default and custom graphs.

use std::sync::Arc;

use anyhow::Result;
use qbridge_qasm3::Program;
use qbridge_qasm3::syntax::Statement;
use qbridge_transpiler::{
    AllCapabilities, CapabilitySet, FnConverter, GraphBuilder, QASM2, QASM3, QASM3_PROGRAM, Qasm2,
    Qasm3, Transpiler, TranspilerConfig, TranspilerError,
};

const BELL_QASM2: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0], q[1];
measure q -> c;
"#;

#[test]
fn qasm2_to_program_and_back() -> Result<()> {
    let transpiler = Transpiler::default();

    let out = transpiler.convert(&Qasm2::new(BELL_QASM2), QASM2, QASM3_PROGRAM, 3)?;
    let program = out
        .downcast_ref::<Program>()
        .ok_or_else(|| anyhow::anyhow!("expected a Program, got {}", out.type_name()))?;
    assert_eq!(program.num_qubits(), 2);
    assert_eq!(program.num_clbits(), 2);
    assert_eq!(program.version(), Some("3.0"));

    let back = transpiler.convert(program, QASM3_PROGRAM, QASM2, 3)?;
    assert_eq!(back.downcast_ref::<Qasm2>(), Some(&Qasm2::new(BELL_QASM2)));
    Ok(())
}

#[test]
fn config_drives_depth_and_capabilities() -> Result<()> {
    let config = TranspilerConfig::from_yaml_str("max_path_depth: 1\n")?;
    let transpiler = Transpiler::from_config(&config);

    let err = transpiler
        .convert_with_default_depth(&Qasm2::new(BELL_QASM2), QASM2, QASM3_PROGRAM)
        .unwrap_err();
    assert!(matches!(err, TranspilerError::ConversionPathNotFound { .. }));

    let out = transpiler.convert_with_default_depth(&Qasm2::new(BELL_QASM2), QASM2, QASM3)?;
    assert!(out.is::<Qasm3>());
    Ok(())
}

#[test]
fn unknown_node_lists_registered_ids() {
    let err = Transpiler::default()
        .convert(&Qasm3::new(""), QASM3, "quil", 5)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Default conversion graph does not contain node 'quil'. \
         Supported nodes are: [\"qasm2\", \"qasm3\", \"qasm3_program\"]"
    );
}

#[test]
fn failing_step_leaves_input_untouched() {
    let transpiler = Transpiler::default();
    let input = Qasm3::new("OPENQASM 3.0;\nqubit q;\nbit c;\nif (c == 1) x q; else z q;\n");

    let err = transpiler.convert(&input, QASM3, QASM2, 2).unwrap_err();
    match &err {
        TranspilerError::CircuitConversion {
            source_id,
            target_id,
            ..
        } => {
            assert_eq!(source_id, QASM3);
            assert_eq!(target_id, QASM2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(input.as_str().contains("else z q;"));
}

#[test]
fn custom_graph_with_gated_representation() -> Result<()> {
    let mut builder = GraphBuilder::new("Lab");
    qbridge_transpiler::register_builtins(&mut builder)?;
    builder
        .register_representation("gate_count", ["counting"])?
        .register_converter(
            QASM3_PROGRAM,
            "gate_count",
            FnConverter::typed("count_gates", |p: Program| {
                Ok(p.statements().iter().filter(|s| matches!(s, Statement::Gate(_))).count())
            }),
            0.5,
            Vec::<String>::new(),
        )?;
    let graph = Arc::new(builder.build());

    let path = graph.resolve_path(QASM2, "gate_count", 5)?;
    assert_eq!(path.to_string(), "qasm2 -> qasm3 -> qasm3_program -> gate_count");
    assert!((path.total_weight() - 2.5).abs() < f64::EPSILON);

    let denied = Transpiler::new(Arc::clone(&graph), CapabilitySet::new(), 5);
    let err = denied
        .convert_with_default_depth(&Qasm2::new(BELL_QASM2), QASM2, "gate_count")
        .unwrap_err();
    assert!(matches!(
        err,
        TranspilerError::MissingCapability { ref capability, .. } if capability == "counting"
    ));

    let allowed = Transpiler::new(graph, AllCapabilities, 5);
    let out = allowed.convert_with_default_depth(&Qasm2::new(BELL_QASM2), QASM2, "gate_count")?;
    assert_eq!(out.downcast_ref::<usize>(), Some(&2));
    Ok(())
}

#[test]
fn identity_conversion_copies_input() -> Result<()> {
    let transpiler = Transpiler::default();
    let out = transpiler.convert(&Qasm2::new(BELL_QASM2), QASM2, QASM2, 0)?;
    assert_eq!(out.downcast_ref::<Qasm2>(), Some(&Qasm2::new(BELL_QASM2)));
    Ok(())
}
