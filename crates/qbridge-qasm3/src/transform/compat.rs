//! Compatibility rewrites used when moving programs between dialects.

use crate::ast::{DeclStyle, Expression, GateCall, MeasureStyle, Statement};
use crate::program::Program;

/// Standard gate library of `OpenQASM` 3.
pub const STDGATES_INCLUDE: &str = "stdgates.inc";

/// Standard gate library of `OpenQASM` 2.
pub const QELIB1_INCLUDE: &str = "qelib1.inc";

impl Program {
    /// Insert `include "stdgates.inc";` at the top if it is missing.
    pub fn add_stdgates_include(&mut self) {
        let present = self
            .statements()
            .iter()
            .any(|s| matches!(s, Statement::Include(path) if path == STDGATES_INCLUDE));
        if !present {
            self.statements_mut()
                .insert(0, Statement::Include(STDGATES_INCLUDE.to_string()));
        }
    }

    /// Remove every `include "stdgates.inc";`.
    pub fn remove_stdgates_include(&mut self) {
        self.statements_mut()
            .retain(|s| !matches!(s, Statement::Include(path) if path == STDGATES_INCLUDE));
    }

    /// Replace includes of `old` with `new`. Returns whether anything changed.
    pub fn replace_include(&mut self, old: &str, new: &str) -> bool {
        let mut changed = false;
        for stmt in self.statements_mut() {
            if let Statement::Include(path) = stmt {
                if path == old {
                    *path = new.to_string();
                    changed = true;
                }
            }
        }
        changed
    }

    /// Rename every call of gate `old` to `new`, including calls inside
    /// conditional branches and gate definition bodies.
    ///
    /// Returns the number of calls renamed.
    pub fn replace_gate_name(&mut self, old: &str, new: &str) -> usize {
        let mut renamed = 0;
        for_each_call_mut(self.statements_mut(), &mut |call| {
            if call.name == old {
                call.name = new.to_string();
                renamed += 1;
            }
        });
        renamed
    }

    /// Fold constant parameters that mention `pi`, `tau` or `euler` into
    /// decimal literals (`rx(pi / 4)` becomes `rx(0.7853981633974483)`).
    pub fn convert_pi_to_decimal(&mut self) {
        for_each_call_mut(self.statements_mut(), &mut |call| {
            for param in &mut call.params {
                if !param.uses_named_constant() {
                    continue;
                }
                if let Some(value) = param.as_f64().filter(|v| v.is_finite()) {
                    *param = Expression::Float(value);
                }
            }
        });
    }

    /// Rewrite every register declaration into the given syntactic form.
    ///
    /// Legacy declarations always carry a size, so modern scalars become
    /// one-element registers. Indexed references to such a register stay valid;
    /// bare references keep meaning the whole (one-element) register.
    pub fn set_declaration_style(&mut self, target: DeclStyle) {
        for stmt in self.statements_mut() {
            if let Statement::QubitDecl { size, style, .. } | Statement::BitDecl { size, style, .. } =
                stmt
            {
                *style = target;
                if target == DeclStyle::Legacy && size.is_none() {
                    *size = Some(1);
                }
            }
        }
    }

    /// Rewrite every measurement that has bit targets into the given form.
    pub fn set_measure_style(&mut self, target: MeasureStyle) {
        for stmt in self.statements_mut() {
            stmt.walk_mut(&mut |s| {
                if let Statement::Measure { bits, style, .. } = s {
                    if !bits.is_empty() {
                        *style = target;
                    }
                }
            });
        }
    }
}

/// Visit every gate call, descending into branches and gate definitions.
fn for_each_call_mut(statements: &mut [Statement], f: &mut impl FnMut(&mut GateCall)) {
    for stmt in statements {
        match stmt {
            Statement::Gate(call) => f(call),
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                for_each_call_mut(then_body, f);
                if let Some(else_body) = else_body {
                    for_each_call_mut(else_body, f);
                }
            }
            Statement::GateDef { body, .. } => for_each_call_mut(body, f),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_stdgates() {
        let mut program = Program::parse("OPENQASM 3;\nqubit[1] q;\nh q[0];\nry(pi/4) q[0];").unwrap();
        program.add_stdgates_include();
        program.add_stdgates_include();
        assert_eq!(
            program.to_qasm(),
            "OPENQASM 3;\ninclude \"stdgates.inc\";\nqubit[1] q;\nh q[0];\nry(pi / 4) q[0];\n"
        );

        program.remove_stdgates_include();
        assert!(!program.to_qasm().contains("include"));
    }

    #[test]
    fn test_replace_gate_name() {
        let mut program = Program::parse(
            "qubit[2] q; bit c; cnot q[0], q[1]; p(3.14) q[1]; if (c == 1) cnot q[1], q[0];",
        )
        .unwrap();
        assert_eq!(program.replace_gate_name("cnot", "cx"), 2);
        assert_eq!(program.replace_gate_name("p", "phaseshift"), 1);
        assert_eq!(program.replace_gate_name("missing", "x"), 0);
        assert_eq!(
            program.to_qasm(),
            "qubit[2] q;\nbit c;\ncx q[0], q[1];\nphaseshift(3.14) q[1];\nif (c == 1) cx q[1], q[0];\n"
        );
    }

    #[test]
    fn test_replace_gate_name_does_not_touch_prefixes() {
        let mut program = Program::parse("qubit[2] q; cp(0.5) q[0], q[1]; p(0.5) q[0];").unwrap();
        program.replace_gate_name("p", "phase");
        assert_eq!(
            program.to_qasm(),
            "qubit[2] q;\ncp(0.5) q[0], q[1];\nphase(0.5) q[0];\n"
        );
    }

    #[test]
    fn test_convert_pi_to_decimal() {
        let mut program = Program::parse(
            "OPENQASM 3;\nqubit[1] q;\nh q[0];\nrx(pi / 4) q[0];\nry(2*pi) q[0];\nrz(3 * pi/4) q[0];\nrx(theta) q[0];",
        )
        .unwrap();
        program.convert_pi_to_decimal();
        assert_eq!(
            program.to_qasm(),
            "OPENQASM 3;\nqubit[1] q;\nh q[0];\nrx(0.7853981633974483) q[0];\n\
             ry(6.283185307179586) q[0];\nrz(2.356194490192345) q[0];\nrx(theta) q[0];\n"
        );
    }

    #[test]
    fn test_non_finite_constants_are_left_symbolic() {
        let mut program = Program::parse("qubit[1] q; rx(pi/0) q[0]; ry(pi/2) q[0];").unwrap();
        program.convert_pi_to_decimal();
        assert_eq!(
            program.to_qasm(),
            "qubit[1] q;\nrx(pi / 0) q[0];\nry(1.5707963267948966) q[0];\n"
        );
        assert_eq!(Program::parse(&program.to_qasm()).unwrap(), program);
    }

    #[test]
    fn test_set_declaration_style() {
        let mut program = Program::parse("qubit[2] q; qubit s; bit[2] c; cx q[0], s;").unwrap();
        program.set_declaration_style(DeclStyle::Legacy);
        assert_eq!(
            program.to_qasm(),
            "qreg q[2];\nqreg s[1];\ncreg c[2];\ncx q[0], s;\n"
        );

        program.set_declaration_style(DeclStyle::Modern);
        assert!(program.to_qasm().starts_with("qubit[2] q;\nqubit[1] s;\nbit[2] c;\n"));
    }

    #[test]
    fn test_set_measure_style() {
        let mut program =
            Program::parse("qubit[2] q; bit[2] c; c = measure q; c[0] = measure q[0]; measure q[1];").unwrap();
        program.set_measure_style(MeasureStyle::Arrow);
        assert_eq!(
            program.to_qasm(),
            "qubit[2] q;\nbit[2] c;\nmeasure q -> c;\nmeasure q[0] -> c[0];\nmeasure q[1];\n"
        );
    }

    #[test]
    fn test_replace_include() {
        let mut program = Program::parse("include \"qelib1.inc\"; qreg q[1];").unwrap();
        assert!(program.replace_include(QELIB1_INCLUDE, STDGATES_INCLUDE));
        assert!(!program.replace_include(QELIB1_INCLUDE, STDGATES_INCLUDE));
        assert_eq!(program.to_qasm(), "include \"stdgates.inc\";\nqreg q[1];\n");
    }
}
