//! Reset decomposition into measure plus conditional flip.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::ast::{BinOp, BitRef, DeclStyle, Expression, GateCall, MeasureStyle, QubitRef, Statement};
use crate::program::Program;

impl Program {
    /// Replace every top-level `reset` with a measurement into a fresh
    /// classical bit followed by `if (bit == 1) x qubit;`.
    ///
    /// Each reset qubit gets its own bit, named `c0`, `c1`, ... from a counter
    /// local to this call; names already declared are skipped. The new bit
    /// declarations follow the last existing declaration and use the legacy
    /// form when the program declares any register that way.
    ///
    /// Returns the number of qubit resets decomposed.
    pub fn replace_reset_with_ops(&mut self) -> usize {
        let qubit_regs = self.qubit_registers();
        let bit_regs = self.bit_registers();
        let sizes: FxHashMap<String, Option<u32>> = qubit_regs
            .iter()
            .map(|reg| (reg.name.clone(), reg.size))
            .collect();
        let mut taken: FxHashSet<String> = qubit_regs
            .into_iter()
            .chain(bit_regs)
            .map(|reg| reg.name)
            .collect();
        let style = if self.statements().iter().any(is_legacy_declaration) {
            DeclStyle::Legacy
        } else {
            DeclStyle::Modern
        };

        let mut counter = 0usize;
        let mut fresh_name = || loop {
            let candidate = format!("c{counter}");
            counter += 1;
            if taken.insert(candidate.clone()) {
                return candidate;
            }
        };

        let original = std::mem::take(self.statements_mut());
        let mut rewritten = Vec::with_capacity(original.len());
        let mut declarations = Vec::new();

        for stmt in original {
            let Statement::Reset { qubits } = stmt else {
                rewritten.push(stmt);
                continue;
            };
            for target in expand(&qubits, &sizes) {
                let bit = fresh_name();
                let (decl, bit_ref) = match style {
                    DeclStyle::Legacy => (
                        Statement::BitDecl {
                            name: bit.clone(),
                            size: Some(1),
                            style,
                        },
                        BitRef::single(&bit, 0),
                    ),
                    DeclStyle::Modern => (
                        Statement::BitDecl {
                            name: bit.clone(),
                            size: None,
                            style,
                        },
                        BitRef::register(&bit),
                    ),
                };
                declarations.push(decl);
                rewritten.push(Statement::Measure {
                    qubits: vec![target.clone()],
                    bits: vec![bit_ref],
                    style: MeasureStyle::Arrow,
                });
                rewritten.push(Statement::If {
                    condition: Expression::BinOp {
                        left: Box::new(Expression::Identifier(bit)),
                        op: BinOp::Eq,
                        right: Box::new(Expression::Int(1)),
                    },
                    then_body: vec![Statement::Gate(GateCall::new("x", vec![target]))],
                    else_body: None,
                });
            }
        }

        let decomposed = declarations.len();
        let insert_at = rewritten
            .iter()
            .rposition(Statement::is_declaration)
            .map_or(0, |pos| pos + 1);
        rewritten.splice(insert_at..insert_at, declarations);
        *self.statements_mut() = rewritten;

        debug!("Decomposed {} qubit resets", decomposed);
        decomposed
    }
}

fn is_legacy_declaration(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::QubitDecl {
            style: DeclStyle::Legacy,
            ..
        } | Statement::BitDecl {
            style: DeclStyle::Legacy,
            ..
        }
    )
}

/// One reference per reset qubit; whole sized registers expand per index.
fn expand(qubits: &[QubitRef], sizes: &FxHashMap<String, Option<u32>>) -> Vec<QubitRef> {
    qubits
        .iter()
        .flat_map(|q| match (q.index, sizes.get(&q.register)) {
            (None, Some(Some(size))) => (0..*size)
                .map(|i| QubitRef::single(&q.register, i))
                .collect(),
            _ => vec![q.clone()],
        })
        .collect()
}
