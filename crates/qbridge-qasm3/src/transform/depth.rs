//! Critical-path depth of a program.

use crate::ast::Statement;
use crate::program::{Program, QubitLayout};

impl Program {
    /// Circuit depth (length of the critical path).
    ///
    /// One counter per declared qubit advances as operations are applied;
    /// barriers synchronize all counters to the running maximum. Combined
    /// whole-register measurements add one layer per contiguous block.
    pub fn depth(&self) -> usize {
        let layout = self.qubit_layout();
        let mut analyzer = DepthAnalyzer::new(&layout);
        for stmt in self.statements() {
            analyzer.visit(stmt);
        }
        analyzer.finish()
    }
}

struct DepthAnalyzer<'a> {
    layout: &'a QubitLayout,
    counters: Vec<usize>,
    max: usize,
    /// Set once a combined measurement has added its layer; cleared by the
    /// next non-measurement statement.
    measured_in_block: bool,
}

impl<'a> DepthAnalyzer<'a> {
    fn new(layout: &'a QubitLayout) -> Self {
        Self {
            layout,
            counters: vec![0; layout.total()],
            max: 0,
            measured_in_block: false,
        }
    }

    fn visit(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Include(_)
            | Statement::QubitDecl { .. }
            | Statement::BitDecl { .. }
            | Statement::GateDef { .. } => {}

            Statement::Gate(call) => {
                self.measured_in_block = false;
                if let [only] = call.qubits.as_slice() {
                    for i in self.layout.indices(only) {
                        self.single(i);
                    }
                } else {
                    let touched = self.layout.union(&call.qubits);
                    self.multi(&touched);
                }
            }

            Statement::Measure { qubits, .. } => {
                if qubits.iter().all(|q| q.index.is_some()) {
                    for i in self.layout.union(qubits) {
                        self.single(i);
                    }
                } else if !self.measured_in_block {
                    for c in &mut self.counters {
                        *c += 1;
                        self.max = self.max.max(*c);
                    }
                    self.measured_in_block = true;
                }
            }

            Statement::Reset { qubits } => {
                self.measured_in_block = false;
                for i in self.layout.union(qubits) {
                    self.single(i);
                }
            }

            Statement::Barrier { .. } => {
                self.measured_in_block = false;
                self.counters.fill(self.max);
            }

            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                self.measured_in_block = false;
                for inner in then_body.iter().chain(else_body.iter().flatten()) {
                    self.visit(inner);
                }
            }
        }
    }

    fn single(&mut self, i: usize) {
        self.counters[i] += 1;
        self.max = self.max.max(self.counters[i]);
    }

    fn multi(&mut self, touched: &[usize]) {
        let Some(c) = touched.iter().map(|&j| self.counters[j]).max() else {
            return;
        };
        let c = c + 1;
        for &j in touched {
            self.counters[j] = c;
        }
        self.max = self.max.max(c);
    }

    fn finish(self) -> usize {
        self.counters.into_iter().max().unwrap_or(0)
    }
}
