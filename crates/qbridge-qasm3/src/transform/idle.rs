//! Detection, padding and removal of idle qubits.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::ast::{GateCall, QubitRef, Statement};
use crate::program::Program;

/// Unused indices per qubit register.
pub type IdleQubits = BTreeMap<String, BTreeSet<u32>>;

impl Program {
    /// Per register, the declared indices that no statement references.
    ///
    /// A bare whole-register reference (`h q;`) marks every index of that
    /// register as used. Gate definition bodies are ignored.
    pub fn idle_qubits(&self) -> IdleQubits {
        let mut idle: IdleQubits = self
            .qubit_registers()
            .into_iter()
            .map(|reg| {
                let len = reg.len();
                (reg.name, (0..len).collect())
            })
            .collect();

        for stmt in self.statements() {
            stmt.walk(&mut |s| {
                for q in s.qubit_refs() {
                    let Some(unused) = idle.get_mut(&q.register) else {
                        continue;
                    };
                    match q.index {
                        Some(i) => {
                            unused.remove(&i);
                        }
                        None => unused.clear(),
                    }
                }
            });
        }

        idle
    }

    /// Number of distinct qubits touched by a statement other than an
    /// identity gate or a barrier.
    pub fn num_active_qubits(&self) -> usize {
        let layout = self.qubit_layout();
        let mut active = FxHashSet::default();

        for stmt in self.statements() {
            stmt.walk(&mut |s| match s {
                Statement::Gate(call) if call.is_identity() => {}
                Statement::Barrier { .. } => {}
                other => active.extend(layout.union(other.qubit_refs())),
            });
        }

        active.len()
    }

    /// Append one identity gate per idle qubit so every declared qubit is used.
    pub fn populate_idle_qubits(&mut self) {
        let idle = self.idle_qubits();
        let mut added = 0;

        for reg in self.qubit_registers() {
            let Some(indices) = idle.get(&reg.name) else {
                continue;
            };
            for &index in indices {
                let target = match reg.size {
                    Some(_) => QubitRef::single(&reg.name, index),
                    None => QubitRef::register(&reg.name),
                };
                self.statements_mut()
                    .push(Statement::Gate(GateCall::new("id", vec![target])));
                added += 1;
            }
        }

        debug!("Populated {} idle qubits", added);
    }

    /// Drop fully idle registers and compact partially idle ones.
    ///
    /// Used indices of a partially idle register are renumbered onto
    /// `[0, used)` preserving their order, and the declaration shrinks to
    /// match. Every reference is rewritten from its original index in a
    /// single pass over the statement list.
    pub fn remove_idle_qubits(&mut self) {
        let idle = self.idle_qubits();
        let mut dropped = FxHashSet::default();
        let mut remaps: FxHashMap<String, (Vec<Option<u32>>, u32)> = FxHashMap::default();

        for reg in self.qubit_registers() {
            let Some(unused) = idle.get(&reg.name) else {
                continue;
            };
            let len = reg.len();
            if unused.len() == len as usize {
                dropped.insert(reg.name);
            } else if !unused.is_empty() {
                let mut next = 0;
                let map = (0..len)
                    .map(|old| {
                        if unused.contains(&old) {
                            None
                        } else {
                            next += 1;
                            Some(next - 1)
                        }
                    })
                    .collect();
                remaps.insert(reg.name, (map, next));
            }
        }

        if dropped.is_empty() && remaps.is_empty() {
            return;
        }
        debug!(
            "Removing idle qubits: {} registers dropped, {} compacted",
            dropped.len(),
            remaps.len()
        );

        let statements = self.statements_mut();
        statements.retain(|stmt| {
            !matches!(stmt, Statement::QubitDecl { name, .. } if dropped.contains(name))
        });

        for stmt in statements.iter_mut() {
            if let Statement::QubitDecl { name, size, .. } = stmt {
                if let Some((_, used)) = remaps.get(name) {
                    *size = Some(*used);
                }
                continue;
            }
            stmt.walk_mut(&mut |s| {
                for q in s.qubit_refs_mut() {
                    let (Some((map, _)), Some(old)) = (remaps.get(&q.register), q.index) else {
                        continue;
                    };
                    q.index = map[old as usize];
                }
            });
        }
    }
}
