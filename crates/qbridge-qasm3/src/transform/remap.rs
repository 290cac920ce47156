//! Qubit index permutations.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::MappingValidationError;
use crate::program::{Program, Register};

/// Per register, a map from old index to new index.
pub type QubitMapping = BTreeMap<String, BTreeMap<u32, u32>>;

/// Check that `mapping` is a complete bijection for every declared register.
///
/// Every register in `registers` must have an entry, each entry must map all
/// of `[0, size)` onto `[0, size)` without collisions, and the mapping must
/// not name undeclared registers.
pub fn validate_mapping(
    registers: &[Register],
    mapping: &QubitMapping,
) -> Result<(), MappingValidationError> {
    for reg in registers {
        let size = reg.len();
        let map = mapping
            .get(&reg.name)
            .ok_or_else(|| MappingValidationError::MissingRegister {
                register: reg.name.clone(),
            })?;

        for (&old, &new) in map {
            for index in [old, new] {
                if index >= size {
                    return Err(MappingValidationError::OutOfRange {
                        register: reg.name.clone(),
                        index,
                        size,
                    });
                }
            }
        }

        let mut targets = FxHashSet::default();
        for old in 0..size {
            let new = *map
                .get(&old)
                .ok_or_else(|| MappingValidationError::MissingIndex {
                    register: reg.name.clone(),
                    index: old,
                })?;
            if !targets.insert(new) {
                return Err(MappingValidationError::NotBijective {
                    register: reg.name.clone(),
                    index: new,
                });
            }
        }
    }

    if let Some(unknown) = mapping
        .keys()
        .find(|name| !registers.iter().any(|reg| &reg.name == *name))
    {
        return Err(MappingValidationError::UnknownRegister {
            register: unknown.clone(),
        });
    }

    Ok(())
}

impl Program {
    /// Permute qubit indices according to `mapping`.
    ///
    /// Every indexed reference is rewritten exactly once from its original
    /// value, so arbitrary permutations (including cycles and swaps) are
    /// applied correctly. Whole-register references are left as they are.
    /// An empty mapping is a no-op.
    pub fn apply_qubit_mapping(&mut self, mapping: &QubitMapping) -> Result<(), MappingValidationError> {
        if mapping.is_empty() {
            return Ok(());
        }
        validate_mapping(&self.qubit_registers(), mapping)?;
        self.remap(mapping);
        Ok(())
    }

    /// Reverse qubit order within every register (`i -> size - 1 - i`).
    pub fn reverse_qubit_order(&mut self) {
        let mapping: QubitMapping = self
            .qubit_registers()
            .into_iter()
            .map(|reg| {
                let size = reg.len();
                (reg.name, (0..size).map(|old| (old, size - 1 - old)).collect())
            })
            .collect();
        self.remap(&mapping);
    }

    /// Rewrite references with an already validated mapping.
    fn remap(&mut self, mapping: &QubitMapping) {
        let mut rewritten = 0usize;
        for stmt in self.statements_mut() {
            stmt.walk_mut(&mut |s| {
                for q in s.qubit_refs_mut() {
                    let Some(old) = q.index else {
                        continue;
                    };
                    if let Some(&new) = mapping.get(&q.register).and_then(|m| m.get(&old)) {
                        if new != old {
                            q.index = Some(new);
                            rewritten += 1;
                        }
                    }
                }
            });
        }
        debug!("Qubit mapping rewrote {} references", rewritten);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(&str, &[(u32, u32)])]) -> QubitMapping {
        entries
            .iter()
            .map(|(name, pairs)| (name.to_string(), pairs.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_swap_does_not_collide() {
        let mut program = Program::parse("qubit[2] q; cx q[0], q[1];").unwrap();
        program
            .apply_qubit_mapping(&mapping(&[("q", &[(0, 1), (1, 0)])]))
            .unwrap();
        assert_eq!(program.to_qasm(), "qubit[2] q;\ncx q[1], q[0];\n");
    }

    #[test]
    fn test_three_cycle() {
        let mut program = Program::parse("qubit[3] q; h q[0]; x q[1]; z q[2];").unwrap();
        program
            .apply_qubit_mapping(&mapping(&[("q", &[(0, 1), (1, 2), (2, 0)])]))
            .unwrap();
        assert_eq!(program.to_qasm(), "qubit[3] q;\nh q[1];\nx q[2];\nz q[0];\n");
    }

    #[test]
    fn test_empty_mapping_is_noop() {
        let mut program = Program::parse("qubit[2] q; cx q[0], q[1];").unwrap();
        let before = program.clone();
        program.apply_qubit_mapping(&QubitMapping::new()).unwrap();
        assert_eq!(program, before);
    }

    #[test]
    fn test_missing_register() {
        let mut program = Program::parse("qubit[1] a; qubit[1] b; x a[0];").unwrap();
        let err = program
            .apply_qubit_mapping(&mapping(&[("a", &[(0, 0)])]))
            .unwrap_err();
        assert_eq!(
            err,
            MappingValidationError::MissingRegister {
                register: "b".into()
            }
        );
    }

    #[test]
    fn test_incomplete_mapping() {
        let registers = vec![Register {
            name: "q".into(),
            size: Some(3),
        }];
        let err = validate_mapping(&registers, &mapping(&[("q", &[(0, 1), (1, 0)])])).unwrap_err();
        assert_eq!(err.register(), "q");
        assert_eq!(err.index(), Some(2));
    }

    #[test]
    fn test_non_bijective_mapping() {
        let registers = vec![Register {
            name: "q".into(),
            size: Some(2),
        }];
        let err = validate_mapping(&registers, &mapping(&[("q", &[(0, 1), (1, 1)])])).unwrap_err();
        assert_eq!(
            err,
            MappingValidationError::NotBijective {
                register: "q".into(),
                index: 1
            }
        );
    }

    #[test]
    fn test_out_of_range_mapping() {
        let registers = vec![Register {
            name: "q".into(),
            size: Some(2),
        }];
        let err = validate_mapping(&registers, &mapping(&[("q", &[(0, 2), (1, 0)])])).unwrap_err();
        assert_eq!(err.index(), Some(2));
        assert!(matches!(err, MappingValidationError::OutOfRange { size: 2, .. }));
    }

    #[test]
    fn test_unknown_register() {
        let registers = vec![Register {
            name: "q".into(),
            size: None,
        }];
        let err = validate_mapping(
            &registers,
            &mapping(&[("q", &[(0, 0)]), ("ghost", &[(0, 0)])]),
        )
        .unwrap_err();
        assert_eq!(err.register(), "ghost");
    }

    #[test]
    fn test_failed_validation_leaves_program_untouched() {
        let mut program = Program::parse("qubit[2] q; cx q[0], q[1];").unwrap();
        let before = program.clone();
        assert!(
            program
                .apply_qubit_mapping(&mapping(&[("q", &[(0, 0), (1, 0)])]))
                .is_err()
        );
        assert_eq!(program, before);
    }

    #[test]
    fn test_reverse_qubit_order() {
        let mut program = Program::parse("qreg q[3]; qreg r[2]; ccx q[0], q[1], q[2]; cx r[0], r[1];").unwrap();
        program.reverse_qubit_order();
        assert_eq!(
            program.to_qasm(),
            "qreg q[3];\nqreg r[2];\nccx q[2], q[1], q[0];\ncx r[1], r[0];\n"
        );
    }
}
