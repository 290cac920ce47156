//! The program model: declarations plus the structured statement list.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::ast::{Expression, QubitRef, Statement};
use crate::emitter;
use crate::error::{ParseError, ParseResult};
use crate::parser::parse_source;

/// A declared qubit or classical-bit register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    /// Register name.
    pub name: String,
    /// Declared size; `None` for a scalar (`qubit q;`).
    pub size: Option<u32>,
}

impl Register {
    /// Number of elements (a scalar counts as one).
    pub fn len(&self) -> u32 {
        self.size.unwrap_or(1)
    }

    /// Whether the register has no elements (`qubit[0] q;`).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed QASM program.
///
/// The statement list is the single source of truth: register declarations
/// are re-derived from it on every query, so transforms never leave stale
/// state behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProgram")]
pub struct Program {
    version: Option<String>,
    statements: Vec<Statement>,
}

/// Deserialized form of [`Program`], validated before use.
#[derive(Deserialize)]
struct RawProgram {
    version: Option<String>,
    statements: Vec<Statement>,
}

impl TryFrom<RawProgram> for Program {
    type Error = ParseError;

    fn try_from(raw: RawProgram) -> ParseResult<Self> {
        Self::from_statements(raw.version, raw.statements)
    }
}

impl Program {
    /// Parse and validate QASM source.
    pub fn parse(source: &str) -> ParseResult<Self> {
        let parsed = parse_source(source)?;
        Self::from_statements(parsed.version, parsed.statements)
    }

    /// Build a program from a statement list, validating declarations and references.
    pub fn from_statements(version: Option<String>, statements: Vec<Statement>) -> ParseResult<Self> {
        let program = Self {
            version,
            statements,
        };
        program.validate()?;
        Ok(program)
    }

    /// The `OPENQASM` version header, if present.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Replace the `OPENQASM` version header.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    /// Major version number from the header (`"2.0"` gives 2).
    pub fn major_version(&self) -> Option<u32> {
        self.version.as_deref()?.split('.').next()?.parse().ok()
    }

    /// The statement list.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub(crate) fn statements_mut(&mut self) -> &mut Vec<Statement> {
        &mut self.statements
    }

    /// Qubit register declarations, in declaration order.
    pub fn qubit_registers(&self) -> Vec<Register> {
        self.statements
            .iter()
            .filter_map(|stmt| match stmt {
                Statement::QubitDecl { name, size, .. } => Some(Register {
                    name: name.clone(),
                    size: *size,
                }),
                _ => None,
            })
            .collect()
    }

    /// Classical bit register declarations, in declaration order.
    pub fn bit_registers(&self) -> Vec<Register> {
        self.statements
            .iter()
            .filter_map(|stmt| match stmt {
                Statement::BitDecl { name, size, .. } => Some(Register {
                    name: name.clone(),
                    size: *size,
                }),
                _ => None,
            })
            .collect()
    }

    /// Total number of declared qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubit_registers().iter().map(|r| r.len() as usize).sum()
    }

    /// Total number of declared classical bits.
    pub fn num_clbits(&self) -> usize {
        self.bit_registers().iter().map(|r| r.len() as usize).sum()
    }

    /// Serialize back to QASM source.
    pub fn to_qasm(&self) -> String {
        emitter::emit(self)
    }

    /// Flat qubit numbering across all qubit registers.
    pub(crate) fn qubit_layout(&self) -> QubitLayout {
        let mut offsets = FxHashMap::default();
        let mut total = 0;
        for reg in self.qubit_registers() {
            let len = reg.len() as usize;
            offsets.insert(reg.name, (total, len));
            total += len;
        }
        QubitLayout { offsets, total }
    }

    fn validate(&self) -> ParseResult<()> {
        let mut qubits = FxHashMap::default();
        let mut bits = FxHashMap::default();

        for stmt in &self.statements {
            let (table, name, size) = match stmt {
                Statement::QubitDecl { name, size, .. } => (&mut qubits, name, size),
                Statement::BitDecl { name, size, .. } => (&mut bits, name, size),
                _ => continue,
            };
            if table.insert(name.clone(), size.unwrap_or(1)).is_some() {
                return Err(ParseError::DuplicateDeclaration(name.clone()));
            }
        }

        let check = |table: &FxHashMap<String, u32>, register: &str, index: Option<u32>| {
            let size = *table
                .get(register)
                .ok_or_else(|| ParseError::UndefinedRegister(register.to_string()))?;
            match index {
                Some(index) if index >= size => Err(ParseError::IndexOutOfBounds {
                    register: register.to_string(),
                    index,
                    size,
                }),
                _ => Ok(()),
            }
        };

        let mut result = Ok(());
        for stmt in &self.statements {
            stmt.walk(&mut |s| {
                if result.is_err() {
                    return;
                }
                for q in s.qubit_refs() {
                    if let Err(e) = check(&qubits, &q.register, q.index) {
                        result = Err(e);
                        return;
                    }
                }
                if let Statement::Measure { bits: targets, .. } = s {
                    for b in targets {
                        if let Err(e) = check(&bits, &b.register, b.index) {
                            result = Err(e);
                            return;
                        }
                    }
                }
                if let Statement::If { condition, .. } = s {
                    let mut refs = Vec::new();
                    condition_bit_refs(condition, &mut refs);
                    for (register, index) in refs {
                        if let Err(e) = check(&bits, register, index) {
                            result = Err(e);
                            return;
                        }
                    }
                }
            });
            result.clone()?;
        }
        Ok(())
    }
}

/// Bit registers a condition reads, with the index when it is a literal.
///
/// Negative or oversized literal indices are reported as `u32::MAX` so they
/// fail the bounds check.
fn condition_bit_refs<'e>(expr: &'e Expression, out: &mut Vec<(&'e str, Option<u32>)>) {
    match expr {
        Expression::Identifier(name) => out.push((name.as_str(), None)),
        Expression::Index { target, index } => {
            if let Expression::Identifier(name) = target.as_ref() {
                let literal = match index.as_ref() {
                    Expression::Int(i) => Some(u32::try_from(*i).unwrap_or(u32::MAX)),
                    _ => None,
                };
                out.push((name.as_str(), literal));
            } else {
                condition_bit_refs(target, out);
            }
            if !matches!(index.as_ref(), Expression::Int(_)) {
                condition_bit_refs(index, out);
            }
        }
        Expression::Neg(e) | Expression::Not(e) | Expression::Paren(e) => {
            condition_bit_refs(e, out);
        }
        Expression::BinOp { left, right, .. } => {
            condition_bit_refs(left, out);
            condition_bit_refs(right, out);
        }
        Expression::FnCall { args, .. } => {
            for arg in args {
                condition_bit_refs(arg, out);
            }
        }
        Expression::Int(_)
        | Expression::Float(_)
        | Expression::Bool(_)
        | Expression::Pi
        | Expression::Tau
        | Expression::Euler => {}
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_qasm())
    }
}

impl FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        Self::parse(s)
    }
}

/// Maps every declared qubit to a flat index in `[0, total)`.
pub(crate) struct QubitLayout {
    offsets: FxHashMap<String, (usize, usize)>,
    total: usize,
}

impl QubitLayout {
    /// Number of declared qubits.
    pub(crate) fn total(&self) -> usize {
        self.total
    }

    /// Flat indices a reference resolves to; empty for unknown registers.
    pub(crate) fn indices(&self, qubit: &QubitRef) -> Range<usize> {
        let Some(&(offset, len)) = self.offsets.get(&qubit.register) else {
            return 0..0;
        };
        match qubit.index {
            Some(i) if (i as usize) < len => {
                let flat = offset + i as usize;
                flat..flat + 1
            }
            Some(_) => 0..0,
            None => offset..offset + len,
        }
    }

    /// Union of flat indices over several references, in first-seen order.
    pub(crate) fn union(&self, qubits: &[QubitRef]) -> Vec<usize> {
        let mut seen = FxHashSet::default();
        qubits
            .iter()
            .flat_map(|q| self.indices(q))
            .filter(|i| seen.insert(*i))
            .collect()
    }
}
