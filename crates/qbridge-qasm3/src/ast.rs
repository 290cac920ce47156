//! Structured statement list for `OpenQASM` programs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Syntactic form of a register declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclStyle {
    /// `qreg q[n];` / `creg c[n];`
    Legacy,
    /// `qubit[n] q;` / `bit[n] c;`
    Modern,
}

/// Syntactic form of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureStyle {
    /// `measure q -> c;`
    Arrow,
    /// `c = measure q;`
    Assign,
    /// `measure q;`
    Bare,
}

/// A statement in a QASM program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement.
    Include(String),

    /// Qubit register declaration.
    QubitDecl {
        name: String,
        size: Option<u32>,
        style: DeclStyle,
    },

    /// Classical bit register declaration.
    BitDecl {
        name: String,
        size: Option<u32>,
        style: DeclStyle,
    },

    /// Gate application.
    Gate(GateCall),

    /// Measurement of qubits into (optional) classical bits.
    Measure {
        qubits: Vec<QubitRef>,
        bits: Vec<BitRef>,
        style: MeasureStyle,
    },

    /// Reset: `reset q[0];`
    Reset { qubits: Vec<QubitRef> },

    /// Barrier: `barrier q;` or `barrier;`
    Barrier { qubits: Vec<QubitRef> },

    /// Conditional: `if (c == 1) x q[0];`
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
    },

    /// Gate definition. The body refers to formal arguments, never registers.
    GateDef {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
        body: Vec<Statement>,
    },
}

impl Statement {
    /// Whether this statement declares a register.
    pub fn is_declaration(&self) -> bool {
        matches!(self, Statement::QubitDecl { .. } | Statement::BitDecl { .. })
    }

    /// Qubit references made directly by this statement (not by nested branches).
    pub fn qubit_refs(&self) -> &[QubitRef] {
        match self {
            Statement::Gate(call) => &call.qubits,
            Statement::Measure { qubits, .. }
            | Statement::Reset { qubits }
            | Statement::Barrier { qubits } => qubits,
            _ => &[],
        }
    }

    /// Mutable access to the qubit references made directly by this statement.
    pub fn qubit_refs_mut(&mut self) -> &mut [QubitRef] {
        match self {
            Statement::Gate(call) => &mut call.qubits,
            Statement::Measure { qubits, .. }
            | Statement::Reset { qubits }
            | Statement::Barrier { qubits } => qubits,
            _ => &mut [],
        }
    }

    /// Visit this statement and every statement nested in conditional branches.
    ///
    /// Gate definition bodies are not visited.
    pub fn walk(&self, f: &mut impl FnMut(&Statement)) {
        f(self);
        if let Statement::If {
            then_body,
            else_body,
            ..
        } = self
        {
            for stmt in then_body.iter().chain(else_body.iter().flatten()) {
                stmt.walk(f);
            }
        }
    }

    /// Mutable counterpart of [`Statement::walk`].
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Statement)) {
        f(self);
        if let Statement::If {
            then_body,
            else_body,
            ..
        } = self
        {
            for stmt in then_body.iter_mut().chain(else_body.iter_mut().flatten()) {
                stmt.walk_mut(f);
            }
        }
    }
}

/// A gate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Gate parameters (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
}

impl GateCall {
    /// Create a parameterless gate call.
    pub fn new(name: impl Into<String>, qubits: Vec<QubitRef>) -> Self {
        Self {
            name: name.into(),
            params: vec![],
            qubits,
        }
    }

    /// Whether this is an identity (no-op) gate.
    pub fn is_identity(&self) -> bool {
        matches!(self.name.as_str(), "id" | "i")
    }
}

/// Reference to a qubit register or one of its elements: `q` or `q[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl QubitRef {
    /// Create a reference to a single qubit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// Reference to a classical bit register or one of its elements: `c` or `c[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl BitRef {
    /// Create a reference to a single bit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

impl fmt::Display for QubitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.register),
            None => write!(f, "{}", self.register),
        }
    }
}

impl fmt::Display for BitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.register),
            None => write!(f, "{}", self.register),
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// Identifier.
    Identifier(String),
    /// Pi constant.
    Pi,
    /// Tau constant (2π).
    Tau,
    /// Euler's number.
    Euler,
    /// Arithmetic negation.
    Neg(Box<Expression>),
    /// Logical not.
    Not(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Function call.
    FnCall { name: String, args: Vec<Expression> },
    /// Index expression: `c[i]`.
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    /// Parenthesized expression.
    Paren(Box<Expression>),
}

impl Expression {
    /// Try to evaluate as a constant f64.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Expression::Int(v) => Some(*v as f64),
            Expression::Float(v) => Some(*v),
            Expression::Pi => Some(std::f64::consts::PI),
            Expression::Tau => Some(std::f64::consts::TAU),
            Expression::Euler => Some(std::f64::consts::E),
            Expression::Neg(e) => e.as_f64().map(|v| -v),
            Expression::BinOp { left, op, right } => {
                let l = left.as_f64()?;
                let r = right.as_f64()?;
                Some(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                    BinOp::Mod => l % r,
                    _ => return None,
                })
            }
            Expression::FnCall { name, args } if args.len() == 1 => {
                let x = args[0].as_f64()?;
                Some(match name.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    "exp" => x.exp(),
                    "sqrt" => x.sqrt(),
                    "ln" => x.ln(),
                    _ => return None,
                })
            }
            Expression::Paren(e) => e.as_f64(),
            _ => None,
        }
    }

    /// Whether the expression mentions `pi`, `tau` or `euler`.
    pub fn uses_named_constant(&self) -> bool {
        match self {
            Expression::Pi | Expression::Tau | Expression::Euler => true,
            Expression::Neg(e) | Expression::Not(e) | Expression::Paren(e) => {
                e.uses_named_constant()
            }
            Expression::BinOp { left, right, .. } => {
                left.uses_named_constant() || right.uses_named_constant()
            }
            Expression::FnCall { args, .. } => args.iter().any(Expression::uses_named_constant),
            Expression::Index { target, index } => {
                target.uses_named_constant() || index.uses_named_constant()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Int(v) => write!(f, "{v}"),
            Expression::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Expression::Float(v) => write!(f, "{v}"),
            Expression::Bool(v) => write!(f, "{v}"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::Pi => write!(f, "pi"),
            Expression::Tau => write!(f, "tau"),
            Expression::Euler => write!(f, "euler"),
            Expression::Neg(e) => write!(f, "-{e}"),
            Expression::Not(e) => write!(f, "!{e}"),
            Expression::BinOp { left, op, right } => write!(f, "{left} {op} {right}"),
            Expression::FnCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expression::Index { target, index } => write!(f, "{target}[{index}]"),
            Expression::Paren(e) => write!(f, "({e})"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        f.write_str(symbol)
    }
}
