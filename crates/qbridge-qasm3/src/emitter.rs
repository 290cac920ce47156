//! QASM emitter for serializing a program's statement list.

use crate::ast::{DeclStyle, MeasureStyle, Statement};
use crate::program::Program;

/// Emit a program as QASM source code.
pub fn emit(program: &Program) -> String {
    let mut emitter = Emitter::new();
    if let Some(version) = program.version() {
        emitter.writeln(&format!("OPENQASM {version};"));
    }
    for stmt in program.statements() {
        emitter.emit_statement(stmt);
    }
    emitter.output
}

/// QASM emitter.
struct Emitter {
    output: String,
    indent: usize,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn emit_statement(&mut self, stmt: &Statement) {
        let line = match stmt {
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                self.emit_conditional(&format!("if ({condition})"), then_body);
                if let Some(else_body) = else_body {
                    self.emit_conditional("else", else_body);
                }
                return;
            }
            Statement::GateDef {
                name,
                params,
                qubits,
                body,
            } => {
                let header = if params.is_empty() {
                    format!("gate {name} {}", qubits.join(", "))
                } else {
                    format!("gate {name}({}) {}", params.join(", "), qubits.join(", "))
                };
                self.emit_block(&header, body);
                return;
            }
            other => inline(other),
        };
        self.writeln(&line);
    }

    /// Emit a branch: single statements stay on the header line.
    fn emit_conditional(&mut self, header: &str, body: &[Statement]) {
        match body {
            [single] if !matches!(single, Statement::If { .. } | Statement::GateDef { .. }) => {
                self.writeln(&format!("{header} {}", inline(single)));
            }
            _ => self.emit_block(header, body),
        }
    }

    fn emit_block(&mut self, header: &str, body: &[Statement]) {
        self.writeln(&format!("{header} {{"));
        self.indent += 1;
        for stmt in body {
            self.emit_statement(stmt);
        }
        self.indent -= 1;
        self.writeln("}");
    }

    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Render a statement that fits on one line.
fn inline(stmt: &Statement) -> String {
    match stmt {
        Statement::Include(path) => format!("include \"{path}\";"),
        Statement::QubitDecl { name, size, style } => match (style, size) {
            (DeclStyle::Legacy, Some(n)) => format!("qreg {name}[{n}];"),
            (DeclStyle::Legacy, None) => format!("qreg {name}[1];"),
            (DeclStyle::Modern, Some(n)) => format!("qubit[{n}] {name};"),
            (DeclStyle::Modern, None) => format!("qubit {name};"),
        },
        Statement::BitDecl { name, size, style } => match (style, size) {
            (DeclStyle::Legacy, Some(n)) => format!("creg {name}[{n}];"),
            (DeclStyle::Legacy, None) => format!("creg {name}[1];"),
            (DeclStyle::Modern, Some(n)) => format!("bit[{n}] {name};"),
            (DeclStyle::Modern, None) => format!("bit {name};"),
        },
        Statement::Gate(call) => {
            let qubits = join(&call.qubits);
            if call.params.is_empty() {
                format!("{} {qubits};", call.name)
            } else {
                format!("{}({}) {qubits};", call.name, join(&call.params))
            }
        }
        Statement::Measure {
            qubits,
            bits,
            style,
        } => match style {
            _ if bits.is_empty() => format!("measure {};", join(qubits)),
            MeasureStyle::Assign => format!("{} = measure {};", join(bits), join(qubits)),
            MeasureStyle::Arrow | MeasureStyle::Bare => {
                format!("measure {} -> {};", join(qubits), join(bits))
            }
        },
        Statement::Reset { qubits } => format!("reset {};", join(qubits)),
        Statement::Barrier { qubits } if qubits.is_empty() => "barrier;".into(),
        Statement::Barrier { qubits } => format!("barrier {};", join(qubits)),
        Statement::If { .. } | Statement::GateDef { .. } => {
            let mut emitter = Emitter::new();
            emitter.emit_statement(stmt);
            emitter.output.trim_end().to_string()
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
