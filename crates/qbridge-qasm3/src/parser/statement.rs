//! Statement parsing.

use super::Parser;
use crate::ast::{BitRef, DeclStyle, GateCall, MeasureStyle, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::Qubit => self.parse_modern_decl(true),
            Token::Bit => self.parse_modern_decl(false),
            Token::Qreg => self.parse_legacy_decl(true),
            Token::Creg => self.parse_legacy_decl(false),
            Token::Measure => self.parse_measure(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::If => self.parse_if(),
            Token::Gate => self.parse_gate_def(),
            Token::Identifier(_) => self.parse_identifier_statement(),
            _ => Err(self.unexpected("statement", &token)),
        }
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => {
                self.pos -= 1;
                return Err(self.unexpected("string literal", &other));
            }
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse `qubit[n] name;`, `qubit name;`, `bit[n] name;` or `bit name;`.
    fn parse_modern_decl(&mut self, quantum: bool) -> ParseResult<Statement> {
        self.advance();

        let size = if self.consume(&Token::LBracket) {
            let size = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(size)
        } else {
            None
        };

        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;

        Ok(declaration(quantum, name, size, DeclStyle::Modern))
    }

    /// Parse `qreg name[n];` or `creg name[n];`.
    fn parse_legacy_decl(&mut self, quantum: bool) -> ParseResult<Statement> {
        self.advance();

        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_u32()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;

        Ok(declaration(quantum, name, Some(size), DeclStyle::Legacy))
    }

    /// Parse `measure q -> c;` or bare `measure q;`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;

        let qubits = self.parse_qubit_refs()?;

        let (bits, style) = if self.consume(&Token::Arrow) {
            (self.parse_bit_refs()?, MeasureStyle::Arrow)
        } else {
            (vec![], MeasureStyle::Bare)
        };

        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure {
            qubits,
            bits,
            style,
        })
    }

    /// Parse reset statement.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Reset)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Reset { qubits })
    }

    /// Parse barrier statement.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qubit_refs()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// Parse if statement.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;

        let then_body = self.parse_block_or_statement()?;

        let else_body = if self.consume(&Token::Else) {
            Some(self.parse_block_or_statement()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    /// Parse gate definition.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let p = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_identifier_list()?;

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            body.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;

        Ok(Statement::GateDef {
            name,
            params,
            qubits,
            body,
        })
    }

    /// Parse statement starting with identifier (gate call or measurement assignment).
    fn parse_identifier_statement(&mut self) -> ParseResult<Statement> {
        let name = self.parse_identifier()?;

        if self.check(&Token::Eq) || self.check(&Token::LBracket) {
            return self.parse_measure_assignment(name);
        }

        self.parse_gate_call(name)
    }

    /// Parse `c = measure q;` or `c[i] = measure q[j];`.
    fn parse_measure_assignment(&mut self, target: String) -> ParseResult<Statement> {
        let index = if self.consume(&Token::LBracket) {
            let idx = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(idx)
        } else {
            None
        };

        self.expect(Token::Eq)?;
        self.expect(Token::Measure)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure {
            qubits,
            bits: vec![BitRef {
                register: target,
                index,
            }],
            style: MeasureStyle::Assign,
        })
    }

    /// Parse gate call.
    fn parse_gate_call(&mut self, name: String) -> ParseResult<Statement> {
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    /// Parse a block or single statement.
    pub(super) fn parse_block_or_statement(&mut self) -> ParseResult<Vec<Statement>> {
        if self.consume(&Token::LBrace) {
            let mut stmts = Vec::new();
            while !self.check(&Token::RBrace) {
                stmts.push(self.parse_statement()?);
            }
            self.expect(Token::RBrace)?;
            Ok(stmts)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse qubit references.
    fn parse_qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_qubit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single qubit reference.
    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let (register, index) = self.parse_indexed_name()?;
        Ok(QubitRef { register, index })
    }

    /// Parse bit references.
    fn parse_bit_refs(&mut self) -> ParseResult<Vec<BitRef>> {
        let mut refs = vec![self.parse_bit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_bit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single bit reference.
    fn parse_bit_ref(&mut self) -> ParseResult<BitRef> {
        let (register, index) = self.parse_indexed_name()?;
        Ok(BitRef { register, index })
    }

    /// Parse `name` or `name[i]`.
    fn parse_indexed_name(&mut self) -> ParseResult<(String, Option<u32>)> {
        let register = self.parse_identifier()?;

        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };

        Ok((register, index))
    }
}

fn declaration(quantum: bool, name: String, size: Option<u32>, style: DeclStyle) -> Statement {
    if quantum {
        Statement::QubitDecl { name, size, style }
    } else {
        Statement::BitDecl { name, size, style }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_source;
    use crate::ast::{Expression, Statement};

    fn statements(source: &str) -> Vec<Statement> {
        parse_source(source).unwrap().statements
    }

    #[test]
    fn test_parameterized_gate() {
        let stmts = statements("qubit q; rx(pi/2) q; u(0.1, 0.2, 0.3) q;");
        let Statement::Gate(call) = &stmts[1] else {
            panic!("expected gate call");
        };
        assert_eq!(call.name, "rx");
        assert_eq!(call.params.len(), 1);

        let Statement::Gate(call) = &stmts[2] else {
            panic!("expected gate call");
        };
        assert_eq!(call.params.len(), 3);
    }

    #[test]
    fn test_conditional() {
        let stmts = statements("qreg q[1]; creg c[1]; if (c == 1) x q[0];");
        let Statement::If {
            condition,
            then_body,
            else_body,
        } = &stmts[2]
        else {
            panic!("expected conditional");
        };
        assert!(matches!(condition, Expression::BinOp { .. }));
        assert_eq!(then_body.len(), 1);
        assert!(else_body.is_none());
    }

    #[test]
    fn test_conditional_block_with_else() {
        let stmts = statements("qubit[2] q; bit[2] c; if (c[0] == 1) { x q[0]; x q[1]; } else z q[0];");
        let Statement::If {
            then_body,
            else_body,
            ..
        } = &stmts[2]
        else {
            panic!("expected conditional");
        };
        assert_eq!(then_body.len(), 2);
        assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_gate_definition() {
        let stmts = statements("gate custom(theta) a, b { rz(theta) a; cx a, b; } qubit[2] q; custom(0.5) q[0], q[1];");
        let Statement::GateDef {
            name,
            params,
            qubits,
            body,
        } = &stmts[0]
        else {
            panic!("expected gate definition");
        };
        assert_eq!(name, "custom");
        assert_eq!(params, &vec!["theta".to_string()]);
        assert_eq!(qubits.len(), 2);
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_barrier_forms() {
        let stmts = statements("qubit[2] q; barrier; barrier q; barrier q[0], q[1];");
        assert_eq!(stmts[1].qubit_refs().len(), 0);
        assert_eq!(stmts[2].qubit_refs().len(), 1);
        assert_eq!(stmts[3].qubit_refs().len(), 2);
    }

    #[test]
    fn test_indexed_measure_assignment() {
        let stmts = statements("qubit[2] q; bit[2] c; c[1] = measure q[0];");
        let Statement::Measure { qubits, bits, .. } = &stmts[2] else {
            panic!("expected measurement");
        };
        assert_eq!(qubits[0].index, Some(0));
        assert_eq!(bits[0].index, Some(1));
    }

    #[test]
    fn test_classical_assignment_is_rejected() {
        assert!(parse_source("bit c; c = 1;").is_err());
    }
}
