//! Parser for `OpenQASM` 2 and 3 programs.

mod expression;
mod statement;

use crate::ast::Statement;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Version header and statement list, before semantic validation.
pub(crate) struct ParsedSource {
    pub(crate) version: Option<String>,
    pub(crate) statements: Vec<Statement>,
}

/// Parse a QASM source string into its statement list.
pub(crate) fn parse_source(source: &str) -> ParseResult<ParsedSource> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Parser state.
pub(super) struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let mut tokens = Vec::new();

        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, line, message)) => {
                    return Err(ParseError::LexerError {
                        line,
                        position: span.start,
                        message,
                    });
                }
            }
        }

        Ok(Self { tokens, pos: 0 })
    }

    /// Line of the current token (or of the last one at end of input).
    pub(super) fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(expected.to_string()))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Build an "unexpected token" error for the given token.
    pub(super) fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<ParsedSource> {
        let version = if self.consume(&Token::OpenQasm) {
            let version = self.parse_version()?;
            self.expect(Token::Semicolon)?;
            Some(version)
        } else {
            None
        };

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(ParsedSource {
            version,
            statements,
        })
    }

    /// Parse version number, keeping the written form (`3` stays `3`).
    fn parse_version(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::FloatLiteral(v)) => Ok(format!("{v:?}")),
            Some(Token::IntLiteral(v)) => Ok(v.to_string()),
            Some(other) => Err(ParseError::InvalidVersion(other.to_string())),
            None => Err(ParseError::UnexpectedEof("version number".into())),
        }
    }

    /// Parse identifier list.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => {
                self.pos -= 1;
                Err(self.unexpected("identifier", &other))
            }
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an integer literal that must fit a register size or index.
    pub(super) fn parse_u32(&mut self) -> ParseResult<u32> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => u32::try_from(v).map_err(|_| ParseError::IntegerOverflow(v)),
            Some(other) => {
                self.pos -= 1;
                Err(self.unexpected("integer", &other))
            }
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DeclStyle, MeasureStyle, QubitRef};

    #[test]
    fn test_parse_bell_state() {
        let source = r"
            OPENQASM 3.0;
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
        ";

        let parsed = parse_source(source).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("3.0"));
        assert_eq!(parsed.statements.len(), 5);
        assert!(matches!(
            parsed.statements[4],
            Statement::Measure {
                style: MeasureStyle::Assign,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_legacy_declarations() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[3];
            creg c[3];
            measure q[0] -> c[0];
        "#;

        let parsed = parse_source(source).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("2.0"));
        assert_eq!(
            parsed.statements[1],
            Statement::QubitDecl {
                name: "q".into(),
                size: Some(3),
                style: DeclStyle::Legacy,
            }
        );
        assert!(matches!(
            &parsed.statements[3],
            Statement::Measure { qubits, style: MeasureStyle::Arrow, .. }
                if qubits == &vec![QubitRef::single("q", 0)]
        ));
    }

    #[test]
    fn test_integer_version_kept() {
        let parsed = parse_source("OPENQASM 3; qubit q;").unwrap();
        assert_eq!(parsed.version.as_deref(), Some("3"));
    }

    #[test]
    fn test_missing_header_is_accepted() {
        let parsed = parse_source("qubit[1] q; x q[0];").unwrap();
        assert!(parsed.version.is_none());
        assert_eq!(parsed.statements.len(), 2);
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse_source("OPENQASM 3;\nqubit[2] q;\nh q[0]\n").err().unwrap();
        assert!(matches!(err, ParseError::UnexpectedEof(_)));

        let err = parse_source("OPENQASM 3;\nqubit[2] q;\nh q[0] q[1];").err().unwrap();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 3, .. }));
    }

    #[test]
    fn test_oversized_literal() {
        let err = parse_source("qubit[99999999999] q;").err().unwrap();
        assert_eq!(err, ParseError::IntegerOverflow(99_999_999_999));
    }
}
