//! `INSERT` statement parser over the dump token stream.

use crate::error::{IngestError, Result};

use super::lexer::{Spanned, Token};

/// A literal inside a `VALUES` tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Number(String),
    Null,
    /// Any other expression (keywords such as `TRUE`, function calls), kept as written.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    /// Explicit column list, when the statement has one.
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<SqlValue>>,
    pub line: usize,
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

/// Extracts every `INSERT` statement; all other statements are skipped.
///
/// # Errors
///
/// Returns [`IngestError::SqlParse`] when an `INSERT` statement is malformed.
pub fn parse_inserts(tokens: &[Spanned]) -> Result<Vec<InsertStatement>> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut statements = Vec::new();
    while parser.peek().is_some() {
        if parser.eat_word("INSERT") || parser.eat_word("REPLACE") {
            statements.push(parser.insert()?);
        } else {
            parser.skip_statement();
        }
    }
    Ok(statements)
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |spanned| spanned.line)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|spanned| &spanned.token);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn error(&self, message: impl Into<String>) -> IngestError {
        IngestError::SqlParse {
            line: self.line(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn skip_statement(&mut self) {
        while let Some(token) = self.advance() {
            if *token == Token::Semicolon {
                break;
            }
        }
    }

    fn identifier(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Word(name) | Token::QuotedIdent(name)) => Ok(name.clone()),
            other => {
                let found = format!("{other:?}");
                Err(self.error(format!("expected identifier, found {found}")))
            }
        }
    }

    fn insert(&mut self) -> Result<InsertStatement> {
        let line = self.line();
        for modifier in ["LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY", "IGNORE"] {
            self.eat_word(modifier);
        }
        self.eat_word("INTO");

        // `schema`.`table` keeps only the table part.
        let mut table = self.identifier()?;
        while self.eat(&Token::Symbol('.')) {
            table = self.identifier()?;
        }

        let columns = if self.eat(&Token::LParen) {
            let mut columns = vec![self.identifier()?];
            while self.eat(&Token::Comma) {
                columns.push(self.identifier()?);
            }
            self.expect(&Token::RParen, "')' after column list")?;
            Some(columns)
        } else {
            None
        };

        if !(self.eat_word("VALUES") || self.eat_word("VALUE")) {
            return Err(self.error(format!("expected VALUES, found {:?}", self.peek())));
        }

        let mut rows = vec![self.tuple()?];
        while self.eat(&Token::Comma) {
            rows.push(self.tuple()?);
        }
        // Trailing clauses such as ON DUPLICATE KEY UPDATE are irrelevant here.
        self.skip_statement();

        Ok(InsertStatement {
            table,
            columns,
            rows,
            line,
        })
    }

    fn tuple(&mut self) -> Result<Vec<SqlValue>> {
        self.expect(&Token::LParen, "'(' to open a value tuple")?;
        let mut values = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(values);
        }
        loop {
            values.push(self.value()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, "',' or ')' in value tuple")?;
            return Ok(values);
        }
    }

    fn value(&mut self) -> Result<SqlValue> {
        let value = match self.advance() {
            Some(Token::Str(text)) => SqlValue::Text(text.clone()),
            Some(Token::Number(number)) => SqlValue::Number(number.clone()),
            Some(Token::Symbol(sign @ ('-' | '+'))) => {
                let sign = *sign;
                match self.advance() {
                    Some(Token::Number(number)) if sign == '-' => {
                        SqlValue::Number(format!("-{number}"))
                    }
                    Some(Token::Number(number)) => SqlValue::Number(number.clone()),
                    _ => return Err(self.error("expected number after sign")),
                }
            }
            Some(Token::Word(word)) if word.eq_ignore_ascii_case("NULL") => SqlValue::Null,
            Some(Token::Word(word)) => {
                let word = word.clone();
                if self.peek() == Some(&Token::LParen) {
                    self.skip_group();
                    SqlValue::Other(format!("{word}()"))
                } else {
                    SqlValue::Other(word)
                }
            }
            other => {
                let found = format!("{other:?}");
                return Err(self.error(format!("unexpected {found} in value tuple")));
            }
        };
        Ok(value)
    }

    /// Consumes a balanced parenthesized group starting at the current `(`.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.advance() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}
