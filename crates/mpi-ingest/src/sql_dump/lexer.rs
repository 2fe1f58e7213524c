//! Tokenizer for MySQL-style dump files.
//!
//! Only the subset needed to read `INSERT` statements is distinguished; every
//! other character becomes a [`Token::Symbol`] so unrelated statements
//! (`CREATE TABLE`, `LOCK TABLES`, ...) tokenize without errors.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: keyword, identifier or `NULL`.
    Word(String),
    /// Backtick-quoted identifier.
    QuotedIdent(String),
    /// Single- or double-quoted string literal with escapes resolved.
    Str(String),
    Number(String),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Symbol(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    /// One-based line the token starts on.
    pub line: usize,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

/// Tokenizes a whole dump.
///
/// # Errors
///
/// Returns [`IngestError::SqlLex`] for unterminated strings, quoted
/// identifiers or block comments.
pub fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let mut lexer = Lexer {
        chars: text.chars().peekable(),
        line: 1,
    };
    let mut tokens = Vec::new();
    while let Some(spanned) = lexer.next_token()? {
        tokens.push(spanned);
    }
    Ok(tokens)
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn error(&self, line: usize, message: &str) -> IngestError {
        IngestError::SqlLex {
            line,
            message: message.to_string(),
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>> {
        loop {
            let Some(&ch) = self.chars.peek() else {
                return Ok(None);
            };
            let line = self.line;
            let token = match ch {
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    self.skip_line();
                    continue;
                }
                '-' => {
                    self.bump();
                    if self.chars.peek() == Some(&'-') {
                        self.skip_line();
                        continue;
                    }
                    Token::Symbol('-')
                }
                '/' => {
                    self.bump();
                    if self.chars.peek() == Some(&'*') {
                        self.bump();
                        self.skip_block_comment(line)?;
                        continue;
                    }
                    Token::Symbol('/')
                }
                '\'' | '"' => {
                    self.bump();
                    Token::Str(self.quoted(ch, line)?)
                }
                '`' => {
                    self.bump();
                    Token::QuotedIdent(self.backtick(line)?)
                }
                '(' => {
                    self.bump();
                    Token::LParen
                }
                ')' => {
                    self.bump();
                    Token::RParen
                }
                ',' => {
                    self.bump();
                    Token::Comma
                }
                ';' => {
                    self.bump();
                    Token::Semicolon
                }
                c if c.is_ascii_digit() => Token::Number(self.number()),
                c if c.is_alphanumeric() || c == '_' || c == '$' => Token::Word(self.word()),
                other => {
                    self.bump();
                    Token::Symbol(other)
                }
            };
            return Ok(Some(Spanned { token, line }));
        }
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.bump() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, line: usize) -> Result<()> {
        let mut previous = '\0';
        while let Some(ch) = self.bump() {
            if previous == '*' && ch == '/' {
                return Ok(());
            }
            previous = ch;
        }
        Err(self.error(line, "unterminated block comment"))
    }

    fn quoted(&mut self, quote: char, line: usize) -> Result<String> {
        let mut value = String::new();
        while let Some(ch) = self.bump() {
            match ch {
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        break;
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        'Z' => '\u{1a}',
                        other => other,
                    });
                }
                c if c == quote => {
                    if self.chars.peek() == Some(&quote) {
                        self.bump();
                        value.push(quote);
                    } else {
                        return Ok(value);
                    }
                }
                c => value.push(c),
            }
        }
        Err(self.error(line, "unterminated string literal"))
    }

    fn backtick(&mut self, line: usize) -> Result<String> {
        let mut value = String::new();
        while let Some(ch) = self.bump() {
            if ch == '`' {
                if self.chars.peek() == Some(&'`') {
                    self.bump();
                    value.push('`');
                } else {
                    return Ok(value);
                }
            } else {
                value.push(ch);
            }
        }
        Err(self.error(line, "unterminated quoted identifier"))
    }

    fn number(&mut self) -> String {
        let mut value = String::new();
        while let Some(&ch) = self.chars.peek() {
            let exponent_sign =
                (ch == '-' || ch == '+') && value.ends_with(['e', 'E']);
            if ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E' || exponent_sign {
                value.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        value
    }

    fn word(&mut self) -> String {
        let mut value = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text)
            .expect("tokenize")
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn tokenizes_insert_tuple() {
        assert_eq!(
            kinds("INSERT INTO `Pacientes` VALUES (\"Ana\",'O''Brien',-3,NULL);"),
            vec![
                Token::Word("INSERT".into()),
                Token::Word("INTO".into()),
                Token::QuotedIdent("Pacientes".into()),
                Token::Word("VALUES".into()),
                Token::LParen,
                Token::Str("Ana".into()),
                Token::Comma,
                Token::Str("O'Brien".into()),
                Token::Comma,
                Token::Symbol('-'),
                Token::Number("3".into()),
                Token::Comma,
                Token::Word("NULL".into()),
                Token::RParen,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn resolves_backslash_escapes() {
        assert_eq!(
            kinds(r#"'Calle \"5\", Col. Roma\n'"#),
            vec![Token::Str("Calle \"5\", Col. Roma\n".into())]
        );
    }

    #[test]
    fn skips_comments_and_tracks_lines() {
        let tokens = tokenize("-- header\n/* block\ncomment */\n# hash\nSELECT 1;").expect("tokenize");
        assert_eq!(tokens[0].token, Token::Word("SELECT".into()));
        assert_eq!(tokens[0].line, 5);
        assert_eq!(tokens[1].token, Token::Number("1".into()));
    }

    #[test]
    fn unterminated_string_reports_start_line() {
        let err = tokenize("\n\nVALUES ('abc").unwrap_err();
        assert!(matches!(err, IngestError::SqlLex { line: 3, .. }));
    }
}
