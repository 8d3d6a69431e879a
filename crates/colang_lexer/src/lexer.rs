//! The lexer implementation for CO.

use crate::{Token, TokenKind};
use colang_diag::{FileId, Issue, IssueCode, SourceSpan};
use std::str::Chars;

/// Tokenizes an entire source file.
///
/// The lexer is total: any input produces a token stream terminated by a
/// zero-width [`TokenKind::Eof`] token, with lexical problems reported as
/// issues rather than failures.
pub fn tokenize(file: FileId, source: &str) -> (Vec<Token>, Vec<Issue>) {
    let mut lexer = Lexer::new(file, source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    (tokens, lexer.issues)
}

struct Lexer<'a> {
    file: FileId,
    chars: Chars<'a>,
    line: u32,
    col: u32,
    current: Option<char>,
    issues: Vec<Issue>,
}

impl<'a> Lexer<'a> {
    fn new(file: FileId, source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            file,
            chars,
            line: 0,
            col: 0,
            current,
            issues: Vec::new(),
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let start = self.position();

            let kind = match self.current {
                None => TokenKind::Eof,

                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.lex_ident_or_keyword(),

                Some(c) if c.is_ascii_digit() => self.lex_number(),

                Some('"') => self.lex_string(start),

                Some(c) => match self.lex_punctuation(c) {
                    Some(kind) => kind,
                    None => {
                        // Unknown character: report it and resume at the next
                        // plausible token boundary.
                        self.issues.push(Issue::error(
                            IssueCode::BadCharacter,
                            self.span_from(start),
                            format!("unexpected character '{}'", c),
                        ));
                        continue;
                    }
                },
            };

            return Token::new(kind, self.span_from(start));
        }
    }

    fn position(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    fn span_from(&self, start: (u32, u32)) -> SourceSpan {
        SourceSpan::new(self.file, start.0, start.1, self.line, self.col)
    }

    /// Advances to the next character and returns the current one.
    fn advance(&mut self) -> Option<char> {
        let current = self.current;
        if let Some(c) = current {
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
            self.current = self.chars.next();
        }
        current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn check(&self, expected: char) -> bool {
        self.current == Some(expected)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.current {
                Some(' ' | '\t' | '\n' | '\r') => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.current.is_some() && self.current != Some('\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.advance(); // /
                    self.advance(); // *
                    loop {
                        match (self.current, self.peek_next()) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => {
                                self.advance();
                            }
                            (None, _) => break, // Unterminated comment
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let mut ident = String::new();
        while let Some(c) = self.current {
            if c.is_ascii_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::keyword(&ident).unwrap_or(TokenKind::Ident(ident))
    }

    fn lex_number(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.current {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.check('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(c) = self.current {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return TokenKind::FloatLiteral(text.parse().unwrap_or(0.0));
        }

        TokenKind::IntLiteral(text.parse().unwrap_or(0))
    }

    fn lex_string(&mut self, start: (u32, u32)) -> TokenKind {
        self.advance(); // Opening "
        let mut value = String::new();

        loop {
            match self.current {
                None | Some('\n') => {
                    self.issues.push(Issue::error(
                        IssueCode::UnterminatedString,
                        self.span_from(start),
                        "unterminated string literal",
                    ));
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current {
                        Some('n') => value.push('\n'),
                        Some('r') => value.push('\r'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('0') => value.push('\0'),
                        Some(c) => value.push(c),
                        None => continue,
                    }
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        TokenKind::StringLiteral(value)
    }

    fn lex_punctuation(&mut self, c: char) -> Option<TokenKind> {
        let kind = match c {
            '+' => {
                self.advance();
                if self.match_char('+') {
                    TokenKind::PlusPlus
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                self.advance();
                TokenKind::Minus
            }
            '*' => {
                self.advance();
                TokenKind::Star
            }
            '/' => {
                self.advance();
                TokenKind::Slash
            }
            '%' => {
                self.advance();
                TokenKind::Percent
            }
            '=' => {
                self.advance();
                if self.match_char('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                self.advance();
                if self.match_char('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                self.advance();
                if self.match_char('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                self.advance();
                if self.match_char('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                self.advance();
                if self.match_char('&') {
                    TokenKind::AndAnd
                } else {
                    return None;
                }
            }
            '|' => {
                self.advance();
                if self.match_char('|') {
                    TokenKind::OrOr
                } else {
                    return None;
                }
            }
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '[' => {
                self.advance();
                TokenKind::LBracket
            }
            ']' => {
                self.advance();
                TokenKind::RBracket
            }
            '{' => {
                self.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.advance();
                TokenKind::RBrace
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '.' => {
                self.advance();
                TokenKind::Dot
            }
            ';' => {
                self.advance();
                TokenKind::Semi
            }
            _ => {
                self.advance();
                return None;
            }
        };
        Some(kind)
    }
}
