//! The immutable token cursor strategies operate on.

use colang_diag::SourceSpan;
use colang_lexer::{Token, TokenKind};

/// A read position in a token stream.
///
/// Cursors are `Copy`: a strategy that declines simply drops its advanced
/// copy and the caller's cursor is untouched. The underlying slice must be
/// terminated by an [`TokenKind::Eof`] token, which the cursor never steps
/// past.
#[derive(Clone, Copy)]
pub struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "token stream must end with Eof"
        );
        Self { tokens, pos: 0 }
    }

    /// The current token.
    pub fn peek(&self) -> &'t Token {
        &self.tokens[self.pos]
    }

    /// The current token's kind.
    pub fn kind(&self) -> &'t TokenKind {
        &self.peek().kind
    }

    /// The current token's span.
    pub fn span(&self) -> SourceSpan {
        self.peek().span
    }

    pub fn at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the current token and the cursor advanced past it.
    pub fn bump(self) -> (&'t Token, Cursor<'t>) {
        let token = self.peek();
        (token, self.skip_one())
    }

    /// The cursor advanced by one token (saturating at Eof).
    pub fn skip_one(self) -> Cursor<'t> {
        if self.at_end() {
            self
        } else {
            Cursor {
                tokens: self.tokens,
                pos: self.pos + 1,
            }
        }
    }

    /// True if the current token has the same kind (ignoring payload).
    pub fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    /// The zero-width span of the gap before the current token: right after
    /// the previously consumed token, or at the current token's start when
    /// nothing has been consumed yet. This is where "missing X" diagnostics
    /// and synthesized placeholder nodes live.
    pub fn gap_span(&self) -> SourceSpan {
        match self.pos.checked_sub(1).and_then(|p| self.tokens.get(p)) {
            Some(prev) => prev.span.after(),
            None => self.span().before(),
        }
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cursor({} @ {:?})", self.pos, self.kind())
    }
}
