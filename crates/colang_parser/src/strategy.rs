//! The reusable parsing combinators: strategies, unions, groups and
//! sequences.

use crate::Cursor;
use colang_ast::Ident;
use colang_diag::{Issue, IssueCode, SourceSpan};
use colang_lexer::{Token, TokenKind};

/// The three-way result of applying a strategy.
#[derive(Debug)]
pub enum Outcome<'t, T> {
    /// A node was produced, possibly with recovered-from issues.
    Success {
        node: T,
        issues: Vec<Issue>,
        rest: Cursor<'t>,
    },
    /// The strategy committed (its anchor matched) but the node could not be
    /// completed; the cursor has advanced past the attempted region.
    Malformed { issues: Vec<Issue>, rest: Cursor<'t> },
    /// The strategy did not commit: cursor unchanged, no issues.
    NoMatch,
}

impl<'t, T> Outcome<'t, T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<'t, U> {
        match self {
            Outcome::Success { node, issues, rest } => Outcome::Success {
                node: f(node),
                issues,
                rest,
            },
            Outcome::Malformed { issues, rest } => Outcome::Malformed { issues, rest },
            Outcome::NoMatch => Outcome::NoMatch,
        }
    }
}

/// A parsing operation over an immutable cursor.
pub trait Strategy<'t> {
    type Out;

    fn apply(&self, cursor: Cursor<'t>) -> Outcome<'t, Self::Out>;
}

impl<'t, T, F> Strategy<'t> for F
where
    F: Fn(Cursor<'t>) -> Outcome<'t, T>,
{
    type Out = T;

    fn apply(&self, cursor: Cursor<'t>) -> Outcome<'t, T> {
        self(cursor)
    }
}

/// A strategy matching exactly one token of the given kind (payload
/// ignored).
pub fn token<'t>(kind: TokenKind) -> impl Strategy<'t, Out = &'t Token> {
    move |cursor: Cursor<'t>| {
        if cursor.is(&kind) {
            let (token, rest) = cursor.bump();
            Outcome::Success {
                node: token,
                issues: Vec::new(),
                rest,
            }
        } else {
            Outcome::NoMatch
        }
    }
}

/// A strategy matching one identifier token.
pub fn ident<'t>() -> impl Strategy<'t, Out = Ident> {
    |cursor: Cursor<'t>| match cursor.kind() {
        TokenKind::Ident(name) => {
            let (token, rest) = cursor.bump();
            Outcome::Success {
                node: Ident::new(name.clone(), token.span),
                issues: Vec::new(),
                rest,
            }
        }
        _ => Outcome::NoMatch,
    }
}

/// An ordered list of alternatives: the first strategy that does not return
/// `NoMatch` decides the outcome. Ordering is what disambiguates the grammar.
pub struct StrategyUnion<T: 'static> {
    strategies: &'static [for<'t> fn(Cursor<'t>) -> Outcome<'t, T>],
}

impl<T> StrategyUnion<T> {
    pub const fn new(strategies: &'static [for<'t> fn(Cursor<'t>) -> Outcome<'t, T>]) -> Self {
        Self { strategies }
    }

    pub fn apply<'t>(&self, cursor: Cursor<'t>) -> Outcome<'t, T> {
        for strategy in self.strategies {
            match strategy(cursor) {
                Outcome::NoMatch => continue,
                other => return other,
            }
        }
        Outcome::NoMatch
    }
}

/// Parses a fixed sequence of elements making up one production.
///
/// Elements are consumed in order and classified by the method used:
/// *defining* elements decide whether this production applies at all (absence
/// makes the whole group `NoMatch`), *required* elements emit a "missing X"
/// issue when absent (turning the group `Malformed` unless a placeholder is
/// synthesized), and *optional* elements are silent either way. A required
/// element can additionally stop the group, suppressing missing-token errors
/// for everything after the first structural failure.
pub struct Group<'t> {
    cursor: Cursor<'t>,
    issues: Vec<Issue>,
    no_match: bool,
    stopped: bool,
}

impl<'t> Group<'t> {
    pub fn new(cursor: Cursor<'t>) -> Self {
        Self {
            cursor,
            issues: Vec::new(),
            no_match: false,
            stopped: false,
        }
    }

    fn active(&self) -> bool {
        !self.no_match && !self.stopped
    }

    fn absorb<S: Strategy<'t>>(&mut self, strategy: &S) -> Option<Option<S::Out>> {
        match strategy.apply(self.cursor) {
            Outcome::Success { node, issues, rest } => {
                self.issues.extend(issues);
                self.cursor = rest;
                Some(Some(node))
            }
            Outcome::Malformed { issues, rest } => {
                self.issues.extend(issues);
                self.cursor = if rest.pos() == self.cursor.pos() {
                    rest.skip_one()
                } else {
                    rest
                };
                Some(None)
            }
            Outcome::NoMatch => None,
        }
    }

    /// An element whose absence means this production is not the one being
    /// parsed.
    pub fn defining<S: Strategy<'t>>(&mut self, strategy: &S) -> Option<S::Out> {
        if !self.active() {
            return None;
        }
        match self.absorb(strategy) {
            Some(node) => node,
            None => {
                self.no_match = true;
                None
            }
        }
    }

    /// An element that must be present once the group has committed.
    pub fn required<S: Strategy<'t>>(&mut self, strategy: &S, what: &str) -> Option<S::Out> {
        if !self.active() {
            return None;
        }
        match self.absorb(strategy) {
            Some(node) => node,
            None => {
                self.missing(what);
                None
            }
        }
    }

    /// Like [`Group::required`], but a missing element is replaced by a
    /// synthesized placeholder instead of failing the group.
    pub fn required_or<S: Strategy<'t>>(
        &mut self,
        strategy: &S,
        what: &str,
        synthesize: impl FnOnce(SourceSpan) -> S::Out,
    ) -> Option<S::Out> {
        if !self.active() {
            return None;
        }
        match self.absorb(strategy) {
            Some(node) => node,
            None => {
                let span = self.cursor.gap_span();
                self.missing(what);
                Some(synthesize(span))
            }
        }
    }

    /// Like [`Group::required`], but when absent the remaining elements are
    /// skipped without further missing-token errors.
    pub fn required_stop<S: Strategy<'t>>(&mut self, strategy: &S, what: &str) -> Option<S::Out> {
        if !self.active() {
            return None;
        }
        match self.absorb(strategy) {
            Some(node) => node,
            None => {
                self.missing(what);
                self.stopped = true;
                None
            }
        }
    }

    /// An element that may be absent without comment.
    pub fn optional<S: Strategy<'t>>(&mut self, strategy: &S) -> Option<S::Out> {
        if !self.active() {
            return None;
        }
        self.absorb(strategy).flatten()
    }

    /// Forces the whole group to `NoMatch`, as if a defining element were
    /// absent.
    pub fn reject(&mut self) {
        self.no_match = true;
    }

    /// Records an issue against the production being parsed.
    pub fn issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn cursor(&self) -> Cursor<'t> {
        self.cursor
    }

    fn missing(&mut self, what: &str) {
        self.issues.push(Issue::error(
            IssueCode::MissingToken,
            self.cursor.gap_span(),
            format!("missing {what}"),
        ));
    }

    /// Closes the group. `node` should be `Some` whenever the caller managed
    /// to build a node from the collected elements.
    pub fn finish<T>(self, node: Option<T>) -> Outcome<'t, T> {
        if self.no_match {
            return Outcome::NoMatch;
        }
        match node {
            Some(node) => Outcome::Success {
                node,
                issues: self.issues,
                rest: self.cursor,
            },
            None => Outcome::Malformed {
                issues: self.issues,
                rest: self.cursor,
            },
        }
    }
}

/// Repeats an element strategy until it declines, recovering from malformed
/// elements by keeping their issues and continuing.
pub fn sequence<'t, S: Strategy<'t>>(
    strategy: &S,
    mut cursor: Cursor<'t>,
) -> (Vec<S::Out>, Vec<Issue>, Cursor<'t>) {
    let mut items = Vec::new();
    let mut issues = Vec::new();
    loop {
        match strategy.apply(cursor) {
            Outcome::Success {
                node,
                issues: inner,
                rest,
            } => {
                items.push(node);
                issues.extend(inner);
                if rest.pos() == cursor.pos() {
                    break;
                }
                cursor = rest;
            }
            Outcome::Malformed {
                issues: inner,
                rest,
            } => {
                issues.extend(inner);
                cursor = if rest.pos() == cursor.pos() {
                    rest.skip_one()
                } else {
                    rest
                };
            }
            Outcome::NoMatch => break,
        }
    }
    (items, issues, cursor)
}

/// The result of an enclosed sequence: the parsed items plus the spans of the
/// whole construct and of its (possibly synthesized) closing token.
pub struct EnclosedSeq<T> {
    pub items: Vec<T>,
    pub span: SourceSpan,
    pub close_span: SourceSpan,
}

/// Parses `open elem (sep elem)* close`, or `open elem* close` when no
/// separator is given.
///
/// Declines only when the opening token is absent. Once the opener has been
/// consumed the result is always `Success`: junk tokens inside are reported
/// and skipped, and a missing closer is synthesized as a zero-width span
/// immediately after the last element (or after the opener for an empty
/// body), with an "expected closing X" error.
pub fn enclosed<'t, S: Strategy<'t>>(
    cursor: Cursor<'t>,
    open: TokenKind,
    close: TokenKind,
    separator: Option<TokenKind>,
    strategy: &S,
) -> Outcome<'t, EnclosedSeq<S::Out>> {
    if !cursor.is(&open) {
        return Outcome::NoMatch;
    }
    let (open_token, mut cursor) = cursor.bump();
    let open_span = open_token.span;

    let mut items = Vec::new();
    let mut issues = Vec::new();

    let close_span = loop {
        if cursor.is(&close) {
            let (token, rest) = cursor.bump();
            cursor = rest;
            break token.span;
        }
        if cursor.at_end() {
            let span = cursor.gap_span();
            issues.push(Issue::error(
                IssueCode::MissingToken,
                span,
                format!("expected closing '{}'", close.as_str()),
            ));
            break span;
        }

        match strategy.apply(cursor) {
            Outcome::Success {
                node,
                issues: inner,
                rest,
            } => {
                items.push(node);
                issues.extend(inner);
                cursor = if rest.pos() == cursor.pos() {
                    rest.skip_one()
                } else {
                    rest
                };
                if let Some(sep) = &separator {
                    if cursor.is(sep) {
                        cursor = cursor.skip_one();
                    } else if !cursor.is(&close) && !cursor.at_end() {
                        issues.push(Issue::error(
                            IssueCode::MissingToken,
                            cursor.gap_span(),
                            format!("missing '{}'", sep.as_str()),
                        ));
                    }
                }
            }
            Outcome::Malformed {
                issues: inner,
                rest,
            } => {
                issues.extend(inner);
                cursor = if rest.pos() == cursor.pos() {
                    rest.skip_one()
                } else {
                    rest
                };
            }
            Outcome::NoMatch => {
                issues.push(Issue::error(
                    IssueCode::UnexpectedToken,
                    cursor.span(),
                    format!("unexpected {}", cursor.kind()),
                ));
                cursor = cursor.skip_one();
            }
        }
    };

    Outcome::Success {
        node: EnclosedSeq {
            items,
            span: open_span.cover(close_span),
            close_span,
        },
        issues,
        rest: cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colang_diag::FileId;
    use colang_lexer::tokenize;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(FileId(0), source).0
    }

    #[test]
    fn token_strategy_declines_without_consuming() {
        let toks = tokens("x");
        let cursor = Cursor::new(&toks);
        assert!(matches!(
            token(TokenKind::Struct).apply(cursor),
            Outcome::NoMatch
        ));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn group_no_match_when_defining_absent() {
        let toks = tokens("native x");
        let mut group = Group::new(Cursor::new(&toks));
        // Consume the specifier, then demand a defining `struct` that isn't
        // there: the whole group declines, issues and all.
        group.optional(&token(TokenKind::Native));
        group.defining(&token(TokenKind::Struct));
        assert!(matches!(group.finish(Some(())), Outcome::NoMatch));
    }

    #[test]
    fn group_stop_suppresses_later_missing_errors() {
        let toks = tokens("struct");
        let mut group = Group::new(Cursor::new(&toks));
        group.defining(&token(TokenKind::Struct));
        group.required_stop(&token(TokenKind::LBrace), "'{'");
        group.required(&token(TokenKind::RBrace), "'}'");
        match group.finish(None::<()>) {
            Outcome::Malformed { issues, .. } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, IssueCode::MissingToken);
            }
            _ => panic!("expected Malformed"),
        }
    }

    #[test]
    fn enclosed_synthesizes_missing_closer() {
        let toks = tokens("( a , b");
        let cursor = Cursor::new(&toks);
        let outcome = enclosed(
            cursor,
            TokenKind::LParen,
            TokenKind::RParen,
            Some(TokenKind::Comma),
            &ident(),
        );
        match outcome {
            Outcome::Success { node, issues, rest } => {
                assert_eq!(node.items.len(), 2);
                assert!(node.close_span.is_empty());
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, IssueCode::MissingToken);
                assert!(rest.at_end());
            }
            _ => panic!("expected Success"),
        }
    }

    #[test]
    fn enclosed_skips_junk() {
        let toks = tokens("( a ; b )");
        let outcome = enclosed(
            Cursor::new(&toks),
            TokenKind::LParen,
            TokenKind::RParen,
            None,
            &ident(),
        );
        match outcome {
            Outcome::Success { node, issues, .. } => {
                assert_eq!(node.items.len(), 2);
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, IssueCode::UnexpectedToken);
            }
            _ => panic!("expected Success"),
        }
    }
}
