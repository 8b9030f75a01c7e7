// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The closed set of lexical categories and the instruction keyword table.

use std::fmt;

use serde::Serialize;

/// Byte range of a token or node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    // We do this because deriving Into<_> has some inference issues for range
    // indices.
    pub fn into_range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}

/// Human-facing location of a token. Both fields are 1-based; the column
/// counts bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Reserved instruction words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    From,
    As,
    User,
    Env,
    Arg,
    Copy,
    Run,
    Workdir,
    Expose,
    Entrypoint,
    Cmd,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
    "FROM" => Keyword::From,
    "AS" => Keyword::As,
    "USER" => Keyword::User,
    "ENV" => Keyword::Env,
    "ARG" => Keyword::Arg,
    "COPY" => Keyword::Copy,
    "RUN" => Keyword::Run,
    "WORKDIR" => Keyword::Workdir,
    "EXPOSE" => Keyword::Expose,
    "ENTRYPOINT" => Keyword::Entrypoint,
    "CMD" => Keyword::Cmd,
};

impl Keyword {
    /// Exact, case-sensitive lookup: `from` is not a keyword.
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS.get(word).copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::From => "FROM",
            Keyword::As => "AS",
            Keyword::User => "USER",
            Keyword::Env => "ENV",
            Keyword::Arg => "ARG",
            Keyword::Copy => "COPY",
            Keyword::Run => "RUN",
            Keyword::Workdir => "WORKDIR",
            Keyword::Expose => "EXPOSE",
            Keyword::Entrypoint => "ENTRYPOINT",
            Keyword::Cmd => "CMD",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Eof,
    Eol,
    Illegal,
    /// A bare word: anything up to the next whitespace.
    Expr,
    /// A single- or double-quoted string.
    String,
    /// The `#` marker.
    Comment,
    LBracket,
    RBracket,
    Comma,
    Keyword(Keyword),
}

impl TokenKind {
    /// Classifies a scanned word against the keyword table.
    pub fn from_word(word: &str) -> TokenKind {
        match Keyword::lookup(word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Expr,
        }
    }

    pub fn is_line_end(self) -> bool {
        matches!(self, TokenKind::Eol | TokenKind::Eof)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Eol => "EOL",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Expr => "EXPR",
            TokenKind::String => "STRING",
            TokenKind::Comment => "COMMENT",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Keyword(keyword) => keyword.as_str(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical token. The literal borrows from the input; for quoted strings
/// it excludes the delimiters while the span covers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub literal: &'a str,
    pub position: Position,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub const fn new(kind: TokenKind, literal: &'a str, position: Position, span: Span) -> Self {
        Self {
            kind,
            literal,
            position,
            span,
        }
    }

    /// A token with no source location, mostly useful for feeding the
    /// parser a hand-written token list.
    pub fn synthetic(kind: TokenKind, literal: &'a str) -> Self {
        Self::new(kind, literal, Position::default(), Span::default())
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(TokenKind::from_word("FROM"), TokenKind::Keyword(Keyword::From));
        assert_eq!(TokenKind::from_word("from"), TokenKind::Expr);
        assert_eq!(TokenKind::from_word("FROMAGE"), TokenKind::Expr);
    }

    #[test]
    fn every_keyword_round_trips_through_the_table() {
        for keyword in [
            Keyword::From,
            Keyword::As,
            Keyword::User,
            Keyword::Env,
            Keyword::Arg,
            Keyword::Copy,
            Keyword::Run,
            Keyword::Workdir,
            Keyword::Expose,
            Keyword::Entrypoint,
            Keyword::Cmd,
        ] {
            assert_eq!(Keyword::lookup(keyword.as_str()), Some(keyword));
        }
    }

    #[test]
    fn kinds_display_like_diagnostics_expect() {
        assert_eq!(TokenKind::Eol.to_string(), "EOL");
        assert_eq!(TokenKind::Expr.to_string(), "EXPR");
        assert_eq!(TokenKind::LBracket.to_string(), "[");
        assert_eq!(TokenKind::Keyword(Keyword::Entrypoint).to_string(), "ENTRYPOINT");
    }

    #[test]
    fn span_merge_covers_both() {
        let span = Span::new(4, 6).merge(Span::new(1, 3));
        assert_eq!(span, Span::new(1, 6));
        assert_eq!(span.len(), 5);
        assert_eq!(span.into_range(), 1..6);
    }
}
