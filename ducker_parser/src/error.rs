// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Syntax errors collected while parsing.
//!
//! Errors are plain data: the parser keeps going after recording one, and
//! the caller decides what to do with the list.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use crate::token::{Position, Span, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(ducker::syntax))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    #[label("here")]
    pub span: Span,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: &Token<'_>) -> Self {
        Self {
            kind,
            span: token.span,
            position: token.position,
        }
    }

    /// The token is not what the grammar requires next.
    pub fn unexpected_token(expected: TokenKind, found: &Token<'_>) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                expected,
                found: found.kind,
            },
            found,
        )
    }

    /// A `--` word without the `=` separator.
    pub fn malformed_flag(flag: &Token<'_>) -> Self {
        Self::new(
            ParseErrorKind::MalformedFlag {
                flag: flag.literal.to_owned(),
            },
            flag,
        )
    }

    pub fn unexpected_statement_start(found: &Token<'_>) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedStatementStart { found: found.kind },
            found,
        )
    }

    pub fn illegal_token(token: &Token<'_>) -> Self {
        Self::new(
            ParseErrorKind::IllegalToken {
                literal: token.literal.to_owned(),
            },
            token,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected next token to be {expected}, got {found} instead")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },

    #[error("malformed flag `{flag}`: expected `--name=value`")]
    MalformedFlag { flag: String },

    #[error("expected an instruction or a comment, got {found} instead")]
    UnexpectedStatementStart { found: TokenKind },

    #[error("illegal token `{literal}`")]
    IllegalToken { literal: String },
}
