// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lexer and parser for Dockerfile-like build recipes.
//!
//! ```
//! let ret = ducker_parser::parse("# syntax=x\nARG V=1\nFROM alpine AS base\n");
//! assert!(ret.is_ok());
//! assert_eq!(ret.program.directives.len(), 1);
//! assert_eq!(ret.program.statements.len(), 2);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
mod parser;
pub mod token;


pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, tokenize};
pub use parser::{ParseOptions, Parser, ParserReturn};
pub use token::{Keyword, Position, Span, Token, TokenKind};

/// Lexes and parses `source` with the default options.
pub fn parse(source: &str) -> ParserReturn {
    parse_with_options(source, ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: ParseOptions) -> ParserReturn {
    Parser::with_options(Lexer::new(source), options).parse()
}
