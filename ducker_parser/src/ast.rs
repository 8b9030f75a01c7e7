// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Syntax tree handed to consumers of the parser.
//!
//! Nodes own their text, so a [`Program`] outlives the buffer it was parsed
//! from. `Display` re-renders a normalized recipe.

use std::fmt;

use serde::Serialize;

use crate::token::{Keyword, Span, Token, TokenKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    /// Comment lines seen before any other statement.
    pub directives: Vec<Statement>,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.statements.is_empty()
    }

    /// Directives followed by statements, in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.directives.iter().chain(self.statements.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    Comment(CommentStatement),
    From(FromStatement),
    Arg(ArgStatement),
    Copy(CopyStatement),
    /// A keyword-led line without a statement grammar, kept as split words.
    Unparsed(UnparsedStatement),
}

impl Statement {
    /// Text of the token that introduced the statement.
    pub fn token_literal(&self) -> &'static str {
        match self {
            Statement::Comment(_) => "#",
            Statement::From(_) => Keyword::From.as_str(),
            Statement::Arg(_) => Keyword::Arg.as_str(),
            Statement::Copy(_) => Keyword::Copy.as_str(),
            Statement::Unparsed(stmt) => stmt.keyword.as_str(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Statement::Comment(stmt) => stmt.span,
            Statement::From(stmt) => stmt.span,
            Statement::Arg(stmt) => stmt.span,
            Statement::Copy(stmt) => stmt.span,
            Statement::Unparsed(stmt) => stmt.span,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Statement::Comment(_))
    }
}

/// A leaf value together with the token text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub literal: String,
    /// `literal` with escaped spaces resolved.
    pub value: String,
    pub span: Span,
}

impl Identifier {
    pub fn from_token(token: &Token<'_>) -> Self {
        Self {
            literal: token.literal.to_owned(),
            value: crate::lexer::unescape_word(token.literal).into_owned(),
            span: token.span,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.literal
    }
}

/// A `--name=value` flag on FROM or COPY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    /// The whole word, `--` included.
    pub literal: String,
    pub name: String,
    pub value: String,
    pub span: Span,
}

impl Argument {
    pub fn token_literal(&self) -> &str {
        &self.literal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentStatement {
    pub value: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FromStatement {
    pub arguments: Vec<Argument>,
    pub source: Identifier,
    pub alias: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgStatement {
    /// The first word after the keyword, as written.
    pub word: Identifier,
    pub name: String,
    /// `None` only for a bare name with nothing after it.
    pub value: Option<String>,
    /// The value of the space-separated `ARG NAME VALUE` form, as written.
    pub value_word: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyStatement {
    pub arguments: Vec<Argument>,
    pub source: Identifier,
    pub dest: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparsedStatement {
    pub keyword: Keyword,
    pub arguments: Vec<Word>,
    pub span: Span,
}

/// One token of an unparsed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Word {
    pub fn from_token(token: &Token<'_>) -> Self {
        Self {
            kind: token.kind,
            literal: token.literal.to_owned(),
            span: token.span,
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in self.iter() {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Comment(stmt) => write!(f, "# {}", stmt.value.literal),
            Statement::From(stmt) => {
                f.write_str("FROM")?;
                for arg in &stmt.arguments {
                    write!(f, " {}", arg.literal)?;
                }
                write!(f, " {}", stmt.source.literal)?;
                if let Some(alias) = &stmt.alias {
                    write!(f, " AS {}", alias.literal)?;
                }
                Ok(())
            }
            // Raw text keeps escaped spaces; `ARG N V` becomes `ARG N=V`.
            Statement::Arg(stmt) => match &stmt.value_word {
                Some(value) => write!(f, "ARG {}={}", stmt.word.literal, value.literal),
                None => write!(f, "ARG {}", stmt.word.literal),
            },
            Statement::Copy(stmt) => {
                f.write_str("COPY")?;
                for arg in &stmt.arguments {
                    write!(f, " {}", arg.literal)?;
                }
                write!(f, " {} {}", stmt.source.literal, stmt.dest.literal)
            }
            Statement::Unparsed(stmt) => {
                f.write_str(stmt.keyword.as_str())?;
                for (i, word) in stmt.arguments.iter().enumerate() {
                    // Exec-form punctuation hugs its neighbours.
                    let tight = matches!(word.kind, TokenKind::RBracket | TokenKind::Comma)
                        || (i > 0 && stmt.arguments[i - 1].kind == TokenKind::LBracket);
                    if !tight {
                        f.write_str(" ")?;
                    }
                    write!(f, "{word}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String if self.literal.contains('"') => write!(f, "'{}'", self.literal),
            TokenKind::String => write!(f, "\"{}\"", self.literal),
            _ => f.write_str(&self.literal),
        }
    }
}
