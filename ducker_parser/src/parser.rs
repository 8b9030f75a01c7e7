// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, trace};

use crate::{
    ast::{
        ArgStatement, Argument, CommentStatement, CopyStatement, FromStatement, Identifier,
        Program, Statement, UnparsedStatement, Word,
    },
    error::ParseError,
    lexer::unescape_word,
    token::{Keyword, Span, Token, TokenKind},
};

/// Errors are recorded on the parser before an `Err` is returned, so the
/// error side carries nothing.
type Result<T> = std::result::Result<T, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether a `--flag` without `=` is reported. The statement is dropped
    /// either way. Default `true`.
    pub report_malformed_flags: bool,
    /// Whether keyword-led lines without a grammar (RUN, ENV, ...) are kept
    /// as [`Statement::Unparsed`] instead of being dropped. Default `true`.
    pub keep_unparsed: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            report_malformed_flags: true,
            keep_unparsed: true,
        }
    }
}

impl ParseOptions {
    /// Silently drops malformed flags and unparsed lines.
    pub fn compat() -> Self {
        Self {
            report_malformed_flags: false,
            keep_unparsed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserReturn {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

impl ParserReturn {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Recursive-descent parser with two tokens of lookahead.
///
/// Accepts any token source: a [`Lexer`](crate::Lexer) or a hand-built list.
/// A source that runs dry reads as `Eof`.
#[derive(Debug)]
pub struct Parser<'a, I: Iterator<Item = Token<'a>>> {
    tokens: I,
    options: ParseOptions,
    errors: Vec<ParseError>,
    cur: Token<'a>,
    peek: Token<'a>,
}

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    pub fn new<T>(tokens: T) -> Self
    where
        T: IntoIterator<Item = Token<'a>, IntoIter = I>,
    {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options<T>(tokens: T, options: ParseOptions) -> Self
    where
        T: IntoIterator<Item = Token<'a>, IntoIter = I>,
    {
        let eof = Token::synthetic(TokenKind::Eof, "");
        let mut parser = Self {
            tokens: tokens.into_iter(),
            options,
            errors: Vec::new(),
            cur: eof,
            peek: eof,
        };

        // Read two tokens, so cur and peek are both set.
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse(mut self) -> ParserReturn {
        let program = self.parse_program();
        ParserReturn {
            program,
            errors: self.errors,
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur.is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                trace!(
                    statement = stmt.token_literal(),
                    line = self.cur.position.line,
                    "parsed statement"
                );
                if stmt.is_comment() && program.statements.is_empty() {
                    program.directives.push(stmt);
                } else {
                    program.statements.push(stmt);
                }
            }
            self.next_token();
        }

        program
    }

    fn next_token(&mut self) {
        let next = match self.tokens.next() {
            Some(token) => token,
            None => {
                let end = self.peek.span.end;
                Token::new(TokenKind::Eof, "", self.peek.position, Span::new(end, end))
            }
        };
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        let result = match self.cur.kind {
            TokenKind::Eol => return None,
            TokenKind::Comment => self.parse_comment_statement(),
            TokenKind::Keyword(Keyword::From) => self.parse_from_statement(),
            TokenKind::Keyword(Keyword::Arg) => self.parse_arg_statement(),
            TokenKind::Keyword(Keyword::Copy) => self.parse_copy_statement(),
            TokenKind::Keyword(_) if !self.options.keep_unparsed => {
                debug!(
                    instruction = self.cur.literal,
                    line = self.cur.position.line,
                    "dropping instruction without a grammar"
                );
                self.skip_line();
                return None;
            }
            TokenKind::Keyword(keyword) => self.parse_unparsed_statement(keyword),
            _ => {
                self.error(ParseError::unexpected_statement_start(&self.cur));
                Err(())
            }
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(()) => {
                self.skip_line();
                None
            }
        }
    }

    fn parse_comment_statement(&mut self) -> Result<Statement> {
        let start = self.cur.span;

        self.expect_peek(TokenKind::Expr)?;
        let value = Identifier::from_token(&self.cur);
        let span = start.merge(self.cur.span);

        self.expect_peek_end();

        Ok(Statement::Comment(CommentStatement { value, span }))
    }

    /// Consumes leading `--name=value` words. Leaves the first other word as
    /// the current token.
    fn parse_arguments(&mut self) -> Result<Vec<Argument>> {
        let mut arguments = Vec::new();

        loop {
            let token = self.cur;
            let Some(flag) = token.literal.strip_prefix("--") else {
                break;
            };
            let Some((name, value)) = flag.split_once('=') else {
                if self.options.report_malformed_flags {
                    self.error(ParseError::malformed_flag(&token));
                } else {
                    debug!(
                        flag = token.literal,
                        line = token.position.line,
                        "dropping statement with malformed flag"
                    );
                }
                return Err(());
            };

            arguments.push(Argument {
                literal: token.literal.to_owned(),
                name: name.to_owned(),
                value: unescape_word(value).into_owned(),
                span: token.span,
            });

            self.expect_peek(TokenKind::Expr)?;
        }

        Ok(arguments)
    }

    fn parse_from_statement(&mut self) -> Result<Statement> {
        let start = self.cur.span;

        self.expect_peek(TokenKind::Expr)?;
        let arguments = self.parse_arguments()?;
        let source = Identifier::from_token(&self.cur);

        let alias = if self.peek.is(TokenKind::Keyword(Keyword::As)) {
            self.next_token();
            self.expect_peek(TokenKind::Expr)?;
            Some(Identifier::from_token(&self.cur))
        } else {
            None
        };
        let span = start.merge(self.cur.span);

        self.expect_peek_end();

        Ok(Statement::From(FromStatement {
            arguments,
            source,
            alias,
            span,
        }))
    }

    fn parse_copy_statement(&mut self) -> Result<Statement> {
        let start = self.cur.span;

        self.expect_peek(TokenKind::Expr)?;
        let arguments = self.parse_arguments()?;
        let source = Identifier::from_token(&self.cur);

        self.expect_peek(TokenKind::Expr)?;
        let dest = Identifier::from_token(&self.cur);
        let span = start.merge(self.cur.span);

        self.expect_peek_end();

        Ok(Statement::Copy(CopyStatement {
            arguments,
            source,
            dest,
            span,
        }))
    }

    fn parse_arg_statement(&mut self) -> Result<Statement> {
        let start = self.cur.span;

        self.expect_peek(TokenKind::Expr)?;
        let word = Identifier::from_token(&self.cur);

        let (name, value, value_word) = match self.cur.literal.split_once('=') {
            Some((name, value)) => (
                unescape_word(name).into_owned(),
                Some(unescape_word(value).into_owned()),
                None,
            ),
            None => {
                let name = word.value.clone();
                // `ARG NAME VALUE`
                let value_word = if self.peek.is(TokenKind::Expr) {
                    self.next_token();
                    Some(Identifier::from_token(&self.cur))
                } else {
                    None
                };
                let value = value_word.as_ref().map(|v| v.value.clone());
                (name, value, value_word)
            }
        };
        let span = start.merge(self.cur.span);

        self.expect_peek_end();

        Ok(Statement::Arg(ArgStatement {
            word,
            name,
            value,
            value_word,
            span,
        }))
    }

    /// Splits the rest of the line into words without interpreting them.
    fn parse_unparsed_statement(&mut self, keyword: Keyword) -> Result<Statement> {
        let start = self.cur.span;
        let mut arguments = Vec::new();

        while !self.peek.kind.is_line_end() {
            self.next_token();
            if self.cur.is(TokenKind::Illegal) {
                self.error(ParseError::illegal_token(&self.cur));
                return Err(());
            }
            arguments.push(Word::from_token(&self.cur));
        }
        let span = start.merge(self.cur.span);
        self.next_token();

        Ok(Statement::Unparsed(UnparsedStatement {
            keyword,
            arguments,
            span,
        }))
    }

    fn expect_peek(&mut self, kind: TokenKind) -> Result<()> {
        if self.peek.is(kind) {
            self.next_token();
            Ok(())
        } else {
            self.error(ParseError::unexpected_token(kind, &self.peek));
            Err(())
        }
    }

    /// Requires the statement to end here. On failure the error is recorded
    /// and the rest of the line skipped, but the statement is kept.
    fn expect_peek_end(&mut self) {
        if self.peek.kind.is_line_end() {
            self.next_token();
        } else {
            self.error(ParseError::unexpected_token(TokenKind::Eol, &self.peek));
            self.skip_line();
        }
    }

    /// Advances until the current token ends the line.
    fn skip_line(&mut self) {
        if !self.cur.kind.is_line_end() {
            debug!(line = self.cur.position.line, "skipping rest of line");
        }
        while !self.cur.kind.is_line_end() {
            self.next_token();
        }
    }

    fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }
}
