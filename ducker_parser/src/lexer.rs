// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-pass lexer over a build recipe.
//!
//! Tokens are produced on demand and cover exactly the characters consumed
//! since the previous token. Whitespace other than newlines is skipped, and
//! a backslash directly before a newline joins two physical lines without
//! emitting anything.

use std::iter::FusedIterator;

use crate::token::{Position, Span, Token, TokenKind};

/// What a lossy UTF-8 decode leaves behind for invalid bytes. It never
/// belongs to a word and always lexes as an illegal token.
pub const DECODE_ERROR: char = char::REPLACEMENT_CHARACTER;

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    /// `Option<char>` is memory optimized to only 4 bytes because of UTF-8
    /// codepoint limits. `None` is the end of input.
    codepoint: Option<char>,
    index: usize,
    line: u32,
    line_start: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Spans are byte offsets stored as `u32`; past 4 GiB they saturate at
    /// `u32::MAX` rather than wrapping.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            codepoint: source.chars().next(),
            index: 0,
            line: 1,
            line_start: 0,
            finished: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Steps a unicode codepoint forwards.
    fn step(&mut self) {
        let Some(cp) = self.codepoint else {
            return;
        };

        self.index += cp.len_utf8();
        self.codepoint = self.source[self.index..].chars().next();
    }

    fn peek_char(&self) -> Option<char> {
        let cp = self.codepoint?;
        self.source[self.index + cp.len_utf8()..].chars().next()
    }

    /// Must be called right after stepping over a `\n`.
    fn start_line(&mut self) {
        self.line += 1;
        self.line_start = self.index;
    }

    fn cursor_position(&self) -> Position {
        Position {
            line: self.line,
            column: offset(self.index - self.line_start).saturating_add(1),
        }
    }

    /// Length in bytes of a line continuation at the cursor, if any.
    fn continuation_len(&self) -> Option<usize> {
        if self.codepoint != Some('\\') {
            return None;
        }
        let rest = &self.source[self.index + 1..];
        if rest.starts_with('\n') {
            Some(2)
        } else if rest.starts_with("\r\n") {
            Some(3)
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.codepoint {
                Some(' ' | '\t' | '\r') => self.step(),
                Some('\\') => {
                    let Some(len) = self.continuation_len() else {
                        return;
                    };
                    for _ in 0..len {
                        self.step();
                    }
                    self.start_line();
                }
                _ => return,
            }
        }
    }

    /// Whether the cursor sits on something that continues a bare word. An
    /// escaped space (`\ `) counts as part of the word.
    fn at_word_char(&self) -> bool {
        match self.codepoint {
            None | Some(' ' | '\t' | '\r' | '\n' | DECODE_ERROR) => false,
            Some('\\') => self.peek_char() == Some(' '),
            Some(_) => true,
        }
    }

    fn read_word(&mut self) {
        while self.at_word_char() {
            if self.codepoint == Some('\\') {
                self.step();
            }
            self.step();
        }
    }

    /// Scans a quoted string verbatim. Without a closing delimiter the scan
    /// stops at the end of input and the whole remainder is illegal.
    fn read_string(&mut self, delimiter: char, start: usize, position: Position) -> Token<'a> {
        self.step();
        let content_start = self.index;

        loop {
            match self.codepoint {
                None => {
                    return Token::new(
                        TokenKind::Illegal,
                        &self.source[start..self.index],
                        position,
                        byte_span(start, self.index),
                    );
                }
                Some(ch) if ch == delimiter => {
                    let literal = &self.source[content_start..self.index];
                    self.step();
                    return Token::new(
                        TokenKind::String,
                        literal,
                        position,
                        byte_span(start, self.index),
                    );
                }
                Some('\n') => {
                    self.step();
                    self.start_line();
                }
                Some(_) => self.step(),
            }
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();

        let start = self.index;
        let position = self.cursor_position();

        let kind = match self.codepoint {
            None => TokenKind::Eof,
            Some('#') => {
                self.step();
                TokenKind::Comment
            }
            Some('[') => {
                self.step();
                TokenKind::LBracket
            }
            Some(']') => {
                self.step();
                TokenKind::RBracket
            }
            Some(',') => {
                self.step();
                TokenKind::Comma
            }
            Some(delimiter @ ('"' | '\'')) => {
                return self.read_string(delimiter, start, position);
            }
            Some('\n') => {
                self.step();
                self.start_line();
                TokenKind::Eol
            }
            Some(_) if self.at_word_char() => {
                self.read_word();
                TokenKind::from_word(&self.source[start..self.index])
            }
            Some(_) => {
                self.step();
                TokenKind::Illegal
            }
        };

        Token::new(
            kind,
            &self.source[start..self.index],
            position,
            byte_span(start, self.index),
        )
    }
}

/// Yields every token up to and including the first `Eof`.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.kind == TokenKind::Eof;
        Some(token)
    }
}

impl FusedIterator for Lexer<'_> {}

/// Spans and columns are `u32`. Offsets past `u32::MAX` saturate, so every
/// token beyond the first 4 GiB of input points at the last addressable byte.
fn offset(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn byte_span(start: usize, end: usize) -> Span {
    Span::new(offset(start), offset(end))
}

/// Lexes the whole input, ending with the `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).collect()
}

/// Resolves escaped spaces (`\ `) in a bare word.
pub fn unescape_word(word: &str) -> std::borrow::Cow<'_, str> {
    if word.contains("\\ ") {
        word.replace("\\ ", " ").into()
    } else {
        word.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::Keyword;

    macro_rules! assert_tokens {
        ($source: expr, $tokens: expr) => {{
            let expected: &[(TokenKind, &str)] = $tokens;
            let source: &str = $source;
            let mut out = Vec::with_capacity(expected.len());

            for token in Lexer::new(source) {
                if token.kind == TokenKind::Eof {
                    break;
                }
                out.push((token.kind, token.literal));
            }

            assert_eq!(out.as_slice(), expected);
        }};
    }

    const FROM: TokenKind = TokenKind::Keyword(Keyword::From);
    const AS: TokenKind = TokenKind::Keyword(Keyword::As);
    const COPY: TokenKind = TokenKind::Keyword(Keyword::Copy);
    const RUN: TokenKind = TokenKind::Keyword(Keyword::Run);
    const EXPR: TokenKind = TokenKind::Expr;
    const EOL: TokenKind = TokenKind::Eol;

    #[test]
    fn full_recipe() {
        let input = r#"
# syntax=docker/dockerfile:1
# check=error=true

FROM --platform=$BUILDPLATFORM tonistiigi/xx:${XX_VERSION} AS xx
FROM alpine AS builder
ENV GOPRIVATE=github.com/eunomie
COPY --from=xx / /
RUN apk add --no-cache curl
RUN sh -c "$(curl --location https://taskfile.dev/install.sh)" -- -d -b /usr/local/bin
RUN --mount=type=cache,target=/root/.cache \
    --mount=type=cache,target=/go/pkg/mod \
    task go:build && xx-verify dist/scout-notifications-service

COPY --from=build-base /etc/ssl/certs/ca\ certificates.crt /etc/ssl/certs/

EXPOSE 8080
ENTRYPOINT ["/usr/local/bin/scout-notifications-service"]

CMD ["echo", "Hello, World!"]
"#;

        assert_tokens!(
            input,
            &[
                (EOL, "\n"),
                (TokenKind::Comment, "#"),
                (EXPR, "syntax=docker/dockerfile:1"),
                (EOL, "\n"),
                (TokenKind::Comment, "#"),
                (EXPR, "check=error=true"),
                (EOL, "\n"),
                (EOL, "\n"),
                (FROM, "FROM"),
                (EXPR, "--platform=$BUILDPLATFORM"),
                (EXPR, "tonistiigi/xx:${XX_VERSION}"),
                (AS, "AS"),
                (EXPR, "xx"),
                (EOL, "\n"),
                (FROM, "FROM"),
                (EXPR, "alpine"),
                (AS, "AS"),
                (EXPR, "builder"),
                (EOL, "\n"),
                (TokenKind::Keyword(Keyword::Env), "ENV"),
                (EXPR, "GOPRIVATE=github.com/eunomie"),
                (EOL, "\n"),
                (COPY, "COPY"),
                (EXPR, "--from=xx"),
                (EXPR, "/"),
                (EXPR, "/"),
                (EOL, "\n"),
                (RUN, "RUN"),
                (EXPR, "apk"),
                (EXPR, "add"),
                (EXPR, "--no-cache"),
                (EXPR, "curl"),
                (EOL, "\n"),
                (RUN, "RUN"),
                (EXPR, "sh"),
                (EXPR, "-c"),
                (TokenKind::String, "$(curl --location https://taskfile.dev/install.sh)"),
                (EXPR, "--"),
                (EXPR, "-d"),
                (EXPR, "-b"),
                (EXPR, "/usr/local/bin"),
                (EOL, "\n"),
                (RUN, "RUN"),
                (EXPR, "--mount=type=cache,target=/root/.cache"),
                (EXPR, "--mount=type=cache,target=/go/pkg/mod"),
                (EXPR, "task"),
                (EXPR, "go:build"),
                (EXPR, "&&"),
                (EXPR, "xx-verify"),
                (EXPR, "dist/scout-notifications-service"),
                (EOL, "\n"),
                (EOL, "\n"),
                (COPY, "COPY"),
                (EXPR, "--from=build-base"),
                (EXPR, "/etc/ssl/certs/ca\\ certificates.crt"),
                (EXPR, "/etc/ssl/certs/"),
                (EOL, "\n"),
                (EOL, "\n"),
                (TokenKind::Keyword(Keyword::Expose), "EXPOSE"),
                (EXPR, "8080"),
                (EOL, "\n"),
                (TokenKind::Keyword(Keyword::Entrypoint), "ENTRYPOINT"),
                (TokenKind::LBracket, "["),
                (TokenKind::String, "/usr/local/bin/scout-notifications-service"),
                (TokenKind::RBracket, "]"),
                (EOL, "\n"),
                (EOL, "\n"),
                (TokenKind::Keyword(Keyword::Cmd), "CMD"),
                (TokenKind::LBracket, "["),
                (TokenKind::String, "echo"),
                (TokenKind::Comma, ","),
                (TokenKind::String, "Hello, World!"),
                (TokenKind::RBracket, "]"),
                (EOL, "\n"),
            ]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = tokenize("FROM alpine\n  ARG X\n");
        let positions: Vec<_> = tokens
            .iter()
            .map(|t| (t.literal, t.position.line, t.position.column))
            .collect();
        assert_eq!(
            positions,
            [
                ("FROM", 1, 1),
                ("alpine", 1, 6),
                ("\n", 1, 12),
                ("ARG", 2, 3),
                ("X", 2, 7),
                ("\n", 2, 8),
                ("", 3, 1),
            ]
        );
    }

    #[test]
    fn continuation_advances_line_without_token() {
        let tokens = tokenize("RUN a \\\n  b");
        let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.literal)).collect();
        assert_eq!(
            kinds,
            [(RUN, "RUN"), (EXPR, "a"), (EXPR, "b"), (TokenKind::Eof, "")]
        );
        assert_eq!(tokens[2].position, Position { line: 2, column: 3 });
    }

    #[test]
    fn crlf_continuation() {
        assert_tokens!("RUN a \\\r\n b\r\n", &[(RUN, "RUN"), (EXPR, "a"), (EXPR, "b"), (EOL, "\n")]);
    }

    #[test]
    fn escaped_space_stays_in_word() {
        assert_tokens!("\\ lead a\\ b", &[(EXPR, "\\ lead"), (EXPR, "a\\ b")]);
        assert_eq!(unescape_word("a\\ b"), "a b");
        assert_eq!(unescape_word("plain"), "plain");
    }

    #[test]
    fn lone_backslash_is_illegal() {
        assert_tokens!("\\x", &[(TokenKind::Illegal, "\\"), (EXPR, "x")]);
    }

    #[test]
    fn strings_keep_raw_contents() {
        assert_tokens!(
            r#"'a, "b"' "c\n""#,
            &[(TokenKind::String, r#"a, "b""#), (TokenKind::String, "c\\n")]
        );
    }

    #[test]
    fn string_spans_cover_delimiters() {
        let tokens = tokenize("\"ab\"");
        assert_eq!(tokens[0].literal, "ab");
        assert_eq!(tokens[0].span, Span::new(0, 4));
    }

    #[test]
    fn unterminated_string_stops_at_end_of_input() {
        let tokens = tokenize("CMD \"echo\nhi");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "\"echo\nhi");
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(tokens[2].position.line, 2);
    }

    #[test]
    fn decode_error_sentinel_is_illegal() {
        let input = String::from_utf8_lossy(b"ab\xffcd");
        assert_tokens!(
            &input,
            &[
                (EXPR, "ab"),
                (TokenKind::Illegal, "\u{FFFD}"),
                (EXPR, "cd"),
            ]
        );
    }

    #[test]
    fn punctuation_inside_words_does_not_split() {
        assert_tokens!("a#b c,d [e]", &[(EXPR, "a#b"), (EXPR, "c,d"), (TokenKind::LBracket, "["), (EXPR, "e]")]);
    }

    #[test]
    fn offsets_saturate_instead_of_wrapping() {
        assert_eq!(offset(7), 7);
        assert_eq!(offset(u32::MAX as usize), u32::MAX);
        assert_eq!(offset(usize::MAX), u32::MAX);
        assert_eq!(byte_span(3, usize::MAX), Span::new(3, u32::MAX));
    }

    #[test]
    fn iterator_stops_after_eof() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
