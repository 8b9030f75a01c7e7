// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Utilities for the ducker cli program.
//!
//! > [!IMPORTANT]
//! > This library is currently mainly aimed at internal use and might not
//! > adhere to semver versioning.

mod fmt;

pub use fmt::{
    OutputFormat, exit_with_parse_errors, format_program, format_tokens, install_report_hook,
    report_parse_errors,
};

use std::{io, path::Path};

use ducker_parser::{Lexer, ParseOptions, Parser, ParserReturn};

#[derive(Default)]
pub struct ReplConfig {
    /// Parser behaviour for every chunk. Default [`ParseOptions::default`].
    pub options: ParseOptions,
    /// Whether to print the token stream before the program. Default `false`.
    pub show_tokens: bool,
}

/// What the REPL should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    Exit,
    ToggleTokens,
    /// The line ended in `\`; keep reading.
    Incomplete,
    /// A complete chunk, continuations included, ready to parse.
    Chunk(String),
}

/// Line-buffering state of an interactive session.
pub struct Session {
    config: ReplConfig,
    pending: String,
}

impl Session {
    pub fn new(config: ReplConfig) -> Self {
        Self {
            config,
            pending: String::new(),
        }
    }

    pub fn config(&self) -> &ReplConfig {
        &self.config
    }

    pub fn is_continuing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn push_line(&mut self, line: &str) -> ReplInput {
        if !self.is_continuing() {
            match line.trim() {
                "exit" => return ReplInput::Exit,
                ":tokens" => {
                    self.config.show_tokens = !self.config.show_tokens;
                    return ReplInput::ToggleTokens;
                }
                _ => {}
            }
        }

        self.pending.push_str(line);
        if line.trim_end().ends_with('\\') {
            self.pending.push('\n');
            return ReplInput::Incomplete;
        }
        ReplInput::Chunk(std::mem::take(&mut self.pending))
    }

    pub fn parse(&self, chunk: &str) -> ParserReturn {
        tracing::debug!(bytes = chunk.len(), "parsing chunk");
        Parser::with_options(Lexer::new(chunk), self.config.options).parse()
    }
}

/// Reads a recipe, decoding invalid UTF-8 lossily so bad bytes surface as
/// illegal tokens.
pub fn read_source(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Name to greet the user with.
pub fn user_name() -> String {
    ["USER", "USERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| "there".to_owned())
}
