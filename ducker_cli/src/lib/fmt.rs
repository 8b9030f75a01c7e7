// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Formatting programs, tokens and errors.

use std::fmt::Write;

use ducker_parser::{ParseError, Token, ast::Program};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// The program re-rendered as a recipe.
    #[default]
    Text,
    /// The syntax tree in Rust debug notation.
    Debug,
    Json,
}

pub fn format_program(program: &Program, format: OutputFormat) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Text => program.to_string(),
        OutputFormat::Debug => format!("{program:#?}"),
        OutputFormat::Json => serde_json::to_string_pretty(program)?,
    })
}

/// One token per line: `line:column KIND "literal"`.
pub fn format_tokens(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {} {:?}", token.position, token.kind, token.literal);
    }
    out
}

pub fn install_report_hook() {
    // This seems to be needed for color and Unicode output. Installing twice
    // is harmless; the first hook wins.
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(miette::GraphicalReportHandler::new())
    }));
}

/// Prints every error with a snippet of the offending source.
pub fn report_parse_errors(errors: &[ParseError], source_path: &str, source: &str) {
    let named_source = miette::NamedSource::new(source_path, source.to_owned());

    eprintln!("SyntaxError:");

    for error in errors {
        let report = miette::Report::new(error.clone()).with_source_code(named_source.clone());
        eprintln!("{report:?}");
    }
}

/// Exit the program with parse errors.
pub fn exit_with_parse_errors(errors: Vec<ParseError>, source_path: &str, source: &str) -> ! {
    assert!(!errors.is_empty());

    install_report_hook();
    report_parse_errors(&errors, source_path, source);

    std::process::exit(1);
}
