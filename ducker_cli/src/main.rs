// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
mod theme;

use std::path::Path;

use clap::{Parser as ClapParser, Subcommand};
use cliclack::{input, intro, log, outro, set_theme};
use ducker_cli::{
    OutputFormat, ReplConfig, ReplInput, Session, exit_with_parse_errors, format_program,
    format_tokens, install_report_hook, read_source, report_parse_errors, user_name,
};
use ducker_parser::{ParseOptions, parse_with_options, tokenize};
use theme::DefaultTheme;
use tracing_subscriber::EnvFilter;

/// A Dockerfile parser and REPL
#[derive(Debug, ClapParser)] // requires `derive` feature
#[command(name = "ducker")]
#[command(about = "A Dockerfile parser and REPL", long_about = None)]
struct Cli {
    /// Log parser recovery steps (same as DUCKER_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parses a file and prints the program
    Parse {
        /// The path of the file to parse
        path: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Silently drop malformed flags and instructions without a grammar
        #[arg(long)]
        compat: bool,
    },

    /// Prints the tokens of a file, one per line
    Lex {
        /// The path of the file to lex
        path: String,
    },

    /// Runs the REPL
    Repl {
        /// Silently drop malformed flags and instructions without a grammar
        #[arg(long)]
        compat: bool,

        /// Echo the token stream of every chunk
        #[arg(short, long)]
        tokens: bool,
    },
}

fn parse_options(compat: bool) -> ParseOptions {
    if compat {
        ParseOptions::compat()
    } else {
        ParseOptions::default()
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DUCKER_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Parse {
            path,
            format,
            compat,
        } => {
            let source = read_source(Path::new(&path))?;
            let result = parse_with_options(&source, parse_options(compat));

            if !result.errors.is_empty() {
                exit_with_parse_errors(result.errors, &path, &source);
            }

            let output = format_program(&result.program, format)?;
            println!("{}", output.trim_end());
        }
        Command::Lex { path } => {
            let source = read_source(Path::new(&path))?;
            print!("{}", format_tokens(&tokenize(&source)));
        }
        Command::Repl { compat, tokens } => {
            run_repl(ReplConfig {
                options: parse_options(compat),
                show_tokens: tokens,
            })?;
        }
    }
    Ok(())
}

fn run_repl(config: ReplConfig) -> Result<(), Box<dyn std::error::Error>> {
    ctrlc::set_handler(|| std::process::exit(0))?;
    install_report_hook();
    set_theme(DefaultTheme);

    let mut session = Session::new(config);
    let mut placeholder = "Enter a line of Dockerfile".to_string();

    println!("\n");
    intro(format!(
        "Whalecome {}! This is the Ducker REPL (type exit or ctrl+c to exit)",
        user_name()
    ))?;

    loop {
        let prompt = if session.is_continuing() { "..." } else { "" };
        let line: String = input(prompt)
            .placeholder(&placeholder)
            .required(false)
            .interact()?;

        let chunk = match session.push_line(&line) {
            ReplInput::Exit => break,
            ReplInput::ToggleTokens => {
                let state = if session.config().show_tokens {
                    "on"
                } else {
                    "off"
                };
                log::info(format!("token echo {state}"))?;
                continue;
            }
            ReplInput::Incomplete => continue,
            ReplInput::Chunk(chunk) => chunk,
        };

        if let Some(first_line) = chunk.lines().next().filter(|l| !l.trim().is_empty()) {
            placeholder = first_line.to_string();
        }

        if session.config().show_tokens {
            print!("{}", format_tokens(&tokenize(&chunk)));
        }

        let result = session.parse(&chunk);
        if !result.program.is_empty() {
            println!("{}", result.program);
        }
        if !result.errors.is_empty() {
            report_parse_errors(&result.errors, "<stdin>", &chunk);
        }
    }

    outro("Bye!")?;
    Ok(())
}
