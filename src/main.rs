//! replparse: statement inspector.
//!
//! Reads input lines from stdin, parses each with the configured parser,
//! and writes one JSON object per statement to stdout. Useful for
//! debugging alias tables and terminator configuration without an
//! embedding shell.
//!
//! Usage:
//!   replparse [--config FILE] [--command-only] [-v|--verbose]

use std::io::BufRead;

use replparse::{ParserConfig, StatementParser};

const USAGE: &str = "usage: replparse [--config FILE] [--command-only] [-v|--verbose]

Reads lines from stdin and writes one JSON statement per line to stdout.

  --config FILE    merge the TOML overlay FILE over the embedded defaults
  --command-only   use the lenient partial parser (completion view)
  -v, --verbose    log parser activity to stderr";

fn init_logging(verbose: bool) {
    let level = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Warn
    };
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}

fn main() {
    let mut config_path: Option<String> = None;
    let mut command_only = false;
    let mut verbose = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("--config requires a file argument");
                    std::process::exit(2);
                };
                config_path = Some(path);
            }
            "--command-only" => command_only = true,
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    init_logging(verbose);

    let config = match &config_path {
        Some(path) => ParserConfig::load_with_overlay(std::path::Path::new(path)),
        None => ParserConfig::load(),
    };
    let parser = StatementParser::new(config);

    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            eprintln!("failed to read stdin");
            std::process::exit(1);
        };

        if command_only {
            let statement = parser.parse_command_only(&line);
            println!("{}", serde_json::to_string(&statement).unwrap());
            continue;
        }

        match parser.parse(&line) {
            Ok(statement) => println!("{}", serde_json::to_string(&statement).unwrap()),
            Err(e) => {
                let error = serde_json::json!({ "error": e.to_string() });
                println!("{}", serde_json::to_string(&error).unwrap());
            }
        }
    }
}
