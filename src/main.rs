//! mocker CLI - Command-line interface
//!
//! Commands:
//!   generate - Synthesize Go mocks from an interface source or model
//!   schema   - Print JSON schemas for input formats
//!   version  - Print the version

mod cli;

use mocker::VERSION;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Initialize tracing if MOCKER_LOG is set
    if let Ok(filter) = EnvFilter::try_from_env("MOCKER_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "generate" | "gen" => cli::cmd_generate(&args[2..]),
        "schema" => cli::cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("mocker {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        // Bare options run generate, as in `mocker --src x.go Greeter`
        flag if flag.starts_with("--") => cli::cmd_generate(&args[1..]),
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.kind(), e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
mocker - Go test-double synthesis

USAGE:
    mocker [generate] --src <file> [OPTIONS] [INTERFACE...]

COMMANDS:
    generate                     Synthesize mocks (default)
    schema <model|config>        Print a JSON schema
    version                      Print version
    help                         Print this message

OPTIONS:
    --src, --model <file>        Go source file, or a .yaml/.json model
    --dst, -o <file>             Output file (stdout when omitted)
    --pkg <name>                 Package clause of the output
    --prefix <str>               Mock type name prefix
    --suffix <str>               Mock type name suffix
    --selfpkg <path>             Import path of the output package
                                 (default: derived from go.mod)
    --srcpkg <path>              Import path of the source package
                                 (default: derived from go.mod)
    --intf <A,B>                 Interfaces to mock (or list them positionally)
    --config <file>              Config file (default: mocker.yaml next to dst)
    --gofmt                      Format with the external gofmt binary
    --template-dir <dir>         Directory holding a replacement mock.go.jinja

ENVIRONMENT:
    MOCKER_LOG                   Log filter, e.g. MOCKER_LOG=mocker=debug
"#
    );
}
