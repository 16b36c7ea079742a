//! Restore Control Service CLI entry point.
//!
//! 1. Parse args
//! 2. Dispatch to CLI commands
//! 3. Never call the service graph directly

use std::process;

use rcs::cli::{run_command, Cli};

fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run_command(cli.command) {
        let error_json = match e.envelope() {
            Some(envelope) => serde_json::json!({
                "status": "error",
                "code": e.code_str(),
                "message": e.message(),
                "envelope": envelope,
            }),
            None => serde_json::json!({
                "status": "error",
                "code": e.code_str(),
                "message": e.message(),
            }),
        };

        eprintln!("{}", error_json);
        process::exit(1);
    }
}
