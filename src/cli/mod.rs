//! CLI module for the Restore Control Service.
//!
//! One-shot subcommands (`plan create`, `job create`, `execute`, `evidence
//! export`, ...) boot a fresh in-memory service graph, run a single
//! operation, and exit. `serve` boots once and processes a stream of
//! newline-delimited JSON RPC requests, letting one process carry state
//! across a full plan → job → execute → evidence workflow.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{BootArgs, Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_stdin_json, write_cli_error, write_response};
