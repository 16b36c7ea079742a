//! JSON I/O handling for the CLI.
//!
//! - Input: one JSON value per stdin line, or a JSON file for config/claims.
//! - Output: one JSON object per stdout line.
//! - UTF-8 only.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a single JSON value from stdin and deserialize it as `T`.
pub fn read_stdin_json<T: DeserializeOwned>() -> CliResult<T> {
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::request_error("expected a JSON request body on stdin, got none"));
    }

    Ok(serde_json::from_str(&line)?)
}

/// Read newline-delimited JSON values from stdin (used by `serve`).
pub fn read_stdin_lines() -> impl Iterator<Item = CliResult<Value>> {
    let stdin = io::stdin();
    stdin.lock().lines().filter_map(|line| {
        let line = match line {
            Ok(l) => l,
            Err(e) => return Some(Err(CliError::from(e))),
        };
        if line.trim().is_empty() {
            return None;
        }
        Some(serde_json::from_str(&line).map_err(CliError::from))
    })
}

/// Read and deserialize a JSON file (config/claims/registry inputs).
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = fs::read_to_string(path).map_err(|e| CliError::claims_error(format!("failed to read {:?}: {}", path, e)))?;
    serde_json::from_str(&content).map_err(|e| CliError::claims_error(format!("invalid JSON in {:?}: {}", path, e)))
}

/// Write a success response to stdout.
pub fn write_response(data: impl Serialize) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data,
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout, carrying the component envelope when present.
pub fn write_cli_error(err: &CliError) -> CliResult<()> {
    let response = match err.envelope() {
        Some(envelope) => serde_json::json!({
            "status": "error",
            "code": err.code_str(),
            "message": err.message(),
            "envelope": envelope,
        }),
        None => serde_json::json!({
            "status": "error",
            "code": err.code_str(),
            "message": err.message(),
        }),
    };

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
