//! Row printing shared by the menu and the subcommands.
//!
//! Rows are printed as the backend returned them: one compact JSON object
//! per line, or a pretty JSON array in `--json` mode.

use std::io::{self, Write};

use serde_json::Value;
use shelfctl_core::{Row, RpcOutcome, ShelfError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One row per line
    Lines,
    /// Pretty-printed JSON array (for piping to jq)
    Json,
}

/// Print rows in the chosen format
pub fn write_rows<W: Write>(out: &mut W, rows: &[Row], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Lines => {
            for row in rows {
                writeln!(out, "{}", Value::Object(row.clone()))?;
            }
            Ok(())
        }
        OutputFormat::Json => {
            let array = Value::Array(rows.iter().cloned().map(Value::Object).collect());
            serde_json::to_writer_pretty(&mut *out, &array)?;
            writeln!(out)
        }
    }
}

/// Print a whole result set on one line, as returned by a write
pub fn write_result<W: Write>(out: &mut W, rows: &[Row]) -> io::Result<()> {
    let array = Value::Array(rows.iter().cloned().map(Value::Object).collect());
    writeln!(out, "{}", array)
}

/// Which remote procedure a message refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Circulation {
    Borrow,
    Return,
}

impl Circulation {
    pub fn success_message(&self, value: &Value) -> String {
        match self {
            Circulation::Borrow => format!("Borrowed successfully: {}", value),
            Circulation::Return => format!("Returned successfully: {}", value),
        }
    }

    pub fn rejected_message(&self) -> &'static str {
        match self {
            Circulation::Borrow => "Borrow failed (maybe no stock or invalid input).",
            Circulation::Return => "Return failed (maybe invalid record).",
        }
    }

    pub fn error_message(&self, err: &ShelfError) -> String {
        match self {
            Circulation::Borrow => format!("Borrow error: {}", err),
            Circulation::Return => format!("Return error: {}", err),
        }
    }
}

/// Report a borrow/return attempt; failures are printed, never propagated
pub fn write_circulation<W: Write>(
    out: &mut W,
    kind: Circulation,
    result: Result<RpcOutcome, ShelfError>,
) -> io::Result<()> {
    match result {
        Ok(RpcOutcome::Completed(value)) => writeln!(out, "{}", kind.success_message(&value)),
        Ok(RpcOutcome::Rejected) => writeln!(out, "{}", kind.rejected_message()),
        Err(err) => writeln!(out, "{}", kind.error_message(&err)),
    }
}
