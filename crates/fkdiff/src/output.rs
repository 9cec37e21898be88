//! Rendering of diff operations for the terminal.

use std::fmt::Write as _;

use clap::ValueEnum;
use fkdiff_core::DiffOperation;

/// Output format for `fkdiff diff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per operation.
    Text,
    /// A JSON array of operations.
    Json,
}

/// Renders operations in the requested format, newline terminated.
pub fn render(ops: &[DiffOperation], format: Format) -> anyhow::Result<String> {
    match format {
        Format::Text => {
            let mut out = String::new();
            for op in ops {
                writeln!(out, "{op}")?;
            }
            Ok(out)
        }
        Format::Json => {
            let mut out = serde_json::to_string_pretty(ops)?;
            out.push('\n');
            Ok(out)
        }
    }
}
