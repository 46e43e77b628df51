//! Output helpers shared by commands

use crate::error::GhmResult;
use crate::gh::CommandOutput;
use serde::Serialize;

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> GhmResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Echo what gh printed for a mutation
pub fn print_command_output(output: &CommandOutput) {
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        println!("{}", stdout);
    }

    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        eprintln!("{}", stderr);
    }
}

/// Truncate to `max` characters
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
