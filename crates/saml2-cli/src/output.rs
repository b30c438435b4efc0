//! Output formatting utilities.

use colored::Colorize;

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message with its stable code.
pub fn error(code: &str, message: &str) {
    eprintln!("{} {} {}", "✗".red().bold(), code.red(), message);
}

/// Prints a section heading.
pub fn heading(title: &str) {
    println!("{}", title.bold().underline());
}

/// Prints aligned, colored key/value lines.
pub fn fields(rows: &[(&str, String)]) {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!("  {}  {value}", format!("{key:<width$}").cyan());
    }
}

/// Prints `item` in the requested format.
///
/// JSON output is the `serde` form of `item`; table output calls `table`.
pub fn output<T: serde::Serialize>(
    item: &T,
    format: OutputFormat,
    table: impl FnOnce(&T),
) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => table(item),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
    }
    Ok(())
}

/// Formats an optional value, with `-` for absent.
pub fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".dimmed().to_string(), |v| v.to_string())
}
