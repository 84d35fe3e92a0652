//! Formatted output helpers for CLI commands.
//!
//! Provides the `name=value` flag parser and the plain-text resource
//! summary printed by `convert` and `plan`.

use std::fmt::Write as _;

use radify_translate::TranslatedResource;

/// Parses a `name=value` pair from a repeatable flag.
///
/// # Errors
///
/// Returns a message when the `=` is missing or either side is empty.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(format!("expected NAME=VALUE, got {raw:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Formats the resource summary as an aligned table.
#[must_use]
pub fn format_summary(resources: &[TranslatedResource]) -> String {
    let name_width = resources
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    let ident_width = resources
        .iter()
        .map(|r| r.identifier.len())
        .max()
        .unwrap_or(0)
        .max("IDENTIFIER".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<name_width$}  {:<ident_width$}  TYPE", "NAME", "IDENTIFIER");
    for resource in resources {
        let marker = if resource.synthesized { " (generated)" } else { "" };
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<ident_width$}  {}{marker}",
            resource.name, resource.identifier, resource.kind
        );
    }
    let _ = write!(out, "{} resource(s)", resources.len());
    out
}

/// Writes every warning to stderr.
#[allow(clippy::print_stderr)]
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}
