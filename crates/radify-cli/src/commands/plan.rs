//! `radify plan`: Preview the translation without writing files.

use anyhow::Context;
use clap::Args;

use super::TranslateArgs;
use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Shared translation options.
    #[command(flatten)]
    pub translate: TranslateArgs,

    /// Print the full result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `plan` command.
///
/// Prints the resource summary followed by the generated Bicep.
///
/// # Errors
///
/// Returns an error if translation fails.
#[allow(clippy::print_stdout)]
pub fn execute(args: &PlanArgs) -> anyhow::Result<()> {
    let result = args.translate.translate()?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{json}");
        return Ok(());
    }

    output::print_warnings(&result.warnings);
    println!("Translation plan for: {}", args.translate.manifest.display());
    println!();
    println!("{}", output::format_summary(&result.resources));
    if !result.bicep.is_empty() {
        println!();
        print!("{}", result.bicep);
    }
    Ok(())
}
