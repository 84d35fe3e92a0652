//! `radify convert`: Translate a manifest and write `app.bicep`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use radify_common::constants::OUTPUT_FILE;
use radify_translate::TranslateResult;

use super::TranslateArgs;
use crate::output;

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Shared translation options.
    #[command(flatten)]
    pub translate: TranslateArgs,

    /// Directory receiving the generated `app.bicep`.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Executes the `convert` command.
///
/// # Errors
///
/// Returns an error if translation fails or the output cannot be written.
#[allow(clippy::print_stdout)]
pub fn execute(args: &ConvertArgs) -> anyhow::Result<()> {
    tracing::info!(path = %args.translate.manifest.display(), "converting manifest");
    let result = args.translate.translate()?;
    output::print_warnings(&result.warnings);

    match write_bicep(&result, &args.output_dir)? {
        Some(path) => {
            println!("{}", output::format_summary(&result.resources));
            println!("Wrote {}", path.display());
        }
        None => println!("Nothing to write"),
    }
    Ok(())
}

/// Writes the Bicep document into `dir`, returning the written path.
///
/// Returns `None` without touching the filesystem when the document is empty.
fn write_bicep(result: &TranslateResult, dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    if result.bicep.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(OUTPUT_FILE);
    std::fs::write(&path, &result.bicep)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = result.bicep.len(), "wrote bicep");
    Ok(Some(path))
}
