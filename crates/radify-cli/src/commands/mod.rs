//! CLI command definitions and dispatch.

pub mod convert;
pub mod plan;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use radify_common::config::TranslateConfig;
use radify_common::constants::DEFAULT_MANIFEST;
use radify_common::types::ResourceKind;
use radify_translate::{ManifestSource, TranslateResult};

use crate::output::parse_pair;

/// radify: translate Aspire manifests into Radius Bicep.
#[derive(Parser, Debug)]
#[command(name = radify_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a manifest and write `app.bicep`.
    Convert(convert::ConvertArgs),
    /// Print the translation summary and Bicep without writing files.
    Plan(plan::PlanArgs),
}

/// Translation options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct TranslateArgs {
    /// Path to the Aspire manifest.
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Radius application name.
    #[arg(long, env = "RADIFY_APP_NAME")]
    pub app_name: Option<String>,

    /// Radius environment name or ID.
    #[arg(long, env = "RADIFY_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Container image for a resource, as `name=image`. Repeatable.
    #[arg(
        long = "image-mapping",
        value_name = "NAME=IMAGE",
        env = "RADIFY_IMAGE_MAPPINGS",
        value_delimiter = ',',
        value_parser = parse_pair
    )]
    pub image_mappings: Vec<(String, String)>,

    /// Resource kind override, as `name=kind`. Repeatable.
    #[arg(
        long = "resource-override",
        value_name = "NAME=KIND",
        env = "RADIFY_RESOURCE_OVERRIDES",
        value_delimiter = ',',
        value_parser = parse_pair
    )]
    pub resource_overrides: Vec<(String, String)>,

    /// JSON configuration file; flags take precedence over its values.
    #[arg(long, env = "RADIFY_CONFIG")]
    pub config: Option<PathBuf>,
}

impl TranslateArgs {
    /// Builds the translation configuration from the config file and flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or an override
    /// names an unknown kind.
    pub fn to_config(&self) -> anyhow::Result<TranslateConfig> {
        let mut config = match &self.config {
            Some(path) => TranslateConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => TranslateConfig::default(),
        };

        if let Some(name) = &self.app_name {
            config.app_name.clone_from(name);
        }
        if let Some(env) = &self.environment {
            config.environment_name.clone_from(env);
        }
        for (name, image) in &self.image_mappings {
            let _ = config.image_mappings.insert(name.clone(), image.clone());
        }
        for (name, kind) in &self.resource_overrides {
            let kind: ResourceKind = kind
                .parse()
                .with_context(|| format!("invalid --resource-override for {name:?}"))?;
            let _ = config.resource_overrides.insert(name.clone(), kind);
        }
        Ok(config.normalized())
    }

    /// Runs the translation.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or translation fails.
    pub fn translate(&self) -> anyhow::Result<TranslateResult> {
        let config = self.to_config()?;
        tracing::debug!(?config, "resolved configuration");
        let source = ManifestSource::from(self.manifest.as_path());
        radify_translate::translate(&source, &config)
            .with_context(|| format!("failed to translate {}", self.manifest.display()))
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Convert(args) => convert::execute(&args),
        Command::Plan(args) => plan::execute(&args),
    }
}
