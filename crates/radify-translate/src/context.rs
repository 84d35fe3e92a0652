//! Per-invocation translation state.

use std::collections::BTreeMap;

use radify_common::config::TranslateConfig;
use radify_common::types::ResourceKind;

use crate::manifest::{Manifest, ManifestResource};
use crate::output::{BicepParameter, OutputResource};

/// Mutable state threaded through the pipeline stages of one `translate` call.
#[derive(Debug)]
pub struct TranslationContext {
    /// Parsed input manifest.
    pub manifest: Manifest,
    /// Normalized configuration.
    pub config: TranslateConfig,
    /// Kind of every classified resource. Producer-errored resources are absent.
    pub kinds: BTreeMap<String, ResourceKind>,
    /// Bicep identifier of every materialized resource and parameter.
    pub identifiers: BTreeMap<String, String>,
    /// Parameter declarations.
    pub parameters: Vec<BicepParameter>,
    /// Output resource declarations.
    pub resources: Vec<OutputResource>,
    /// Non-fatal diagnostics in the order they were raised.
    pub warnings: Vec<String>,
}

impl TranslationContext {
    /// Creates a fresh context.
    #[must_use]
    pub fn new(manifest: Manifest, config: TranslateConfig) -> Self {
        Self {
            manifest,
            config: config.normalized(),
            kinds: BTreeMap::new(),
            identifiers: BTreeMap::new(),
            parameters: Vec::new(),
            resources: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records a warning and logs it.
    pub fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Returns the classified kind of `name`.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<ResourceKind> {
        self.kinds.get(name).copied()
    }

    /// Returns the Bicep identifier of `name`.
    #[must_use]
    pub fn identifier(&self, name: &str) -> Option<&str> {
        self.identifiers.get(name).map(String::as_str)
    }

    /// Returns the manifest entry for `name`.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ManifestResource> {
        self.manifest.resources.get(name)
    }

    /// Iterates over classified resources of the given kind in name order.
    pub fn resources_of<'a>(
        &'a self,
        pred: impl Fn(ResourceKind) -> bool + 'a,
    ) -> impl Iterator<Item = (&'a str, &'a ManifestResource, ResourceKind)> + 'a {
        self.kinds.iter().filter_map(move |(name, &kind)| {
            if !pred(kind) {
                return None;
            }
            self.manifest
                .resources
                .get(name)
                .map(|res| (name.as_str(), res, kind))
        })
    }

    /// Returns `true` if at least one resource was classified as translatable.
    #[must_use]
    pub fn has_translatable(&self) -> bool {
        self.kinds.values().any(|&k| k != ResourceKind::Unsupported)
    }
}
