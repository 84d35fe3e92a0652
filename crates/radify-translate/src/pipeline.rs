//! Translation entrypoint orchestrating every stage over one
//! [`TranslationContext`].

use radify_common::config::TranslateConfig;
use radify_common::constants::EMPTY_MANIFEST_WARNING;
use radify_common::error::Result;
use radify_common::types::ResourceKind;
use serde::Serialize;

use crate::context::TranslationContext;
use crate::graph::ReferenceGraph;
use crate::manifest::ManifestSource;
use crate::output::TranslatedResource;
use crate::{classifier, emitter, mapper, resolver, sanitizer, synthesizer};

/// Outcome of a successful translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResult {
    /// Generated Bicep text; empty when nothing was translatable.
    pub bicep: String,
    /// One summary entry per generated declaration.
    pub resources: Vec<TranslatedResource>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<String>,
}

/// Translates an Aspire manifest into a Radius Bicep document.
///
/// Stages, in order: load, classify, sanitize, validate references, check
/// for cycles, map, resolve, synthesize, emit.
///
/// # Errors
///
/// Returns the first fatal error raised by any stage. No partial output is
/// produced.
pub fn translate(source: &ManifestSource, config: &TranslateConfig) -> Result<TranslateResult> {
    let manifest = source.load()?;
    let mut ctx = TranslationContext::new(manifest, config.clone());
    tracing::info!(
        app = %ctx.config.app_name,
        environment = %ctx.config.environment_name,
        resources = ctx.manifest.resources.len(),
        "starting translation"
    );

    classify_resources(&mut ctx);
    if !ctx.has_translatable() {
        ctx.warn(EMPTY_MANIFEST_WARNING.to_string());
        return Ok(TranslateResult {
            warnings: ctx.warnings,
            ..TranslateResult::default()
        });
    }

    assign_identifiers(&mut ctx)?;
    resolver::validate_references(&ctx)?;
    ReferenceGraph::from_manifest(&ctx.manifest, &ctx.kinds).check_acyclic()?;

    mapper::map_resources(&mut ctx)?;
    resolver::resolve_containers(&mut ctx)?;
    synthesizer::synthesize(&mut ctx);
    let bicep = emitter::emit(&ctx)?;

    let resources = summarize(&ctx);
    tracing::info!(
        declarations = resources.len(),
        warnings = ctx.warnings.len(),
        "translation complete"
    );
    Ok(TranslateResult {
        bicep,
        resources,
        warnings: ctx.warnings,
    })
}

fn classify_resources(ctx: &mut TranslationContext) {
    tracing::info!("classifying resources");
    let mut kinds = std::collections::BTreeMap::new();
    let mut warnings = Vec::new();

    for (name, resource) in &ctx.manifest.resources {
        if resource.is_producer_error() {
            warnings.push(format!(
                "Skipping resource {name:?}: manifest producer reported an error: {}",
                resource.error.as_deref().unwrap_or_default()
            ));
            continue;
        }

        let overridden = ctx.config.resource_overrides.contains_key(name);
        let kind = if resource.is_container() && resource.is_build_only() && !overridden {
            warnings.push(format!("Skipping build-only container resource {name:?}"));
            ResourceKind::Unsupported
        } else {
            let kind = classifier::classify(name, resource, &ctx.config.resource_overrides);
            if kind == ResourceKind::Unsupported {
                warnings.push(format!(
                    "Skipping unrecognized resource type {:?} for resource {name:?}",
                    resource.resource_type
                ));
            }
            kind
        };
        tracing::debug!(resource = %name, %kind, "resource classified");
        let _ = kinds.insert(name.clone(), kind);
    }

    ctx.kinds = kinds;
    for warning in warnings {
        ctx.warn(warning);
    }
}

/// Sanitizes materialized resources and parameters in one namespace.
fn assign_identifiers(ctx: &mut TranslationContext) -> Result<()> {
    let names = ctx
        .kinds
        .iter()
        .filter(|(_, kind)| kind.is_materialized() || **kind == ResourceKind::Parameter)
        .map(|(name, _)| name.as_str());
    ctx.identifiers = sanitizer::sanitize_all(names)?;
    tracing::debug!(identifiers = ctx.identifiers.len(), "identifiers assigned");
    Ok(())
}

/// Mapped resources by name, then parameters by name, then the gateway, then
/// the application.
fn summarize(ctx: &TranslationContext) -> Vec<TranslatedResource> {
    let mut mapped: Vec<TranslatedResource> = ctx
        .resources
        .iter()
        .filter(|r| !r.is_synthesized())
        .map(TranslatedResource::from)
        .collect();
    mapped.sort_by(|a, b| a.name.cmp(&b.name));

    let mut parameters: Vec<TranslatedResource> =
        ctx.parameters.iter().map(TranslatedResource::from).collect();
    parameters.sort_by(|a, b| a.name.cmp(&b.name));

    let mut synthesized: Vec<TranslatedResource> = ctx
        .resources
        .iter()
        .filter(|r| r.is_synthesized())
        .map(TranslatedResource::from)
        .collect();
    synthesized.sort_by_key(|r| r.kind != radify_common::types::OutputKind::Gateway);

    mapped.into_iter().chain(parameters).chain(synthesized).collect()
}

#[cfg(test)]
mod tests {
    use radify_common::error::RadifyError;
    use radify_common::types::OutputKind;

    use super::*;

    fn run(json: &str) -> Result<TranslateResult> {
        translate(&ManifestSource::from(json), &TranslateConfig::default())
    }

    #[test]
    fn empty_resources_yield_warning_only() {
        let result = run(r#"{"resources": {}}"#).expect("translate");
        assert!(result.bicep.is_empty());
        assert!(result.resources.is_empty());
        assert_eq!(result.warnings, vec![EMPTY_MANIFEST_WARNING]);
    }

    #[test]
    fn only_unsupported_resources_are_empty() {
        let result =
            run(r#"{"resources": {"tool": {"type": "executable.v0"}}}"#).expect("translate");
        assert!(result.bicep.is_empty());
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(
            result.warnings[0],
            "Skipping unrecognized resource type \"executable.v0\" for resource \"tool\""
        );
        assert_eq!(result.warnings[1], EMPTY_MANIFEST_WARNING);
    }

    #[test]
    fn producer_errored_resource_is_skipped() {
        let result = run(
            r#"{"resources": {
                "bad": {"error": "boom"},
                "api": {"type": "container.v0", "image": "api:1"}
            }}"#,
        )
        .expect("translate");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("\"bad\""), "{:?}", result.warnings);
        assert!(result.bicep.contains("resource api "));
    }

    #[test]
    fn producer_errored_external_binding_adds_no_route() {
        let result = run(
            r#"{"resources": {
                "broken": {"error": "boom",
                           "bindings": {"http": {"targetPort": 80, "external": true}}},
                "api": {"type": "container.v0", "image": "api:1"}
            }}"#,
        )
        .expect("translate");
        assert!(!result.bicep.contains("Applications.Core/gateways@"));
    }

    #[test]
    fn build_only_container_is_skipped() {
        let result = run(
            r#"{"resources": {
                "builder": {"type": "container.v1", "build": {"context": ".", "buildOnly": true}},
                "api": {"type": "container.v0", "image": "api:1"}
            }}"#,
        )
        .expect("translate");
        assert_eq!(
            result.warnings,
            vec!["Skipping build-only container resource \"builder\""]
        );
        assert!(!result.bicep.contains("builder"));
    }

    #[test]
    fn summary_order_and_kinds() {
        let result = run(
            r#"{"resources": {
                "web": {"type": "container.v0", "image": "web:1",
                        "bindings": {"http": {"targetPort": 80, "external": true}}},
                "cache": {"type": "container.v0", "image": "redis"},
                "pw": {"type": "parameter.v0", "inputs": {"value": {"secret": true}}}
            }}"#,
        )
        .expect("translate");
        let entries: Vec<(&str, OutputKind, bool)> = result
            .resources
            .iter()
            .map(|r| (r.name.as_str(), r.kind, r.synthesized))
            .collect();
        assert_eq!(
            entries,
            vec![
                (
                    "cache",
                    OutputKind::Portable(radify_common::types::PortableKind::RedisCache),
                    false,
                ),
                ("web", OutputKind::Container, false),
                ("pw", OutputKind::Parameter, false),
                ("gateway", OutputKind::Gateway, true),
                ("app", OutputKind::Application, true),
            ]
        );
    }

    #[test]
    fn identifier_collision_is_fatal() {
        let err = run(
            r#"{"resources": {
                "api-service": {"type": "container.v0", "image": "a"},
                "api_service": {"type": "container.v0", "image": "b"}
            }}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RadifyError::IdentifierCollision { .. }));
    }

    #[test]
    fn parameter_and_resource_share_identifier_namespace() {
        let err = run(
            r#"{"resources": {
                "db-pass": {"type": "parameter.v0"},
                "db_pass": {"type": "container.v0", "image": "x"}
            }}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RadifyError::IdentifierCollision { .. }));
    }

    #[test]
    fn cycle_aborts_before_mapping() {
        let err = run(
            r#"{"resources": {
                "a": {"type": "project.v0", "connectionString": "{b.connectionString}"},
                "b": {"type": "project.v0", "connectionString": "{a.connectionString}"}
            }}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "circular reference detected: a -> b -> a");
    }

    #[test]
    fn unknown_reference_aborts() {
        let err = run(
            r#"{"resources": {"api": {"type": "container.v0", "image": "a",
                "env": {"X": "{ghost.connectionString}"}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RadifyError::UnknownResource { .. }));
    }
}
