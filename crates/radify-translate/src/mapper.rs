//! Conversion of classified manifest resources into output records.
//!
//! Static fields (image, command, ports, volumes, recipe) are filled here.
//! Environment variables, arguments and connections are left empty for the
//! resolver.

use std::collections::BTreeMap;

use radify_common::constants::{DEFAULT_RECIPE, VOLUME_KIND};
use radify_common::error::{RadifyError, Result};
use radify_common::types::{PortableKind, ResourceKind};

use crate::context::TranslationContext;
use crate::expression::CompositeValue;
use crate::manifest::ManifestResource;
use crate::output::{
    BicepParameter, ContainerSpec, OutputBody, OutputResource, PortSpec, VolumeSpec,
};
use crate::sanitizer::sanitize;

/// Maps every classified resource in name order.
///
/// Containers and backing services become [`OutputResource`]s, parameters
/// become [`BicepParameter`]s. Value and unsupported resources produce nothing.
/// A volume whose key is already taken on the same container is renamed and
/// reported as a warning.
///
/// # Errors
///
/// Returns [`RadifyError::MissingImage`] or [`RadifyError::MissingImageMapping`]
/// for a container without a usable image.
pub fn map_resources(ctx: &mut TranslationContext) -> Result<()> {
    tracing::info!("mapping resources");
    let mut resources = Vec::new();
    let mut parameters = Vec::new();
    let mut warnings = Vec::new();

    for (name, resource, kind) in ctx.resources_of(|_| true) {
        let identifier = ctx.identifier(name).map_or_else(|| sanitize(name), str::to_string);
        match kind {
            ResourceKind::Container => {
                let image = select_image(name, resource, &ctx.config.image_mappings)?;
                resources.push(map_container(name, resource, identifier, image, &mut warnings));
            }
            ResourceKind::Portable(portable) => {
                resources.push(map_portable(name, portable, identifier));
            }
            ResourceKind::Parameter => parameters.push(map_parameter(name, resource, identifier)),
            ResourceKind::Value | ResourceKind::Unsupported => continue,
        }
        tracing::debug!(resource = name, %kind, "resource mapped");
    }

    ctx.resources.extend(resources);
    ctx.parameters.extend(parameters);
    for warning in warnings {
        ctx.warn(warning);
    }
    Ok(())
}

/// Picks the image of a container resource.
///
/// An image mapping always wins. Project resources and containers built from
/// source without an image require one.
fn select_image(
    name: &str,
    resource: &ManifestResource,
    mappings: &BTreeMap<String, String>,
) -> Result<String> {
    if let Some(image) = mappings.get(name).filter(|i| !i.is_empty()) {
        return Ok(image.clone());
    }
    if resource.is_project() {
        return Err(RadifyError::MissingImageMapping {
            name: name.to_string(),
        });
    }
    match resource.image.as_deref().filter(|i| !i.is_empty()) {
        Some(image) => Ok(image.to_string()),
        None if resource.build.is_some() => Err(RadifyError::MissingImageMapping {
            name: name.to_string(),
        }),
        None => Err(RadifyError::MissingImage {
            name: name.to_string(),
        }),
    }
}

fn map_container(
    name: &str,
    resource: &ManifestResource,
    identifier: String,
    image: String,
    warnings: &mut Vec<String>,
) -> OutputResource {
    let command = resource
        .entrypoint
        .iter()
        .filter(|e| !e.is_empty())
        .cloned()
        .collect();

    let ports = resource
        .bindings
        .iter()
        .filter_map(|(binding_name, binding)| {
            let port = binding.resolved_port();
            (port > 0).then(|| {
                let spec = PortSpec {
                    container_port: port,
                    protocol: non_empty(binding.protocol.as_deref()).map(str::to_ascii_uppercase),
                    scheme: non_empty(binding.scheme.as_deref()).map(str::to_string),
                };
                (binding_name.clone(), spec)
            })
        })
        .collect();

    let mounts = resource
        .volumes
        .iter()
        .map(|v| (v.name.clone(), volume_spec(&v.target, v.read_only)))
        .chain(
            resource
                .bind_mounts
                .iter()
                .map(|m| (sanitize(&m.target), volume_spec(&m.target, m.read_only))),
        );

    let mut volumes = BTreeMap::new();
    for (key, spec) in mounts {
        let unique = unique_key(&volumes, &key);
        if unique != key {
            warnings.push(format!(
                "Volume key {key:?} on resource {name:?} is already used; \
                 mount {:?} is emitted as {unique:?}",
                spec.mount_path
            ));
        }
        let _ = volumes.insert(unique, spec);
    }

    OutputResource {
        identifier,
        name: name.to_string(),
        body: OutputBody::Container(ContainerSpec {
            image,
            command,
            ports,
            volumes,
            ..ContainerSpec::default()
        }),
    }
}

/// Returns `key`, or `key_2`, `key_3`, ... when it is already taken.
fn unique_key(volumes: &BTreeMap<String, VolumeSpec>, key: &str) -> String {
    if !volumes.contains_key(key) {
        return key.to_string();
    }
    (2..)
        .map(|n| format!("{key}_{n}"))
        .find(|candidate| !volumes.contains_key(candidate))
        .unwrap_or_else(|| key.to_string())
}

fn volume_spec(target: &str, read_only: bool) -> VolumeSpec {
    VolumeSpec {
        kind: VOLUME_KIND.to_string(),
        mount_path: target.to_string(),
        read_only,
    }
}

fn map_portable(name: &str, kind: PortableKind, identifier: String) -> OutputResource {
    OutputResource {
        identifier,
        name: name.to_string(),
        body: OutputBody::Portable {
            kind,
            recipe: DEFAULT_RECIPE.to_string(),
        },
    }
}

/// Builds the parameter declaration. Secure parameters never carry a default.
fn map_parameter(name: &str, resource: &ManifestResource, identifier: String) -> BicepParameter {
    let secure = resource.inputs.values().any(|input| input.secret);
    let first_input = resource.inputs.values().next();

    let default_value = if secure {
        None
    } else {
        non_empty(resource.value.as_deref())
            .filter(|v| !CompositeValue::parse(v).has_expressions())
            .map(str::to_string)
            .or_else(|| {
                first_input
                    .and_then(|input| input.default.as_ref())
                    .and_then(|default| non_empty(default.value.as_deref()))
                    .map(str::to_string)
            })
    };

    let description = first_input
        .and_then(|input| non_empty(input.description.as_deref()))
        .map_or_else(|| format!("Parameter: {name}"), str::to_string);

    BicepParameter {
        source: name.to_string(),
        name: identifier,
        default_value,
        secure,
        description,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use radify_common::config::TranslateConfig;

    use super::*;
    use crate::manifest::Manifest;

    fn mapped(json: &str, config: TranslateConfig) -> Result<TranslationContext> {
        let manifest = Manifest::from_slice(json.as_bytes()).expect("parse");
        let mut ctx = TranslationContext::new(manifest, config);
        ctx.kinds = ctx
            .manifest
            .resources
            .iter()
            .map(|(n, r)| (n.clone(), crate::classifier::classify(n, r, &BTreeMap::new())))
            .collect();
        map_resources(&mut ctx)?;
        Ok(ctx)
    }

    fn container(ctx: &TranslationContext, name: &str) -> ContainerSpec {
        ctx.resources
            .iter()
            .find_map(|r| match &r.body {
                OutputBody::Container(spec) if r.name == name => Some(spec.clone()),
                _ => None,
            })
            .expect("container present")
    }

    #[test]
    fn container_fields_are_mapped() {
        let ctx = mapped(
            r#"{"resources": {"api": {
                "type": "container.v0",
                "image": "myapp/api:1.0",
                "entrypoint": "/app/start",
                "bindings": {
                    "http": {"scheme": "http", "protocol": "tcp", "targetPort": 8080},
                    "metrics": {"scheme": "http", "protocol": "udp", "port": 9100},
                    "none": {"scheme": "http"}
                },
                "volumes": [{"name": "data", "target": "/var/data", "readOnly": true}],
                "bindMounts": [{"source": "./conf", "target": "/etc/app-conf"}]
            }}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        let spec = container(&ctx, "api");
        assert_eq!(spec.image, "myapp/api:1.0");
        assert_eq!(spec.command, vec!["/app/start"]);
        assert_eq!(spec.ports.len(), 2, "zero-port binding skipped");
        assert_eq!(spec.ports["http"].container_port, 8080);
        assert_eq!(spec.ports["http"].protocol.as_deref(), Some("TCP"));
        assert_eq!(spec.ports["metrics"].protocol.as_deref(), Some("UDP"));
        assert_eq!(spec.ports["metrics"].container_port, 9100);
        assert!(spec.volumes["data"].read_only);
        assert_eq!(spec.volumes["data"].kind, "ephemeral");
        assert_eq!(spec.volumes["etcapp_conf"].mount_path, "/etc/app-conf");
        assert!(!spec.volumes["etcapp_conf"].read_only);
    }

    #[test]
    fn clashing_volume_keys_are_renamed_with_warning() {
        let ctx = mapped(
            r#"{"resources": {"db": {
                "type": "container.v0",
                "image": "db:1",
                "volumes": [{"name": "data", "target": "/var/lib/data"}],
                "bindMounts": [
                    {"source": "./d", "target": "/data"},
                    {"source": "./x", "target": "/a-b"},
                    {"source": "./y", "target": "/a_b", "readOnly": true}
                ]
            }}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        let spec = container(&ctx, "db");
        let keys: Vec<&str> = spec.volumes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a_b", "a_b_2", "data", "data_2"]);
        assert_eq!(spec.volumes["data"].mount_path, "/var/lib/data");
        assert_eq!(spec.volumes["data_2"].mount_path, "/data");
        assert_eq!(spec.volumes["a_b"].mount_path, "/a-b");
        assert!(spec.volumes["a_b_2"].read_only);
        assert_eq!(
            ctx.warnings,
            vec![
                "Volume key \"data\" on resource \"db\" is already used; mount \"/data\" is emitted as \"data_2\"",
                "Volume key \"a_b\" on resource \"db\" is already used; mount \"/a_b\" is emitted as \"a_b_2\"",
            ]
        );
    }

    #[test]
    fn distinct_volume_keys_raise_no_warning() {
        let ctx = mapped(
            r#"{"resources": {"db": {
                "type": "container.v0",
                "image": "db:1",
                "volumes": [{"name": "data", "target": "/data"}],
                "bindMounts": [{"source": "./c", "target": "/conf"}]
            }}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        assert_eq!(container(&ctx, "db").volumes.len(), 2);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn project_requires_image_mapping() {
        let err = mapped(
            r#"{"resources": {"web": {"type": "project.v0", "path": "../Web/Web.csproj"}}}"#,
            TranslateConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RadifyError::MissingImageMapping { ref name } if name == "web"));
        assert!(err.to_string().contains("requires an image mapping"));
    }

    #[test]
    fn project_uses_image_mapping() {
        let mut config = TranslateConfig::default();
        let _ = config
            .image_mappings
            .insert("web".into(), "registry.io/web:2".into());
        let ctx = mapped(
            r#"{"resources": {"web": {"type": "project.v1", "path": "Web.csproj"}}}"#,
            config,
        )
        .expect("map");
        assert_eq!(container(&ctx, "web").image, "registry.io/web:2");
    }

    #[test]
    fn built_container_without_image_requires_mapping() {
        let err = mapped(
            r#"{"resources": {"w": {"type": "container.v1", "build": {"context": "."}}}}"#,
            TranslateConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RadifyError::MissingImageMapping { .. }));
    }

    #[test]
    fn container_without_image_is_missing_image() {
        let err = mapped(
            r#"{"resources": {"w": {"type": "container.v0"}}}"#,
            TranslateConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RadifyError::MissingImage { .. }));
    }

    #[test]
    fn portable_gets_default_recipe() {
        let ctx = mapped(
            r#"{"resources": {"cache": {"type": "container.v0", "image": "redis"}}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        assert_eq!(
            ctx.resources[0].body,
            OutputBody::Portable {
                kind: PortableKind::RedisCache,
                recipe: "default".into()
            }
        );
    }

    #[test]
    fn value_resources_produce_nothing() {
        let ctx = mapped(
            r#"{"resources": {"v": {"type": "value.v0", "value": "x"}}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        assert!(ctx.resources.is_empty());
        assert!(ctx.parameters.is_empty());
    }

    #[test]
    fn secret_parameter_has_no_default() {
        let ctx = mapped(
            r#"{"resources": {"db-password": {
                "type": "parameter.v0",
                "value": "hunter2",
                "inputs": {"value": {"type": "string", "secret": true,
                                     "default": {"value": "changeme"}}}
            }}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        let param = &ctx.parameters[0];
        assert!(param.secure);
        assert_eq!(param.default_value, None);
        assert_eq!(param.name, "db_password");
        assert_eq!(param.description, "Parameter: db-password");
    }

    #[test]
    fn parameter_default_from_literal_value() {
        let ctx = mapped(
            r#"{"resources": {"region": {"type": "parameter.v0", "value": "westus",
                "inputs": {"value": {"type": "string", "description": "Deployment region"}}}}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        let param = &ctx.parameters[0];
        assert!(!param.secure);
        assert_eq!(param.default_value.as_deref(), Some("westus"));
        assert_eq!(param.description, "Deployment region");
    }

    #[test]
    fn parameter_expression_value_falls_back_to_input_default() {
        let ctx = mapped(
            r#"{"resources": {"tier": {"type": "parameter.v0", "value": "{tier.inputs.value}",
                "inputs": {"value": {"type": "string", "default": {"value": "basic"}}}}}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        assert_eq!(ctx.parameters[0].default_value.as_deref(), Some("basic"));
    }

    #[test]
    fn parameter_without_any_default() {
        let ctx = mapped(
            r#"{"resources": {"p": {"type": "parameter.v0", "value": "{p.inputs.value}"}}}"#,
            TranslateConfig::default(),
        )
        .expect("map");
        assert_eq!(ctx.parameters[0].default_value, None);
    }
}
