//! Expression resolution and connection wiring.
//!
//! Turns the `{resource.path}` references found in container environment
//! variables and arguments into literal text or Bicep interpolations, and
//! records a connection edge for every reference that names a network
//! address or a backing service.

use radify_common::error::{RadifyError, Result};
use radify_common::types::ResourceKind;

use crate::context::TranslationContext;
use crate::expression::{CompositeValue, Expression, Segment};
use crate::manifest::{Binding, ManifestResource};
use crate::output::{ConnectionSpec, Connections, OutputBody, ResolvedValue};

/// Checks that every reference in a classified resource names a classified
/// resource.
///
/// # Errors
///
/// Returns [`RadifyError::UnknownResource`] for the first unknown target, in
/// resource name order.
pub fn validate_references(ctx: &TranslationContext) -> Result<()> {
    for name in ctx.kinds.keys() {
        let Some(resource) = ctx.resource(name) else {
            continue;
        };
        for value in resource.expression_values() {
            for expr in CompositeValue::parse(value).expressions() {
                if ctx.kind(&expr.resource).is_none() {
                    return Err(RadifyError::UnknownResource {
                        source_resource: name.clone(),
                        target: expr.resource.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Resolves the environment and arguments of every mapped container.
///
/// Connections found in the environment and in the arguments are unioned into
/// the container's connections map. A container never connects to itself.
///
/// # Errors
///
/// Returns the first resolution error encountered.
pub fn resolve_containers(ctx: &mut TranslationContext) -> Result<()> {
    tracing::info!("resolving expressions");
    let mut resolved = Vec::new();
    {
        let resolver = Resolver::new(ctx);
        for (idx, output) in ctx.resources.iter().enumerate() {
            if !matches!(output.body, OutputBody::Container(_)) {
                continue;
            }
            let Some(resource) = ctx.resource(&output.name) else {
                continue;
            };
            resolved.push((idx, resolver.resolve_container(&output.name, resource)?));
        }
    }

    for (idx, (env, args, connections)) in resolved {
        if let Some(OutputBody::Container(spec)) = ctx.resources.get_mut(idx).map(|r| &mut r.body) {
            spec.env = env;
            spec.args = args;
            spec.connections = connections;
        }
    }
    Ok(())
}

type ContainerValues = (
    std::collections::BTreeMap<String, ResolvedValue>,
    Vec<ResolvedValue>,
    Connections,
);

/// Resolves composite values against a translation context.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    ctx: &'a TranslationContext,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over `ctx`.
    #[must_use]
    pub const fn new(ctx: &'a TranslationContext) -> Self {
        Self { ctx }
    }

    fn resolve_container(
        &self,
        name: &str,
        resource: &ManifestResource,
    ) -> Result<ContainerValues> {
        let mut connections = Connections::new();

        let mut env = std::collections::BTreeMap::new();
        for (key, raw) in &resource.env {
            let value = self.resolve(name, raw, &mut connections)?;
            let _ = env.insert(key.clone(), value);
        }

        let args = resource
            .args
            .iter()
            .map(|raw| self.resolve(name, raw, &mut connections))
            .collect::<Result<Vec<_>>>()?;

        let _ = connections.remove(name);
        tracing::debug!(
            resource = name,
            connections = connections.len(),
            "container values resolved"
        );
        Ok((env, args, connections))
    }

    /// Resolves a raw manifest string found on resource `source`.
    ///
    /// Connection edges discovered during resolution, including those of
    /// recursively resolved targets, are added to `connections`.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference names an unknown resource or binding,
    /// or uses an unsupported property path.
    pub fn resolve(
        &self,
        source: &str,
        raw: &str,
        connections: &mut Connections,
    ) -> Result<ResolvedValue> {
        self.resolve_composite(source, &CompositeValue::parse(raw), connections)
    }

    fn resolve_composite(
        &self,
        source: &str,
        value: &CompositeValue,
        connections: &mut Connections,
    ) -> Result<ResolvedValue> {
        let mut resolved = ResolvedValue::default();
        for segment in value.segments() {
            match segment {
                Segment::Literal(text) => resolved.push_text(text.as_str()),
                Segment::Reference(expr) => {
                    resolved.append(self.resolve_expression(source, expr, connections)?);
                }
            }
        }
        Ok(resolved)
    }

    fn resolve_expression(
        &self,
        source: &str,
        expr: &Expression,
        connections: &mut Connections,
    ) -> Result<ResolvedValue> {
        let target = expr.resource.as_str();
        let kind = self
            .ctx
            .kind(target)
            .ok_or_else(|| RadifyError::UnknownResource {
                source_resource: source.to_string(),
                target: target.to_string(),
            })?;

        if kind == ResourceKind::Parameter {
            return Ok(ResolvedValue::symbol(self.identifier(target)));
        }
        if expr.is_connection_string() {
            return self.resolve_connection_string(target, kind, connections);
        }
        if let Some((binding, Some(property))) = expr.binding_property() {
            return self.resolve_binding(expr, kind, binding, property, connections);
        }
        if kind == ResourceKind::Value {
            return self.resolve_value(target, connections);
        }
        Err(unsupported(expr))
    }

    fn resolve_connection_string(
        &self,
        target: &str,
        kind: ResourceKind,
        connections: &mut Connections,
    ) -> Result<ResolvedValue> {
        match kind {
            ResourceKind::Portable(_) => Ok(self.portable_reference(target, connections)),
            ResourceKind::Value => self.resolve_value(target, connections),
            _ => {
                let resource = self.manifest_resource(target)?;
                match template(resource) {
                    Some(template) => {
                        let value = self.resolve_composite(target, &template, connections)?;
                        if kind == ResourceKind::Container {
                            if let Some(text) = value.as_literal() {
                                let _ = connections
                                    .entry(target.to_string())
                                    .or_insert_with(|| ConnectionSpec::literal(text));
                            }
                        }
                        Ok(value)
                    }
                    None => {
                        let url = resource
                            .first_binding()
                            .map_or_else(|| Binding::default().url(target), |b| b.url(target));
                        Ok(literal_edge(target, url, connections))
                    }
                }
            }
        }
    }

    fn resolve_binding(
        &self,
        expr: &Expression,
        kind: ResourceKind,
        binding_name: &str,
        property: &str,
        connections: &mut Connections,
    ) -> Result<ResolvedValue> {
        let target = expr.resource.as_str();
        if kind.is_portable() {
            return Ok(self.portable_reference(target, connections));
        }

        let resource = self.manifest_resource(target)?;
        let binding = resource
            .bindings
            .get(binding_name)
            .ok_or_else(|| RadifyError::UnknownBinding {
                resource: target.to_string(),
                binding: binding_name.to_string(),
                expression: expr.raw.clone(),
            })?;

        match property {
            "url" => Ok(literal_edge(target, binding.url(target), connections)),
            "host" => Ok(ResolvedValue::text(target)),
            "port" => Ok(ResolvedValue::text(binding.resolved_port().to_string())),
            _ => Err(unsupported(expr)),
        }
    }

    /// Inlines a value resource: its connection-string template resolved in
    /// its own context, else its literal value.
    fn resolve_value(&self, target: &str, connections: &mut Connections) -> Result<ResolvedValue> {
        let resource = self.manifest_resource(target)?;
        match template(resource) {
            Some(template) => self.resolve_composite(target, &template, connections),
            None => Ok(ResolvedValue::text(resource.value.clone().unwrap_or_default())),
        }
    }

    fn portable_reference(&self, target: &str, connections: &mut Connections) -> ResolvedValue {
        let reference = format!("{}.id", self.identifier(target));
        let _ = connections.insert(target.to_string(), ConnectionSpec::symbolic(reference.clone()));
        ResolvedValue::symbol(reference)
    }

    fn manifest_resource(&self, name: &str) -> Result<&'a ManifestResource> {
        self.ctx
            .resource(name)
            .ok_or_else(|| RadifyError::UnknownResource {
                source_resource: name.to_string(),
                target: name.to_string(),
            })
    }

    fn identifier(&self, name: &str) -> String {
        self.ctx
            .identifier(name)
            .map_or_else(|| crate::sanitizer::sanitize(name), str::to_string)
    }
}

/// Parses the non-empty connection-string template of a resource.
fn template(resource: &ManifestResource) -> Option<CompositeValue> {
    resource
        .connection_string
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(CompositeValue::parse)
}

fn literal_edge(target: &str, url: String, connections: &mut Connections) -> ResolvedValue {
    let _ = connections
        .entry(target.to_string())
        .or_insert_with(|| ConnectionSpec::literal(url.clone()));
    ResolvedValue::text(url)
}

fn unsupported(expr: &Expression) -> RadifyError {
    RadifyError::UnsupportedExpression {
        resource: expr.resource.clone(),
        expression: expr.raw.clone(),
    }
}
