//! Deterministic Bicep rendering.
//!
//! Declaration order is fixed: extension, the `environment` and `application`
//! parameters, manifest parameters by name, the application, backing services
//! by identifier, containers by identifier, then the gateway. Every map is
//! rendered with sorted keys.

use std::fmt::{self, Display, Write as _};

use radify_common::constants::{
    API_VERSION, APPLICATION_PARAM, BICEP_EXTENSION, ENVIRONMENT_PARAM,
};
use radify_common::error::Result;
use radify_common::types::{APPLICATION_TYPE, CONTAINER_TYPE, GATEWAY_TYPE};

use crate::context::TranslationContext;
use crate::output::{
    BicepParameter, ConnectionSpec, ContainerSpec, GatewayRoute, OutputBody, OutputResource,
    ResolvedSegment, ResolvedValue,
};

const INDENT: &str = "  ";

/// Renders the translation context as a Bicep document.
///
/// # Errors
///
/// Returns [`RenderFailure`](radify_common::error::RadifyError::RenderFailure)
/// if formatting fails.
pub fn emit(ctx: &TranslationContext) -> Result<String> {
    tracing::info!(
        parameters = ctx.parameters.len(),
        resources = ctx.resources.len(),
        "emitting bicep"
    );
    let mut w = BicepWriter::default();

    w.line(format_args!("extension {BICEP_EXTENSION}"))?;
    w.blank();
    write_parameter(
        &mut w,
        ENVIRONMENT_PARAM,
        "The Radius environment ID",
        Some(&ctx.config.environment_name),
        false,
    )?;
    write_parameter(
        &mut w,
        APPLICATION_PARAM,
        "The Radius application name",
        Some(&ctx.config.app_name),
        false,
    )?;

    let mut parameters: Vec<&BicepParameter> = ctx.parameters.iter().collect();
    parameters.sort_by(|a, b| a.name.cmp(&b.name));
    for param in parameters {
        write_parameter(
            &mut w,
            &param.name,
            &param.description,
            param.default_value.as_deref(),
            param.secure,
        )?;
    }

    for resource in of_kind(ctx, |b| matches!(b, OutputBody::Application)) {
        write_application(&mut w, resource)?;
    }
    for resource in of_kind(ctx, |b| matches!(b, OutputBody::Portable { .. })) {
        write_portable(&mut w, resource)?;
    }
    for resource in of_kind(ctx, |b| matches!(b, OutputBody::Container(_))) {
        if let OutputBody::Container(spec) = &resource.body {
            write_container(&mut w, resource, spec)?;
        }
    }
    for resource in of_kind(ctx, |b| matches!(b, OutputBody::Gateway { .. })) {
        if let OutputBody::Gateway { routes } = &resource.body {
            write_gateway(&mut w, resource, routes)?;
        }
    }

    Ok(normalize_blank_lines(&w.finish()))
}

/// Resources whose body matches `pred`, sorted by identifier.
fn of_kind(ctx: &TranslationContext, pred: fn(&OutputBody) -> bool) -> Vec<&OutputResource> {
    let mut group: Vec<&OutputResource> = ctx.resources.iter().filter(|r| pred(&r.body)).collect();
    group.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    group
}

fn write_parameter(
    w: &mut BicepWriter,
    name: &str,
    description: &str,
    default: Option<&str>,
    secure: bool,
) -> fmt::Result {
    if secure {
        w.line("@secure()")?;
    }
    w.line(format_args!("@description({})", Quoted(description)))?;
    match default.filter(|_| !secure) {
        Some(value) => w.line(format_args!("param {name} string = {}", Quoted(value)))?,
        None => w.line(format_args!("param {name} string"))?,
    }
    w.blank();
    Ok(())
}

fn resource_header(identifier: &str, radius_type: &str) -> String {
    format!("resource {identifier} '{radius_type}@{API_VERSION}' = {{")
}

fn write_application(w: &mut BicepWriter, resource: &OutputResource) -> fmt::Result {
    w.block(resource_header(&resource.identifier, APPLICATION_TYPE), "}", |w| {
        w.line(format_args!("name: {APPLICATION_PARAM}"))?;
        w.block("properties: {", "}", |w| {
            w.line(format_args!("environment: {ENVIRONMENT_PARAM}"))
        })
    })?;
    w.blank();
    Ok(())
}

fn write_portable(w: &mut BicepWriter, resource: &OutputResource) -> fmt::Result {
    let OutputBody::Portable { kind, recipe } = &resource.body else {
        return Ok(());
    };
    w.block(resource_header(&resource.identifier, kind.radius_type()), "}", |w| {
        w.line(format_args!("name: {}", Quoted(&resource.name)))?;
        w.block("properties: {", "}", |w| {
            write_ownership(w)?;
            w.line("resourceProvisioning: 'recipe'")?;
            w.block("recipe: {", "}", |w| {
                w.line(format_args!("name: {}", Quoted(recipe)))
            })
        })
    })?;
    w.blank();
    Ok(())
}

fn write_ownership(w: &mut BicepWriter) -> fmt::Result {
    w.line(format_args!("application: {}.id", radify_common::constants::APP_IDENTIFIER))?;
    w.line(format_args!("environment: {ENVIRONMENT_PARAM}"))
}

fn write_container(
    w: &mut BicepWriter,
    resource: &OutputResource,
    spec: &ContainerSpec,
) -> fmt::Result {
    w.block(resource_header(&resource.identifier, CONTAINER_TYPE), "}", |w| {
        w.line(format_args!("name: {}", Quoted(&resource.name)))?;
        w.block("properties: {", "}", |w| {
            write_ownership(w)?;
            w.block("container: {", "}", |w| write_container_body(w, spec))?;
            if !spec.connections.is_empty() {
                w.block("connections: {", "}", |w| {
                    for (name, connection) in &spec.connections {
                        write_connection(w, name, connection)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    })?;
    w.blank();
    Ok(())
}

fn write_container_body(w: &mut BicepWriter, spec: &ContainerSpec) -> fmt::Result {
    w.line(format_args!("image: {}", Quoted(&spec.image)))?;
    if !spec.command.is_empty() {
        let items: Vec<String> = spec.command.iter().map(|c| Quoted(c).to_string()).collect();
        w.line(format_args!("command: [{}]", items.join(", ")))?;
    }
    if !spec.args.is_empty() {
        let items: Vec<String> = spec.args.iter().map(|a| Interpolated(a).to_string()).collect();
        w.line(format_args!("args: [{}]", items.join(", ")))?;
    }
    if !spec.ports.is_empty() {
        w.block("ports: {", "}", |w| {
            for (name, port) in &spec.ports {
                w.block(format_args!("{}: {{", Key(name)), "}", |w| {
                    w.line(format_args!("containerPort: {}", port.container_port))?;
                    if let Some(protocol) = port.protocol.as_deref().filter(|p| *p != "TCP") {
                        w.line(format_args!("protocol: {}", Quoted(protocol)))?;
                    }
                    if let Some(scheme) = port.scheme.as_deref() {
                        w.line(format_args!("scheme: {}", Quoted(scheme)))?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }
    if !spec.env.is_empty() {
        w.block("env: {", "}", |w| {
            for (name, value) in &spec.env {
                w.block(format_args!("{}: {{", Key(name)), "}", |w| {
                    w.line(format_args!("value: {}", Interpolated(value)))
                })?;
            }
            Ok(())
        })?;
    }
    if !spec.volumes.is_empty() {
        w.block("volumes: {", "}", |w| {
            for (name, volume) in &spec.volumes {
                w.block(format_args!("{}: {{", Key(name)), "}", |w| {
                    w.line(format_args!("kind: {}", Quoted(&volume.kind)))?;
                    w.line(format_args!("mountPath: {}", Quoted(&volume.mount_path)))?;
                    if volume.read_only {
                        w.line("readOnly: true")?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn write_connection(w: &mut BicepWriter, name: &str, connection: &ConnectionSpec) -> fmt::Result {
    w.block(format_args!("{}: {{", Key(name)), "}", |w| {
        if connection.symbolic {
            w.line(format_args!("source: {}", connection.source))
        } else {
            w.line(format_args!("source: {}", Quoted(&connection.source)))
        }
    })
}

fn write_gateway(
    w: &mut BicepWriter,
    resource: &OutputResource,
    routes: &[GatewayRoute],
) -> fmt::Result {
    w.block(resource_header(&resource.identifier, GATEWAY_TYPE), "}", |w| {
        w.line(format_args!("name: {}", Quoted(&resource.name)))?;
        w.block("properties: {", "}", |w| {
            w.line(format_args!("application: {}.id", radify_common::constants::APP_IDENTIFIER))?;
            w.block("routes: [", "]", |w| {
                for route in routes {
                    w.block("{", "}", |w| {
                        w.line(format_args!("path: {}", Quoted(&route.path)))?;
                        w.line(format_args!("destination: {}", Quoted(&route.destination)))
                    })?;
                }
                Ok(())
            })
        })
    })?;
    w.blank();
    Ok(())
}

/// Line-oriented writer with two-space indentation.
#[derive(Debug, Default)]
struct BicepWriter {
    buffer: String,
    level: usize,
}

impl BicepWriter {
    fn line(&mut self, text: impl Display) -> fmt::Result {
        for _ in 0..self.level {
            self.buffer.push_str(INDENT);
        }
        writeln!(self.buffer, "{text}")
    }

    fn blank(&mut self) {
        self.buffer.push('\n');
    }

    fn block<F>(&mut self, header: impl Display, close: &str, f: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.line(header)?;
        self.level += 1;
        f(self)?;
        self.level = self.level.saturating_sub(1);
        self.line(close)
    }

    fn finish(self) -> String {
        self.buffer
    }
}

/// A Bicep single-quoted string literal.
struct Quoted<'a>(&'a str);

impl Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('\'')?;
        write_escaped(f, self.0)?;
        f.write_char('\'')
    }
}

/// A resolved value as a Bicep string, with `${...}` interpolation for
/// symbolic segments.
struct Interpolated<'a>(&'a ResolvedValue);

impl Display for Interpolated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('\'')?;
        for segment in self.0.segments() {
            match segment {
                ResolvedSegment::Text(text) => write_escaped(f, text)?,
                ResolvedSegment::Symbol(expr) => write!(f, "${{{expr}}}")?,
            }
        }
        f.write_char('\'')
    }
}

/// An object key: bare when it is a valid identifier, quoted otherwise.
struct Key<'a>(&'a str);

impl Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_identifier(self.0) {
            f.write_str(self.0)
        } else {
            Quoted(self.0).fmt(f)
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '$' if chars.peek() == Some(&'{') => f.write_str("\\$")?,
            other => f.write_char(other)?,
        }
    }
    Ok(())
}

/// Collapses runs of blank lines to one and ends the text with exactly one
/// newline.
#[must_use]
pub fn normalize_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        let _ = lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
