//! Declarations with no manifest counterpart: the application root and the
//! gateway.

use radify_common::constants::{APP_IDENTIFIER, GATEWAY_IDENTIFIER, GATEWAY_ROUTE_PATH};

use crate::context::TranslationContext;
use crate::output::{GatewayRoute, OutputBody, OutputResource};

/// Adds the application resource and, when any classified resource exposes
/// an external binding, the gateway.
pub fn synthesize(ctx: &mut TranslationContext) {
    tracing::info!("synthesizing application and gateway");
    let application = synthesize_application(ctx);
    let gateway = synthesize_gateway(ctx);

    ctx.resources.push(application);
    if let Some(gateway) = gateway {
        tracing::debug!("gateway synthesized for external bindings");
        ctx.resources.push(gateway);
    }
}

fn synthesize_application(ctx: &TranslationContext) -> OutputResource {
    OutputResource {
        identifier: APP_IDENTIFIER.to_string(),
        name: ctx.config.app_name.clone(),
        body: OutputBody::Application,
    }
}

/// Scans the bindings of every classified resource, whatever its kind.
/// Producer-errored resources are never classified and contribute nothing.
///
/// Routes are ordered by resource name, then binding declaration order.
fn synthesize_gateway(ctx: &TranslationContext) -> Option<OutputResource> {
    let routes: Vec<GatewayRoute> = ctx
        .resources_of(|_| true)
        .flat_map(|(name, resource, _)| {
            resource
                .bindings
                .values()
                .filter(|binding| binding.external)
                .map(move |binding| GatewayRoute {
                    path: GATEWAY_ROUTE_PATH.to_string(),
                    destination: binding.url(name),
                })
        })
        .collect();

    if routes.is_empty() {
        return None;
    }
    Some(OutputResource {
        identifier: GATEWAY_IDENTIFIER.to_string(),
        name: GATEWAY_IDENTIFIER.to_string(),
        body: OutputBody::Gateway { routes },
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use radify_common::config::TranslateConfig;

    use super::*;
    use crate::manifest::Manifest;

    fn synthesized(json: &str) -> TranslationContext {
        let manifest = Manifest::from_slice(json.as_bytes()).expect("parse");
        let config = TranslateConfig {
            app_name: "shop".into(),
            ..TranslateConfig::default()
        };
        let mut ctx = TranslationContext::new(manifest, config);
        ctx.kinds = ctx
            .manifest
            .resources
            .iter()
            .filter(|(_, r)| !r.is_producer_error())
            .map(|(n, r)| (n.clone(), crate::classifier::classify(n, r, &BTreeMap::new())))
            .collect();
        synthesize(&mut ctx);
        ctx
    }

    #[test]
    fn application_always_present() {
        let ctx = synthesized(r#"{"resources": {}}"#);
        assert_eq!(ctx.resources.len(), 1);
        assert_eq!(ctx.resources[0].identifier, "app");
        assert_eq!(ctx.resources[0].name, "shop");
        assert_eq!(ctx.resources[0].body, OutputBody::Application);
    }

    #[test]
    fn no_gateway_without_external_bindings() {
        let ctx = synthesized(
            r#"{"resources": {"api": {"type": "container.v0", "image": "a",
                "bindings": {"http": {"targetPort": 80}}}}}"#,
        );
        assert!(
            ctx.resources
                .iter()
                .all(|r| !matches!(r.body, OutputBody::Gateway { .. }))
        );
    }

    #[test]
    fn gateway_routes_are_ordered() {
        let ctx = synthesized(
            r#"{"resources": {
                "web": {"type": "container.v0", "image": "w",
                        "bindings": {"https": {"scheme": "https", "targetPort": 8443, "external": true},
                                     "http": {"scheme": "http", "targetPort": 8080, "external": true}}},
                "api": {"type": "container.v0", "image": "a",
                        "bindings": {"http": {"port": 5000, "external": true},
                                     "internal": {"targetPort": 9000}}},
                "tool": {"type": "executable.v0",
                         "bindings": {"http": {"targetPort": 1, "external": true}}}
            }}"#,
        );
        let gateway = ctx
            .resources
            .iter()
            .find(|r| r.identifier == "gateway")
            .expect("gateway");
        let OutputBody::Gateway { routes } = &gateway.body else {
            panic!("expected gateway body");
        };
        let destinations: Vec<&str> = routes.iter().map(|r| r.destination.as_str()).collect();
        assert_eq!(
            destinations,
            vec![
                "http://api:5000",
                "http://tool:1",
                "https://web:8443",
                "http://web:8080"
            ]
        );
        assert!(routes.iter().all(|r| r.path == "/"));
    }

    #[test]
    fn unsupported_resource_with_external_binding_gets_gateway() {
        let ctx = synthesized(
            r#"{"resources": {
                "api": {"type": "container.v0", "image": "a",
                        "bindings": {"http": {"targetPort": 80}}},
                "dash": {"type": "executable.v0",
                         "bindings": {"http": {"targetPort": 18888, "external": true}}}
            }}"#,
        );
        let gateway = ctx
            .resources
            .iter()
            .find(|r| r.identifier == "gateway")
            .expect("gateway");
        assert_eq!(
            gateway.body,
            OutputBody::Gateway {
                routes: vec![GatewayRoute {
                    path: "/".into(),
                    destination: "http://dash:18888".into(),
                }]
            }
        );
    }
}
