//! Conversion of resource names into Bicep identifiers.

use std::collections::{BTreeMap, HashMap};

use radify_common::constants::{IDENTIFIER_PREFIX, PLACEHOLDER_IDENTIFIER, RESERVED_IDENTIFIERS};
use radify_common::error::{RadifyError, Result};

/// Converts a resource name into a valid Bicep identifier.
///
/// Rules, in order:
///
/// 1. `-` becomes `_`.
/// 2. Characters outside `[A-Za-z0-9_]` are dropped.
/// 3. A leading digit gets the `r_` prefix.
/// 4. An empty result becomes `r_unnamed`.
///
/// The function is idempotent.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert_str(0, IDENTIFIER_PREFIX);
    }
    if result.is_empty() {
        result.push_str(PLACEHOLDER_IDENTIFIER);
    }
    result
}

/// Sanitizes every name and checks that no two share an identifier.
///
/// Names are processed in sorted order. Identifiers owned by synthesized
/// declarations (`app`, `gateway`, `environment`, `application`) receive the
/// `r_` prefix before the collision check.
///
/// # Errors
///
/// Returns [`RadifyError::IdentifierCollision`] naming both resources when
/// two distinct names produce the same identifier.
pub fn sanitize_all<'a, I>(names: I) -> Result<BTreeMap<String, String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = names.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut result = BTreeMap::new();
    let mut owners: HashMap<String, &str> = HashMap::with_capacity(sorted.len());

    for name in sorted {
        let mut identifier = sanitize(name);
        if RESERVED_IDENTIFIERS.contains(&identifier.as_str()) {
            identifier.insert_str(0, IDENTIFIER_PREFIX);
        }

        if let Some(existing) = owners.get(&identifier) {
            return Err(RadifyError::IdentifierCollision {
                first: (*existing).to_string(),
                second: name.to_string(),
                identifier,
            });
        }

        let _ = owners.insert(identifier.clone(), name);
        let _ = result.insert(name.to_string(), identifier);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_hyphens() {
        assert_eq!(sanitize("my-api-service"), "my_api_service");
    }

    #[test]
    fn sanitize_drops_invalid_characters() {
        assert_eq!(sanitize("web.frontend"), "webfrontend");
        assert_eq!(sanitize("cache@v2!"), "cachev2");
        assert_eq!(sanitize("café"), "caf");
    }

    #[test]
    fn sanitize_prefixes_leading_digit() {
        assert_eq!(sanitize("123worker"), "r_123worker");
        assert_eq!(sanitize("-1"), "_1", "underscore is not a digit");
    }

    #[test]
    fn sanitize_empty_results_use_placeholder() {
        assert_eq!(sanitize(""), "r_unnamed");
        assert_eq!(sanitize("..."), "r_unnamed");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for name in ["my-api", "123abc", "...", "a.b-c", "r_unnamed", "9", "ok"] {
            let once = sanitize(name);
            assert_eq!(sanitize(&once), once, "{name}");
        }
    }

    #[test]
    fn sanitize_all_returns_one_entry_per_name() {
        let map = sanitize_all(["api", "db-primary", "7cache"]).expect("no collisions");
        assert_eq!(map.len(), 3);
        assert_eq!(map["db-primary"], "db_primary");
        assert_eq!(map["7cache"], "r_7cache");
    }

    #[test]
    fn sanitize_all_detects_collision_naming_both() {
        let err = sanitize_all(["api_service", "api-service"]).unwrap_err();
        match err {
            RadifyError::IdentifierCollision {
                first,
                second,
                identifier,
            } => {
                assert_eq!(first, "api-service");
                assert_eq!(second, "api_service");
                assert_eq!(identifier, "api_service");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sanitize_all_prefixes_reserved_identifiers() {
        let map = sanitize_all(["app", "gateway", "api"]).expect("no collisions");
        assert_eq!(map["app"], "r_app");
        assert_eq!(map["gateway"], "r_gateway");
        assert_eq!(map["api"], "api");
    }

    #[test]
    fn sanitize_all_reserved_prefix_can_collide() {
        let err = sanitize_all(["app", "r_app"]).unwrap_err();
        assert!(matches!(err, RadifyError::IdentifierCollision { .. }));
    }

    #[test]
    fn sanitize_all_empty_input() {
        let map = sanitize_all(std::iter::empty()).expect("empty");
        assert!(map.is_empty());
    }
}
