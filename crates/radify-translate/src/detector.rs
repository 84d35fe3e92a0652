//! Backing-service detection from container image references.
//!
//! Recognizes well-known infrastructure images so they can be translated to
//! recipe-provisioned portable resources instead of generic containers.

use radify_common::types::PortableKind;

/// Known image name prefixes, matched in order.
const BACKING_SERVICES: &[(&str, PortableKind)] = &[
    ("redis", PortableKind::RedisCache),
    ("postgres", PortableKind::SqlDatabase),
    ("mysql", PortableKind::SqlDatabase),
    ("mariadb", PortableKind::SqlDatabase),
    ("mongo", PortableKind::MongoDatabase),
    ("rabbitmq", PortableKind::RabbitMqQueue),
];

/// Returns the backing-service kind for an image, if it is a known one.
///
/// Matching is case-insensitive and ignores registry, path, tag, and digest.
#[must_use]
pub fn detect(image: &str) -> Option<PortableKind> {
    let base = base_image_name(image).to_ascii_lowercase();
    BACKING_SERVICES
        .iter()
        .find(|(prefix, _)| base.starts_with(prefix))
        .map(|&(_, kind)| kind)
}

/// Extracts the final path segment of an image reference without its tag.
///
/// `docker.io/bitnami/redis:7` yields `redis`; `localhost:5000/pg:14` yields
/// `pg` because the registry port lives in an earlier segment.
#[must_use]
pub fn base_image_name(image: &str) -> &str {
    let last = image.rsplit('/').next().unwrap_or(image);
    let last = last.split_once('@').map_or(last, |(name, _)| name);
    last.rsplit_once(':').map_or(last, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_bare_names() {
        assert_eq!(detect("redis"), Some(PortableKind::RedisCache));
        assert_eq!(detect("postgres:16"), Some(PortableKind::SqlDatabase));
        assert_eq!(detect("mysql:8"), Some(PortableKind::SqlDatabase));
        assert_eq!(detect("mariadb:11"), Some(PortableKind::SqlDatabase));
        assert_eq!(detect("mongo:7"), Some(PortableKind::MongoDatabase));
        assert_eq!(detect("rabbitmq:3-management"), Some(PortableKind::RabbitMqQueue));
    }

    #[test]
    fn detect_is_case_and_registry_insensitive() {
        let expected = Some(PortableKind::RedisCache);
        assert_eq!(detect("Redis:7"), expected);
        assert_eq!(detect("docker.io/bitnami/redis:latest"), expected);
        assert_eq!(detect("ghcr.io/org/redis:1"), expected);
        assert_eq!(detect("REGISTRY.EXAMPLE.COM/path/REDIS"), expected);
    }

    #[test]
    fn detect_prefix_variants() {
        assert_eq!(detect("redis-stack:latest"), Some(PortableKind::RedisCache));
        assert_eq!(detect("mongodb-community-server"), Some(PortableKind::MongoDatabase));
        assert_eq!(detect("postgresql"), Some(PortableKind::SqlDatabase));
    }

    #[test]
    fn detect_unknown_images_return_none() {
        assert_eq!(detect("nginx:latest"), None);
        assert_eq!(detect("myapp/api:1.0"), None);
        assert_eq!(detect(""), None);
        assert_eq!(detect("myredis"), None, "prefix must start the base name");
    }

    #[test]
    fn detect_only_inspects_final_segment() {
        assert_eq!(detect("redis.example.com/team/api:1"), None);
    }

    #[test]
    fn base_name_strips_tag_and_digest() {
        assert_eq!(base_image_name("redis:latest"), "redis");
        assert_eq!(base_image_name("myregistry.io/library/postgres:14"), "postgres");
        assert_eq!(base_image_name("localhost:5000/pg"), "pg");
        assert_eq!(base_image_name("mongo@sha256:abcd"), "mongo");
        assert_eq!(base_image_name("plain"), "plain");
    }
}
