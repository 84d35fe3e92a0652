//! Manifest loading built on `serde_json`.
//!
//! Transforms raw manifest bytes into a validated [`Manifest`] through
//! decoding and structural validation.

pub mod model;
pub mod validator;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use radify_common::error::{RadifyError, Result};
use serde::Deserialize;

pub use self::model::{Binding, Manifest, ManifestResource};

/// Where a manifest is read from.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    /// A manifest file on disk.
    Path(PathBuf),
    /// Manifest bytes already in memory.
    Bytes(Vec<u8>),
}

impl ManifestSource {
    /// Loads and validates the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the bytes are not valid
    /// JSON, or a required field is missing.
    pub fn load(&self) -> Result<Manifest> {
        match self {
            Self::Path(path) => Manifest::from_path(path),
            Self::Bytes(bytes) => Manifest::from_slice(bytes),
        }
    }
}

impl From<&Path> for ManifestSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ManifestSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for ManifestSource {
    /// Treats the string as manifest JSON text.
    fn from(json: &str) -> Self {
        Self::Bytes(json.as_bytes().to_vec())
    }
}

/// Decoding shape with `resources` optional so its absence can be reported
/// as a missing field rather than a decoder error.
#[derive(Deserialize)]
struct RawManifest {
    #[serde(rename = "$schema", default)]
    schema: Option<String>,
    #[serde(default)]
    resources: Option<BTreeMap<String, ManifestResource>>,
}

impl Manifest {
    /// Reads and parses the manifest file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RadifyError::FileNotFound`] if the file does not exist, and
    /// the errors of [`Manifest::from_slice`] otherwise.
    pub fn from_path(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "reading manifest");
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RadifyError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                RadifyError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_slice(&bytes)
    }

    /// Parses manifest JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RadifyError::MalformedInput`] for invalid JSON and
    /// [`RadifyError::MissingRequiredField`] if validation fails.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawManifest =
            serde_json::from_slice(bytes).map_err(|e| RadifyError::MalformedInput {
                message: e.to_string(),
            })?;

        let resources = raw.resources.ok_or(RadifyError::MissingRequiredField {
            resource: None,
            field: "resources",
        })?;

        let manifest = Self {
            schema: raw.schema,
            resources,
        };
        validator::validate(&manifest)?;
        tracing::debug!(resources = manifest.resources.len(), "manifest parsed");
        Ok(manifest)
    }
}
