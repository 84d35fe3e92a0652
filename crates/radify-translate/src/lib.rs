//! # radify-translate
//!
//! Translation pipeline from an Aspire application manifest to a Radius
//! Bicep document.
//!
//! Handles:
//! - **Manifest**: JSON decoding and structural validation.
//! - **Classifier**: resource kinds, including backing-service detection.
//! - **Sanitizer**: collision-free Bicep identifiers.
//! - **Expressions**: parsing, cycle detection and resolution of
//!   `{resource.path}` references.
//! - **Mapper / Synthesizer**: output records, the application and the gateway.
//! - **Emitter**: deterministic Bicep text.
//!
//! The entrypoint is [`translate`].

pub mod classifier;
pub mod context;
pub mod detector;
pub mod emitter;
pub mod expression;
pub mod graph;
pub mod manifest;
pub mod mapper;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod sanitizer;
pub mod synthesizer;

pub use manifest::ManifestSource;
pub use output::TranslatedResource;
pub use pipeline::{TranslateResult, translate};
