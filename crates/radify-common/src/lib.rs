//! # radify-common
//!
//! Shared error definitions, resource kinds, configuration model, and
//! constants used across the radify workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
