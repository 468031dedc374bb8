//! Core data types for Packsmith.
//!
//! This crate defines the value types the resolver works over: versions and
//! version windows, namespaced identifiers, dependency declarations and
//! packs. It also owns the on-disk formats around them: pack manifests,
//! the workspace configuration and the lockfile.
//!
//! Nothing here resolves anything; see `packsmith-resolver`.

pub mod config;
pub mod dependency;
pub mod identifier;
pub mod lockfile;
pub mod manifest;
pub mod package;
pub mod version;
