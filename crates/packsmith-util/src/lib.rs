//! Shared utilities for Packsmith.
//!
//! This crate provides the cross-cutting concerns used by every other
//! Packsmith crate: the unified error type, filesystem helpers, content hashing
//! and terminal status output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
