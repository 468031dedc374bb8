//! Pack resolution engine: candidate collection, transitive propagation,
//! divergence checks, compile ordering, and the registry of published packs.

pub mod compiler;
pub mod error;
pub mod filter;
pub mod graph;
pub mod registry;
pub mod report;
pub mod resolver;

