//! Dependency resolution engine: constraint intersection, highest-version
//! candidate selection, chronological backtracking, conflict explanation,
//! and lock document generation.

pub mod conflict;
pub mod graph;
pub mod resolver;
pub mod tree;

pub use conflict::ConflictReport;
pub use resolver::{resolve, Resolution, ResolutionResult, Resolver};
