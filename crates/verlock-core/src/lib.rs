//! Core value types for the verlock resolution engine.
//!
//! This crate defines versions, constraint expressions, requirements, the
//! lock document format, and run configuration. It is intentionally free of
//! I/O beyond the thin lock file read/write wrappers.

pub mod config;
pub mod constraint;
pub mod lockfile;
pub mod requirement;
pub mod version;
