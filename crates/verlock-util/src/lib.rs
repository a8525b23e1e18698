//! Shared utilities for the verlock resolution engine.
//!
//! This crate provides the cross-cutting concerns used by the other verlock
//! crates: the unified error type and content hashing for lock entries.

pub mod errors;
pub mod hash;
