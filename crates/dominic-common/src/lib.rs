//! Common utilities for the dominic crates.
//!
//! This crate provides shared infrastructure used by the parser, the query
//! engine and the facade:
//! - **Warning System** - deduplicated `tracing` warnings for recovered input

pub mod warning;
