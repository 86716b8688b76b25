//! Search-context driver seam for the SoulBrowser locator engine
//!
//! This crate defines what the engine consumes from a browser driver:
//! - [`PageDriver`] for frame routing (by name, by URL, frame roots)
//! - [`SearchContext`] for turning selectors into lazy handles, with
//!   capability-gated native addressing
//! - [`ElementHandle`] for bounded state waits, counting and basic actions
//!
//! The [`memory`] module provides a scripted, browser-free implementation.

pub mod context;
pub mod errors;
pub mod memory;
pub mod types;

pub use context::*;
pub use errors::*;
pub use types::*;
