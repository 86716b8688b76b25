//! Resilient element locator for UI automation
//!
//! Turns a declarative, multi-strategy [`Selector`] into a live element
//! handle:
//! - template formatting and key-based localization of selector text
//! - context routing to named, URL-matched or css-rooted frames
//! - a fixed-priority strategy chain with native-or-fallback addressing
//! - wait-retry orchestration with exponential backoff (`find`)
//! - advisory existence probing (`exists`)
//! - best-effort diagnostics of every attempt

pub mod actions;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod errors;
pub mod i18n;
pub mod resolver;
pub mod selector;
pub mod strategies;
pub mod template;
pub mod types;
pub mod waiter;

pub use actions::*;
pub use config::*;
pub use context::*;
pub use diagnostics::*;
pub use errors::*;
pub use i18n::*;
pub use resolver::*;
pub use selector::*;
pub use strategies::*;
pub use template::{Substitutions, TemplateError};
pub use types::*;
pub use waiter::*;
