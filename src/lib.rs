//! SoulBrowser locator: library facade, settings discovery and CLI
//!
//! Re-exports the engine ([`action_locator`]) and the driver seam
//! ([`action_primitives`]) so embedders depend on a single crate.

pub mod cli;
pub mod settings;

pub use action_locator as locator;
pub use action_primitives as primitives;

pub use action_locator::{
    ElementLocator, ExistsOptions, FindOptions, LocatorConfig, LocatorError, PageActions,
    ResolveInfo, Selector, SelectorInput,
};
pub use action_primitives::{ElementHandle, ElementState, PageDriver, SearchContext};
