//! `soulbrowser-locator` command line

pub mod app;
pub mod commands;
pub mod config;
pub mod env;
pub mod i18n;
pub mod output;
pub mod resolve;
pub mod runtime;
