//! Core types for locator system

use action_primitives::{ElementState, HandleRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
pub const DEFAULT_EXISTS_RETRIES: u32 = 1;

/// Addressing strategy enumeration
///
/// Strategies are tried in [`StrategyKind::fallback_chain`] order: identity
/// and semantic strategies first because they survive markup churn, text
/// matching last because it is the most locale- and layout-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "raw_selector")]
    RawSelector,
    #[serde(rename = "shadow/pierce")]
    ShadowPierce,
    #[serde(rename = "test_id")]
    TestId,
    #[serde(rename = "role")]
    Role,
    #[serde(rename = "label")]
    Label,
    #[serde(rename = "placeholder")]
    Placeholder,
    #[serde(rename = "css")]
    Css,
    #[serde(rename = "xpath")]
    XPath,
    #[serde(rename = "text")]
    Text,
}

impl StrategyKind {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::RawSelector => "raw_selector",
            StrategyKind::ShadowPierce => "shadow/pierce",
            StrategyKind::TestId => "test_id",
            StrategyKind::Role => "role",
            StrategyKind::Label => "label",
            StrategyKind::Placeholder => "placeholder",
            StrategyKind::Css => "css",
            StrategyKind::XPath => "xpath",
            StrategyKind::Text => "text",
        }
    }

    /// All strategies in fallback order
    pub const fn fallback_chain() -> [StrategyKind; 9] {
        [
            StrategyKind::RawSelector,
            StrategyKind::ShadowPierce,
            StrategyKind::TestId,
            StrategyKind::Role,
            StrategyKind::Label,
            StrategyKind::Placeholder,
            StrategyKind::Css,
            StrategyKind::XPath,
            StrategyKind::Text,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One strategy tried during a single resolution pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: StrategyKind,
    pub value: Value,
}

impl StrategyAttempt {
    pub fn new(strategy: StrategyKind, value: impl Into<Value>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }
}

/// How a handle was resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveInfo {
    /// Winning method, e.g. `css`, `get_by_role+name`, `raw_string`
    pub strategy: String,

    /// Strategy category; `None` for raw strings and live handles
    pub kind: Option<StrategyKind>,

    /// Search context, e.g. `page`, `frame(name=editor)`
    pub context: String,

    /// Strategies attempted in this pass, in order
    pub attempts: Vec<StrategyAttempt>,
}

/// Live handle paired with its resolution metadata
#[derive(Debug, Clone)]
pub struct Resolution {
    pub handle: HandleRef,
    pub info: ResolveInfo,
}

/// One resolve-and-wait cycle of the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt index
    pub attempt: u32,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<ElementState>,
    pub timeout_ms: u64,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub resolve_meta: ResolveInfo,
    pub started_at: DateTime<Utc>,
}

/// Exponential backoff between retry cycles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Number of physical attempts; always at least one
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Delay after failed attempt `attempt` (1-based):
    /// `min(initial_delay * backoff_factor^(attempt-1), max_delay)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let seconds = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let cap = self.max_delay.as_secs_f64();
        if !seconds.is_finite() || seconds >= cap {
            self.max_delay
        } else {
            Duration::from_secs_f64(seconds.max(0.0))
        }
    }
}

/// Per-call overrides for `find`; unset fields use the engine defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub wait_for: Option<ElementState>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    pub initial_delay: Option<Duration>,
    pub backoff_factor: Option<f64>,
    pub max_delay: Option<Duration>,
}

impl FindOptions {
    /// Resolve only; no waiting phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the element to become visible
    pub fn visible() -> Self {
        Self::new().with_state(ElementState::Visible)
    }

    pub fn with_state(mut self, state: ElementState) -> Self {
        self.wait_for = Some(state);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = Some(factor);
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    pub(crate) fn policy(&self, defaults: &RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries.unwrap_or(defaults.retries),
            initial_delay: self.initial_delay.unwrap_or(defaults.initial_delay),
            backoff_factor: self.backoff_factor.unwrap_or(defaults.backoff_factor),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
        }
    }
}

/// Per-call overrides for `exists`
///
/// Without a timeout the check is a single non-blocking count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistsOptions {
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    pub initial_delay: Option<Duration>,
    pub backoff_factor: Option<f64>,
    pub max_delay: Option<Duration>,
}

impl ExistsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = Some(factor);
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    pub(crate) fn policy(&self, defaults: &RetryPolicy, default_retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries.unwrap_or(default_retries),
            initial_delay: self.initial_delay.unwrap_or(defaults.initial_delay),
            backoff_factor: self.backoff_factor.unwrap_or(defaults.backoff_factor),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
        }
    }
}

/// Successful `find` with its retry attempt log
#[derive(Debug, Clone)]
pub struct FindReport {
    pub handle: HandleRef,
    pub info: ResolveInfo,
    pub attempts: Vec<RetryAttempt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_sequence_doubles_until_capped() {
        let policy = RetryPolicy::default();
        let delays: Vec<f64> = (1..=5).map(|n| policy.delay_for(n).as_secs_f64()).collect();
        assert_eq!(delays, vec![0.5, 1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn backoff_handles_degenerate_factors() {
        let flat = RetryPolicy {
            backoff_factor: 1.0,
            ..RetryPolicy::default()
        };
        assert_eq!(flat.delay_for(4), Duration::from_millis(500));

        let huge = RetryPolicy {
            backoff_factor: 1e300,
            ..RetryPolicy::default()
        };
        assert_eq!(huge.delay_for(10), Duration::from_secs(5));
    }

    #[test]
    fn zero_retries_still_attempts_once() {
        let policy = RetryPolicy {
            retries: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.attempts(), 1);
    }

    #[test]
    fn fallback_chain_order() {
        let chain = StrategyKind::fallback_chain();
        assert_eq!(chain.len(), 9);
        assert_eq!(chain[0], StrategyKind::RawSelector);
        assert_eq!(chain[3], StrategyKind::Role);
        assert_eq!(chain[6], StrategyKind::Css);
        assert_eq!(chain[8], StrategyKind::Text);
        let role = chain.iter().position(|k| *k == StrategyKind::Role);
        let css = chain.iter().position(|k| *k == StrategyKind::Css);
        assert!(role < css);
    }

    #[test]
    fn find_options_override_independently() {
        let defaults = RetryPolicy::default();
        let policy = FindOptions::visible()
            .with_retries(5)
            .with_max_delay(Duration::from_secs(1))
            .policy(&defaults);
        assert_eq!(policy.retries, 5);
        assert_eq!(policy.initial_delay, defaults.initial_delay);
        assert_eq!(policy.backoff_factor, defaults.backoff_factor);
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn strategy_attempts_serialize_with_category_names() {
        let attempt = StrategyAttempt::new(StrategyKind::ShadowPierce, "pierce=#x");
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["strategy"], "shadow/pierce");
        assert_eq!(json["value"], "pierce=#x");
    }
}
