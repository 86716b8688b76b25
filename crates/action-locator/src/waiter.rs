//! Wait-retry orchestration and existence probing
//!
//! `find` runs resolve → wait cycles with exponential backoff between them.
//! Only state-wait timeouts are retried. Frame and resolution failures
//! surface at once, and so does any other driver error met while waiting.
//!
//! `exists` is advisory: every failure reads as "not found".

use crate::{
    errors::LocatorError,
    resolver::ElementLocator,
    selector::SelectorInput,
    types::{ExistsOptions, FindOptions, FindReport, ResolveInfo, RetryAttempt},
};
use action_primitives::{ElementState, HandleRef};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// One `exists` check
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExistsAttempt {
    pub attempt: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_meta: Option<ResolveInfo>,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ElementLocator {
    /// Resolve and, when a state is requested, wait for it with retries
    pub async fn find<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
        options: FindOptions,
    ) -> Result<HandleRef, LocatorError> {
        self.find_with_report(input, options)
            .await
            .map(|report| report.handle)
    }

    /// Like [`find`](Self::find), also returning the retry attempt log
    pub async fn find_with_report<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
        options: FindOptions,
    ) -> Result<FindReport, LocatorError> {
        let input = input.into();
        let label = input.to_string();
        let timeout = options.timeout.unwrap_or_else(|| self.config.wait.timeout());
        let timeout_ms = millis(timeout);
        let policy = options.policy(&self.config.wait.policy());
        let retries = policy.attempts();
        let mut attempts: Vec<RetryAttempt> = Vec::new();

        for attempt in 1..=retries {
            let started_at = Utc::now();
            let started = Instant::now();

            let resolution = match self.resolve_with_diagnostics(input) {
                Ok(resolution) => resolution,
                Err(err) => {
                    self.diagnostics.record(
                        err.kind(),
                        &json!({ "error": err.to_string(), "selector": label }),
                    );
                    return Err(err);
                }
            };
            self.diagnostics.record("resolve_meta", &resolution.info);

            let Some(state) = options.wait_for else {
                return Ok(FindReport {
                    handle: resolution.handle,
                    info: resolution.info,
                    attempts,
                });
            };

            let outcome = resolution.handle.wait_for(state, timeout).await;
            let mut record = RetryAttempt {
                attempt,
                success: outcome.is_ok(),
                wait_for: Some(state),
                timeout_ms,
                elapsed_ms: millis(started.elapsed()),
                error: None,
                resolve_meta: resolution.info.clone(),
                started_at,
            };

            match outcome {
                Ok(()) => {
                    attempts.push(record);
                    self.diagnostics.record(
                        "find_attempts",
                        &json!({ "selector": label, "attempts": attempts }),
                    );
                    debug!(selector = %label, attempt, "selector reached state {}", state);
                    return Ok(FindReport {
                        handle: resolution.handle,
                        info: resolution.info,
                        attempts,
                    });
                }
                Err(err) if err.is_timeout() => {
                    warn!(selector = %label, attempt, error = %err, "selector wait attempt failed");
                    record.error = Some(err.to_string());
                    attempts.push(record);
                    if attempt >= retries {
                        break;
                    }
                    let delay = policy.delay_for(attempt);
                    self.diagnostics.record(
                        "find_backoff_step",
                        &json!({
                            "selector": label,
                            "attempt": attempt,
                            "delay_s": delay.as_secs_f64(),
                            "info": attempts.last(),
                        }),
                    );
                    sleep(delay).await;
                }
                Err(err) => {
                    record.error = Some(err.to_string());
                    attempts.push(record);
                    self.diagnostics.record(
                        "find_unexpected_error",
                        &json!({ "selector": label, "attempt": attempt, "error": err.to_string() }),
                    );
                    return Err(LocatorError::Driver {
                        selector: label,
                        source: err,
                    });
                }
            }
        }

        self.diagnostics.record(
            "find_failed",
            &json!({
                "selector": label,
                "attempts": attempts,
                "retries": retries,
                "timeout_ms": timeout_ms,
            }),
        );
        Err(LocatorError::WaitTimeout {
            selector: label,
            retries,
            timeout_ms,
            attempts,
        })
    }

    /// Whether at least one element matches.
    ///
    /// With a positive timeout each check waits for `attached` then counts;
    /// otherwise it is a single immediate count.
    pub async fn exists<'a>(&self, input: impl Into<SelectorInput<'a>>, options: ExistsOptions) -> bool {
        let input = input.into();
        let label = input.to_string();
        let timeout = options.timeout.filter(|t| !t.is_zero());
        let policy = options.policy(&self.config.wait.policy(), self.config.exists.retries);
        let retries = policy.attempts();
        let mut attempts: Vec<ExistsAttempt> = Vec::new();

        for attempt in 1..=retries {
            let resolution = match self.resolve_with_diagnostics(input) {
                Ok(resolution) => resolution,
                Err(err) => {
                    attempts.push(ExistsAttempt {
                        attempt,
                        error: Some(err.to_string()),
                        ..ExistsAttempt::default()
                    });
                    self.diagnostics.record(
                        "exists_resolution_error",
                        &json!({ "selector": label, "attempts": attempts }),
                    );
                    return false;
                }
            };
            self.diagnostics.record("exists_resolve_meta", &resolution.info);

            let checked = check_once(&resolution.handle, timeout, attempt, resolution.info).await;
            let found = checked.ok;
            attempts.push(checked);
            if found {
                self.diagnostics.record(
                    "exists_result",
                    &json!({ "selector": label, "attempts": attempts }),
                );
                return true;
            }

            if attempt >= retries {
                break;
            }
            let delay = policy.delay_for(attempt);
            self.diagnostics.record(
                "exists_backoff_step",
                &json!({ "selector": label, "attempt": attempt, "delay_s": delay.as_secs_f64() }),
            );
            sleep(delay).await;
        }

        self.diagnostics.record(
            "exists_result",
            &json!({ "selector": label, "attempts": attempts }),
        );
        false
    }
}

async fn check_once(
    handle: &HandleRef,
    timeout: Option<Duration>,
    attempt: u32,
    info: ResolveInfo,
) -> ExistsAttempt {
    let mut record = ExistsAttempt {
        attempt,
        resolve_meta: Some(info),
        ..ExistsAttempt::default()
    };

    if let Some(timeout) = timeout {
        if let Err(err) = handle.wait_for(ElementState::Attached, timeout).await {
            if err.is_timeout() {
                record.wait_for_timeout_ms = Some(millis(timeout));
            } else {
                debug!(attempt, error = %err, "exists check attempt error");
            }
            record.error = Some(err.to_string());
            return record;
        }
    }

    match handle.count().await {
        Ok(count) => {
            record.count = Some(count);
            record.ok = count > 0;
        }
        Err(err) => {
            debug!(attempt, error = %err, "exists check attempt error");
            record.error = Some(err.to_string());
        }
    }
    record
}
