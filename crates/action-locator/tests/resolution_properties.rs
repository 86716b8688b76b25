use action_locator::{
    ElementLocator, ExistsOptions, FindOptions, LocatorError, MemorySink, Selector, StrategyKind,
    Substitutions,
};
use action_primitives::memory::{MemoryPage, WaitOutcome};
use action_primitives::{Capabilities, PageDriver};
use std::sync::Arc;
use tokio::time::{Duration, Instant};

fn page() -> Arc<MemoryPage> {
    Arc::new(MemoryPage::new())
}

fn single_field_selectors() -> Vec<(Selector, StrategyKind)> {
    vec![
        (Selector::raw("#raw"), StrategyKind::RawSelector),
        (
            Selector::new().with_pierce_selector("#inner"),
            StrategyKind::ShadowPierce,
        ),
        (Selector::test_id("save"), StrategyKind::TestId),
        (Selector::role("button"), StrategyKind::Role),
        (Selector::new().with_label("Email"), StrategyKind::Label),
        (Selector::new().with_placeholder("Search"), StrategyKind::Placeholder),
        (Selector::css("#css"), StrategyKind::Css),
        (Selector::xpath("//div"), StrategyKind::XPath),
        (Selector::text("Hello"), StrategyKind::Text),
    ]
}

#[test]
fn single_field_reports_its_own_strategy() {
    for caps in [Capabilities::native(), Capabilities::selector_only()] {
        let page = Arc::new(MemoryPage::with_capabilities(caps));
        let locator = ElementLocator::new(page.clone());
        for (selector, kind) in single_field_selectors() {
            let resolution = locator.resolve_with_diagnostics(&selector).unwrap();
            assert_eq!(resolution.info.kind, Some(kind));
            assert_eq!(resolution.info.attempts.len(), 1);
            assert_eq!(resolution.info.attempts[0].strategy, kind);
        }
    }
}

#[test]
fn single_field_rejected_is_resolution_failure() {
    let page = Arc::new(MemoryPage::with_capabilities(Capabilities::selector_only()));
    let main = page.main();
    for rejected in ["#raw", "pierce=#inner", "[data-testid='save']", "#css", "xpath=//div"] {
        main.reject(rejected);
    }
    let locator = ElementLocator::new(page.clone());
    for selector in [
        Selector::raw("#raw"),
        Selector::new().with_pierce_selector("#inner"),
        Selector::test_id("save"),
        Selector::css("#css"),
        Selector::xpath("//div"),
    ] {
        let err = locator.resolve(&selector).unwrap_err();
        assert!(matches!(err, LocatorError::ResolutionFailed { .. }));
        assert_eq!(err.strategy_attempts().len(), 1);
    }
}

#[test]
fn priority_is_deterministic() {
    let locator = ElementLocator::new(page());
    let both = Selector::css("#save").with_xpath("//button[@id='save']");
    for _ in 0..5 {
        let info = locator.resolve_with_diagnostics(&both).unwrap().info;
        assert_eq!(info.strategy, "css");
    }

    let role_and_css = Selector::css("#save").with_role("button");
    let info = locator.resolve_with_diagnostics(&role_and_css).unwrap().info;
    assert_eq!(info.kind, Some(StrategyKind::Role));
}

#[test]
fn formatting_then_resolving() {
    let template = Selector::test_id("row-{id}").with_description("Row {id}");
    let mut values = Substitutions::new();
    values.insert("id".to_string(), "42".to_string());

    let locator = ElementLocator::new(page());
    let handle = locator.resolve(&template.formatted(&values)).unwrap();
    assert_eq!(handle.selector(), "test-id=row-42");

    let untouched = template.formatted(&Substitutions::new());
    assert_eq!(untouched.test_id.as_deref(), Some("row-{id}"));
}

#[tokio::test(start_paused = true)]
async fn third_attempt_success_keeps_three_records() {
    let page = page();
    page.main().script_waits(
        "#late",
        [WaitOutcome::TimedOut, WaitOutcome::TimedOut, WaitOutcome::Reached],
    );
    let locator = ElementLocator::new(page.clone());
    let report = locator
        .find_with_report(&Selector::css("#late"), FindOptions::visible().with_retries(3))
        .await
        .unwrap();

    assert_eq!(report.attempts.len(), 3);
    assert!(!report.attempts[0].success);
    assert!(!report.attempts[1].success);
    assert!(report.attempts[2].success);
    assert_eq!(page.main().located().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn never_ready_exhausts_exactly_three() {
    let locator = ElementLocator::new(page());
    let started = Instant::now();
    let err = locator
        .find(&Selector::css("#ghost"), FindOptions::visible().with_retries(3))
        .await
        .unwrap_err();
    assert_eq!(err.retry_attempts().len(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn backoff_is_capped_by_max_delay() {
    let sink = Arc::new(MemorySink::new());
    let locator = ElementLocator::new(page()).with_diagnostics(sink.clone());
    let options = FindOptions::visible()
        .with_retries(6)
        .with_initial_delay(Duration::from_millis(500))
        .with_backoff_factor(2.0)
        .with_max_delay(Duration::from_secs(5));
    locator
        .find(&Selector::css("#x"), options)
        .await
        .unwrap_err();

    let delays: Vec<f64> = sink
        .payloads("find_backoff_step")
        .iter()
        .filter_map(|p| p["delay_s"].as_f64())
        .collect();
    assert_eq!(delays, vec![0.5, 1.0, 2.0, 4.0, 5.0]);
}

#[tokio::test(start_paused = true)]
async fn exists_without_timeout_never_sleeps() {
    let page = page();
    let locator = ElementLocator::new(page.clone());
    let started = Instant::now();
    assert!(!locator.exists(&Selector::css("#none"), ExistsOptions::new()).await);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(page.main().count_calls("#none"), 1);
}

#[tokio::test]
async fn missing_frame_propagates_from_find() {
    let locator = ElementLocator::new(page());
    let selector = Selector::css("#field").in_frame_named("billing-frame");
    let err = locator
        .find(&selector, FindOptions::visible())
        .await
        .unwrap_err();
    match &err {
        LocatorError::FrameNotFound { criterion, .. } => {
            assert!(criterion.contains("billing-frame"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.retry_attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn frame_attached_between_calls_is_found() {
    let page = page();
    let locator = ElementLocator::new(page.clone());
    let selector = Selector::css("#card").in_frame_with_url("/pay");

    assert!(!locator.exists(&selector, ExistsOptions::new()).await);

    let frame = page.add_frame(None, "https://shop.test/pay?step=2");
    frame.insert("#card", 1);
    let handle = locator
        .find(&selector, FindOptions::visible())
        .await
        .unwrap();
    assert_eq!(handle.selector(), "#card");
    assert!(page.frame_by_name("missing").is_none());
}

#[test]
fn resolution_without_runtime() {
    let page = page();
    page.main().insert("role=heading", 1);
    let locator = ElementLocator::new(page.clone());
    let count = tokio_test::block_on(async {
        let handle = locator.resolve(&Selector::role("heading")).unwrap();
        handle.count().await.unwrap()
    });
    assert_eq!(count, 1);
}
