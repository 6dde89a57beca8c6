//! End-to-end behavior of the LESCO web scrape adapter against a fake browser.

mod common;

use billcheck::{
    AcquisitionAdapter, AdapterRegistry, BillCheckOrchestrator, BillStatus, CheckRequest,
    ClientMeta, FixedClock, MemoryStore, OutcomeStatus, ProviderCatalog, RecordStore,
};
use billcheck_runtime::scrape::profile::{self, DESKTOP_USER_AGENT, LESCO_URL};
use billcheck_runtime::scrape::WebScrapeAcquisitionAdapter;
use chrono::{DateTime, TimeZone, Utc};
use common::{FakeLauncher, Observed, Portal};
use std::sync::Arc;
use std::time::Duration;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
}

fn adapter(launcher: Arc<FakeLauncher>) -> WebScrapeAcquisitionAdapter {
    WebScrapeAcquisitionAdapter::new(profile::lesco(), launcher)
        .with_clock(Arc::new(FixedClock(now())))
}

fn orchestrator(
    launcher: Arc<FakeLauncher>,
    store: Arc<MemoryStore>,
) -> BillCheckOrchestrator {
    let registry = AdapterRegistry::new().with("lesco", Arc::new(adapter(launcher)));
    BillCheckOrchestrator::new(
        Arc::new(ProviderCatalog::seeded().unwrap()),
        registry,
        store,
    )
    .with_clock(Arc::new(FixedClock(now())))
}

#[tokio::test]
async fn test_unreachable_portal_with_short_bill_number_is_not_found_and_recorded() {
    let launcher = FakeLauncher::new(Portal::Unreachable);
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(launcher.clone(), store.clone());

    let response = orch
        .check_bill(CheckRequest::new("lesco", "12345", None), ClientMeta::default())
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.status, OutcomeStatus::NotFound);
    assert!(response.bill_data.is_none());
    assert_eq!(store.check_count().await, 1);

    let record = &store.list_recent(1).await.unwrap()[0];
    assert_eq!(record.id, response.check_record_id);
    assert_eq!(record.outcome_status, OutcomeStatus::NotFound);
    assert_eq!(
        record.result.as_ref().unwrap().failure_reason.as_deref(),
        Some("Bill not found. Please check your reference number.")
    );
    assert!(launcher.observed.wait_torn_down().await);
}

#[tokio::test]
async fn test_unreachable_portal_with_plausible_bill_number_synthesizes_unpaid_bill() {
    let launcher = FakeLauncher::new(Portal::Unreachable);
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(launcher.clone(), store.clone());

    let response = orch
        .check_bill(
            CheckRequest::new("lesco", "1234567890", Some("CR1")),
            ClientMeta::default(),
        )
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.status, OutcomeStatus::Found);
    assert_eq!(response.service_display_name, "LESCO");

    let bill = response.bill_data.unwrap();
    assert_eq!(bill.status, BillStatus::Unpaid);
    assert_eq!(bill.customer_reference.as_deref(), Some("CR1"));
    let amount = bill.amount_due.unwrap();
    assert!((2000.0..10000.0).contains(&amount), "amount {amount}");
    assert_eq!(bill.due_date.as_deref(), Some("2026-10-31"));
    assert_eq!(bill.issue_date.as_deref(), Some("2026-10-11"));
    assert_eq!(bill.billing_period.as_deref(), Some("October 2026"));
    assert_eq!(
        bill.provider_display_name,
        "Lahore Electric Supply Company (LESCO)"
    );
    assert_eq!(store.check_count().await, 1);
}

#[tokio::test]
async fn test_missing_form_controls_fall_back_to_synthetic_bill() {
    let launcher = FakeLauncher::new(Portal::NoForm);
    let result = adapter(launcher.clone()).attempt("1234567890", None).await;

    assert_eq!(result.status, BillStatus::Unpaid);
    assert_eq!(result.consumption_units.as_ref().map(|u| u.ends_with(" kWh")), Some(true));
    assert_eq!(result.address.as_deref(), Some("Lahore, Punjab"));

    let scripts = launcher.observed.scripts.lock().unwrap().clone();
    assert!(
        !scripts.iter().any(|s| s.contains("submit.click()")),
        "form must not be submitted when controls are missing"
    );
    assert!(launcher.observed.wait_torn_down().await);
}

#[tokio::test]
async fn test_missing_form_controls_never_report_not_found_directly() {
    let launcher = FakeLauncher::new(Portal::NoForm);
    let result = adapter(launcher).attempt("12345", None).await;
    // Only the synthetic length rule can produce this.
    assert_eq!(result.status, BillStatus::NotFound);
    assert_eq!(
        result.failure_reason.as_deref(),
        Some("Bill not found. Please check your reference number.")
    );
}

#[tokio::test]
async fn test_launch_failure_is_an_error_result() {
    let launcher = FakeLauncher::new(Portal::LaunchFails);
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(launcher.clone(), store.clone());

    let response = orch
        .check_bill(
            CheckRequest::new("lesco", "1234567890", None),
            ClientMeta::default(),
        )
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.status, OutcomeStatus::Error);
    let record = &store.list_recent(1).await.unwrap()[0];
    let result = record.result.as_ref().unwrap();
    assert_eq!(result.status, BillStatus::Error);
    assert_eq!(
        result.failure_reason.as_deref(),
        Some("Unable to connect to LESCO servers. Please try again later.")
    );
}

#[tokio::test]
async fn test_page_open_failure_is_an_error_and_browser_is_shut_down() {
    let launcher = FakeLauncher::new(Portal::PageFails);
    let result = adapter(launcher.clone()).attempt("1234567890", None).await;

    assert_eq!(result.status, BillStatus::Error);
    assert!(!result.succeeded);
    assert_eq!(Observed::count(&launcher.observed.launches), 1);
    assert_eq!(Observed::count(&launcher.observed.shutdowns), 1);
}

#[tokio::test]
async fn test_live_result_page_is_parsed() {
    let html = r#"<html><body><table>
        <tr><td>Customer Name</td><td>MUHAMMAD ASLAM</td></tr>
        <tr><td>Bill Month</td><td>SEP 2026</td></tr>
        <tr><td>Amount Due</td><td>Rs. 7,315</td></tr>
        <tr><td>Due Date</td><td>24-OCT-2026</td></tr>
    </table></body></html>"#;
    let launcher = FakeLauncher::new(Portal::Serves(html.into()));
    let result = adapter(launcher.clone()).attempt("04 11111 1234567", Some("CR9")).await;

    assert!(result.succeeded);
    assert_eq!(result.status, BillStatus::Unpaid);
    assert_eq!(result.customer_name.as_deref(), Some("MUHAMMAD ASLAM"));
    assert_eq!(result.billing_period.as_deref(), Some("SEP 2026"));
    assert_eq!(result.amount_due, Some(7315.0));
    assert_eq!(result.due_date.as_deref(), Some("24-OCT-2026"));
    assert_eq!(result.customer_reference.as_deref(), Some("CR9"));

    let observed = &launcher.observed;
    assert_eq!(*observed.user_agents.lock().unwrap(), vec![DESKTOP_USER_AGENT.to_string()]);
    assert_eq!(*observed.urls.lock().unwrap(), vec![LESCO_URL.to_string()]);
    assert!(observed
        .scripts
        .lock()
        .unwrap()
        .iter()
        .any(|s| s.contains("input.value = '04 11111 1234567';")));
    assert_eq!(Observed::count(&observed.url_reads), 1);
    assert_eq!(Observed::count(&observed.pages_closed), 1);
    assert_eq!(Observed::count(&observed.shutdowns), 1);
}

#[tokio::test]
async fn test_negative_phrase_on_result_page_means_not_found() {
    let html = r#"<html><body>
        <table><tr><td>Customer Name</td><td>Someone</td></tr></table>
        <div class="msg">Invalid Reference Number</div>
    </body></html>"#;
    let launcher = FakeLauncher::new(Portal::Serves(html.into()));
    let result = adapter(launcher).attempt("1234567890", None).await;

    assert_eq!(result.status, BillStatus::NotFound);
    assert_eq!(
        result.failure_reason.as_deref(),
        Some("Bill not found in LESCO records")
    );
}

#[tokio::test]
async fn test_panic_inside_pipeline_becomes_error_and_session_is_released() {
    let launcher = FakeLauncher::new(Portal::Panics);
    let result = adapter(launcher.clone()).attempt("1234567890", None).await;

    assert_eq!(result.status, BillStatus::Error);
    assert_eq!(
        result.failure_reason.as_deref(),
        Some("Unable to connect to LESCO servers. Please try again later.")
    );
    assert!(launcher.observed.wait_torn_down().await);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_records_error_without_result_and_releases_browser() {
    let launcher = FakeLauncher::new(Portal::Hangs);
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(launcher.clone(), store.clone()).with_deadline(Duration::from_secs(1));

    let response = orch
        .check_bill(
            CheckRequest::new("lesco", "1234567890", None),
            ClientMeta::default(),
        )
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.status, OutcomeStatus::Error);
    let record = &store.list_recent(1).await.unwrap()[0];
    assert!(record.result.is_none());
    assert_eq!(record.outcome_status, OutcomeStatus::Error);
    assert!(launcher.observed.wait_torn_down().await);
    assert_eq!(Observed::count(&launcher.observed.shutdowns), 1);
}

#[tokio::test]
async fn test_concurrent_checks_each_get_their_own_browser() {
    let launcher = FakeLauncher::new(Portal::Unreachable);
    let store = Arc::new(MemoryStore::new());
    let orch = Arc::new(orchestrator(launcher.clone(), store.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move {
                orch.check_bill(
                    CheckRequest::new("lesco", &format!("12345678{i:02}"), None),
                    ClientMeta::default(),
                )
                .await
                .unwrap()
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().success);
    }

    assert_eq!(store.check_count().await, 8);
    assert_eq!(Observed::count(&launcher.observed.launches), 8);
    assert!(launcher.observed.wait_torn_down().await);
}
