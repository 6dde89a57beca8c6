//! Bill-check orchestration.
//!
//! One request moves linearly through `Received -> ProviderResolved ->
//! Acquiring -> Persisted -> Responded`. Only validation and provider
//! resolution can stop it early, and neither leaves a record behind. Every
//! request that reaches acquisition is persisted exactly once, whatever the
//! outcome.

use crate::acquisition::AdapterRegistry;
use crate::catalog::ProviderCatalog;
use crate::clock::{Clock, SystemClock};
use crate::error::{CheckError, CheckResult, FieldError, ValidationError};
use crate::mock::generic_mock;
use crate::storage::RecordStore;
use crate::types::{AcquisitionResult, ClientMeta, NewCheckRecord, OutcomeStatus, Provider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default wall-clock cap on a single acquisition.
pub const DEFAULT_ACQUISITION_DEADLINE: Duration = Duration::from_secs(45);

/// Incoming check request, as posted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub customer_reference: Option<String>,
}

impl CheckRequest {
    pub fn new(service_id: &str, bill_number: &str, customer_reference: Option<&str>) -> Self {
        Self {
            service_id: service_id.to_string(),
            bill_number: bill_number.to_string(),
            customer_reference: customer_reference.map(str::to_string),
        }
    }
}

/// Normalized response returned for every completed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub success: bool,
    /// Present only when `success` is true.
    pub bill_data: Option<AcquisitionResult>,
    pub status: OutcomeStatus,
    pub service_display_name: String,
    pub check_record_id: String,
}

/// Stage of a request inside the orchestrator, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStage {
    Received,
    ProviderResolved,
    Acquiring,
    Persisted,
    Responded,
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStage::Received => "received",
            CheckStage::ProviderResolved => "provider_resolved",
            CheckStage::Acquiring => "acquiring",
            CheckStage::Persisted => "persisted",
            CheckStage::Responded => "responded",
        };
        f.write_str(s)
    }
}

/// A request that passed shape validation.
#[derive(Debug)]
struct ValidCheck {
    service_id: String,
    bill_number: String,
    customer_reference: Option<String>,
}

fn validate(request: &CheckRequest) -> Result<ValidCheck, ValidationError> {
    let mut fields = Vec::new();
    let service_id = request.service_id.trim();
    let bill_number = request.bill_number.trim();

    if service_id.is_empty() {
        fields.push(FieldError {
            field: "serviceId".into(),
            message: "is required".into(),
        });
    }
    if bill_number.is_empty() {
        fields.push(FieldError {
            field: "billNumber".into(),
            message: "Bill number is required".into(),
        });
    }

    let customer_reference = request
        .customer_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    if !fields.is_empty() {
        return Err(ValidationError { fields });
    }
    Ok(ValidCheck {
        service_id: service_id.to_string(),
        bill_number: bill_number.to_string(),
        customer_reference: customer_reference.map(str::to_string),
    })
}

/// Resolves providers, dispatches acquisition and records every attempt.
pub struct BillCheckOrchestrator {
    catalog: Arc<ProviderCatalog>,
    adapters: AdapterRegistry,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    deadline: Duration,
}

impl BillCheckOrchestrator {
    pub fn new(
        catalog: Arc<ProviderCatalog>,
        adapters: AdapterRegistry,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            catalog,
            adapters,
            store,
            clock: Arc::new(SystemClock),
            deadline: DEFAULT_ACQUISITION_DEADLINE,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cap on how long one adapter invocation may run.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Run one bill check end to end.
    pub async fn check_bill(
        &self,
        request: CheckRequest,
        client: ClientMeta,
    ) -> CheckResult<CheckResponse> {
        let requested_at = self.clock.now();
        debug!(stage = %CheckStage::Received, service = %request.service_id, "bill check received");

        let check = validate(&request)?;

        let provider = self
            .catalog
            .lookup(&check.service_id)
            .ok_or_else(|| CheckError::ServiceNotFound(check.service_id.clone()))?;
        debug!(stage = %CheckStage::ProviderResolved, provider = %provider.id);

        debug!(stage = %CheckStage::Acquiring, provider = %provider.id);
        let result = self.acquire(provider, &check).await;
        let outcome_status = result
            .as_ref()
            .map(AcquisitionResult::outcome)
            .unwrap_or(OutcomeStatus::Error);

        let record = self
            .store
            .append_check(NewCheckRecord {
                provider_id: provider.id.clone(),
                bill_number: check.bill_number.clone(),
                customer_reference: check.customer_reference.clone(),
                result: result.clone(),
                outcome_status,
                requested_at,
                client_meta: client,
            })
            .await?;
        debug!(stage = %CheckStage::Persisted, check_id = %record.id);

        let success = outcome_status == OutcomeStatus::Found;
        info!(
            stage = %CheckStage::Responded,
            provider = %provider.id,
            check_id = %record.id,
            status = outcome_status.as_str(),
            "bill check completed"
        );

        Ok(CheckResponse {
            success,
            bill_data: if success { result } else { None },
            status: outcome_status,
            service_display_name: provider.name.clone(),
            check_record_id: record.id,
        })
    }

    /// Dispatch to the registered adapter or the generic mock path.
    ///
    /// `None` means the adapter overran the deadline and nothing was parsed.
    async fn acquire(&self, provider: &Provider, check: &ValidCheck) -> Option<AcquisitionResult> {
        let Some(adapter) = self.adapters.get(&provider.id) else {
            return Some(self.run_mock(provider, check));
        };

        info!(provider = %provider.id, adapter = adapter.name(), "invoking acquisition adapter");
        let attempt = adapter.attempt(&check.bill_number, check.customer_reference.as_deref());
        match tokio::time::timeout(self.deadline, attempt).await {
            Ok(result) => Some(result),
            Err(_) => {
                warn!(
                    provider = %provider.id,
                    adapter = adapter.name(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "acquisition exceeded deadline"
                );
                None
            }
        }
    }

    fn run_mock(&self, provider: &Provider, check: &ValidCheck) -> AcquisitionResult {
        let mut rng = rand::thread_rng();
        generic_mock(
            provider,
            &check.bill_number,
            check.customer_reference.as_deref(),
            self.clock.now(),
            &mut rng,
        )
    }
}
