//! Core data types: providers, acquisition results, check and reminder records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a provider bills under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Electricity,
    Gas,
    Mobile,
    Internet,
    Water,
    #[serde(rename = "cableTV")]
    CableTv,
    Insurance,
    Education,
    Banking,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Electricity,
        Category::Gas,
        Category::Mobile,
        Category::Internet,
        Category::Water,
        Category::CableTv,
        Category::Insurance,
        Category::Education,
        Category::Banking,
        Category::Other,
    ];

    /// Wire name, as used in URLs and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electricity => "electricity",
            Category::Gas => "gas",
            Category::Mobile => "mobile",
            Category::Internet => "internet",
            Category::Water => "water",
            Category::CableTv => "cableTV",
            Category::Insurance => "insurance",
            Category::Education => "education",
            Category::Banking => "banking",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; accepts `cableTV`, `cable-tv`, `cable_tv` and `cable tv`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().to_ascii_lowercase() == folded)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Where a provider's bills are checked.
///
/// External hints point at the provider's own website. Internal hints are
/// paths on this service and mark the generic mock path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndpointHint {
    External(String),
    Internal(String),
}

impl EndpointHint {
    pub fn as_str(&self) -> &str {
        match self {
            EndpointHint::External(s) | EndpointHint::Internal(s) => s,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, EndpointHint::External(_))
    }
}

impl TryFrom<String> for EndpointHint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
            Ok(EndpointHint::External(trimmed.to_string()))
        } else if trimmed.starts_with('/') {
            Ok(EndpointHint::Internal(trimmed.to_string()))
        } else {
            Err(format!(
                "endpoint hint must be an http(s) URL or an absolute path, got {value:?}"
            ))
        }
    }
}

impl From<EndpointHint> for String {
    fn from(hint: EndpointHint) -> Self {
        match hint {
            EndpointHint::External(s) | EndpointHint::Internal(s) => s,
        }
    }
}

fn default_active() -> bool {
    true
}

/// A cataloged bill-issuing organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Legal or operator name, e.g. "Lahore Electric Supply Company".
    pub display_provider: String,
    pub icon: String,
    pub description: String,
    pub endpoint_hint: EndpointHint,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Status of a single acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BillStatus {
    Unpaid,
    Paid,
    NotFound,
    Error,
}

impl BillStatus {
    /// `true` for statuses that describe an actual bill.
    pub fn is_found(&self) -> bool {
        matches!(self, BillStatus::Unpaid | BillStatus::Paid)
    }
}

/// Bill fields filled in by a successful acquisition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDetails {
    pub customer_name: Option<String>,
    pub billing_period: Option<String>,
    pub amount_due: Option<f64>,
    pub due_date: Option<String>,
    pub issue_date: Option<String>,
    pub address: Option<String>,
    pub consumption_units: Option<String>,
    pub tariff_class: Option<String>,
}

/// Normalized outcome of one acquisition attempt.
///
/// Construct through [`AcquisitionResult::found`],
/// [`AcquisitionResult::not_found`] or [`AcquisitionResult::error`] so that
/// `succeeded` and `failure_reason` always agree with `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionResult {
    pub succeeded: bool,
    pub bill_number: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub billing_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub amount_due: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub issue_date: Option<String>,
    pub status: BillStatus,
    pub provider_display_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub consumption_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tariff_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure_reason: Option<String>,
}

impl AcquisitionResult {
    /// A bill that exists upstream. `paid` selects between paid and unpaid.
    pub fn found(
        bill_number: impl Into<String>,
        customer_reference: Option<String>,
        provider_display_name: impl Into<String>,
        details: BillDetails,
        paid: bool,
    ) -> Self {
        Self {
            succeeded: true,
            bill_number: bill_number.into(),
            customer_reference,
            customer_name: details.customer_name,
            billing_period: details.billing_period,
            amount_due: details.amount_due,
            due_date: details.due_date,
            issue_date: details.issue_date,
            status: if paid { BillStatus::Paid } else { BillStatus::Unpaid },
            provider_display_name: provider_display_name.into(),
            address: details.address,
            consumption_units: details.consumption_units,
            tariff_class: details.tariff_class,
            failure_reason: None,
        }
    }

    /// The check completed but no such bill exists.
    pub fn not_found(
        bill_number: impl Into<String>,
        customer_reference: Option<String>,
        provider_display_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::failed(
            BillStatus::NotFound,
            bill_number.into(),
            customer_reference,
            provider_display_name.into(),
            reason.into(),
        )
    }

    /// The attempt broke down before a verdict could be reached.
    pub fn error(
        bill_number: impl Into<String>,
        customer_reference: Option<String>,
        provider_display_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::failed(
            BillStatus::Error,
            bill_number.into(),
            customer_reference,
            provider_display_name.into(),
            reason.into(),
        )
    }

    fn failed(
        status: BillStatus,
        bill_number: String,
        customer_reference: Option<String>,
        provider_display_name: String,
        reason: String,
    ) -> Self {
        Self {
            succeeded: false,
            bill_number,
            customer_reference,
            customer_name: None,
            billing_period: None,
            amount_due: None,
            due_date: None,
            issue_date: None,
            status,
            provider_display_name,
            address: None,
            consumption_units: None,
            tariff_class: None,
            failure_reason: Some(reason),
        }
    }

    /// Check the `succeeded`/`status`/`failure_reason` invariant.
    pub fn is_consistent(&self) -> bool {
        self.succeeded == self.status.is_found()
            && self.failure_reason.is_some() != self.succeeded
    }

    /// Outcome this result maps to in the check record.
    pub fn outcome(&self) -> OutcomeStatus {
        match self.status {
            BillStatus::Unpaid | BillStatus::Paid => OutcomeStatus::Found,
            BillStatus::NotFound => OutcomeStatus::NotFound,
            BillStatus::Error => OutcomeStatus::Error,
        }
    }
}

/// Outcome of a whole check request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeStatus {
    Found,
    NotFound,
    Error,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Found => "found",
            OutcomeStatus::NotFound => "notFound",
            OutcomeStatus::Error => "error",
        }
    }
}

/// Opaque client metadata captured with each check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    pub user_agent: String,
    pub source_address: String,
}

/// A check record before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckRecord {
    pub provider_id: String,
    pub bill_number: String,
    pub customer_reference: Option<String>,
    pub result: Option<AcquisitionResult>,
    pub outcome_status: OutcomeStatus,
    pub requested_at: DateTime<Utc>,
    pub client_meta: ClientMeta,
}

/// Durable audit entry for one bill check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    pub id: String,
    pub provider_id: String,
    pub bill_number: String,
    pub customer_reference: Option<String>,
    pub result: Option<AcquisitionResult>,
    pub outcome_status: OutcomeStatus,
    pub requested_at: DateTime<Utc>,
    pub client_meta: ClientMeta,
}

impl CheckRecord {
    pub fn from_new(id: String, new: NewCheckRecord) -> Self {
        Self {
            id,
            provider_id: new.provider_id,
            bill_number: new.bill_number,
            customer_reference: new.customer_reference,
            result: new.result,
            outcome_status: new.outcome_status,
            requested_at: new.requested_at,
            client_meta: new.client_meta,
        }
    }
}

/// A monthly bill reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecord {
    pub id: String,
    pub provider_id: Option<String>,
    pub bill_number: String,
    pub customer_reference: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Day of month, 1-31.
    pub reminder_day: u8,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    #[serde(default, alias = "serviceId")]
    pub provider_id: Option<String>,
    pub bill_number: String,
    #[serde(default)]
    pub customer_reference: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub reminder_day: u8,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Partial update for a reminder; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub reminder_day: Option<u8>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl ReminderRecord {
    /// Apply a patch in place.
    pub fn apply(&mut self, patch: ReminderPatch) {
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(day) = patch.reminder_day {
            self.reminder_day = day;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_value(Category::CableTv).unwrap(),
            serde_json::json!("cableTV")
        );
        assert_eq!("cable-tv".parse::<Category>().unwrap(), Category::CableTv);
        assert_eq!("Electricity".parse::<Category>().unwrap(), Category::Electricity);
        assert!("lottery".parse::<Category>().is_err());
    }

    #[test]
    fn test_endpoint_hint_classification() {
        let ext = EndpointHint::try_from("https://bill.pitc.com.pk/fescobill".to_string()).unwrap();
        assert!(ext.is_external());
        let int = EndpointHint::try_from("/api/bills/gepco".to_string()).unwrap();
        assert!(!int.is_external());
        assert!(EndpointHint::try_from("ftp://nope".to_string()).is_err());
    }

    #[test]
    fn test_result_constructors_hold_invariant() {
        let found = AcquisitionResult::found(
            "1234567890",
            None,
            "LESCO",
            BillDetails::default(),
            false,
        );
        assert!(found.is_consistent());
        assert_eq!(found.outcome(), OutcomeStatus::Found);

        let missing = AcquisitionResult::not_found("1", None, "LESCO", "no such bill");
        assert!(missing.is_consistent());
        assert_eq!(missing.outcome(), OutcomeStatus::NotFound);

        let broken = AcquisitionResult::error("1", None, "LESCO", "upstream down");
        assert!(broken.is_consistent());
        assert_eq!(broken.outcome(), OutcomeStatus::Error);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let r = AcquisitionResult::not_found("42", None, "LESCO", "nope");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "notFound");
        assert_eq!(v["billNumber"], "42");
        assert_eq!(v["failureReason"], "nope");
        assert!(v.get("amountDue").is_none());
    }

    #[test]
    fn test_reminder_patch_leaves_absent_fields() {
        let mut r = ReminderRecord {
            id: "r1".into(),
            provider_id: None,
            bill_number: "123".into(),
            customer_reference: None,
            email: Some("a@example.com".into()),
            phone: None,
            reminder_day: 5,
            active: true,
            created_at: Utc::now(),
        };
        r.apply(ReminderPatch {
            active: Some(false),
            ..Default::default()
        });
        assert!(!r.active);
        assert_eq!(r.reminder_day, 5);
        assert_eq!(r.email.as_deref(), Some("a@example.com"));
    }
}
