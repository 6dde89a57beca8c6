//! Generic mock path for providers without a live adapter, plus the bill
//! number and date helpers shared with synthetic acquisition.

use crate::types::{AcquisitionResult, BillDetails, Provider};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Bill numbers shorter than this (after normalization) are treated as not
/// being real reference numbers.
pub const MIN_BILL_NUMBER_LEN: usize = 10;

/// Days until a generic mock bill falls due.
pub const MOCK_DUE_IN_DAYS: i64 = 30;

/// Customer name reported by the generic mock path.
pub const MOCK_CUSTOMER_NAME: &str = "Sample Customer";

/// Strip whitespace and `-` separators from a user-typed bill number.
pub fn normalize_bill_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// `true` when the normalized bill number is long enough to look real.
pub fn plausible_bill_number(raw: &str) -> bool {
    normalize_bill_number(raw).chars().count() >= MIN_BILL_NUMBER_LEN
}

/// Billing period label for the month containing `now`, e.g. "October 2026".
pub fn billing_period(now: DateTime<Utc>) -> String {
    now.format("%B %Y").to_string()
}

/// Calendar date `days` from `now`, formatted `YYYY-MM-DD`.
pub fn date_offset(now: DateTime<Utc>, days: i64) -> String {
    (now + Duration::days(days)).format("%Y-%m-%d").to_string()
}

/// Run the generic mock path for `provider`.
pub fn generic_mock<R: Rng + ?Sized>(
    provider: &Provider,
    bill_number: &str,
    customer_reference: Option<&str>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> AcquisitionResult {
    if !plausible_bill_number(bill_number) {
        return AcquisitionResult::not_found(
            bill_number,
            customer_reference.map(str::to_string),
            &provider.display_provider,
            "Bill not found. Please check your reference number.",
        );
    }

    let amount = rng.gen_range(1000..11000);
    AcquisitionResult::found(
        bill_number,
        customer_reference.map(str::to_string),
        &provider.display_provider,
        BillDetails {
            customer_name: Some(MOCK_CUSTOMER_NAME.to_string()),
            billing_period: Some(billing_period(now)),
            amount_due: Some(f64::from(amount)),
            due_date: Some(date_offset(now, MOCK_DUE_IN_DAYS)),
            ..Default::default()
        },
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BillStatus, Category, EndpointHint};
    use chrono::TimeZone;

    fn ptcl() -> Provider {
        Provider {
            id: "ptcl".into(),
            name: "PTCL".into(),
            category: Category::Internet,
            display_provider: "Pakistan Telecommunication Company Limited".into(),
            icon: "fas fa-wifi".into(),
            description: String::new(),
            endpoint_hint: EndpointHint::External("https://ptcl.com.pk/".into()),
            active: true,
        }
    }

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize_bill_number(" 12-345 678 90 "), "1234567890");
        assert!(plausible_bill_number("12-345-678-90"));
        assert!(!plausible_bill_number("12345 "));
    }

    #[test]
    fn test_generic_mock_found() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let r = generic_mock(&ptcl(), "1234567890", Some("CR1"), now, &mut rand::thread_rng());
        assert!(r.succeeded);
        assert_eq!(r.status, BillStatus::Unpaid);
        assert!(r.is_consistent());
        let amount = r.amount_due.unwrap();
        assert!((1000.0..11000.0).contains(&amount));
        assert_eq!(r.due_date.as_deref(), Some("2026-11-15"));
        assert_eq!(r.billing_period.as_deref(), Some("October 2026"));
        assert_eq!(r.provider_display_name, "Pakistan Telecommunication Company Limited");
        assert_eq!(r.customer_reference.as_deref(), Some("CR1"));
    }

    #[test]
    fn test_generic_mock_short_number_not_found() {
        let now = Utc::now();
        let r = generic_mock(&ptcl(), "123456789", None, now, &mut rand::thread_rng());
        assert!(!r.succeeded);
        assert_eq!(r.status, BillStatus::NotFound);
        assert!(r.failure_reason.is_some());
    }
}
