// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Synthetic bill used when the live portal cannot be scraped.

use super::profile::ScrapeProfile;
use billcheck::mock::{billing_period, date_offset, plausible_bill_number};
use billcheck::{AcquisitionResult, BillDetails};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Build a plausible unpaid bill, or `notFound` for a short bill number.
///
/// The customer reference defaults to the bill number.
pub fn synthesize<R: Rng + ?Sized>(
    profile: &ScrapeProfile,
    bill_number: &str,
    customer_reference: Option<&str>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> AcquisitionResult {
    if !plausible_bill_number(bill_number) {
        return AcquisitionResult::not_found(
            bill_number,
            customer_reference.map(str::to_string),
            profile.provider_display_name,
            profile.implausible_reason,
        );
    }

    let shape = &profile.synthetic;
    let amount = rng.gen_range(shape.amount.clone());
    let units = rng.gen_range(shape.units.clone());

    AcquisitionResult::found(
        bill_number,
        Some(customer_reference.unwrap_or(bill_number).to_string()),
        profile.provider_display_name,
        BillDetails {
            customer_name: Some(profile.default_customer_name.to_string()),
            billing_period: Some(billing_period(now)),
            amount_due: Some(f64::from(amount)),
            due_date: Some(date_offset(now, shape.due_in_days)),
            issue_date: Some(date_offset(now, -shape.issued_days_ago)),
            address: Some(shape.address.to_string()),
            consumption_units: Some(format!("{units} kWh")),
            tariff_class: Some(shape.tariff.to_string()),
        },
        false,
    )
}
