// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! One-off bill check from the command line.

use crate::bootstrap::App;
use crate::cli::output;
use crate::config::RuntimeConfig;
use anyhow::Result;
use billcheck::{CheckRequest, CheckResponse, ClientMeta};

pub async fn run(
    config: RuntimeConfig,
    service: &str,
    bill_number: &str,
    reference: Option<&str>,
) -> Result<()> {
    let app = App::build(&config)?;
    let client = ClientMeta {
        user_agent: format!("billcheck-cli/{}", env!("CARGO_PKG_VERSION")),
        source_address: "local".to_string(),
    };

    let response = app
        .orchestrator
        .check_bill(CheckRequest::new(service, bill_number, reference), client)
        .await?;

    if output::is_json() {
        output::print_json(&response);
    } else {
        print_summary(&response);
    }
    Ok(())
}

fn print_summary(response: &CheckResponse) {
    println!();
    println!("  {}", response.service_display_name);
    println!("  Outcome:   {}", response.status.as_str());
    if let Some(bill) = &response.bill_data {
        println!("  Provider:  {}", bill.provider_display_name);
        println!("  Bill no.:  {}", bill.bill_number);
        if let Some(name) = &bill.customer_name {
            println!("  Customer:  {name}");
        }
        if let Some(period) = &bill.billing_period {
            println!("  Period:    {period}");
        }
        if let Some(amount) = bill.amount_due {
            println!("  Amount:    PKR {amount:.0}");
        }
        if let Some(due) = &bill.due_date {
            println!("  Due:       {due}");
        }
        if let Some(units) = &bill.consumption_units {
            println!("  Units:     {units}");
        }
    }
    println!("  Check ID:  {}", response.check_record_id);
    println!();
}
