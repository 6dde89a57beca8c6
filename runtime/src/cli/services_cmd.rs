// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! List cataloged providers.

use crate::bootstrap::load_catalog;
use crate::cli::output;
use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use billcheck::{Category, Provider};

pub async fn run(config: RuntimeConfig, category: Option<&str>) -> Result<()> {
    let catalog = load_catalog(&config)?;

    let providers: Vec<&Provider> = match category {
        Some(raw) => {
            let category: Category = raw.parse().context("use one of: electricity, gas, mobile, internet, water, cableTV, insurance, education, banking, other")?;
            catalog.list_by_category(category)
        }
        None => catalog.list_active().collect(),
    };

    if output::is_json() {
        output::print_json(&providers);
        return Ok(());
    }

    if providers.is_empty() {
        println!("  No providers.");
        return Ok(());
    }

    let id_width = providers.iter().map(|p| p.id.len()).max().unwrap_or(0);
    println!();
    for p in &providers {
        let mode = if p.endpoint_hint.is_external() { "external" } else { "internal" };
        println!(
            "  {:<id_width$}  {:<12}  {:<8}  {}",
            p.id,
            p.category.as_str(),
            mode,
            p.display_provider
        );
    }
    println!();
    println!("  {} providers", providers.len());
    Ok(())
}
