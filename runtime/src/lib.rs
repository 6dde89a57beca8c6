// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Billcheck runtime: live bill scraping over headless Chromium, the REST
//! API and the command-line interface.
//!
//! This library crate exposes the modules for the binary and for integration
//! testing.

pub mod audit;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod renderer;
pub mod rest;
pub mod scrape;
