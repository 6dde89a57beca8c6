// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use billcheck_runtime::cli::{self, LogFormat};
use billcheck_runtime::config::RuntimeConfig;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "billcheck",
    about = "Billcheck: Pakistani utility and service bill lookup",
    version,
    after_help = "Configuration is read from BILLCHECK_* environment variables; flags override them.\nRun 'billcheck <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Log level filter when RUST_LOG is unset (e.g. "info", "billcheck=debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Provider catalog JSON replacing the built-in list
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Chromium binary to use for live scrapes
    #[arg(long, global = true)]
    chromium: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<IpAddr>,
        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,
        /// Append every check to this JSONL journal
        #[arg(long)]
        journal: Option<PathBuf>,
    },
    /// Check a single bill
    Check {
        /// Provider id (e.g. "lesco", "ptcl")
        service: String,
        /// Bill or reference number
        bill_number: String,
        /// Customer reference / consumer id
        #[arg(long)]
        reference: Option<String>,
    },
    /// List known providers
    Services {
        /// Only providers in this category (e.g. "electricity", "cableTV")
        #[arg(long)]
        category: Option<String>,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::output::set_json(cli.json);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "billcheck", &mut std::io::stdout());
        return Ok(());
    }

    cli::init_tracing(&cli.log_level, cli.log_format);

    let result = match RuntimeConfig::from_env() {
        Ok(mut config) => {
            if let Some(catalog) = cli.catalog {
                config.catalog_path = Some(catalog);
            }
            if let Some(chromium) = cli.chromium {
                config.chromium_path = Some(chromium);
            }
            dispatch(cli.command, config).await
        }
        Err(e) => Err(e),
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}

async fn dispatch(command: Commands, mut config: RuntimeConfig) -> Result<()> {
    match command {
        Commands::Serve {
            bind,
            port,
            journal,
        } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(journal) = journal {
                config.journal_path = Some(journal);
            }
            cli::serve::run(config).await
        }
        Commands::Check {
            service,
            bill_number,
            reference,
        } => cli::check_cmd::run(config, &service, &bill_number, reference.as_deref()).await,
        Commands::Services { category } => cli::services_cmd::run(config, category.as_deref()).await,
        Commands::Doctor => cli::doctor::run(config).await,
        Commands::Completions { .. } => Ok(()),
    }
}
