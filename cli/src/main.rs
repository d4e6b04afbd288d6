//! AiTrace command-line host.
//!
//! Usage:
//!   aitrace keygen --out-dir keys
//!   aitrace log --prompt "Hello" --output "World" --model gpt-4.1 --meta ticket=42
//!   aitrace verify --dir aitrace --allow-unsigned --report-dir reports
//!   aitrace license issue --signing-key issuer.key --licensee "Company Inc." --expires 2026-12-31T23:59:59Z
//!
//! Configuration is read from `aitrace.toml` (or `--config`) when present.

mod commands;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aitrace_core::TraceConfig;

// ── CLI definition ────────────────────────────────────────────────────────────

/// AiTrace: tamper-evident audit trails for AI decisions.
#[derive(Parser)]
#[command(
    name = "aitrace",
    about = "Log and verify tamper-evident AI decision audit trails",
    long_about = "Appends hash-chained, optionally signed audit records for AI decisions\n\
                  and verifies that no record was edited, removed, or re-ordered."
)]
struct Cli {
    /// TOML configuration file.  Missing file means defaults.
    #[arg(long, global = true, default_value = "aitrace.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an Ed25519 key pair for signing records.
    Keygen {
        #[arg(long, default_value = "keys")]
        out_dir: PathBuf,
    },
    /// Append one decision to the audit trail.
    Log(LogArgs),
    /// Verify an audit trail and print a compliance report.
    Verify(VerifyArgs),
    /// License administration.
    #[command(subcommand)]
    License(LicenseCommand),
}

#[derive(Args)]
pub(crate) struct LogArgs {
    #[arg(long)]
    pub(crate) prompt: Option<String>,
    #[arg(long)]
    pub(crate) output: Option<String>,
    #[arg(long)]
    pub(crate) model: Option<String>,
    #[arg(long)]
    pub(crate) user: Option<String>,
    /// Metadata entry `key=value`; JSON values are kept as JSON.
    #[arg(long = "meta", value_parser = parse_meta)]
    pub(crate) meta: Vec<(String, serde_json::Value)>,
}

#[derive(Args)]
pub(crate) struct VerifyArgs {
    /// Audit directory.  Defaults to `audit_dir` from the config.
    #[arg(long)]
    pub(crate) dir: Option<PathBuf>,
    /// Start of the time window (RFC 3339, inclusive).
    #[arg(long, value_parser = parse_utc, requires = "to")]
    pub(crate) from: Option<DateTime<Utc>>,
    /// End of the time window (RFC 3339, inclusive).
    #[arg(long, value_parser = parse_utc, requires = "from")]
    pub(crate) to: Option<DateTime<Utc>>,
    /// Accept records without signatures.
    #[arg(long)]
    pub(crate) allow_unsigned: bool,
    /// Do not check chain links.
    #[arg(long)]
    pub(crate) allow_broken_chain: bool,
    /// Treat an empty trail as valid.
    #[arg(long)]
    pub(crate) allow_empty: bool,
    /// The first verified record must be a chain head.
    #[arg(long)]
    pub(crate) require_chain_head: bool,
    /// Also write text and JSON reports into this directory.
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
    /// Print the JSON summary instead of the text report.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Subcommand)]
enum LicenseCommand {
    /// Sign a license with the issuer key.
    Issue {
        #[arg(long)]
        signing_key: PathBuf,
        #[arg(long)]
        licensee: String,
        #[arg(long, value_parser = parse_utc)]
        expires: DateTime<Utc>,
        #[arg(long, default_value = "Pro")]
        plan: String,
    },
}

fn parse_utc(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn parse_meta(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| "expected key=value".to_string())?;
    if key.trim().is_empty() {
        return Err("metadata key is empty".to_string());
    }
    let value: serde_json::Value = serde_json::from_str(value).unwrap_or_else(|_| value.into());
    Ok((key.trim().to_string(), value))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-record output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = match TraceConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("aitrace: {}", e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Command::Keygen { out_dir } => commands::keygen(&out_dir).map(|()| true),
        Command::Log(args) => commands::log(&config, args).map(|()| true),
        Command::Verify(args) => commands::verify(&config, args),
        Command::License(LicenseCommand::Issue {
            signing_key,
            licensee,
            expires,
            plan,
        }) => commands::issue_license(&signing_key, licensee, expires, plan).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("aitrace: {}", e);
            std::process::exit(2);
        }
    }
}
