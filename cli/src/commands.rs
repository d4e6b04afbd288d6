//! Subcommand implementations.

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use aitrace_audit::JsonAuditStore;
use aitrace_contracts::{
    error::AiTraceResult,
    policy::{VerificationPolicy, VerificationScope},
    record::AiDecision,
};
use aitrace_core::{
    traits::{EntitlementGate, SignatureService},
    DecisionLogger, LicenseSettings, TraceConfig,
};
use aitrace_license::{LicenseGuard, LicenseInfo};
use aitrace_signing::{keys, Ed25519SignatureService};
use aitrace_verify::{
    report::{self, JSON_REPORT_FILE, TEXT_REPORT_FILE},
    ChainVerifier,
};

use crate::{LogArgs, VerifyArgs};

/// The gate for privileged features.  `mode = "disabled"` grants everything;
/// otherwise a valid license is required.
fn entitlement_gate(settings: &LicenseSettings) -> AiTraceResult<Arc<dyn EntitlementGate>> {
    let guard = LicenseGuard::from_settings(settings)?;
    debug!(mode = ?guard.mode(), "entitlement gate attached");
    Ok(Arc::new(guard))
}

pub(crate) fn keygen(out_dir: &Path) -> AiTraceResult<()> {
    let files = keys::generate_keypair(out_dir)?;
    println!("signing key:   {}", files.signing_key.display());
    println!("verifying key: {}", files.verifying_key.display());
    Ok(())
}

pub(crate) fn log(config: &TraceConfig, args: LogArgs) -> AiTraceResult<()> {
    let mut store = JsonAuditStore::open(&config.audit_dir)?;
    if let Some(path) = &config.signing_key_path {
        let signer = Ed25519SignatureService::from_signing_key(keys::read_signing_key(path)?);
        store = store
            .with_signer(Arc::new(signer))
            .with_entitlement(entitlement_gate(&config.license)?);
    }

    let decision = AiDecision {
        prompt: args.prompt,
        output: args.output,
        model: args.model,
        user_id: args.user,
        metadata: args.meta.into_iter().collect(),
    };

    let logger = DecisionLogger::new(config, Arc::new(store));
    let record = logger.log(&decision)?;
    println!("{}  {}", record.id, record.hash_sha256);
    Ok(())
}

/// The verifier `verify` runs: policy from the flags, verifying key and
/// entitlement gate from the config.
fn build_verifier(config: &TraceConfig, args: &VerifyArgs) -> AiTraceResult<ChainVerifier> {
    let policy = VerificationPolicy {
        require_signatures: !args.allow_unsigned,
        require_chain_integrity: !args.allow_broken_chain,
        fail_on_missing_files: !args.allow_empty,
        allow_start_mid_chain: !args.require_chain_head,
    };
    let mut verifier = ChainVerifier::new()
        .with_policy(policy)
        .with_entitlement(entitlement_gate(&config.license)?);
    if let Some(path) = &config.verify_key_path {
        let service: Arc<dyn SignatureService> = Arc::new(
            Ed25519SignatureService::from_verifying_key(keys::read_verifying_key(path)?),
        );
        verifier = verifier.with_signature_service(service);
    }
    Ok(verifier)
}

/// Returns whether the trail verified.
pub(crate) fn verify(config: &TraceConfig, args: VerifyArgs) -> AiTraceResult<bool> {
    let verifier = build_verifier(config, &args)?;
    let dir = args.dir.unwrap_or_else(|| config.audit_dir.clone());
    let scope = match (args.from, args.to) {
        (Some(from), Some(to)) => VerificationScope::between(from, to),
        _ => VerificationScope::All,
    };

    let summary = verifier.verify_summary(&dir, &scope);

    if let Some(report_dir) = &args.report_dir {
        report::write_text_report(&summary, &report_dir.join(TEXT_REPORT_FILE))?;
        report::write_json_report(&summary, &report_dir.join(JSON_REPORT_FILE))?;
        info!(dir = %report_dir.display(), "reports written");
    }

    if args.json {
        println!("{}", report::to_json_report(&summary)?);
    } else {
        print!("{}", report::to_text_report(&summary));
    }
    Ok(summary.is_valid)
}

pub(crate) fn issue_license(
    signing_key: &Path,
    licensee: String,
    expires_utc: DateTime<Utc>,
    plan: String,
) -> AiTraceResult<()> {
    let issuer = keys::read_signing_key(signing_key)?;
    let info = LicenseInfo {
        licensee,
        expires_utc,
        plan,
    };
    println!("{}", aitrace_license::issue_license(&issuer, &info));
    Ok(())
}
