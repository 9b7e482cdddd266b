//! Verify content health and report per-document failures.

use super::site::{load_config, load_site};
use crate::agent;
use anyhow::{bail, Result};
use quire_core::{DocumentError, DocumentErrorKind, Strictness, Visibility};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    documents: usize,
    drafts: usize,
    failures: usize,
    parse_errors: usize,
    validation_errors: usize,
    duplicate_slugs: usize,
    details: &'a [DocumentError],
}

/// Load every document, drafts included, and report what would be skipped.
///
/// With `strict` any failure makes the command exit with an error, which is
/// what CI wants; otherwise failures are only reported.
pub fn verify_site(config_path: &Path, strict: bool, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let repo = load_site(&config, Visibility::All, Strictness::Lenient)?;
    let failures = repo.failures();

    let count = |kind: DocumentErrorKind| failures.iter().filter(|f| f.kind == kind).count();
    let summary = VerificationSummary {
        documents: repo.len(),
        drafts: repo.documents().iter().filter(|d| d.draft).count(),
        failures: failures.len(),
        parse_errors: count(DocumentErrorKind::Parse) + count(DocumentErrorKind::Io),
        validation_errors: count(DocumentErrorKind::Validation),
        duplicate_slugs: count(DocumentErrorKind::DuplicateSlug),
        details: failures,
    };

    if json {
        let payload = agent::envelope("verify.summary", &summary);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Verification complete: {} documents ({} drafts), {} failures",
            summary.documents, summary.drafts, summary.failures
        );
        for failure in failures {
            println!("- {} [{}]: {}", failure.path, failure.kind, failure.message);
        }
    }

    if strict && !failures.is_empty() {
        bail!("{} documents failed validation", failures.len());
    }
    Ok(())
}
