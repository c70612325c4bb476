use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::manifest::Manifest;
use crate::package::{self, PackageDir, PackageRecord, UnresolvedPackage};
use crate::policy::WhitelistSummary;

#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Only packages reachable through `dependencies`
    pub prod: bool,
}

/// Result of auditing a single project root.
#[derive(Debug, Clone)]
pub struct ProjectAudit {
    /// `name` from the project's own package.json
    pub name: Option<String>,
    pub records: Vec<PackageRecord>,
    pub unresolved: Vec<UnresolvedPackage>,
}

pub fn audit_project(base_dir: &Path, options: &AuditOptions) -> Result<ProjectAudit> {
    package::validate_start_dir(base_dir)?;
    let project = Manifest::load(base_dir.join("package.json"))?;

    let mut modules = package::scan_node_modules(base_dir)
        .with_context(|| format!("Failed to scan {}", base_dir.display()))?;
    if options.prod {
        let prod = package::prod_packages(base_dir);
        modules = package::filter_prod(modules, &prod)?;
    }

    let packages: Vec<PackageDir> = modules.into_values().collect();
    let (records, unresolved) = package::extract_records(&packages);
    tracing::info!(
        root = %base_dir.display(),
        resolved = records.len(),
        unresolved = unresolved.len(),
        "project audited"
    );

    Ok(ProjectAudit {
        name: project.name,
        records,
        unresolved,
    })
}

/// Collapses records that share name, version and license, unioning their
/// parents. Sorted by package name.
pub fn merge_records(records: Vec<PackageRecord>) -> Vec<PackageRecord> {
    let mut merged: IndexMap<(String, Option<String>, String), PackageRecord> = IndexMap::new();

    for record in records {
        let key = (
            record.name.clone(),
            record.version.clone(),
            record.license.clone(),
        );
        match merged.get_mut(&key) {
            Some(existing) => {
                for parent in record.parents {
                    if !existing.parents.contains(&parent) {
                        existing.parents.push(parent);
                    }
                }
            }
            None => {
                merged.insert(key, record);
            }
        }
    }

    let mut result: Vec<PackageRecord> = merged.into_values().collect();
    result.sort_by(|a, b| a.name.cmp(&b.name));
    result
}

/// License → package names, in first-seen order.
pub fn distinct_licenses(records: &[PackageRecord]) -> IndexMap<String, Vec<String>> {
    let mut licenses: IndexMap<String, Vec<String>> = IndexMap::new();
    for record in records {
        licenses
            .entry(record.license.clone())
            .or_default()
            .push(record.name.clone());
    }
    licenses
}

/// First license matching `pattern`, ignoring case. A glob must match the
/// whole license; a plain word matches anywhere in it (`GPL` hits `LGPL-2.1`).
pub fn find_forbidden(records: &[PackageRecord], pattern: &str) -> Result<Option<String>> {
    let pattern = if pattern.contains(['*', '?', '[']) {
        pattern.to_string()
    } else {
        format!("*{}*", pattern)
    };
    let pattern = Pattern::new(&pattern)
        .with_context(|| format!("Invalid license pattern: {}", pattern))?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    Ok(distinct_licenses(records)
        .into_keys()
        .find(|license| pattern.matches_with(license, options)))
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub roots: Vec<String>,
    pub packages: Vec<PackageRecord>,
    pub unresolved: Vec<UnresolvedPackage>,
    pub summary: AuditSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<WhitelistSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub total_packages: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Packages per license, most used first
    pub license_types: IndexMap<String, usize>,
}

pub fn create_report(
    roots: Vec<String>,
    packages: Vec<PackageRecord>,
    unresolved: Vec<UnresolvedPackage>,
) -> AuditReport {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for package in &packages {
        *counts.entry(package.license.clone()).or_insert(0) += 1;
    }

    // count desc, then name for a stable order
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    AuditReport {
        generated_at: Utc::now(),
        roots,
        summary: AuditSummary {
            total_packages: packages.len() + unresolved.len(),
            resolved: packages.len(),
            unresolved: unresolved.len(),
            license_types: counts.into_iter().collect(),
        },
        packages,
        unresolved,
        whitelist: None,
    }
}
