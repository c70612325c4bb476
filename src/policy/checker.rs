use serde::Serialize;
use super::config::Whitelist;
use super::matcher::{classify, Classification};
use crate::package::PackageRecord;

/// Packages split by classification, each group in input order.
#[derive(Debug, Default)]
pub struct Reconciliation<'a> {
    pub valid: Vec<&'a PackageRecord>,
    pub exceptions: Vec<&'a PackageRecord>,
    /// Blocking group; non-empty means the policy failed.
    pub violations: Vec<&'a PackageRecord>,
}

impl Reconciliation<'_> {
    pub fn is_violated(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn summary(&self) -> WhitelistSummary {
        WhitelistSummary {
            valid: self.valid.len(),
            exceptions: self.exceptions.iter().map(|r| PolicyFinding::from_record(r)).collect(),
            violations: self.violations.iter().map(|r| PolicyFinding::from_record(r)).collect(),
        }
    }
}

/// Serializable outcome of a whitelist check.
#[derive(Debug, Clone, Serialize)]
pub struct WhitelistSummary {
    pub valid: usize,
    pub exceptions: Vec<PolicyFinding>,
    pub violations: Vec<PolicyFinding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyFinding {
    pub name: String,
    pub version: Option<String>,
    pub license: String,
}

impl PolicyFinding {
    fn from_record(record: &PackageRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.clone(),
            license: record.license.clone(),
        }
    }
}

/// Checks every package against the whitelist.
pub fn reconcile<'a>(whitelist: &Whitelist, records: &'a [PackageRecord]) -> Reconciliation<'a> {
    let mut result = Reconciliation::default();

    for record in records {
        match classify(record, whitelist) {
            Classification::Valid => {
                tracing::debug!(package = %record.name, license = %record.license, "license allowed");
                result.valid.push(record);
            }
            Classification::Exception => {
                tracing::info!(package = %record.name, license = %record.license, "license allowed by exception");
                result.exceptions.push(record);
            }
            Classification::Violation => {
                tracing::warn!(package = %record.name, license = %record.license, "license not in whitelist");
                result.violations.push(record);
            }
        }
    }

    result
}
