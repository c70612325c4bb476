use serde::{Deserialize, Serialize};
use super::config::Whitelist;
use crate::package::PackageRecord;

/// Outcome of checking one package against the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// No rule allows the license
    #[serde(rename = "NONE")]
    Violation,
    /// Allowed for every package
    #[serde(rename = "VALID")]
    Valid,
    /// Allowed for this package by name
    #[serde(rename = "EXCEPTION")]
    Exception,
}

/// Splits `"(MIT OR Apache-2.0)"` into its alternatives.
/// Anything else is a single alternative.
pub fn license_alternatives(license: &str) -> Vec<&str> {
    let trimmed = license.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'));

    match inner {
        Some(inner) if inner.contains(" OR ") => inner.split(" OR ").map(str::trim).collect(),
        _ => vec![license],
    }
}

impl Whitelist {
    pub fn classify(&self, package: &str, license: &str) -> Classification {
        let alternatives = license_alternatives(license);

        // A blanket rule on any alternative wins over exceptions.
        if alternatives
            .iter()
            .any(|alternative| self.rules_for(alternative).any(|rule| rule.is_blanket()))
        {
            return Classification::Valid;
        }

        if alternatives.iter().any(|alternative| {
            self.rules_for(alternative)
                .any(|rule| rule.modules.contains(package))
        }) {
            return Classification::Exception;
        }

        Classification::Violation
    }
}

pub fn classify(record: &PackageRecord, whitelist: &Whitelist) -> Classification {
    whitelist.classify(&record.name, &record.license)
}
