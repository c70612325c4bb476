use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::manifest::Manifest;

pub mod detect;
pub mod extractor;

pub use detect::{classify_text, resolve_from_files, resolve_from_readme, TextMatch};
pub use extractor::resolve_from_manifest;

/// License taken verbatim from a manifest field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredLicense {
    #[serde(rename = "type")]
    pub license_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// License guessed from a license file or README.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLicense {
    #[serde(rename = "type")]
    pub license_type: String,
    /// Heuristic strength in `[0, 1]`.
    pub confidence: f64,
    /// Path of the file, relative to the package root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The line that triggered the detection.
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LicenseEntry {
    Declared(DeclaredLicense),
    Detected(DetectedLicense),
}

impl LicenseEntry {
    pub fn declared(license_type: impl Into<String>, url: Option<String>) -> Self {
        LicenseEntry::Declared(DeclaredLicense {
            license_type: license_type.into(),
            url,
        })
    }

    pub fn license_type(&self) -> &str {
        match self {
            LicenseEntry::Declared(license) => &license.license_type,
            LicenseEntry::Detected(license) => &license.license_type,
        }
    }

    /// Declared licenses are fully trusted.
    pub fn confidence(&self) -> f64 {
        match self {
            LicenseEntry::Declared(_) => 1.0,
            LicenseEntry::Detected(license) => license.confidence,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            LicenseEntry::Declared(_) => None,
            LicenseEntry::Detected(license) => license.source.as_deref(),
        }
    }
}

/// Non-empty, ordered list of license entries for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseResolution {
    pub licenses: Vec<LicenseEntry>,
}

impl LicenseResolution {
    /// `None` when there is nothing to report.
    pub fn from_entries(licenses: Vec<LicenseEntry>) -> Option<Self> {
        if licenses.is_empty() {
            None
        } else {
            Some(Self { licenses })
        }
    }

    /// Collapses the entries into one license string.
    ///
    /// Distinct types keep their order; several of them are rendered as an
    /// `(A OR B)` expression.
    pub fn display(&self) -> String {
        let mut types: Vec<&str> = Vec::new();
        for entry in &self.licenses {
            let license_type = entry.license_type();
            if !types.contains(&license_type) {
                types.push(license_type);
            }
        }

        match types.as_slice() {
            [single] => single.to_string(),
            many => format!("({})", many.join(" OR ")),
        }
    }

    /// First file the resolution was read from, if any.
    pub fn first_source(&self) -> Option<&str> {
        self.licenses.iter().find_map(LicenseEntry::source)
    }
}

/// Manifest fields first, then license files, then the README.
pub fn resolve(manifest: &Manifest, package_root: &Path) -> Option<LicenseResolution> {
    if let Some(resolution) = resolve_from_manifest(manifest) {
        return Some(resolution);
    }

    if let Some(resolution) = resolve_from_files(package_root) {
        tracing::debug!(path = %package_root.display(), "license detected from license files");
        return Some(resolution);
    }

    if let Some(resolution) = resolve_from_readme(package_root) {
        tracing::debug!(path = %package_root.display(), "license detected from README");
        return Some(resolution);
    }

    tracing::debug!(path = %package_root.display(), "no license found");
    None
}
