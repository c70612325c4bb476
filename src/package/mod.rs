use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::license::{self, detect};
use crate::manifest::Manifest;
use crate::scm::{self, ScmInfo};

pub mod scanner;

pub use scanner::{filter_prod, prod_packages, scan_node_modules, validate_start_dir, PackageDir};

/// One audited package, as written to the JSON and CSV reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub name: String,
    pub version: Option<String>,
    pub license: String,
    /// Browsable url of the license file
    pub url: Option<String>,
    pub repo_base_url: Option<String>,
    pub original_paths: Vec<String>,
    /// Projects that depend on this package; filled when several roots are merged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// A package whose license could not be determined, or whose manifest is broken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedPackage {
    pub name: String,
    pub version: Option<String>,
    pub local_path: String,
    pub reason: String,
}

/// Resolves license and repository information for one installed package.
pub fn build_record(package: &PackageDir) -> Result<PackageRecord, UnresolvedPackage> {
    let manifest_path = package.root.join("package.json");
    let local_path = manifest_path.display().to_string();

    let manifest = Manifest::load(&manifest_path).map_err(|e| {
        tracing::warn!(package = %package.name, error = %e, "invalid package manifest");
        UnresolvedPackage {
            name: package.name.clone(),
            version: None,
            local_path: local_path.clone(),
            reason: format!("{:#}", e),
        }
    })?;

    let Some(resolution) = license::resolve(&manifest, &package.root) else {
        return Err(UnresolvedPackage {
            name: package.name.clone(),
            version: manifest.version.clone(),
            local_path,
            reason: "No license information found".to_string(),
        });
    };

    let scm = scm::resolve_value(manifest.repository.as_ref());
    if scm.is_none() {
        tracing::debug!(package = %package.name, "cannot find repository url");
    }

    let license_file = resolution
        .first_source()
        .map(str::to_string)
        .or_else(|| shortest_license_file(&package.root));

    let url = match (&scm, &license_file) {
        (Some(scm), Some(file)) => scm.file_url(file),
        _ => None,
    };

    let mut original_paths = vec![local_path];
    if let Some(file) = &license_file {
        original_paths.push(package.root.join(file).display().to_string());
    }

    Ok(PackageRecord {
        name: package.name.clone(),
        version: manifest.version.clone(),
        license: resolution.display(),
        url,
        repo_base_url: scm.as_ref().and_then(ScmInfo::base_url),
        original_paths,
        parents: Vec::new(),
    })
}

/// Resolves all packages in parallel; output keeps the input order.
pub fn extract_records(packages: &[PackageDir]) -> (Vec<PackageRecord>, Vec<UnresolvedPackage>) {
    let results: Vec<Result<PackageRecord, UnresolvedPackage>> =
        packages.par_iter().map(build_record).collect();

    let mut records = Vec::new();
    let mut unresolved = Vec::new();
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(package) => unresolved.push(package),
        }
    }
    (records, unresolved)
}

fn shortest_license_file(package_root: &Path) -> Option<String> {
    detect::license_files(package_root)
        .into_iter()
        .min_by_key(|path| path.as_os_str().len())
        .map(|path| path.to_string_lossy().replace('\\', "/"))
}
