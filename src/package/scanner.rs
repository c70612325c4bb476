use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::license::detect::NESTED_PACKAGES_DIR;
use crate::manifest::Manifest;

/// An installed package: its name and the directory holding its `package.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDir {
    pub name: String,
    pub root: PathBuf,
}

/// Checks that `base_dir` is a Node project with installed dependencies.
pub fn validate_start_dir(base_dir: &Path) -> Result<()> {
    if !base_dir.is_dir() {
        anyhow::bail!("Base path {} does not exist or is not a directory", base_dir.display());
    }

    let manifest_path = base_dir.join("package.json");
    if !manifest_path.is_file() {
        anyhow::bail!("No package.json found in {}. Not a Node project?", base_dir.display());
    }
    Manifest::load(&manifest_path)?;

    let modules_path = base_dir.join(NESTED_PACKAGES_DIR);
    if !modules_path.is_dir() {
        anyhow::bail!(
            "No node_modules directory in {}. Run 'npm install' first.",
            base_dir.display()
        );
    }

    let mut entries = fs::read_dir(&modules_path)
        .with_context(|| format!("Failed to read {}", modules_path.display()))?;
    if entries.next().is_none() {
        anyhow::bail!(
            "node_modules in {} is empty. Run 'npm install' first.",
            base_dir.display()
        );
    }

    Ok(())
}

/// Finds every installed package below `base_dir/node_modules`, nested ones
/// included. A package installed several times is reported once, at its
/// shallowest location. Result is sorted by package name.
pub fn scan_node_modules(base_dir: &Path) -> Result<IndexMap<String, PackageDir>> {
    let modules_path = base_dir.join(NESTED_PACKAGES_DIR);
    tracing::debug!(path = %modules_path.display(), "searching for packages");

    let mut found: IndexMap<String, PathBuf> = IndexMap::new();
    for entry in WalkDir::new(&modules_path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "package.json")
    {
        let Some(package_root) = entry.path().parent() else {
            continue;
        };
        let Some(name) = package_name(package_root) else {
            continue;
        };

        let shallower = match found.get(&name) {
            Some(existing) => depth(package_root) < depth(existing),
            None => true,
        };
        if shallower {
            found.insert(name, package_root.to_path_buf());
        }
    }

    found.sort_keys();
    tracing::debug!(count = found.len(), "packages found");

    Ok(found
        .into_iter()
        .map(|(name, root)| (name.clone(), PackageDir { name, root }))
        .collect())
}

/// Production dependency names reachable from the project's `package.json`,
/// in discovery order.
pub fn prod_packages(base_dir: &Path) -> Vec<String> {
    let mut pending = vec![base_dir.to_path_buf()];
    let mut visited: IndexSet<String> = IndexSet::new();

    while let Some(dir) = pending.pop() {
        let manifest = match Manifest::load(dir.join("package.json")) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::debug!(path = %dir.display(), error = %e, "skipping dependency manifest");
                continue;
            }
        };

        for dependency in manifest.dependency_names() {
            if !visited.insert(dependency.clone()) {
                continue;
            }
            pending.push(dir.join(NESTED_PACKAGES_DIR).join(&dependency));
            pending.push(base_dir.join(NESTED_PACKAGES_DIR).join(&dependency));
        }
    }

    tracing::debug!(count = visited.len(), "production packages found");
    visited.into_iter().collect()
}

/// Keeps only production packages. Fails if one of them is not installed.
pub fn filter_prod(
    modules: IndexMap<String, PackageDir>,
    prod: &[String],
) -> Result<IndexMap<String, PackageDir>> {
    let missing: Vec<&str> = prod
        .iter()
        .filter(|name| !modules.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "{} production packages are not installed: {}\n\
             Run 'npm install' to fix this.",
            missing.len(),
            missing.join(", ")
        );
    }

    Ok(modules
        .into_iter()
        .filter(|(name, _)| prod.iter().any(|p| p == name))
        .collect())
}

/// `…/node_modules/name` → `name`, `…/node_modules/@scope/name` → `@scope/name`.
fn package_name(package_root: &Path) -> Option<String> {
    let name = package_root.file_name()?.to_str()?;
    let parent = package_root.parent()?;
    let parent_name = parent.file_name()?.to_str()?;

    if parent_name == NESTED_PACKAGES_DIR {
        return Some(name.to_string());
    }

    if parent_name.starts_with('@') {
        let grandparent = parent.parent()?.file_name()?.to_str()?;
        if grandparent == NESTED_PACKAGES_DIR {
            return Some(format!("{}/{}", parent_name, name));
        }
    }

    None
}

fn depth(path: &Path) -> usize {
    path.components().count()
}
