use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{DetectedLicense, LicenseEntry, LicenseResolution};

/// Directory holding nested packages; never attributed to the outer package.
pub const NESTED_PACKAGES_DIR: &str = "node_modules";

const COPYRIGHT_CONFIDENCE: f64 = 0.5;
const KNOWN_TEXT_CONFIDENCE: f64 = 0.75;
const MIN_CONFIDENCE: f64 = 0.01;

/// Outcome of classifying a license text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub license_type: &'static str,
    pub confidence: f64,
    pub evidence: String,
}

/// Guesses the license of a text from its first lines.
pub fn classify_text(text: &str) -> Option<TextMatch> {
    if text.trim().is_empty() {
        return None;
    }

    let lines: Vec<&str> = text.lines().collect();
    let first = lines.first()?.trim();

    if first.to_lowercase().starts_with("copyright") {
        return Some(TextMatch {
            license_type: "CUSTOM_LICENSE",
            confidence: COPYRIGHT_CONFIDENCE,
            evidence: first.to_string(),
        });
    }

    let beginning = &lines[..lines.len().min(2)];

    // "the mit license" and "the mit license (mit)" contain this too
    if let Some(line) = beginning
        .iter()
        .find(|line| line.to_lowercase().contains("mit license"))
    {
        return Some(TextMatch {
            license_type: "MIT",
            confidence: KNOWN_TEXT_CONFIDENCE,
            evidence: line.trim().to_string(),
        });
    }

    if let Some(line) = beginning
        .iter()
        .find(|line| line.to_lowercase().contains("general public license"))
    {
        return Some(TextMatch {
            license_type: "GPL",
            confidence: KNOWN_TEXT_CONFIDENCE,
            evidence: line.trim().to_string(),
        });
    }

    None
}

/// `LICENSE`, `licence.md`, `LICENSE-MIT`, `license/…` and friends.
pub fn is_license_path(relative: &Path) -> bool {
    relative.components().any(|component| {
        let name = component.as_os_str().to_string_lossy().to_lowercase();
        name.starts_with("license") || name.starts_with("licence")
    })
}

/// License-like files under `package_root`, relative to it, sorted by name.
/// Nested package directories are skipped.
pub fn license_files(package_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(package_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() > 0
                && entry.file_type().is_dir()
                && entry.file_name() == NESTED_PACKAGES_DIR)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(package_root)
                .ok()
                .map(Path::to_path_buf)
        })
        .filter(|relative| is_license_path(relative))
        .collect()
}

/// Classifies every license file of the package.
pub fn resolve_from_files(package_root: &Path) -> Option<LicenseResolution> {
    let entries = license_files(package_root)
        .into_iter()
        .filter_map(|relative| {
            let text = read_text(&package_root.join(&relative))?;
            let found = classify_text(&text)?;
            Some(LicenseEntry::Detected(DetectedLicense {
                license_type: found.license_type.to_string(),
                confidence: found.confidence,
                source: Some(to_slash(&relative)),
                evidence: found.evidence,
            }))
        })
        .collect();

    LicenseResolution::from_entries(entries)
}

/// Looks for a `## License` section in the package README.
pub fn resolve_from_readme(package_root: &Path) -> Option<LicenseResolution> {
    let readme = find_readme(package_root)?;
    let text = read_text(&package_root.join(&readme))?;

    let lines: Vec<&str> = text.lines().collect();
    let heading = lines.iter().position(|line| is_license_heading(line))?;
    if heading + 1 >= lines.len() {
        return None;
    }

    let section = lines[heading + 1..].join("\n");
    let found = classify_text(section.trim())?;

    let entry = LicenseEntry::Detected(DetectedLicense {
        license_type: found.license_type.to_string(),
        confidence: (found.confidence / 2.0).max(MIN_CONFIDENCE),
        source: Some(readme),
        evidence: found.evidence,
    });
    LicenseResolution::from_entries(vec![entry])
}

fn find_readme(package_root: &Path) -> Option<String> {
    let mut names: Vec<String> = fs::read_dir(package_root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| {
            let lower = name.to_lowercase();
            lower == "readme" || lower == "readme.md"
        })
        .collect();
    names.sort();
    names.into_iter().next()
}

/// A markdown heading whose text ends in "license" or "licence".
fn is_license_heading(line: &str) -> bool {
    let line = line.trim();
    if !line.starts_with('#') {
        return false;
    }
    let lower = line.to_lowercase();
    lower.ends_with("license") || lower.ends_with("licence")
}

fn read_text(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
