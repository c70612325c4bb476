use serde_json::Value;

use super::{LicenseEntry, LicenseResolution};
use crate::manifest::Manifest;

/// Reads the declared license(s) of a manifest.
///
/// Order of precedence:
/// 1. `licenses` as an array of `{type, url?}` objects (all must parse)
/// 2. `licenses` as a single `{type, url?}` object
/// 3. `license` as a string
/// 4. `license` as an array of strings and/or objects (unparseable items dropped)
/// 5. `license` as a `{type, url?}` object
pub fn resolve_from_manifest(manifest: &Manifest) -> Option<LicenseResolution> {
    if let Some(resolution) = manifest.licenses.as_ref().and_then(from_licenses_field) {
        return Some(resolution);
    }

    manifest.license.as_ref().and_then(from_license_field)
}

fn from_licenses_field(value: &Value) -> Option<LicenseResolution> {
    match value {
        Value::Array(items) => {
            let entries: Option<Vec<LicenseEntry>> = items.iter().map(parse_license_object).collect();
            LicenseResolution::from_entries(entries?)
        }
        Value::Object(_) => LicenseResolution::from_entries(vec![parse_license_object(value)?]),
        _ => None,
    }
}

fn from_license_field(value: &Value) -> Option<LicenseResolution> {
    match value {
        Value::String(license) if !license.trim().is_empty() => {
            LicenseResolution::from_entries(vec![LicenseEntry::declared(license.as_str(), None)])
        }
        Value::Array(items) => {
            let entries = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(license) if !license.trim().is_empty() => {
                        Some(LicenseEntry::declared(license.trim(), None))
                    }
                    Value::Object(_) => parse_license_object(item),
                    _ => None,
                })
                .collect();
            LicenseResolution::from_entries(entries)
        }
        Value::Object(_) => LicenseResolution::from_entries(vec![parse_license_object(value)?]),
        _ => None,
    }
}

/// `{ "type": "MIT", "url": "..." }` → declared entry; `type` must be a non-blank string.
fn parse_license_object(value: &Value) -> Option<LicenseEntry> {
    let object = value.as_object()?;
    let license_type = object.get("type")?.as_str()?.trim();
    if license_type.is_empty() {
        return None;
    }

    let url = object
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(LicenseEntry::declared(license_type, url))
}
