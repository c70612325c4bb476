use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One whitelist entry.
///
/// Empty `modules`: the license is allowed for every package.
/// Non-empty `modules`: the license is allowed only for the listed packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub license: String,
    #[serde(default)]
    pub modules: IndexSet<String>,
}

impl PolicyRule {
    pub fn blanket(license: impl Into<String>) -> Self {
        Self {
            license: license.into(),
            modules: IndexSet::new(),
        }
    }

    pub fn is_blanket(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The whitelist file: a JSON array of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Whitelist {
    pub rules: Vec<PolicyRule>,
}

/// Starter sets for a new whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistPreset {
    /// Permissive licenses only
    Strict,
    /// Permissive plus weak copyleft
    Standard,
    /// Permissive, weak and strong copyleft
    Lenient,
}

impl Whitelist {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read whitelist: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("The whitelist provided is not valid JSON: {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize whitelist")?;
        fs::write(path, format!("{}\n", content))
            .with_context(|| format!("Failed to write whitelist: {}", path.display()))
    }

    /// Common license identifiers, each allowed for every package.
    pub fn sample(preset: WhitelistPreset) -> Self {
        let content = match preset {
            WhitelistPreset::Strict => include_str!("../../presets/strict.json"),
            WhitelistPreset::Standard => include_str!("../../presets/standard.json"),
            WhitelistPreset::Lenient => include_str!("../../presets/lenient.json"),
        };
        let licenses: Vec<String> =
            serde_json::from_str(content).expect("embedded whitelist preset is valid JSON");
        Self {
            rules: licenses.into_iter().map(PolicyRule::blanket).collect(),
        }
    }

    /// Rules whose license is exactly `license`.
    pub fn rules_for<'a>(&'a self, license: &'a str) -> impl Iterator<Item = &'a PolicyRule> + 'a {
        self.rules.iter().filter(move |rule| rule.license == license)
    }

    /// Allows `license` for `package` only. Returns false if it already was.
    pub fn add_exception(&mut self, license: &str, package: &str) -> bool {
        if let Some(rule) = self
            .rules
            .iter_mut()
            .find(|rule| rule.license == license && !rule.is_blanket())
        {
            return rule.modules.insert(package.to_string());
        }

        let mut modules = IndexSet::new();
        modules.insert(package.to_string());
        self.rules.push(PolicyRule {
            license: license.to_string(),
            modules,
        });
        true
    }
}
