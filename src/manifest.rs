use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// The parts of a `package.json` the auditor reads.
///
/// `repository`, `license` and `licenses` come in many shapes in the wild and
/// are kept as raw JSON values. Fields of an unexpected type read as absent,
/// so only invalid JSON makes a manifest unreadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub repository: Option<Value>,
    #[serde(default)]
    pub license: Option<Value>,
    #[serde(default)]
    pub licenses: Option<Value>,
    #[serde(default)]
    pub dependencies: Option<Value>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

impl Manifest {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))
    }

    /// Names of the production dependencies, in declaration order.
    /// Anything but an object (`[]`, `""`) has none.
    pub fn dependency_names(&self) -> Vec<String> {
        match &self.dependencies {
            Some(Value::Object(deps)) => deps.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
