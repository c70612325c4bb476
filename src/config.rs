use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".node-license-auditor.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Output format (table, json, csv)
    pub format: Option<String>,

    /// Only audit production dependencies
    pub prod: Option<bool>,

    /// Fail when a license matches this glob
    pub fail_on: Option<String>,

    /// Fail when a license could not be resolved
    pub fail_on_missing: Option<bool>,

    /// Path to the whitelist JSON file
    pub whitelist: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Some("table".to_string()),
            prod: Some(false),
            fail_on: None,
            fail_on_missing: Some(false),
            whitelist: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.format {
            if !matches!(format.as_str(), "table" | "json" | "csv") {
                anyhow::bail!("Unknown format '{}'. Expected table, json or csv", format);
            }
        }
        if let Some(pattern) = &self.fail_on {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid fail_on pattern: {}", pattern))?;
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Load configuration from the working directory.
pub fn load_config() -> Result<Config> {
    load_config_from(config_path())
}

pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    // unset keys fall back to defaults
    let defaults = Config::default();
    Ok(Config {
        format: parsed.format.or(defaults.format),
        prod: parsed.prod.or(defaults.prod),
        fail_on: parsed.fail_on,
        fail_on_missing: parsed.fail_on_missing.or(defaults.fail_on_missing),
        whitelist: parsed.whitelist,
    })
}

/// Records the whitelist location in the config file, keeping its other
/// content and formatting. Creates the file if needed.
pub fn set_whitelist_path<P: AsRef<Path>>(config_file: P, whitelist: &Path) -> Result<()> {
    let config_file = config_file.as_ref();
    let existing = if config_file.exists() {
        fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read {}", config_file.display()))?
    } else {
        String::new()
    };

    let mut doc = existing
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("Failed to parse {}", config_file.display()))?;
    doc["whitelist"] = toml_edit::value(whitelist.to_string_lossy().as_ref());

    fs::write(config_file, doc.to_string())
        .with_context(|| format!("Failed to write {}", config_file.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_load_default() {
        let temp_dir = tempdir().unwrap();
        let config = load_config_from(temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.format.as_deref(), Some("table"));
        assert_eq!(config.whitelist, None);
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
format = "csv"
prod = true
fail_on = "*GPL*"
whitelist = "license-whitelist.json"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.format.as_deref(), Some("csv"));
        assert_eq!(config.prod, Some(true));
        assert_eq!(config.fail_on.as_deref(), Some("*GPL*"));
        assert_eq!(config.fail_on_missing, Some(false));
        assert_eq!(config.whitelist, Some(PathBuf::from("license-whitelist.json")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_unknown_keys_and_values() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        fs::write(&path, "colour = \"blue\"\n").unwrap();
        assert!(load_config_from(&path).is_err());

        fs::write(&path, "format = \"xml\"\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_whitelist_path_keeps_existing_content() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "# team settings\nformat = \"json\"\n").unwrap();

        set_whitelist_path(&path, Path::new("policy/whitelist.json")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# team settings"));
        assert!(content.contains("format = \"json\""));
        assert!(content.contains("whitelist = \"policy/whitelist.json\""));

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.whitelist, Some(PathBuf::from("policy/whitelist.json")));
    }

    #[test]
    fn test_set_whitelist_path_creates_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        set_whitelist_path(&path, Path::new("w.json")).unwrap();
        assert_eq!(
            load_config_from(&path).unwrap().whitelist,
            Some(PathBuf::from("w.json"))
        );
    }
}
