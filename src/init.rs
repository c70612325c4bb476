use anyhow::{Context, Result};
use std::path::Path;

use crate::config;
use crate::policy::{Whitelist, WhitelistPreset};

pub const DEFAULT_WHITELIST_FILE: &str = "license-whitelist.json";

/// Writes a starter whitelist to `whitelist_path` and points the config file
/// in the working directory at it.
pub fn generate_whitelist(preset: WhitelistPreset, whitelist_path: &Path, force: bool) -> Result<()> {
    generate_whitelist_at_path(preset, whitelist_path, &config::config_path(), force)
}

pub fn generate_whitelist_at_path(
    preset: WhitelistPreset,
    whitelist_path: &Path,
    config_file: &Path,
    force: bool,
) -> Result<()> {
    if whitelist_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            whitelist_path.display()
        );
    }

    let whitelist = Whitelist::sample(preset);
    whitelist.save(whitelist_path)?;
    tracing::debug!(
        path = %whitelist_path.display(),
        rules = whitelist.rules.len(),
        "whitelist written"
    );

    config::set_whitelist_path(config_file, whitelist_path)
        .context("Failed to record the whitelist in the configuration")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from, CONFIG_FILE_NAME};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_whitelist() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let whitelist_path = temp_dir.path().join(DEFAULT_WHITELIST_FILE);
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, "prod = true\n")?;

        generate_whitelist_at_path(WhitelistPreset::Strict, &whitelist_path, &config_file, false)?;

        let whitelist = Whitelist::load(&whitelist_path)?;
        assert!(whitelist.rules.iter().any(|rule| rule.license == "MIT"));
        assert!(whitelist.rules.iter().all(|rule| rule.is_blanket()));

        let config = load_config_from(&config_file)?;
        assert_eq!(config.prod, Some(true));
        assert_eq!(config.whitelist.as_deref(), Some(whitelist_path.as_path()));
        Ok(())
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let whitelist_path = temp_dir.path().join(DEFAULT_WHITELIST_FILE);
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&whitelist_path, "[]")?;

        let err = generate_whitelist_at_path(WhitelistPreset::Lenient, &whitelist_path, &config_file, false)
            .unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(&whitelist_path)?, "[]");

        generate_whitelist_at_path(WhitelistPreset::Lenient, &whitelist_path, &config_file, true)?;
        let whitelist = Whitelist::load(&whitelist_path)?;
        assert!(whitelist.rules.iter().any(|rule| rule.license == "GPL-3.0"));
        Ok(())
    }
}
