use anyhow::{Context, Result};
use crate::commands::Status;
use node_license_auditor::config::load_config;
use node_license_auditor::policy::Whitelist;

pub fn handle_config(show: bool, validate: bool, quiet: bool) -> Result<Status> {
    if !show && !validate {
        anyhow::bail!("Use --show or --validate");
    }

    let config = load_config().context("Error loading configuration")?;

    if show && !quiet {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    if validate {
        config
            .validate()
            .context("Configuration validation failed")?;
        if let Some(path) = &config.whitelist {
            Whitelist::load(path).context("Configuration validation failed")?;
        }
        if !quiet {
            println!("✅ Configuration is valid");
        }
    }

    Ok(Status::Ok)
}
