use anyhow::Result;
use std::path::PathBuf;
use crate::cli::InitPreset;
use crate::commands::Status;
use node_license_auditor::init;

pub fn handle_init(
    preset: InitPreset,
    output: Option<PathBuf>,
    force: bool,
    quiet: bool,
) -> Result<Status> {
    let whitelist_path = output.unwrap_or_else(|| PathBuf::from(init::DEFAULT_WHITELIST_FILE));

    init::generate_whitelist(preset.into(), &whitelist_path, force)?;

    if !quiet {
        println!("✅ Whitelist written to {}", whitelist_path.display());
    }

    Ok(Status::Ok)
}
