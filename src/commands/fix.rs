use anyhow::Result;
use std::path::PathBuf;
use crate::commands::Status;
use node_license_auditor::audit::{self, AuditOptions};
use node_license_auditor::config::load_config;
use node_license_auditor::policy::{license_alternatives, reconcile, Whitelist};

pub fn handle_fix(
    path: Option<PathBuf>,
    prod: bool,
    dry_run: bool,
    whitelist: Option<PathBuf>,
    quiet: bool,
) -> Result<Status> {
    let config = load_config()?;

    let Some(whitelist_path) = whitelist.or(config.whitelist) else {
        anyhow::bail!("No whitelist configured. Run 'node-license-auditor init' first.");
    };
    let mut whitelist = Whitelist::load(&whitelist_path)?;

    let options = AuditOptions {
        prod: prod || config.prod.unwrap_or(false),
    };
    let project = audit::audit_project(&path.unwrap_or_else(|| PathBuf::from(".")), &options)?;
    let records = audit::merge_records(project.records);

    // (license, package) pairs to allow
    let planned: Vec<(String, String)> = reconcile(&whitelist, &records)
        .violations
        .iter()
        .map(|record| {
            let license = license_alternatives(&record.license)
                .first()
                .map(|alternative| alternative.to_string())
                .unwrap_or_else(|| record.license.clone());
            (license, record.name.clone())
        })
        .collect();

    if planned.is_empty() {
        if !quiet {
            println!("No violations found, nothing to fix");
        }
        return Ok(Status::Ok);
    }

    if dry_run {
        if !quiet {
            println!(
                "Would add {} exceptions to {}:",
                planned.len(),
                whitelist_path.display()
            );
            for (license, package) in &planned {
                println!("  - {} ({})", package, license);
            }
        }
        return Ok(Status::Ok);
    }

    let mut added = Vec::new();
    for (license, package) in planned {
        if whitelist.add_exception(&license, &package) {
            added.push((license, package));
        }
    }
    whitelist.save(&whitelist_path)?;

    if !quiet {
        println!(
            "Added {} exceptions to {}:",
            added.len(),
            whitelist_path.display()
        );
        for (license, package) in &added {
            println!("  ✅ {} ({})", package, license);
        }
    }

    Ok(Status::Ok)
}
