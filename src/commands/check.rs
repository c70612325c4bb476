use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use crate::cli::OutputFormat;
use crate::commands::Status;
use node_license_auditor::audit::{self, AuditOptions};
use node_license_auditor::config::load_config;
use node_license_auditor::output::{format_csv, format_table_output};
use node_license_auditor::policy::{reconcile, Whitelist};

pub struct CheckArgs {
    pub path: Option<PathBuf>,
    pub prod: bool,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub licenses: bool,
    pub fail_on: Option<String>,
    pub fail_on_missing: bool,
    pub whitelist: Option<PathBuf>,
}

pub fn handle_check(args: CheckArgs, quiet: bool, verbose: bool) -> Result<Status> {
    let config = load_config()?;
    config.validate()?;

    // CLI arguments override config values
    let prod = args.prod || config.prod.unwrap_or(false);
    let fail_on_missing = args.fail_on_missing || config.fail_on_missing.unwrap_or(false);
    let fail_on = args.fail_on.or(config.fail_on);
    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::from_config(config.format.as_deref()));

    // Load the whitelist first so a broken file fails before scanning
    let whitelist = args
        .whitelist
        .or(config.whitelist)
        .map(Whitelist::load)
        .transpose()?;

    let input_mode = args.path.as_deref() == Some(Path::new("-"));
    let roots = if input_mode {
        read_roots(io::stdin().lock())?
    } else {
        vec![args.path.unwrap_or_else(|| PathBuf::from("."))]
    };
    if roots.is_empty() {
        anyhow::bail!("No project directories given on stdin");
    }

    let options = AuditOptions { prod };
    let mut records = Vec::new();
    let mut unresolved = Vec::new();
    for root in &roots {
        let project = audit::audit_project(root, &options)?;
        let mut project_records = project.records;
        if input_mode {
            let parent = project
                .name
                .unwrap_or_else(|| root.display().to_string());
            for record in &mut project_records {
                record.parents = vec![parent.clone()];
            }
        }
        records.extend(project_records);
        unresolved.extend(project.unresolved);
    }
    let records = audit::merge_records(records);

    let mut report = audit::create_report(
        roots.iter().map(|root| root.display().to_string()).collect(),
        records,
        unresolved,
    );

    let mut violated = false;
    if let Some(whitelist) = &whitelist {
        let reconciliation = reconcile(whitelist, &report.packages);
        violated = reconciliation.is_violated();
        let summary = reconciliation.summary();
        report.whitelist = Some(summary);
    }

    let output_content = if args.licenses {
        let licenses = audit::distinct_licenses(&report.packages);
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(&licenses)?,
            _ => licenses
                .iter()
                .map(|(license, names)| format!("{}: {}", license, names.join(", ")))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    } else {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            OutputFormat::Table => format_table_output(&report, verbose),
            OutputFormat::Csv => format_csv(&report.packages),
        }
    };

    match args.output {
        Some(path) if path != Path::new("-") => fs::write(&path, output_content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        _ => {
            if !quiet {
                println!("{}", output_content);
            }
        }
    }

    if let Some(pattern) = &fail_on {
        if let Some(license) = audit::find_forbidden(&report.packages, pattern)? {
            eprintln!("Found license defined by the --fail-on flag: \"{}\"", license);
            return Ok(Status::ForbiddenLicense);
        }
    }

    if fail_on_missing && !report.unresolved.is_empty() {
        eprintln!(
            "{} packages have no resolvable license",
            report.unresolved.len()
        );
        return Ok(Status::MissingLicense);
    }

    if violated {
        let count = report.whitelist.as_ref().map(|w| w.violations.len()).unwrap_or(0);
        eprintln!("License whitelist violations found: {} packages", count);
        return Ok(Status::WhitelistViolation);
    }

    Ok(Status::Ok)
}

/// One project directory per non-blank line.
fn read_roots<R: BufRead>(input: R) -> Result<Vec<PathBuf>> {
    let mut roots = Vec::new();
    for line in input.lines() {
        let line = line.context("Failed to read project directories from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            roots.push(PathBuf::from(line));
        }
    }
    Ok(roots)
}
