use crate::audit::AuditReport;
use crate::package::PackageRecord;
use crate::policy::PolicyFinding;

const OVERVIEW_NAMES_WIDTH: usize = 100;

pub fn format_table_output(report: &AuditReport, verbose: bool) -> String {
    let mut output = String::new();

    let summary = &report.summary;
    let violations = report.whitelist.as_ref().map(|w| w.violations.len()).unwrap_or(0);

    output.push_str(&format!("📦 License Summary ({} packages)\n", summary.total_packages));
    output.push_str(&format!(
        "✅ {} with licenses  ⚠️ {} unknown  🚫 {} violations\n\n",
        summary.resolved, summary.unresolved, violations
    ));

    if !report.packages.is_empty() {
        output.push_str("📜 Licenses:\n");
        output.push_str(&format_license_overview(&report.packages, verbose));
    }

    if !report.unresolved.is_empty() {
        output.push_str("\n⚠️  Unresolved Packages:\n");
        output.push_str(&format_rows(
            ["Package", "Version", "Reason"],
            report.unresolved.iter().map(|p| {
                [
                    p.name.clone(),
                    p.version.clone().unwrap_or_else(|| "unknown".to_string()),
                    p.reason.clone(),
                ]
            }),
            verbose,
        ));
    }

    if let Some(whitelist) = &report.whitelist {
        if !whitelist.exceptions.is_empty() {
            output.push_str("\n📝 Exceptions:\n");
            output.push_str(&format_findings(&whitelist.exceptions, verbose));
        }
        if whitelist.violations.is_empty() {
            output.push_str("\n✅ All licenses allowed by the whitelist\n");
        } else {
            output.push_str("\n🚫 Whitelist Violations:\n");
            output.push_str(&format_findings(&whitelist.violations, verbose));
        }
    }

    output
}

/// One line per license: count and the packages using it.
fn format_license_overview(packages: &[PackageRecord], verbose: bool) -> String {
    let mut output = String::new();
    for (license, names) in crate::audit::distinct_licenses(packages) {
        let joined = names.join(", ");
        let shown = if verbose {
            joined
        } else {
            truncate(&joined, OVERVIEW_NAMES_WIDTH)
        };
        output.push_str(&format!("  {} ({}): {}\n", license, names.len(), shown));
    }
    output
}

fn format_findings(findings: &[PolicyFinding], verbose: bool) -> String {
    format_rows(
        ["Package", "Version", "License"],
        findings.iter().map(|f| {
            [
                f.name.clone(),
                f.version.clone().unwrap_or_else(|| "unknown".to_string()),
                f.license.clone(),
            ]
        }),
        verbose,
    )
}

/// Boxed three column table. Columns are fixed width unless `verbose`,
/// which sizes them to the content.
fn format_rows<I>(header: [&str; 3], rows: I, verbose: bool) -> String
where
    I: Iterator<Item = [String; 3]>,
{
    let rows: Vec<[String; 3]> = rows.collect();

    let mut widths = [20, 10, 24];
    if verbose {
        for (i, title) in header.iter().enumerate() {
            widths[i] = rows
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(title.chars().count()))
                .max()
                .unwrap_or(0);
        }
    }

    let line = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{}{}{}{}{}{}\n",
            left,
            "─".repeat(widths[0] + 2),
            mid,
            "─".repeat(widths[1] + 2),
            mid,
            "─".repeat(widths[2] + 2),
            right
        )
    };
    let cells = |cells: [&str; 3]| {
        format!(
            "│ {:<w0$} │ {:<w1$} │ {:<w2$} │\n",
            truncate(cells[0], widths[0]),
            truncate(cells[1], widths[1]),
            truncate(cells[2], widths[2]),
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        )
    };

    let mut output = String::new();
    output.push_str(&line("┌", "┬", "┐"));
    output.push_str(&cells(header));
    output.push_str(&line("├", "┼", "┤"));
    for row in &rows {
        output.push_str(&cells([&row[0], &row[1], &row[2]]));
    }
    output.push_str(&line("└", "┴", "┘"));
    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

pub fn format_csv(packages: &[PackageRecord]) -> String {
    let mut output = String::from(
        "\"module name\",\"version\",\"licenses\",\"repository\",\"licenseUrl\",\"parents\"\n",
    );

    for package in packages {
        let parents = package.parents.join(",");
        let fields = [
            package.name.as_str(),
            package.version.as_deref().unwrap_or(""),
            package.license.as_str(),
            package.repo_base_url.as_deref().unwrap_or(""),
            package.url.as_deref().unwrap_or(""),
            parents.as_str(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_quote(f)).collect();
        output.push_str(&line.join(","));
        output.push('\n');
    }

    output
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
