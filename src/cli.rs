use clap::{Parser, Subcommand, ValueEnum};
use node_license_auditor::policy::WhitelistPreset;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "node-license-auditor")]
#[command(about = "Audit the licenses of installed npm dependencies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run license audit on installed packages
    Check {
        /// Project directory, or '-' to read one directory per line from stdin
        path: Option<PathBuf>,

        /// Only audit production dependencies
        #[arg(long)]
        prod: bool,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output file (default: stdout, '-' for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the distinct licenses and the packages using them
        #[arg(long)]
        licenses: bool,

        /// Fail when a license matches: a plain word matches anywhere in the
        /// license ('GPL'), a glob must match it whole ('GPL-*')
        #[arg(long, value_name = "GLOB")]
        fail_on: Option<String>,

        /// Fail when a package license cannot be resolved
        #[arg(long)]
        fail_on_missing: bool,

        /// Whitelist JSON file to check licenses against
        #[arg(short, long, value_name = "FILE")]
        whitelist: Option<PathBuf>,
    },
    /// Write a starter whitelist and register it in the configuration
    Init {
        /// Whitelist preset
        #[arg(default_value = "strict")]
        preset: InitPreset,

        /// Whitelist file to create
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Overwrite an existing whitelist
        #[arg(long)]
        force: bool,
    },
    /// Add whitelist violations as per-package exceptions
    Fix {
        /// Project directory
        path: Option<PathBuf>,

        /// Only audit production dependencies
        #[arg(long)]
        prod: bool,

        /// Show changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Whitelist JSON file to update
        #[arg(short, long, value_name = "FILE")]
        whitelist: Option<PathBuf>,
    },
    /// Show or validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_config(format: Option<&str>) -> Self {
        match format {
            Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InitPreset {
    Strict,
    Standard,
    Lenient,
}

impl From<InitPreset> for WhitelistPreset {
    fn from(preset: InitPreset) -> Self {
        match preset {
            InitPreset::Strict => WhitelistPreset::Strict,
            InitPreset::Standard => WhitelistPreset::Standard,
            InitPreset::Lenient => WhitelistPreset::Lenient,
        }
    }
}
