pub mod audit;
pub mod config;
pub mod init;
pub mod license;
pub mod manifest;
pub mod output;
pub mod package;
pub mod policy;
pub mod scm;

// Re-export main types for easy access
pub use audit::{AuditReport, AuditSummary};
pub use license::{LicenseEntry, LicenseResolution};
pub use package::{PackageRecord, UnresolvedPackage};
pub use policy::{Classification, PolicyRule, Whitelist};
pub use scm::{ScmInfo, ScmType};
