pub mod config;
pub mod matcher;
pub mod checker;

// Re-export main types
pub use config::{PolicyRule, Whitelist, WhitelistPreset};
pub use matcher::{classify, license_alternatives, Classification};
pub use checker::{reconcile, PolicyFinding, Reconciliation, WhitelistSummary};
