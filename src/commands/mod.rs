pub mod check;
pub mod init;
pub mod fix;
pub mod config;

pub use check::{handle_check, CheckArgs};
pub use init::handle_init;
pub use fix::handle_fix;
pub use config::handle_config;

/// How a successful run ends. Mapped to the process exit code in `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// A license matched `--fail-on`
    ForbiddenLicense,
    /// Unresolved packages with `--fail-on-missing`
    MissingLicense,
    WhitelistViolation,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::ForbiddenLicense => 2,
            Status::MissingLicense => 3,
            Status::WhitelistViolation => 4,
        }
    }
}
