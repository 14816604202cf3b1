//! Build identity logged at startup.

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit recorded at build time through `QOD_GIT_COMMIT`.
pub fn git_commit() -> &'static str {
    option_env!("QOD_GIT_COMMIT").unwrap_or("unknown")
}

pub fn banner() -> String {
    format!(
        "{} version {} (commit {}, {}/{})",
        NAME,
        VERSION,
        git_commit(),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
