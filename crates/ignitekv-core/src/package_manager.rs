//! Package manager resolution
//!
//! Detects which package manager invoked the tool (via the npm-style
//! user-agent environment variable) and which managers are installed on
//! the host. Installed-manager probes run concurrently.

use std::fmt;
use std::str::FromStr;

use futures::future::join_all;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable set by npm-compatible package managers when they
/// invoke a binary (e.g. `npm/10.2.5 node/v20.11.0 linux x64`).
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

/// The package managers ignitekv knows how to drive
pub const KNOWN_PACKAGE_MANAGERS: [PackageManager; 4] = [
    PackageManager::Npm,
    PackageManager::Bun,
    PackageManager::Pnpm,
    PackageManager::Yarn,
];

/// A JavaScript package manager capable of running the deploy pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Npm,
    Bun,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// The executable name used to spawn this manager
    pub fn command(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Bun => "bun",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for PackageManager {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(Self::Npm),
            "bun" => Ok(Self::Bun),
            "pnpm" => Ok(Self::Pnpm),
            "yarn" => Ok(Self::Yarn),
            other => Err(Error::unknown_package_manager(other)),
        }
    }
}

/// Detect the package manager that invoked the current process.
///
/// Reads the npm-style user-agent environment variable and returns the
/// first known manager whose identifier prefixes it. Falls back to npm
/// when the variable is absent or matches nothing.
pub fn detect_invoker() -> PackageManager {
    let agent = std::env::var(USER_AGENT_ENV).ok();
    invoker_from_user_agent(agent.as_deref())
}

/// Resolve a manager from a user-agent string (pure helper behind
/// [`detect_invoker`]).
pub fn invoker_from_user_agent(agent: Option<&str>) -> PackageManager {
    let agent = agent.unwrap_or("npm");

    for pm in KNOWN_PACKAGE_MANAGERS {
        if agent.starts_with(pm.command()) {
            return pm;
        }
    }

    PackageManager::Npm
}

/// Determine which of the candidate managers are installed on this host.
///
/// Every candidate is probed concurrently with `<manager> --version`; a
/// probe that exits 0 marks the manager installed. A probe that fails to
/// spawn or errors marks it not installed - probe failures are never
/// surfaced as errors.
pub async fn detect_installed(candidates: &[PackageManager]) -> Vec<PackageManager> {
    let probes: Vec<_> = candidates.iter().map(|pm| probe(*pm)).collect();
    let results = join_all(probes).await;

    candidates
        .iter()
        .zip(results)
        .filter_map(|(pm, installed)| installed.then_some(*pm))
        .collect()
}

/// Probe a single manager by spawning `<manager> --version`
async fn probe(pm: PackageManager) -> bool {
    // A missing binary is the common case; skip the spawn entirely.
    if which::which(pm.command()).is_err() {
        debug!("{} not found in PATH", pm);
        return false;
    }

    match Command::new(pm.command()).arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(err) => {
            debug!("probe for {} failed: {}", pm, err);
            false
        }
    }
}

/// Require a non-empty installed set when dependency installation was
/// requested.
pub fn require_any_installed(installed: &[PackageManager]) -> Result<()> {
    if installed.is_empty() {
        let candidates = KNOWN_PACKAGE_MANAGERS
            .iter()
            .map(|pm| pm.command())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::NoPackageManager { candidates });
    }
    Ok(())
}
