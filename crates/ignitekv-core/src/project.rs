//! Project name validation
//!
//! Enforces the naming grammar (the name doubles as the project directory
//! and the remote KV namespace name) and checks for filesystem collisions
//! in the directory the template would be fetched into.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Accepted grammar: ASCII alphanumerics with interior dashes, no leading
/// or trailing dash.
static PROJECT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$").expect("project name regex is valid")
});

/// Check a candidate name against the naming grammar
pub fn validate_name(name: &str) -> Result<()> {
    if PROJECT_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_project_name(name))
    }
}

/// Check the grammar and reject names that already exist as a filesystem
/// entry under `base_dir`. Does not mutate the filesystem.
pub fn validate_name_in(name: &str, base_dir: &Path) -> Result<()> {
    validate_name(name)?;
    if base_dir.join(name).exists() {
        return Err(Error::project_name_taken(name));
    }
    Ok(())
}

/// Validate against the current working directory
pub fn validate_available_name(name: &str) -> Result<()> {
    let cwd = std::env::current_dir()?;
    validate_name_in(name, &cwd)
}
