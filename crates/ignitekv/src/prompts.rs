//! Interactive prompt fallbacks for omitted flags
//!
//! Each prompt validates in a loop, so bad interactive input re-prompts
//! instead of aborting the run.

use anyhow::Result;
use camino::Utf8PathBuf;
use dialoguer::{Confirm, Input, Select};
use ignitekv_core::{package_manager, project, PackageManager};

/// Ask for a project name, enforcing the grammar and the collision check
pub fn project_name() -> Result<String> {
    let name: String = Input::new()
        .with_prompt("Project Name")
        .default("ignite-json".to_string())
        .validate_with(|input: &String| {
            project::validate_available_name(input).map_err(|err| err.to_string())
        })
        .interact_text()?;

    Ok(name)
}

/// Ask for the JSON database file path; the file must exist
pub fn json_db_path() -> Result<Utf8PathBuf> {
    let path: String = Input::new()
        .with_prompt("JSON database file path")
        .default("db.json".to_string())
        .validate_with(|input: &String| {
            if std::path::Path::new(input).exists() {
                Ok(())
            } else {
                Err(format!("File [ {} ] not found", input))
            }
        })
        .interact_text()?;

    Ok(Utf8PathBuf::from(path))
}

/// Ask whether to install dependencies and run the pipeline
pub fn install_deps() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Install dependencies automatically?")
        .interact()?)
}

/// Choose one of the installed package managers, defaulting to whichever
/// manager invoked this tool when it is available.
pub fn package_manager(
    installed: &[PackageManager],
    invoker: PackageManager,
) -> Result<PackageManager> {
    package_manager::require_any_installed(installed)?;

    let default_index = installed.iter().position(|pm| *pm == invoker).unwrap_or(0);
    let labels: Vec<&str> = installed.iter().map(|pm| pm.command()).collect();

    let chosen = Select::new()
        .with_prompt("Choose package manager")
        .items(&labels)
        .default(default_index)
        .interact()?;

    Ok(installed[chosen])
}
