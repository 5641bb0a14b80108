//! Error types for ignitekv-core

use thiserror::Error;

/// Result type alias using ignitekv-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for ignitekv
#[derive(Error, Debug)]
pub enum Error {
    /// Project name violates the naming grammar
    #[error("Project name must contain only letters, numbers, and dashes, and cannot start or end with a dash (got '{name}')")]
    InvalidProjectName { name: String },

    /// Project name collides with an existing filesystem entry
    #[error("Project name already exists. Choose a different name or delete the [ {name} ] folder")]
    ProjectNameTaken { name: String },

    /// Input file does not exist
    #[error("File [ {path} ] not found")]
    FileNotFound { path: String },

    /// No package manager available when installation was requested
    #[error("No package managers found! You must install one of: {candidates}")]
    NoPackageManager { candidates: String },

    /// Unknown package manager name
    #[error("Unknown package manager: {name}. Valid managers: npm, bun, pnpm, yarn")]
    UnknownPackageManager { name: String },

    /// Requested package manager is not installed on this host
    #[error("Package manager '{name}' is not installed. Installed managers: {installed}")]
    PackageManagerNotInstalled { name: String, installed: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Input document's top level is not an object
    #[error("Expected a JSON object at the top level of [ {path} ], found {found}")]
    TopLevelNotObject { path: String, found: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid project name error
    pub fn invalid_project_name(name: impl Into<String>) -> Self {
        Self::InvalidProjectName { name: name.into() }
    }

    /// Create a project name collision error
    pub fn project_name_taken(name: impl Into<String>) -> Self {
        Self::ProjectNameTaken { name: name.into() }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an unknown package manager error
    pub fn unknown_package_manager(name: impl Into<String>) -> Self {
        Self::UnknownPackageManager { name: name.into() }
    }
}
