//! Template retrieval for the ignitekv CLI
//!
//! Downloads a GitHub repository tarball and unpacks it into the new
//! project directory, stripping the wrapping `repo-ref/` directory GitHub
//! puts at the archive root. Template contents are not validated here.

use std::path::Component;

use camino::Utf8Path;
use flate2::read::GzDecoder;
use tar::Archive;
use thiserror::Error;
use tracing::{debug, info};

/// Result type alias using ignitekv-scaffold's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while fetching or unpacking a template
#[derive(Error, Debug)]
pub enum Error {
    /// Destination already exists; templates never overwrite
    #[error("Destination [ {path} ] already exists")]
    DestinationExists { path: String },

    /// Template download failed
    #[error("Failed to download template '{source_name}': {source}")]
    Download {
        source_name: String,
        #[source]
        source: reqwest::Error,
    },

    /// The downloaded archive held no files
    #[error("Template archive for '{source_name}' is empty")]
    EmptyArchive { source_name: String },

    /// IO error while unpacking
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A remote GitHub template, addressed as `owner/repo` plus a git ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
}

impl TemplateSource {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
        }
    }

    /// The worker template this tool scaffolds by default
    pub fn default_template() -> Self {
        Self::new("almodheshplus", "ignite-json", "main")
    }

    /// Codeload URL for this source's tarball
    fn tarball_url(&self) -> String {
        format!(
            "https://codeload.github.com/{}/{}/tar.gz/{}",
            self.owner, self.repo, self.git_ref
        )
    }
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gh:{}/{}", self.owner, self.repo)
    }
}

/// Download `source` and unpack it into `dest`.
///
/// `dest` must not exist yet; the project name collision check upstream
/// guarantees this in the normal flow, but the fetcher re-checks so it is
/// safe on its own.
pub async fn fetch_template(source: &TemplateSource, dest: &Utf8Path) -> Result<()> {
    if dest.exists() {
        return Err(Error::DestinationExists {
            path: dest.to_string(),
        });
    }

    let url = source.tarball_url();
    info!("downloading template {} from {}", source, url);

    let download_err = |err| Error::Download {
        source_name: source.to_string(),
        source: err,
    };

    let response = reqwest::get(&url)
        .await
        .map_err(download_err)?
        .error_for_status()
        .map_err(download_err)?;
    let bytes = response.bytes().await.map_err(download_err)?;

    unpack_tarball(&bytes, dest, &source.to_string())
}

/// Unpack a gzipped tarball into `dest`, stripping the single top-level
/// directory component every GitHub tarball carries.
pub fn unpack_tarball(data: &[u8], dest: &Utf8Path, source_name: &str) -> Result<()> {
    let decoder = GzDecoder::new(data);
    let mut archive = Archive::new(decoder);

    let mut unpacked = 0usize;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        // Drop the wrapping `repo-ref/` component.
        let stripped: std::path::PathBuf = path
            .components()
            .skip(1)
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();

        if stripped.as_os_str().is_empty() {
            continue;
        }

        let target = dest.as_std_path().join(&stripped);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
        unpacked += 1;
        debug!("unpacked {}", stripped.display());
    }

    if unpacked == 0 {
        return Err(Error::EmptyArchive {
            source_name: source_name.to_string(),
        });
    }

    Ok(())
}
