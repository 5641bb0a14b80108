//! Core library for the ignitekv CLI
//!
//! Hosts the pieces shared by the CLI and the deployment pipeline:
//! package manager resolution, project name validation, and the
//! JSON-to-KV record transformation.

pub mod error;
pub mod kv;
pub mod package_manager;
pub mod project;

pub use error::{Error, Result};
pub use kv::KvRecord;
pub use package_manager::PackageManager;
