//! Deployment pipeline for the ignitekv CLI
//!
//! Models the fixed install/login/create-db/cf-typegen/push-db/deploy
//! sequence as data: each [`Stage`] names one external invocation plus an
//! [`OutputPolicy`] describing what to do with its output stream. A single
//! generic runner consumes the policy; the [`Orchestrator`] sequences
//! stages and aborts on the first failure.

pub mod error;
pub mod orchestrator;
pub mod runner;
pub mod scraper;
pub mod stage;

pub use error::{Result, StageError};
pub use orchestrator::{
    NoopObserver, Orchestrator, PipelineObserver, PipelineState, StageOutcome, StageReport,
};
pub use runner::{ProcessRunner, StageRunner};
pub use stage::{deploy_pipeline, OutputPolicy, Stage};
