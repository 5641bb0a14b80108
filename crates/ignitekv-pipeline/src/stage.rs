//! Stage definitions for the fixed deploy pipeline

use ignitekv_core::PackageManager;
use regex::Regex;

/// Marker emitted by the login command when it prints its authentication
/// link. The scrape pattern captures the whole line so the operator sees
/// the URL itself.
pub const AUTH_LINK_PATTERN: &str = r".*link to authenticate.*";

/// Default pattern for the deployment URL the deploy command prints.
/// Matches the platform's canonical `.dev` domain suffix; override via
/// [`deploy_pipeline`] when targeting a different domain.
pub const DEFAULT_DEPLOY_URL_PATTERN: &str = r"https.+\.dev";

/// What the stage runner does with a stage's standard output
#[derive(Debug, Clone)]
pub enum OutputPolicy {
    /// Output is observed but never echoed
    Suppressed,
    /// Output is echoed to the operator verbatim as it arrives
    Passthrough,
    /// Output is matched chunk-by-chunk against a pattern; the first match
    /// settles the stage immediately with the matched text as its signal
    Scraped(Regex),
}

/// One step of the deployment pipeline: a named external invocation plus
/// its output policy. Constructed once; never mutated.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub policy: OutputPolicy,
}

impl Stage {
    pub fn suppressed(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(name, command, args, OutputPolicy::Suppressed)
    }

    pub fn passthrough(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(name, command, args, OutputPolicy::Passthrough)
    }

    pub fn scraped(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        pattern: Regex,
    ) -> Self {
        Self::new(name, command, args, OutputPolicy::Scraped(pattern))
    }

    fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        policy: OutputPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            policy,
        }
    }

    /// The full command line, for error messages and manual instructions
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// The compiled default deploy URL pattern
pub fn default_deploy_url_pattern() -> Regex {
    Regex::new(DEFAULT_DEPLOY_URL_PATTERN).expect("deploy URL regex is valid")
}

/// Build the fixed deploy pipeline for one package manager and project.
///
/// Order is load-bearing: dependency installation, authentication, remote
/// KV namespace creation, type generation, data push, deployment. Login
/// and deploy are scraped for their signals; everything else runs
/// suppressed.
pub fn deploy_pipeline(
    pm: PackageManager,
    project_name: &str,
    deploy_url_pattern: Regex,
) -> Vec<Stage> {
    let pm = pm.command();
    let auth_pattern = Regex::new(AUTH_LINK_PATTERN).expect("auth link regex is valid");

    vec![
        Stage::suppressed("install", pm, ["install"]),
        Stage::scraped("login", pm, ["run", "login"], auth_pattern),
        Stage::suppressed("create-db", pm, ["run", "create-db", project_name]),
        Stage::suppressed("cf-typegen", pm, ["run", "cf-typegen"]),
        Stage::suppressed("push-db", pm, ["run", "push-db"]),
        Stage::scraped(
            "deploy",
            pm,
            ["run".to_string(), "deploy".to_string(), project_name.to_lowercase()],
            deploy_url_pattern,
        ),
    ]
}
