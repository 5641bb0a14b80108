//! End-to-end command flow
//!
//! Resolve package manager → validate inputs → fetch template → transform
//! JSON to KV → run the deploy pipeline (or print the manual steps) →
//! report final status.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use tracing::debug;

use ignitekv_core::{kv, package_manager, project, Error as CoreError};
use ignitekv_pipeline::{
    deploy_pipeline, stage::default_deploy_url_pattern, Orchestrator, PipelineObserver,
    ProcessRunner, Stage, StageOutcome,
};
use ignitekv_scaffold::TemplateSource;

use crate::cli::Cli;
use crate::output;
use crate::prompts;

pub async fn run(cli: Cli) -> Result<()> {
    output::banner();

    let invoker = package_manager::detect_invoker();
    let installed =
        package_manager::detect_installed(&package_manager::KNOWN_PACKAGE_MANAGERS).await;

    // Project name: flag (validated) or prompt.
    let project_name = match cli.project_name {
        Some(name) => {
            project::validate_available_name(&name)?;
            output::answered("Project Name", &name);
            name
        }
        None => prompts::project_name()?,
    };

    // JSON database path: the file must exist before anything spawns.
    let json_db = match cli.json_db {
        Some(path) => {
            if !path.exists() {
                return Err(CoreError::file_not_found(path.as_str()).into());
            }
            output::answered("JSON database file path", path.as_str());
            path
        }
        None => prompts::json_db_path()?,
    };

    // --pm implies automatic installation.
    let install = match cli.install_deps {
        Some(choice) => {
            output::answered(
                "Install dependencies automatically",
                if choice.into() { "Yes" } else { "No" },
            );
            choice.into()
        }
        None => {
            if cli.package_manager.is_some() {
                true
            } else {
                prompts::install_deps()?
            }
        }
    };

    let manager = if install {
        package_manager::require_any_installed(&installed)?;
        match cli.package_manager {
            Some(pm) => {
                if !installed.contains(&pm) {
                    return Err(CoreError::PackageManagerNotInstalled {
                        name: pm.to_string(),
                        installed: installed
                            .iter()
                            .map(|p| p.command())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }
                    .into());
                }
                output::answered("Package Manager", pm.command());
                pm
            }
            None => prompts::package_manager(&installed, invoker)?,
        }
    } else {
        // Manual instructions still name a manager; prefer the invoker.
        cli.package_manager.unwrap_or(invoker)
    };

    // Fetch the worker template into the project directory.
    let source = TemplateSource::default_template();
    let project_dir = Utf8PathBuf::from(&project_name);
    let spinner = output::spinner(&format!("Downloading template {}", source));
    let fetched = ignitekv_scaffold::fetch_template(&source, &project_dir).await;
    spinner.finish_and_clear();
    fetched?;
    output::success(&format!(
        "Template downloaded, [ {} ] directory has been created",
        project_name
    ));

    // Convert the JSON database into the KV import file.
    let spinner = output::spinner("Preparing Cloudflare Workers KV database");
    let transformed = kv::transform_file(&json_db, &project_dir);
    spinner.finish_and_clear();
    let count = transformed?;
    output::success(&format!(
        "Prepared {} KV record(s) in {}/{}",
        count,
        project_name,
        kv::KV_FILE_NAME
    ));

    let stages = deploy_pipeline(manager, &project_name, default_deploy_url_pattern());

    if !install {
        print_manual_steps(&project_name, &stages);
        return Ok(());
    }

    run_pipeline(stages, &project_dir, &project_name).await
}

/// Drive the orchestrator with a spinner per stage and report the final
/// deployment status.
async fn run_pipeline(
    stages: Vec<Stage>,
    project_dir: &Utf8Path,
    project_name: &str,
) -> Result<()> {
    debug!("running {} pipeline stages in {}", stages.len(), project_dir);

    let runner = ProcessRunner::new(project_dir.to_path_buf());
    let mut orchestrator = Orchestrator::new(stages);
    let mut observer = SpinnerObserver::new(project_name.to_string());

    let result = orchestrator.run(&runner, &mut observer).await;
    observer.clear();

    // A stage failure propagates as-is; main's error handler prints it once.
    let reports = result?;

    // The deploy stage settles last; its signal is the live URL.
    match reports.last().and_then(|report| report.outcome.signal()) {
        Some(url) => {
            println!();
            println!("      {}", " Awesome! ✨ ".white().on_green());
            println!("      {}", " Your JSON server is ready 🥳 ".white().on_bright_magenta());
            println!("      {} {}", "Link 🔗:".bright_green(), url.bright_magenta());
        }
        None => {
            output::warning("Deployment finished without reporting a URL.");
            println!(
                "  {}",
                "The worker may still be deployed - check the [ Workers & Pages ] section of the Cloudflare dashboard."
                    .cyan()
            );
        }
    }

    Ok(())
}

/// The "do it yourself" path: list every pipeline command in order.
fn print_manual_steps(project_name: &str, stages: &[Stage]) {
    output::warning("You will need to finish the deployment manually");
    println!();
    println!(
        "  {}",
        "Run the following commands to deploy:".bright_magenta()
    );
    for command in manual_commands(project_name, stages) {
        println!("  > {}", command);
    }
    println!();
}

/// `cd` into the project, then every pipeline command in pipeline order
fn manual_commands(project_name: &str, stages: &[Stage]) -> Vec<String> {
    let mut commands = Vec::with_capacity(stages.len() + 1);
    commands.push(format!("cd {}", project_name));
    commands.extend(stages.iter().map(Stage::command_line));
    commands
}

/// Per-stage progress display for the interactive pipeline run
struct SpinnerObserver {
    project_name: String,
    current: Option<ProgressBar>,
}

impl SpinnerObserver {
    fn new(project_name: String) -> Self {
        Self {
            project_name,
            current: None,
        }
    }

    /// Drop any spinner left behind by an aborted run
    fn clear(&mut self) {
        if let Some(spinner) = self.current.take() {
            spinner.finish_and_clear();
        }
    }

    fn label(&self, stage: &Stage) -> String {
        match stage.name.as_str() {
            "install" => "Installing dependencies".to_string(),
            "login" => "Logging in to Cloudflare".to_string(),
            "create-db" => format!("Creating remote KV database [ {} ]", self.project_name),
            "cf-typegen" => format!("Generating types for [ {} ]", self.project_name),
            "push-db" => format!("Pushing data to remote KV database [ {} ]", self.project_name),
            "deploy" => format!("Deploying [ {} ] to Cloudflare Workers", self.project_name),
            other => format!("Running {}", other),
        }
    }

    fn done_message(&self, stage: &Stage) -> Option<String> {
        match stage.name.as_str() {
            "install" => Some("Dependencies installed".to_string()),
            "login" => Some("Logged in to Cloudflare".to_string()),
            "create-db" => Some("KV database created".to_string()),
            "cf-typegen" => Some("Types generated".to_string()),
            "push-db" => Some("KV database pushed to remote".to_string()),
            _ => None,
        }
    }
}

impl PipelineObserver for SpinnerObserver {
    fn on_stage_started(&mut self, stage: &Stage) {
        self.current = Some(output::spinner(&self.label(stage)));
    }

    fn on_stage_finished(&mut self, stage: &Stage, outcome: &StageOutcome) {
        if let Some(spinner) = self.current.take() {
            spinner.finish_and_clear();
        }

        // The login signal carries the link the operator must open.
        if stage.name == "login" {
            if let Some(link) = outcome.signal() {
                println!();
                println!("{}", link.cyan());
                println!();
            }
        }

        if let Some(message) = self.done_message(stage) {
            output::success(&message);
        }
    }
}
