//! Sequential stage orchestration
//!
//! Drives the fixed stage list strictly in order: stage i+1 is spawned
//! only after stage i settles, and the first failure aborts everything
//! that remains. Observer callbacks let the CLI animate progress without
//! the state machine knowing about terminals.

use tracing::{debug, warn};

use crate::error::{Result, StageError};
use crate::runner::StageRunner;
use crate::stage::Stage;

/// How a settled stage resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage's pattern matched; carries the captured signal text
    Signal(String),
    /// The stage's process exited without producing a signal - the soft
    /// outcome, not a failure
    Completed,
}

impl StageOutcome {
    /// The captured signal, if the stage produced one
    pub fn signal(&self) -> Option<&str> {
        match self {
            Self::Signal(signal) => Some(signal),
            Self::Completed => None,
        }
    }
}

/// Per-stage record handed back after a successful run
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: String,
    pub outcome: StageOutcome,
}

/// Orchestrator lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Index of the stage currently running
    Running(usize),
    Succeeded,
    Aborted,
}

/// Observer for stage lifecycle events
///
/// Implement this to drive spinners or collect metrics; the default
/// implementations do nothing.
pub trait PipelineObserver {
    fn on_stage_started(&mut self, _stage: &Stage) {}
    fn on_stage_finished(&mut self, _stage: &Stage, _outcome: &StageOutcome) {}
}

/// Observer that ignores every event
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// The command orchestration state machine
pub struct Orchestrator {
    stages: Vec<Stage>,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order, aborting on the first failure.
    ///
    /// Returns one report per stage on full success. On failure the error
    /// names the failing command; completed stages are not rolled back.
    pub async fn run(
        &mut self,
        runner: &dyn StageRunner,
        observer: &mut dyn PipelineObserver,
    ) -> Result<Vec<StageReport>> {
        let mut reports = Vec::with_capacity(self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            self.state = PipelineState::Running(index);
            debug!("stage {}/{}: {}", index + 1, self.stages.len(), stage.name);
            observer.on_stage_started(stage);

            match runner.run_stage(stage).await {
                Ok(outcome) => {
                    observer.on_stage_finished(stage, &outcome);
                    reports.push(StageReport {
                        stage: stage.name.clone(),
                        outcome,
                    });
                }
                Err(failure) => {
                    warn!("stage '{}' failed, aborting pipeline", stage.name);
                    self.state = PipelineState::Aborted;
                    return Err(failure);
                }
            }
        }

        self.state = PipelineState::Succeeded;
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Runner that replays scripted outcomes and records which stages ran
    struct ScriptedRunner {
        script: Mutex<VecDeque<Result<StageOutcome>>>,
        ran: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(script: Vec<Result<StageOutcome>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ran: Mutex::new(Vec::new()),
            }
        }

        fn ran(&self) -> Vec<String> {
            self.ran.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StageRunner for ScriptedRunner {
        async fn run_stage(&self, stage: &Stage) -> Result<StageOutcome> {
            self.ran.lock().unwrap().push(stage.name.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        started: Vec<String>,
        finished: Vec<String>,
    }

    impl PipelineObserver for CountingObserver {
        fn on_stage_started(&mut self, stage: &Stage) {
            self.started.push(stage.name.clone());
        }

        fn on_stage_finished(&mut self, stage: &Stage, _outcome: &StageOutcome) {
            self.finished.push(stage.name.clone());
        }
    }

    fn three_stages() -> Vec<Stage> {
        vec![
            Stage::suppressed("first", "true", Vec::<String>::new()),
            Stage::suppressed("second", "true", Vec::<String>::new()),
            Stage::suppressed("third", "true", Vec::<String>::new()),
        ]
    }

    fn stderr_failure() -> StageError {
        StageError::Stderr {
            command: "true".to_string(),
            stderr: "permission denied".to_string(),
        }
    }

    #[tokio::test]
    async fn all_stages_succeed_in_order() {
        let runner = ScriptedRunner::new(vec![
            Ok(StageOutcome::Completed),
            Ok(StageOutcome::Signal("https://x.dev".into())),
            Ok(StageOutcome::Completed),
        ]);
        let mut orchestrator = Orchestrator::new(three_stages());
        let mut observer = CountingObserver::default();

        assert_eq!(orchestrator.state(), PipelineState::Idle);
        let reports = orchestrator.run(&runner, &mut observer).await.unwrap();

        assert_eq!(orchestrator.state(), PipelineState::Succeeded);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].outcome.signal(), Some("https://x.dev"));
        assert_eq!(runner.ran(), ["first", "second", "third"]);
        assert_eq!(observer.started, observer.finished);
    }

    #[tokio::test]
    async fn failure_at_stage_two_never_spawns_stage_three() {
        let runner = ScriptedRunner::new(vec![
            Ok(StageOutcome::Completed),
            Err(stderr_failure()),
            // No third entry: reaching stage three would panic the script.
        ]);
        let mut orchestrator = Orchestrator::new(three_stages());

        let err = orchestrator
            .run(&runner, &mut NoopObserver)
            .await
            .unwrap_err();

        assert_eq!(orchestrator.state(), PipelineState::Aborted);
        assert_eq!(runner.ran(), ["first", "second"]);
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn observer_not_notified_of_failed_stage_finish() {
        let runner = ScriptedRunner::new(vec![Err(stderr_failure())]);
        let mut orchestrator = Orchestrator::new(vec![Stage::suppressed(
            "only",
            "true",
            Vec::<String>::new(),
        )]);
        let mut observer = CountingObserver::default();

        let _ = orchestrator.run(&runner, &mut observer).await;

        assert_eq!(observer.started, ["only"]);
        assert!(observer.finished.is_empty());
    }

    #[tokio::test]
    async fn empty_pipeline_succeeds_immediately() {
        let runner = ScriptedRunner::new(Vec::new());
        let mut orchestrator = Orchestrator::new(Vec::new());

        let reports = orchestrator.run(&runner, &mut NoopObserver).await.unwrap();

        assert!(reports.is_empty());
        assert_eq!(orchestrator.state(), PipelineState::Succeeded);
    }
}
