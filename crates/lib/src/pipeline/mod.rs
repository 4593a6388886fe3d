//! # Pipeline Composer
//!
//! Runs the analysis graph for a message. Independent stages and the moderation call are
//! dispatched concurrently. A stage with dependencies is dispatched as soon as all of its
//! upstream stages have produced a result, and is skipped as failed when one of them failed.
//! Partial failure is reported, never retried, and never aborts sibling branches.

pub mod types;

pub use self::types::{AnalysisRun, Dependency, ModerationOutcome, StageNode};

use self::types::{standard_graph, RunSlots};
use crate::{
    errors::AnalysisError,
    prompts::{catalog::MESSAGE, PromptCatalog},
    providers::{ai::ModelClient, moderation::ModerationClient},
    stage::{with_timeout, AnalysisStage, StageResult, DEFAULT_CALL_TIMEOUT},
};
use chrono::Utc;
use futures::{
    future::{self, BoxFuture},
    stream::{self, FuturesUnordered},
    FutureExt, StreamExt,
};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The completion of one branch of a run.
enum Branch {
    Moderation(ModerationOutcome),
    Stage(StageResult),
}

/// Composes the analysis stages, the model client, and the moderation client into runs.
///
/// Clients are injected once and shared by every stage of every run.
#[derive(Debug, Clone)]
pub struct PipelineComposer {
    catalog: PromptCatalog,
    graph: Vec<StageNode>,
    model: Box<dyn ModelClient>,
    moderation: Box<dyn ModerationClient>,
    timeout: Duration,
}

impl PipelineComposer {
    /// Creates a composer for the standard catalog and graph.
    pub fn new(model: Box<dyn ModelClient>, moderation: Box<dyn ModerationClient>) -> Self {
        Self {
            catalog: PromptCatalog::standard(),
            graph: standard_graph(),
            model,
            moderation,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Replaces the prompt catalog. Stages missing from it fail with `UnknownStage`.
    pub fn with_catalog(mut self, catalog: PromptCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the analysis graph. Stages of the run that no node schedules, or whose
    /// upstream is never produced, are reported as failed.
    pub fn with_graph(mut self, graph: Vec<StageNode>) -> Self {
        self.graph = graph;
        self
    }

    /// Sets the timeout applied to every model and moderation call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Analyses `message` and returns once every slot of the run is filled.
    pub async fn run_pipeline(&self, message: &str) -> AnalysisRun {
        self.run_pipeline_with_cancel(message, future::pending::<()>())
            .await
    }

    /// Analyses `message`, abandoning all outstanding calls once `cancel` resolves.
    ///
    /// Every slot not filled by then is reported as `Failed("cancelled")`. Results that
    /// arrive after cancellation are discarded.
    pub async fn run_pipeline_with_cancel(
        &self,
        message: &str,
        cancel: impl Future<Output = ()>,
    ) -> AnalysisRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "Starting analysis run");

        let mut slots = RunSlots::default();
        let cancelled = tokio::select! {
            biased;
            _ = cancel => true,
            _ = self.walk_graph(run_id, message, &mut slots) => false,
        };

        let run = if cancelled {
            warn!(%run_id, "Analysis run cancelled; unfinished slots are marked as failed");
            let reason = AnalysisError::Cancelled.to_string();
            slots.complete(run_id, message, started_at, true, &reason)
        } else {
            slots.complete(run_id, message, started_at, false, "stage was never scheduled")
        };
        info!(
            %run_id,
            elapsed_ms = (run.finished_at - run.started_at).num_milliseconds(),
            "Analysis run complete"
        );
        run
    }

    /// Analyses every message, at most `concurrency` at a time. Runs keep input order.
    pub async fn run_batch(&self, messages: &[String], concurrency: usize) -> Vec<AnalysisRun> {
        self.run_batch_with_cancel(messages, concurrency, future::pending::<()>())
            .await
    }

    /// Like `run_batch`, with one cancellation signal shared by all runs of the batch.
    pub async fn run_batch_with_cancel(
        &self,
        messages: &[String],
        concurrency: usize,
        cancel: impl Future<Output = ()>,
    ) -> Vec<AnalysisRun> {
        let cancel = cancel.shared();
        info!(
            messages = messages.len(),
            concurrency, "Starting batch analysis"
        );
        stream::iter(messages)
            .map(|message| self.run_pipeline_with_cancel(message, cancel.clone()))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Dispatches ready nodes and the moderation call, filling `slots` as branches finish.
    async fn walk_graph(&self, run_id: Uuid, message: &str, slots: &mut RunSlots) {
        let mut pending: FuturesUnordered<BoxFuture<'_, Branch>> = FuturesUnordered::new();
        let mut dispatched: HashSet<&str> = HashSet::new();

        pending.push(self.moderate(message).boxed());
        self.dispatch_ready(run_id, message, slots, &mut dispatched, &mut pending);

        while let Some(branch) = pending.next().await {
            match branch {
                Branch::Moderation(outcome) => {
                    debug!(%run_id, "Moderation branch finished");
                    slots.moderation = Some(outcome);
                }
                Branch::Stage(result) => {
                    debug!(%run_id, stage = %result.stage_name, status = ?result.status(), "Stage finished");
                    slots.stages.insert(result.stage_name.clone(), result);
                }
            }
            self.dispatch_ready(run_id, message, slots, &mut dispatched, &mut pending);
        }
    }

    /// Dispatches every node whose dependencies have all produced a result.
    ///
    /// A node with a failed dependency is not dispatched: its slot is filled directly,
    /// which may in turn settle nodes further downstream, so the scan repeats until no
    /// node changes state.
    fn dispatch_ready<'a>(
        &'a self,
        run_id: Uuid,
        message: &'a str,
        slots: &mut RunSlots,
        dispatched: &mut HashSet<&'a str>,
        pending: &mut FuturesUnordered<BoxFuture<'a, Branch>>,
    ) {
        loop {
            let mut progressed = false;
            for node in &self.graph {
                if dispatched.contains(node.stage.as_str()) {
                    continue;
                }
                let upstream: Option<Vec<&StageResult>> = node
                    .dependencies
                    .iter()
                    .map(|dep| slots.stages.get(&dep.upstream))
                    .collect();
                let Some(upstream) = upstream else {
                    continue;
                };

                dispatched.insert(node.stage.as_str());
                progressed = true;

                if let Some(failed) = upstream.iter().find(|result| result.is_failed()) {
                    let reason = format!("upstream {} failed", failed.stage_name);
                    warn!(%run_id, stage = %node.stage, "Skipping stage: {reason}");
                    slots
                        .stages
                        .insert(node.stage.clone(), StageResult::failed(&node.stage, reason));
                    continue;
                }

                let mut inputs = HashMap::from([(MESSAGE.to_string(), message.to_string())]);
                for (dep, result) in node.dependencies.iter().zip(&upstream) {
                    inputs.extend(dep.resolve(result));
                }
                debug!(%run_id, stage = %node.stage, "Dispatching stage");
                pending.push(self.run_stage(&node.stage, inputs).boxed());
            }
            if !progressed {
                break;
            }
        }
    }

    async fn run_stage(&self, name: &str, inputs: HashMap<String, String>) -> Branch {
        let result = match self.catalog.get(name) {
            Ok(spec) => {
                AnalysisStage::new(spec.clone())
                    .with_timeout(self.timeout)
                    .run(&inputs, self.model.as_ref())
                    .await
            }
            Err(e) => {
                warn!(stage = name, "{e}");
                StageResult::failed(name, e.to_string())
            }
        };
        Branch::Stage(result)
    }

    async fn moderate(&self, message: &str) -> Branch {
        let outcome = match with_timeout(self.timeout, self.moderation.moderate(message)).await {
            Ok(result) => ModerationOutcome::Completed(result),
            Err(e) => {
                warn!("Moderation call failed: {e}");
                ModerationOutcome::Failed(e.to_string())
            }
        };
        Branch::Moderation(outcome)
    }
}
