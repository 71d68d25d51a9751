//! Fans a batch of inputs out to one task per file and reduces their outcomes to one result.

use crate::template::{expand_output_path, input_stem};
use crate::thumbnails::{Job, Variant};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no command executor for instruction {0}")]
    UnknownVariant(String),

    #[error("{0:#}")]
    Job(color_eyre::Report),

    #[error("thumbnail job for {0} panicked")]
    JobPanicked(String),
}

/// What happens to jobs still running once the first failure has been seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StragglerPolicy {
    /// Return at once. Remaining jobs keep running and their outcomes are dropped.
    #[default]
    Detach,
    /// Keep collecting outcomes for at most this long before returning, then detach the rest.
    Wait(Duration),
}

type Outcome = Result<(), DispatchError>;

/// Runs one [`Job`] per input file through a registered [`Variant`].
pub struct Dispatcher {
    variants: HashMap<String, Arc<dyn Variant>>,
    inputs: Vec<PathBuf>,
    output_template: String,
    stragglers: StragglerPolicy,
}

impl Dispatcher {
    pub fn new(inputs: Vec<PathBuf>, output_template: impl Into<String>) -> Self {
        Self {
            variants: HashMap::new(),
            inputs,
            output_template: output_template.into(),
            stragglers: StragglerPolicy::default(),
        }
    }

    /// Registers `variant` under its own name, replacing any variant of the same name.
    pub fn register(&mut self, variant: Arc<dyn Variant>) -> &mut Self {
        self.variants.insert(variant.name().to_string(), variant);
        self
    }

    pub fn with_straggler_policy(mut self, policy: StragglerPolicy) -> Self {
        self.stragglers = policy;
        self
    }

    /// The jobs a dispatch to `variant` would run, in input order.
    pub fn jobs(&self, variant: &str) -> Vec<Job> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, input)| Job {
                input: input.clone(),
                output: expand_output_path(&self.output_template, &input_stem(input), variant, i),
                variant: variant.to_string(),
            })
            .collect()
    }

    /// Runs every input through `variant` concurrently.
    ///
    /// Returns the first job error observed, or `Ok` once every job has succeeded. An unknown
    /// `variant` fails before anything is started, and an empty batch succeeds immediately.
    pub async fn dispatch(&self, variant: &str) -> Result<(), DispatchError> {
        let executor = self
            .variants
            .get(variant)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownVariant(variant.to_string()))?;

        let jobs = self.jobs(variant);
        if jobs.is_empty() {
            debug!(variant, "nothing to dispatch");
            return Ok(());
        }
        info!(count = jobs.len(), variant, "generating thumbnails");

        let mut pending: FuturesUnordered<_> = jobs
            .into_iter()
            .map(|job| spawn_job(executor.clone(), job))
            .collect();

        let total = pending.len();
        let mut finished = 0;
        while let Some(outcome) = pending.next().await {
            match outcome {
                Ok(()) => finished += 1,
                Err(err) => {
                    warn!(
                        finished,
                        remaining = total - finished - 1,
                        error = %err,
                        "thumbnail job failed"
                    );
                    self.handle_stragglers(pending).await;
                    return Err(err);
                }
            }
        }

        debug!(finished, "all thumbnail jobs finished");
        Ok(())
    }

    async fn handle_stragglers<F>(&self, mut pending: FuturesUnordered<F>)
    where
        F: Future<Output = Outcome>,
    {
        let StragglerPolicy::Wait(grace) = self.stragglers else {
            return;
        };
        let drain = async {
            while let Some(outcome) = pending.next().await {
                if let Err(err) = outcome {
                    warn!(error = %err, "thumbnail job failed after the batch had already failed");
                }
            }
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!(
                remaining = pending.len(),
                "grace period elapsed, detaching unfinished thumbnail jobs"
            );
        }
    }
}

/// Starts `job` on its own task. Dropping the returned future detaches the task without
/// cancelling it.
fn spawn_job(variant: Arc<dyn Variant>, job: Job) -> impl Future<Output = Outcome> {
    let label = job.input.display().to_string();
    let handle: JoinHandle<color_eyre::Result<()>> =
        tokio::spawn(async move { variant.execute(&job).await });
    async move {
        match handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(report)) => Err(DispatchError::Job(report)),
            Err(_) => Err(DispatchError::JobPanicked(label)),
        }
    }
}
