use std::time::{Duration, Instant};

use log::{info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// The job is responsible for orchestrating the steps and reporting the
/// overall result.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeds
    /// - `Err(BatchError)` naming the first step that failed
    fn run(&self) -> JobResult<JobExecution>;
}

/// Timing and per-step bookkeeping of a finished job run.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// One execution record per step, in run order
    pub step_executions: Vec<StepExecution>,
}

impl JobExecution {
    /// Looks up the execution record of a step by name.
    pub fn step(&self, name: &str) -> Option<&StepExecution> {
        self.step_executions.iter().find(|s| s.name == name)
    }
}

/// A configured job: a name, an id and its ordered steps.
pub struct JobInstance<'a> {
    id: Uuid,
    name: String,
    steps: Vec<&'a dyn Step>,
}

impl JobInstance<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl Job for JobInstance<'_> {
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        let mut step_executions = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());

            if let Err(error) = step.execute(&mut step_execution) {
                warn!("Job {} aborted: {}", self.name, error);
                return Err(BatchError::Step(step.get_name().to_owned()));
            }

            step_executions.push(step_execution);
        }

        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            step_executions,
        })
    }
}

/// Builder for creating a job instance.
///
/// If no name is provided a random one is generated.
#[derive(Default)]
pub struct JobBuilder<'a> {
    name: Option<String>,
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Identical to `next()`, kept for readability at the head of the chain.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps run in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
        }
    }
}
