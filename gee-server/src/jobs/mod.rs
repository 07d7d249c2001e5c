//! Jobs: named units of work run after their pre-steps succeeded.
//!
//! A job declares a name, the source it is defined in, an ordered list of
//! pre-steps and a worker. Every submission gets its own Earth Engine session,
//! so concurrent submissions never share authentication state.

pub mod preview;

use crate::auth::AuthError;
use crate::credentials::{MalformedCredentialsError, RequestContext};
use crate::ee::QueryError;
use async_trait::async_trait;
use gee_client::EarthEngine;
use log::{debug, error, info};
use thiserror::Error;

/// Errors that abort a job
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    MalformedCredentials(#[from] MalformedCredentialsError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// A step that must succeed before the worker of a job runs
#[async_trait]
pub trait PreStep: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, request: &RequestContext, engine: &dyn EarthEngine) -> Result<(), JobError>;
}

/// The unit of work of a job
#[async_trait]
pub trait Worker: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn run(
        &self,
        input: Self::Input,
        engine: &dyn EarthEngine,
    ) -> Result<Self::Output, JobError>;
}

pub struct Job<W: Worker> {
    name: &'static str,
    path: &'static str,
    before: Vec<Box<dyn PreStep>>,
    worker: W,
}

impl<W: Worker> Job<W> {
    pub fn new(name: &'static str, path: &'static str, worker: W) -> Self {
        Self {
            name,
            path,
            before: Vec::new(),
            worker,
        }
    }

    /// Appends a pre-step; pre-steps run in the order they were added
    pub fn before(mut self, step: impl PreStep + 'static) -> Self {
        self.before.push(Box::new(step));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn pre_steps(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.before.iter().map(|step| step.name())
    }

    /// Runs the pre-steps, then the worker, on a fresh session of `engine`.
    /// The first failing pre-step aborts the job.
    pub async fn submit<E: EarthEngine>(
        &self,
        request: &RequestContext,
        input: W::Input,
        engine: &E,
    ) -> Result<W::Output, JobError> {
        info!("Running job '{}' ({})", self.name, self.path);
        let session = engine.fresh_session();

        for step in &self.before {
            debug!("Running '{}' before '{}'", step.name(), self.name);
            if let Err(e) = step.run(request, &session).await {
                error!("'{}' failed, job '{}' aborted: {}", step.name(), self.name, e);
                return Err(e);
            }
        }

        let result = self.worker.run(input, &session).await;
        match &result {
            Ok(_) => info!("Job '{}' completed", self.name),
            Err(e) => error!("Job '{}' failed: {}", self.name, e),
        }
        result
    }
}
