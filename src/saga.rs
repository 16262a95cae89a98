//! Saga bookkeeping for multi-step writes that are not transactional.
//!
//! Each saga names its steps and declares, per step, what should happen to
//! that step's effect when a later step fails. Every write step currently
//! declares [`Compensation::Retain`]: prior commits stay in place and the
//! failure report lists them so they can be inspected or cleaned up.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// What to do with a committed step when a later step fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compensation {
    /// The step had no side effects.
    Nothing,
    /// The effect is left in place.
    Retain,
}

pub trait SagaStep: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn compensation(&self) -> Compensation;
}

/// A committed step together with the compensation it declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CommittedStep {
    pub step: &'static str,
    pub compensation: Compensation,
}

#[derive(Debug)]
pub struct SagaFailure<E> {
    pub saga: &'static str,
    pub failed_step: &'static str,
    pub committed: Vec<CommittedStep>,
    pub error: E,
}

impl<E> SagaFailure<E> {
    /// Committed steps whose effects were left behind.
    pub fn retained(&self) -> impl Iterator<Item = &CommittedStep> {
        self.committed.iter().filter(|c| c.compensation == Compensation::Retain)
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> SagaFailure<F> {
        SagaFailure { saga: self.saga, failed_step: self.failed_step, committed: self.committed, error: f(self.error) }
    }
}

impl<E: fmt::Display> fmt::Display for SagaFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed at {}: {}", self.saga, self.failed_step, self.error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for SagaFailure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.error) }
}

/// Records step outcomes as a saga runs.
#[derive(Debug)]
pub struct SagaLog<S: SagaStep> {
    saga: &'static str,
    committed: Vec<S>,
}

impl<S: SagaStep> SagaLog<S> {
    pub fn begin(saga: &'static str) -> Self {
        Self { saga, committed: Vec::new() }
    }

    pub fn committed(&self) -> &[S] { &self.committed }

    /// Runs one step, recording it on success and closing the saga on failure.
    pub async fn run<T, E, F>(&mut self, step: S, fut: F) -> Result<T, SagaFailure<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match fut.await {
            Ok(value) => {
                self.commit(step);
                Ok(value)
            }
            Err(error) => Err(self.fail(step, error)),
        }
    }

    pub fn commit(&mut self, step: S) {
        self.committed.push(step);
    }

    pub fn fail<E: fmt::Display>(&self, step: S, error: E) -> SagaFailure<E> {
        let committed: Vec<CommittedStep> = self
            .committed
            .iter()
            .map(|s| CommittedStep { step: s.name(), compensation: s.compensation() })
            .collect();
        let retained: Vec<&str> = committed
            .iter()
            .filter(|c| c.compensation == Compensation::Retain)
            .map(|c| c.step)
            .collect();
        if retained.is_empty() {
            warn!("⚠️ {} aborted at {}: {}", self.saga, step.name(), error);
        } else {
            warn!("⚠️ {} aborted at {}: {} (left in place: {:?})", self.saga, step.name(), error, retained);
        }
        SagaFailure { saga: self.saga, failed_step: step.name(), committed, error }
    }

    pub fn finish(self) {
        let steps: Vec<&str> = self.committed.iter().map(|s| s.name()).collect();
        info!("✅ {} completed: {:?}", self.saga, steps);
    }
}
