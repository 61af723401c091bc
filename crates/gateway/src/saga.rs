//! Typed saga steps and the runner that sequences them.
//!
//! Every composite flow of the [`Orchestrator`](crate::Orchestrator) is a
//! list of [`SagaStep`]s executed strictly one after the other. A step that
//! fails stops the saga. What happens to the steps already completed depends
//! on the [`SagaPolicy`]:
//!
//! - [`SagaPolicy::FailForward`] leaves them in place;
//! - [`SagaPolicy::Compensate`] undoes the creation steps in reverse order.
//!
//! Either way the caller gets a [`SagaError`] naming the failed step and the
//! completed ones, so a half-applied saga can be reconciled by hand.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use engine::{EngineError, PlanStore, ResultEngine, UserStore};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SagaStep {
    Validate,
    Authorize,
    CreatePin,
    CreateWhiteboard,
    CreateTrip,
    CreateMembership,
    ReadTrip,
    CascadeWhiteboards,
    DeleteTrip,
    DeleteMemberships,
    LinkWhiteboard,
    UnlinkWhiteboard,
    ReadWhiteboard,
    LinkPin,
    DeletePin,
    UnlinkPin,
    CreateUser,
    DeleteUser,
}

impl SagaStep {
    pub fn as_str(self) -> &'static str {
        match self {
            SagaStep::Validate => "validate",
            SagaStep::Authorize => "authorize",
            SagaStep::CreatePin => "create_pin",
            SagaStep::CreateWhiteboard => "create_whiteboard",
            SagaStep::CreateTrip => "create_trip",
            SagaStep::CreateMembership => "create_membership",
            SagaStep::ReadTrip => "read_trip",
            SagaStep::CascadeWhiteboards => "cascade_whiteboards",
            SagaStep::DeleteTrip => "delete_trip",
            SagaStep::DeleteMemberships => "delete_memberships",
            SagaStep::LinkWhiteboard => "link_whiteboard",
            SagaStep::UnlinkWhiteboard => "unlink_whiteboard",
            SagaStep::ReadWhiteboard => "read_whiteboard",
            SagaStep::LinkPin => "link_pin",
            SagaStep::DeletePin => "delete_pin",
            SagaStep::UnlinkPin => "unlink_pin",
            SagaStep::CreateUser => "create_user",
            SagaStep::DeleteUser => "delete_user",
        }
    }
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with completed steps when a later one fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaPolicy {
    #[default]
    FailForward,
    Compensate,
}

/// A saga stopped at `failed`.
#[derive(Debug, Error)]
#[error("{saga} failed at step {failed}: {source}")]
pub struct SagaError {
    pub saga: &'static str,
    pub failed: SagaStep,
    /// Steps that succeeded before `failed`, in execution order.
    pub completed: Vec<SagaStep>,
    #[source]
    pub source: EngineError,
    /// Steps that were undone.
    pub compensated: Vec<SagaStep>,
    /// Undo actions that failed themselves. They never replace `source`.
    pub compensation_failures: Vec<(SagaStep, EngineError)>,
}

/// Undo action of a completed creation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Undo {
    DeletePin(Uuid),
    DeleteWhiteboard(Uuid),
    DeleteTrip(Uuid),
    DeleteMembership { trip_id: Uuid, user_id: Uuid },
    DeleteUser(Uuid),
}

impl Undo {
    /// The step this action undoes.
    fn step(self) -> SagaStep {
        match self {
            Undo::DeletePin(_) => SagaStep::CreatePin,
            Undo::DeleteWhiteboard(_) => SagaStep::CreateWhiteboard,
            Undo::DeleteTrip(_) => SagaStep::CreateTrip,
            Undo::DeleteMembership { .. } => SagaStep::CreateMembership,
            Undo::DeleteUser(_) => SagaStep::CreateUser,
        }
    }
}

/// Run `call`, failing with [`EngineError::Unavailable`] once `timeout` elapses.
pub(crate) async fn bounded<T>(
    timeout: Option<Duration>,
    what: &str,
    call: impl Future<Output = ResultEngine<T>>,
) -> ResultEngine<T> {
    let Some(limit) = timeout else {
        return call.await;
    };
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Unavailable(format!(
            "{what} timed out after {limit:?}"
        ))),
    }
}

/// One execution of a saga.
pub(crate) struct Saga {
    name: &'static str,
    plan: Arc<dyn PlanStore>,
    users: Arc<dyn UserStore>,
    policy: SagaPolicy,
    timeout: Option<Duration>,
    completed: Vec<SagaStep>,
    undo: Vec<Undo>,
}

impl Saga {
    pub(crate) fn new(
        name: &'static str,
        plan: Arc<dyn PlanStore>,
        users: Arc<dyn UserStore>,
        policy: SagaPolicy,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            name,
            plan,
            users,
            policy,
            timeout,
            completed: Vec::new(),
            undo: Vec::new(),
        }
    }

    /// Fail before any remote call was made.
    pub(crate) fn reject(&self, step: SagaStep, source: EngineError) -> SagaError {
        debug!(saga = self.name, %step, "saga rejected: {source}");
        SagaError {
            saga: self.name,
            failed: step,
            completed: Vec::new(),
            source,
            compensated: Vec::new(),
            compensation_failures: Vec::new(),
        }
    }

    /// Run one step. On failure the saga is aborted according to its policy.
    pub(crate) async fn step<T>(
        &mut self,
        step: SagaStep,
        call: impl Future<Output = ResultEngine<T>>,
    ) -> Result<T, SagaError> {
        debug!(saga = self.name, %step, "saga step started");
        match bounded(self.timeout, step.as_str(), call).await {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            Err(source) => Err(self.abort(step, source).await),
        }
    }

    /// Register how to undo the step that just completed.
    pub(crate) fn undo_with(&mut self, undo: Undo) {
        self.undo.push(undo);
    }

    /// Log the outcome of a saga that ran to the end.
    pub(crate) fn finish(self) {
        debug!(saga = self.name, steps = ?self.completed, "saga completed");
    }

    async fn abort(&mut self, failed: SagaStep, source: EngineError) -> SagaError {
        error!(
            saga = self.name,
            %failed,
            completed = ?self.completed,
            "saga step failed: {source}"
        );

        let mut compensated = Vec::new();
        let mut compensation_failures = Vec::new();
        if self.policy == SagaPolicy::Compensate {
            while let Some(undo) = self.undo.pop() {
                match bounded(self.timeout, "compensation", self.run_undo(undo)).await {
                    Ok(()) => {
                        info!(saga = self.name, ?undo, "compensated");
                        compensated.push(undo.step());
                    }
                    Err(err) => {
                        error!(saga = self.name, ?undo, "compensation failed: {err}");
                        compensation_failures.push((undo.step(), err));
                    }
                }
            }
        }

        SagaError {
            saga: self.name,
            failed,
            completed: std::mem::take(&mut self.completed),
            source,
            compensated,
            compensation_failures,
        }
    }

    async fn run_undo(&self, undo: Undo) -> ResultEngine<()> {
        match undo {
            Undo::DeletePin(id) => self.plan.delete_pin(id).await,
            Undo::DeleteWhiteboard(id) => self.plan.delete_whiteboard(id).await,
            Undo::DeleteTrip(id) => self.plan.delete_trip(id).await,
            Undo::DeleteMembership { trip_id, user_id } => {
                self.users.delete_membership(trip_id, user_id).await
            }
            Undo::DeleteUser(id) => self.users.delete_user(id).await,
        }
    }
}
