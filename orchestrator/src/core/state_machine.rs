//! Task state transitions with strict enforcement
//!
//! ```text
//! Active ──all workers done──▶ Completed ─┐
//!        ──worker failed─────▶ Error     ─┼─delete─▶ Deleted
//!        ──abort─────────────▶ Aborted   ─┘
//! ```
//!
//! Nothing leads back to `Active`, and `Deleted` accepts no events.

use chrono::{DateTime, Utc};
use shared::{Task, TaskStatus};
use std::fmt;

/// Events that drive a task between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    AllWorkersDone,
    WorkerFailed,
    AbortRequested,
    DeleteRequested,
}

impl TaskEvent {
    /// Verb used in error messages
    pub fn operation(&self) -> &'static str {
        match self {
            Self::AllWorkersDone => "complete",
            Self::WorkerFailed => "fail",
            Self::AbortRequested => "abort",
            Self::DeleteRequested => "delete",
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// Rejected transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: TaskStatus,
    pub event: TaskEvent,
}

/// Task state transition table
pub struct TaskTransition;

impl TaskTransition {
    /// Target state for `event` in state `from`, if the transition is legal
    pub fn next(from: TaskStatus, event: TaskEvent) -> Option<TaskStatus> {
        match (from, event) {
            (TaskStatus::Active, TaskEvent::AllWorkersDone) => Some(TaskStatus::Completed),
            (TaskStatus::Active, TaskEvent::WorkerFailed) => Some(TaskStatus::Error),
            (TaskStatus::Active, TaskEvent::AbortRequested) => Some(TaskStatus::Aborted),
            (from, TaskEvent::DeleteRequested) if from.is_terminal() => Some(TaskStatus::Deleted),
            _ => None,
        }
    }

    /// Check an event against the table without applying it
    pub fn check(from: TaskStatus, event: TaskEvent) -> Result<TaskStatus, InvalidTransition> {
        Self::next(from, event).ok_or(InvalidTransition { from, event })
    }

    /// Apply an event to a task, setting the end time on entry to a terminal state.
    /// The task is left untouched when the transition is rejected.
    pub fn apply(task: &mut Task, event: TaskEvent, now: DateTime<Utc>) -> Result<TaskStatus, InvalidTransition> {
        let to = Self::check(task.status, event)?;
        if to.is_terminal() {
            task.end(now);
        }
        task.status = to;
        Ok(to)
    }

    /// Events accepted in a given state
    pub fn allowed_events(from: TaskStatus) -> Vec<TaskEvent> {
        [
            TaskEvent::AllWorkersDone,
            TaskEvent::WorkerFailed,
            TaskEvent::AbortRequested,
            TaskEvent::DeleteRequested,
        ]
        .into_iter()
        .filter(|event| Self::next(from, *event).is_some())
        .collect()
    }
}
