//! The task record and its status vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ids::{InstanceId, TaskId};
use crate::errors::SharedError;

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Completed,
    Error,
    Aborted,
    Deleted,
}

impl TaskStatus {
    /// Completed, Error and Aborted end the work of a task
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Aborted)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Aborted => "aborted",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            "aborted" => Ok(Self::Aborted),
            "deleted" => Ok(Self::Deleted),
            other => Err(SharedError::InvalidStatus {
                input: other.to_string(),
            }),
        }
    }
}

/// Output formats a worker can export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "FHIR")]
    Fhir,
    #[serde(rename = "CCDA")]
    Ccda,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "CSV")]
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fhir => "FHIR",
            Self::Ccda => "CCDA",
            Self::Html => "HTML",
            Self::Text => "text",
            Self::Csv => "CSV",
        }
    }

    /// Parse a list of wire names, dropping repeats but keeping first-seen order
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, SharedError> {
        let mut formats = Vec::with_capacity(names.len());
        for name in names {
            let format: OutputFormat = name.as_ref().parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FHIR" => Ok(Self::Fhir),
            "CCDA" => Ok(Self::Ccda),
            "HTML" => Ok(Self::Html),
            "text" => Ok(Self::Text),
            "CSV" => Ok(Self::Csv),
            other => Err(SharedError::InvalidFormat {
                input: other.to_string(),
            }),
        }
    }
}

/// A single batch generation task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub instance_ids: Vec<InstanceId>,
    /// Instances that have reported done
    #[serde(default)]
    pub completed_instance_ids: BTreeSet<InstanceId>,
    pub bucket_name: String,
    pub user: String,
    pub formats: Vec<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Task {
    /// New task record, not yet started and without instances
    pub fn new(id: TaskId, user: impl Into<String>, bucket_name: impl Into<String>, formats: Vec<OutputFormat>) -> Self {
        Self {
            id,
            status: TaskStatus::Active,
            start_time: None,
            end_time: None,
            instance_ids: Vec::new(),
            completed_instance_ids: BTreeSet::new(),
            bucket_name: bucket_name.into(),
            user: user.into(),
            formats,
            error_message: None,
        }
    }

    /// Record the start time. Never overwrites an existing one.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Record the end time once. A task that never started has no end.
    pub fn end(&mut self, now: DateTime<Utc>) {
        if let (Some(start), None) = (self.start_time, self.end_time) {
            self.end_time = Some(now.max(start));
        }
    }

    /// Total runtime; still growing while the task is active
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        match (self.start_time, self.end_time) {
            (None, _) => chrono::Duration::zero(),
            (Some(start), None) => (now - start).max(chrono::Duration::zero()),
            (Some(start), Some(end)) => end - start,
        }
    }

    pub fn has_instance(&self, instance_id: &InstanceId) -> bool {
        self.instance_ids.contains(instance_id)
    }

    /// Instances that have not yet reported done, in launch order
    pub fn outstanding_instances(&self) -> Vec<InstanceId> {
        self.instance_ids
            .iter()
            .filter(|id| !self.completed_instance_ids.contains(*id))
            .cloned()
            .collect()
    }

    pub fn all_instances_done(&self) -> bool {
        self.instance_ids
            .iter()
            .all(|id| self.completed_instance_ids.contains(id))
    }
}
