//! Local fleet provider
//!
//! Simulates buckets and worker instances in process memory so the
//! service can run end to end without a cloud account. Workers are
//! "finished" through [`LocalFleetProvider::complete_instance`], the same
//! way a real instance shuts itself down after writing its partition.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::FleetProvider;
use shared::{InstanceId, InstanceState, InstanceStatus, TaskId, WorkerConfig};

/// Launch settings applied to every worker instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSettings {
    /// Prebuilt worker image to boot
    pub image_id: String,
    pub instance_type: String,
    /// Must allow outbound HTTP/HTTPS
    pub security_group_id: String,
    /// Role granting the worker write access to the bucket
    pub role_arn: String,
    pub subnet_id: String,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            image_id: String::new(),
            instance_type: "t2.micro".to_string(),
            security_group_id: String::new(),
            role_arn: String::new(),
            subnet_id: "subnet-581c7275".to_string(),
        }
    }
}

/// Provider operations, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FleetOperation {
    CreateBucket,
    DeleteBucket,
    StartInstances,
    TagInstances,
    TerminateInstances,
    DescribeInstanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalInstanceState {
    Running,
    /// Worker finished its partition and shut down
    Finished,
    Terminated,
}

#[derive(Debug, Clone)]
struct LocalInstance {
    state: LocalInstanceState,
    user_data: String,
    task_tag: Option<TaskId>,
}

#[derive(Default)]
struct FleetState {
    buckets: HashSet<String>,
    instances: HashMap<InstanceId, LocalInstance>,
    failures: HashSet<FleetOperation>,
    calls: HashMap<FleetOperation, usize>,
}

impl FleetState {
    /// Count the call and consume an injected failure, if any
    fn enter(&mut self, operation: FleetOperation) -> OrchestratorResult<()> {
        *self.calls.entry(operation).or_default() += 1;
        if self.failures.remove(&operation) {
            return Err(OrchestratorError::provider(
                operation_name(operation),
                "injected failure",
            ));
        }
        Ok(())
    }

    fn instance_mut(&mut self, operation: &'static str, instance_id: &InstanceId) -> OrchestratorResult<&mut LocalInstance> {
        self.instances
            .get_mut(instance_id)
            .ok_or_else(|| OrchestratorError::provider(operation, format!("unknown instance {instance_id}")))
    }
}

fn operation_name(operation: FleetOperation) -> &'static str {
    match operation {
        FleetOperation::CreateBucket => "create_bucket",
        FleetOperation::DeleteBucket => "delete_bucket",
        FleetOperation::StartInstances => "start_instances",
        FleetOperation::TagInstances => "tag_instances",
        FleetOperation::TerminateInstances => "terminate_instances",
        FleetOperation::DescribeInstanceStatus => "describe_instance_status",
    }
}

/// In-memory fleet provider
pub struct LocalFleetProvider {
    settings: InstanceSettings,
    state: Mutex<FleetState>,
}

impl LocalFleetProvider {
    /// Create a provider with default launch settings
    pub fn new() -> Self {
        Self::with_settings(InstanceSettings::default())
    }

    pub fn with_settings(settings: InstanceSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(FleetState::default()),
        }
    }

    pub fn settings(&self) -> &InstanceSettings {
        &self.settings
    }

    /// Make the next call of `operation` fail with a provider error
    pub async fn fail_next(&self, operation: FleetOperation) {
        self.state.lock().await.failures.insert(operation);
    }

    /// How many times `operation` has been called
    pub async fn call_count(&self, operation: FleetOperation) -> usize {
        self.state.lock().await.calls.get(&operation).copied().unwrap_or(0)
    }

    /// Simulate a worker finishing its partition.
    ///
    /// # Returns
    /// `false` if the instance is unknown or no longer running
    pub async fn complete_instance(&self, instance_id: &InstanceId) -> bool {
        let mut state = self.state.lock().await;
        match state.instances.get_mut(instance_id) {
            Some(instance) if instance.state == LocalInstanceState::Running => {
                instance.state = LocalInstanceState::Finished;
                true
            }
            _ => false,
        }
    }

    pub async fn has_bucket(&self, bucket_name: &str) -> bool {
        self.state.lock().await.buckets.contains(bucket_name)
    }

    pub async fn running_instances(&self) -> usize {
        self.state
            .lock()
            .await
            .instances
            .values()
            .filter(|instance| instance.state == LocalInstanceState::Running)
            .count()
    }

    pub async fn is_terminated(&self, instance_id: &InstanceId) -> bool {
        self.state
            .lock()
            .await
            .instances
            .get(instance_id)
            .is_some_and(|instance| instance.state == LocalInstanceState::Terminated)
    }

    /// Task an instance was tagged with
    pub async fn instance_tag(&self, instance_id: &InstanceId) -> Option<TaskId> {
        self.state
            .lock()
            .await
            .instances
            .get(instance_id)
            .and_then(|instance| instance.task_tag.clone())
    }

    /// Worker configuration an instance was launched with
    pub async fn instance_config(&self, instance_id: &InstanceId) -> Option<WorkerConfig> {
        let state = self.state.lock().await;
        let instance = state.instances.get(instance_id)?;
        serde_json::from_str(&instance.user_data).ok()
    }

    fn new_instance_id() -> InstanceId {
        let hex = Uuid::new_v4().simple().to_string();
        InstanceId::new(format!("i-{}", &hex[..17]))
    }
}

impl Default for LocalFleetProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FleetProvider for LocalFleetProvider {
    async fn create_bucket(&self, bucket_name: &str) -> OrchestratorResult<()> {
        let mut state = self.state.lock().await;
        state.enter(FleetOperation::CreateBucket)?;

        if !state.buckets.insert(bucket_name.to_string()) {
            return Err(OrchestratorError::ResourceConflict {
                bucket_name: bucket_name.to_string(),
            });
        }
        tracing::debug!("Created bucket at location: /{}", bucket_name);
        Ok(())
    }

    async fn delete_bucket(&self, bucket_name: &str) -> OrchestratorResult<()> {
        let mut state = self.state.lock().await;
        state.enter(FleetOperation::DeleteBucket)?;

        if !state.buckets.remove(bucket_name) {
            return Err(OrchestratorError::BucketNotFound {
                bucket_name: bucket_name.to_string(),
            });
        }
        tracing::debug!("Deleted bucket {} and its contents", bucket_name);
        Ok(())
    }

    async fn start_instances(&self, count: u32, config: &WorkerConfig) -> OrchestratorResult<Vec<InstanceId>> {
        let mut state = self.state.lock().await;
        state.enter(FleetOperation::StartInstances)?;

        if count == 0 {
            return Err(OrchestratorError::provider("start_instances", "instance count must be positive"));
        }

        let user_data = serde_json::to_string(config)?;
        let ids: Vec<InstanceId> = (0..count).map(|_| Self::new_instance_id()).collect();
        for id in &ids {
            state.instances.insert(
                id.clone(),
                LocalInstance {
                    state: LocalInstanceState::Running,
                    user_data: user_data.clone(),
                    task_tag: None,
                },
            );
        }

        tracing::debug!(
            "Started {} {} instance(s) from image '{}' in {}",
            count,
            self.settings.instance_type,
            self.settings.image_id,
            self.settings.subnet_id
        );
        Ok(ids)
    }

    async fn tag_instances(&self, instance_ids: &[InstanceId], task_id: &TaskId) -> OrchestratorResult<()> {
        let mut state = self.state.lock().await;
        state.enter(FleetOperation::TagInstances)?;

        for id in instance_ids {
            state.instance_mut("tag_instances", id)?.task_tag = Some(task_id.clone());
        }
        Ok(())
    }

    async fn terminate_instances(&self, instance_ids: &[InstanceId]) -> OrchestratorResult<()> {
        let mut state = self.state.lock().await;
        state.enter(FleetOperation::TerminateInstances)?;

        for id in instance_ids {
            state.instance_mut("terminate_instances", id)?.state = LocalInstanceState::Terminated;
        }
        tracing::debug!("Terminated {} instance(s)", instance_ids.len());
        Ok(())
    }

    async fn describe_instance_status(&self, instance_ids: &[InstanceId]) -> OrchestratorResult<Vec<InstanceStatus>> {
        let mut state = self.state.lock().await;
        state.enter(FleetOperation::DescribeInstanceStatus)?;

        instance_ids
            .iter()
            .map(|id| {
                let status = match state.instance_mut("describe_instance_status", id)?.state {
                    LocalInstanceState::Running => InstanceState::Active,
                    LocalInstanceState::Finished | LocalInstanceState::Terminated => InstanceState::Done,
                };
                Ok(InstanceStatus::new(id.clone(), status))
            })
            .collect()
    }
}
