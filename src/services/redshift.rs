//! `aws_redshift_integration`: a zero-ETL integration between a source
//! database and a Redshift target.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{Action, LifecycleError};
use crate::client::{ResourceClient, StatusRefresh};
use crate::resource::RemoteResource;
use crate::waiter::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, PollSpec, WaitError, poll};

pub const RESOURCE_NAME: &str = "Redshift Integration";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_CREATING: &str = "creating";
pub const STATUS_DELETING: &str = "deleting";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_MODIFYING: &str = "modifying";
pub const STATUS_NEEDS_ATTENTION: &str = "needs_attention";
pub const STATUS_SYNCING: &str = "syncing";

const CREATE_NOT_FOUND_CHECKS: u32 = 20;
const UPDATE_NOT_FOUND_CHECKS: u32 = 20;

pub fn create_spec(timeout: Duration) -> PollSpec {
    PollSpec::builder()
        .pending([STATUS_CREATING, STATUS_MODIFYING])
        .target([STATUS_ACTIVE])
        .timeout(timeout)
        .not_found_checks(CREATE_NOT_FOUND_CHECKS)
        .build()
}

pub fn update_spec(timeout: Duration) -> PollSpec {
    PollSpec::builder()
        .pending([STATUS_MODIFYING])
        .target([STATUS_ACTIVE])
        .timeout(timeout)
        .not_found_checks(UPDATE_NOT_FOUND_CHECKS)
        .build()
}

/// An active integration may linger briefly before it starts deleting, so
/// both count as in flight; the target is absence.
pub fn delete_spec(timeout: Duration) -> PollSpec {
    PollSpec::builder()
        .pending([STATUS_DELETING, STATUS_ACTIVE])
        .timeout(timeout)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

/// Desired configuration of an integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationPlan {
    pub integration_name: String,
    pub source_arn: String,
    pub target_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Computed by the remote when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_encryption_context: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// What is recorded about an integration after a lifecycle call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationState {
    /// The integration ARN.
    pub id: String,
    pub status: String,
    #[serde(flatten)]
    pub plan: IntegrationPlan,
}

impl IntegrationState {
    pub fn from_resource(resource: RemoteResource) -> Result<Self, LifecycleError> {
        let plan = serde_json::from_value(Value::Object(resource.properties)).map_err(|source| {
            LifecycleError::Json {
                resource: RESOURCE_NAME,
                source,
            }
        })?;
        Ok(Self {
            id: resource.id,
            status: resource.status,
            plan,
        })
    }

    /// The remote reports an unset encryption context as an empty map. Keep
    /// it unset unless it was set before.
    fn normalize_encryption_context(&mut self, previously_unset: bool) {
        let empty = self
            .plan
            .additional_encryption_context
            .as_ref()
            .is_some_and(BTreeMap::is_empty);
        if previously_unset && empty {
            self.plan.additional_encryption_context = None;
        }
    }
}

fn non_empty(context: &Option<BTreeMap<String, String>>) -> Option<&BTreeMap<String, String>> {
    context.as_ref().filter(|map| !map.is_empty())
}

fn string_map(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

pub struct IntegrationService<C> {
    client: C,
    timeouts: Timeouts,
    poll_interval: Duration,
}

impl<C: ResourceClient> IntegrationService<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            timeouts: Timeouts::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one poll session against the integration `id`.
    pub async fn wait(
        &self,
        id: &str,
        spec: &PollSpec,
    ) -> Result<Option<RemoteResource>, WaitError> {
        poll(spec, &StatusRefresh::new(&self.client, id))
            .await
            .into_result(spec)
    }

    async fn wait_for(
        &self,
        action: Action,
        id: &str,
        spec: PollSpec,
    ) -> Result<Option<RemoteResource>, LifecycleError> {
        let spec = spec.with_interval(self.poll_interval);
        self.wait(id, &spec)
            .await
            .map_err(|source| LifecycleError::Wait {
                action,
                resource: RESOURCE_NAME,
                id: id.to_string(),
                source,
            })
    }

    /// Create the integration and wait for it to become active.
    ///
    /// If it never does, the returned [`LifecycleError::Wait`] still carries
    /// the new identifier.
    pub async fn create(&self, plan: &IntegrationPlan) -> Result<IntegrationState, LifecycleError> {
        let body = serde_json::to_value(plan).map_err(|source| LifecycleError::Json {
            resource: RESOURCE_NAME,
            source,
        })?;

        info!(name = %plan.integration_name, "creating integration");
        let created = self
            .client
            .create(&body)
            .await
            .map_err(|source| LifecycleError::Client {
                action: Action::Creating,
                resource: RESOURCE_NAME,
                name: plan.integration_name.clone(),
                source,
            })?;
        if created.id.is_empty() {
            return Err(LifecycleError::EmptyOutput {
                action: Action::Creating,
                resource: RESOURCE_NAME,
            });
        }

        let mut state = IntegrationState::from_resource(created)?;
        state.normalize_encryption_context(plan.additional_encryption_context.is_none());

        let converged = self
            .wait_for(Action::Creating, &state.id, create_spec(self.timeouts.create))
            .await?;
        if let Some(resource) = converged {
            state.status = resource.status.clone();
            state.plan.kms_key_id = resource.property_str("kms_key_id").map(str::to_string);
        }

        info!(id = %state.id, "integration active");
        Ok(state)
    }

    /// `Ok(None)` when the integration no longer exists.
    pub async fn read(
        &self,
        id: &str,
        prior: Option<&IntegrationState>,
    ) -> Result<Option<IntegrationState>, LifecycleError> {
        let found = self
            .client
            .read(id)
            .await
            .map_err(|source| LifecycleError::Client {
                action: Action::Reading,
                resource: RESOURCE_NAME,
                name: id.to_string(),
                source,
            })?;

        let Some(resource) = found else {
            warn!(id, "integration not found, removing from state");
            return Ok(None);
        };

        let mut state = IntegrationState::from_resource(resource)?;
        state.normalize_encryption_context(
            prior.is_none_or(|p| p.plan.additional_encryption_context.is_none()),
        );
        Ok(Some(state))
    }

    pub async fn update(
        &self,
        prior: &IntegrationState,
        plan: &IntegrationPlan,
    ) -> Result<IntegrationState, LifecycleError> {
        let replacements = [
            ("source_arn", prior.plan.source_arn != plan.source_arn),
            ("target_arn", prior.plan.target_arn != plan.target_arn),
            (
                "kms_key_id",
                plan.kms_key_id.is_some() && plan.kms_key_id != prior.plan.kms_key_id,
            ),
            (
                "additional_encryption_context",
                non_empty(&plan.additional_encryption_context)
                    != non_empty(&prior.plan.additional_encryption_context),
            ),
        ];
        if let Some((attribute, _)) = replacements.iter().find(|(_, changed)| *changed) {
            return Err(LifecycleError::RequiresReplacement {
                attribute: attribute.to_string(),
            });
        }

        let mut body = Map::new();
        if plan.integration_name != prior.plan.integration_name {
            body.insert(
                "integration_name".to_string(),
                Value::String(plan.integration_name.clone()),
            );
        }
        if plan.description != prior.plan.description {
            body.insert(
                "description".to_string(),
                plan.description.clone().map_or(Value::Null, Value::String),
            );
        }
        if plan.tags != prior.plan.tags {
            body.insert("tags".to_string(), string_map(&plan.tags));
        }

        if !body.is_empty() {
            info!(id = %prior.id, fields = body.len(), "modifying integration");
            let modified = self
                .client
                .update(&prior.id, &Value::Object(body))
                .await
                .map_err(|source| LifecycleError::Client {
                    action: Action::Updating,
                    resource: RESOURCE_NAME,
                    name: prior.id.clone(),
                    source,
                })?;
            if modified.id.is_empty() {
                return Err(LifecycleError::EmptyOutput {
                    action: Action::Updating,
                    resource: RESOURCE_NAME,
                });
            }
        }

        let converged = self
            .wait_for(Action::Updating, &prior.id, update_spec(self.timeouts.update))
            .await?;

        let mut state = IntegrationState {
            id: prior.id.clone(),
            status: prior.status.clone(),
            plan: plan.clone(),
        };
        if state.plan.kms_key_id.is_none() {
            state.plan.kms_key_id = prior.plan.kms_key_id.clone();
        }
        if let Some(resource) = converged {
            state.status = resource.status;
        }
        Ok(state)
    }

    /// Delete and wait for the integration to disappear. An integration that
    /// is already gone counts as deleted.
    pub async fn delete(&self, id: &str) -> Result<(), LifecycleError> {
        match self.client.delete(id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                info!(id, "integration already deleted");
                return Ok(());
            }
            Err(source) => {
                return Err(LifecycleError::Client {
                    action: Action::Deleting,
                    resource: RESOURCE_NAME,
                    name: id.to_string(),
                    source,
                });
            }
        }

        self.wait_for(Action::Deleting, id, delete_spec(self.timeouts.delete))
            .await?;
        info!(id, "integration deleted");
        Ok(())
    }
}
