use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::LayerError;
use super::attributes::{AttrValue, Attributes};
use super::layer_types::{LayerType, lookup};
use super::types::{LayerBody, LifecycleEventConfiguration, Recipes, ShutdownEventConfiguration};
use crate::client::{ClientError, ResourceClient};
use crate::resource::RemoteResource;
use crate::services::{Action, LifecycleError};

const RESOURCE_NAME: &str = "OpsWorks Layer";

const REGISTER_ECS_CLUSTER: &str = "register-ecs-cluster";
const DEREGISTER_ECS_CLUSTER: &str = "deregister-ecs-cluster";
const ATTACH_LOAD_BALANCER: &str = "attach-elastic-load-balancer";
const DETACH_LOAD_BALANCER: &str = "detach-elastic-load-balancer";

/// Desired settings of a layer. Defaults match the layer schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub stack_id: String,
    /// Falls back to the layer type's default name.
    pub name: Option<String>,
    /// Only meaningful for custom layers.
    pub short_name: Option<String>,
    pub auto_assign_elastic_ips: bool,
    pub auto_assign_public_ips: bool,
    pub auto_healing: bool,
    pub custom_configure_recipes: Vec<String>,
    pub custom_deploy_recipes: Vec<String>,
    pub custom_setup_recipes: Vec<String>,
    pub custom_shutdown_recipes: Vec<String>,
    pub custom_undeploy_recipes: Vec<String>,
    pub custom_instance_profile_arn: Option<String>,
    pub custom_json: Option<String>,
    pub custom_security_group_ids: BTreeSet<String>,
    pub drain_elb_on_shutdown: bool,
    pub instance_shutdown_timeout: i64,
    pub install_updates_on_boot: bool,
    pub system_packages: BTreeSet<String>,
    pub tags: BTreeMap<String, String>,
    pub use_ebs_optimized_instances: bool,
    /// Classic load balancer attached to the layer.
    pub elastic_load_balancer: Option<String>,
    pub attributes: Attributes,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            stack_id: String::new(),
            name: None,
            short_name: None,
            auto_assign_elastic_ips: false,
            auto_assign_public_ips: false,
            auto_healing: true,
            custom_configure_recipes: Vec::new(),
            custom_deploy_recipes: Vec::new(),
            custom_setup_recipes: Vec::new(),
            custom_shutdown_recipes: Vec::new(),
            custom_undeploy_recipes: Vec::new(),
            custom_instance_profile_arn: None,
            custom_json: None,
            custom_security_group_ids: BTreeSet::new(),
            drain_elb_on_shutdown: true,
            instance_shutdown_timeout: 120,
            install_updates_on_boot: true,
            system_packages: BTreeSet::new(),
            tags: BTreeMap::new(),
            use_ebs_optimized_instances: false,
            elastic_load_balancer: None,
            attributes: Attributes::new(),
        }
    }
}

impl LayerConfig {
    fn recipes(&self) -> Recipes {
        Recipes {
            configure: self.custom_configure_recipes.clone(),
            deploy: self.custom_deploy_recipes.clone(),
            setup: self.custom_setup_recipes.clone(),
            shutdown: self.custom_shutdown_recipes.clone(),
            undeploy: self.custom_undeploy_recipes.clone(),
        }
    }

    fn lifecycle(&self) -> LifecycleEventConfiguration {
        LifecycleEventConfiguration {
            shutdown: Some(ShutdownEventConfiguration {
                delay_until_elb_connections_drained: Some(self.drain_elb_on_shutdown),
                execution_timeout: Some(self.instance_shutdown_timeout),
            }),
        }
    }

    /// Set only on ECS cluster layers.
    fn ecs_cluster_arn(&self) -> Option<&str> {
        match self.attributes.get("ecs_cluster_arn") {
            Some(AttrValue::String(arn)) if !arn.is_empty() => Some(arn),
            _ => None,
        }
    }

    fn load_balancer(&self) -> Option<&str> {
        self.elastic_load_balancer.as_deref().filter(|elb| !elb.is_empty())
    }
}

/// A layer as last read back from the remote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerState {
    pub id: String,
    pub arn: Option<String>,
    pub resource_type: String,
    #[serde(flatten)]
    pub config: LayerConfig,
}

/// Re-serialize so that formatting and key order differences are not seen as
/// changes. Blank means unset.
fn normalize_json(raw: Option<&str>) -> Result<Option<String>, LayerError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)?;
            Ok(Some(value.to_string()))
        }
    }
}

fn sorted(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// Create, read, update and delete for one member of the layer family.
pub struct LayerService<C> {
    client: C,
    layer_type: &'static LayerType,
}

impl<C: ResourceClient> LayerService<C> {
    pub fn new(client: C, layer_type: &'static LayerType) -> Self {
        Self { client, layer_type }
    }

    /// Look the layer type up by short or full resource name.
    pub fn for_resource(client: C, name: &str) -> Result<Self, LayerError> {
        let layer_type =
            lookup(name).ok_or_else(|| LayerError::UnknownLayerType(name.to_string()))?;
        Ok(Self::new(client, layer_type))
    }

    pub fn layer_type(&self) -> &'static LayerType {
        self.layer_type
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn layer_name(&self, config: &LayerConfig) -> Result<String, LayerError> {
        config
            .name
            .clone()
            .or_else(|| self.layer_type.default_layer_name.map(str::to_string))
            .ok_or_else(|| LayerError::MissingAttribute {
                key: "name".to_string(),
            })
    }

    fn short_name(&self, config: &LayerConfig) -> Result<String, LayerError> {
        if !self.layer_type.custom_short_name {
            return Ok(self.layer_type.type_name.to_string());
        }
        config
            .short_name
            .clone()
            .ok_or_else(|| LayerError::MissingAttribute {
                key: "short_name".to_string(),
            })
    }

    fn create_body(&self, config: &LayerConfig) -> Result<LayerBody, LayerError> {
        let attributes = self.layer_type.attribute_table().encode(&config.attributes)?;
        Ok(LayerBody {
            layer_type: Some(self.layer_type.type_name.to_string()),
            arn: None,
            stack_id: Some(config.stack_id.clone()),
            name: Some(self.layer_name(config)?),
            shortname: Some(self.short_name(config)?),
            attributes: Some(attributes),
            auto_assign_elastic_ips: Some(config.auto_assign_elastic_ips),
            auto_assign_public_ips: Some(config.auto_assign_public_ips),
            enable_auto_healing: Some(config.auto_healing),
            install_updates_on_boot: Some(config.install_updates_on_boot),
            use_ebs_optimized_instances: Some(config.use_ebs_optimized_instances),
            custom_recipes: Some(config.recipes()),
            lifecycle_event_configuration: Some(config.lifecycle()),
            custom_instance_profile_arn: config.custom_instance_profile_arn.clone(),
            custom_json: normalize_json(config.custom_json.as_deref())?,
            custom_security_group_ids: Some(sorted(&config.custom_security_group_ids)),
            packages: Some(sorted(&config.system_packages)),
            tags: (!config.tags.is_empty()).then(|| config.tags.clone()),
            elastic_load_balancer: None,
        })
    }

    /// Fields that differ between `prior` and `plan`. Attributes are sent as
    /// a whole map whenever any of them changed.
    fn update_body(
        &self,
        prior: &LayerConfig,
        plan: &LayerConfig,
    ) -> Result<LayerBody, LifecycleError> {
        if prior.stack_id != plan.stack_id {
            return Err(LifecycleError::RequiresReplacement {
                attribute: "stack_id".to_string(),
            });
        }

        let table = self.layer_type.attribute_table();
        let changed = table.changed_keys(&prior.attributes, &plan.attributes);
        if let Some(key) = changed
            .iter()
            .find(|key| table.get(key).is_some_and(|row| row.force_new))
        {
            return Err(LifecycleError::RequiresReplacement {
                attribute: key.to_string(),
            });
        }

        let mut body = LayerBody::default();
        if !changed.is_empty() {
            body.attributes = Some(table.encode(&plan.attributes)?);
        }

        let name = self.layer_name(plan)?;
        if self.layer_name(prior).ok().as_ref() != Some(&name) {
            body.name = Some(name);
        }
        if self.layer_type.custom_short_name && prior.short_name != plan.short_name {
            body.shortname = Some(self.short_name(plan)?);
        }

        if prior.auto_assign_elastic_ips != plan.auto_assign_elastic_ips {
            body.auto_assign_elastic_ips = Some(plan.auto_assign_elastic_ips);
        }
        if prior.auto_assign_public_ips != plan.auto_assign_public_ips {
            body.auto_assign_public_ips = Some(plan.auto_assign_public_ips);
        }
        if prior.auto_healing != plan.auto_healing {
            body.enable_auto_healing = Some(plan.auto_healing);
        }
        if prior.install_updates_on_boot != plan.install_updates_on_boot {
            body.install_updates_on_boot = Some(plan.install_updates_on_boot);
        }
        if prior.use_ebs_optimized_instances != plan.use_ebs_optimized_instances {
            body.use_ebs_optimized_instances = Some(plan.use_ebs_optimized_instances);
        }

        if prior.recipes() != plan.recipes() {
            body.custom_recipes = Some(plan.recipes());
        }
        if prior.lifecycle() != plan.lifecycle() {
            body.lifecycle_event_configuration = Some(plan.lifecycle());
        }
        if prior.custom_instance_profile_arn != plan.custom_instance_profile_arn {
            body.custom_instance_profile_arn =
                Some(plan.custom_instance_profile_arn.clone().unwrap_or_default());
        }

        let planned_json = normalize_json(plan.custom_json.as_deref())?;
        if normalize_json(prior.custom_json.as_deref()).ok().flatten() != planned_json {
            body.custom_json = Some(planned_json.unwrap_or_default());
        }

        if prior.custom_security_group_ids != plan.custom_security_group_ids {
            body.custom_security_group_ids = Some(sorted(&plan.custom_security_group_ids));
        }
        if prior.system_packages != plan.system_packages {
            body.packages = Some(sorted(&plan.system_packages));
        }
        if prior.tags != plan.tags {
            body.tags = Some(plan.tags.clone());
        }

        Ok(body)
    }

    fn to_json(body: &LayerBody) -> Result<Value, LifecycleError> {
        serde_json::to_value(body).map_err(|source| LifecycleError::Json {
            resource: RESOURCE_NAME,
            source,
        })
    }

    fn decode(
        &self,
        resource: RemoteResource,
        prior: Option<&LayerConfig>,
    ) -> Result<LayerState, LifecycleError> {
        let body: LayerBody = serde_json::from_value(Value::Object(resource.properties))
            .map_err(|source| LifecycleError::Json {
                resource: RESOURCE_NAME,
                source,
            })?;

        let defaults = LayerConfig::default();
        let no_attributes = Attributes::new();
        let prior_attributes = prior.map_or(&no_attributes, |p| &p.attributes);
        let recipes = body.custom_recipes.unwrap_or_default();
        let shutdown = body
            .lifecycle_event_configuration
            .and_then(|l| l.shutdown)
            .unwrap_or_default();
        let custom_json = body
            .custom_json
            .as_deref()
            .map(|raw| {
                normalize_json(Some(raw))
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| raw.to_string())
            })
            .filter(|json| !json.is_empty());

        let config = LayerConfig {
            stack_id: body.stack_id.unwrap_or_default(),
            name: body.name,
            short_name: if self.layer_type.custom_short_name {
                body.shortname
            } else {
                None
            },
            auto_assign_elastic_ips: body
                .auto_assign_elastic_ips
                .unwrap_or(defaults.auto_assign_elastic_ips),
            auto_assign_public_ips: body
                .auto_assign_public_ips
                .unwrap_or(defaults.auto_assign_public_ips),
            auto_healing: body.enable_auto_healing.unwrap_or(defaults.auto_healing),
            custom_configure_recipes: recipes.configure,
            custom_deploy_recipes: recipes.deploy,
            custom_setup_recipes: recipes.setup,
            custom_shutdown_recipes: recipes.shutdown,
            custom_undeploy_recipes: recipes.undeploy,
            custom_instance_profile_arn: body
                .custom_instance_profile_arn
                .filter(|arn| !arn.is_empty()),
            custom_json,
            custom_security_group_ids: body
                .custom_security_group_ids
                .unwrap_or_default()
                .into_iter()
                .collect(),
            drain_elb_on_shutdown: shutdown
                .delay_until_elb_connections_drained
                .unwrap_or(defaults.drain_elb_on_shutdown),
            instance_shutdown_timeout: shutdown
                .execution_timeout
                .unwrap_or(defaults.instance_shutdown_timeout),
            install_updates_on_boot: body
                .install_updates_on_boot
                .unwrap_or(defaults.install_updates_on_boot),
            system_packages: body.packages.unwrap_or_default().into_iter().collect(),
            tags: body.tags.unwrap_or_default(),
            use_ebs_optimized_instances: body
                .use_ebs_optimized_instances
                .unwrap_or(defaults.use_ebs_optimized_instances),
            elastic_load_balancer: body.elastic_load_balancer.filter(|elb| !elb.is_empty()),
            attributes: self
                .layer_type
                .attribute_table()
                .decode(&body.attributes.unwrap_or_default(), prior_attributes),
        };

        Ok(LayerState {
            id: resource.id,
            arn: body.arn,
            resource_type: self.layer_type.resource_name(),
            config,
        })
    }

    /// Read after a write; the layer must exist.
    async fn read_back(
        &self,
        id: &str,
        config: &LayerConfig,
    ) -> Result<LayerState, LifecycleError> {
        let found = self.fetch(id).await?;
        let resource = found.ok_or_else(|| LifecycleError::Client {
            action: Action::Reading,
            resource: RESOURCE_NAME,
            name: id.to_string(),
            source: ClientError::NotFound { id: id.to_string() },
        })?;
        self.decode(resource, Some(config))
    }

    async fn fetch(&self, id: &str) -> Result<Option<RemoteResource>, LifecycleError> {
        self.client
            .read(id)
            .await
            .map_err(|source| LifecycleError::Client {
                action: Action::Reading,
                resource: RESOURCE_NAME,
                name: id.to_string(),
                source,
            })
    }

    /// Side action on the layer family; failures name `target`.
    async fn associate(
        &self,
        action: Action,
        id: Option<&str>,
        path: &str,
        body: Value,
        name: &str,
        target: String,
    ) -> Result<(), LifecycleError> {
        info!(name, "{action} {target}");
        self.client
            .invoke(id, path, &body)
            .await
            .map_err(|source| LifecycleError::Association {
                action,
                resource: RESOURCE_NAME,
                name: name.to_string(),
                target,
                source,
            })
    }

    async fn switch_load_balancer(
        &self,
        action: Action,
        id: &str,
        elb: &str,
    ) -> Result<(), LifecycleError> {
        let path = match action {
            Action::Detaching => DETACH_LOAD_BALANCER,
            _ => ATTACH_LOAD_BALANCER,
        };
        let body = serde_json::json!({ "elastic_load_balancer_name": elb });
        let target = format!("load balancer ({elb})");
        self.associate(action, Some(id), path, body, id, target).await
    }

    /// Registers the ECS cluster with the stack first when the layer has one,
    /// and attaches the load balancer once the layer exists.
    pub async fn create(&self, config: &LayerConfig) -> Result<LayerState, LifecycleError> {
        let body = self.create_body(config)?;
        let name = body.name.clone().unwrap_or_default();

        if let Some(arn) = config.ecs_cluster_arn() {
            let body = serde_json::json!({ "ecs_cluster_arn": arn, "stack_id": config.stack_id });
            let target = format!("ECS Cluster ({arn})");
            self.associate(Action::Registering, None, REGISTER_ECS_CLUSTER, body, &name, target)
                .await?;
        }

        info!(layer_type = self.layer_type.name, name = %name, "creating layer");
        let created = self
            .client
            .create(&Self::to_json(&body)?)
            .await
            .map_err(|source| LifecycleError::Client {
                action: Action::Creating,
                resource: RESOURCE_NAME,
                name,
                source,
            })?;
        if created.id.is_empty() {
            return Err(LifecycleError::EmptyOutput {
                action: Action::Creating,
                resource: RESOURCE_NAME,
            });
        }

        if let Some(elb) = config.load_balancer() {
            self.switch_load_balancer(Action::Attaching, &created.id, elb).await?;
        }

        self.read_back(&created.id, config).await
    }

    /// `Ok(None)` when the layer no longer exists. Write-only attributes are
    /// carried over from `prior`.
    pub async fn read(
        &self,
        id: &str,
        prior: Option<&LayerState>,
    ) -> Result<Option<LayerState>, LifecycleError> {
        let Some(resource) = self.fetch(id).await? else {
            warn!(
                id,
                layer_type = self.layer_type.name,
                "layer not found, removing from state"
            );
            return Ok(None);
        };
        self.decode(resource, prior.map(|p| &p.config)).map(Some)
    }

    pub async fn update(
        &self,
        prior: &LayerState,
        plan: &LayerConfig,
    ) -> Result<LayerState, LifecycleError> {
        let body = self.update_body(&prior.config, plan)?;

        if body.is_empty() {
            debug!(id = %prior.id, "layer unchanged");
        } else {
            info!(id = %prior.id, layer_type = self.layer_type.name, "updating layer");
            self.client
                .update(&prior.id, &Self::to_json(&body)?)
                .await
                .map_err(|source| LifecycleError::Client {
                    action: Action::Updating,
                    resource: RESOURCE_NAME,
                    name: prior.id.clone(),
                    source,
                })?;
        }

        if prior.config.load_balancer() != plan.load_balancer() {
            if let Some(old) = prior.config.load_balancer() {
                self.switch_load_balancer(Action::Detaching, &prior.id, old).await?;
            }
            if let Some(new) = plan.load_balancer() {
                self.switch_load_balancer(Action::Attaching, &prior.id, new).await?;
            }
        }

        self.read_back(&prior.id, plan).await
    }

    /// A layer that is already gone counts as deleted. The ECS cluster of an
    /// ECS layer is deregistered once the layer itself is removed.
    pub async fn delete(&self, state: &LayerState) -> Result<(), LifecycleError> {
        let id = state.id.as_str();
        info!(id, layer_type = self.layer_type.name, "deleting layer");
        match self.client.delete(id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                info!(id, "layer already deleted");
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

        if let Some(arn) = state.config.ecs_cluster_arn() {
            let body = serde_json::json!({ "ecs_cluster_arn": arn });
            let target = format!("ECS Cluster ({arn})");
            self.associate(Action::Deregistering, None, DEREGISTER_ECS_CLUSTER, body, id, target)
                .await?;
        }
        Ok(())
    }
}
