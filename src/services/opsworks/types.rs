use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Layer fields as the endpoint names them. Used for create bodies, sparse
/// update bodies, and decoding the properties of a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerBody {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_assign_elastic_ips: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_assign_public_ips: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_healing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_updates_on_boot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ebs_optimized_instances: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_recipes: Option<Recipes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_event_configuration: Option<LifecycleEventConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instance_profile_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_security_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Reported on reads only; changed through attach and detach actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic_load_balancer: Option<String>,
}

impl LayerBody {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipes {
    pub configure: Vec<String>,
    pub deploy: Vec<String>,
    pub setup: Vec<String>,
    pub shutdown: Vec<String>,
    pub undeploy: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleEventConfiguration {
    pub shutdown: Option<ShutdownEventConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownEventConfiguration {
    pub delay_until_elb_connections_drained: Option<bool>,
    pub execution_timeout: Option<i64>,
}
