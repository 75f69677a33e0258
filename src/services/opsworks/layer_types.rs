use super::attributes::{AttrDefault, AttrKind, AttributeTable, LayerAttribute};

/// One member of the `aws_opsworks_*_layer` family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerType {
    /// Resource suffix, e.g. `haproxy` for `aws_opsworks_haproxy_layer`.
    pub name: &'static str,
    /// The API's layer type identifier.
    pub type_name: &'static str,
    /// When set, `name` is optional and falls back to this.
    pub default_layer_name: Option<&'static str>,
    pub attributes: &'static [LayerAttribute],
    /// When set, `short_name` is a required setting instead of `type_name`.
    pub custom_short_name: bool,
}

impl LayerType {
    pub fn resource_name(&self) -> String {
        format!("aws_opsworks_{}_layer", self.name)
    }

    pub fn attribute_table(&self) -> AttributeTable {
        AttributeTable::new(self.name, self.attributes)
    }

    /// Every setting a layer resource of this type accepts.
    pub fn schema(&self) -> Vec<SchemaAttribute> {
        let mut schema: Vec<SchemaAttribute> = COMMON_SCHEMA.to_vec();

        schema.push(match self.default_layer_name {
            Some(default) => SchemaAttribute::optional("name", SchemaKind::String)
                .with_default(AttrDefault::Str(default)),
            None => SchemaAttribute::required("name", SchemaKind::String),
        });

        if self.custom_short_name {
            schema.push(SchemaAttribute::required("short_name", SchemaKind::String));
        }

        schema.extend(self.attributes.iter().map(|attr| SchemaAttribute {
            name: attr.key,
            kind: attr.kind.into(),
            default: attr.default,
            required: attr.required,
            force_new: attr.force_new,
            computed: false,
        }));

        schema.sort_by_key(|attr| attr.name);
        schema
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    Int,
    Bool,
    List,
    Set,
    Map,
}

impl From<AttrKind> for SchemaKind {
    fn from(kind: AttrKind) -> Self {
        match kind {
            AttrKind::String => Self::String,
            AttrKind::Int => Self::Int,
            AttrKind::Bool => Self::Bool,
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaAttribute {
    pub name: &'static str,
    pub kind: SchemaKind,
    pub default: Option<AttrDefault>,
    pub required: bool,
    pub force_new: bool,
    pub computed: bool,
}

impl SchemaAttribute {
    const fn optional(name: &'static str, kind: SchemaKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            required: false,
            force_new: false,
            computed: false,
        }
    }

    const fn required(name: &'static str, kind: SchemaKind) -> Self {
        let mut attr = Self::optional(name, kind);
        attr.required = true;
        attr
    }

    const fn with_default(mut self, default: AttrDefault) -> Self {
        self.default = Some(default);
        self
    }

    const fn forces_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

// NOTE: nested blocks (cloudwatch_configuration, ebs_volume,
// load_based_auto_scaling) are not modelled
static COMMON_SCHEMA: &[SchemaAttribute] = &[
    SchemaAttribute::optional("arn", SchemaKind::String).computed(),
    SchemaAttribute::optional("auto_assign_elastic_ips", SchemaKind::Bool)
        .with_default(AttrDefault::Bool(false)),
    SchemaAttribute::optional("auto_assign_public_ips", SchemaKind::Bool)
        .with_default(AttrDefault::Bool(false)),
    SchemaAttribute::optional("auto_healing", SchemaKind::Bool)
        .with_default(AttrDefault::Bool(true)),
    SchemaAttribute::optional("custom_configure_recipes", SchemaKind::List),
    SchemaAttribute::optional("custom_deploy_recipes", SchemaKind::List),
    SchemaAttribute::optional("custom_instance_profile_arn", SchemaKind::String),
    SchemaAttribute::optional("custom_json", SchemaKind::String),
    SchemaAttribute::optional("custom_security_group_ids", SchemaKind::Set),
    SchemaAttribute::optional("custom_setup_recipes", SchemaKind::List),
    SchemaAttribute::optional("custom_shutdown_recipes", SchemaKind::List),
    SchemaAttribute::optional("custom_undeploy_recipes", SchemaKind::List),
    SchemaAttribute::optional("drain_elb_on_shutdown", SchemaKind::Bool)
        .with_default(AttrDefault::Bool(true)),
    SchemaAttribute::optional("elastic_load_balancer", SchemaKind::String),
    SchemaAttribute::optional("instance_shutdown_timeout", SchemaKind::Int)
        .with_default(AttrDefault::Int(120)),
    SchemaAttribute::optional("install_updates_on_boot", SchemaKind::Bool)
        .with_default(AttrDefault::Bool(true)),
    SchemaAttribute::required("stack_id", SchemaKind::String).forces_new(),
    SchemaAttribute::optional("system_packages", SchemaKind::Set),
    SchemaAttribute::optional("tags", SchemaKind::Map),
    SchemaAttribute::optional("use_ebs_optimized_instances", SchemaKind::Bool)
        .with_default(AttrDefault::Bool(false)),
];

static ECS_CLUSTER_ATTRIBUTES: &[LayerAttribute] =
    &[LayerAttribute::string("ecs_cluster_arn", "EcsClusterArn")
        .required()
        .force_new()];

static GANGLIA_ATTRIBUTES: &[LayerAttribute] = &[
    LayerAttribute::string("password", "GangliaPassword")
        .required()
        .write_only(),
    LayerAttribute::string("url", "GangliaUrl").default_str("/ganglia"),
    LayerAttribute::string("username", "GangliaUser").default_str("opsworks"),
];

static HAPROXY_ATTRIBUTES: &[LayerAttribute] = &[
    LayerAttribute::string("healthcheck_method", "HaproxyHealthCheckMethod")
        .default_str("OPTIONS"),
    LayerAttribute::string("healthcheck_url", "HaproxyHealthCheckUrl").default_str("/"),
    LayerAttribute::bool("stats_enabled", "EnableHaproxyStats").default_bool(true),
    LayerAttribute::string("stats_password", "HaproxyStatsPassword")
        .required()
        .write_only(),
    LayerAttribute::string("stats_url", "HaproxyStatsUrl").default_str("/haproxy?stats"),
    LayerAttribute::string("stats_user", "HaproxyStatsUser").default_str("opsworks"),
];

static JAVA_APP_ATTRIBUTES: &[LayerAttribute] = &[
    LayerAttribute::string("app_server", "JavaAppServer").default_str("tomcat"),
    LayerAttribute::string("app_server_version", "JavaAppServerVersion").default_str("7"),
    LayerAttribute::string("jvm_options", "JvmOptions").default_str(""),
    LayerAttribute::string("jvm_type", "Jvm").default_str("openjdk"),
    LayerAttribute::string("jvm_version", "JvmVersion").default_str("7"),
];

static MEMCACHED_ATTRIBUTES: &[LayerAttribute] =
    &[LayerAttribute::int("allocated_memory", "MemcachedMemory").default_int(512)];

static MYSQL_ATTRIBUTES: &[LayerAttribute] = &[
    LayerAttribute::string("root_password", "MysqlRootPassword").write_only(),
    LayerAttribute::bool("root_password_on_all_instances", "MysqlRootPasswordUbiquitous")
        .default_bool(true),
];

static NODEJS_APP_ATTRIBUTES: &[LayerAttribute] =
    &[LayerAttribute::string("nodejs_version", "NodejsVersion").default_str("0.10.38")];

static RAILS_APP_ATTRIBUTES: &[LayerAttribute] = &[
    LayerAttribute::string("app_server", "RailsStack").default_str("apache_passenger"),
    LayerAttribute::string("bundler_version", "BundlerVersion").default_str("1.5.3"),
    LayerAttribute::bool("manage_bundler", "ManageBundler").default_bool(true),
    LayerAttribute::string("passenger_version", "PassengerVersion").default_str("4.0.46"),
    LayerAttribute::string("ruby_version", "RubyVersion").default_str("2.0.0"),
    LayerAttribute::string("rubygems_version", "RubygemsVersion").default_str("2.2.2"),
];

pub static LAYER_TYPES: &[LayerType] = &[
    LayerType {
        name: "custom",
        type_name: "custom",
        default_layer_name: None,
        attributes: &[],
        custom_short_name: true,
    },
    LayerType {
        name: "ecs_cluster",
        type_name: "ecs-cluster",
        default_layer_name: Some("Ecs Cluster"),
        attributes: ECS_CLUSTER_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "ganglia",
        type_name: "monitoring-master",
        default_layer_name: Some("Ganglia"),
        attributes: GANGLIA_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "haproxy",
        type_name: "lb",
        default_layer_name: Some("HAProxy"),
        attributes: HAPROXY_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "java_app",
        type_name: "java-app",
        default_layer_name: Some("Java App Server"),
        attributes: JAVA_APP_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "memcached",
        type_name: "memcached",
        default_layer_name: Some("Memcached"),
        attributes: MEMCACHED_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "mysql",
        type_name: "db-master",
        default_layer_name: Some("MySQL"),
        attributes: MYSQL_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "nodejs_app",
        type_name: "nodejs-app",
        default_layer_name: Some("Node.js App Server"),
        attributes: NODEJS_APP_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "php_app",
        type_name: "php-app",
        default_layer_name: Some("PHP App Server"),
        attributes: &[],
        custom_short_name: false,
    },
    LayerType {
        name: "rails_app",
        type_name: "rails-app",
        default_layer_name: Some("Rails App Server"),
        attributes: RAILS_APP_ATTRIBUTES,
        custom_short_name: false,
    },
    LayerType {
        name: "static_web",
        type_name: "web",
        default_layer_name: Some("Static Web Server"),
        attributes: &[],
        custom_short_name: false,
    },
];

/// Accepts either the short name (`haproxy`) or the full resource name
/// (`aws_opsworks_haproxy_layer`).
pub fn lookup(name: &str) -> Option<&'static LayerType> {
    let short = name
        .strip_prefix("aws_opsworks_")
        .and_then(|rest| rest.strip_suffix("_layer"))
        .unwrap_or(name);
    LAYER_TYPES.iter().find(|lt| lt.name == short)
}
