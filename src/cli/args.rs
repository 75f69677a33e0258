use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub struct EndpointArgs {
    /// Base URL of the resource API
    #[arg(long, env = "TFWAIT_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "TFWAIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Redshift zero-ETL integrations
    Integration {
        #[command(subcommand)]
        command: IntegrationCommand,
    },
    /// OpsWorks layers
    Layer {
        #[command(subcommand)]
        command: LayerCommand,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PollArgs {
    /// Seconds between status checks
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Seconds to wait before giving up
    #[arg(long, default_value_t = 1800)]
    pub timeout: u64,
}

impl Default for PollArgs {
    fn default() -> Self {
        Self {
            interval: 10,
            timeout: 1800,
        }
    }
}

impl PollArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Subcommand, Debug)]
pub enum IntegrationCommand {
    Create(IntegrationCreateArgs),
    Show { id: String },
    Update(IntegrationUpdateArgs),
    Delete {
        id: String,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Poll an integration until an operation settles
    Wait {
        id: String,
        #[arg(long = "for", value_enum, default_value_t = WaitFor::Create)]
        wait_for: WaitFor,
        #[command(flatten)]
        poll: PollArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitFor {
    Create,
    Update,
    Delete,
}

#[derive(clap::Args, Debug)]
pub struct IntegrationCreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub source_arn: String,

    #[arg(long)]
    pub target_arn: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub kms_key_id: Option<String>,

    /// Additional encryption context entry, KEY=VALUE
    #[arg(long = "context", value_parser = parse_key_val)]
    pub encryption_context: Vec<(String, String)>,

    /// Tag, KEY=VALUE
    #[arg(long = "tag", value_parser = parse_key_val)]
    pub tags: Vec<(String, String)>,

    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(clap::Args, Debug)]
pub struct IntegrationUpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "tag", value_parser = parse_key_val)]
    pub tags: Vec<(String, String)>,

    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(Subcommand, Debug)]
pub enum LayerCommand {
    /// List the supported layer types
    Types,
    /// Show every setting a layer type accepts
    Schema { layer_type: String },
    Create(LayerCreateArgs),
    Show { layer_type: String, id: String },
    Update(LayerUpdateArgs),
    Delete { layer_type: String, id: String },
}

#[derive(clap::Args, Debug)]
pub struct LayerCreateArgs {
    /// Short (`haproxy`) or full (`aws_opsworks_haproxy_layer`) type name
    pub layer_type: String,

    #[arg(long)]
    pub stack_id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub short_name: Option<String>,

    /// Type-specific attribute, KEY=VALUE
    #[arg(long = "attr", value_parser = parse_key_val)]
    pub attributes: Vec<(String, String)>,

    #[arg(long)]
    pub custom_json: Option<String>,

    #[arg(long = "package")]
    pub packages: Vec<String>,

    #[arg(long = "security-group")]
    pub security_groups: Vec<String>,

    /// Classic load balancer to attach
    #[arg(long)]
    pub elastic_load_balancer: Option<String>,

    #[arg(long = "tag", value_parser = parse_key_val)]
    pub tags: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
pub struct LayerUpdateArgs {
    pub layer_type: String,

    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "attr", value_parser = parse_key_val)]
    pub attributes: Vec<(String, String)>,

    #[arg(long)]
    pub custom_json: Option<String>,

    /// Load balancer to attach in place of the current one; empty detaches
    #[arg(long)]
    pub elastic_load_balancer: Option<String>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
