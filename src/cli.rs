mod args;
mod render;

pub use args::Cli;

use std::collections::BTreeMap;

use color_eyre::eyre::{Result, WrapErr, eyre};

use args::{
    Command, EndpointArgs, IntegrationCommand, IntegrationCreateArgs, IntegrationUpdateArgs,
    LayerCommand, LayerCreateArgs, LayerUpdateArgs, PollArgs, WaitFor,
};
use tfwait::services::opsworks::{
    AttributeTable, Attributes, LAYER_TYPES, LayerConfig, LayerError, LayerService, lookup,
};
use tfwait::services::redshift::{self, IntegrationPlan, IntegrationService, Timeouts};
use tfwait::{Error, HttpResourceClient};

const INTEGRATIONS: &str = "integrations";
const LAYERS: &str = "layers";

fn client(endpoint: &EndpointArgs, collection: &str) -> Result<HttpResourceClient> {
    let base_url = endpoint.endpoint.as_deref().ok_or_else(|| {
        Error::Config("no endpoint: pass --endpoint or set TFWAIT_ENDPOINT".to_string())
    })?;
    Ok(HttpResourceClient::new(base_url, collection, endpoint.token.as_deref())?)
}

fn integrations(
    endpoint: &EndpointArgs,
    poll: PollArgs,
) -> Result<IntegrationService<HttpResourceClient>> {
    let timeout = poll.timeout();
    Ok(IntegrationService::new(client(endpoint, INTEGRATIONS)?)
        .with_poll_interval(poll.interval())
        .with_timeouts(Timeouts {
            create: timeout,
            update: timeout,
            delete: timeout,
        }))
}

fn layers(endpoint: &EndpointArgs, layer_type: &str) -> Result<LayerService<HttpResourceClient>> {
    Ok(LayerService::for_resource(client(endpoint, LAYERS)?, layer_type)?)
}

fn parse_attributes(
    table: &AttributeTable,
    pairs: &[(String, String)],
) -> Result<Attributes, LayerError> {
    pairs
        .iter()
        .map(|(key, raw)| table.parse(key, raw).map(|value| (key.clone(), value)))
        .collect()
}

fn string_map(pairs: &[(String, String)]) -> BTreeMap<String, String> {
    pairs.iter().cloned().collect()
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Integration { command } => integration(&cli.endpoint, command).await,
        Command::Layer { command } => layer(&cli.endpoint, command).await,
    }
}

async fn integration(endpoint: &EndpointArgs, command: IntegrationCommand) -> Result<()> {
    match command {
        IntegrationCommand::Create(args) => integration_create(endpoint, args).await,
        IntegrationCommand::Show { id } => {
            let service = integrations(endpoint, PollArgs::default())?;
            let state = service
                .read(&id, None)
                .await?
                .ok_or_else(|| eyre!("integration '{id}' not found"))?;
            println!("{}", render::state_table(&state)?);
            Ok(())
        }
        IntegrationCommand::Update(args) => integration_update(endpoint, args).await,
        IntegrationCommand::Delete { id, poll } => {
            integrations(endpoint, poll)?.delete(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
        IntegrationCommand::Wait { id, wait_for, poll } => {
            let spec = match wait_for {
                WaitFor::Create => redshift::create_spec(poll.timeout()),
                WaitFor::Update => redshift::update_spec(poll.timeout()),
                WaitFor::Delete => redshift::delete_spec(poll.timeout()),
            }
            .with_interval(poll.interval());
            let service = integrations(endpoint, poll)?;
            match service.wait(&id, &spec).await? {
                Some(resource) => println!("{id}: {}", resource.status),
                None => println!("{id}: absent"),
            }
            Ok(())
        }
    }
}

async fn integration_create(endpoint: &EndpointArgs, args: IntegrationCreateArgs) -> Result<()> {
    let plan = IntegrationPlan {
        integration_name: args.name,
        source_arn: args.source_arn,
        target_arn: args.target_arn,
        description: args.description,
        kms_key_id: args.kms_key_id,
        additional_encryption_context: (!args.encryption_context.is_empty())
            .then(|| string_map(&args.encryption_context)),
        tags: string_map(&args.tags),
    };
    let service = integrations(endpoint, args.poll)?;
    match service.create(&plan).await {
        Ok(state) => {
            println!("{}", render::state_table(&state)?);
            Ok(())
        }
        Err(err) => {
            if let Some(id) = err.tainted_id() {
                eprintln!("integration {id} was created but did not become active");
            }
            Err(err.into())
        }
    }
}

async fn integration_update(endpoint: &EndpointArgs, args: IntegrationUpdateArgs) -> Result<()> {
    let service = integrations(endpoint, args.poll)?;
    let prior = service
        .read(&args.id, None)
        .await?
        .ok_or_else(|| eyre!("integration '{}' not found", args.id))?;

    let mut plan = prior.plan.clone();
    if let Some(name) = args.name {
        plan.integration_name = name;
    }
    if args.description.is_some() {
        plan.description = args.description;
    }
    plan.tags.extend(args.tags);

    let state = service.update(&prior, &plan).await?;
    println!("{}", render::state_table(&state)?);
    Ok(())
}

async fn layer(endpoint: &EndpointArgs, command: LayerCommand) -> Result<()> {
    match command {
        LayerCommand::Types => {
            println!("{}", render::layer_types_table(LAYER_TYPES));
            Ok(())
        }
        LayerCommand::Schema { layer_type } => {
            let lt = lookup(&layer_type).ok_or(LayerError::UnknownLayerType(layer_type))?;
            println!("{}", render::schema_table(&lt.schema()));
            Ok(())
        }
        LayerCommand::Create(args) => layer_create(endpoint, args).await,
        LayerCommand::Show { layer_type, id } => {
            let state = layers(endpoint, &layer_type)?
                .read(&id, None)
                .await?
                .ok_or_else(|| eyre!("layer '{id}' not found"))?;
            println!("{}", render::state_table(&state)?);
            Ok(())
        }
        LayerCommand::Update(args) => layer_update(endpoint, args).await,
        LayerCommand::Delete { layer_type, id } => {
            let service = layers(endpoint, &layer_type)?;
            match service.read(&id, None).await? {
                Some(state) => {
                    service.delete(&state).await?;
                    println!("deleted {id}");
                }
                None => println!("{id}: already absent"),
            }
            Ok(())
        }
    }
}

async fn layer_create(endpoint: &EndpointArgs, args: LayerCreateArgs) -> Result<()> {
    let service = layers(endpoint, &args.layer_type)?;
    let table = service.layer_type().attribute_table();
    let config = LayerConfig {
        stack_id: args.stack_id,
        name: args.name,
        short_name: args.short_name,
        custom_json: args.custom_json,
        system_packages: args.packages.into_iter().collect(),
        custom_security_group_ids: args.security_groups.into_iter().collect(),
        tags: string_map(&args.tags),
        elastic_load_balancer: args.elastic_load_balancer,
        attributes: parse_attributes(&table, &args.attributes)?,
        ..LayerConfig::default()
    };

    let state = service
        .create(&config)
        .await
        .wrap_err_with(|| format!("creating {}", service.layer_type().resource_name()))?;
    println!("{}", render::state_table(&state)?);
    Ok(())
}

async fn layer_update(endpoint: &EndpointArgs, args: LayerUpdateArgs) -> Result<()> {
    let service = layers(endpoint, &args.layer_type)?;
    let table = service.layer_type().attribute_table();
    let prior = service
        .read(&args.id, None)
        .await?
        .ok_or_else(|| eyre!("layer '{}' not found", args.id))?;

    let mut plan = prior.config.clone();
    if args.name.is_some() {
        plan.name = args.name;
    }
    if args.custom_json.is_some() {
        plan.custom_json = args.custom_json;
    }
    if let Some(elb) = args.elastic_load_balancer {
        plan.elastic_load_balancer = (!elb.is_empty()).then_some(elb);
    }
    plan.attributes
        .extend(parse_attributes(&table, &args.attributes)?);

    let state = service.update(&prior, &plan).await?;
    println!("{}", render::state_table(&state)?);
    Ok(())
}
