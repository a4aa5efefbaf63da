use super::{create_tracked, delete_tracked, location_for, lookup, print_json, read_tracked, record};
use crate::PipelineCommands;
use crate::session::Session;
use colored::Colorize;
use ionos_cloud::ManagedResource;
use ionos_cloud_monitoring::{
    ENDPOINTS, HttpPipelinesApi, KIND, PRODUCT, PipelineDataSource, PipelineResource,
    PipelineSpec, PipelineState,
};

pub async fn handle(session: &Session, cmd: PipelineCommands) -> anyhow::Result<()> {
    let api = HttpPipelinesApi::new(session.client()?);
    let endpoints = session.regional(ENDPOINTS, PRODUCT);

    match cmd {
        PipelineCommands::Create { name } => {
            let resource = PipelineResource::new(api, endpoints, session.config.timeouts);
            println!("{}", format!("Creating pipeline {}...", name).blue());

            let spec = PipelineSpec { name };
            let state =
                create_tracked(&session.state, &resource, &session.ctx, &session.location, &spec).await?;

            println!("{} {}", "✓ Pipeline available:".green(), state.id.cyan());
            print_state(&state);
            if let Some(key) = &state.key {
                println!("  key:     {}", key.yellow());
                println!("{}", "  The key is only shown once; it is kept in the state file.".dimmed());
            }
        }
        PipelineCommands::Get { id } => {
            let resource = PipelineResource::new(api, endpoints, session.config.timeouts);
            match read_tracked(&session.state, &resource, &session.ctx, &id, &session.location).await? {
                Some(state) => print_json(&state)?,
                None => println!("{}", format!("Pipeline {} no longer exists", id).yellow()),
            }
        }
        PipelineCommands::Find { name } => {
            let source = PipelineDataSource::new(api, endpoints);
            let state = source.by_name(&session.ctx, &name, &session.location).await?;
            print_json(&state)?;
        }
        PipelineCommands::Update { id, name } => {
            let recorded = lookup::<PipelineState>(&session.state, KIND, &id).await?;
            let location = location_for(session, recorded.as_ref().map(|(l, _)| l.as_str()));
            let resource = PipelineResource::new(api, endpoints, session.config.timeouts);

            let prior = match recorded {
                Some((_, prior)) => prior,
                None => resource
                    .read(&session.ctx, &id, &location)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Pipeline {} not found", id))?,
            };

            let state = resource
                .update(&session.ctx, &id, &location, &PipelineSpec { name }, &prior)
                .await?;
            record(&session.state, KIND, &state).await?;

            println!("{} {}", "✓ Pipeline updated:".green(), state.id.cyan());
            print_state(&state);
        }
        PipelineCommands::Delete { id } => {
            let recorded = lookup::<PipelineState>(&session.state, KIND, &id).await?;
            let location = location_for(session, recorded.as_ref().map(|(l, _)| l.as_str()));
            let resource = PipelineResource::new(api, endpoints, session.config.timeouts);

            println!("{}", format!("Deleting pipeline {}...", id).blue());
            delete_tracked(&session.state, &resource, &session.ctx, &id, &location).await?;
            println!("{} {}", "✓ Pipeline deleted:".green(), id.cyan());
        }
    }

    Ok(())
}

fn print_state(state: &PipelineState) {
    println!("  name:     {}", state.name);
    println!("  location: {}", state.location);
    println!("  status:   {}", state.status);
    if let Some(grafana) = &state.grafana_endpoint {
        println!("  grafana:  {}", grafana);
    }
    if let Some(http) = &state.http_endpoint {
        println!("  http:     {}", http);
    }
}
