use super::print_json;
use crate::RegionCommands;
use crate::session::Session;
use colored::Colorize;
use ionos_cloud_objectstorage::{ENDPOINT, HttpRegionsApi, PRODUCT, RegionDataSource};

pub async fn handle(session: &Session, cmd: RegionCommands) -> anyhow::Result<()> {
    let source = RegionDataSource::new(
        HttpRegionsApi::new(session.client()?),
        session.global(ENDPOINT, PRODUCT),
    );

    match cmd {
        RegionCommands::Get { id } => print_json(&source.get(&session.ctx, &id).await?)?,
        RegionCommands::List => {
            let regions = source.list(&session.ctx).await?;
            if regions.is_empty() {
                println!("{}", "No regions".dimmed());
            }
            for region in regions {
                let props = &region.properties;
                println!(
                    "{:<16} {:<40} {}",
                    region.id.cyan(),
                    props.endpoint.as_deref().unwrap_or("-"),
                    props.location.as_deref().unwrap_or("-").dimmed()
                );
            }
        }
    }

    Ok(())
}
