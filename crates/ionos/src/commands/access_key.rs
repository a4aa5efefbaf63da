use super::{create_tracked, delete_tracked, lookup, print_json, read_tracked, record};
use crate::AccessKeyCommands;
use crate::session::Session;
use colored::Colorize;
use ionos_cloud::ManagedResource;
use ionos_cloud_objectstorage::access_key::KIND;
use ionos_cloud_objectstorage::{
    AccessKeyDataSource, AccessKeyFilter, AccessKeyResource, AccessKeySpec, AccessKeyState,
    ENDPOINT, HttpAccessKeysApi, PRODUCT,
};

pub async fn handle(session: &Session, cmd: AccessKeyCommands) -> anyhow::Result<()> {
    let api = HttpAccessKeysApi::new(session.client()?);
    let endpoint = session.global(ENDPOINT, PRODUCT);

    match cmd {
        AccessKeyCommands::Create { description } => {
            let resource = AccessKeyResource::new(api, endpoint, session.config.timeouts);
            println!("{}", "Creating access key...".blue());

            let spec = AccessKeySpec { description };
            let state = create_tracked(&session.state, &resource, &session.ctx, "", &spec).await?;

            println!("{} {}", "✓ Access key available:".green(), state.id.cyan());
            print_state(&state);
            if let Some(secret) = &state.secret_key {
                println!("  secret:     {}", secret.yellow());
                println!("{}", "  The secret is only shown once; it is kept in the state file.".dimmed());
            }
        }
        AccessKeyCommands::Get { id } => {
            let resource = AccessKeyResource::new(api, endpoint, session.config.timeouts);
            match read_tracked(&session.state, &resource, &session.ctx, &id, "").await? {
                Some(state) => print_json(&state)?,
                None => println!("{}", format!("Access key {} no longer exists", id).yellow()),
            }
        }
        AccessKeyCommands::Find {
            description,
            access_key,
        } => {
            let filter = match (description, access_key) {
                (Some(description), _) => AccessKeyFilter::Description(description),
                (None, Some(key)) => AccessKeyFilter::AccessKey(key),
                (None, None) => anyhow::bail!("Either --description or --access-key is required"),
            };
            let source = AccessKeyDataSource::new(api, endpoint);
            print_json(&source.find(&session.ctx, &filter).await?)?;
        }
        AccessKeyCommands::Update { id, description } => {
            let resource = AccessKeyResource::new(api, endpoint, session.config.timeouts);
            let prior = match lookup::<AccessKeyState>(&session.state, KIND, &id).await? {
                Some((_, prior)) => prior,
                None => resource
                    .read(&session.ctx, &id, "")
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Access key {} not found", id))?,
            };

            let state = resource
                .update(&session.ctx, &id, "", &AccessKeySpec { description }, &prior)
                .await?;
            record(&session.state, KIND, &state).await?;

            println!("{} {}", "✓ Access key updated:".green(), state.id.cyan());
            print_state(&state);
        }
        AccessKeyCommands::Delete { id } => {
            let resource = AccessKeyResource::new(api, endpoint, session.config.timeouts);
            println!("{}", format!("Deleting access key {}...", id).blue());
            delete_tracked(&session.state, &resource, &session.ctx, &id, "").await?;
            println!("{} {}", "✓ Access key deleted:".green(), id.cyan());
        }
    }

    Ok(())
}

fn print_state(state: &AccessKeyState) {
    println!("  description: {}", state.description);
    println!("  status:      {}", state.status);
    if let Some(key) = &state.access_key {
        println!("  access key:  {}", key);
    }
    if let Some(user) = &state.canonical_user_id {
        println!("  canonical user: {}", user);
    }
}
