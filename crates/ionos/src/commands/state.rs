use colored::Colorize;
use ionos_cloud::StateManager;
use std::path::Path;

pub async fn handle_list(state_dir: &Path) -> anyhow::Result<()> {
    let state = StateManager::new(state_dir).load().await?;

    if state.resources.is_empty() {
        println!("{}", "No tracked resources".dimmed());
        return Ok(());
    }

    println!(
        "{:<12} {:<40} {:<10} {:<14} {}",
        "KIND".bold(),
        "ID".bold(),
        "LOCATION".bold(),
        "STATUS".bold(),
        "UPDATED".bold()
    );
    for resource in state.resources.values() {
        let location = if resource.location.is_empty() {
            "-"
        } else {
            resource.location.as_str()
        };
        println!(
            "{:<12} {:<40} {:<10} {:<14} {}",
            resource.kind,
            resource.id.cyan(),
            location,
            resource.status.to_string(),
            resource.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
