use anyhow::Context;
use ionos_cloud::{
    ApiClient, Endpoint, EndpointTable, GlobalEndpoint, OperationContext, RegionalEndpoints,
    StateManager, Timeouts,
};
use ionos_cloud_config::{ProviderConfig, parse_duration};
use std::path::Path;

/// Everything a resource command needs: config, cancellation and tracked state
pub struct Session {
    pub config: ProviderConfig,
    pub ctx: OperationContext,
    pub state: StateManager,

    /// `--location`, empty when not given
    pub location: String,
}

impl Session {
    pub fn open(
        location: String,
        timeout: Option<&str>,
        deadline: Option<&str>,
        state_dir: &Path,
    ) -> anyhow::Result<Self> {
        let mut config =
            ProviderConfig::load().context("Failed to load IONOS Cloud configuration")?;
        if let Some(timeout) = timeout {
            config.timeouts = Timeouts::uniform(parse_duration(timeout)?);
        }

        let mut ctx = OperationContext::new();
        if let Some(deadline) = deadline {
            ctx = ctx.deadline_in(parse_duration(deadline)?);
        }
        let handle = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling the running operation");
                handle.cancel();
            }
        });

        Ok(Self {
            config,
            ctx,
            state: StateManager::new(state_dir),
            location,
        })
    }

    pub fn client(&self) -> anyhow::Result<ApiClient> {
        ApiClient::new(self.config.credentials.clone()).context("Failed to build HTTP client")
    }

    pub fn regional(&self, table: EndpointTable, product: &str) -> RegionalEndpoints {
        RegionalEndpoints::new(table)
            .with_override(self.config.endpoint_override(product).map(str::to_string))
    }

    pub fn global(&self, endpoint: GlobalEndpoint, product: &str) -> Endpoint {
        endpoint.resolve_with(self.config.endpoint_override(product))
    }
}
