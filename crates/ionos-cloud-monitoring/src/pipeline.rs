//! Monitoring pipeline resource and data source

use crate::api::PipelinesApi;
use crate::model::{Pipeline, PipelineRequest};
use async_trait::async_trait;
use ionos_cloud::{
    CloudError, Endpoint, ManagedResource, Observed, Operation, OperationContext,
    RegionalEndpoints, ResourceRef, ResourceStatus, Result, Timeouts, select_one, wait_gone,
    wait_ready,
};
use serde::{Deserialize, Serialize};

pub const KIND: &str = "pipeline";

/// Desired pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
}

/// Observed pipeline state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub id: String,
    pub location: String,
    pub name: String,
    pub status: ResourceStatus,
    pub grafana_endpoint: Option<String>,
    pub http_endpoint: Option<String>,

    /// Ingestion key, returned by the API only when the pipeline is created
    pub key: Option<String>,
}

impl PipelineState {
    fn from_api(location: &str, pipeline: Pipeline) -> Self {
        Self {
            status: pipeline.resource_status(),
            id: pipeline.id,
            location: location.to_string(),
            name: pipeline.properties.name.unwrap_or_default(),
            grafana_endpoint: pipeline.metadata.grafana_endpoint,
            http_endpoint: pipeline.metadata.http_endpoint,
            key: pipeline.properties.key,
        }
    }

    /// Overlay an API response; fields it leaves out keep their previous values
    fn merge(&self, pipeline: Pipeline) -> Self {
        let status = match pipeline.metadata.status {
            Some(_) => pipeline.resource_status(),
            None => self.status,
        };
        let (meta, props) = (pipeline.metadata, pipeline.properties);
        Self {
            id: self.id.clone(),
            location: self.location.clone(),
            name: props.name.unwrap_or_else(|| self.name.clone()),
            status,
            grafana_endpoint: meta.grafana_endpoint.or_else(|| self.grafana_endpoint.clone()),
            http_endpoint: meta.http_endpoint.or_else(|| self.http_endpoint.clone()),
            key: props.key.or_else(|| self.key.clone()),
        }
    }
}

/// Monitoring pipeline lifecycle
pub struct PipelineResource<A> {
    api: A,
    endpoints: RegionalEndpoints,
    timeouts: Timeouts,
}

impl<A: PipelinesApi> PipelineResource<A> {
    pub fn new(api: A, endpoints: RegionalEndpoints, timeouts: Timeouts) -> Self {
        Self {
            api,
            endpoints,
            timeouts,
        }
    }

    async fn wait_available(
        &self,
        ctx: &OperationContext,
        endpoint: &Endpoint,
        target: &ResourceRef,
        operation: Operation,
    ) -> Result<()> {
        wait_ready(ctx, target, &self.timeouts.backoff(operation), || {
            self.api.get(endpoint, &target.id)
        })
        .await
    }

    /// Everything after the POST: wait, then read the pipeline back
    async fn settle(
        &self,
        ctx: &OperationContext,
        endpoint: &Endpoint,
        target: &ResourceRef,
    ) -> Result<Pipeline> {
        self.wait_available(ctx, endpoint, target, Operation::Create)
            .await?;
        ctx.call(KIND, &target.id, self.api.get(endpoint, &target.id))
            .await
    }
}

#[async_trait]
impl<A: PipelinesApi> ManagedResource for PipelineResource<A> {
    type Spec = PipelineSpec;
    type State = PipelineState;

    fn kind(&self) -> &'static str {
        KIND
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        location: &str,
        spec: &PipelineSpec,
    ) -> Result<PipelineState> {
        let endpoint = self.endpoints.resolve(location)?;
        let request = PipelineRequest::new(&spec.name);

        let created = ctx
            .call(KIND, &spec.name, self.api.create(&endpoint, &request))
            .await
            .map_err(|e| e.during("create", KIND, format!("(name {:?})", spec.name)))?;

        let target = ResourceRef::new(KIND, created.id.clone(), endpoint.location.clone());
        tracing::info!(id = %target.id, location = %target.location, name = %spec.name, "Pipeline requested");

        // The key is only ever part of the create response
        let created_state = PipelineState::from_api(&endpoint.location, created);

        match self.settle(ctx, &endpoint, &target).await {
            Ok(fetched) => Ok(created_state.merge(fetched)),
            Err(e) => Err(CloudError::partial_create(KIND, &target.id, &created_state, e)),
        }
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        id: &str,
        location: &str,
    ) -> Result<Option<PipelineState>> {
        let endpoint = self.endpoints.resolve(location)?;
        match ctx.call(KIND, id, self.api.get(&endpoint, id)).await {
            Ok(pipeline) => Ok(Some(PipelineState::from_api(&endpoint.location, pipeline))),
            Err(e) if e.is_not_found() => {
                tracing::warn!(id, location = %endpoint.location, "Pipeline no longer exists");
                Ok(None)
            }
            Err(e) => Err(e.during("read", KIND, id)),
        }
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        location: &str,
        spec: &PipelineSpec,
        prior: &PipelineState,
    ) -> Result<PipelineState> {
        let endpoint = self.endpoints.resolve(location)?;
        let target = ResourceRef::new(KIND, id, endpoint.location.clone());

        let request = PipelineRequest::new(&spec.name);
        let updated = ctx
            .call(KIND, id, self.api.update(&endpoint, id, &request))
            .await
            .map_err(|e| e.during("update", KIND, id))?;
        let state = prior.merge(updated);

        self.wait_available(ctx, &endpoint, &target, Operation::Update)
            .await?;
        tracing::info!(id, name = %state.name, "Pipeline updated");

        Ok(PipelineState {
            status: ResourceStatus::Available,
            ..state
        })
    }

    async fn delete(&self, ctx: &OperationContext, id: &str, location: &str) -> Result<()> {
        let endpoint = self.endpoints.resolve(location)?;
        let target = ResourceRef::new(KIND, id, endpoint.location.clone());

        match ctx.call(KIND, id, self.api.delete(&endpoint, id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(id, "Pipeline already deleted");
                return Ok(());
            }
            Err(e) => return Err(e.during("delete", KIND, id)),
        }

        wait_gone(ctx, &target, &self.timeouts.backoff(Operation::Delete), || {
            self.api.get(&endpoint, id)
        })
        .await?;

        tracing::info!(id, "Pipeline deleted");
        Ok(())
    }
}

/// Read-only pipeline lookups
pub struct PipelineDataSource<A> {
    api: A,
    endpoints: RegionalEndpoints,
}

impl<A: PipelinesApi> PipelineDataSource<A> {
    pub fn new(api: A, endpoints: RegionalEndpoints) -> Self {
        Self { api, endpoints }
    }

    /// Fetch by ID; a missing pipeline is an error here
    pub async fn by_id(&self, ctx: &OperationContext, id: &str, location: &str) -> Result<PipelineState> {
        let endpoint = self.endpoints.resolve(location)?;
        match ctx.call(KIND, id, self.api.get(&endpoint, id)).await {
            Ok(pipeline) => Ok(PipelineState::from_api(&endpoint.location, pipeline)),
            Err(e) if e.is_not_found() => Err(CloudError::NotFound {
                kind: KIND,
                id: id.to_string(),
            }),
            Err(e) => Err(e.during("read", KIND, id)),
        }
    }

    /// Find the single pipeline called `name` in `location`
    pub async fn by_name(&self, ctx: &OperationContext, name: &str, location: &str) -> Result<PipelineState> {
        let endpoint = self.endpoints.resolve(location)?;
        let pipelines = ctx
            .call(KIND, name, self.api.list(&endpoint))
            .await
            .map_err(|e| e.during("list", KIND, format!("(name {:?})", name)))?;

        let found = select_one(KIND, "name", name, pipelines, |p| {
            p.properties.name.as_deref() == Some(name)
        })?;
        Ok(PipelineState::from_api(&endpoint.location, found))
    }

    /// All pipelines in `location`
    pub async fn list(&self, ctx: &OperationContext, location: &str) -> Result<Vec<PipelineState>> {
        let endpoint = self.endpoints.resolve(location)?;
        let pipelines = ctx
            .call(KIND, "*", self.api.list(&endpoint))
            .await
            .map_err(|e| e.during("list", KIND, "*"))?;
        Ok(pipelines
            .into_iter()
            .map(|p| PipelineState::from_api(&endpoint.location, p))
            .collect())
    }
}
