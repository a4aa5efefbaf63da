//! Object storage access key resource and data source

use crate::api::AccessKeysApi;
use crate::model::{AccessKey, AccessKeyRequest};
use async_trait::async_trait;
use ionos_cloud::{
    CloudError, Endpoint, ManagedResource, Observed, Operation, OperationContext, ResourceRef,
    ResourceStatus, Result, Timeouts, select_one, wait_gone, wait_ready,
};
use serde::{Deserialize, Serialize};

pub const KIND: &str = "access key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeySpec {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyState {
    pub id: String,
    pub description: String,
    pub status: ResourceStatus,
    pub access_key: Option<String>,
    pub canonical_user_id: Option<String>,
    pub contract_user_id: Option<String>,

    /// Only returned when the key is created; kept from then on
    pub secret_key: Option<String>,
}

impl AccessKeyState {
    fn from_api(key: AccessKey) -> Self {
        Self {
            status: key.resource_status(),
            id: key.id,
            description: key.properties.description.unwrap_or_default(),
            access_key: key.properties.access_key,
            canonical_user_id: key.metadata.canonical_user_id,
            contract_user_id: key.metadata.contract_user_id,
            secret_key: key.properties.secret_key,
        }
    }

    fn merge(&self, key: AccessKey) -> Self {
        let status = match key.metadata.status {
            Some(_) => key.resource_status(),
            None => self.status,
        };
        Self {
            id: self.id.clone(),
            description: key
                .properties
                .description
                .unwrap_or_else(|| self.description.clone()),
            status,
            access_key: key.properties.access_key.or_else(|| self.access_key.clone()),
            canonical_user_id: key
                .metadata
                .canonical_user_id
                .or_else(|| self.canonical_user_id.clone()),
            contract_user_id: key
                .metadata
                .contract_user_id
                .or_else(|| self.contract_user_id.clone()),
            secret_key: key.properties.secret_key.or_else(|| self.secret_key.clone()),
        }
    }
}

/// Access key lifecycle against the global management endpoint.
///
/// The `location` argument of [`ManagedResource`] is ignored.
pub struct AccessKeyResource<A> {
    api: A,
    endpoint: Endpoint,
    timeouts: Timeouts,
}

impl<A: AccessKeysApi> AccessKeyResource<A> {
    pub fn new(api: A, endpoint: Endpoint, timeouts: Timeouts) -> Self {
        Self {
            api,
            endpoint,
            timeouts,
        }
    }

    fn target(&self, id: &str) -> ResourceRef {
        ResourceRef::new(KIND, id, self.endpoint.location.clone())
    }

    async fn wait_available(&self, ctx: &OperationContext, id: &str, operation: Operation) -> Result<()> {
        wait_ready(ctx, &self.target(id), &self.timeouts.backoff(operation), || {
            self.api.get(&self.endpoint, id)
        })
        .await
    }

    /// Everything after the POST: wait, then read the key back
    async fn settle(&self, ctx: &OperationContext, id: &str) -> Result<AccessKey> {
        self.wait_available(ctx, id, Operation::Create).await?;
        ctx.call(KIND, id, self.api.get(&self.endpoint, id)).await
    }
}

#[async_trait]
impl<A: AccessKeysApi> ManagedResource for AccessKeyResource<A> {
    type Spec = AccessKeySpec;
    type State = AccessKeyState;

    fn kind(&self) -> &'static str {
        KIND
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        _location: &str,
        spec: &AccessKeySpec,
    ) -> Result<AccessKeyState> {
        let request = AccessKeyRequest::new(&spec.description);
        let created = ctx
            .call(KIND, &spec.description, self.api.create(&self.endpoint, &request))
            .await
            .map_err(|e| e.during("create", KIND, format!("(description {:?})", spec.description)))?;

        let id = created.id.clone();
        tracing::info!(id = %id, description = %spec.description, "Access key requested");

        // The secret is only ever part of the create response
        let created_state = AccessKeyState::from_api(created);

        match self.settle(ctx, &id).await {
            Ok(fetched) => Ok(created_state.merge(fetched)),
            Err(e) => Err(CloudError::partial_create(KIND, &id, &created_state, e)),
        }
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        id: &str,
        _location: &str,
    ) -> Result<Option<AccessKeyState>> {
        match ctx.call(KIND, id, self.api.get(&self.endpoint, id)).await {
            Ok(key) => Ok(Some(AccessKeyState::from_api(key))),
            Err(e) if e.is_not_found() => {
                tracing::warn!(id, "Access key no longer exists");
                Ok(None)
            }
            Err(e) => Err(e.during("read", KIND, id)),
        }
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        _location: &str,
        spec: &AccessKeySpec,
        prior: &AccessKeyState,
    ) -> Result<AccessKeyState> {
        let request = AccessKeyRequest::new(&spec.description);
        let updated = ctx
            .call(KIND, id, self.api.update(&self.endpoint, id, &request))
            .await
            .map_err(|e| e.during("update", KIND, id))?;
        let state = prior.merge(updated);

        self.wait_available(ctx, id, Operation::Update).await?;

        Ok(AccessKeyState {
            status: ResourceStatus::Available,
            ..state
        })
    }

    async fn delete(&self, ctx: &OperationContext, id: &str, _location: &str) -> Result<()> {
        match ctx.call(KIND, id, self.api.delete(&self.endpoint, id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(id, "Access key already deleted");
                return Ok(());
            }
            Err(e) => return Err(e.during("delete", KIND, id)),
        }

        wait_gone(ctx, &self.target(id), &self.timeouts.backoff(Operation::Delete), || {
            self.api.get(&self.endpoint, id)
        })
        .await?;

        tracing::info!(id, "Access key deleted");
        Ok(())
    }
}

/// Field an access key is looked up by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessKeyFilter {
    Id(String),
    Description(String),
    AccessKey(String),
}

/// Read-only access key lookups
pub struct AccessKeyDataSource<A> {
    api: A,
    endpoint: Endpoint,
}

impl<A: AccessKeysApi> AccessKeyDataSource<A> {
    pub fn new(api: A, endpoint: Endpoint) -> Self {
        Self { api, endpoint }
    }

    pub async fn find(&self, ctx: &OperationContext, filter: &AccessKeyFilter) -> Result<AccessKeyState> {
        let (field, value): (&'static str, &str) = match filter {
            AccessKeyFilter::Id(id) => return self.by_id(ctx, id).await,
            AccessKeyFilter::Description(d) => ("description", d.as_str()),
            AccessKeyFilter::AccessKey(k) => ("accessKey", k.as_str()),
        };

        let keys = ctx
            .call(KIND, value, self.api.list(&self.endpoint))
            .await
            .map_err(|e| e.during("list", KIND, format!("({field} {value:?})")))?;

        let found = select_one(KIND, field, value, keys, |key| {
            let candidate = match filter {
                AccessKeyFilter::Description(_) => key.properties.description.as_deref(),
                _ => key.properties.access_key.as_deref(),
            };
            candidate == Some(value)
        })?;
        Ok(AccessKeyState::from_api(found))
    }

    pub async fn by_id(&self, ctx: &OperationContext, id: &str) -> Result<AccessKeyState> {
        match ctx.call(KIND, id, self.api.get(&self.endpoint, id)).await {
            Ok(key) => Ok(AccessKeyState::from_api(key)),
            Err(e) if e.is_not_found() => Err(CloudError::NotFound {
                kind: KIND,
                id: id.to_string(),
            }),
            Err(e) => Err(e.during("read", KIND, id)),
        }
    }
}
