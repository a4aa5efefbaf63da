//! Object storage management REST API
//!
//! The management API has a single global endpoint; it is still passed to
//! every call so tests and overrides never touch the shared client.

use crate::model::{AccessKey, AccessKeyList, AccessKeyRequest, Region, RegionList};
use async_trait::async_trait;
use ionos_cloud::{ApiClient, Endpoint, GlobalEndpoint, Result};

pub const ENDPOINT: GlobalEndpoint = GlobalEndpoint {
    product: "object storage management",
    url: "https://s3.ionos.com",
};

/// Key used for endpoint overrides in the provider config
pub const PRODUCT: &str = "object_storage_management";

#[async_trait]
pub trait AccessKeysApi: Send + Sync {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<AccessKey>>;

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<AccessKey>;

    async fn create(&self, endpoint: &Endpoint, request: &AccessKeyRequest) -> Result<AccessKey>;

    async fn update(
        &self,
        endpoint: &Endpoint,
        id: &str,
        request: &AccessKeyRequest,
    ) -> Result<AccessKey>;

    async fn delete(&self, endpoint: &Endpoint, id: &str) -> Result<()>;
}

#[async_trait]
pub trait RegionsApi: Send + Sync {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<Region>>;

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<Region>;
}

/// `AccessKeysApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpAccessKeysApi {
    client: ApiClient,
}

impl HttpAccessKeysApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

/// `RegionsApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpRegionsApi {
    client: ApiClient,
}

impl HttpRegionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccessKeysApi for HttpAccessKeysApi {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<AccessKey>> {
        let list: AccessKeyList = self.client.get(endpoint, "/accesskeys").await?;
        Ok(list.items)
    }

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<AccessKey> {
        self.client.get(endpoint, &format!("/accesskeys/{}", id)).await
    }

    async fn create(&self, endpoint: &Endpoint, request: &AccessKeyRequest) -> Result<AccessKey> {
        self.client.post(endpoint, "/accesskeys", request).await
    }

    async fn update(
        &self,
        endpoint: &Endpoint,
        id: &str,
        request: &AccessKeyRequest,
    ) -> Result<AccessKey> {
        self.client
            .put(endpoint, &format!("/accesskeys/{}", id), request)
            .await
    }

    async fn delete(&self, endpoint: &Endpoint, id: &str) -> Result<()> {
        self.client.delete(endpoint, &format!("/accesskeys/{}", id)).await
    }
}

#[async_trait]
impl RegionsApi for HttpRegionsApi {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<Region>> {
        let list: RegionList = self.client.get(endpoint, "/regions").await?;
        Ok(list.items)
    }

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<Region> {
        self.client.get(endpoint, &format!("/regions/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_endpoint() {
        let endpoint = ENDPOINT.resolve_with(None);
        assert_eq!(endpoint.url("/accesskeys"), "https://s3.ionos.com/accesskeys");
        assert!(endpoint.location.is_empty());
    }
}
