//! Monitoring REST API
//!
//! `PipelinesApi` is the seam between lifecycle logic and HTTP; every call
//! takes the already resolved regional [`Endpoint`].

use crate::model::{Pipeline, PipelineList, PipelineRequest};
use async_trait::async_trait;
use ionos_cloud::{ApiClient, Endpoint, EndpointTable, Result};

/// Regional monitoring endpoints
pub const ENDPOINTS: EndpointTable = EndpointTable {
    product: "monitoring",
    default_location: "de/fra",
    entries: &[
        ("de/fra", "https://monitoring.de-fra.ionos.com"),
        ("de/txl", "https://monitoring.de-txl.ionos.com"),
        ("es/vit", "https://monitoring.es-vit.ionos.com"),
        ("gb/lhr", "https://monitoring.gb-lhr.ionos.com"),
        ("gb/bhx", "https://monitoring.gb-bhx.ionos.com"),
        ("fr/par", "https://monitoring.fr-par.ionos.com"),
        ("us/mci", "https://monitoring.us-mci.ionos.com"),
    ],
};

/// Key used for endpoint overrides in the provider config
pub const PRODUCT: &str = "monitoring";

#[async_trait]
pub trait PipelinesApi: Send + Sync {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<Pipeline>>;

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<Pipeline>;

    async fn create(&self, endpoint: &Endpoint, request: &PipelineRequest) -> Result<Pipeline>;

    async fn update(
        &self,
        endpoint: &Endpoint,
        id: &str,
        request: &PipelineRequest,
    ) -> Result<Pipeline>;

    async fn delete(&self, endpoint: &Endpoint, id: &str) -> Result<()>;
}

/// `PipelinesApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpPipelinesApi {
    client: ApiClient,
}

impl HttpPipelinesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelinesApi for HttpPipelinesApi {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<Pipeline>> {
        let list: PipelineList = self.client.get(endpoint, "/pipelines").await?;
        Ok(list.items)
    }

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<Pipeline> {
        self.client.get(endpoint, &format!("/pipelines/{}", id)).await
    }

    async fn create(&self, endpoint: &Endpoint, request: &PipelineRequest) -> Result<Pipeline> {
        self.client.post(endpoint, "/pipelines", request).await
    }

    async fn update(
        &self,
        endpoint: &Endpoint,
        id: &str,
        request: &PipelineRequest,
    ) -> Result<Pipeline> {
        self.client
            .put(endpoint, &format!("/pipelines/{}", id), request)
            .await
    }

    async fn delete(&self, endpoint: &Endpoint, id: &str) -> Result<()> {
        self.client.delete(endpoint, &format!("/pipelines/{}", id)).await
    }
}
