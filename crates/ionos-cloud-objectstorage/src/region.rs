//! Object storage region data source

use crate::api::RegionsApi;
use crate::model::Region;
use ionos_cloud::{CloudError, Endpoint, OperationContext, Result};

pub const KIND: &str = "region";

pub struct RegionDataSource<A> {
    api: A,
    endpoint: Endpoint,
}

impl<A: RegionsApi> RegionDataSource<A> {
    pub fn new(api: A, endpoint: Endpoint) -> Self {
        Self { api, endpoint }
    }

    pub async fn get(&self, ctx: &OperationContext, id: &str) -> Result<Region> {
        match ctx.call(KIND, id, self.api.get(&self.endpoint, id)).await {
            Ok(region) => Ok(region),
            Err(e) if e.is_not_found() => Err(CloudError::NotFound {
                kind: KIND,
                id: id.to_string(),
            }),
            Err(e) => Err(e.during("read", KIND, id)),
        }
    }

    pub async fn list(&self, ctx: &OperationContext) -> Result<Vec<Region>> {
        let regions = ctx
            .call(KIND, "*", self.api.list(&self.endpoint))
            .await
            .map_err(|e| e.during("list", KIND, "*"))?;
        tracing::debug!(count = regions.len(), "Listed object storage regions");
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ENDPOINT;
    use crate::model::RegionProperties;
    use async_trait::async_trait;

    struct FakeRegions(Vec<Region>);

    #[async_trait]
    impl RegionsApi for FakeRegions {
        async fn list(&self, _endpoint: &Endpoint) -> Result<Vec<Region>> {
            Ok(self.0.clone())
        }

        async fn get(&self, _endpoint: &Endpoint, id: &str) -> Result<Region> {
            self.0
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| CloudError::Api {
                    status: 404,
                    message: "Resource not found".into(),
                })
        }
    }

    fn region(id: &str) -> Region {
        Region {
            id: id.to_string(),
            properties: RegionProperties {
                endpoint: Some(format!("s3.{id}.ionoscloud.com")),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let source = RegionDataSource::new(
            FakeRegions(vec![region("de"), region("eu-central-2")]),
            ENDPOINT.resolve_with(None),
        );
        let ctx = OperationContext::new();

        let found = source.get(&ctx, "eu-central-2").await.unwrap();
        assert_eq!(found.properties.endpoint.as_deref(), Some("s3.eu-central-2.ionoscloud.com"));
        assert_eq!(source.list(&ctx).await.unwrap().len(), 2);

        let err = source.get(&ctx, "us-central-1").await.unwrap_err();
        assert!(matches!(err, CloudError::NotFound { kind: "region", .. }));
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let source = RegionDataSource::new(FakeRegions(vec![]), ENDPOINT.resolve_with(None));
        let ctx = OperationContext::new();
        ctx.cancel();
        assert!(source.list(&ctx).await.unwrap_err().is_cancelled());
    }
}
