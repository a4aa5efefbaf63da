//! IONOS Cloud Monitoring
//!
//! Manages monitoring pipelines. Each pipeline lives in one location and is
//! served from that location's regional endpoint.
//!
//! # Example
//!
//! ```ignore
//! use ionos_cloud::{ApiClient, ManagedResource, OperationContext, RegionalEndpoints, Timeouts};
//! use ionos_cloud_monitoring::{ENDPOINTS, HttpPipelinesApi, PipelineResource, PipelineSpec};
//!
//! let api = HttpPipelinesApi::new(ApiClient::new(credentials)?);
//! let pipelines = PipelineResource::new(api, RegionalEndpoints::new(ENDPOINTS), Timeouts::default());
//!
//! let spec = PipelineSpec { name: "app-metrics".into() };
//! let state = pipelines.create(&OperationContext::new(), "de/fra", &spec).await?;
//! println!("grafana: {:?}", state.grafana_endpoint);
//! ```

pub mod api;
pub mod model;
pub mod pipeline;

pub use api::{ENDPOINTS, HttpPipelinesApi, PRODUCT, PipelinesApi};
pub use model::{Pipeline, PipelineMetadata, PipelineProperties, PipelineRequest};
pub use pipeline::{KIND, PipelineDataSource, PipelineResource, PipelineSpec, PipelineState};
