//! Monitoring API payloads

use ionos_cloud::Observed;
use serde::{Deserialize, Serialize};

/// A monitoring pipeline as returned by the API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Pipeline {
    pub id: String,

    #[serde(default)]
    pub metadata: PipelineMetadata,

    #[serde(default)]
    pub properties: PipelineProperties,
}

impl Observed for Pipeline {
    fn status(&self) -> &str {
        self.metadata.status.as_deref().unwrap_or("UNKNOWN")
    }

    fn status_message(&self) -> Option<&str> {
        self.metadata.status_message.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grafana_endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Ingestion key; only present in the create response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Collection wrapper of `GET /pipelines`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineList {
    #[serde(default)]
    pub items: Vec<Pipeline>,
}

/// Body of `POST /pipelines` and `PUT /pipelines/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRequest {
    pub properties: PipelineRequestProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRequestProperties {
    pub name: String,
}

impl PipelineRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            properties: PipelineRequestProperties { name: name.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ionos_cloud::ResourceStatus;

    #[test]
    fn test_parse_pipeline_list() {
        let body = r#"{
            "id": "pipelines",
            "type": "collection",
            "items": [{
                "id": "2a3c8f0e-0a7d-4b38-9a0c-5f1d9c1e7e11",
                "type": "pipeline",
                "metadata": {
                    "status": "AVAILABLE",
                    "createdDate": "2024-05-02T10:11:12Z",
                    "grafanaEndpoint": "grafana-2a3c.monitoring.de-fra.ionos.com",
                    "httpEndpoint": "2a3c-metrics.monitoring.de-fra.ionos.com"
                },
                "properties": {
                    "name": "app-metrics"
                }
            }]
        }"#;

        let list: PipelineList = serde_json::from_str(body).unwrap();
        assert_eq!(list.items.len(), 1);

        let pipeline = &list.items[0];
        assert_eq!(pipeline.status(), "AVAILABLE");
        assert_eq!(pipeline.resource_status(), ResourceStatus::Available);
        assert_eq!(pipeline.properties.name.as_deref(), Some("app-metrics"));
        assert_eq!(
            pipeline.metadata.grafana_endpoint.as_deref(),
            Some("grafana-2a3c.monitoring.de-fra.ionos.com")
        );
        assert!(pipeline.properties.key.is_none());
    }

    #[test]
    fn test_missing_metadata_is_unknown() {
        let pipeline: Pipeline = serde_json::from_str(r#"{"id": "p-1"}"#).unwrap();
        assert_eq!(pipeline.status(), "UNKNOWN");
        assert_eq!(pipeline.resource_status(), ResourceStatus::Unknown);
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(PipelineRequest::new("app-metrics")).unwrap();
        assert_eq!(body, serde_json::json!({ "properties": { "name": "app-metrics" } }));
    }
}
