//! Object storage management payloads

use ionos_cloud::Observed;
use serde::{Deserialize, Serialize};

/// An access key as returned by the API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AccessKey {
    pub id: String,

    #[serde(default)]
    pub metadata: AccessKeyMetadata,

    #[serde(default)]
    pub properties: AccessKeyProperties,
}

impl Observed for AccessKey {
    fn status(&self) -> &str {
        self.metadata.status.as_deref().unwrap_or("UNKNOWN")
    }

    fn status_message(&self) -> Option<&str> {
        self.metadata.status_message.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Only present in the create response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessKeyList {
    #[serde(default)]
    pub items: Vec<AccessKey>,
}

/// Body of `POST /accesskeys` and `PUT /accesskeys/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessKeyRequest {
    pub properties: AccessKeyRequestProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessKeyRequestProperties {
    pub description: String,
}

impl AccessKeyRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            properties: AccessKeyRequestProperties {
                description: description.into(),
            },
        }
    }
}

/// An object storage region
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Region {
    pub id: String,

    #[serde(default)]
    pub properties: RegionProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionProperties {
    #[serde(default)]
    pub version: Option<i64>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub storage_classes: Vec<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub capability: RegionCapability,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCapability {
    #[serde(default)]
    pub iam: bool,

    #[serde(default)]
    pub s3select: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionList {
    #[serde(default)]
    pub items: Vec<Region>,
}
