//! Location to endpoint resolution
//!
//! Each product has a static table from location code (`de/fra`, `es/vit`,
//! ...) to base URL. A configured override URL replaces the table lookup.
//! The resolved [`Endpoint`] travels with every request; the shared
//! HTTP client itself is never reconfigured per region.

use crate::error::{CloudError, Result};

/// Base URL selected for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Location the URL was chosen for (empty for global products)
    pub location: String,

    /// Base URL without trailing slash
    pub base_url: String,
}

impl Endpoint {
    pub fn new(location: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Join a path such as `/pipelines/{id}` onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Static location table for one product
#[derive(Debug, Clone, Copy)]
pub struct EndpointTable {
    /// Product name used in errors
    pub product: &'static str,

    /// Location used when none is given
    pub default_location: &'static str,

    /// `(location, base URL)` pairs
    pub entries: &'static [(&'static str, &'static str)],
}

impl EndpointTable {
    /// Resolve with an explicit override (`None` or empty means no override)
    pub fn resolve_with(&self, location: &str, override_url: Option<&str>) -> Result<Endpoint> {
        let location = if location.trim().is_empty() {
            self.default_location
        } else {
            location.trim()
        };

        if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
            tracing::debug!(product = self.product, url, "Using endpoint override");
            return Ok(Endpoint::new(location, normalize_url(url)));
        }

        self.entries
            .iter()
            .find(|(loc, _)| *loc == location)
            .map(|(loc, url)| Endpoint::new(*loc, *url))
            .ok_or_else(|| CloudError::UnknownLocation {
                product: self.product,
                location: location.to_string(),
                known: self.locations().join(", "),
            })
    }

    pub fn locations(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(loc, _)| *loc).collect()
    }
}

/// A product's location table plus an optional override, resolved per request
#[derive(Debug, Clone)]
pub struct RegionalEndpoints {
    table: EndpointTable,
    override_url: Option<String>,
}

impl RegionalEndpoints {
    /// Table only
    pub fn new(table: EndpointTable) -> Self {
        Self {
            table,
            override_url: None,
        }
    }

    pub fn with_override(mut self, url: Option<String>) -> Self {
        self.override_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn product(&self) -> &'static str {
        self.table.product
    }

    pub fn resolve(&self, location: &str) -> Result<Endpoint> {
        self.table
            .resolve_with(location, self.override_url.as_deref())
    }
}

/// Endpoint for a product that has a single global URL
#[derive(Debug, Clone, Copy)]
pub struct GlobalEndpoint {
    pub product: &'static str,
    pub url: &'static str,
}

impl GlobalEndpoint {
    pub fn resolve_with(&self, override_url: Option<&str>) -> Endpoint {
        match override_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Endpoint::new("", normalize_url(url)),
            None => Endpoint::new("", self.url),
        }
    }
}

/// Accept overrides given without a scheme (`api.example.com`)
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
