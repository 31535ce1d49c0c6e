//! Tenant records and the built-in record sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, ConfigurationResult};
use crate::provider::TenantSource;

/// One configured site as stored by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Unique id.
    pub id: u64,
    /// Display name; lowercased it becomes the slug.
    pub name: String,
    /// Domain patterns, at least one.
    pub domains: Vec<String>,
    /// Whether the site serves its own routes.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Tag manager / analytics id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_id: Option<String>,
    /// Redirect target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl TenantRecord {
    /// Create an enabled record.
    pub fn new<I, S>(id: u64, name: impl Into<String>, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            domains: domains.into_iter().map(Into::into).collect(),
            enabled: true,
            tracker_id: None,
            redirect: None,
        }
    }

    /// Mark the record disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the tracker id.
    pub fn with_tracker_id(mut self, tracker_id: impl Into<String>) -> Self {
        self.tracker_id = Some(tracker_id.into());
        self
    }

    /// Set the redirect target.
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

/// Document shape shared by `JsonTenantSource` and the init artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SitesDocument {
    /// Records in load order.
    pub sites: Vec<TenantRecord>,
}

/// In-memory record source.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantSource {
    records: Vec<TenantRecord>,
}

impl StaticTenantSource {
    /// Create a source serving the given records.
    pub fn new(records: Vec<TenantRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl TenantSource for StaticTenantSource {
    async fn get_all(&self) -> ConfigurationResult<Vec<TenantRecord>> {
        Ok(self.records.clone())
    }
}

/// Record source backed by a `{ "sites": [...] }` JSON file.
#[derive(Debug, Clone)]
pub struct JsonTenantSource {
    path: PathBuf,
}

impl JsonTenantSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TenantSource for JsonTenantSource {
    async fn get_all(&self) -> ConfigurationResult<Vec<TenantRecord>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ConfigurationError::Source(format!("{}: {}", self.path.display(), e))
        })?;
        let document: SitesDocument = serde_json::from_str(&raw).map_err(|e| {
            ConfigurationError::Source(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), count = document.sites.len(), "read tenant records");
        Ok(document.sites)
    }
}
