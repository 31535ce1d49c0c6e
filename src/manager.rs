//! Site manager facade.
//!
//! `SiteManager` owns everything that is built once at startup: the
//! configuration, the site registry, the collaborator bundle and the asset
//! manifest. It is shared behind an `Arc` and hands out one
//! [`TenantContext`] per request.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assets::AssetManifest;
use crate::config::{Config, MultisiteConfig};
use crate::context::{normalize_host, TenantContext};
use crate::error::{MultisiteError, MultisiteResult};
use crate::init::write_sites_artifact;
use crate::provider::{RouteRegistrar, Services, TenantSource};
use crate::record::SitesDocument;
use crate::registry::TenantRegistry;
use crate::routing::{RouteTableBuilder, RouteTableReport};

/// Local storage disk of one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDisk {
    /// Disk name, the site slug.
    pub name: String,
    /// Storage driver.
    pub driver: &'static str,
    /// Root directory.
    pub root: PathBuf,
}

/// Process-wide, read-only multisite state.
#[derive(Debug)]
pub struct SiteManager {
    config: MultisiteConfig,
    registry: TenantRegistry,
    services: Services,
    manifest: AssetManifest,
}

impl SiteManager {
    /// Validate the configuration, load every site from `source` and
    /// assemble the manager.
    pub async fn boot(
        config: MultisiteConfig,
        source: &dyn TenantSource,
        services: Services,
    ) -> MultisiteResult<Arc<Self>> {
        let registry = TenantRegistry::load(source).await?;
        Ok(Arc::new(Self::new(config, registry, services)?))
    }

    /// Assemble a manager from an already built registry.
    pub fn new(
        config: MultisiteConfig,
        registry: TenantRegistry,
        services: Services,
    ) -> MultisiteResult<Self> {
        config.validate()?;
        let manifest = AssetManifest::new(config.manifest_path());
        Ok(Self {
            config,
            registry,
            services,
            manifest,
        })
    }

    /// Shared configuration.
    pub fn config(&self) -> &MultisiteConfig {
        &self.config
    }

    /// Loaded sites.
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Route, URL and view collaborators.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Asset manifest, read on first use.
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Register the main, resource, global and per-site routes.
    pub fn register_routes(
        &self,
        registrar: &mut dyn RouteRegistrar,
    ) -> MultisiteResult<RouteTableReport> {
        RouteTableBuilder::new(&self.config).build(&self.registry, registrar)
    }

    /// Bind the site serving `host` for the lifetime of one request.
    ///
    /// Fails with `TenantNotFound` when no site matches; the request must
    /// be rejected rather than served by a default site.
    pub fn enter(self: &Arc<Self>, host: &str) -> MultisiteResult<TenantContext> {
        let normalized = normalize_host(host);
        match self.registry.get_by_domain(&normalized) {
            Some(tenant) => {
                debug!(host = %normalized, site = %tenant.slug(), "bound request to site");
                Ok(TenantContext::bound(Arc::clone(self), tenant.id()))
            }
            None => {
                warn!(host = %normalized, "no site matches request host");
                Err(MultisiteError::TenantNotFound(normalized))
            }
        }
    }

    /// Context for console and background execution, with no current site.
    pub fn detached(self: &Arc<Self>) -> TenantContext {
        TenantContext::unbound(Arc::clone(self))
    }

    /// One local storage disk per site, named by slug.
    pub fn storage_disks(&self) -> Vec<StorageDisk> {
        self.registry
            .iter()
            .map(|tenant| StorageDisk {
                name: tenant.slug().to_string(),
                driver: "local",
                root: tenant.storage_root(&self.config.storage_dir),
            })
            .collect()
    }

    /// Write the `{ "sites": [...] }` artifact to the configured path.
    pub async fn initialize(&self, source: &dyn TenantSource) -> MultisiteResult<SitesDocument> {
        let document = write_sites_artifact(source, &self.config.artifact_path).await?;
        info!(path = %self.config.artifact_path.display(), sites = document.sites.len(), "multisite initialized");
        Ok(document)
    }
}
