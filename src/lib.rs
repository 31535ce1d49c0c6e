//! # Multisite
//!
//! **Multisite** serves many logical sites from one deployment. Each site is
//! identified by its domain and may override routes, views and assets of the
//! shared application.
//!
//! ## Overview
//!
//! - **Registry**: sites loaded once at startup, indexed by id, slug and domain
//! - **Context**: one binding per request to the site matching the `Host`
//! - **Fallback**: `{slug}.{name}` when the site defines it, `{name}` otherwise
//! - **Route table**: main group, resource routes, global group, then one
//!   group per site constrained to that site's domains
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use multisite::prelude::*;
//!
//! let source = JsonTenantSource::new("config/sites.json");
//! let manager = SiteManager::boot(config, &source, services).await?;
//! manager.register_routes(&mut router)?;
//!
//! // per request
//! let context = manager.enter(request_host)?;
//! let url = context.route("home", &RouteParameters::new(), true)?;
//! ```

mod assets;
mod config;
mod error;
mod fallback;
mod init;
mod manager;
mod provider;
mod record;
mod registry;
mod routing;
mod session;
mod tenant;
pub mod context;

pub mod prelude;

pub use assets::{strip_version_segment, AssetManifest, Markup};
pub use config::{Config, FileConfig, MultisiteConfig};
pub use context::{Binding, CurrentSite, TenantContext};
pub use error::{ConfigurationError, ConfigurationResult, MultisiteError, MultisiteResult};
pub use fallback::{resolve, ResourceKind};
pub use init::write_sites_artifact;
pub use manager::{SiteManager, StorageDisk};
pub use provider::{
    Method, ParameterFilter, RenderedView, RouteDefinition, RouteGroup, RouteLookup, RouteParameters,
    RouteRegistrar, Services, SessionStore, TenantSource, UrlGenerator, ViewData, ViewFactory,
};
pub use record::{JsonTenantSource, SitesDocument, StaticTenantSource, TenantRecord};
pub use registry::TenantRegistry;
pub use routing::{
    is_internal_parameter, resource_routes, strip_internal_parameters, RouteTableBuilder,
    RouteTableReport,
};
pub use session::{Impersonation, IMPERSONATION_KEY};
pub use tenant::{Tenant, INTERNAL_PARAMETER_PREFIX};

// Re-export async-trait for implementors of TenantSource
pub use async_trait::async_trait;
