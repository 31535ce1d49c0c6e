//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use multisite::prelude::*;
//! ```

// Configuration
pub use crate::config::{Config, FileConfig, MultisiteConfig};

// Sites
pub use crate::record::{JsonTenantSource, StaticTenantSource, TenantRecord};
pub use crate::registry::TenantRegistry;
pub use crate::tenant::Tenant;

// Request handling
pub use crate::context::{Binding, CurrentSite, TenantContext};
pub use crate::manager::SiteManager;

// Collaborators
pub use crate::provider::{
    ParameterFilter, RenderedView, RouteDefinition, RouteGroup, RouteLookup, RouteParameters,
    RouteRegistrar, Services, SessionStore, TenantSource, UrlGenerator, ViewData, ViewFactory,
};

// Errors
pub use crate::error::{ConfigurationError, MultisiteError, MultisiteResult};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
