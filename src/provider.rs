//! Collaborator traits.
//!
//! The multisite core never talks to an HTTP server, template engine or
//! session backend directly. Each of those is reached through one of the
//! narrow traits below, implemented by the host application.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationResult, MultisiteResult};
use crate::record::TenantRecord;

/// Named parameters passed to URL generation or produced by a route match.
pub type RouteParameters = BTreeMap<String, String>;

/// Filter applied to the parameters of every matched route.
pub type ParameterFilter = fn(&mut RouteParameters);

/// Data handed to a view.
pub type ViewData = serde_json::Map<String, serde_json::Value>;

/// Source of tenant records, read once at startup.
///
/// # Example
///
/// ```rust
/// use multisite::{StaticTenantSource, TenantRecord, TenantSource};
///
/// # async fn example() {
/// let source = StaticTenantSource::new(vec![TenantRecord::new(1, "Acme", ["acme.test"])]);
/// let records = source.get_all().await.unwrap();
/// assert_eq!(records.len(), 1);
/// # }
/// ```
#[async_trait]
pub trait TenantSource: Send + Sync {
    /// Returns every tenant record in load order.
    async fn get_all(&self) -> ConfigurationResult<Vec<TenantRecord>>;
}

/// HTTP method of a single registered route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// GET
    Get,
}

/// One route registered outside of any group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// HTTP method.
    pub method: Method,
    /// URI template, e.g. `js/{path}`.
    pub uri: String,
    /// Route name.
    pub name: String,
    /// Handler reference understood by the registrar.
    pub action: String,
    /// Placeholder constraints as (placeholder, regex).
    pub constraints: Vec<(String, String)>,
}

/// A group of routes sharing attributes, loaded from a route file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteGroup {
    /// Middleware names applied to every route in the group.
    pub middleware: Vec<String>,
    /// Domain template the group is constrained to.
    pub domain: Option<String>,
    /// Prefix prepended to every route name in the group.
    pub name_prefix: Option<String>,
    /// Handler namespace.
    pub namespace: Option<String>,
    /// Placeholder constraints as (placeholder, regex).
    pub constraints: Vec<(String, String)>,
    /// Route definition file for the group.
    pub source: std::path::PathBuf,
}

/// Route registration backend.
pub trait RouteRegistrar {
    /// Register a group of routes.
    fn group(&mut self, group: RouteGroup) -> MultisiteResult<()>;

    /// Register a single route.
    fn route(&mut self, route: RouteDefinition) -> MultisiteResult<()>;

    /// Check whether a route with this name is registered.
    fn has(&self, name: &str) -> bool;

    /// Install a filter to run on the parameters of every matched route,
    /// before they reach the handler.
    fn on_matched(&mut self, filter: ParameterFilter);

    /// Rebuild name and action lookups once registration is complete.
    fn refresh_lookups(&mut self) {}
}

/// Read-only route existence check used during name resolution.
pub trait RouteLookup: Send + Sync + Debug {
    /// Check whether a route with this name is registered.
    fn has_route(&self, name: &str) -> bool;
}

/// URL generation backend.
pub trait UrlGenerator: Send + Sync + Debug {
    /// Generate a URL for a named route.
    ///
    /// Fails with `RouteNotDefined` when the name is unknown.
    fn generate(&self, name: &str, params: &RouteParameters, absolute: bool)
        -> MultisiteResult<String>;
}

/// A rendered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    /// Name of the template that was actually rendered.
    pub name: String,
    /// Rendered output.
    pub body: String,
}

/// Template existence check and rendering backend.
pub trait ViewFactory: Send + Sync + Debug {
    /// Check whether a template exists.
    fn exists(&self, name: &str) -> bool;

    /// Render a template.
    ///
    /// Fails with `ViewNotFound` when the name is unknown.
    fn render(&self, name: &str, data: &ViewData) -> MultisiteResult<RenderedView>;
}

/// Request session backend.
pub trait SessionStore: Send + Sync {
    /// Store a value under a key.
    fn put(&self, key: &str, value: serde_json::Value);

    /// Remove a key.
    fn forget(&self, key: &str);

    /// Check whether a key is present.
    fn has(&self, key: &str) -> bool;
}

/// Collaborators a tenant needs to resolve routes and views.
#[derive(Debug, Clone)]
pub struct Services {
    /// Route existence check.
    pub routes: Arc<dyn RouteLookup>,
    /// URL generation.
    pub urls: Arc<dyn UrlGenerator>,
    /// Template lookup and rendering.
    pub views: Arc<dyn ViewFactory>,
}

impl Services {
    /// Bundle the collaborators.
    pub fn new(
        routes: Arc<dyn RouteLookup>,
        urls: Arc<dyn UrlGenerator>,
        views: Arc<dyn ViewFactory>,
    ) -> Self {
        Self { routes, urls, views }
    }
}
