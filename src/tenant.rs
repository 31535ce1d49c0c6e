//! A single site and its site-specific resource resolution.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::assets::{AssetManifest, Markup};
use crate::config::MultisiteConfig;
use crate::error::{ConfigurationError, ConfigurationResult, MultisiteResult};
use crate::fallback::{resolve, ResourceKind};
use crate::provider::{RenderedView, RouteParameters, Services, ViewData};
use crate::record::TenantRecord;

/// Prefix of the synthetic domain placeholder each site group is keyed on.
pub const INTERNAL_PARAMETER_PREFIX: &str = "__internal_";

/// One site, built from a [`TenantRecord`].
///
/// The slug is the lowercased name and namespaces route names, views,
/// permissions and the storage disk.
#[derive(Debug, Clone)]
pub struct Tenant {
    id: u64,
    name: String,
    slug: String,
    domains: Vec<String>,
    enabled: bool,
    tracker_id: Option<String>,
    redirect: Option<String>,
    pattern: String,
    matcher: Regex,
}

impl Tenant {
    /// Build a tenant from its record.
    ///
    /// Fails when the record has no domains or a domain pattern is not a
    /// valid regular expression.
    pub fn from_record(record: TenantRecord) -> ConfigurationResult<Self> {
        if record.domains.is_empty() {
            return Err(ConfigurationError::MissingDomains { id: record.id });
        }

        let parts: Vec<String> = record.domains.iter().map(|d| domain_regex(d.as_str())).collect();
        let pattern = if parts.len() == 1 {
            parts[0].clone()
        } else {
            format!("({})", parts.join("|"))
        };
        let matcher = Regex::new(&format!("(?i)^(?:{})$", pattern)).map_err(|e| {
            ConfigurationError::InvalidDomainPattern {
                id: record.id,
                pattern: record.domains.join(", "),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            id: record.id,
            slug: record.name.to_lowercase(),
            name: record.name,
            domains: record.domains,
            enabled: record.enabled,
            tracker_id: record.tracker_id,
            redirect: record.redirect,
            pattern,
            matcher,
        })
    }

    /// Unique site id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handler namespace of the site's route group.
    pub fn namespace(&self) -> &str {
        &self.name
    }

    /// Lowercased name.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Configured domains, literal host names or patterns.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// The first configured domain.
    pub fn domain(&self) -> &str {
        // from_record guarantees at least one domain
        self.domains.first().map(String::as_str).unwrap_or_default()
    }

    /// Tracker id, empty when not configured.
    pub fn tracker_id(&self) -> &str {
        self.tracker_id.as_deref().unwrap_or_default()
    }

    /// Redirect target, empty when not configured.
    pub fn redirect(&self) -> &str {
        self.redirect.as_deref().unwrap_or_default()
    }

    /// Whether the site is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Prefix of site-specific route names.
    pub fn route_prefix(&self) -> &str {
        &self.slug
    }

    /// Prefix of site-specific views and asset paths.
    pub fn view_prefix(&self) -> &str {
        &self.slug
    }

    /// Prefix of site-specific permissions.
    pub fn permission_prefix(&self) -> &str {
        &self.slug
    }

    /// Site-specific name of a route.
    pub fn site_specific_route(&self, route: &str) -> String {
        ResourceKind::Route.candidate(self.route_prefix(), route)
    }

    /// Site-specific name of a view.
    pub fn site_specific_view(&self, view: &str) -> String {
        ResourceKind::View.candidate(self.view_prefix(), view)
    }

    /// Regex the site's route group constrains its domain placeholder to.
    ///
    /// A single domain yields its own pattern, several domains yield an
    /// alternation `(a|b)`. Plain host names are escaped.
    pub fn domain_pattern(&self) -> &str {
        &self.pattern
    }

    /// Name of the synthetic domain placeholder for this site's group.
    pub fn routing_parameter(&self) -> String {
        format!("{}{}", INTERNAL_PARAMETER_PREFIX, self.name)
    }

    /// Check whether a normalised host belongs to this site.
    pub fn matches_host(&self, host: &str) -> bool {
        self.matcher.is_match(host)
    }

    /// Domains that are plain host names rather than patterns, lowercased.
    pub(crate) fn literal_domains(&self) -> impl Iterator<Item = String> + '_ {
        self.domains
            .iter()
            .filter(|d| is_literal_domain(d))
            .map(|d| d.to_lowercase())
    }

    /// Whether any domain is a pattern rather than a plain host name.
    pub(crate) fn has_pattern_domains(&self) -> bool {
        self.domains.iter().any(|d| !is_literal_domain(d))
    }

    /// Route definition file for this site.
    pub fn routes_file(&self, config: &MultisiteConfig) -> PathBuf {
        config.route_file(self.route_prefix())
    }

    /// Whether the site should get a route group: it must be enabled and
    /// have a route file.
    pub fn has_routes(&self, config: &MultisiteConfig) -> bool {
        self.enabled && self.routes_file(config).is_file()
    }

    /// Root directory of the site's storage disk.
    pub fn storage_root(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.slug)
    }

    /// Resolve a resource name to its site-specific variant if one exists.
    pub fn resolve_name<F>(&self, kind: ResourceKind, name: &str, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        resolve(kind, &self.slug, name, exists).into_owned()
    }

    /// URL of the site-specific route, or of the shared route if the site
    /// does not override it.
    pub fn route(
        &self,
        services: &Services,
        name: &str,
        params: &RouteParameters,
        absolute: bool,
    ) -> MultisiteResult<String> {
        let resolved = self.resolve_name(ResourceKind::Route, name, |n| services.routes.has_route(n));
        services.urls.generate(&resolved, params, absolute)
    }

    /// Render the site-specific view, or the shared view if the site does
    /// not override it.
    pub fn view(
        &self,
        services: &Services,
        name: &str,
        data: &ViewData,
    ) -> MultisiteResult<RenderedView> {
        let resolved = self.resolve_name(ResourceKind::View, name, |n| services.views.exists(n));
        services.views.render(&resolved, data)
    }

    /// Site-specific permission name, or the shared one.
    pub fn permission<F>(&self, name: &str, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        self.resolve_name(ResourceKind::Permission, name, exists)
    }

    /// Stylesheet tag for the site's compiled `app.css`.
    pub fn css(&self, manifest: &AssetManifest) -> MultisiteResult<Markup> {
        let href = manifest.resolve(&format!("{}/css/app.css", self.view_prefix()))?;
        Ok(Markup::style(&href))
    }

    /// Script tag for the site's compiled `app.js`.
    pub fn js(&self, manifest: &AssetManifest) -> MultisiteResult<Markup> {
        let src = manifest.resolve(&format!("{}/js/app.js", self.view_prefix()))?;
        Ok(Markup::script(&src))
    }
}

fn is_literal_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

fn domain_regex(domain: &str) -> String {
    if is_literal_domain(domain) {
        regex::escape(domain)
    } else {
        domain.to_string()
    }
}
