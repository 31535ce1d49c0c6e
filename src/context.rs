//! Current-site resolution.
//!
//! Each inbound request gets its own [`TenantContext`], bound to the site
//! matching the request host. Console and background execution use an
//! unbound context. There is no process-wide "current site" field: the
//! context is passed explicitly, or made available to nested code for the
//! duration of a future with [`scope`].

use std::future::Future;
use std::sync::Arc;

use crate::assets::Markup;
use crate::error::{MultisiteError, MultisiteResult};
use crate::manager::SiteManager;
use crate::provider::{RenderedView, RouteParameters, ViewData};
use crate::tenant::Tenant;

tokio::task_local! {
    static CURRENT_CONTEXT: TenantContext;
}

/// Binding state of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// No current site (console, background jobs).
    Unbound,
    /// Bound to the site with this id for the lifetime of a request.
    Bound(u64),
}

/// Per-request view of the multisite state.
#[derive(Debug, Clone)]
pub struct TenantContext {
    manager: Arc<SiteManager>,
    binding: Binding,
}

impl TenantContext {
    pub(crate) fn bound(manager: Arc<SiteManager>, id: u64) -> Self {
        Self {
            manager,
            binding: Binding::Bound(id),
        }
    }

    pub(crate) fn unbound(manager: Arc<SiteManager>) -> Self {
        Self {
            manager,
            binding: Binding::Unbound,
        }
    }

    /// Whether a site is bound, and which one.
    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// The manager this context was created from.
    pub fn manager(&self) -> &Arc<SiteManager> {
        &self.manager
    }

    /// The current site, `None` when unbound.
    pub fn current(&self) -> Option<&Arc<Tenant>> {
        match self.binding {
            Binding::Unbound => None,
            Binding::Bound(id) => self.manager.registry().get_by_id(id),
        }
    }

    fn require(&self, operation: &'static str) -> MultisiteResult<&Arc<Tenant>> {
        self.current()
            .ok_or(MultisiteError::UnsupportedOperation(operation))
    }
}

/// Operations delegated to the current site.
///
/// Identity accessors return `None` without a current site. Resource
/// operations have no meaningful default and fail with
/// `UnsupportedOperation` instead.
pub trait CurrentSite {
    /// Id of the current site.
    fn site_id(&self) -> Option<u64>;

    /// Slug of the current site.
    fn site_slug(&self) -> Option<&str>;

    /// Tracker id of the current site, empty when not configured.
    fn tracker_id(&self) -> Option<&str>;

    /// Redirect target of the current site, empty when not configured.
    fn redirect(&self) -> Option<&str>;

    /// URL of a route, site-specific when the site overrides it.
    fn route(&self, name: &str, params: &RouteParameters, absolute: bool)
        -> MultisiteResult<String>;

    /// Render a view, site-specific when the site overrides it.
    fn view(&self, name: &str, data: &ViewData) -> MultisiteResult<RenderedView>;

    /// Permission name, site-specific when `exists` reports the prefixed one.
    fn permission(&self, name: &str, exists: &dyn Fn(&str) -> bool) -> MultisiteResult<String>;

    /// Stylesheet tag for the current site.
    fn css(&self) -> MultisiteResult<Markup>;

    /// Script tag for the current site.
    fn js(&self) -> MultisiteResult<Markup>;
}

impl CurrentSite for TenantContext {
    fn site_id(&self) -> Option<u64> {
        self.current().map(|t| t.id())
    }

    fn site_slug(&self) -> Option<&str> {
        self.current().map(|t| t.slug())
    }

    fn tracker_id(&self) -> Option<&str> {
        self.current().map(|t| t.tracker_id())
    }

    fn redirect(&self) -> Option<&str> {
        self.current().map(|t| t.redirect())
    }

    fn route(
        &self,
        name: &str,
        params: &RouteParameters,
        absolute: bool,
    ) -> MultisiteResult<String> {
        self.require("route")?
            .route(self.manager.services(), name, params, absolute)
    }

    fn view(&self, name: &str, data: &ViewData) -> MultisiteResult<RenderedView> {
        self.require("view")?
            .view(self.manager.services(), name, data)
    }

    fn permission(&self, name: &str, exists: &dyn Fn(&str) -> bool) -> MultisiteResult<String> {
        Ok(self.require("permission")?.permission(name, exists))
    }

    fn css(&self) -> MultisiteResult<Markup> {
        self.require("css")?.css(self.manager.manifest())
    }

    fn js(&self) -> MultisiteResult<Markup> {
        self.require("js")?.js(self.manager.manifest())
    }
}

/// Run `future` with `context` available through [`with_current`].
pub async fn scope<F>(context: TenantContext, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_CONTEXT.scope(context, future).await
}

/// Call `f` with the context of the enclosing [`scope`], if any.
pub fn with_current<R>(f: impl FnOnce(Option<&TenantContext>) -> R) -> R {
    let context = CURRENT_CONTEXT.try_with(TenantContext::clone).ok();
    f(context.as_ref())
}

/// Normalise a `Host` header value for domain lookup.
///
/// Trims whitespace, drops the port (bracketed IPv6 hosts keep their
/// brackets), removes one trailing dot and lowercases.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        }
    };
    without_port
        .strip_suffix('.')
        .unwrap_or(without_port)
        .to_lowercase()
}
