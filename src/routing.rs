//! Route table construction.
//!
//! Registration order matters: the main domain group first, then the
//! resource passthrough routes, then the global group shared by every site,
//! and finally one group per site in registry order. Site groups are keyed
//! on a synthetic domain placeholder (`__internal_{name}`) whose constraint
//! is the site's domain pattern, so that each site's routes only match on
//! its own hosts.

use tracing::{debug, info};

use crate::config::MultisiteConfig;
use crate::error::MultisiteResult;
use crate::provider::{Method, RouteDefinition, RouteGroup, RouteParameters, RouteRegistrar};
use crate::registry::TenantRegistry;
use crate::tenant::{Tenant, INTERNAL_PARAMETER_PREFIX};

/// Outcome of a route table build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTableReport {
    /// Ids of sites that received a route group, in registration order.
    pub registered: Vec<u64>,
    /// Ids of sites skipped because they are disabled or have no route file.
    pub skipped: Vec<u64>,
}

/// Registers the whole route table against a [`RouteRegistrar`].
#[derive(Debug, Clone)]
pub struct RouteTableBuilder<'a> {
    config: &'a MultisiteConfig,
}

impl<'a> RouteTableBuilder<'a> {
    /// Create a builder over the given configuration.
    pub fn new(config: &'a MultisiteConfig) -> Self {
        Self { config }
    }

    /// Register every group and route.
    pub fn build(
        &self,
        registry: &TenantRegistry,
        registrar: &mut dyn RouteRegistrar,
    ) -> MultisiteResult<RouteTableReport> {
        registrar.group(self.main_group())?;
        debug!(domain = %self.config.main_domain, "registered main route group");

        for route in resource_routes() {
            registrar.route(route)?;
        }

        registrar.group(self.global_group())?;
        debug!("registered global route group");

        let mut report = RouteTableReport::default();
        for tenant in registry.iter() {
            if !tenant.has_routes(self.config) {
                debug!(site = %tenant.slug(), enabled = tenant.is_enabled(), "skipping site without routes");
                report.skipped.push(tenant.id());
                continue;
            }
            registrar.group(self.site_group(tenant))?;
            debug!(site = %tenant.slug(), pattern = %tenant.domain_pattern(), "registered site route group");
            report.registered.push(tenant.id());
        }

        registrar.on_matched(strip_internal_parameters);
        registrar.refresh_lookups();
        info!(
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            "route table built"
        );
        Ok(report)
    }

    /// Group for the central domain, independent of the site table.
    pub fn main_group(&self) -> RouteGroup {
        RouteGroup {
            middleware: self.config.middleware.clone(),
            domain: Some(self.config.main_domain.clone()),
            name_prefix: Some("main.".to_string()),
            namespace: Some(format!("{}::Main", self.config.route_namespace)),
            constraints: Vec::new(),
            source: self.config.route_file("main"),
        }
    }

    /// Group applied to every site, without a domain constraint.
    pub fn global_group(&self) -> RouteGroup {
        RouteGroup {
            middleware: self.config.middleware.clone(),
            domain: None,
            name_prefix: None,
            namespace: Some(self.config.route_namespace.clone()),
            constraints: Vec::new(),
            source: self.config.route_file("global"),
        }
    }

    /// Group for one site, nested under the global group's attributes.
    pub fn site_group(&self, tenant: &Tenant) -> RouteGroup {
        let parameter = tenant.routing_parameter();
        RouteGroup {
            middleware: self.config.middleware.clone(),
            domain: Some(format!("{{{}}}", parameter)),
            name_prefix: Some(format!("{}.", tenant.route_prefix())),
            namespace: Some(format!("{}::{}", self.config.route_namespace, tenant.namespace())),
            constraints: vec![(parameter, tenant.domain_pattern().to_string())],
            source: tenant.routes_file(self.config),
        }
    }
}

/// Passthrough routes for images, scripts and stylesheets.
///
/// They carry no domain so that `/js/app.js` works on every site without a
/// site segment in the path.
pub fn resource_routes() -> Vec<RouteDefinition> {
    [("img", "image"), ("js", "js"), ("css", "css")]
        .into_iter()
        .map(|(segment, handler)| RouteDefinition {
            method: Method::Get,
            uri: format!("{}/{{path}}", segment),
            name: format!("resource.{}", segment),
            action: format!("ResourceController::{}", handler),
            constraints: vec![("path".to_string(), ".*".to_string())],
        })
        .collect()
}

/// Check whether a parameter name is a synthetic site placeholder.
pub fn is_internal_parameter(name: &str) -> bool {
    name.starts_with(INTERNAL_PARAMETER_PREFIX)
}

/// Remove synthetic site placeholders from matched route parameters.
///
/// Must run on every match before parameters reach a handler.
pub fn strip_internal_parameters(params: &mut RouteParameters) {
    params.retain(|name, _| !is_internal_parameter(name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ParameterFilter;
    use crate::record::TenantRecord;

    #[derive(Default)]
    struct RecordingRegistrar {
        groups: Vec<RouteGroup>,
        routes: Vec<RouteDefinition>,
        filters: Vec<ParameterFilter>,
        refreshed: usize,
    }

    impl RecordingRegistrar {
        fn dispatch(&self, mut params: RouteParameters) -> RouteParameters {
            for filter in &self.filters {
                filter(&mut params);
            }
            params
        }
    }

    impl RouteRegistrar for RecordingRegistrar {
        fn group(&mut self, group: RouteGroup) -> MultisiteResult<()> {
            self.groups.push(group);
            Ok(())
        }

        fn route(&mut self, route: RouteDefinition) -> MultisiteResult<()> {
            self.routes.push(route);
            Ok(())
        }

        fn has(&self, name: &str) -> bool {
            self.routes.iter().any(|r| r.name == name)
        }

        fn on_matched(&mut self, filter: ParameterFilter) {
            self.filters.push(filter);
        }

        fn refresh_lookups(&mut self) {
            self.refreshed += 1;
        }
    }

    #[test]
    fn test_only_enabled_sites_with_route_files_get_groups() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.php"), "").unwrap();
        std::fs::write(dir.path().join("b.php"), "").unwrap();
        let config = MultisiteConfig::new("main.test").with_routes_dir(dir.path());

        let registry = TenantRegistry::from_records(vec![
            TenantRecord::new(1, "A", ["a.test"]),
            TenantRecord::new(2, "B", ["b.test"]).disabled(),
            TenantRecord::new(3, "C", ["c.test"]),
        ])
        .unwrap();

        let mut registrar = RecordingRegistrar::default();
        let report = RouteTableBuilder::new(&config)
            .build(&registry, &mut registrar)
            .unwrap();

        assert_eq!(report.registered, vec![1]);
        assert_eq!(report.skipped, vec![2, 3]);
        assert_eq!(registrar.groups.len(), 3);
        assert_eq!(registrar.groups[2].name_prefix.as_deref(), Some("a."));
        assert_eq!(registrar.refreshed, 1);
    }

    #[test]
    fn test_main_and_global_groups_registered_without_sites() {
        let config = MultisiteConfig::new("auth.test").with_route_namespace("App");
        let registry = TenantRegistry::from_records(Vec::new()).unwrap();

        let mut registrar = RecordingRegistrar::default();
        RouteTableBuilder::new(&config)
            .build(&registry, &mut registrar)
            .unwrap();

        assert_eq!(registrar.groups.len(), 2);
        let main = &registrar.groups[0];
        assert_eq!(main.domain.as_deref(), Some("auth.test"));
        assert_eq!(main.name_prefix.as_deref(), Some("main."));
        assert_eq!(main.namespace.as_deref(), Some("App::Main"));

        let global = &registrar.groups[1];
        assert_eq!(global.domain, None);
        assert_eq!(global.namespace.as_deref(), Some("App"));

        let names: Vec<&str> = registrar.routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["resource.img", "resource.js", "resource.css"]);
        assert!(registrar.has("resource.js"));
    }

    #[test]
    fn test_site_group_uses_internal_placeholder() {
        let config = MultisiteConfig::new("main.test").with_route_namespace("App");
        let registry = TenantRegistry::from_records(vec![TenantRecord::new(
            1,
            "Acme",
            ["acme.test", "acme.example"],
        )])
        .unwrap();
        let tenant = registry.get_by_id(1).unwrap();

        let group = RouteTableBuilder::new(&config).site_group(tenant);
        assert_eq!(group.domain.as_deref(), Some("{__internal_Acme}"));
        assert_eq!(
            group.constraints,
            vec![(
                "__internal_Acme".to_string(),
                r"(acme\.test|acme\.example)".to_string()
            )]
        );
        assert_eq!(group.namespace.as_deref(), Some("App::Acme"));
        assert!(group.source.ends_with("acme.php"));
    }

    #[test]
    fn test_site_groups_follow_load_order() {
        let dir = tempfile::tempdir().unwrap();
        for slug in ["zeta", "alpha"] {
            std::fs::write(dir.path().join(format!("{}.php", slug)), "").unwrap();
        }
        let config = MultisiteConfig::new("main.test").with_routes_dir(dir.path());
        let registry = TenantRegistry::from_records(vec![
            TenantRecord::new(2, "Zeta", ["zeta.test"]),
            TenantRecord::new(1, "Alpha", ["alpha.test"]),
        ])
        .unwrap();

        let mut registrar = RecordingRegistrar::default();
        let report = RouteTableBuilder::new(&config)
            .build(&registry, &mut registrar)
            .unwrap();

        assert_eq!(report.registered, vec![2, 1]);
    }

    #[test]
    fn test_strip_internal_parameters() {
        let mut params = RouteParameters::new();
        params.insert("__internal_Acme".to_string(), "acme.test".to_string());
        params.insert("post".to_string(), "42".to_string());

        strip_internal_parameters(&mut params);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("post").map(String::as_str), Some("42"));
        assert!(!params.keys().any(|k| is_internal_parameter(k)));
    }

    #[test]
    fn test_build_installs_parameter_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("acme.php"), "").unwrap();
        let config = MultisiteConfig::new("main.test").with_routes_dir(dir.path());
        let registry =
            TenantRegistry::from_records(vec![TenantRecord::new(1, "Acme", ["acme.test"])]).unwrap();

        let mut registrar = RecordingRegistrar::default();
        RouteTableBuilder::new(&config)
            .build(&registry, &mut registrar)
            .unwrap();
        assert_eq!(registrar.filters.len(), 1);

        let mut matched = RouteParameters::new();
        matched.insert("__internal_Acme".to_string(), "acme.test".to_string());
        matched.insert("post".to_string(), "42".to_string());

        let params = registrar.dispatch(matched);
        assert!(!params.contains_key("__internal_Acme"));
        assert_eq!(params.get("post").map(String::as_str), Some("42"));
    }
}
