//! Registry of configured sites.
//!
//! The `TenantRegistry` is built once from a [`TenantSource`] and is
//! read-only afterwards, so it can be shared between request handlers
//! behind an `Arc` without locking.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::context::normalize_host;
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::provider::TenantSource;
use crate::record::TenantRecord;
use crate::tenant::Tenant;

/// Sites indexed by id, slug and domain.
///
/// # Example
///
/// ```rust
/// use multisite::{TenantRecord, TenantRegistry};
///
/// let registry = TenantRegistry::from_records(vec![
///     TenantRecord::new(1, "Acme", ["acme.test", "www.acme.test"]),
///     TenantRecord::new(2, "Beta", ["beta.test"]),
/// ])
/// .unwrap();
///
/// assert_eq!(registry.get_by_domain("www.acme.test").map(|t| t.id()), Some(1));
/// assert_eq!(registry.get_by_slug("beta").map(|t| t.id()), Some(2));
/// assert!(registry.get_by_id(3).is_none());
/// ```
#[derive(Debug, Default)]
pub struct TenantRegistry {
    tenants: Vec<Arc<Tenant>>,
    by_id: HashMap<u64, usize>,
    by_slug: HashMap<String, usize>,
    by_domain: HashMap<String, usize>,
    patterned: Vec<usize>,
}

impl TenantRegistry {
    /// Read every record from `source` and build the registry.
    pub async fn load(source: &dyn TenantSource) -> ConfigurationResult<Self> {
        let records = source.get_all().await?;
        Self::from_records(records)
    }

    /// Build the registry from records in load order.
    ///
    /// Fails on a record without domains, an invalid domain pattern, or an
    /// id, slug or literal domain that an earlier record already uses.
    pub fn from_records(records: Vec<TenantRecord>) -> ConfigurationResult<Self> {
        let mut registry = Self::default();
        for record in records {
            registry.insert(Tenant::from_record(record)?)?;
        }
        info!(sites = registry.len(), "site registry loaded");
        Ok(registry)
    }

    fn insert(&mut self, tenant: Tenant) -> ConfigurationResult<()> {
        let index = self.tenants.len();

        if self.by_id.contains_key(&tenant.id()) {
            return Err(ConfigurationError::DuplicateId(tenant.id()));
        }
        if let Some(&existing) = self.by_slug.get(tenant.slug()) {
            return Err(ConfigurationError::DuplicateSlug {
                slug: tenant.slug().to_string(),
                first: self.tenants[existing].id(),
                second: tenant.id(),
            });
        }
        let domains: Vec<String> = tenant.literal_domains().collect();
        for domain in &domains {
            if let Some(&existing) = self.by_domain.get(domain) {
                return Err(ConfigurationError::DuplicateDomain {
                    domain: domain.clone(),
                    first: self.tenants[existing].id(),
                    second: tenant.id(),
                });
            }
        }

        debug!(site = %tenant.slug(), id = tenant.id(), domains = ?tenant.domains(), "registered site");

        self.by_id.insert(tenant.id(), index);
        self.by_slug.insert(tenant.slug().to_string(), index);
        for domain in domains {
            self.by_domain.entry(domain).or_insert(index);
        }
        if tenant.has_pattern_domains() {
            self.patterned.push(index);
        }
        self.tenants.push(Arc::new(tenant));
        Ok(())
    }

    /// Find the site serving `host`.
    ///
    /// `host` is normalised first, so case, a port and a trailing dot do not
    /// matter. Literal domains are looked up directly; pattern domains are
    /// tried in load order. When several sites match, the earliest loaded
    /// one wins.
    pub fn get_by_domain(&self, host: &str) -> Option<&Arc<Tenant>> {
        let host = normalize_host(host);
        let literal = self.by_domain.get(&host).copied();
        let patterned = self
            .patterned
            .iter()
            .copied()
            .take_while(|&i| literal.map_or(true, |l| i < l))
            .find(|&i| self.tenants[i].matches_host(&host));

        patterned.or(literal).map(|i| &self.tenants[i])
    }

    /// Find a site by slug.
    pub fn get_by_slug(&self, slug: &str) -> Option<&Arc<Tenant>> {
        self.by_slug.get(slug).map(|&i| &self.tenants[i])
    }

    /// Find a site by id.
    pub fn get_by_id(&self, id: u64) -> Option<&Arc<Tenant>> {
        self.by_id.get(&id).map(|&i| &self.tenants[i])
    }

    /// All sites in load order.
    pub fn all(&self) -> &[Arc<Tenant>] {
        &self.tenants
    }

    /// Iterate over all sites in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tenant>> {
        self.tenants.iter()
    }

    /// Get the number of sites.
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StaticTenantSource;

    fn sample() -> TenantRegistry {
        TenantRegistry::from_records(vec![
            TenantRecord::new(10, "Acme", ["acme.test"]),
            TenantRecord::new(20, "Beta", ["beta.test", "beta.example"]),
            TenantRecord::new(30, "Gamma", [r"[a-z]+\.gamma\.test"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_registry_lookups() {
        let registry = sample();

        assert_eq!(registry.get_by_id(20).unwrap().slug(), "beta");
        assert_eq!(registry.get_by_slug("acme").unwrap().id(), 10);
        assert_eq!(registry.get_by_domain("beta.example").unwrap().id(), 20);
        assert_eq!(registry.get_by_domain("shop.gamma.test").unwrap().id(), 30);

        assert!(registry.get_by_id(99).is_none());
        assert!(registry.get_by_slug("Acme").is_none());
        assert!(registry.get_by_domain("unknown.test").is_none());
    }

    #[test]
    fn test_domain_lookup_ignores_case() {
        let registry = TenantRegistry::from_records(vec![
            TenantRecord::new(1, "Acme", ["acme.test"]),
            TenantRecord::new(2, "Shop", [r"[a-z]+\.shop\.test"]),
        ])
        .unwrap();

        assert_eq!(registry.get_by_domain("ACME.Test").unwrap().id(), 1);
        assert_eq!(registry.get_by_domain("Acme.test:8080").unwrap().id(), 1);
        assert_eq!(registry.get_by_domain("SHOP.Shop.Test").unwrap().id(), 2);
        assert!(registry.get_by_domain("ACME.Other").is_none());
    }

    #[test]
    fn test_registry_preserves_load_order() {
        let registry = sample();
        let ids: Vec<u64> = registry.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_earliest_site_wins_on_overlap() {
        let registry = TenantRegistry::from_records(vec![
            TenantRecord::new(1, "Wild", [r".*\.shared\.test"]),
            TenantRecord::new(2, "Exact", ["www.shared.test"]),
        ])
        .unwrap();

        assert_eq!(registry.get_by_domain("www.shared.test").unwrap().id(), 1);

        let registry = TenantRegistry::from_records(vec![
            TenantRecord::new(2, "Exact", ["www.shared.test"]),
            TenantRecord::new(1, "Wild", [r".*\.shared\.test"]),
        ])
        .unwrap();

        assert_eq!(registry.get_by_domain("www.shared.test").unwrap().id(), 2);
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let err = TenantRegistry::from_records(vec![
            TenantRecord::new(1, "Acme", ["acme.test"]),
            TenantRecord::new(2, "ACME", ["acme.example"]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::DuplicateSlug {
                slug: "acme".to_string(),
                first: 1,
                second: 2,
            }
        );
    }

    #[test]
    fn test_duplicate_id_and_domain_rejected() {
        let err = TenantRegistry::from_records(vec![
            TenantRecord::new(1, "Acme", ["acme.test"]),
            TenantRecord::new(1, "Beta", ["beta.test"]),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateId(1));

        let err = TenantRegistry::from_records(vec![
            TenantRecord::new(1, "Acme", ["acme.test"]),
            TenantRecord::new(2, "Beta", ["ACME.test"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateDomain { first: 1, second: 2, .. }));
    }

    #[test]
    fn test_record_without_domains_rejected() {
        let err = TenantRegistry::from_records(vec![TenantRecord::new(
            5,
            "Nowhere",
            Vec::<String>::new(),
        )])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::MissingDomains { id: 5 });
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = StaticTenantSource::new(vec![TenantRecord::new(1, "Acme", ["acme.test"])]);
        let registry = TenantRegistry::load(&source).await.unwrap();
        assert_eq!(registry.all().len(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = TenantRegistry::from_records(Vec::new()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get_by_domain("acme.test").is_none());
    }
}
