//! Initialization artifact for external build tooling.

use std::path::Path;

use tracing::debug;

use crate::error::{MultisiteError, MultisiteResult};
use crate::provider::TenantSource;
use crate::record::SitesDocument;

/// Read every record from `source` and write `{ "sites": [...] }` to `path`.
///
/// Parent directories are created. An existing file is replaced.
pub async fn write_sites_artifact(
    source: &dyn TenantSource,
    path: &Path,
) -> MultisiteResult<SitesDocument> {
    let document = SitesDocument {
        sites: source.get_all().await?,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string(&document).map_err(|e| MultisiteError::Io(e.to_string()))?;
    tokio::fs::write(path, json).await?;

    debug!(path = %path.display(), sites = document.sites.len(), "wrote sites artifact");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{JsonTenantSource, StaticTenantSource, TenantRecord};

    #[tokio::test]
    async fn test_artifact_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage/assets/sites.json");
        let source = StaticTenantSource::new(vec![
            TenantRecord::new(1, "Acme", ["acme.test"]).with_tracker_id("GTM-1"),
            TenantRecord::new(2, "Beta", ["beta.test"]).disabled(),
        ]);

        write_sites_artifact(&source, &path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let sites = value["sites"].as_array().unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0]["name"], "Acme");
        assert_eq!(sites[0]["tracker_id"], "GTM-1");
        assert_eq!(sites[1]["enabled"], false);
    }

    #[tokio::test]
    async fn test_artifact_reads_back_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");
        let records = vec![TenantRecord::new(3, "Gamma", ["gamma.test", "gamma.example"])];

        write_sites_artifact(&StaticTenantSource::new(records.clone()), &path)
            .await
            .unwrap();

        assert_eq!(JsonTenantSource::new(&path).get_all().await.unwrap(), records);
    }
}
