//! Configuration for the multisite layer.
//!
//! `MultisiteConfig` carries everything the route table builder, the asset
//! resolver and the init artifact writer need to locate files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, MultisiteError, MultisiteResult};

/// Base trait for configuration types.
pub trait Config: Send + Sync {
    /// Returns the configuration name/identifier.
    fn name(&self) -> &str {
        "default"
    }

    /// Validates the configuration.
    ///
    /// Returns Ok(()) if valid, or the reason it is not.
    fn validate(&self) -> Result<(), ConfigurationError> {
        Ok(())
    }
}

/// Trait for configurations that support file-based loading.
pub trait FileConfig: Config {
    /// Load configuration from a file path.
    fn from_file(path: &Path) -> MultisiteResult<Self>
    where
        Self: Sized;

    /// Save configuration to a file path.
    fn to_file(&self, path: &Path) -> MultisiteResult<()>;
}

/// Settings shared by every site.
///
/// # Example
///
/// ```rust
/// use multisite::{Config, MultisiteConfig};
///
/// let config = MultisiteConfig::new("auth.example.test")
///     .with_routes_dir("routes")
///     .with_assets_dir("public");
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.manifest_path().to_str(), Some("public/mix-manifest.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultisiteConfig {
    /// Domain of the central site (authentication and cross-site concerns).
    pub main_domain: String,
    /// Handler namespace for site route groups.
    pub route_namespace: String,
    /// Directory holding `main`, `global` and per-site route files.
    pub routes_dir: PathBuf,
    /// Extension of route files, without the dot.
    pub route_extension: String,
    /// Directory holding the asset manifest.
    pub assets_dir: PathBuf,
    /// Manifest file name inside `assets_dir`.
    pub manifest_file: String,
    /// Root of per-site storage disks.
    pub storage_dir: PathBuf,
    /// Where the init artifact is written.
    pub artifact_path: PathBuf,
    /// Middleware applied to the main and global groups.
    pub middleware: Vec<String>,
}

impl Default for MultisiteConfig {
    fn default() -> Self {
        Self {
            main_domain: "localhost".to_string(),
            route_namespace: "App::Http::Controllers".to_string(),
            routes_dir: PathBuf::from("routes"),
            route_extension: "php".to_string(),
            assets_dir: PathBuf::from("public"),
            manifest_file: "mix-manifest.json".to_string(),
            storage_dir: PathBuf::from("storage/app/sites"),
            artifact_path: PathBuf::from("storage/assets/sites.json"),
            middleware: vec!["nexus".to_string(), "web".to_string()],
        }
    }
}

impl MultisiteConfig {
    /// Create a configuration for the given main domain with default paths.
    pub fn new(main_domain: impl Into<String>) -> Self {
        Self {
            main_domain: main_domain.into(),
            ..Self::default()
        }
    }

    /// Set the route handler namespace.
    pub fn with_route_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.route_namespace = namespace.into();
        self
    }

    /// Set the routes directory.
    pub fn with_routes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.routes_dir = dir.into();
        self
    }

    /// Set the route file extension.
    pub fn with_route_extension(mut self, ext: impl Into<String>) -> Self {
        self.route_extension = ext.into();
        self
    }

    /// Set the assets directory.
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Set the storage root.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Set the init artifact path.
    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    /// Set the middleware list for the main and global groups.
    pub fn with_middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = middleware.into_iter().map(Into::into).collect();
        self
    }

    /// Path of the route file with the given stem, e.g. `main` or a site slug.
    pub fn route_file(&self, stem: &str) -> PathBuf {
        self.routes_dir.join(format!("{}.{}", stem, self.route_extension))
    }

    /// Full path of the asset manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.assets_dir.join(&self.manifest_file)
    }
}

impl Config for MultisiteConfig {
    fn name(&self) -> &str {
        &self.main_domain
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.main_domain.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "main_domain must not be empty".to_string(),
            ));
        }
        if self.route_namespace.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "route_namespace must not be empty".to_string(),
            ));
        }
        if self.route_extension.starts_with('.') {
            return Err(ConfigurationError::Invalid(
                "route_extension must not start with a dot".to_string(),
            ));
        }
        Ok(())
    }
}

impl FileConfig for MultisiteConfig {
    fn from_file(path: &Path) -> MultisiteResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            ConfigurationError::Invalid(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn to_file(&self, path: &Path) -> MultisiteResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MultisiteError::Io(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }
}
