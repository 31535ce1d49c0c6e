//! Error types for multisite operations.

use std::path::PathBuf;

use thiserror::Error;

/// Root error type for multisite operations.
#[derive(Error, Debug, Clone)]
pub enum MultisiteError {
    /// The tenant record source or the site configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The request host does not belong to any site.
    #[error("No site matches host: {0}")]
    TenantNotFound(String),

    /// The asset manifest file does not exist.
    #[error("The asset manifest does not exist: {}", .0.display())]
    AssetManifestMissing(PathBuf),

    /// The asset manifest exists but could not be read or parsed.
    #[error("The asset manifest at {} is invalid: {message}", path.display())]
    AssetManifestInvalid {
        /// Manifest location.
        path: PathBuf,
        /// Read or parse failure.
        message: String,
    },

    /// The manifest has no entry for the requested asset.
    #[error("No generated asset exists for key: {0}")]
    AssetNotFound(String),

    /// The operation needs a current site but none is bound.
    #[error("Operation requires a current site: {0}")]
    UnsupportedOperation(&'static str),

    /// The URL generator does not know the route.
    #[error("Route not defined: {0}")]
    RouteNotDefined(String),

    /// The view factory does not know the view.
    #[error("View not found: {0}")]
    ViewNotFound(String),

    /// IO error outside of manifest handling
    #[error("IO error: {0}")]
    Io(String),
}

impl MultisiteError {
    /// Stable machine-readable code for this failure.
    ///
    /// Tenant resolution and asset pipeline failures never share a code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::TenantNotFound(_) => "tenant_not_found",
            Self::AssetManifestMissing(_) => "asset_manifest_missing",
            Self::AssetManifestInvalid { .. } => "asset_manifest_invalid",
            Self::AssetNotFound(_) => "asset_not_found",
            Self::UnsupportedOperation(_) => "unsupported_operation",
            Self::RouteNotDefined(_) => "route_not_defined",
            Self::ViewNotFound(_) => "view_not_found",
            Self::Io(_) => "io_error",
        }
    }

    /// HTTP status a front controller should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TenantNotFound(_) => 404,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for MultisiteError {
    fn from(err: std::io::Error) -> Self {
        MultisiteError::Io(err.to_string())
    }
}

/// Errors detected while loading tenant records.
///
/// These are fatal at startup: a registry is never built from records that
/// produce one of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The record source failed to produce records.
    #[error("Tenant record source failed: {0}")]
    Source(String),

    /// A record carries no domain.
    #[error("Site {id} has no domains")]
    MissingDomains {
        /// Offending record id.
        id: u64,
    },

    /// Two records share an id.
    #[error("Duplicate site id: {0}")]
    DuplicateId(u64),

    /// Two records lowercase to the same slug.
    #[error("Sites {first} and {second} share the slug '{slug}'")]
    DuplicateSlug {
        /// Colliding slug.
        slug: String,
        /// Id of the site registered first.
        first: u64,
        /// Id of the rejected site.
        second: u64,
    },

    /// Two records claim the same literal domain.
    #[error("Domain '{domain}' is claimed by sites {first} and {second}")]
    DuplicateDomain {
        /// Colliding domain.
        domain: String,
        /// Id of the site registered first.
        first: u64,
        /// Id of the rejected site.
        second: u64,
    },

    /// A domain pattern does not compile.
    #[error("Site {id} has an invalid domain pattern '{pattern}': {message}")]
    InvalidDomainPattern {
        /// Offending record id.
        id: u64,
        /// Pattern as configured.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// The multisite configuration itself is invalid.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for multisite operations.
pub type MultisiteResult<T> = Result<T, MultisiteError>;

/// Result type alias for record loading.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
