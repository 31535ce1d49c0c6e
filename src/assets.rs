//! Fingerprinted asset lookup.
//!
//! The build pipeline writes a JSON manifest mapping source paths such as
//! `/acme/css/app.css` to versioned output paths such as
//! `/acme/css/abc123/app.css`. The manifest is read on first use and held in
//! memory afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{MultisiteError, MultisiteResult};

/// HTML fragment ready to be embedded in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// The fragment as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stylesheet link tag.
    pub fn style(href: &str) -> Self {
        Markup(format!(
            r#"<link media="all" type="text/css" rel="stylesheet" href="{}">"#,
            escape_attribute(href)
        ))
    }

    /// Script tag.
    pub fn script(src: &str) -> Self {
        Markup(format!(r#"<script src="{}"></script>"#, escape_attribute(src)))
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lazily loaded asset manifest.
#[derive(Debug)]
pub struct AssetManifest {
    path: PathBuf,
    entries: OnceCell<HashMap<String, String>>,
}

impl AssetManifest {
    /// Create a manifest reader for the given file. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: OnceCell::new(),
        }
    }

    /// Location of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a source path to the path to embed in markup.
    ///
    /// A missing leading `/` is added before lookup. The key must match
    /// exactly. The version directory of the output path is stripped.
    pub fn resolve(&self, path: &str) -> MultisiteResult<String> {
        let key = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let entries = self.entries()?;
        let output = entries
            .get(&key)
            .ok_or_else(|| MultisiteError::AssetNotFound(key.clone()))?;

        Ok(strip_version_segment(output))
    }

    fn entries(&self) -> MultisiteResult<&HashMap<String, String>> {
        self.entries.get_or_try_init(|| {
            if !self.path.is_file() {
                return Err(MultisiteError::AssetManifestMissing(self.path.clone()));
            }
            let raw = std::fs::read_to_string(&self.path).map_err(|e| {
                MultisiteError::AssetManifestInvalid {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
            })?;
            let entries: HashMap<String, String> =
                serde_json::from_str(&raw).map_err(|e| MultisiteError::AssetManifestInvalid {
                    path: self.path.clone(),
                    message: e.to_string(),
                })?;
            debug!(path = %self.path.display(), entries = entries.len(), "loaded asset manifest");
            Ok(entries)
        })
    }
}

/// Remove the version directory from a manifest output path.
///
/// The version directory is the segment directly before the file name:
/// `/acme/css/abc123/app.css` becomes `/acme/css/app.css`. A path with no
/// directory segment is returned unchanged.
pub fn strip_version_segment(output: &str) -> String {
    let mut segments: Vec<&str> = output.split('/').collect();
    let first_real = usize::from(output.starts_with('/'));
    if segments.len() < first_real + 2 {
        return output.to_string();
    }
    segments.remove(segments.len() - 2);
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(contents: &str) -> (tempfile::TempDir, AssetManifest) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix-manifest.json");
        std::fs::write(&path, contents).unwrap();
        (dir, AssetManifest::new(path))
    }

    #[test]
    fn test_strip_version_segment() {
        assert_eq!(strip_version_segment("/acme/css/abc123/app.css"), "/acme/css/app.css");
        assert_eq!(strip_version_segment("/v1/app.js"), "/app.js");
        assert_eq!(strip_version_segment("/app.js"), "/app.js");
        assert_eq!(strip_version_segment("acme/v2/app.js"), "acme/app.js");
    }

    #[test]
    fn test_resolve_adds_leading_separator() {
        let (_dir, manifest) =
            manifest_with(r#"{ "/acme/css/app.css": "/acme/css/abc123/app.css" }"#);

        assert_eq!(manifest.resolve("acme/css/app.css").unwrap(), "/acme/css/app.css");
        assert_eq!(manifest.resolve("/acme/css/app.css").unwrap(), "/acme/css/app.css");
    }

    #[test]
    fn test_resolve_requires_exact_key() {
        let (_dir, manifest) =
            manifest_with(r#"{ "/acme/css/app.css": "/acme/css/abc123/app.css" }"#);

        let err = manifest.resolve("/acme/css/app").unwrap_err();
        assert!(matches!(err, MultisiteError::AssetNotFound(ref k) if k == "/acme/css/app"));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = AssetManifest::new(dir.path().join("mix-manifest.json"));

        let err = manifest.resolve("/acme/js/app.js").unwrap_err();
        assert_eq!(err.code(), "asset_manifest_missing");
    }

    #[test]
    fn test_manifest_is_cached_after_first_read() {
        let (dir, manifest) = manifest_with(r#"{ "/a/js/app.js": "/a/js/v1/app.js" }"#);
        assert_eq!(manifest.resolve("/a/js/app.js").unwrap(), "/a/js/app.js");

        std::fs::remove_file(dir.path().join("mix-manifest.json")).unwrap();
        assert_eq!(manifest.resolve("/a/js/app.js").unwrap(), "/a/js/app.js");
    }

    #[test]
    fn test_invalid_manifest() {
        let (_dir, manifest) = manifest_with("[1, 2");
        let err = manifest.resolve("/a/js/app.js").unwrap_err();
        assert_eq!(err.code(), "asset_manifest_invalid");
    }

    #[test]
    fn test_markup_escapes_attributes() {
        assert_eq!(
            Markup::script("/js/app.js?a=1&b=\"2\"").as_str(),
            r#"<script src="/js/app.js?a=1&amp;b=&quot;2&quot;"></script>"#
        );
        assert_eq!(
            Markup::style("/css/app.css").to_string(),
            r#"<link media="all" type="text/css" rel="stylesheet" href="/css/app.css">"#
        );
    }
}
