//! Site-specific resource resolution with fallback to the shared name.
//!
//! Routes, views and permissions all follow one rule: try the name prefixed
//! with the site's slug, and use the bare name when the prefixed one does
//! not exist.

use std::borrow::Cow;

/// Kind of resource being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Named route, `{slug}.{name}`.
    Route,
    /// View template, `{slug}/{name}`.
    View,
    /// Permission name, `{slug}.{name}`.
    Permission,
}

impl ResourceKind {
    /// Separator between the slug and the resource name.
    pub fn separator(self) -> char {
        match self {
            ResourceKind::Route | ResourceKind::Permission => '.',
            ResourceKind::View => '/',
        }
    }

    /// Site-specific candidate name for `name`.
    pub fn candidate(self, prefix: &str, name: &str) -> String {
        format!("{}{}{}", prefix, self.separator(), name)
    }
}

/// Resolve `name` for the site with the given prefix.
///
/// Returns the prefixed candidate when `exists` reports it, the bare name
/// otherwise. The bare name is not checked: an unknown name is left for the
/// downstream collaborator to reject.
///
/// # Example
///
/// ```rust
/// use multisite::{resolve, ResourceKind};
///
/// let known = ["acme.home"];
/// let exists = |name: &str| known.contains(&name);
///
/// assert_eq!(resolve(ResourceKind::Route, "acme", "home", exists), "acme.home");
/// assert_eq!(resolve(ResourceKind::Route, "acme", "about", exists), "about");
/// ```
pub fn resolve<'a, F>(kind: ResourceKind, prefix: &str, name: &'a str, exists: F) -> Cow<'a, str>
where
    F: Fn(&str) -> bool,
{
    let candidate = kind.candidate(prefix, name);
    if exists(&candidate) {
        Cow::Owned(candidate)
    } else {
        Cow::Borrowed(name)
    }
}
