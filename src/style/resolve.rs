//! Resolving a placemark's `styleUrl` to a concrete style definition.

use std::borrow::Cow;

use tracing::debug;

use super::catalog::{StyleCatalog, StyleDefinition};

/// Alias redirects followed before giving up; breaks `a -> b -> a` cycles.
pub const MAX_ALIAS_HOPS: usize = 8;

impl StyleCatalog {
    /// Resolve a style reference.
    ///
    /// Returns `None` when `force_uniform` is set, when there is no
    /// reference, or when the reference (after following aliases) names no
    /// style definition.
    pub fn resolve(&self, reference: Option<&str>, force_uniform: bool) -> Option<&StyleDefinition> {
        if force_uniform {
            return None;
        }

        let mut key = normalize_reference(reference?)?;
        for _ in 0..MAX_ALIAS_HOPS {
            match self.aliases.get(key.as_ref()) {
                Some(target) => key = normalize_reference(target)?,
                None => break,
            }
        }

        let found = self.styles.get(key.as_ref());
        if found.is_none() {
            debug!("Dangling style reference {}", key);
        }
        found
    }
}

/// Reduce a reference to its catalog key.
///
/// `other.kml#id` and `#id` both become `#id`; a bare `id` becomes `#id`.
pub fn normalize_reference(reference: &str) -> Option<Cow<'_, str>> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    match reference.rfind('#') {
        Some(0) => Some(Cow::Borrowed(reference)),
        Some(pos) => Some(Cow::Borrowed(&reference[pos..])).filter(|k| k.len() > 1),
        None => Some(Cow::Owned(format!("#{reference}"))),
    }
}
