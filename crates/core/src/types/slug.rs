//! URL slugs derived from display names.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A lowercase, hyphen-separated slug.
///
/// Slugs are always derived, never parsed from user input: every run of
/// characters that is not an ASCII letter or digit becomes a single `-`, and
/// leading or trailing hyphens are dropped.
///
/// ```
/// use campfinder_core::Slug;
///
/// assert_eq!(Slug::from_name("John Bootcamp").as_str(), "john-bootcamp");
/// assert_eq!(Slug::from_name("  UI/UX  Lab! ").as_str(), "ui-ux-lab");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut pending_separator = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        Self(slug)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an already-derived slug read back from storage.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_collapses_separators() {
        assert_eq!(Slug::from_name("Dev -- Works  Bootcamp").as_str(), "dev-works-bootcamp");
    }

    #[test]
    fn test_slug_is_pure_function_of_name() {
        assert_eq!(Slug::from_name("Codemasters"), Slug::from_name("Codemasters"));
    }

    #[test]
    fn test_slug_drops_non_ascii() {
        assert_eq!(Slug::from_name("Café Code").as_str(), "caf-code");
    }

    #[test]
    fn test_slug_empty_name() {
        assert_eq!(Slug::from_name(" !! ").as_str(), "");
    }
}
