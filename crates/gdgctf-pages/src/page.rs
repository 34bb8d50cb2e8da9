//! Page identifiers and the page registry.
//!
//! The site has a small, closed set of views. Everything that arrives from
//! outside (URL fragments, link attributes, the `next` query parameter) is a
//! plain string until it has passed through [`sanitize`]. Only then does it
//! become a [`PageId`], and only a `PageId` is ever written back into the
//! DOM or the address bar.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PageId
// ---------------------------------------------------------------------------

/// One of the fixed views of the site.
///
/// Serialized as its lowercase name, so `PageId::Dashboard` becomes
/// `"dashboard"` in JSON and in URLs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PageId {
    Landing,
    Dashboard,
    Challenge,
    Leaderboard,
}

impl PageId {
    /// Every page, in navigation order.
    pub const ALL: [PageId; 4] = [
        PageId::Landing,
        PageId::Dashboard,
        PageId::Challenge,
        PageId::Leaderboard,
    ];

    /// The name used in fragments, link attributes and view element ids.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Dashboard => "dashboard",
            Self::Challenge => "challenge",
            Self::Leaderboard => "leaderboard",
        }
    }

    /// Exact, case-sensitive lookup by name.
    ///
    /// `"Dashboard"`, `" dashboard"` and `"dashboard?x=1"` are all unknown.
    /// Callers that need whitespace tolerance (the fragment reader) trim
    /// before calling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.as_str() == name)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Validates an externally supplied page name.
///
/// Returns the matching [`PageId`] if and only if `candidate` names a known
/// page; otherwise returns `fallback`. Absent, empty and hostile input all
/// take the fallback path. There are no side effects.
///
/// ```rust
/// use gdgctf_pages::{sanitize, PageId};
///
/// assert_eq!(sanitize(Some("challenge"), PageId::Landing), PageId::Challenge);
/// assert_eq!(sanitize(Some("javascript:alert(1)"), PageId::Landing), PageId::Landing);
/// assert_eq!(sanitize(None, PageId::Dashboard), PageId::Dashboard);
/// ```
pub fn sanitize(candidate: Option<&str>, fallback: PageId) -> PageId {
    candidate.and_then(PageId::from_name).unwrap_or(fallback)
}

// ---------------------------------------------------------------------------
// PageRegistry
// ---------------------------------------------------------------------------

/// The set of known pages and the subset that requires a session.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegistry {
    protected: Vec<PageId>,
}

impl PageRegistry {
    /// Creates a registry with the given protected pages.
    pub fn new(protected: impl IntoIterator<Item = PageId>) -> Self {
        let mut protected: Vec<PageId> = protected.into_iter().collect();
        protected.sort();
        protected.dedup();
        Self { protected }
    }

    /// Every known page.
    pub fn all(&self) -> &'static [PageId] {
        &PageId::ALL
    }

    /// Pages that need an authenticated session.
    pub fn protected(&self) -> &[PageId] {
        &self.protected
    }

    /// Returns `true` if `page` needs an authenticated session.
    pub fn is_protected(&self, page: PageId) -> bool {
        self.protected.contains(&page)
    }

    /// Returns `true` if `name` is a known page name.
    pub fn contains(&self, name: &str) -> bool {
        PageId::from_name(name).is_some()
    }
}

/// Dashboard and challenge are protected; landing and leaderboard are public.
impl Default for PageRegistry {
    fn default() -> Self {
        Self::new([PageId::Dashboard, PageId::Challenge])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_known_pages_round_trip_through_as_str() {
        for page in PageId::ALL {
            assert_eq!(PageId::from_name(page.as_str()), Some(page));
        }
    }

    #[test]
    fn test_from_name_is_case_sensitive() {
        assert_eq!(PageId::from_name("Dashboard"), None);
        assert_eq!(PageId::from_name("LANDING"), None);
    }

    #[test]
    fn test_sanitize_unknown_inputs_return_fallback() {
        let hostile = [
            "",
            " ",
            "admin",
            "dashboard ",
            " landing",
            "challenge#x",
            "../dashboard",
            "https://evil.example/",
            "javascript:alert(1)",
            "<img src=x onerror=alert(1)>",
            "leaderboard\0",
            "dashboard%20",
        ];
        for input in hostile {
            assert_eq!(
                sanitize(Some(input), PageId::Landing),
                PageId::Landing,
                "input {input:?} should fall back"
            );
            assert_eq!(
                sanitize(Some(input), PageId::Dashboard),
                PageId::Dashboard,
                "input {input:?} should fall back"
            );
        }
    }

    #[test]
    fn test_sanitize_absent_returns_fallback() {
        assert_eq!(sanitize(None, PageId::Leaderboard), PageId::Leaderboard);
    }

    #[test]
    fn test_sanitize_known_page_ignores_fallback() {
        assert_eq!(
            sanitize(Some("leaderboard"), PageId::Landing),
            PageId::Leaderboard
        );
    }

    #[test]
    fn test_default_registry_protects_dashboard_and_challenge() {
        let registry = PageRegistry::default();
        assert!(registry.is_protected(PageId::Dashboard));
        assert!(registry.is_protected(PageId::Challenge));
        assert!(!registry.is_protected(PageId::Landing));
        assert!(!registry.is_protected(PageId::Leaderboard));
        assert_eq!(registry.all().len(), 4);
    }

    #[test]
    fn test_registry_new_deduplicates_protected_pages() {
        let registry =
            PageRegistry::new([PageId::Challenge, PageId::Challenge]);
        assert_eq!(registry.protected(), &[PageId::Challenge]);
    }

    #[test]
    fn test_page_id_serializes_lowercase() {
        let json = serde_json::to_string(&PageId::Leaderboard).unwrap();
        assert_eq!(json, "\"leaderboard\"");
        let back: PageId = serde_json::from_str("\"challenge\"").unwrap();
        assert_eq!(back, PageId::Challenge);
    }
}
