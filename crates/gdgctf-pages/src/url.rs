//! The URL contract: `#<page>` selects a view, `?next=<page>` on the login
//! page names where to go after authenticating.
//!
//! Every value read from a URL is sanitized before it is returned. Every
//! URL built here embeds a [`PageId`], never a raw string.

use crate::{PageId, ReturnTarget, sanitize};

/// Name of the login query parameter carrying the return target.
pub const NEXT_PARAM: &str = "next";

/// Strips a leading `#` and surrounding whitespace from a fragment.
pub fn strip_fragment(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).trim()
}

/// The page named by a URL fragment such as `#challenge`.
pub fn fragment_page(hash: &str, fallback: PageId) -> PageId {
    sanitize(Some(strip_fragment(hash)), fallback)
}

/// `#<page>`.
pub fn fragment_for(page: PageId) -> String {
    format!("#{page}")
}

/// Returns the first value of `name` in a query string, percent-decoded.
///
/// Accepts the query with or without its leading `?`. `+` decodes to a
/// space. A key without `=` has an empty value.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .ok()?
        .into_iter()
        .find_map(|(key, value)| (key == name).then_some(value))
}

/// The sanitized `next` parameter of a login page query string.
pub fn next_page(query: &str, fallback: PageId) -> PageId {
    sanitize(query_param(query, NEXT_PARAM).as_deref(), fallback)
}

/// `login.html?next=<page>`.
///
/// Falls back to the bare login path if the query cannot be encoded; the
/// login page then uses its default return target.
pub fn login_url(login_path: &str, next: impl Into<ReturnTarget>) -> String {
    let next = next.into();
    match serde_urlencoded::to_string([(NEXT_PARAM, next.page().as_str())]) {
        Ok(query) => format!("{login_path}?{query}"),
        Err(_) => login_path.to_string(),
    }
}

/// `index.html#<page>`.
pub fn index_url(index_path: &str, page: PageId) -> String {
    format!("{index_path}{}", fragment_for(page))
}
