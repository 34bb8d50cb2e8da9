//! The host page the router drives.
//!
//! In a browser this is the DOM plus `window.location` and `history`; in
//! the terminal demo it's a text renderer; in tests it's a recorder. The
//! router only ever passes sanitized [`PageId`] values and URLs built from
//! them.

use gdgctf_pages::PageId;

/// View switching and location control for the single-page site.
///
/// `Send + 'static` → the router may run inside its own Tokio task.
pub trait Browser: Send + 'static {
    /// Whether the page has a view element for `page`.
    fn has_view(&self, page: PageId) -> bool;

    /// Removes the active marker from every view and navigation link.
    fn clear_active(&mut self);

    /// Marks the view for `page` as active.
    fn activate_view(&mut self, page: PageId);

    /// Marks every navigation link pointing at `page` as active.
    fn highlight_links(&mut self, page: PageId);

    /// Collapses the mobile navigation menu.
    fn close_nav_menu(&mut self);

    /// Rewrites the URL fragment without adding a history entry.
    fn replace_fragment(&mut self, fragment: &str);

    fn scroll_to_top(&mut self);

    /// The current URL fragment, including the leading `#` if present.
    fn current_fragment(&self) -> String;

    /// Full navigation to another document (`window.location.href = url`).
    fn assign(&mut self, url: &str);
}
