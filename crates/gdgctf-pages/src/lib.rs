//! Page registry and URL contract for the GDG CTF site.
//!
//! This is the bottom layer of the workspace. It defines the closed set of
//! pages the site can show and the single function, [`sanitize`], that turns
//! untrusted page names into [`PageId`] values.
//!
//! # How it fits in the stack
//!
//! ```text
//! Router / Login flow (above)  ← only ever handle PageId values
//!     ↕
//! Pages (this crate)  ← fragment, link attribute and `next` parsing
//! ```

mod navigation;
mod page;
pub mod url;

pub use navigation::{NavOrigin, NavigationRequest, ReturnTarget};
pub use page::{PageId, PageRegistry, sanitize};
