//! Error types for the effects layer.

/// Local input errors from the flag terminal. These never leave the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    /// The flag input was empty or whitespace.
    #[error("no flag provided")]
    Empty,

    /// The challenge was already solved on this page.
    #[error("flag already accepted")]
    AlreadySolved,
}
