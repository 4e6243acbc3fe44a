//! Depth-first search utilities over nested value trees.
//!
//! Provides key search ([`deep_find`], [`deep_find_all`]), predicate search
//! returning containing nodes ([`deep_locate`]), regex search over keys and
//! string/symbol values ([`deep_grep`]), and fixed-path lookup
//! ([`deep_fetch`]).

pub mod fetch;
pub mod search;

pub use fetch::{deep_fetch, deep_fetch_or, UndefinedPathError};
pub use search::{deep_find, deep_find_all, deep_grep, deep_locate, deep_locate_key};
