///! Glob matchers
///!
///! Best-match selection for namespace names and secret-variable paths

pub mod namespace;
pub mod path;

pub use namespace::{namespace_matches, select_best_namespace};
pub use path::{compute_length_diff, does_match_pattern, select_best_path};
