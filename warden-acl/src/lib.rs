//! Client-side ACL evaluation for the Warden dashboard
//!
//! Replicates the cluster's namespace and secret-path rule matching so the
//! UI can enable or disable affordances without a server round trip. This
//! is not an enforcement point: the scheduler authorizes every request
//! server-side, and this engine may deny where the server would allow,
//! never the reverse.
//!
//! Evaluation is synchronous and side-effect-free. Callers hand in a
//! read-only [`TokenSnapshot`](warden_common::token::TokenSnapshot) and get
//! a boolean back; nothing is cached between calls.

pub mod abilities;
pub mod evaluator;
pub mod matcher;

pub use abilities::{Abilities, Operation, Resource, Target};
pub use evaluator::can;
pub use matcher::{select_best_namespace, select_best_path};
