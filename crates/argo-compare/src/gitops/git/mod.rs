//! Git plumbing used to compare committed trees.

pub mod parse;
pub mod repository;
pub mod types;

pub use repository::GitRepository;
pub use types::*;
