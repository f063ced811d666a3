//! Reconciliation of the two rendered trees of an application.

pub mod error;
pub mod labels;
pub mod reconciler;
pub mod result;
pub mod scan;

pub use error::CompareError;
pub use reconciler::{classify, Reconciler};
pub use result::{ComparisonResult, FileEntry};
