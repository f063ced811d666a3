pub mod cache;
pub mod error;

pub use cache::{repo_segment, ChartCache};
pub use error::CacheError;
