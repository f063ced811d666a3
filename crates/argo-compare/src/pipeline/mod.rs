pub mod context;
pub mod error;
pub mod runner;
pub mod values;

pub use context::{templates_dir, PipelineContext, Revision};
pub use error::PipelineError;
pub use runner::RenderPipeline;
