//! Presentation of comparison results.

pub mod comment;
pub mod console;
pub mod error;
pub mod gitlab;

use std::sync::Arc;

use crate::compare::ComparisonResult;
use crate::config::{OutputKind, RunConfig};

pub use comment::{CommentPresenter, CommentPublisher};
pub use console::ConsolePresenter;
pub use error::OutputError;
pub use gitlab::GitLabPublisher;

/// The configured output, chosen once at startup.
pub enum Presenter {
    Console(ConsolePresenter),
    Comment(CommentPresenter),
}

impl Presenter {
    /// Builds the presenter selected in `config`.
    ///
    /// `publisher` is required for comment output.
    pub fn from_config(
        config: &RunConfig,
        publisher: Option<Arc<dyn CommentPublisher>>,
    ) -> error::Result<Self> {
        match config.output {
            OutputKind::Console => Ok(Presenter::Console(ConsolePresenter::stdout(
                config.external_diff_tool.clone(),
            ))),
            OutputKind::GitLab => {
                let mut builder = CommentPresenter::builder()
                    .show_added(config.print_added_manifests)
                    .show_removed(config.print_removed_manifests);
                if let Some(publisher) = publisher {
                    builder = builder.publisher(publisher);
                }
                Ok(Presenter::Comment(builder.build()?))
            }
        }
    }

    /// Presents the result for one application.
    pub async fn present(
        &mut self,
        application: &str,
        path: &str,
        result: &ComparisonResult,
    ) -> error::Result<()> {
        match self {
            Presenter::Console(console) => console.present(application, path, result),
            Presenter::Comment(comment) => {
                comment.present(application, path, result);
                Ok(())
            }
        }
    }

    /// Called once after every application was presented.
    pub async fn finish(&mut self) -> error::Result<()> {
        match self {
            Presenter::Console(console) => console.finish(),
            Presenter::Comment(comment) => comment.finish().await,
        }
    }
}
