//! Merge request comment output.
//!
//! Every presented application adds a section to one Markdown document,
//! which is posted once when the run finishes.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::error::{OutputError, Result};
use crate::compare::{ComparisonResult, FileEntry};

pub const COMMENT_TITLE: &str = "## Argo Compare";

/// Posts a rendered comment to a review system.
#[async_trait]
pub trait CommentPublisher: Send + Sync {
    async fn post(&self, body: &str) -> Result<()>;
}

/// Collects comparison results into a Markdown comment.
pub struct CommentPresenter {
    publisher: Arc<dyn CommentPublisher>,
    show_added: bool,
    show_removed: bool,
    sections: Vec<String>,
}

impl std::fmt::Debug for CommentPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentPresenter")
            .field("show_added", &self.show_added)
            .field("show_removed", &self.show_removed)
            .field("sections", &self.sections.len())
            .finish()
    }
}

/// Builder for [`CommentPresenter`].
#[derive(Default)]
pub struct CommentPresenterBuilder {
    publisher: Option<Arc<dyn CommentPublisher>>,
    show_added: bool,
    show_removed: bool,
}

impl CommentPresenterBuilder {
    pub fn publisher(mut self, publisher: Arc<dyn CommentPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn show_added(mut self, show: bool) -> Self {
        self.show_added = show;
        self
    }

    pub fn show_removed(mut self, show: bool) -> Self {
        self.show_removed = show;
        self
    }

    /// Fails when no publisher was configured.
    pub fn build(self) -> Result<CommentPresenter> {
        let publisher = self.publisher.ok_or(OutputError::MissingPublisher)?;
        Ok(CommentPresenter {
            publisher,
            show_added: self.show_added,
            show_removed: self.show_removed,
            sections: Vec::new(),
        })
    }
}

impl CommentPresenter {
    pub fn builder() -> CommentPresenterBuilder {
        CommentPresenterBuilder::default()
    }

    pub fn present(&mut self, application: &str, path: &str, result: &ComparisonResult) {
        let section = render_section(
            application,
            path,
            result,
            self.show_added,
            self.show_removed,
        );
        self.sections.push(section);
    }

    /// The full comment as it would be posted.
    pub fn body(&self) -> String {
        let mut body = String::from(COMMENT_TITLE);
        body.push_str("\n\n");
        if self.sections.is_empty() {
            body.push_str("No changed applications.\n");
        } else {
            body.push_str(&self.sections.join("\n"));
        }
        body
    }

    /// Posts the accumulated comment.
    pub async fn finish(&mut self) -> Result<()> {
        let body = self.body();
        self.publisher.post(&body).await?;
        info!(
            "Posted comparison comment for {} application(s)",
            self.sections.len()
        );
        Ok(())
    }
}

/// Renders the Markdown section of one application.
pub fn render_section(
    application: &str,
    path: &str,
    result: &ComparisonResult,
    show_added: bool,
    show_removed: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "### Application `{}` (`{}`)\n", application, path);

    if result.is_empty() {
        out.push_str("No differences found.\n");
        return out;
    }

    if show_added {
        push_details(&mut out, "Added", &result.added, "yaml");
    }
    if show_removed {
        push_details(&mut out, "Removed", &result.removed, "yaml");
    }
    push_details(&mut out, "Changed", &result.changed, "diff");

    let hidden_added = if show_added { 0 } else { result.added.len() };
    let hidden_removed = if show_removed { 0 } else { result.removed.len() };
    if result.changed.is_empty()
        && hidden_added == result.added.len()
        && hidden_removed == result.removed.len()
    {
        let _ = writeln!(
            out,
            "No differences shown ({} added, {} removed hidden).",
            hidden_added, hidden_removed
        );
    }
    out
}

fn push_details(out: &mut String, title: &str, entries: &[FileEntry], language: &str) {
    if entries.is_empty() {
        return;
    }

    let _ = writeln!(
        out,
        "<details>\n<summary>{} ({})</summary>\n",
        title,
        entries.len()
    );
    for entry in entries {
        let _ = writeln!(out, "#### `{}`\n", entry.path);
        if let Some(content) = &entry.content {
            let fence = fence_for(content);
            let _ = write!(out, "{fence}{language}\n{content}");
            if !content.ends_with('\n') {
                out.push('\n');
            }
            let _ = writeln!(out, "{fence}\n");
        }
    }
    out.push_str("</details>\n\n");
}

/// Picks a code fence longer than any backtick run in `content`.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}
