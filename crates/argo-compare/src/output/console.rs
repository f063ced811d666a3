use std::io::Write;

use log::{debug, warn};

use super::error::Result;
use crate::compare::{ComparisonResult, FileEntry};
use crate::process::pipe_through;

/// Prints comparison results to a terminal, optionally through an external diff viewer.
pub struct ConsolePresenter {
    writer: Box<dyn Write + Send>,
    external_tool: Option<String>,
}

impl ConsolePresenter {
    pub fn stdout(external_tool: Option<String>) -> Self {
        Self::new(Box::new(std::io::stdout()), external_tool)
    }

    pub fn new(writer: Box<dyn Write + Send>, external_tool: Option<String>) -> Self {
        Self {
            writer,
            external_tool,
        }
    }

    pub fn present(
        &mut self,
        application: &str,
        path: &str,
        result: &ComparisonResult,
    ) -> Result<()> {
        writeln!(self.writer, "===> Application '{}' ({})", application, path)?;

        if result.is_empty() {
            writeln!(self.writer, "No differences found")?;
            writeln!(self.writer)?;
            return Ok(());
        }

        writeln!(
            self.writer,
            "Summary: {} added, {} removed, {} changed",
            result.added.len(),
            result.removed.len(),
            result.changed.len()
        )?;

        self.print_section("Added", '+', &result.added)?;
        self.print_section("Removed", '-', &result.removed)?;

        if !result.changed.is_empty() {
            writeln!(self.writer, "Changed:")?;
            for entry in &result.changed {
                writeln!(self.writer, "  ~ {}", entry.path)?;
                if let Some(diff) = &entry.content {
                    self.print_diff(&entry.path, diff)?;
                }
            }
        }

        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn print_section(&mut self, title: &str, marker: char, entries: &[FileEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "{}:", title)?;
        for entry in entries {
            writeln!(self.writer, "  {} {}", marker, entry.path)?;
            if let Some(content) = &entry.content {
                write!(self.writer, "{}", content)?;
                if !content.ends_with('\n') {
                    writeln!(self.writer)?;
                }
            }
        }
        Ok(())
    }

    fn print_diff(&mut self, path: &str, diff: &str) -> Result<()> {
        let Some(tool) = self.external_tool.as_deref() else {
            write!(self.writer, "{}", diff)?;
            return Ok(());
        };

        match pipe_through(tool, diff.as_bytes()) {
            Ok((true, output)) => {
                debug!("Piped diff of {} through {}", path, tool);
                write!(self.writer, "{}", output)?;
            }
            Ok((false, output)) => {
                warn!("'{}' failed for {}: {}", tool, path, output.trim());
            }
            Err(e) => {
                warn!("Failed to run '{}' for {}: {}", tool, path, e);
            }
        }
        Ok(())
    }
}
