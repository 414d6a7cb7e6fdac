//! HTML to PDF conversion.

use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::DocumentError;

/// Turns a rendered HTML page into PDF bytes.
pub trait PdfRenderer: Sync {
    fn render(&self, html: &str) -> impl Future<Output = Result<Vec<u8>, DocumentError>> + Send;
}

/// Pipes HTML through an external converter (stdin to stdout).
///
/// A bare program name gets `- -` appended, which is how `wkhtmltopdf`
/// and compatible tools select stdin and stdout.
#[derive(Debug, Clone)]
pub struct CommandPdfRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandPdfRenderer {
    /// Build from a command line such as `wkhtmltopdf --quiet - -`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Converter`] for an empty command line.
    pub fn from_command_line(command_line: &str) -> Result<Self, DocumentError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| DocumentError::Converter("empty PDF command".to_string()))?;
        let mut args: Vec<String> = words.collect();
        if args.is_empty() {
            args = vec!["-".to_string(), "-".to_string()];
        }
        Ok(Self { program, args })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl PdfRenderer for CommandPdfRenderer {
    #[instrument(skip(self, html), fields(program = %self.program, html_len = html.len()))]
    async fn render(&self, html: &str) -> Result<Vec<u8>, DocumentError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DocumentError::Converter(format!("{}: {e}", self.program)))?;

        // stdin is fed while stdout and stderr drain, or a converter that
        // streams its output stalls on a full pipe.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(html.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocumentError::Converter(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        fed?;
        if output.stdout.is_empty() {
            return Err(DocumentError::Converter(format!(
                "{} produced no output",
                self.program
            )));
        }

        debug!(bytes = output.stdout.len(), "PDF rendered");
        Ok(output.stdout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_program_reads_stdin() {
        let renderer = CommandPdfRenderer::from_command_line("wkhtmltopdf").unwrap();
        assert_eq!(renderer.program(), "wkhtmltopdf");
        assert_eq!(renderer.args, vec!["-", "-"]);
    }

    #[test]
    fn test_explicit_arguments_are_kept() {
        let renderer =
            CommandPdfRenderer::from_command_line("wkhtmltopdf --quiet -s A4 - -").unwrap();
        assert_eq!(renderer.args, vec!["--quiet", "-s", "A4", "-", "-"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            CommandPdfRenderer::from_command_line("  "),
            Err(DocumentError::Converter(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pipes_through_command() {
        let renderer = CommandPdfRenderer::from_command_line("cat -").unwrap();
        let bytes = renderer.render("<html></html>").await.unwrap();
        assert_eq!(bytes, b"<html></html>");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_page_larger_than_pipe_buffer() {
        let renderer = CommandPdfRenderer::from_command_line("cat -").unwrap();
        let html = "x".repeat(1 << 20);
        let bytes = tokio::time::timeout(std::time::Duration::from_secs(10), renderer.render(&html))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bytes.len(), html.len());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_reports_status() {
        let renderer = CommandPdfRenderer::from_command_line("false -").unwrap();
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Converter(_) | DocumentError::Io(_)
        ));
    }
}
