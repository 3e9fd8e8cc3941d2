//! Report output: a bare score per line, pretty JSON, or JSON Lines.

use std::io::{self, Write};

use crate::types::RelevanceReport;

/// How scored reports are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Only the score, one per line
    #[default]
    Text,
    /// Pretty-printed JSON; several reports form an array
    Json,
    /// One compact JSON object per line
    JsonLines,
}

/// Writes relevance reports to any `Write` sink.
///
/// JSON output of more than one report is buffered until [`finish`](Self::finish)
/// so the result is a single valid array.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pending: Vec<RelevanceReport>,
    reports_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self {
            writer,
            format,
            pending: Vec::new(),
            reports_written: 0,
        }
    }

    pub fn write(&mut self, report: &RelevanceReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => writeln!(self.writer, "{}", report.score)?,
            ReportFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, report).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            ReportFormat::Json => {
                self.pending.push(report.clone());
                return Ok(());
            }
        }
        self.reports_written += 1;
        Ok(())
    }

    /// Emit buffered JSON and flush.
    pub fn finish(mut self) -> io::Result<usize> {
        if self.format == ReportFormat::Json && !self.pending.is_empty() {
            if self.pending.len() == 1 {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending[0])
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                    .map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
            self.reports_written += self.pending.len();
        }
        self.writer.flush()?;
        Ok(self.reports_written)
    }
}
