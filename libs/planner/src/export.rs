//! Renderings of the weekly report

use serde::Deserialize;
use thiserror::Error;

use crate::report::WeeklyReport;

pub mod pdf;
pub mod text;

/// Domain printed in every page footer
pub const FOOTER_DOMAIN: &str = "coachd.com";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Text,
}

/// A rendered report ready to be sent as a download
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

pub fn render(report: &WeeklyReport, format: ExportFormat) -> Result<ExportedFile, ExportError> {
    let bytes = match format {
        ExportFormat::Pdf => pdf::render(report)?,
        ExportFormat::Text => text::render(report).into_bytes(),
    };

    Ok(ExportedFile {
        file_name: format!("{}.{}", report.file_stem(), format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}
