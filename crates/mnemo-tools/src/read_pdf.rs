//! PDF reader tool: extracts page text with pdf-extract

use std::path::Path;

use async_trait::async_trait;
use mnemo_core::{Error, PdfConfig, Result, SchemaBuilder, Tool, ToolResult};
use serde_json::Value;

const EMPTY_PDF: &str = "PDF is empty or text could not be extracted.";

/// Tool that reads the text of a local PDF file
pub struct ReadPdfTool {
    max_chars: usize,
}

impl ReadPdfTool {
    /// Create a new ReadPdfTool with the configured character budget
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            max_chars: config.max_chars,
        }
    }

    async fn extract_pages(path: &Path) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(path).await?;

        // pdf-extract is synchronous and may panic on malformed input; a
        // panic surfaces here as a JoinError.
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| Error::ExternalCollaborator(format!("extraction aborted: {}", e)))?
        .map_err(Error::ExternalCollaborator)
    }
}

impl Default for ReadPdfTool {
    fn default() -> Self {
        Self::new(&PdfConfig::default())
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Join pages with `--- Page n ---` markers and cut to `max_chars` characters
fn render_pages(pages: &[String], max_chars: usize) -> String {
    if pages.iter().all(|page| page.trim().is_empty()) {
        return EMPTY_PDF.to_string();
    }

    let mut text = String::new();
    for (i, page) in pages.iter().enumerate() {
        text.push_str(&format!("\n--- Page {} ---\n{}", i + 1, page));
    }

    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
        text.push_str(&format!("\n\n[...truncated, {} pages total]", pages.len()));
    }

    text.trim().to_string()
}

#[async_trait]
impl Tool for ReadPdfTool {
    fn name(&self) -> &str {
        "read_pdf"
    }

    fn description(&self) -> &str {
        "Read the text content of a local PDF file. Long documents are truncated."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[(
            "path",
            "string",
            "Absolute path to the PDF file",
            true,
        )])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let path_str = input["path"].as_str().ok_or_else(|| {
            Error::ToolExecution("Missing 'path' parameter".to_string())
        })?;
        let path = Path::new(path_str);

        match tokio::fs::try_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(ToolResult::error(format!("File not found: {}", path_str)));
            }
            Err(e) => {
                tracing::warn!(path = %path_str, error = %e, "Cannot access PDF path");
                return Ok(ToolResult::error(format!("Error reading PDF: {}", e)));
            }
        }

        if !has_pdf_extension(path) {
            return Ok(ToolResult::error(format!("File is not a PDF: {}", path_str)));
        }

        tracing::debug!(path = %path_str, "Reading PDF");

        match Self::extract_pages(path).await {
            Ok(pages) => {
                tracing::debug!(path = %path_str, pages = pages.len(), "Extracted PDF text");
                Ok(ToolResult::success(render_pages(&pages, self.max_chars)))
            }
            Err(e) => {
                tracing::warn!(path = %path_str, error = %e, "PDF extraction failed");
                Ok(ToolResult::error(format!("Error reading PDF: {}", e)))
            }
        }
    }
}
