//! services/api/src/adapters/extractor.rs
//!
//! This module contains the adapter that turns uploaded files into plain text.
//! It implements the `DocumentExtractor` port from the `core` crate for PDF, DOCX and
//! UTF-8 text uploads.

use quick_xml::{events::Event, Reader};
use std::io::{Cursor, Read};
use study_studio_core::ports::{DocumentExtractor, PortError, PortResult};
use tracing::debug;

pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PLAIN_TEXT: &str = "text/plain";
const OCTET_STREAM: &str = "application/octet-stream";

/// The supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pdf,
    WordProcessor,
    PlainText,
}

/// Picks a format from the declared content type.
///
/// Any type mentioning "document" is treated as a word-processor file. Anything that is not
/// PDF, a document, or text is rejected.
fn classify(content_type: &str) -> PortResult<Format> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == PDF {
        Ok(Format::Pdf)
    } else if essence.contains("document") {
        Ok(Format::WordProcessor)
    } else if essence.is_empty() || essence == OCTET_STREAM || essence.starts_with("text/") {
        Ok(Format::PlainText)
    } else {
        Err(PortError::UnsupportedFormat(content_type.to_string()))
    }
}

/// Resolves the content type to use for an upload. A generic or missing declared type is
/// replaced by one guessed from the file extension.
pub fn resolve_content_type(declared: Option<&str>, file_name: Option<&str>) -> String {
    let declared = declared.map(str::trim).filter(|t| !t.is_empty());
    if let Some(t) = declared.filter(|t| !t.eq_ignore_ascii_case(OCTET_STREAM)) {
        return t.to_string();
    }

    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => PDF.to_string(),
        Some("docx") => DOCX.to_string(),
        Some("txt") | Some("md") => PLAIN_TEXT.to_string(),
        _ => declared.unwrap_or(PLAIN_TEXT).to_string(),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentExtractor` by dispatching on content type.
#[derive(Debug, Clone, Default)]
pub struct FormatExtractor;

impl FormatExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for FormatExtractor {
    fn extract(&self, content_type: &str, bytes: &[u8]) -> PortResult<String> {
        let format = classify(content_type)?;
        debug!(?format, bytes = bytes.len(), "Extracting document text");
        match format {
            Format::Pdf => read_pdf(bytes),
            Format::WordProcessor => read_docx(bytes),
            Format::PlainText => read_text(bytes),
        }
    }
}

//=========================================================================================
// Format Readers
//=========================================================================================

/// Extracts text page by page, one line break between pages.
fn read_pdf(bytes: &[u8]) -> PortResult<String> {
    // The PDF parser panics on some malformed inputs; treat that as a bad file.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| PortError::Extraction("PDF parser aborted on malformed input".to_string()))?
        .map_err(|e| PortError::Extraction(format!("PDF: {}", e)))?;
    // The parser pads each page with layout line breaks.
    Ok(pages.iter().map(|page| page.trim()).collect::<Vec<_>>().join("\n"))
}

/// Extracts paragraph text from `word/document.xml`, one line break between paragraphs.
fn read_docx(bytes: &[u8]) -> PortResult<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PortError::Extraction(format!("DOCX container: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| PortError::Extraction(format!("DOCX body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| PortError::Extraction(format!("DOCX body: {}", e)))?;

    paragraphs_from_document_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Collects the body's paragraphs, table cells included.
///
/// Text boxes (`w:txbxContent`) nest whole paragraphs inside a run of the surrounding one,
/// and Word writes each of them twice (DrawingML plus a VML fallback). They are skipped.
fn paragraphs_from_document_xml(xml: &str) -> PortResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text_run = false;
    let mut text_box_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PortError::Extraction(format!("DOCX XML: {}", e)))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"txbxContent" => text_box_depth += 1,
                _ if text_box_depth > 0 => {}
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text_run = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"txbxContent" => text_box_depth = text_box_depth.saturating_sub(1),
                _ if text_box_depth > 0 => {}
                b"p" if in_paragraph => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                b"t" => in_text_run = false,
                _ => {}
            },
            Event::Empty(_) if text_box_depth > 0 => {}
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_paragraph => current.push('\t'),
                b"br" | b"cr" if in_paragraph => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run && text_box_depth == 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| PortError::Extraction(format!("DOCX XML: {}", e)))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn read_text(bytes: &[u8]) -> PortResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        PortError::Extraction(format!("Uploaded file is not valid UTF-8 text: {}", e))
    })
}
