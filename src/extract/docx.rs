//! Text extraction from zipped WordprocessingML (`.docx`) containers.

use std::collections::BTreeSet;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

/// Main document part inside the container.
pub const MAIN_PART: &str = "word/document.xml";

/// Upper bound on the decompressed main part, guarding against zip bombs.
const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

/// Errors from container parsing.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Failed to open container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Container has no {0} part")]
    MissingPart(&'static str),

    #[error("Document part exceeds {0} bytes")]
    TooLarge(u64),

    #[error("Failed to read document part: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document markup: {0}")]
    Xml(String),
}

/// Text recovered from a container document.
#[derive(Debug, Clone, Default)]
pub struct DocxExtraction {
    pub text: String,
    pub paragraph_count: usize,
    /// Non-fatal notices about content that could not be converted.
    pub warnings: Vec<String>,
}

/// Elements that may hold no readable text. Their text (equation runs,
/// text boxes) is still collected; the notice is raised only when none is.
fn skipped_element(local_name: &[u8]) -> Option<&'static str> {
    match local_name {
        b"drawing" | b"pict" => Some("Embedded images were skipped"),
        b"object" => Some("Embedded OLE objects were skipped"),
        b"oMath" | b"oMathPara" => Some("Equations were skipped"),
        b"altChunk" => Some("Embedded alternate-format content was skipped"),
        _ => None,
    }
}

/// An open non-text element and the text length when it started.
struct Region {
    notice: &'static str,
    mark: usize,
}

/// Accumulates document text, separating embedded content from the
/// surrounding runs.
#[derive(Default)]
struct TextSink {
    text: String,
    pending_space: bool,
}

impl TextSink {
    fn push_run(&mut self, run: &str) {
        if run.is_empty() {
            return;
        }
        if std::mem::take(&mut self.pending_space)
            && !self.text.is_empty()
            && !self.text.ends_with(char::is_whitespace)
            && !run.starts_with(char::is_whitespace)
        {
            self.text.push(' ');
        }
        self.text.push_str(run);
    }

    fn push_break(&mut self, c: char) {
        self.pending_space = false;
        self.text.push(c);
    }
}

/// Extractor for `.docx`-style containers.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from container bytes.
    pub fn extract(&self, bytes: &[u8]) -> Result<DocxExtraction, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let xml = {
            let file = match archive.by_name(MAIN_PART) {
                Ok(file) => file,
                Err(zip::result::ZipError::FileNotFound) => {
                    return Err(DocxError::MissingPart(MAIN_PART))
                }
                Err(e) => return Err(e.into()),
            };
            if file.size() > MAX_PART_SIZE {
                return Err(DocxError::TooLarge(MAX_PART_SIZE));
            }
            let mut xml = String::new();
            file.take(MAX_PART_SIZE).read_to_string(&mut xml)?;
            xml
        };

        parse_document_xml(&xml)
    }
}

/// Walk WordprocessingML and collect run text, tabs, breaks and paragraphs.
pub fn parse_document_xml(xml: &str) -> Result<DocxExtraction, DocxError> {
    let mut reader = Reader::from_str(xml);

    let mut sink = TextSink::default();
    let mut regions: Vec<Region> = Vec::new();
    let mut notices: BTreeSet<&'static str> = BTreeSet::new();
    let mut warnings = Vec::new();
    let mut paragraph_count = 0;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"t" => in_text = true,
                    other => {
                        if let Some(notice) = skipped_element(other) {
                            sink.pending_space = true;
                            regions.push(Region {
                                notice,
                                mark: sink.text.len(),
                            });
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"tab" => sink.push_break('\t'),
                    b"br" | b"cr" => sink.push_break('\n'),
                    other => {
                        if let Some(notice) = skipped_element(other) {
                            notices.insert(notice);
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_text {
                    match e.unescape() {
                        Ok(run) => sink.push_run(&run),
                        Err(err) => tracing::debug!("Skipping undecodable run: {}", err),
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"t" => in_text = false,
                    b"p" => {
                        paragraph_count += 1;
                        sink.push_break('\n');
                    }
                    b"tc" => sink.push_break('\t'),
                    other if skipped_element(other).is_some() => {
                        if let Some(region) = regions.pop() {
                            if sink.text.len() == region.mark {
                                notices.insert(region.notice);
                            } else {
                                sink.pending_space = true;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                let position = reader.buffer_position();
                if sink.text.trim().is_empty() {
                    return Err(DocxError::Xml(format!("{} at byte {}", e, position)));
                }
                tracing::warn!("Document markup broken at byte {}: {}", position, e);
                warnings.push(format!(
                    "Document markup was truncated at byte {}; remaining content skipped",
                    position
                ));
                break;
            }
            _ => {}
        }
    }

    warnings.extend(notices.into_iter().map(String::from));

    Ok(DocxExtraction {
        text: sink.text.trim().to_string(),
        paragraph_count,
        warnings,
    })
}
