//! PDF text extraction and cleanup
//!
//! Text is pulled page by page with lopdf. When lopdf cannot produce text for
//! any page, pdf-extract gets one attempt over the whole document before the
//! document is treated as having no extractable text.

use regex::Regex;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};

/// Form feed, the page-break marker left in extracted text
const PAGE_BREAK: char = '\u{000C}';

/// Text extracted from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Cleaned text, pages joined with newlines
    pub text: String,
    /// Pages in the document
    pub total_pages: usize,
    /// Pages that yielded any text
    pub pages_with_text: usize,
}

impl ExtractedText {
    /// Whether nothing survived extraction and cleanup
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Pulls text out of PDFs and strips layout noise
pub struct TextExtractor {
    /// Horizontal whitespace runs (newlines are kept for line filtering)
    whitespace: Regex,
    boilerplate: Vec<String>,
}

impl TextExtractor {
    /// Create an extractor with the configured boilerplate markers
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            whitespace: Regex::new(r"[^\S\n]+").expect("static regex"),
            boilerplate: config.boilerplate_markers.clone(),
        }
    }

    /// Extract cleaned text: page numbers and running headers removed
    pub fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let (pages, total_pages) = Self::page_texts(filename, data)?;

        let cleaned: Vec<String> = pages
            .iter()
            .map(|page| self.preprocess(page))
            .filter(|page| !page.is_empty())
            .collect();

        tracing::debug!(
            "Extracted {} of {} pages from {}",
            cleaned.len(),
            total_pages,
            filename
        );

        Ok(ExtractedText {
            pages_with_text: cleaned.len(),
            text: cleaned.join("\n"),
            total_pages,
        })
    }

    /// Extract page text without boilerplate filtering (used for whole-document prompts)
    pub fn extract_raw(&self, filename: &str, data: &[u8]) -> Result<String> {
        let (pages, _) = Self::page_texts(filename, data)?;
        let mut text = String::new();
        for page in pages {
            text.push_str(&normalize_glyphs(&page));
            text.push('\n');
        }
        Ok(text)
    }

    /// Clean one page of text
    pub fn preprocess(&self, page: &str) -> String {
        let page = normalize_glyphs(page).replace(PAGE_BREAK, "\n");

        page.lines()
            .map(|line| self.whitespace.replace_all(line, " "))
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .filter(|line| !is_page_number(line))
            .filter(|line| !self.is_boilerplate(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.iter().any(|marker| line.contains(marker.as_str()))
    }

    /// Per-page text plus the page count; pages without text are skipped
    fn page_texts(filename: &str, data: &[u8]) -> Result<(Vec<String>, usize)> {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("lopdf could not open {}: {}, trying pdf-extract", filename, e);
                return match Self::extract_fallback(data) {
                    Some(pages) => {
                        let total = pages.len();
                        Ok((pages, total))
                    }
                    None => Err(Error::extraction(filename, e.to_string())),
                };
            }
        };

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total_pages = page_numbers.len();
        let mut pages = Vec::with_capacity(total_pages);

        for page_number in page_numbers {
            match doc.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => pages.push(text),
                Ok(_) => tracing::debug!("Page {} of {} has no text", page_number, filename),
                Err(e) => {
                    tracing::debug!("Could not extract page {} of {}: {}", page_number, filename, e)
                }
            }
        }

        if pages.is_empty() && total_pages > 0 {
            if let Some(fallback) = Self::extract_fallback(data) {
                tracing::info!("Used pdf-extract fallback for {}", filename);
                return Ok((fallback, total_pages));
            }
            tracing::warn!("{} has no extractable text (image-based or encrypted?)", filename);
        }

        Ok((pages, total_pages))
    }

    /// Whole-document extraction with pdf-extract, split at page breaks
    fn extract_fallback(data: &[u8]) -> Option<Vec<String>> {
        let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data));

        let text = match result {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::debug!("pdf-extract failed: {}", e);
                return None;
            }
            Err(_) => {
                tracing::warn!("pdf-extract panicked");
                return None;
            }
        };

        let pages: Vec<String> = text
            .split(PAGE_BREAK)
            .filter(|page| !page.trim().is_empty())
            .map(str::to_string)
            .collect();

        if pages.is_empty() {
            None
        } else {
            Some(pages)
        }
    }
}

/// Lines of decimal digits only are page numbers
fn is_page_number(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Replace ligatures and control characters PDF fonts commonly leave behind
fn normalize_glyphs(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\u{00AD}', "") // soft hyphen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_pdf;

    fn extractor() -> TextExtractor {
        TextExtractor::new(&ExtractionConfig::default())
    }

    #[test]
    fn test_preprocess_drops_page_numbers_and_headers() {
        let page = "ΒΟΥΛΗ ΤΩΝ ΑΝΤΙΠΡΟΣΩΠΩΝ - ΠΡΑΚΤΙΚΑ\n\
                    ΠΡΟΕΔΡΟΣ:   Κηρύσσω   την\tέναρξη της συνεδρίας.\n\
                    12\n\
                    Σελίδα 3 από 40\n\
                    Ο κ. Παπαδόπουλος ζήτησε τον λόγο.";

        let cleaned = extractor().preprocess(page);

        assert_eq!(
            cleaned,
            "ΠΡΟΕΔΡΟΣ: Κηρύσσω την έναρξη της συνεδρίας.\nΟ κ. Παπαδόπουλος ζήτησε τον λόγο."
        );
    }

    #[test]
    fn test_preprocess_page_break_becomes_newline() {
        let cleaned = extractor().preprocess("πρώτη σελίδα\u{000C}7\u{000C}δεύτερη σελίδα");
        assert_eq!(cleaned, "πρώτη σελίδα\nδεύτερη σελίδα");
    }

    #[test]
    fn test_numeric_detection() {
        assert!(is_page_number("42"));
        assert!(!is_page_number("42α"));
        assert!(!is_page_number("4 2"));
        assert!(!is_page_number(""));
        assert!(!is_page_number("½"));
        assert!(!is_page_number("Ⅳ"));
    }

    #[test]
    fn test_numeric_glyph_lines_survive_cleanup() {
        assert_eq!(extractor().preprocess("Ⅳ\n12\n½"), "Ⅳ\n½");
    }

    #[test]
    fn test_custom_boilerplate() {
        let extractor = TextExtractor::new(&ExtractionConfig {
            boilerplate_markers: vec!["HOUSE OF REPRESENTATIVES".to_string()],
        });
        let cleaned = extractor.preprocess("HOUSE OF REPRESENTATIVES\nΣελίδα remains");
        assert_eq!(cleaned, "Σελίδα remains");
    }

    #[test]
    fn test_normalize_glyphs() {
        assert_eq!(normalize_glyphs("of\u{FB01}ce\0"), "office");
    }

    #[test]
    fn test_corrupt_document_is_extraction_error() {
        let result = extractor().extract("broken.pdf", b"this is not a pdf");
        match result {
            Err(Error::Extraction { filename, .. }) => assert_eq!(filename, "broken.pdf"),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_pages_without_text_are_skipped() {
        let pdf = build_pdf(&[None, None]);
        let extracted = extractor().extract("blank.pdf", &pdf).unwrap();

        assert_eq!(extracted.total_pages, 2);
        assert!(extracted.is_empty());
    }

    #[test]
    fn test_extracts_text_pages() {
        let pdf = build_pdf(&[Some("Hello Parliament"), None, Some("42")]);
        let extracted = extractor().extract("session.pdf", &pdf).unwrap();

        assert_eq!(extracted.total_pages, 3);
        assert!(extracted.text.contains("Hello Parliament"));
        assert!(!extracted.text.contains("42"));
    }
}
