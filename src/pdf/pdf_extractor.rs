use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io::{Error, ErrorKind};
use std::path::Path;

use lopdf::{Document, Object};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::warn;

/// Extracted text of a PDF document.
#[derive(Debug, Clone, Default)]
pub struct PdfText {
    /// Map of page number to lines of text on that page
    pub text: BTreeMap<u32, Vec<String>>,
    /// List of any errors encountered during extraction
    pub errors: Vec<String>,
    /// Total number of pages in the source document
    pub page_count: i32,
}

static IGNORE: &[&[u8]] = &[
    b"Length",
    b"BBox",
    b"FormType",
    b"Matrix",
    b"Type",
    b"XObject",
    b"Subtype",
    b"Filter",
    b"ColorSpace",
    b"Width",
    b"Height",
    b"BitsPerComponent",
    b"Length1",
    b"Length2",
    b"Length3",
    b"PTEX.FileName",
    b"PTEX.PageNumber",
    b"PTEX.InfoDict",
    b"FontDescriptor",
    b"ExtGState",
    b"MediaBox",
    b"Annot",
];

impl PdfText {
    /// Pages joined by a single newline, leading/trailing whitespace trimmed.
    pub fn full_text(&self) -> String {
        self.text
            .values()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<String>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

fn filter_func(object_id: (u32, u16), object: &mut Object) -> Option<((u32, u16), Object)> {
    if IGNORE.contains(&object.type_name().unwrap_or_default()) {
        return None;
    }
    if let Ok(d) = object.as_dict_mut() {
        d.remove(b"Producer");
        d.remove(b"ModDate");
        d.remove(b"Creator");
        d.remove(b"ProcSet");
        d.remove(b"Procset");
        d.remove(b"XObject");
        d.remove(b"MediaBox");
        d.remove(b"Annots");
        if d.is_empty() {
            return None;
        }
    }
    Some((object_id, object.to_owned()))
}

fn extract_pdf_text(doc: &Document) -> PdfText {
    let mut pdf_text = PdfText::default();

    let pages = doc.get_pages();
    pdf_text.page_count = pages.len() as i32;

    let extracted_pages: Vec<Result<(u32, Vec<String>), Error>> = pages
        .into_par_iter()
        .map(
            |(page_num, page_id): (u32, (u32, u16))| -> Result<(u32, Vec<String>), Error> {
                let text = doc.extract_text(&[page_num]).map_err(|e| {
                    Error::new(
                        ErrorKind::Other,
                        format!("Failed to extract text from page {page_num} id={page_id:?}: {e:}"),
                    )
                })?;
                Ok((
                    page_num,
                    text.split('\n')
                        .map(|s| s.trim_end().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<String>>(),
                ))
            },
        )
        .collect();

    for page in extracted_pages {
        match page {
            Ok((page_num, lines)) => {
                pdf_text.text.insert(page_num, lines);
            }
            Err(e) => {
                pdf_text.errors.push(e.to_string());
            }
        }
    }

    pdf_text
}

fn extract_pdf<P: AsRef<Path> + Debug>(path: P) -> Result<PdfText, Error> {
    let doc = Document::load_filtered(path.as_ref(), filter_func)
        .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;

    if doc.is_encrypted() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Encrypted PDFs are not supported",
        ));
    }

    let text = extract_pdf_text(&doc);

    if !text.errors.is_empty() {
        for error in &text.errors[..std::cmp::min(10, text.errors.len())] {
            warn!("PDF extraction error: {}", error);
        }
    }

    Ok(text)
}

/// Soft-fail entry point used by the processing pipeline: an unreadable or
/// corrupt file yields an empty string and zero page count, never an error.
/// The orchestrator treats empty text as a failed run.
pub fn extract_document_text<P: AsRef<Path> + Debug>(path: P) -> (String, i32) {
    match extract_pdf(&path) {
        Ok(pdf_text) => (pdf_text.full_text(), pdf_text.page_count),
        Err(e) => {
            warn!("Failed to extract text from {:?}: {}", path, e);
            (String::new(), 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_file_returns_empty() {
        let (text, pages) = extract_document_text("/nonexistent/file.pdf");
        assert_eq!(text, "");
        assert_eq!(pages, 0);
    }

    #[test]
    fn test_full_text_joins_pages_with_newline() {
        let mut pdf_text = PdfText::default();
        pdf_text
            .text
            .insert(1, vec!["first page".to_string(), "more".to_string()]);
        pdf_text.text.insert(2, vec!["second page".to_string()]);

        assert_eq!(pdf_text.full_text(), "first page\nmore\nsecond page");
    }

    #[test]
    fn test_full_text_trims_whitespace() {
        let mut pdf_text = PdfText::default();
        pdf_text.text.insert(1, vec!["  padded  ".to_string()]);

        assert_eq!(pdf_text.full_text(), "padded");
    }
}
