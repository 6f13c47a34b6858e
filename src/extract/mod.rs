//! Raw byte-to-text extraction for supported upload formats.
//!
//! Extraction never fails: content that cannot be parsed yields an empty string so the
//! analysis layer's "no extractable text" precondition handles every bad upload uniformly.
//! PDF parsing is wrapped in `catch_unwind` because `pdf-extract` can panic on malformed
//! fonts and glyph tables.

/// Extract plain text from uploaded bytes, dispatching on the filename extension.
///
/// `.pdf` and `.docx` get structured extraction; everything else is decoded as lossy UTF-8.
pub fn extract_text(bytes: &[u8], filename: &str) -> String {
    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        extract_pdf(bytes)
    } else if lower.ends_with(".docx") {
        extract_docx(bytes)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn extract_pdf(bytes: &[u8]) -> String {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));
    match result {
        Ok(Ok(text)) => text,
        Ok(Err(error)) => {
            tracing::warn!(error = %error, "PDF extraction failed; treating as empty");
            String::new()
        }
        Err(_panic) => {
            tracing::warn!("PDF extraction panicked on malformed fonts; treating as empty");
            String::new()
        }
    }
}

fn extract_docx(bytes: &[u8]) -> String {
    let doc = match docx_rs::read_docx(bytes) {
        Ok(doc) => doc,
        Err(error) => {
            tracing::warn!(error = %error, "DOCX parsing failed; treating as empty");
            return String::new();
        }
    };

    let mut output = String::new();
    for child in doc.document.children {
        append_docx_child(&child, &mut output);
    }
    output
}

fn append_docx_child(element: &docx_rs::DocumentChild, output: &mut String) {
    match element {
        docx_rs::DocumentChild::Paragraph(paragraph) => {
            append_paragraph(paragraph, output);
            output.push('\n');
        }
        docx_rs::DocumentChild::Table(table) => {
            for row in &table.rows {
                let docx_rs::TableChild::TableRow(table_row) = row;
                for cell in &table_row.cells {
                    let docx_rs::TableRowChild::TableCell(table_cell) = cell;
                    for content in &table_cell.children {
                        if let docx_rs::TableCellContent::Paragraph(paragraph) = content {
                            append_paragraph(paragraph, output);
                            output.push(' ');
                        }
                    }
                }
                output.push('\n');
            }
        }
        _ => {}
    }
}

fn append_paragraph(paragraph: &docx_rs::Paragraph, output: &mut String) {
    for child in &paragraph.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => append_run(run, output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for nested in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = nested {
                        append_run(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn append_run(run: &docx_rs::Run, output: &mut String) {
    for child in &run.children {
        if let docx_rs::RunChild::Text(text) = child {
            output.push_str(&text.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = extract_text(b"Just some notes.", "notes.txt");
        assert_eq!(text, "Just some notes.");
    }

    #[test]
    fn unknown_extension_decodes_lossily() {
        let text = extract_text(&[0x48, 0x69, 0xFF], "mystery.bin");
        assert!(text.starts_with("Hi"));
    }

    #[test]
    fn corrupt_pdf_yields_empty_string() {
        assert_eq!(extract_text(b"not a pdf at all", "broken.pdf"), "");
    }

    #[test]
    fn corrupt_docx_yields_empty_string() {
        assert_eq!(extract_text(b"not a zip archive", "broken.docx"), "");
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(extract_text(b"zip junk", "REPORT.DOCX"), "");
    }
}
