use anyhow::{Context, Result};
use lopdf::{Document, Object};
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    /// Parse an in-memory PDF; `path` is only used in error messages
    pub fn load_mem(bytes: &[u8], path: &Path) -> Result<Self> {
        let doc = Document::load_mem(bytes)
            .with_context(|| format!("Failed to parse PDF: {}", path.display()))?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Title from the document info dictionary, if any
    pub fn title(&self) -> Option<String> {
        let Ok(Object::Reference(info_ref)) = self.doc.trailer.get(b"Info") else {
            return None;
        };
        match self.doc.get_object(*info_ref) {
            Ok(Object::Dictionary(dict)) => match dict.get(b"Title") {
                Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
                _ => None,
            },
            _ => None,
        }
    }
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    // UTF-16 BE with BOM, otherwise PDFDocEncoding treated as Latin-1
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf16_title() {
        let bytes = [0xFE, 0xFF, 0x00, b'C', 0x00, b'I', 0x00, b'S'];
        assert_eq!(decode_pdf_string(&bytes).as_deref(), Some("CIS"));
    }

    #[test]
    fn test_decode_latin1_title() {
        let title = decode_pdf_string(b"Benchmark");
        assert_eq!(title.as_deref(), Some("Benchmark"));
    }
}
