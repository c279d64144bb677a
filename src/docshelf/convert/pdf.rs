//! Minimal PDF assembly on top of `lopdf`.
//!
//! Two page kinds are needed: Courier text pages for the text path and
//! full-width JPEG pages for the Word paths. Coordinates passed in are
//! measured from the top-left corner; the conversion to PDF user space
//! (origin bottom-left) happens here.

use crate::error::{DocshelfError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;
pub const PT_PER_MM: f32 = 72.0 / 25.4;

// Courier is monospaced: every glyph advances 600/1000 em.
const COURIER_ADVANCE_EM: f32 = 0.6;
const FONT_NAME: &str = "F1";
// Absorbs f32 rounding when a line fills the width exactly.
const WIDTH_TOLERANCE: f32 = 0.01;

/// A line of text placed on a page, `y` being the baseline distance from the top.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
    width: f32,
    height: f32,
}

impl PdfWriter {
    pub fn a4() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
        }
    }

    /// Width of `text` in points when set in Courier at `font_size`.
    pub fn text_width(text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * COURIER_ADVANCE_EM * font_size
    }

    /// Splits `text` into lines no wider than `max_width`, measured with
    /// [`PdfWriter::text_width`].
    ///
    /// Each `\n` starts a new line and blank lines are kept. Runs of spaces
    /// and leading indentation are kept; tabs become four spaces. Lines wrap
    /// at a space, which is dropped at the break; a word wider than a whole
    /// line is broken between characters.
    pub fn split_text_to_size(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
        let fits = |s: &str| Self::text_width(s, font_size) <= max_width + WIDTH_TOLERANCE;
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut lines = Vec::new();
        for source in normalized.split('\n') {
            let source = source.replace('\t', "    ");
            let first = lines.len();
            let mut line = String::new();

            for token in whitespace_runs(&source) {
                let is_space = token.starts_with(char::is_whitespace);
                if fits(&format!("{}{}", line, token)) {
                    line.push_str(token);
                    continue;
                }
                if is_space {
                    lines.push(std::mem::take(&mut line).trim_end().to_string());
                    continue;
                }
                if !line.trim().is_empty() {
                    lines.push(std::mem::take(&mut line).trim_end().to_string());
                    if fits(token) {
                        line.push_str(token);
                        continue;
                    }
                }
                for c in token.chars() {
                    line.push(c);
                    if !fits(&line) && line.chars().count() > 1 {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(c);
                    }
                }
            }

            if !line.is_empty() || lines.len() == first {
                lines.push(line);
            }
        }
        lines
    }

    pub fn add_text_page(&mut self, lines: &[PlacedLine], font_size: f32) -> Result<()> {
        let mut operations = Vec::with_capacity(lines.len() * 4 + 2);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![FONT_NAME.into(), Object::Real(font_size)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(line.x), Object::Real(self.height - line.y)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(win_ansi(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => self.font_id },
        };
        self.push_page(operations, resources)
    }

    /// Places a JPEG at the top of a new page, scaled to `draw_width` × `draw_height` points.
    pub fn add_image_page(
        &mut self,
        jpeg: Vec<u8>,
        pixel_width: u32,
        pixel_height: u32,
        draw_width: f32,
        draw_height: f32,
    ) -> Result<()> {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => pixel_width as i64,
                "Height" => pixel_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
        .with_compression(false);
        let image_id = self.doc.add_object(image);

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(draw_width),
                    0.into(),
                    0.into(),
                    Object::Real(draw_height),
                    0.into(),
                    Object::Real(self.height - draw_height),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ];
        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        };
        self.push_page(operations, resources)
    }

    fn push_page(&mut self, operations: Vec<Operation>, resources: lopdf::Dictionary) -> Result<()> {
        let content = Content { operations }
            .encode()
            .map_err(|e| DocshelfError::Conversion(format!("Could not encode page: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.page_ids.is_empty() {
            return Err(DocshelfError::Conversion(
                "PDF has no pages".to_string(),
            ));
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(self.width), Object::Real(self.height)],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| DocshelfError::Conversion(format!("Could not write PDF: {}", e)))?;
        Ok(buffer)
    }
}

/// Splits `s` into alternating runs of whitespace and non-whitespace.
fn whitespace_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in s.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            runs.push(&s[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

/// Encodes text for the WinAnsi-encoded standard font. Latin-1 maps directly;
/// anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            c if (c as u32) < 0x20 => b' ',
            c if (c as u32) <= 0x7E || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_courier_text() {
        assert_eq!(PdfWriter::text_width("abcde", 10.0), 30.0);
        assert_eq!(PdfWriter::text_width("", 12.0), 0.0);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        // 7.2pt per char at 12pt, so 36pt fits five characters.
        let lines = PdfWriter::split_text_to_size("aaa bbb ccccc", 36.0, 12.0);
        assert_eq!(lines, vec!["aaa", "bbb", "ccccc"]);
    }

    #[test]
    fn keeps_blank_lines_and_breaks_long_words() {
        let lines = PdfWriter::split_text_to_size("one\n\nabcdefghijkl", 36.0, 12.0);
        assert_eq!(lines, vec!["one", "", "abcde", "fghij", "kl"]);
    }

    #[test]
    fn keeps_indentation_and_aligned_columns() {
        let lines = PdfWriter::split_text_to_size(
            "fn main() {\n    let x = 1;\n}\ncol1    col2\n\tindented",
            A4_WIDTH_PT,
            12.0,
        );
        assert_eq!(
            lines,
            vec!["fn main() {", "    let x = 1;", "}", "col1    col2", "    indented"]
        );
    }

    #[test]
    fn wrapped_lines_stay_within_width() {
        let text = "lorem ipsum   dolor sit amet ".repeat(20);
        for line in PdfWriter::split_text_to_size(&text, 100.0, 12.0) {
            assert!(PdfWriter::text_width(&line, 12.0) <= 100.0 + WIDTH_TOLERANCE);
            assert!(!line.ends_with(' '));
        }
    }

    #[test]
    fn maps_text_to_win_ansi() {
        assert_eq!(win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi("\u{2019}\u{4e2d}"), vec![b'\'', b'?']);
    }

    #[test]
    fn writes_a_loadable_document() {
        let mut writer = PdfWriter::a4();
        writer
            .add_text_page(
                &[PlacedLine {
                    x: 42.5,
                    y: 56.7,
                    text: "hello".into(),
                }],
                12.0,
            )
            .unwrap();
        let bytes = writer.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(PdfWriter::a4().finish().is_err());
    }
}
