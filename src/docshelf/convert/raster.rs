//! Draws layout blocks into an RGB image using the `font8x8` bitmap font.
//!
//! Layout happens in two passes: blocks are first turned into draw commands
//! with absolute positions, which fixes the image height, then the commands
//! are painted. Glyphs are 8×8 cells scaled by an integer factor.

use super::html::{parse_blocks, BlockKind, LayoutBlock, Span};
use super::paginate::PAGE_HEIGHT_PX;
use super::Rasterizer;
use crate::error::{DocshelfError, Result};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

pub type RasterImage = RgbImage;

const GLYPH: u32 = 8;
/// Longest document, in pages, that is drawn into a single image.
pub const MAX_PAGES: u32 = 60;

/// Fixed presentation rules, the counterpart of a stylesheet.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    pub padding: u32,
    pub body_scale: u32,
    /// Scale for `h1`..`h6`
    pub heading_scales: [u32; 6],
    pub note_scale: u32,
    pub line_spacing: f32,
    pub paragraph_gap: u32,
    pub heading_gap: u32,
    pub list_indent: u32,
    pub cell_padding: u32,
    pub background: Rgb<u8>,
    pub text_color: Rgb<u8>,
    pub heading_color: Rgb<u8>,
    pub border_color: Rgb<u8>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            padding: 20,
            body_scale: 2,
            heading_scales: [4, 3, 3, 2, 2, 2],
            note_scale: 1,
            line_spacing: 1.5,
            paragraph_gap: 12,
            heading_gap: 16,
            list_indent: 24,
            cell_padding: 6,
            background: Rgb([255, 255, 255]),
            text_color: Rgb([51, 51, 51]),
            heading_color: Rgb([0, 0, 0]),
            border_color: Rgb([200, 200, 200]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StyledChar {
    ch: char,
    bold: bool,
    underline: bool,
}

enum DrawOp {
    Text {
        x: u32,
        y: u32,
        scale: u32,
        color: Rgb<u8>,
        chars: Vec<StyledChar>,
    },
    Rect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: Rgb<u8>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BitmapRasterizer {
    style: StyleSheet,
}

impl BitmapRasterizer {
    fn line_height(&self, scale: u32) -> u32 {
        ((GLYPH * scale) as f32 * self.style.line_spacing).ceil() as u32
    }

    fn layout(&self, blocks: &[LayoutBlock], width: u32) -> (Vec<DrawOp>, u32) {
        let style = &self.style;
        let mut ops = Vec::new();
        let mut y = style.padding;
        let content_width = width.saturating_sub(style.padding * 2).max(GLYPH);

        for block in blocks {
            match block {
                LayoutBlock::Text { kind, spans } => {
                    let (scale, color, indent, marker, gap) = match kind {
                        BlockKind::Heading(level) => {
                            let index = (*level as usize).clamp(1, 6) - 1;
                            (
                                style.heading_scales[index],
                                style.heading_color,
                                0,
                                None,
                                style.heading_gap,
                            )
                        }
                        BlockKind::Paragraph => {
                            (style.body_scale, style.text_color, 0, None, style.paragraph_gap)
                        }
                        BlockKind::Note => {
                            (style.note_scale, style.text_color, 0, None, style.paragraph_gap / 2)
                        }
                        BlockKind::ListItem { marker, level } => (
                            style.body_scale,
                            style.text_color,
                            style.list_indent * (*level as u32 + 1),
                            Some(marker.as_str()),
                            style.paragraph_gap / 2,
                        ),
                    };
                    let bold = matches!(kind, BlockKind::Heading(_));
                    let advance = GLYPH * scale;
                    let x = style.padding + indent.min(content_width / 2);
                    let mut text_x = x;

                    if let Some(marker) = marker {
                        ops.push(DrawOp::Text {
                            x,
                            y,
                            scale,
                            color,
                            chars: styled(&[Span {
                                text: marker.to_string(),
                                bold: false,
                                underline: false,
                            }]),
                        });
                        text_x += (marker.chars().count() as u32 + 1) * advance;
                    }

                    let available = (style.padding + content_width).saturating_sub(text_x);
                    let columns = (available / advance).max(1) as usize;
                    let mut chars = styled(spans);
                    if bold {
                        chars.iter_mut().for_each(|c| c.bold = true);
                    }

                    let line_height = self.line_height(scale);
                    for line in wrap(&chars, columns) {
                        ops.push(DrawOp::Text {
                            x: text_x,
                            y,
                            scale,
                            color,
                            chars: line,
                        });
                        y += line_height;
                    }
                    y += gap;
                }
                LayoutBlock::Table { rows } => {
                    y = self.layout_table(rows, content_width, y, &mut ops);
                    y += style.paragraph_gap;
                }
                LayoutBlock::Rule => {
                    ops.push(DrawOp::Rect {
                        x: style.padding,
                        y,
                        width: content_width,
                        height: 1,
                        color: style.border_color,
                    });
                    y += style.paragraph_gap;
                }
            }
        }

        (ops, y + style.padding)
    }

    fn layout_table(
        &self,
        rows: &[Vec<Vec<Span>>],
        content_width: u32,
        top: u32,
        ops: &mut Vec<DrawOp>,
    ) -> u32 {
        let style = &self.style;
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0).max(1) as u32;
        let column_width = content_width / column_count;
        let scale = style.body_scale;
        let advance = GLYPH * scale;
        let line_height = self.line_height(scale);
        let pad = style.cell_padding;
        let columns = ((column_width.saturating_sub(pad * 2)) / advance).max(1) as usize;
        let table_width = column_width * column_count;
        let left = style.padding;

        let mut y = top;
        for row in rows {
            let wrapped: Vec<Vec<Vec<StyledChar>>> =
                row.iter().map(|cell| wrap(&styled(cell), columns)).collect();
            let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1) as u32;
            let row_height = line_count * line_height + pad * 2;

            ops.push(self.border(left, y, table_width, 1));
            for (col, lines) in wrapped.into_iter().enumerate() {
                let cell_x = left + col as u32 * column_width;
                for (i, line) in lines.into_iter().enumerate() {
                    ops.push(DrawOp::Text {
                        x: cell_x + pad,
                        y: y + pad + i as u32 * line_height,
                        scale,
                        color: style.text_color,
                        chars: line,
                    });
                }
            }
            for col in 0..=column_count {
                ops.push(self.border(left + col * column_width, y, 1, row_height));
            }
            y += row_height;
        }
        ops.push(self.border(left, y, table_width + 1, 1));
        y + 1
    }

    fn border(&self, x: u32, y: u32, width: u32, height: u32) -> DrawOp {
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            color: self.style.border_color,
        }
    }
}

impl Rasterizer for BitmapRasterizer {
    fn render(&self, html: &str, width_px: u32) -> Result<RasterImage> {
        if width_px < GLYPH * 4 {
            return Err(DocshelfError::Conversion(format!(
                "Render width {}px is too narrow",
                width_px
            )));
        }

        let blocks = parse_blocks(html);
        let (ops, height) = self.layout(&blocks, width_px);
        if height > PAGE_HEIGHT_PX * MAX_PAGES {
            return Err(DocshelfError::Conversion(format!(
                "Document is too long to render (more than {} pages)",
                MAX_PAGES
            )));
        }

        let mut canvas = RgbImage::from_pixel(width_px, height.max(1), self.style.background);
        for op in &ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    scale,
                    color,
                    chars,
                } => draw_text(&mut canvas, *x, *y, *scale, *color, chars),
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill(&mut canvas, *x, *y, *width, *height, *color),
            }
        }
        Ok(canvas)
    }
}

fn styled(spans: &[Span]) -> Vec<StyledChar> {
    spans
        .iter()
        .flat_map(|span| {
            span.text.chars().map(move |ch| StyledChar {
                ch: plain_char(ch),
                bold: span.bold,
                underline: span.underline,
            })
        })
        .collect()
}

/// Folds typographic characters the bitmap font lacks into ASCII.
fn plain_char(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
        '\u{2010}'..='\u{2015}' => '-',
        '\u{2022}' => '*',
        '\u{2026}' => '.',
        '\u{00A0}' | '\t' => ' ',
        other => other,
    }
}

/// Greedy word wrap to `columns` characters; `\n` forces a break.
fn wrap(chars: &[StyledChar], columns: usize) -> Vec<Vec<StyledChar>> {
    let mut lines = Vec::new();
    let mut line: Vec<StyledChar> = Vec::new();
    let mut word: Vec<StyledChar> = Vec::new();

    let place = |line: &mut Vec<StyledChar>, lines: &mut Vec<Vec<StyledChar>>, mut word: Vec<StyledChar>| {
        if word.is_empty() {
            return;
        }
        let needed = if line.is_empty() {
            word.len()
        } else {
            line.len() + 1 + word.len()
        };
        if needed <= columns {
            if !line.is_empty() {
                line.push(StyledChar {
                    ch: ' ',
                    bold: false,
                    underline: false,
                });
            }
            line.append(&mut word);
            return;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(line));
        }
        while word.len() > columns {
            let rest = word.split_off(columns);
            lines.push(word);
            word = rest;
        }
        *line = word;
    };

    for &c in chars {
        match c.ch {
            '\n' => {
                place(&mut line, &mut lines, std::mem::take(&mut word));
                lines.push(std::mem::take(&mut line));
            }
            ' ' => place(&mut line, &mut lines, std::mem::take(&mut word)),
            _ => word.push(c),
        }
    }
    place(&mut line, &mut lines, word);
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_text(canvas: &mut RgbImage, x: u32, y: u32, scale: u32, color: Rgb<u8>, chars: &[StyledChar]) {
    let advance = GLYPH * scale;
    for (i, c) in chars.iter().enumerate() {
        let cx = x + i as u32 * advance;
        let bitmap = glyph(c.ch);
        for (row, bits) in bitmap.iter().enumerate() {
            for col in 0..GLYPH {
                // Bit 0 is the leftmost pixel.
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = cx + col * scale;
                let py = y + row as u32 * scale;
                fill(canvas, px, py, scale, scale, color);
                if c.bold {
                    fill(canvas, px + 1, py, scale, scale, color);
                }
            }
        }
        if c.underline {
            let thickness = (scale / 2).max(1);
            fill(canvas, cx, y + GLYPH * scale + 1, advance, thickness, color);
        }
    }
}

fn fill(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(canvas.width());
    let y_end = y.saturating_add(height).min(canvas.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<StyledChar> {
        text.chars()
            .map(|ch| StyledChar {
                ch,
                bold: false,
                underline: false,
            })
            .collect()
    }

    fn as_strings(lines: Vec<Vec<StyledChar>>) -> Vec<String> {
        lines
            .into_iter()
            .map(|l| l.into_iter().map(|c| c.ch).collect())
            .collect()
    }

    #[test]
    fn wraps_words_and_hard_breaks() {
        let lines = wrap(&chars("the quick brown fox\nend"), 10);
        assert_eq!(as_strings(lines), vec!["the quick", "brown fox", "end"]);

        let lines = wrap(&chars("abcdefghijk"), 4);
        assert_eq!(as_strings(lines), vec!["abcd", "efgh", "ijk"]);
    }

    #[test]
    fn renders_at_requested_width() {
        let image = BitmapRasterizer::default()
            .render("<h1>Title</h1><p>Body text</p>", 794)
            .unwrap();
        assert_eq!(image.width(), 794);
        assert!(image.height() > 40);
        // Some pixel was painted in the text color range.
        assert!(image.pixels().any(|p| p.0 != [255, 255, 255]));
    }

    #[test]
    fn longer_documents_are_taller() {
        let rasterizer = BitmapRasterizer::default();
        let short = rasterizer.render("<p>one</p>", 794).unwrap();
        let body: String = (0..200).map(|i| format!("<p>paragraph {}</p>", i)).collect();
        let long = rasterizer.render(&body, 794).unwrap();
        assert!(long.height() > PAGE_HEIGHT_PX);
        assert!(long.height() > short.height());
    }

    #[test]
    fn draws_tables_with_borders() {
        let image = BitmapRasterizer::default()
            .render("<table><tr><td>a</td><td>b</td></tr></table>", 400)
            .unwrap();
        let border = StyleSheet::default().border_color;
        assert_eq!(*image.get_pixel(20, 20), border);
    }

    #[test]
    fn rejects_tiny_widths() {
        assert!(BitmapRasterizer::default().render("<p>x</p>", 10).is_err());
    }
}
