//! Reads the HTML subset produced by [`super::docx`] into layout blocks.
//!
//! Parsing is lenient: mismatched end tags are tolerated, unknown tags are
//! transparent, and text that does not unescape is used as-is. Whitespace is
//! collapsed the way a browser would.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem { marker: String, level: u8 },
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutBlock {
    Text { kind: BlockKind, spans: Vec<Span> },
    Table { rows: Vec<Vec<Vec<Span>>> },
    Rule,
}

impl LayoutBlock {
    fn has_text(&self) -> bool {
        let visible = |spans: &[Span]| spans.iter().any(|s| !s.text.trim().is_empty());
        match self {
            LayoutBlock::Text { spans, .. } => visible(spans),
            LayoutBlock::Table { rows } => rows.iter().flatten().any(|cell| visible(cell)),
            LayoutBlock::Rule => false,
        }
    }
}

/// Whether the HTML would show any text at all.
pub fn has_visible_text(html: &str) -> bool {
    parse_blocks(html).iter().any(LayoutBlock::has_text)
}

#[derive(Default)]
struct ListState {
    ordered: bool,
    counter: usize,
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<Vec<Span>>>,
    row: Option<Vec<Vec<Span>>>,
    cell: Option<Vec<Span>>,
}

#[derive(Default)]
struct BlockParser {
    blocks: Vec<LayoutBlock>,
    current: Option<(BlockKind, Vec<Span>)>,
    lists: Vec<ListState>,
    table: Option<TableState>,
    bold: usize,
    underline: usize,
    in_notes: bool,
}

impl BlockParser {
    fn start(&mut self, e: &BytesStart) {
        let name = e.local_name().as_ref().to_ascii_lowercase();
        match name.as_slice() {
            [b'h', n @ b'1'..=b'6'] => self.begin(BlockKind::Heading(n - b'0')),
            b"p" | b"div" => {
                if self.in_cell() {
                    if self.cell_has_text() {
                        self.push_text_raw("\n");
                    }
                } else {
                    let kind = if self.in_notes {
                        BlockKind::Note
                    } else {
                        BlockKind::Paragraph
                    };
                    self.begin(kind);
                }
            }
            b"ul" | b"ol" => {
                self.flush();
                self.lists.push(ListState {
                    ordered: name == b"ol",
                    counter: 0,
                });
            }
            b"li" => {
                let depth = self.lists.len().saturating_sub(1) as u8;
                let level = attr(e, b"data-level")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(depth);
                let marker = match self.lists.last_mut() {
                    Some(list) if list.ordered => {
                        list.counter += 1;
                        format!("{}.", list.counter)
                    }
                    _ => "\u{2022}".to_string(),
                };
                self.begin(BlockKind::ListItem { marker, level });
            }
            b"table" => {
                self.flush();
                self.table = Some(TableState::default());
            }
            b"tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.row = Some(Vec::new());
                }
            }
            b"td" | b"th" => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(Vec::new());
                }
                if name == b"th" {
                    self.bold += 1;
                }
            }
            b"strong" | b"b" => self.bold += 1,
            b"u" => self.underline += 1,
            b"br" => self.push_text_raw("\n"),
            b"hr" => {
                self.flush();
                self.blocks.push(LayoutBlock::Rule);
            }
            b"section" => {
                self.flush();
                self.in_notes = attr(e, b"class").is_some_and(|c| c.contains("footnotes"));
            }
            b"header" | b"footer" | b"main" => self.flush(),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        let name = name.to_ascii_lowercase();
        match name.as_slice() {
            [b'h', b'1'..=b'6'] | b"li" => self.flush(),
            b"p" | b"div" if !self.in_cell() => self.flush(),
            b"ul" | b"ol" => {
                self.flush();
                self.lists.pop();
            }
            b"td" | b"th" => {
                if let Some(table) = self.table.as_mut() {
                    if let (Some(cell), Some(row)) = (table.cell.take(), table.row.as_mut()) {
                        row.push(trim_spans(cell));
                    }
                }
                if name == b"th" {
                    self.bold = self.bold.saturating_sub(1);
                }
            }
            b"tr" => {
                if let Some(table) = self.table.as_mut() {
                    if let Some(row) = table.row.take() {
                        table.rows.push(row);
                    }
                }
            }
            b"table" => {
                if let Some(table) = self.table.take() {
                    if !table.rows.is_empty() {
                        self.blocks.push(LayoutBlock::Table { rows: table.rows });
                    }
                }
            }
            b"strong" | b"b" => self.bold = self.bold.saturating_sub(1),
            b"u" => self.underline = self.underline.saturating_sub(1),
            b"section" => {
                self.flush();
                self.in_notes = false;
            }
            b"header" | b"footer" | b"main" => self.flush(),
            _ => {}
        }
    }

    fn in_cell(&self) -> bool {
        self.table.as_ref().is_some_and(|t| t.cell.is_some())
    }

    fn cell_has_text(&self) -> bool {
        self.table
            .as_ref()
            .and_then(|t| t.cell.as_ref())
            .is_some_and(|cell| cell.iter().any(|s| !s.text.trim().is_empty()))
    }

    fn begin(&mut self, kind: BlockKind) {
        self.flush();
        self.current = Some((kind, Vec::new()));
    }

    fn flush(&mut self) {
        if let Some((kind, spans)) = self.current.take() {
            let spans = trim_spans(spans);
            if !spans.is_empty() {
                self.blocks.push(LayoutBlock::Text { kind, spans });
            }
        }
    }

    /// Appends text with HTML whitespace collapsing.
    fn push_text(&mut self, text: &str) {
        let mut collapsed = String::with_capacity(text.len());
        let mut last_space = false;
        for c in text.chars() {
            if c.is_whitespace() {
                if !last_space {
                    collapsed.push(' ');
                }
                last_space = true;
            } else {
                collapsed.push(c);
                last_space = false;
            }
        }
        self.push_text_raw(&collapsed);
    }

    fn push_text_raw(&mut self, text: &str) {
        let bold = self.bold > 0;
        let underline = self.underline > 0;

        let spans = if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell
        } else {
            if self.current.is_none() {
                if text.trim().is_empty() {
                    return;
                }
                let kind = if self.in_notes {
                    BlockKind::Note
                } else {
                    BlockKind::Paragraph
                };
                self.current = Some((kind, Vec::new()));
            }
            match self.current.as_mut() {
                Some((_, spans)) => spans,
                None => return,
            }
        };

        match spans.last_mut() {
            Some(last) if last.bold == bold && last.underline == underline => {
                // Avoid doubled spaces across tag boundaries.
                if last.text.ends_with(' ') && text.starts_with(' ') {
                    last.text.push_str(&text[1..]);
                } else {
                    last.text.push_str(text);
                }
            }
            _ => spans.push(Span {
                text: text.to_string(),
                bold,
                underline,
            }),
        }
    }
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(name))
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned())
        })
}

/// Drops leading and trailing whitespace of a block and empty spans.
fn trim_spans(mut spans: Vec<Span>) -> Vec<Span> {
    if let Some(first) = spans.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    spans.retain(|s| !s.text.is_empty());
    if spans.iter().all(|s| s.text.trim().is_empty()) {
        spans.clear();
    }
    spans
}

pub fn parse_blocks(html: &str) -> Vec<LayoutBlock> {
    let mut reader = Reader::from_str(html);
    reader.check_end_names(false);
    let mut parser = BlockParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => parser.start(&e),
            Ok(Event::Empty(e)) => {
                parser.start(&e);
                let name = e.local_name().as_ref().to_vec();
                parser.end(&name);
            }
            Ok(Event::End(e)) => {
                let name = e.local_name().as_ref().to_vec();
                parser.end(&name);
            }
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(text) => parser.push_text(&text),
                Err(_) => parser.push_text(&String::from_utf8_lossy(&t)),
            },
            Ok(Event::CData(t)) => parser.push_text(&String::from_utf8_lossy(&t)),
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    parser.flush();
    if let Some(table) = parser.table.take() {
        if !table.rows.is_empty() {
            parser.blocks.push(LayoutBlock::Table { rows: table.rows });
        }
    }
    parser.blocks
}
