//! DOCX → HTML.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Paragraphs become `<p>` or `<h1>`..`<h6>` (from the paragraph style),
//! numbered paragraphs become `<ul>`/`<ol>` items, runs keep bold, italic,
//! underline and superscript, and tables become `<table>`.
//!
//! [`DocxHtmlExtractor`] emits the body only. [`DocxRenderer`] additionally
//! emits header and footer parts and a footnotes section.

use super::{DocumentRenderer, HtmlExtractor};
use crate::error::{DocshelfError, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const NUMBERING_PART: &str = "word/numbering.xml";
const FOOTNOTES_PART: &str = "word/footnotes.xml";

/// Body-only extraction, the input of the basic Word path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxHtmlExtractor;

impl HtmlExtractor for DocxHtmlExtractor {
    fn extract_html(&self, docx: &[u8]) -> Result<String> {
        let mut package = Package::open(docx)?;
        let body = package.body()?;
        let numbering = package.numbering()?;

        let mut html = String::new();
        write_blocks(&body.blocks, &numbering, &mut html);
        Ok(html)
    }
}

/// Full-page rendering with headers, footers and footnotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocumentRenderer for DocxRenderer {
    fn render_html(&self, docx: &[u8]) -> Result<String> {
        let mut package = Package::open(docx)?;
        let body = package.body()?;
        let numbering = package.numbering()?;
        let headers = package.parts_named("header")?;
        let footers = package.parts_named("footer")?;
        let notes = match package.read(FOOTNOTES_PART)? {
            Some(xml) => parse_part(&xml)?.footnotes,
            None => Vec::new(),
        };
        debug!(
            headers = headers.len(),
            footers = footers.len(),
            footnotes = notes.len(),
            "rendering docx with page furniture"
        );

        let mut html = String::new();
        for header in &headers {
            html.push_str("<header>");
            write_blocks(&header.blocks, &numbering, &mut html);
            html.push_str("</header>");
        }
        html.push_str("<main>");
        write_blocks(&body.blocks, &numbering, &mut html);
        html.push_str("</main>");

        if !notes.is_empty() {
            html.push_str("<section class=\"footnotes\"><hr />");
            for note in &notes {
                write_footnote(note, &numbering, &mut html);
            }
            html.push_str("</section>");
        }

        for footer in &footers {
            html.push_str("<footer>");
            write_blocks(&footer.blocks, &numbering, &mut html);
            html.push_str("</footer>");
        }
        Ok(html)
    }
}

struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    fn open(bytes: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            DocshelfError::Conversion(format!("Not a valid Word (.docx) document: {}", e))
        })?;
        Ok(Self { archive })
    }

    fn read(&mut self, name: &str) -> Result<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(DocshelfError::Conversion(format!(
                    "Could not read {}: {}",
                    name, e
                )))
            }
        };
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        Ok(Some(xml))
    }

    fn body(&mut self) -> Result<Part> {
        let xml = self.read(DOCUMENT_PART)?.ok_or_else(|| {
            DocshelfError::Conversion(format!("Document has no {}", DOCUMENT_PART))
        })?;
        parse_part(&xml)
    }

    fn numbering(&mut self) -> Result<Numbering> {
        match self.read(NUMBERING_PART)? {
            Some(xml) => parse_numbering(&xml),
            None => Ok(Numbering::default()),
        }
    }

    /// Parses every `word/<prefix>N.xml` part, in name order.
    fn parts_named(&mut self, prefix: &str) -> Result<Vec<Part>> {
        let start = format!("word/{}", prefix);
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|n| n.starts_with(&start) && n.ends_with(".xml"))
            .map(str::to_string)
            .collect();
        names.sort();

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            if let Some(xml) = self.read(&name)? {
                parts.push(parse_part(&xml)?);
            }
        }
        Ok(parts)
    }
}

// --- Document model ---

#[derive(Debug, Clone, Default, PartialEq)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
    superscript: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ListRef {
    num_id: String,
    level: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Paragraph {
    style: Option<String>,
    list: Option<ListRef>,
    runs: Vec<Run>,
}

impl Paragraph {
    fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    fn heading_level(&self) -> Option<u8> {
        let style = self.style.as_deref()?.to_ascii_lowercase();
        match style.as_str() {
            "title" => Some(1),
            "subtitle" => Some(2),
            s => s
                .strip_prefix("heading")
                .and_then(|n| n.trim().parse::<u8>().ok())
                .filter(|n| (1..=6).contains(n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Paragraph(Paragraph),
    Table(Vec<Vec<Vec<Paragraph>>>),
}

#[derive(Debug, Clone, PartialEq)]
struct Footnote {
    id: String,
    blocks: Vec<Block>,
}

#[derive(Debug, Default)]
struct Part {
    blocks: Vec<Block>,
    footnotes: Vec<Footnote>,
}

/// `numId` → per-level "is ordered".
#[derive(Debug, Default)]
struct Numbering {
    ordered: HashMap<String, HashMap<u8, bool>>,
}

impl Numbering {
    fn is_ordered(&self, list: &ListRef) -> bool {
        self.ordered
            .get(&list.num_id)
            .and_then(|levels| levels.get(&list.level))
            .copied()
            .unwrap_or(false)
    }
}

// --- XML parsing ---

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// `<w:b/>` is on; `<w:b w:val="false"/>` and friends are off.
fn toggle(e: &BytesStart) -> bool {
    !matches!(
        attr(e, b"val").as_deref(),
        Some("false") | Some("0") | Some("none")
    )
}

fn xml_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> DocshelfError {
    DocshelfError::Conversion(format!(
        "Malformed document XML at byte {}: {}",
        reader.buffer_position(),
        err
    ))
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<Vec<Paragraph>>>,
    row: Option<Vec<Vec<Paragraph>>>,
    cell: Option<Vec<Paragraph>>,
}

/// A paragraph still being read, plus text-box paragraphs found inside it.
#[derive(Default)]
struct OpenParagraph {
    paragraph: Paragraph,
    nested: Vec<Paragraph>,
}

#[derive(Default)]
struct PartParser {
    blocks: Vec<Block>,
    footnotes: Vec<Footnote>,
    note: Option<(String, bool, usize)>,
    tables: Vec<TableBuilder>,
    // Stacks: text boxes nest whole paragraphs inside a run.
    paragraphs: Vec<OpenParagraph>,
    runs: Vec<Run>,
    // One entry per open mc:AlternateContent: whether a Choice was seen.
    alternates: Vec<bool>,
    skip_depth: usize,
    in_paragraph_props: bool,
    in_run_props: bool,
    in_numbering: bool,
    in_text: bool,
}

impl PartParser {
    fn paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        self.paragraphs.last_mut().map(|open| &mut open.paragraph)
    }

    fn in_run(&self) -> bool {
        !self.runs.is_empty()
    }

    fn start(&mut self, e: &BytesStart) {
        let name = e.local_name();
        if self.skip_depth > 0 {
            if name.as_ref() == b"Fallback" {
                self.skip_depth += 1;
            }
            return;
        }

        match name.as_ref() {
            b"AlternateContent" => self.alternates.push(false),
            b"Choice" => {
                if let Some(seen) = self.alternates.last_mut() {
                    *seen = true;
                }
            }
            b"Fallback" if self.alternates.last().copied().unwrap_or(false) => {
                self.skip_depth = 1;
            }
            b"p" => self.paragraphs.push(OpenParagraph::default()),
            b"pPr" => self.in_paragraph_props = true,
            b"pStyle" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph_mut() {
                    p.style = attr(e, b"val");
                }
            }
            b"numPr" if self.in_paragraph_props => {
                self.in_numbering = true;
                if let Some(p) = self.paragraph_mut() {
                    p.list = Some(ListRef::default());
                }
            }
            b"ilvl" if self.in_numbering => {
                if let Some(list) = self.paragraph_mut().and_then(|p| p.list.as_mut()) {
                    list.level = attr(e, b"val").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            b"numId" if self.in_numbering => {
                if let Some(list) = self.paragraph_mut().and_then(|p| p.list.as_mut()) {
                    list.num_id = attr(e, b"val").unwrap_or_default();
                }
            }
            b"r" => self.runs.push(Run::default()),
            b"rPr" if self.in_run() => self.in_run_props = true,
            b"b" if self.in_run_props => self.with_run(|r| r.bold = toggle(e)),
            b"i" if self.in_run_props => self.with_run(|r| r.italic = toggle(e)),
            b"u" if self.in_run_props => self.with_run(|r| r.underline = toggle(e)),
            b"vertAlign" if self.in_run_props => {
                let superscript = attr(e, b"val").as_deref() == Some("superscript");
                self.with_run(|r| r.superscript = superscript);
            }
            b"t" if self.in_run() => self.in_text = true,
            b"tab" if self.in_run() => self.with_run(|r| r.text.push('\t')),
            b"br" | b"cr" if self.in_run() => self.with_run(|r| r.text.push('\n')),
            b"footnoteReference" if self.in_run() => {
                let id = attr(e, b"id").unwrap_or_default();
                self.with_run(|r| {
                    r.superscript = true;
                    r.text.push_str(&format!("[{}]", id));
                });
            }
            b"footnoteRef" if self.in_run() => {
                let id = self.note.as_ref().map(|n| n.0.clone()).unwrap_or_default();
                self.with_run(|r| {
                    r.superscript = true;
                    r.text.push_str(&format!("[{}] ", id));
                });
            }
            b"tbl" => self.tables.push(TableBuilder::default()),
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.row = Some(Vec::new());
                }
            }
            b"tc" => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell = Some(Vec::new());
                }
            }
            b"footnote" => {
                let id = attr(e, b"id").unwrap_or_default();
                let separator = attr(e, b"type")
                    .map(|t| t.contains("eparator"))
                    .unwrap_or(false);
                self.note = Some((id, separator, self.blocks.len()));
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            if name == b"Fallback" {
                self.skip_depth -= 1;
            }
            return;
        }

        match name {
            b"AlternateContent" => {
                self.alternates.pop();
            }
            b"p" => {
                if let Some(open) = self.paragraphs.pop() {
                    match self.paragraphs.last_mut() {
                        // Text-box paragraphs follow the paragraph that holds them
                        Some(outer) => {
                            outer.nested.push(open.paragraph);
                            outer.nested.extend(open.nested);
                        }
                        None => {
                            self.push_paragraph(open.paragraph);
                            for nested in open.nested {
                                self.push_paragraph(nested);
                            }
                        }
                    }
                }
            }
            b"pPr" => self.in_paragraph_props = false,
            b"numPr" => self.in_numbering = false,
            b"r" => {
                if let Some(run) = self.runs.pop() {
                    if let Some(paragraph) = self.paragraph_mut() {
                        if !run.text.is_empty() {
                            paragraph.runs.push(run);
                        }
                    }
                }
                self.in_run_props = false;
            }
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"tc" => {
                if let Some(table) = self.tables.last_mut() {
                    if let (Some(cell), Some(row)) = (table.cell.take(), table.row.as_mut()) {
                        row.push(cell);
                    }
                }
            }
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    if let Some(row) = table.row.take() {
                        table.rows.push(row);
                    }
                }
            }
            b"tbl" => {
                if let Some(table) = self.tables.pop() {
                    self.push_table(table.rows);
                }
            }
            b"footnote" => {
                if let Some((id, separator, start)) = self.note.take() {
                    let blocks: Vec<Block> = self.blocks.drain(start..).collect();
                    if !separator {
                        self.footnotes.push(Footnote { id, blocks });
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.skip_depth == 0 {
            self.with_run(|r| r.text.push_str(text));
        }
    }

    fn with_run(&mut self, f: impl FnOnce(&mut Run)) {
        if let Some(run) = self.runs.last_mut() {
            f(run);
        }
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        match self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
            Some(cell) => cell.push(paragraph),
            None => self.blocks.push(Block::Paragraph(paragraph)),
        }
    }

    /// Nested tables are flattened into the enclosing cell.
    fn push_table(&mut self, rows: Vec<Vec<Vec<Paragraph>>>) {
        match self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
            Some(cell) => cell.extend(rows.into_iter().flatten().flatten()),
            None => self.blocks.push(Block::Table(rows)),
        }
    }
}

fn parse_part(xml: &str) -> Result<Part> {
    let mut reader = Reader::from_str(xml);
    let mut parser = PartParser::default();

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
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| xml_error(&reader, e))?;
                parser.text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
    }

    Ok(Part {
        blocks: parser.blocks,
        footnotes: parser.footnotes,
    })
}

fn parse_numbering(xml: &str) -> Result<Numbering> {
    let mut reader = Reader::from_str(xml);
    // abstractNumId → level → ordered
    let mut abstract_formats: HashMap<String, HashMap<u8, bool>> = HashMap::new();
    // numId → abstractNumId
    let mut instances: HashMap<String, String> = HashMap::new();

    let mut current_abstract: Option<String> = None;
    let mut current_level: Option<u8> = None;
    let mut current_num: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| xml_error(&reader, e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"abstractNum" => current_abstract = attr(e, b"abstractNumId"),
                b"lvl" => current_level = attr(e, b"ilvl").and_then(|v| v.parse().ok()),
                b"numFmt" => {
                    if let (Some(abs), Some(level)) = (&current_abstract, current_level) {
                        let ordered = attr(e, b"val").is_some_and(|f| f != "bullet" && f != "none");
                        abstract_formats
                            .entry(abs.clone())
                            .or_default()
                            .insert(level, ordered);
                    }
                }
                b"num" => current_num = attr(e, b"numId"),
                b"abstractNumId" => {
                    if let (Some(num), Some(abs)) = (&current_num, attr(e, b"val")) {
                        instances.insert(num.clone(), abs);
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"abstractNum" => current_abstract = None,
                b"lvl" => current_level = None,
                b"num" => current_num = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let ordered = instances
        .into_iter()
        .filter_map(|(num, abs)| abstract_formats.get(&abs).map(|f| (num, f.clone())))
        .collect();
    Ok(Numbering { ordered })
}

// --- HTML output ---

fn write_blocks(blocks: &[Block], numbering: &Numbering, out: &mut String) {
    let mut open_list: Option<bool> = None;

    for block in blocks {
        let list_item = match block {
            Block::Paragraph(p) if !p.is_blank() => p.list.as_ref().map(|l| (p, l)),
            _ => None,
        };

        match list_item {
            Some((paragraph, list)) => {
                let ordered = numbering.is_ordered(list);
                if open_list != Some(ordered) {
                    close_list(&mut open_list, out);
                    out.push_str(if ordered { "<ol>" } else { "<ul>" });
                    open_list = Some(ordered);
                }
                out.push_str(&format!("<li data-level=\"{}\">", list.level));
                write_runs(&paragraph.runs, out);
                out.push_str("</li>");
            }
            None => {
                close_list(&mut open_list, out);
                match block {
                    Block::Paragraph(p) => write_paragraph(p, out),
                    Block::Table(rows) => write_table(rows, out),
                }
            }
        }
    }
    close_list(&mut open_list, out);
}

fn close_list(open_list: &mut Option<bool>, out: &mut String) {
    if let Some(ordered) = open_list.take() {
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }
}

fn write_paragraph(paragraph: &Paragraph, out: &mut String) {
    if paragraph.is_blank() {
        return;
    }
    let tag = match paragraph.heading_level() {
        Some(level) => format!("h{}", level),
        None => "p".to_string(),
    };
    out.push_str(&format!("<{}>", tag));
    write_runs(&paragraph.runs, out);
    out.push_str(&format!("</{}>", tag));
}

fn write_table(rows: &[Vec<Vec<Paragraph>>], out: &mut String) {
    out.push_str("<table>");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            for paragraph in cell.iter().filter(|p| !p.is_blank()) {
                out.push_str("<p>");
                write_runs(&paragraph.runs, out);
                out.push_str("</p>");
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

fn write_footnote(note: &Footnote, numbering: &Numbering, out: &mut String) {
    let mut body = String::new();
    write_blocks(&note.blocks, numbering, &mut body);
    // The note's reference mark comes from its own `footnoteRef` run.
    out.push_str(&format!("<div class=\"footnote\" id=\"footnote-{}\">", escape(&note.id)));
    out.push_str(&body);
    out.push_str("</div>");
}

fn write_runs(runs: &[Run], out: &mut String) {
    for run in runs {
        let mut open = Vec::new();
        if run.bold {
            open.push("strong");
        }
        if run.italic {
            open.push("em");
        }
        if run.underline {
            open.push("u");
        }
        if run.superscript {
            open.push("sup");
        }

        for tag in &open {
            out.push_str(&format!("<{}>", tag));
        }
        for (i, line) in run.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("<br />");
            }
            out.push_str(&escape(&line.replace('\t', " ")));
        }
        for tag in open.iter().rev() {
            out.push_str(&format!("</{}>", tag));
        }
    }
}
