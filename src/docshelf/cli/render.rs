//! Terminal output for command results.
//!
//! Layout (column widths, truncation, age formatting) is computed into plain
//! strings first so it can be tested without a terminal; color is applied
//! only when printing.

use chrono::{Local, NaiveDate};
use colored::Colorize;
use docshelf::api::{CmdMessage, MessageLevel};
use docshelf::config::{ShelfConfig, CONFIG_KEYS};
use docshelf::index::DisplayDocument;
use std::path::PathBuf;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const TYPE_WIDTH: usize = 8;
const SIZE_WIDTH: usize = 12;
const LEFT_PAD: &str = "    ";

/// Pre-computed columns of one list line.
#[derive(Debug, PartialEq, Eq)]
pub struct DocumentLine {
    pub index: String,
    pub name: String,
    pub padding: String,
    pub details: String,
    pub age: String,
}

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub fn print_documents(documents: &[DisplayDocument]) {
    if documents.is_empty() {
        println!("No documents found.");
        return;
    }

    for doc in documents {
        let line = document_line(doc, Local::now().date_naive());
        println!(
            "{}{}{}{}{}{}",
            LEFT_PAD,
            line.index.yellow(),
            line.name,
            line.padding,
            line.details.dimmed(),
            line.age.dimmed()
        );
    }
}

pub fn document_line(doc: &DisplayDocument, today: NaiveDate) -> DocumentLine {
    let index = format!("{}. ", doc.index);
    let file_type = doc.record.file_type.as_deref().unwrap_or("?");
    let size = doc.record.size.as_deref().unwrap_or("");
    let details = format!(
        "{:>tw$}{:>sw$}",
        file_type,
        size,
        tw = TYPE_WIDTH,
        sw = SIZE_WIDTH
    );

    let fixed = LEFT_PAD.width() + index.width() + TYPE_WIDTH + SIZE_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let name = truncate_to_width(&doc.record.name, available);
    let padding = " ".repeat(available.saturating_sub(name.width()));

    DocumentLine {
        index,
        name,
        padding,
        details,
        age: format_age(&doc.record.date, today),
    }
}

pub fn print_full_documents(documents: &[DisplayDocument]) {
    for (i, doc) in documents.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!(
            "{} {}",
            format!("{}.", doc.index).yellow(),
            doc.record.name.bold()
        );
        println!("--------------------------------");
        for (label, value) in detail_rows(doc) {
            let label = format!("{:<12}", format!("{}:", label));
            println!("{} {}", label.dimmed(), value);
        }
    }
}

fn detail_rows(doc: &DisplayDocument) -> Vec<(&'static str, String)> {
    let record = &doc.record;
    let mut rows = vec![
        ("Id", record.id.clone()),
        (
            "Type",
            record.file_type.clone().unwrap_or_else(|| "unknown".into()),
        ),
        ("Size", record.size.clone().unwrap_or_default()),
        ("Added", record.date.clone()),
    ];
    if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
        rows.push(("Description", description.to_string()));
    }
    rows
}

pub fn print_config(config: &ShelfConfig) {
    for key in CONFIG_KEYS {
        if let Ok(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

pub fn print_paths(paths: &[PathBuf]) {
    for path in paths {
        println!("{}", path.display());
    }
}

pub fn print_saved(path: &std::path::Path) {
    println!("{} {}", "Saved".green(), path.display());
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

/// Age of an `M/D/YYYY` date, right-aligned to [`TIME_WIDTH`].
fn format_age(date: &str, today: NaiveDate) -> String {
    let age = match NaiveDate::parse_from_str(date, "%m/%d/%Y") {
        Ok(added) => {
            let days = today.signed_duration_since(added).num_days();
            if days <= 0 {
                "today".to_string()
            } else {
                let formatter = timeago::Formatter::new();
                formatter.convert(std::time::Duration::from_secs(days as u64 * 86_400))
            }
        }
        Err(_) => date.to_string(),
    };
    format!("{:>width$}", age, width = TIME_WIDTH)
}
