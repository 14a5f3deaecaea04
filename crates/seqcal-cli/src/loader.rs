//! Reads appointment rules and note pages from disk.

use anyhow::{Context, Result};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use seqcal_core::models::{Appointment, Task};
use seqcal_core::page::Page;
use seqcal_core::parser::TodoLineParser;
use std::fs;
use std::path::{Path, PathBuf};

/// Note subdirectories of a Logseq graph.
const NOTE_DIRS: [&str; 2] = ["pages", "journals"];

/// Loads every `*.json` file in `dir`, each holding an array of
/// appointments. Files are read in name order, so configuration order is
/// stable across runs.
pub fn load_appointments(dir: &Path) -> Result<Vec<Appointment>> {
    let mut appointments = Vec::new();
    for path in files_with_extension(dir, "json")? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut batch: Vec<Appointment> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid appointment file {}", path.display()))?;
        log::debug!("Loaded {} appointment(s) from {}", batch.len(), path.display());
        appointments.append(&mut batch);
    }
    Ok(appointments)
}

/// A Markdown note and the name of the page it belongs to.
#[derive(Debug, Clone)]
pub struct NoteFile {
    pub page: String,
    pub content: String,
}

/// Reads the `pages/` and `journals/` Markdown files of the graph at
/// `root`, or `root` itself when it has neither.
pub fn load_notes(root: &Path) -> Result<Vec<NoteFile>> {
    let dirs: Vec<PathBuf> = NOTE_DIRS
        .iter()
        .map(|d| root.join(d))
        .filter(|d| d.is_dir())
        .collect();
    let dirs = if dirs.is_empty() { vec![root.to_path_buf()] } else { dirs };

    let mut notes = Vec::new();
    for dir in dirs {
        for path in files_with_extension(&dir, "md")? {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            notes.push(NoteFile {
                page: page_name(&path),
                content,
            });
        }
    }
    log::debug!("Found {} note file(s) under {}", notes.len(), root.display());
    Ok(notes)
}

/// Logseq stores namespaced pages as `a___b.md`.
fn page_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace("___", "/"))
        .unwrap_or_default()
}

fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Text of every list item, one string per item, excluding nested items.
/// Line breaks and paragraph ends become newlines.
pub fn list_items(markdown: &str) -> Vec<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

    let mut items = Vec::new();
    let mut open: Vec<String> = Vec::new();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Item) => open.push(String::new()),
            Event::End(TagEnd::Item) => {
                if let Some(text) = open.pop() {
                    items.push(text.trim().to_string());
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak | Event::End(TagEnd::Paragraph) => {
                if let Some(current) = open.last_mut() {
                    current.push('\n');
                }
            }
            _ => {}
        }
    }
    items
}

fn is_task_item(item: &str) -> bool {
    item.starts_with("TODO ") || item.starts_with("LATER ")
}

/// Parses the TODO and LATER items of every note into pages and tasks.
///
/// Stops at the first item whose date cannot be read; a skipped task is
/// worse than a failed run.
pub fn collect_tasks(parser: &TodoLineParser, notes: &[NoteFile]) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    for note in notes {
        let mut tasks: Vec<Task> = Vec::new();
        for item in list_items(&note.content).iter().filter(|i| is_task_item(i)) {
            let parsed = parser
                .parse(item, &note.page)
                .with_context(|| format!("In page '{}'", note.page))?;
            tasks.extend(parsed);
        }
        pages.push(Page::from_markdown(&note.page, &note.content).with_tasks(tasks));
    }
    Ok(pages)
}
