//! Reading a site from disk: known files, documents and their front-matter.

use anyhow::{Context, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use relative_images::{Document, FileIndex, ProcessError, Processor};
use serde_json::Value;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::render;

/// File extensions treated as Markdown documents.
const MARKDOWN: &[&str] = &["md", "markdown", "mdx"];

/// Collects every file below `root` into a snapshot.
///
/// Hidden files and directories are skipped.
pub fn scan_files(root: &Path) -> Result<FileIndex> {
    Ok(FileIndex::new(walk(root)?))
}

/// Lists the Markdown documents below `dir`, sorted.
///
/// A directory that does not exist has no documents.
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!(%dir, "content directory does not exist");
        return Ok(Vec::new());
    }
    let files = walk(dir)?
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| MARKDOWN.contains(&ext)))
        .collect();
    Ok(files)
}

fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to walk `{dir}`"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => files.push(path),
            Err(path) => warn!(path = %path.display(), "skipping non UTF-8 path"),
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// The syntax of a front-matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Fenced by `---`
    Yaml,
    /// Fenced by `+++`
    Toml,
}

impl Format {
    fn fence(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// A document's text cut into its front-matter block and body.
#[derive(Debug, PartialEq, Eq)]
pub struct Parts<'a> {
    /// The format and contents between the fences.
    pub frontmatter: Option<(Format, &'a str)>,
    /// The whole front-matter block, fences included.
    pub head: &'a str,
    pub body: &'a str,
}

/// Splits off a front-matter block opening on the first line.
pub fn split(text: &str) -> Parts<'_> {
    let none = Parts {
        frontmatter: None,
        head: "",
        body: text,
    };
    let format = match text.lines().next().map(str::trim_end) {
        Some("---") => Format::Yaml,
        Some("+++") => Format::Toml,
        _ => return none,
    };

    let start = text.find('\n').map_or(text.len(), |i| i + 1);
    let mut offset = start;
    while offset < text.len() {
        let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i + 1);
        if text[offset..end].trim_end() == format.fence() {
            return Parts {
                frontmatter: Some((format, &text[start..offset])),
                head: &text[..end],
                body: &text[end..],
            };
        }
        offset = end;
    }
    none
}

pub fn parse_frontmatter(format: Format, raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value = match format {
        Format::Yaml => serde_yaml::from_str::<Value>(raw).context("invalid YAML front-matter")?,
        Format::Toml => {
            let table: toml::Table = toml::from_str(raw).context("invalid TOML front-matter")?;
            toml_to_json(toml::Value::Table(table))
        }
    };
    Ok(value)
}

/// Serializes front-matter, fences included.
pub fn serialize_frontmatter(format: Format, value: &Value) -> Result<String> {
    let mut data = match format {
        Format::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML")?,
        Format::Toml => toml::to_string(value).context("failed to serialize TOML")?,
    };
    if !data.ends_with('\n') {
        data.push('\n');
    }
    let fence = format.fence();
    Ok(format!("{fence}\n{data}{fence}\n"))
}

/// TOML datetimes have no JSON counterpart and become strings.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// What processing one document produced.
#[derive(Debug)]
pub enum Rewrite {
    Unchanged,
    Changed(String),
    Failed(ProcessError),
}

/// Runs `processor` on the document at `path` whose contents are `text`.
///
/// Only the parts that had references rewritten are serialized again, the
/// rest of the text is kept as it was.
pub fn rewrite(
    processor: &Processor,
    files: &FileIndex,
    path: &Path,
    text: &str,
) -> Result<Rewrite> {
    let parts = split(text);
    let frontmatter = match parts.frontmatter {
        Some((format, raw)) => parse_frontmatter(format, raw)
            .with_context(|| format!("failed to parse front-matter of `{path}`"))?,
        None => Value::Null,
    };

    let mut document = Document::parse(path.as_str(), parts.body)
        .with_path(path.as_str())
        .with_frontmatter(frontmatter);
    let summary = match processor.process(&mut document, files) {
        Ok(summary) => summary,
        Err(err) => return Ok(Rewrite::Failed(err)),
    };
    if summary.total() == 0 {
        return Ok(Rewrite::Unchanged);
    }

    let mut rewritten = match parts.frontmatter {
        Some((format, _)) if summary.frontmatter > 0 => {
            serialize_frontmatter(format, &document.frontmatter)
                .with_context(|| format!("failed to write front-matter of `{path}`"))?
        }
        _ => parts.head.to_owned(),
    };
    if summary.body() > 0 {
        let body = render::to_cmark(&document.events)
            .with_context(|| format!("failed to render `{path}`"))?;
        rewritten.push_str(&body);
    } else {
        rewritten.push_str(parts.body);
    }
    Ok(Rewrite::Changed(rewritten))
}
