use pulldown_cmark::{Event, Options as MarkdownOptions, Parser};
use serde_json::Value;

/// A Markdown document handed over by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    /// Identifier used in logs and errors.
    pub id: String,

    /// Reference to the node the document was created from, for hosts that
    /// resolve directories through it.
    pub parent: Option<String>,

    /// Absolute path of the source file, when known.
    pub file_absolute_path: Option<String>,

    /// Parsed front-matter.
    pub frontmatter: Value,

    /// The Markdown body as a pulldown-cmark event sequence.
    pub events: Vec<Event<'a>>,
}

impl<'a> Document<'a> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            file_absolute_path: None,
            frontmatter: Value::Null,
            events: Vec::new(),
        }
    }

    /// Parses `markdown` with every pulldown-cmark extension enabled.
    pub fn parse(id: impl Into<String>, markdown: &'a str) -> Self {
        let events = Parser::new_ext(markdown, MarkdownOptions::all()).collect();
        Self::new(id).with_events(events)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.file_absolute_path = Some(path.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_frontmatter(mut self, frontmatter: Value) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    pub fn with_events(mut self, events: Vec<Event<'a>>) -> Self {
        self.events = events;
        self
    }
}

/// Finds the directory of a document that has no stored file path.
pub trait DirectoryResolver: Send + Sync {
    fn resolve_directory(&self, document: &Document<'_>) -> Option<String>;
}

impl<F> DirectoryResolver for F
where
    F: Fn(&Document<'_>) -> Option<String> + Send + Sync,
{
    fn resolve_directory(&self, document: &Document<'_>) -> Option<String> {
        self(document)
    }
}
