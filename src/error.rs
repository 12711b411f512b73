use std::fmt;

use thiserror::Error;

use crate::process::Summary;

/// Where in a document a reference was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A Markdown image node
    Image,
    /// An `img` element inside raw HTML
    Html,
    /// A front-matter field, by dot-separated key path
    Frontmatter(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Html => f.write_str("HTML image"),
            Self::Frontmatter(path) => write!(f, "front-matter field `{path}`"),
        }
    }
}

/// A reference that could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{location} `{candidate}` matches no file under the static folder `{static_folder}`")]
    NotFound {
        candidate: String,
        static_folder: String,
        location: Location,
    },

    #[error("{location} `{candidate}` matches several files: {}", .matches.join(", "))]
    Ambiguous {
        candidate: String,
        matches: Vec<String>,
        location: Location,
    },

    #[error("failed to parse HTML fragment: {reason}")]
    MalformedHtml { reason: String },
}

/// Every failure collected while processing one document.
///
/// The rewrites counted in `summary` have been applied regardless.
#[derive(Debug)]
pub struct ProcessError {
    pub document: String,
    pub summary: Summary,
    pub errors: Vec<Error>,
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} image reference(s) in `{}` could not be rewritten",
            self.errors.len(),
            self.document
        )?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ProcessError {}
