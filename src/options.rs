use serde::Deserialize;

use crate::matcher::MatchStrategy;
use crate::qualify::PathPolicy;

/// Options controlling how image references are resolved and rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Name of the folder local assets live under.
    pub static_folder_name: String,

    /// How candidates are matched against the known files.
    pub strategy: MatchStrategy,

    /// What to do when a local reference matches no file, or several.
    pub on_missing: OnMissing,

    /// Policy for Markdown image nodes and HTML `src` attributes.
    pub qualifier: PathPolicy,

    /// Front-matter specific options
    pub frontmatter: FrontmatterOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            static_folder_name: "static".to_owned(),
            strategy: MatchStrategy::default(),
            on_missing: OnMissing::default(),
            qualifier: PathPolicy::RelativeUrl,
            frontmatter: FrontmatterOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontmatterOptions {
    /// Dot-separated key paths eligible for rewriting. Empty means all.
    pub include: Vec<String>,

    /// Dot-separated key paths never rewritten, even when included.
    pub exclude: Vec<String>,

    /// Policy for front-matter strings.
    pub qualifier: PathPolicy,
}

impl Default for FrontmatterOptions {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            qualifier: PathPolicy::AbsolutePath,
        }
    }
}

/// Behavior for references that qualify as local but cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnMissing {
    /// Leave the original string in place.
    #[default]
    Skip,
    /// Report an error for the document.
    Error,
}
