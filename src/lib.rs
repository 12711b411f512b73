//! 🖼️ Rewrite image references in Markdown documents as relative paths.
//!
//! Static site generators usually serve images from a static folder, while
//! authors refer to them with absolute paths such as `/img/x.png`. This crate
//! takes a parsed document, finds every image reference in it, confirms the
//! referenced file exists among a snapshot of known files, and replaces the
//! reference with a path relative to the document.
//!
//! Three places are inspected:
//!
//! - Markdown image nodes, `![alt](/img/x.png)`
//! - the `src` of `img` elements inside raw HTML
//! - string fields of the front-matter, optionally filtered by key path
//!
//! ```
//! use relative_images::{Document, FileIndex, Options, Processor};
//! use serde_json::json;
//!
//! let files = FileIndex::new(["/site/static/img/x.png"]);
//! let mut doc = Document::parse("post", "![x](/img/x.png)")
//!     .with_path("/site/posts/a/index.md")
//!     .with_frontmatter(json!({ "banner": "/site/static/img/x.png" }));
//!
//! let summary = Processor::new(Options::default()).process(&mut doc, &files)?;
//! assert_eq!(summary.total(), 2);
//! assert_eq!(doc.frontmatter["banner"], "../../static/img/x.png");
//! # Ok::<(), relative_images::ProcessError>(())
//! ```

mod document;
mod error;
pub mod fix;
mod matcher;
mod options;
pub mod path;
mod process;
mod qualify;
mod relative;
pub mod walk;

pub use crate::document::{DirectoryResolver, Document};
pub use crate::error::{Error, Location, ProcessError};
pub use crate::matcher::{FileIndex, FileRecord, MatchStrategy, Matcher, Resolution, SkipReason};
pub use crate::options::{FrontmatterOptions, OnMissing, Options};
pub use crate::process::{Processor, Summary};
pub use crate::qualify::{split_tail, PathPolicy, Qualifier};
pub use crate::relative::to_relative;
