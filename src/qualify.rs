//! Deciding whether a string refers to a local file.

use regex_macro::regex;
use serde::Deserialize;

use crate::path;

/// Policy deciding whether a candidate string is a local file reference.
pub trait Qualifier: Send + Sync {
    /// Returns the part of `candidate` naming a local file, or `None` if the
    /// candidate points elsewhere.
    ///
    /// The returned slice must be a prefix of `candidate`. Whatever follows
    /// it, such as a query string or fragment, is kept after the path is
    /// rewritten.
    fn qualify<'c>(&self, candidate: &'c str, static_folder: &str) -> Option<&'c str>;
}

/// Plain predicates qualify the candidate without its query and fragment.
impl<F> Qualifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn qualify<'c>(&self, candidate: &'c str, _static_folder: &str) -> Option<&'c str> {
        let (path, _) = split_tail(candidate);
        (!path.is_empty() && self(path)).then_some(path)
    }
}

/// The built-in qualifier policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathPolicy {
    /// Anything that is not a URL with a scheme, a protocol-relative URL or a
    /// bare fragment.
    #[default]
    RelativeUrl,
    /// Absolute filesystem paths with a file extension.
    AbsolutePath,
    /// Relative URLs whose first segment is the static folder.
    StaticPrefix,
}

impl Qualifier for PathPolicy {
    fn qualify<'c>(&self, candidate: &'c str, static_folder: &str) -> Option<&'c str> {
        let (path, _) = split_tail(candidate);
        if path.is_empty() {
            return None;
        }
        let local = match self {
            Self::RelativeUrl => is_relative_url(path),
            Self::AbsolutePath => path::is_absolute(path) && path::has_extension(path),
            Self::StaticPrefix => is_relative_url(path) && in_folder(path, static_folder),
        };
        local.then_some(path)
    }
}

/// Splits `a.png?v=2#top` into `a.png` and `?v=2#top`.
pub fn split_tail(candidate: &str) -> (&str, &str) {
    if candidate.starts_with(r"\\?\") {
        return (candidate, "");
    }
    let i = candidate.find(|c: char| c == '?' || c == '#').unwrap_or(candidate.len());
    candidate.split_at(i)
}

fn is_relative_url(url: &str) -> bool {
    // drive letters look like a one letter scheme
    if regex!(r"^[a-zA-Z]:[\\/]").is_match(url) {
        return true;
    }
    !regex!(r"^(?:[a-zA-Z][a-zA-Z\d+\-.]*:|//|\\\\)").is_match(url)
}

fn in_folder(path: &str, folder: &str) -> bool {
    if folder.is_empty() {
        return false;
    }
    path::slash(path)
        .trim_start_matches('/')
        .strip_prefix(folder)
        .is_some_and(|rest| rest.starts_with('/'))
}
