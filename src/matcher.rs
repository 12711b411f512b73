//! Matching candidate paths against the known files.

use std::collections::HashMap;
use std::slice;

use serde::Deserialize;

use crate::options::Options;
use crate::path;
use crate::qualify::Qualifier;

/// How a qualified candidate is looked up when it is not an exact path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Only an exact absolute path counts.
    Exact,
    /// The candidate is looked up below the static folder, matching files
    /// whose path ends with `<static folder>/<candidate>`.
    #[default]
    StaticSuffix,
    /// Any file with the same file name.
    FileName,
}

/// A file known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRecord {
    absolute_path: String,
}

impl FileRecord {
    pub fn new(absolute_path: impl AsRef<str>) -> Self {
        Self {
            absolute_path: path::normalize(absolute_path.as_ref()),
        }
    }

    /// The normalized, `/`-separated absolute path.
    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn file_name(&self) -> &str {
        path::file_name(&self.absolute_path)
    }
}

/// Snapshot of the known files for one invocation.
///
/// Iteration follows insertion order. A path that appears more than once
/// keeps its first record.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: Vec<FileRecord>,
    by_path: HashMap<String, usize>,
}

impl FileIndex {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        paths.into_iter().map(FileRecord::new).collect()
    }

    /// Looks up a normalized absolute path.
    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.by_path.get(path).map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<FileRecord> for FileIndex {
    fn from_iter<T: IntoIterator<Item = FileRecord>>(iter: T) -> Self {
        let mut index = Self::default();
        for record in iter {
            if index.by_path.contains_key(record.absolute_path()) {
                continue;
            }
            index
                .by_path
                .insert(record.absolute_path.clone(), index.records.len());
            index.records.push(record);
        }
        index
    }
}

impl<'a> IntoIterator for &'a FileIndex {
    type Item = &'a FileRecord;
    type IntoIter = slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The outcome of resolving one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Exactly one file matches. `tail` is the query or fragment that
    /// followed the path in the candidate.
    Found { record: &'a FileRecord, tail: &'a str },
    /// The candidate is local but nothing matches `expected`.
    NotFound { expected: String },
    /// Several files match and none is preferred.
    Ambiguous { matches: Vec<&'a FileRecord> },
    /// The candidate is not something to rewrite.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace.
    Empty,
    /// Rejected by the qualifier.
    NotLocal,
    /// Already resolves relative to the document directory.
    AlreadyRelative,
}

/// Resolves candidates for a single document.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    files: &'a FileIndex,
    static_folder: &'a str,
    strategy: MatchStrategy,
    base_dir: &'a str,
}

impl<'a> Matcher<'a> {
    /// Creates a matcher for a document living in `base_dir`.
    pub fn new(files: &'a FileIndex, options: &'a Options, base_dir: &'a str) -> Self {
        Self {
            files,
            static_folder: options.static_folder_name.trim_matches('/'),
            strategy: options.strategy,
            base_dir,
        }
    }

    pub fn base_dir(&self) -> &'a str {
        self.base_dir
    }

    pub fn static_folder(&self) -> &'a str {
        self.static_folder
    }

    /// Resolves `candidate` to a known file.
    ///
    /// An exact match always wins over the configured strategy. A relative
    /// candidate that already names a file next to the document is skipped,
    /// which makes resolving the rewritten output a no-op.
    pub fn resolve<'s>(&'s self, candidate: &'s str, qualifier: &dyn Qualifier) -> Resolution<'s> {
        if candidate.trim().is_empty() {
            return Resolution::Skipped(SkipReason::Empty);
        }
        let Some(raw) = qualifier.qualify(candidate, self.static_folder) else {
            return Resolution::Skipped(SkipReason::NotLocal);
        };
        let tail = candidate.get(raw.len()..).unwrap_or_default();
        let path = path::slash(raw);

        if path::is_absolute(&path) {
            let absolute = path::normalize(&path);
            if let Some(record) = self.files.get(&absolute) {
                return Resolution::Found { record, tail };
            }
        } else {
            let local = path::join(self.base_dir, &path);
            if self.files.get(&local).is_some() {
                return Resolution::Skipped(SkipReason::AlreadyRelative);
            }
            if path.starts_with("./") || path.starts_with("../") {
                return Resolution::NotFound { expected: local };
            }
        }

        let (expected, mut matches): (String, Vec<&FileRecord>) = match self.strategy {
            MatchStrategy::Exact => (path::join(self.base_dir, &path), Vec::new()),
            MatchStrategy::StaticSuffix => match self.static_suffix(&path) {
                Some(suffix) => {
                    let boundary = format!("/{suffix}");
                    let matches = self
                        .files
                        .iter()
                        .filter(|f| {
                            let p = f.absolute_path();
                            p == suffix || p.ends_with(&boundary)
                        })
                        .collect();
                    (suffix, matches)
                }
                None => (path.into_owned(), Vec::new()),
            },
            MatchStrategy::FileName => {
                let name = path::file_name(&path);
                let matches = self.files.iter().filter(|f| f.file_name() == name).collect();
                (name.to_owned(), matches)
            }
        };

        match matches.len() {
            0 => Resolution::NotFound { expected },
            1 => Resolution::Found {
                record: matches.remove(0),
                tail,
            },
            _ => Resolution::Ambiguous { matches },
        }
    }

    /// Builds `<static folder>/<path>`, without doubling the folder when the
    /// path already starts with it. Paths escaping upwards have no suffix.
    fn static_suffix(&self, path: &str) -> Option<String> {
        let (_, rest) = path::split_root(path);
        let rest = path::normalize(rest);
        if rest == "." || rest == ".." || rest.starts_with("../") {
            return None;
        }
        let folder = self.static_folder;
        if folder.is_empty() || rest == folder || rest.starts_with(&format!("{folder}/")) {
            Some(rest)
        } else {
            Some(format!("{folder}/{rest}"))
        }
    }
}
