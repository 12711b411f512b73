//! Depth-first traversal of nested front-matter data.

use std::fmt;

use serde_json::Value;

/// The chain of keys leading to a value, array positions included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Every dot-joined chain from the first key down to the full path, so
    /// `hero.image` yields `hero` and then `hero.image`.
    pub fn chains(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.segments.len()).map(|n| self.segments[..n].join("."))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Include and exclude lists of dot-separated key paths.
///
/// An entry covers a key path when it equals the path or one of its
/// ancestors. An empty include list covers everything and exclusion always
/// takes precedence.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    include: &'a [String],
    exclude: &'a [String],
}

impl<'a> Selection<'a> {
    pub fn new(include: &'a [String], exclude: &'a [String]) -> Self {
        Self { include, exclude }
    }

    pub fn allows(&self, path: &KeyPath) -> bool {
        let chains: Vec<String> = path.chains().collect();
        let listed = |entries: &[String]| entries.iter().any(|e| chains.contains(e));
        (self.include.is_empty() || listed(self.include)) && !listed(self.exclude)
    }
}

/// Offers every string leaf of `value` to `visit` along with its key path.
///
/// When `visit` returns a new string the leaf is replaced. Objects and arrays
/// are never restructured and other scalars are left alone. Returns the
/// number of replaced leaves.
pub fn walk_strings<F>(value: &mut Value, mut visit: F) -> usize
where
    F: FnMut(&str, &KeyPath) -> Option<String>,
{
    let mut path = KeyPath::default();
    walk_value(value, &mut path, &mut visit)
}

fn walk_value<F>(value: &mut Value, path: &mut KeyPath, visit: &mut F) -> usize
where
    F: FnMut(&str, &KeyPath) -> Option<String>,
{
    match value {
        Value::String(s) => match visit(s.as_str(), &*path) {
            Some(new) => {
                *s = new;
                1
            }
            None => 0,
        },
        Value::Array(items) => {
            let mut count = 0;
            for (i, item) in items.iter_mut().enumerate() {
                path.segments.push(i.to_string());
                count += walk_value(item, path, visit);
                path.segments.pop();
            }
            count
        }
        Value::Object(map) => {
            let mut count = 0;
            for (key, item) in map.iter_mut() {
                path.segments.push(key.clone());
                count += walk_value(item, path, visit);
                path.segments.pop();
            }
            count
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    }
}
