//! Relative paths between a document directory and a file.

use std::iter;

use crate::path::{normalize, split_root};

/// Computes the path of `target` relative to the directory `from_dir`.
///
/// Both inputs are normalized first and the result always uses `/`. The
/// result is the shortest `../`-prefixed (or bare) path; identical inputs
/// give `.`. When the two paths do not share a root, for example different
/// drive letters, `target` is returned as is.
pub fn to_relative(from_dir: &str, target: &str) -> String {
    let from = normalize(from_dir);
    let target = normalize(target);
    let (from_root, from_rest) = split_root(&from);
    let (target_root, target_rest) = split_root(&target);
    if !from_root.eq_ignore_ascii_case(target_root) {
        return target;
    }

    let from = segments(from_rest);
    let to = segments(target_rest);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let parts: Vec<&str> = iter::repeat("..")
        .take(from.len() - common)
        .chain(to[common..].iter().copied())
        .collect();

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}
