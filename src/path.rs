//! Path string helpers.
//!
//! Paths are compared as `/`-separated strings everywhere in this crate so
//! that matching behaves the same regardless of the platform the site is
//! built on.

use std::borrow::Cow;

use regex_macro::regex;

/// Prefix of Windows extended-length paths, which must keep their `\`.
const EXTENDED_LENGTH: &str = r"\\?\";

/// Converts `\` separators to `/`.
///
/// Extended-length Windows paths (`\\?\C:\...`) are returned unchanged.
pub fn slash(path: &str) -> Cow<'_, str> {
    if path.starts_with(EXTENDED_LENGTH) || !path.contains('\\') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(path.replace('\\', "/"))
    }
}

/// Returns true for rooted paths: `/a/b`, `C:/a/b`, `C:\a\b` or `\\?\C:\a`.
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with(EXTENDED_LENGTH) {
        return true;
    }
    let path = slash(path);
    path.starts_with('/') || regex!(r"^[a-zA-Z]:/").is_match(&path)
}

/// Splits a `/`-separated path into its root (`/`, `C:/` or empty) and the rest.
pub(crate) fn split_root(path: &str) -> (&str, &str) {
    if let Some(m) = regex!(r"^[a-zA-Z]:/").find(path) {
        return path.split_at(m.end());
    }
    if path.starts_with('/') {
        return path.split_at(1);
    }
    ("", path)
}

/// Normalizes separators to `/` and lexically collapses `.` and `..`.
///
/// `..` never climbs above the root of an absolute path. A relative path that
/// collapses to nothing becomes `.`.
pub fn normalize(path: &str) -> String {
    if path.starts_with(EXTENDED_LENGTH) {
        return path.to_owned();
    }
    let path = slash(path);
    let (root, rest) = split_root(&path);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if root.is_empty() => segments.push(".."),
                _ => {}
            },
            segment => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if root.is_empty() && joined.is_empty() {
        ".".to_owned()
    } else {
        format!("{root}{joined}")
    }
}

/// Joins `path` onto `base` unless it is already absolute, then normalizes.
pub fn join(base: &str, path: &str) -> String {
    if is_absolute(path) {
        normalize(path)
    } else {
        normalize(&format!("{}/{}", slash(base), path))
    }
}

/// Returns the normalized directory containing `path`.
pub fn dirname(path: &str) -> String {
    let path = normalize(path);
    let (root, rest) = split_root(&path);
    match rest.rsplit_once('/') {
        Some((dir, _)) => format!("{root}{dir}"),
        None if root.is_empty() => ".".to_owned(),
        None => root.to_owned(),
    }
}

/// Returns the last segment of a `/`-separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns true if the file name has an extension (`a.png`, not `.hidden`).
pub fn has_extension(path: &str) -> bool {
    let name = file_name(path);
    name.rfind('.').is_some_and(|i| i > 0)
}
