use std::fmt;

use camino::Utf8PathBuf as PathBuf;
use serde::de::{self, Deserializer, SeqAccess, Unexpected};

/// Content directories, written either as `content = "docs"` or as a list.
struct ContentDirs;

impl ContentDirs {
    fn dir<E: de::Error>(&self, raw: &str) -> Result<PathBuf, E> {
        let dir = raw.trim_end_matches(['/', '\\']);
        if dir.trim().is_empty() && !raw.starts_with('/') {
            return Err(E::invalid_value(Unexpected::Str(raw), self));
        }
        Ok(PathBuf::from(if dir.is_empty() { "/" } else { dir }))
    }
}

impl<'de> de::Visitor<'de> for ContentDirs {
    type Value = Vec<PathBuf>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-empty directory path or a list of them")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(vec![self.dir(v)?])
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut dirs = Vec::with_capacity(seq.size_hint().unwrap_or(1));
        while let Some(raw) = seq.next_element::<String>()? {
            dirs.push(self.dir(&raw)?);
        }
        Ok(dirs)
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PathBuf>, D::Error> {
    deserializer.deserialize_any(ContentDirs)
}
