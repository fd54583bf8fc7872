//! Name normalization: strip the trailing export hash from a basename.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::hash::NAME_SUFFIX_RE;

/// Strip a trailing hash token from a file or directory name.
///
/// `Note 0123...cdef.md` becomes `Note.md` and `Page_0123...cdef` becomes
/// `Page`. Names without a trailing token are returned as they are. Stacked
/// tokens are removed one at a time until the name is stable, so the result
/// is always a fixed point.
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    let Some(mut current) = strip_once(name) else {
        return Cow::Borrowed(name);
    };

    while let Some(next) = strip_once(&current) {
        current = next;
    }
    Cow::Owned(current)
}

fn strip_once(name: &str) -> Option<String> {
    let caps = NAME_SUFFIX_RE.captures(name)?;
    let base = &caps["base"];
    let ext = caps.name("ext").map_or("", |m| m.as_str());
    Some(format!("{base}{ext}"))
}

/// Kind of filesystem node visited by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A filesystem node as seen at the time it was visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub path: PathBuf,
    /// Current basename.
    pub name: String,
    pub kind: EntryKind,
    pub parent: PathBuf,
}

impl PathEntry {
    /// Build an entry from a path. Returns `None` for paths without a
    /// UTF-8 basename (e.g. `/` or `..`).
    pub fn from_path(path: &Path, kind: EntryKind) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let parent = path.parent().unwrap_or(Path::new("")).to_path_buf();
        Some(Self { path: path.to_path_buf(), name, kind, parent })
    }

    /// Path of the sibling carrying the normalized name, or `None` when the
    /// name is already clean.
    pub fn normalized_path(&self) -> Option<PathBuf> {
        match normalize_name(&self.name) {
            Cow::Borrowed(_) => None,
            Cow::Owned(clean) => Some(self.parent.join(clean)),
        }
    }
}
