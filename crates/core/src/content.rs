//! Per-document content cleanup.
//!
//! Reads one text file, rewrites it in memory and persists the result
//! according to the dry-run and backup policy. Failures never escape: they
//! come back as [`ChangeResult::Skipped`] so a tree walk can carry on.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::hash::strip_embedded;
use crate::links::LinkRewriter;

/// Extensions treated as text and therefore eligible for cleanup.
pub const DEFAULT_EXTENSIONS: &[&str] =
    &["md", "markdown", "txt", "html", "htm", "json", "csv", "xml"];

pub const DEFAULT_BACKUP_SUFFIX: &str = "bak";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How document text is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CleanMode {
    /// Rebuild every internal link with the [`LinkRewriter`].
    #[default]
    #[serde(rename = "links")]
    RewriteLinks,
    /// Only drop hash tokens that sit before `.md` or a path separator.
    #[serde(rename = "hashes")]
    StripHashes,
}

impl FromStr for CleanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "links" => Ok(Self::RewriteLinks),
            "hashes" => Ok(Self::StripHashes),
            other => Err(format!("unknown clean mode '{other}' (expected links or hashes)")),
        }
    }
}

/// Why a file was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("not a supported text format")]
    UnsupportedExtension,

    #[error("binary content")]
    Binary,

    #[error("content is not valid UTF-8 or Windows-1252 text")]
    Undecodable,

    #[error("{0}")]
    Io(String),
}

/// Outcome of cleaning one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeResult {
    Unchanged,
    Updated { backup: Option<PathBuf> },
    WouldUpdate,
    Skipped { reason: SkipReason },
}

impl ChangeResult {
    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Updated { .. } | Self::WouldUpdate)
    }
}

/// Decoded file text plus what is needed to write it back the same way.
struct Decoded {
    text: String,
    encoding: &'static Encoding,
    bom: bool,
}

impl Decoded {
    fn from_bytes(bytes: &[u8]) -> Result<Self, SkipReason> {
        if bytes.contains(&0) {
            return Err(SkipReason::Binary);
        }

        let (body, bom) = match bytes.strip_prefix(UTF8_BOM) {
            Some(body) => (body, true),
            None => (bytes, false),
        };

        if let Ok(text) = std::str::from_utf8(body) {
            return Ok(Self { text: text.to_string(), encoding: UTF_8, bom });
        }

        WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| Self { text: text.into_owned(), encoding: WINDOWS_1252, bom: false })
            .ok_or(SkipReason::Undecodable)
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        if self.encoding == UTF_8 {
            let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
            if self.bom {
                out.extend_from_slice(UTF8_BOM);
            }
            out.extend_from_slice(text.as_bytes());
            return out;
        }

        let (bytes, _, unmappable) = self.encoding.encode(text);
        if unmappable {
            warn!(encoding = self.encoding.name(), "content not representable, writing UTF-8");
            return text.as_bytes().to_vec();
        }
        bytes.into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct ContentCleaner {
    mode: CleanMode,
    rewriter: LinkRewriter,
    extensions: Vec<String>,
    dry_run: bool,
    backup: bool,
    backup_suffix: String,
}

impl Default for ContentCleaner {
    fn default() -> Self {
        Self::new(CleanMode::default(), LinkRewriter::default())
    }
}

impl ContentCleaner {
    pub fn new(mode: CleanMode, rewriter: LinkRewriter) -> Self {
        Self {
            mode,
            rewriter,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            dry_run: false,
            backup: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Replace the text-format allow-list. Leading dots are ignored.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    pub fn mode(&self) -> CleanMode {
        self.mode
    }

    /// True if the file's extension is on the text allow-list.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }

    /// Sibling path the original is copied to before an overwrite.
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(&self.backup_suffix);
        path.with_file_name(name)
    }

    /// Apply the configured transformation to document text.
    pub fn transform<'a>(&self, content: &'a str) -> Cow<'a, str> {
        match self.mode {
            CleanMode::RewriteLinks => Cow::Owned(self.rewriter.rewrite(content)),
            CleanMode::StripHashes => strip_embedded(content),
        }
    }

    /// Clean one file in place.
    pub fn clean_file(&self, path: &Path) -> ChangeResult {
        if !self.accepts(path) {
            debug!(path = %path.display(), "skipping non-text file");
            return ChangeResult::skipped(SkipReason::UnsupportedExtension);
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read file");
                return ChangeResult::skipped(SkipReason::Io(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let decoded = match Decoded::from_bytes(&bytes) {
            Ok(decoded) => decoded,
            Err(reason) => {
                warn!(path = %path.display(), %reason, "skipping file");
                return ChangeResult::skipped(reason);
            }
        };

        let new_content = self.transform(&decoded.text);
        if new_content == decoded.text {
            debug!(path = %path.display(), "content already clean");
            return ChangeResult::Unchanged;
        }

        if self.dry_run {
            info!(path = %path.display(), "would update content");
            return ChangeResult::WouldUpdate;
        }

        let backup = if self.backup {
            let backup_path = self.backup_path(path);
            if let Err(e) = fs::copy(path, &backup_path) {
                warn!(path = %path.display(), error = %e, "backup failed, file left untouched");
                return ChangeResult::skipped(SkipReason::Io(format!(
                    "failed to back up {} to {}: {e}",
                    path.display(),
                    backup_path.display()
                )));
            }
            Some(backup_path)
        } else {
            None
        };

        if let Err(e) = fs::write(path, decoded.encode(&new_content)) {
            warn!(path = %path.display(), error = %e, "failed to write file");
            return ChangeResult::skipped(SkipReason::Io(format!(
                "failed to write {}: {e}",
                path.display()
            )));
        }

        info!(path = %path.display(), "updated content");
        ChangeResult::Updated { backup }
    }
}
