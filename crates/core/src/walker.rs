//! Two-phase tree walk: directories bottom-up, then files top-down.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::content::{ChangeResult, ContentCleaner};
use crate::normalize::{EntryKind, PathEntry};

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("target already exists: {0}")]
    TargetExists(PathBuf),

    #[error("failed to rename {from} -> {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Report what would change without touching the filesystem.
    pub dry_run: bool,
    /// Copy each file to a sibling backup before overwriting it.
    pub backup: bool,
    /// Do not descend into entries whose name starts with a dot.
    pub skip_hidden: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { dry_run: false, backup: false, skip_hidden: true }
    }
}

/// One decision taken during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// A rename that was applied, or planned when `applied` is false.
    Rename { kind: EntryKind, from: PathBuf, to: PathBuf, applied: bool },
    RenameFailed { kind: EntryKind, from: PathBuf, to: PathBuf, error: String },
    Content { path: PathBuf, result: ChangeResult },
    WalkFailed { path: Option<PathBuf>, error: String },
}

/// Everything a walk did, in order, with running totals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalkReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub actions: Vec<Action>,
    pub dirs_renamed: usize,
    pub files_renamed: usize,
    pub files_updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl WalkReport {
    fn new(root: &Path, dry_run: bool) -> Self {
        Self { root: root.to_path_buf(), dry_run, ..Default::default() }
    }

    fn record(&mut self, action: Action) {
        match &action {
            Action::Rename { kind: EntryKind::Directory, .. } => self.dirs_renamed += 1,
            Action::Rename { kind: EntryKind::File, .. } => self.files_renamed += 1,
            Action::Content { result, .. } if result.is_change() => self.files_updated += 1,
            Action::Content { result: ChangeResult::Skipped { .. }, .. } => self.skipped += 1,
            Action::Content { .. } => {}
            Action::RenameFailed { .. } | Action::WalkFailed { .. } => self.failed += 1,
        }
        self.actions.push(action);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// True when nothing was (or would be) renamed or rewritten.
    pub fn is_noop(&self) -> bool {
        self.dirs_renamed == 0 && self.files_renamed == 0 && self.files_updated == 0
    }
}

#[derive(Debug)]
pub struct TreeWalker {
    root: PathBuf,
    options: WalkOptions,
    cleaner: ContentCleaner,
}

impl TreeWalker {
    /// Create a walker for `root`. The cleaner inherits the dry-run and
    /// backup settings from `options`.
    pub fn new(
        root: &Path,
        options: WalkOptions,
        cleaner: ContentCleaner,
    ) -> Result<Self, WalkError> {
        if !root.is_dir() {
            return Err(WalkError::NotADirectory(root.to_path_buf()));
        }

        let cleaner = cleaner.dry_run(options.dry_run).backup(options.backup);
        Ok(Self { root: root.to_path_buf(), options, cleaner })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run both phases and return what happened.
    ///
    /// Directory renames happen deepest first so that renaming a parent never
    /// invalidates a path still waiting to be visited. Files are handled
    /// afterwards, content before name.
    pub fn process(&self) -> WalkReport {
        let mut report = WalkReport::new(&self.root, self.options.dry_run);
        info!(root = %self.root.display(), dry_run = self.options.dry_run, "processing tree");

        // Targets taken by earlier renames in this walk. A dry run never
        // moves anything, so the disk alone cannot show these collisions.
        let mut claimed = HashSet::new();
        self.rename_directories(&mut report, &mut claimed);
        self.process_files(&mut report, &mut claimed);

        info!(
            dirs_renamed = report.dirs_renamed,
            files_renamed = report.files_renamed,
            files_updated = report.files_updated,
            skipped = report.skipped,
            failed = report.failed,
            "processing complete"
        );
        report
    }

    fn rename_directories(&self, report: &mut WalkReport, claimed: &mut HashSet<PathBuf>) {
        let mut dirs: Vec<(usize, PathBuf)> = Vec::new();
        for entry in self.entries() {
            match entry {
                Ok(e) if e.depth() > 0 && e.file_type().is_dir() => {
                    dirs.push((e.depth(), e.into_path()));
                }
                Ok(_) => {}
                Err(e) => record_walk_error(report, e),
            }
        }

        dirs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        for (_, path) in dirs {
            if let Some(entry) = PathEntry::from_path(&path, EntryKind::Directory) {
                self.rename_entry(&entry, report, claimed);
            }
        }
    }

    fn process_files(&self, report: &mut WalkReport, claimed: &mut HashSet<PathBuf>) {
        let mut files = Vec::new();
        for entry in self.entries() {
            match entry {
                Ok(e) if e.file_type().is_file() && self.cleaner.accepts(e.path()) => {
                    files.push(e.into_path());
                }
                Ok(_) => {}
                Err(e) => record_walk_error(report, e),
            }
        }

        for path in files {
            let result = self.cleaner.clean_file(&path);
            if result != ChangeResult::Unchanged {
                report.record(Action::Content { path: path.clone(), result });
            }

            if let Some(entry) = PathEntry::from_path(&path, EntryKind::File) {
                self.rename_entry(&entry, report, claimed);
            }
        }
    }

    fn rename_entry(
        &self,
        entry: &PathEntry,
        report: &mut WalkReport,
        claimed: &mut HashSet<PathBuf>,
    ) {
        let Some(target) = entry.normalized_path() else {
            return;
        };

        let outcome = if claimed.contains(&target) {
            Err(RenameError::TargetExists(target.clone()))
        } else if self.options.dry_run {
            check_target_free(&target)
        } else {
            rename_no_clobber(&entry.path, &target)
        };

        match outcome {
            Ok(()) => {
                if self.options.dry_run {
                    info!(from = %entry.path.display(), to = %target.display(), "would rename");
                } else {
                    info!(from = %entry.path.display(), to = %target.display(), "renamed");
                }
                claimed.insert(target.clone());
                report.record(Action::Rename {
                    kind: entry.kind,
                    from: entry.path.clone(),
                    to: target,
                    applied: !self.options.dry_run,
                });
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "rename skipped");
                report.record(Action::RenameFailed {
                    kind: entry.kind,
                    from: entry.path.clone(),
                    to: target,
                    error: e.to_string(),
                });
            }
        }
    }

    fn entries(&self) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !self.is_excluded(e))
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        // Never filter the root directory (depth 0)
        if entry.depth() == 0 || !self.options.skip_hidden {
            return false;
        }
        entry.file_name().to_string_lossy().starts_with('.')
    }
}

fn check_target_free(target: &Path) -> Result<(), RenameError> {
    if fs::symlink_metadata(target).is_ok() {
        return Err(RenameError::TargetExists(target.to_path_buf()));
    }
    Ok(())
}

/// Rename without replacing an existing entry. `fs::rename` silently
/// overwrites files on Unix, so the target is checked first.
fn rename_no_clobber(from: &Path, to: &Path) -> Result<(), RenameError> {
    check_target_free(to)?;
    fs::rename(from, to).map_err(|source| RenameError::Io {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn record_walk_error(report: &mut WalkReport, e: walkdir::Error) {
    let path = e.path().map(Path::to_path_buf);
    warn!(error = %e, "failed to read directory entry");
    report.record(Action::WalkFailed { path, error: e.to_string() });
}

/// Clean `root` with the default cleaner.
pub fn process(root: &Path, dry_run: bool, backup: bool) -> Result<WalkReport, WalkError> {
    let options = WalkOptions { dry_run, backup, ..Default::default() };
    let walker = TreeWalker::new(root, options, ContentCleaner::default())?;
    Ok(walker.process())
}
