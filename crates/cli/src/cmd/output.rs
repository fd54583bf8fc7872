//! Console rendering of walk reports.

use notion_tidy_core::{Action, ChangeResult, EntryKind, WalkReport};
use std::path::Path;

pub fn print_header(root: &Path, dry_run: bool) {
    println!("Processing directory: {}", root.display());
    println!("Dry run mode: {}", if dry_run { "Yes" } else { "No" });
    println!();
}

/// One human-readable line per action; `None` for actions not worth showing.
pub fn describe(action: &Action) -> Option<String> {
    match action {
        Action::Rename { kind, from, to, applied } => {
            let verb = if *applied { "Renamed" } else { "Would rename" };
            let noun = match kind {
                EntryKind::Directory => " directory",
                EntryKind::File => "",
            };
            Some(format!("{verb}{noun}: {} -> {}", from.display(), to.display()))
        }
        Action::RenameFailed { kind, from, error, .. } => {
            let noun = match kind {
                EntryKind::Directory => "directory ",
                EntryKind::File => "",
            };
            Some(format!("Error renaming {noun}{}: {error}", from.display()))
        }
        Action::Content { path, result } => match result {
            ChangeResult::Unchanged => None,
            ChangeResult::Updated { backup: None } => {
                Some(format!("Updated content in: {}", path.display()))
            }
            ChangeResult::Updated { backup: Some(backup) } => Some(format!(
                "Updated content in: {} (backup: {})",
                path.display(),
                backup.display()
            )),
            ChangeResult::WouldUpdate => {
                Some(format!("Would update content in: {}", path.display()))
            }
            ChangeResult::Skipped { reason } => {
                Some(format!("Skipped {}: {reason}", path.display()))
            }
        },
        Action::WalkFailed { path, error } => Some(match path {
            Some(p) => format!("Error reading {}: {error}", p.display()),
            None => format!("Error reading directory tree: {error}"),
        }),
    }
}

pub fn print_actions(report: &WalkReport) {
    for line in report.actions.iter().filter_map(describe) {
        println!("{line}");
    }
}

pub fn print_summary(report: &WalkReport) {
    println!();
    if report.is_noop() && !report.has_failures() {
        println!("Nothing to clean.");
    }
    println!("Processing complete!");
    println!("Directories renamed: {}", report.dirs_renamed);
    println!("Files renamed: {}", report.files_renamed);
    println!("Files updated: {}", report.files_updated);
    println!("Skipped: {}", report.skipped);
    println!("Errors: {}", report.failed);

    if report.dry_run {
        println!();
        println!("(dry-run mode - no changes made)");
    }
}

pub fn print_json(report: &WalkReport) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notion_tidy_core::SkipReason;
    use std::path::PathBuf;

    #[test]
    fn test_describe_renames() {
        let action = Action::Rename {
            kind: EntryKind::Directory,
            from: PathBuf::from("a/Page x"),
            to: PathBuf::from("a/Page"),
            applied: false,
        };
        assert_eq!(describe(&action).unwrap(), "Would rename directory: a/Page x -> a/Page");

        let action = Action::Rename {
            kind: EntryKind::File,
            from: PathBuf::from("n x.md"),
            to: PathBuf::from("n.md"),
            applied: true,
        };
        assert_eq!(describe(&action).unwrap(), "Renamed: n x.md -> n.md");
    }

    #[test]
    fn test_describe_content() {
        let path = PathBuf::from("n.md");
        let updated = Action::Content {
            path: path.clone(),
            result: ChangeResult::Updated { backup: Some(PathBuf::from("n.md.bak")) },
        };
        assert_eq!(describe(&updated).unwrap(), "Updated content in: n.md (backup: n.md.bak)");

        let skipped = Action::Content {
            path: path.clone(),
            result: ChangeResult::Skipped { reason: SkipReason::Binary },
        };
        assert_eq!(describe(&skipped).unwrap(), "Skipped n.md: binary content");

        let unchanged = Action::Content { path, result: ChangeResult::Unchanged };
        assert_eq!(describe(&unchanged), None);
    }
}
