//! Interactive export-directory selection.
//!
//! Used when no directory is given on the command line. Works in a plain
//! terminal; without one, nothing is selected.

use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::{env, fs};

const CURRENT_DIR: &str = ". (current directory)";
const ENTER_PATH: &str = "Enter a path...";

/// Ask the user for the directory to clean.
///
/// Returns:
/// - `Ok(Some(path))` - User picked or typed a directory
/// - `Ok(None)` - Not a terminal, or the user cancelled
/// - `Err(msg)` - Prompt failed
pub fn pick_directory() -> Result<Option<PathBuf>, String> {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
        return Ok(None);
    }

    let cwd = env::current_dir().map_err(|e| format!("cannot read current directory: {e}"))?;
    let candidates = candidate_dirs(&cwd);

    let mut items = vec![CURRENT_DIR.to_string()];
    items.extend(candidates.iter().map(|p| display_name(p)));
    items.push(ENTER_PATH.to_string());

    let theme = ColorfulTheme::default();
    let selection = FuzzySelect::with_theme(&theme)
        .with_prompt("Select the export directory")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|e| format!("selector error: {e}"))?;

    let Some(idx) = selection else {
        return Ok(None);
    };

    if idx == 0 {
        return Ok(Some(cwd));
    }
    if let Some(dir) = candidates.get(idx - 1) {
        return Ok(Some(dir.clone()));
    }

    let typed: String = Input::with_theme(&theme)
        .with_prompt("Export directory")
        .validate_with(|input: &String| -> Result<(), &str> {
            if Path::new(input.trim()).is_dir() {
                Ok(())
            } else {
                Err("not a directory")
            }
        })
        .interact_text()
        .map_err(|e| format!("input error: {e}"))?;

    Ok(Some(PathBuf::from(typed.trim())))
}

/// Visible sub-directories of `base`, sorted by name.
fn candidate_dirs(base: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(base) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
