#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Core library for notion-tidy.
//!
//! Strips export hash suffixes from file and directory names, repairs the
//! markdown links that the export mangled, and drives both over a directory
//! tree with dry-run and backup support.

pub mod config;
pub mod content;
pub mod hash;
pub mod links;
pub mod normalize;
pub mod walker;

pub use content::{ChangeResult, CleanMode, ContentCleaner, SkipReason};
pub use links::{CollapseRule, LinkReference, LinkRewriter, rewrite_links};
pub use normalize::{EntryKind, PathEntry, normalize_name};
pub use walker::{Action, TreeWalker, WalkError, WalkOptions, WalkReport, process};
