//! Clean command implementation.

use std::path::PathBuf;

use notion_tidy_core::config::loader::ConfigLoader;
use notion_tidy_core::{TreeWalker, WalkOptions};

use super::output::{print_actions, print_header, print_json, print_summary};
use crate::{logging, picker, Cli};

pub fn run(cli: Cli) {
    // Load configuration
    let mut rc = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(mode) = cli.mode {
        rc.rewrite.mode = mode.into();
    }
    if let Some(prefix) = cli.prefix {
        rc.rewrite.prefix = prefix;
    }

    if let Err(e) = logging::init(&rc.logging) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let root = match cli.directory {
        Some(dir) => dir,
        None => select_root(),
    };

    let options = WalkOptions {
        dry_run: cli.dry_run,
        backup: cli.backup,
        skip_hidden: rc.content.skip_hidden,
    };

    let walker = match TreeWalker::new(&root, options, rc.cleaner()) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            logging::shutdown();
            std::process::exit(1);
        }
    };

    if !cli.json {
        print_header(walker.root(), cli.dry_run);
    }

    let report = walker.process();

    if cli.json {
        if let Err(e) = print_json(&report) {
            eprintln!("Error serializing report: {}", e);
            logging::shutdown();
            std::process::exit(1);
        }
    } else {
        print_actions(&report);
        print_summary(&report);
    }

    logging::shutdown();
}

fn select_root() -> PathBuf {
    match picker::pick_directory() {
        Ok(Some(dir)) => dir,
        Ok(None) => {
            eprintln!("Error: no directory selected");
            logging::shutdown();
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            logging::shutdown();
            std::process::exit(1);
        }
    }
}
