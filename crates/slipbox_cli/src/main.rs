//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `slipbox_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use slipbox_core::db::open_db_in_memory;
use slipbox_core::{FolderTree, RefreshChannel, SqliteFolderRepository};
use std::error::Error;

fn main() {
    if let Err(err) = run() {
        eprintln!("folder tree smoke run failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("slipbox_core version={}", slipbox_core::core_version());

    let conn = open_db_in_memory()?;
    let repo = SqliteFolderRepository::try_new(&conn)?;
    let channel = RefreshChannel::new();
    let mut tree = FolderTree::new(channel.clone());
    tree.process_signals(&repo)?;

    let inbox = tree.create_folder(&repo, "Inbox", None)?;
    tree.create_folder(&repo, "Projects", Some(inbox.id))?;
    tree.process_signals(&repo)?;

    for node in tree.top_level() {
        println!("folder name={} id={}", node.folder().name, node.id());
    }
    Ok(())
}
