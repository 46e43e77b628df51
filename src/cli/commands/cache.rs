//! Cache command - inspect or clear the lookup cache

use crate::cache::{CacheSession, CacheStore};
use crate::cli::args::{CacheAction, CacheArgs};
use crate::error::GhmResult;
use console::style;
use std::path::Path;
use tracing::info;

/// Execute the cache command
pub fn execute(args: CacheArgs, cache_path: &Path) -> GhmResult<()> {
    match args.action {
        CacheAction::Path => {
            println!("{}", cache_path.display());
            Ok(())
        }
        CacheAction::Info => show_info(cache_path),
        CacheAction::Clear => clear(cache_path),
    }
}

fn show_info(cache_path: &Path) -> GhmResult<()> {
    // Read-only: a session would write the file back on drop
    let store = CacheStore::load(cache_path);

    println!("Cache: {}", cache_path.display());
    if let Some(warning) = store.load_warning() {
        println!("{} {}", style("Warning:").yellow(), warning);
    }
    println!("Entries: {}", store.len());

    for (operation, count) in store.operation_counts() {
        println!("  {} {:<20} {}", style("•").cyan(), operation, count);
    }

    Ok(())
}

fn clear(cache_path: &Path) -> GhmResult<()> {
    let mut session = CacheSession::open(cache_path);
    let removed = session.store().len();

    session.store_mut().purge_all();
    session.close()?;

    info!("Cleared cache at {}", cache_path.display());
    println!("{} cleared {} cache entries", style("✓").green(), removed);
    Ok(())
}
