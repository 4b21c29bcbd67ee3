//! Asset cache commands

use colored::Colorize;
use serde_json::json;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::client::{Request, endpoint};
use crate::error::{Error, Result};
use crate::output::formatters::{format_size, format_stored_at};
use crate::output::table::{EntryRow, StoreRow};
use crate::output::{format_json, format_table};
use crate::worker::{ActivateReport, AssetCacheManager, InstallReport};

/// Cache the manifest, then activate right away
pub async fn install(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.asset_manager(ctx.open_store()?)?;
    let (installed, activated) = manager.start().await?;

    match ctx.format {
        OutputFormat::Json => {
            let data = json!({ "install": installed, "activate": activated });
            println!("{}", format_json(&data)?);
        }
        OutputFormat::Pretty => {
            print_install(&installed, ctx.config.cache.assets.len());
            print_activate(&activated);
        }
    }
    Ok(())
}

/// Activate an installed generation, deleting all others
pub fn activate(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.asset_manager(ctx.open_store()?)?;
    require_installed(&manager)?;
    let activated = manager.activate()?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&activated)?),
        OutputFormat::Pretty => print_activate(&activated),
    }
    Ok(())
}

fn require_installed(manager: &AssetCacheManager) -> Result<()> {
    if manager.resume()? {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "Asset cache {} is not installed. Run 'homedash assets install' first.",
            manager.cache_name()
        )))
    }
}

/// Request one path as a controlled client would
pub async fn fetch(opts: &GlobalOptions, path: &str, navigate: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.asset_manager(ctx.open_store()?)?;

    // An installed generation governs the fetch; otherwise it passes through.
    if manager.resume()? {
        manager.activate()?;
    } else {
        log::info!(
            "Asset cache {} not installed, request passes through",
            manager.cache_name()
        );
    }

    let url = endpoint(&ctx.base_url, path)?;
    let request = if navigate {
        Request::navigate(url)
    } else {
        Request::get(url)
    };

    let dispatched = manager.dispatch(&request).await;
    let class = dispatched.class;
    let response = dispatched.settle().await?;

    match ctx.format {
        OutputFormat::Json => {
            let data = json!({
                "url": request.url.as_str(),
                "class": class,
                "status": response.status,
                "kind": response.kind,
                "content_type": response.content_type,
                "size_bytes": response.body.len(),
            });
            println!("{}", format_json(&data)?);
        }
        OutputFormat::Pretty => {
            let status = if response.is_success() {
                response.status.to_string().green()
            } else {
                response.status.to_string().red()
            };
            println!("{} {}", status, request.url);
            println!("Class:        {}", class);
            println!("Kind:         {}", response.kind.as_str());
            if let Some(content_type) = &response.content_type {
                println!("Content type: {}", content_type);
            }
            println!("Size:         {}", format_size(response.body.len()));
        }
    }
    Ok(())
}

/// List entries of one store
pub fn list(opts: &GlobalOptions, store_name: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let store = ctx.open_store()?;
    let current = ctx.config.cache.cache_name();
    let name = store_name.unwrap_or(current.as_str());
    let entries = store.entries(name)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&entries)?),
        OutputFormat::Pretty => {
            let rows: Vec<EntryRow> = entries
                .iter()
                .map(|e| EntryRow::new(e, ctx.base_url.as_str()))
                .collect();
            println!("{}", name.bold());
            println!("{}", format_table(&rows));
        }
    }
    Ok(())
}

/// Show statistics per store
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let store = ctx.open_store()?;
    let stats = store.stats()?;
    let current = ctx.config.cache.cache_name();
    let path = ctx.cache_dir()?;

    match ctx.format {
        OutputFormat::Json => {
            let data = json!({
                "path": path.display().to_string(),
                "current": current,
                "stores": stats.stores,
                "total_entries": stats.total_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_timestamp": stats.oldest_entry,
                "newest_entry_timestamp": stats.newest_entry,
            });
            println!("{}", format_json(&data)?);
        }
        OutputFormat::Pretty => {
            println!("Asset Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", path.display());
            println!("Current store:  {}", current);
            println!("Entries:        {}", stats.total_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));
            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", format_stored_at(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", format_stored_at(newest));
            }

            if !stats.stores.is_empty() {
                println!();
                let rows: Vec<StoreRow> = stats
                    .stores
                    .iter()
                    .map(|s| StoreRow::new(s, &current))
                    .collect();
                println!("{}", format_table(&rows));
            }

            if !stats.stores.iter().any(|s| s.name == current) {
                println!(
                    "\n{} Current generation not installed. Run 'homedash assets install'.",
                    "⚠".yellow()
                );
            }
        }
    }
    Ok(())
}

/// Delete every store
pub fn clear(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let store = ctx.open_store()?;
    let stats = store.clear_all()?;

    match ctx.format {
        OutputFormat::Json => {
            let data = json!({
                "stores_removed": stats.stores_removed,
                "entries_removed": stats.entries_removed,
                "success": true,
            });
            println!("{}", format_json(&data)?);
        }
        OutputFormat::Pretty => {
            if stats.stores_removed > 0 {
                println!(
                    "Cleared {} stores ({} entries)",
                    stats.stores_removed, stats.entries_removed
                );
            } else {
                println!("Asset cache was already empty");
            }
        }
    }
    Ok(())
}

/// Print the cache directory
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    println!("{}", ctx.cache_dir()?.display());
    Ok(())
}

fn print_install(report: &InstallReport, manifest_len: usize) {
    println!(
        "{} Installed {}: {} of {} assets cached",
        "✓".green(),
        report.cache_name.bold(),
        report.cached.len(),
        manifest_len
    );
    for failure in &report.failed {
        println!(
            "  {} {} ({})",
            "⚠".yellow(),
            failure.path,
            failure.reason.dimmed()
        );
    }
}

fn print_activate(report: &ActivateReport) {
    for name in &report.deleted {
        println!("  Deleted old cache: {}", name);
    }
    println!("{} Activated {}", "✓".green(), report.cache_name.bold());
}
