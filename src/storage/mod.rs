pub mod db;

use anyhow::Result;
use colored::*;
use sha2::{Digest, Sha256};
use std::path::Path;

pub use db::ListStore;

pub const LEADLIST_DIR: &str = ".leadlist";

/// Create the `.leadlist` directory, the database, and a config file with
/// a generated client id and the default store endpoint.
pub async fn init(path: &Path, endpoint: &str) -> Result<()> {
    let store_path = path.join(LEADLIST_DIR);

    tokio::fs::create_dir_all(&store_path).await?;

    let db = ListStore::new(&store_path)?;
    db.initialize()?;

    let store_id = {
        let mut hasher = Sha256::new();
        hasher.update(store_path.to_string_lossy().as_bytes());
        format!("store-{:x}", hasher.finalize())
    };

    let config = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "client_id": uuid::Uuid::new_v4().to_string(),
        "store_id": store_id,
        "endpoint": endpoint,
    });

    tokio::fs::write(
        store_path.join("config.json"),
        serde_json::to_string_pretty(&config)?,
    )
    .await?;

    Ok(())
}

/// Endpoint recorded by `init`, if a config exists under `path`.
pub async fn configured_endpoint(path: &Path) -> Option<String> {
    let config_path = path.join(LEADLIST_DIR).join("config.json");
    let bytes = tokio::fs::read(&config_path).await.ok()?;
    let cfg = serde_json::from_slice::<serde_json::Value>(&bytes).ok()?;
    cfg.get("endpoint")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string())
}

/// Print the stored collection, newest last.
pub async fn show_list(path: &Path) -> Result<()> {
    let store = ListStore::new(&path.join(LEADLIST_DIR))?;
    store.initialize()?;
    let snapshot = store.snapshot()?;

    println!("{}", "Stored Leads".cyan().bold());
    println!("{}", "═".repeat(40).bright_black());

    if !snapshot.exists() {
        println!("{}", "(no leads saved)".bright_black());
        return Ok(());
    }

    for (i, entry) in snapshot.values().iter().enumerate() {
        println!(
            "{} {}",
            format!("{:>3}.", i + 1).bright_black(),
            entry.as_str().bright_blue()
        );
    }

    Ok(())
}
