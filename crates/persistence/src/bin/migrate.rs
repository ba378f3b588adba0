#![deny(warnings)]

use anyhow::Context;
use persistence::{default_sqlite_url, ensure_parent_dir, init_db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("LIFESIM_DATABASE_URL").unwrap_or_else(|_| default_sqlite_url().to_string());
    ensure_parent_dir(&url).with_context(|| format!("creating directory for {url}"))?;
    let pool = init_db(&url)
        .await
        .with_context(|| format!("migrating {url}"))?;
    pool.close().await;
    println!("DB migrated at {}", url);
    Ok(())
}
