//! Catalog search command.

use anyhow::Result;

use circulate_core::search::{search_catalog, SearchScope};

use crate::config::Config;
use crate::store::open_store;

pub async fn run_search(config: &Config, query: &str, scope: &str, json: bool) -> Result<()> {
    let scope: SearchScope = scope.parse()?;
    let store = open_store(config).await?;
    let catalog = store.list_books().await?;
    let hits = search_catalog(query, scope, &catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for hit in hits {
        println!(
            "{:.3}  {}: {} by {}",
            hit.score, hit.book.id, hit.book.title, hit.book.author
        );
    }
    Ok(())
}
