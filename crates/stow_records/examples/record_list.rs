// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Walks a record list through insert, delete and clear, then shows the
//! lost-update race of unserialized mutations next to the serialized mode.
//! Cache events are printed at debug level.

use stow::{CacheStore, Delivery};
use stow_records::{MutationMode, RECORD_ITEMS_NAMESPACE, RecordItem, RecordListStore};
use tracing_subscriber::fmt;

fn ids(items: &[RecordItem]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_max_level(tracing::Level::DEBUG).with_target(false).init();

    let base = tempfile::tempdir()?;
    let (delivery, mut ui_loop) = Delivery::queue();
    let cache = CacheStore::builder(RECORD_ITEMS_NAMESPACE)
        .base_dir(base.path())
        .delivery(delivery)
        .build()?;
    let records = RecordListStore::new(cache.clone());

    for (id, name) in [("1", "Harbor"), ("2", "Ridge"), ("3", "Meadow")] {
        records
            .insert_front(RecordItem::new(id, format!("file:///captures/{id}.jpg"), name))
            .await?;
    }
    println!("after inserts: {:?}", ids(&records.load_all().await?));

    records.delete_id("2").await?;
    println!("after delete:  {:?}", ids(&records.load_all().await?));

    // Callback style: the result is handed to whoever drains the delivery queue.
    records.clear_all_then(|ok| println!("clear reported success = {ok}"));
    ui_loop.run_next().await;
    println!("after clear:   {:?}", ids(&records.load_all().await?));

    let (a, b) = tokio::join!(
        records.insert_front(RecordItem::new("a", "a.jpg", "A")),
        records.insert_front(RecordItem::new("b", "b.jpg", "B")),
    );
    a?;
    b?;
    println!("racing unserialized inserts kept {:?}", ids(&records.load_all().await?));

    records.clear_all().await?;
    let serialized = records.clone().mutation_mode(MutationMode::Serialized);
    let (a, b) = tokio::join!(
        serialized.insert_front(RecordItem::new("a", "a.jpg", "A")),
        serialized.insert_front(RecordItem::new("b", "b.jpg", "B")),
    );
    a?;
    b?;
    println!("racing serialized inserts kept {:?}", ids(&serialized.load_all().await?));

    Ok(())
}
