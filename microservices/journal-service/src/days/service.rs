//! Day Document Service
//!
//! One JSON document per published day. Documents are stored verbatim
//! (free-form `stats`, unknown fields survive a round trip); a PUT is a
//! full replacement, last writer wins. `days/index.json` holds the summary
//! list the public site renders, sorted by slug.

use serde_json::Value;
use std::sync::Arc;
use waymark_core::DaySlug;
use waymark_fstore::{JsonStore, KeyLocks};

use crate::error::{Error, Result};
use crate::publish::Publisher;
use crate::types::DaySummary;

const INDEX_REL: &str = "days/index.json";

#[derive(Clone)]
pub struct DayService {
    store: JsonStore,
    locks: Arc<KeyLocks>,
    publisher: Arc<dyn Publisher>,
}

impl DayService {
    pub fn new(store: JsonStore, locks: Arc<KeyLocks>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            store,
            locks,
            publisher,
        }
    }

    fn rel(slug: &DaySlug) -> String {
        format!("days/{}", slug.file_name())
    }

    pub async fn get(&self, slug: &DaySlug) -> Result<Value> {
        self.store
            .read(&Self::rel(slug))
            .await
            .ok_or_else(|| Error::NotFound(format!("day {}", slug)))
    }

    /// Full replacement of the day document, then the index entry.
    pub async fn put(&self, slug: &DaySlug, document: Value) -> Result<()> {
        if !document.is_object() {
            return Err(Error::InvalidRequest(
                "day document must be a JSON object".to_string(),
            ));
        }

        let rel = Self::rel(slug);
        let day_path = self
            .locks
            .with_lock(&rel, self.store.write(&rel, &document))
            .await?;

        let summary = summarize(slug, &document);
        let index_path = self
            .locks
            .with_lock(INDEX_REL, async {
                let mut index: Vec<DaySummary> =
                    self.store.read(INDEX_REL).await.unwrap_or_default();
                index.retain(|entry| entry.slug != summary.slug);
                index.push(summary);
                index.sort_by(|a, b| a.slug.cmp(&b.slug));
                self.store.write(INDEX_REL, &index).await
            })
            .await?;

        self.publisher
            .publish(
                &[day_path, index_path],
                &format!("days: update {}", slug),
            )
            .await;

        Ok(())
    }

    /// The summary index; an absent index reads as empty.
    pub async fn list(&self) -> Vec<DaySummary> {
        self.store.read(INDEX_REL).await.unwrap_or_default()
    }
}

/// Index entries are extracted leniently: the document owns its shape, the
/// index only needs the fields the site's day list renders.
fn summarize(slug: &DaySlug, document: &Value) -> DaySummary {
    let text = |key: &str| {
        document
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let photos = document.get("photos").and_then(Value::as_array);

    DaySummary {
        slug: slug.as_str().to_string(),
        date: text("date"),
        title: text("title"),
        segment: text("segment"),
        photo_count: photos.map(Vec::len).unwrap_or(0),
        cover: photos
            .and_then(|p| p.first())
            .and_then(|photo| photo.get("thumb"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
