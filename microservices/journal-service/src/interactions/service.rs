//! Interaction Service
//!
//! Reactions and comments on photos and stacks, one JSON record per
//! subject. Every mutation is a lock-serialized read-modify-write against
//! the subject's file, persisted atomically and then published.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use waymark_core::{Subject, SubjectId};
use waymark_fstore::{JsonStore, KeyLocks};

use crate::error::{Error, Result};
use crate::publish::Publisher;
use crate::types::{Comment, InteractionRecord, ReactOutcome, Rollup};

#[derive(Clone)]
pub struct InteractionService {
    store: JsonStore,
    locks: Arc<KeyLocks>,
    publisher: Arc<dyn Publisher>,
}

impl InteractionService {
    pub fn new(store: JsonStore, locks: Arc<KeyLocks>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            store,
            locks,
            publisher,
        }
    }

    fn rel(subject: &Subject) -> String {
        format!("interactions/{}", subject.file_name())
    }

    /// Current record for a subject. A subject nobody has interacted with
    /// reads as the empty record; this never errors.
    pub async fn get(&self, subject: &Subject) -> InteractionRecord {
        self.store.read(&Self::rel(subject)).await.unwrap_or_default()
    }

    /// Toggle-by-presence reaction: an explicit remove, or any react on an
    /// emoji whose count is already positive, decrements (the key is
    /// dropped at zero); otherwise the count increments.
    pub async fn react(
        &self,
        subject: &Subject,
        emoji: &str,
        remove_requested: bool,
    ) -> Result<ReactOutcome> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(Error::InvalidRequest("emoji is required".to_string()));
        }

        let rel = Self::rel(subject);
        self.locks
            .with_lock(&rel, async {
                let mut record: InteractionRecord =
                    self.store.read(&rel).await.unwrap_or_default();

                let current = record.reactions.get(emoji).copied().unwrap_or(0);
                let removed = remove_requested || current > 0;
                let count = if removed {
                    let next = current.saturating_sub(1);
                    if next == 0 {
                        record.reactions.remove(emoji);
                    } else {
                        record.reactions.insert(emoji.to_string(), next);
                    }
                    next
                } else {
                    let next = current + 1;
                    record.reactions.insert(emoji.to_string(), next);
                    next
                };

                let path = self.store.write(&rel, &record).await?;
                let verb = if removed { "unreact" } else { "react" };
                self.publish(path, &format!("interactions: {} {} on {}", verb, emoji, subject))
                    .await;

                Ok(ReactOutcome { count, removed })
            })
            .await
    }

    pub async fn comment(
        &self,
        subject: &Subject,
        text: &str,
        author: Option<&str>,
    ) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidRequest("comment text is required".to_string()));
        }

        let rel = Self::rel(subject);
        self.locks
            .with_lock(&rel, async {
                let mut record: InteractionRecord =
                    self.store.read(&rel).await.unwrap_or_default();

                let now = Utc::now().timestamp_millis();
                let comment = Comment {
                    id: next_comment_id(&record, now).to_string(),
                    text: text.to_string(),
                    author: author
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .unwrap_or("Anonymous")
                        .to_string(),
                    timestamp: now,
                    edited: None,
                };
                record.comments.push(comment.clone());

                let path = self.store.write(&rel, &record).await?;
                self.publish(path, &format!("interactions: comment on {}", subject))
                    .await;

                Ok(comment)
            })
            .await
    }

    pub async fn edit_comment(
        &self,
        subject: &Subject,
        comment_id: &str,
        text: &str,
    ) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidRequest("comment text is required".to_string()));
        }

        let rel = Self::rel(subject);
        self.locks
            .with_lock(&rel, async {
                let mut record: InteractionRecord =
                    self.store.read(&rel).await.unwrap_or_default();

                let comment = record
                    .comments
                    .iter_mut()
                    .find(|c| c.id == comment_id)
                    .ok_or_else(|| Error::NotFound(format!("comment {}", comment_id)))?;
                comment.text = text.to_string();
                comment.edited = Some(Utc::now().timestamp_millis());
                let updated = comment.clone();

                let path = self.store.write(&rel, &record).await?;
                self.publish(path, &format!("interactions: edit comment on {}", subject))
                    .await;

                Ok(updated)
            })
            .await
    }

    pub async fn delete_comment(&self, subject: &Subject, comment_id: &str) -> Result<()> {
        let rel = Self::rel(subject);
        self.locks
            .with_lock(&rel, async {
                let mut record: InteractionRecord =
                    self.store.read(&rel).await.unwrap_or_default();

                let position = record
                    .comments
                    .iter()
                    .position(|c| c.id == comment_id)
                    .ok_or_else(|| Error::NotFound(format!("comment {}", comment_id)))?;
                record.comments.remove(position);

                let path = self.store.write(&rel, &record).await?;
                self.publish(path, &format!("interactions: delete comment on {}", subject))
                    .await;

                Ok(())
            })
            .await
    }

    /// Combined view of a stack plus its member photos: reaction counts are
    /// summed per emoji, comments concatenated (stack's own first, then each
    /// photo's in caller order, not timestamp order). Ids failing the
    /// grammar are dropped, not errored.
    pub async fn rollup(
        &self,
        stack_id: &SubjectId,
        photo_ids: &[String],
    ) -> (InteractionRecord, Rollup) {
        let stack = self.get(&Subject::Stack(stack_id.clone())).await;

        let mut reactions = stack.reactions.clone();
        let mut comments = stack.comments.clone();

        for id in photo_ids {
            let Ok(photo_id) = SubjectId::parse(id) else {
                continue;
            };
            let record = self.get(&Subject::Photo(photo_id)).await;
            for (emoji, count) in record.reactions {
                *reactions.entry(emoji).or_insert(0) += count;
            }
            comments.extend(record.comments);
        }

        let total_reaction_count = reactions.values().sum();
        let total_comment_count = comments.len();

        (
            stack,
            Rollup {
                reactions,
                comments,
                total_comment_count,
                total_reaction_count,
            },
        )
    }

    async fn publish(&self, path: PathBuf, message: &str) {
        self.publisher.publish(&[path], message).await;
    }
}

/// Comment ids are millisecond timestamps, bumped past the newest existing
/// id so two comments in the same millisecond still get distinct,
/// increasing ids. Writes are lock-serialized, so reading the tail is safe.
fn next_comment_id(record: &InteractionRecord, now_ms: i64) -> i64 {
    let last = record
        .comments
        .iter()
        .filter_map(|c| c.id.parse::<i64>().ok())
        .max()
        .unwrap_or(0);
    now_ms.max(last + 1)
}
