//! Behavior tests for the Journal Service

use serde_json::json;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use waymark_core::{DaySlug, Subject, SubjectId};
use waymark_fstore::{JsonStore, KeyLocks};

use crate::error::Error;
use crate::publish::{NoopPublisher, Publisher};
use crate::types::InteractionRecord;
use crate::{DayService, InteractionService};

fn test_services() -> (InteractionService, DayService, TempDir) {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    let locks = Arc::new(KeyLocks::new());
    let publisher: Arc<dyn Publisher> = Arc::new(NoopPublisher);

    let interactions =
        InteractionService::new(store.clone(), Arc::clone(&locks), Arc::clone(&publisher));
    let days = DayService::new(store, locks, publisher);
    (interactions, days, dir)
}

fn photo(id: &str) -> Subject {
    Subject::Photo(SubjectId::parse(id).unwrap())
}

fn stack(id: &str) -> Subject {
    Subject::Stack(SubjectId::parse(id).unwrap())
}

// Reactions

#[tokio::test]
async fn react_toggles_by_presence() {
    let (interactions, _, _dir) = test_services();
    let subject = photo("p1");

    let first = interactions.react(&subject, "❤️", false).await.unwrap();
    assert_eq!(first.count, 1);
    assert!(!first.removed);

    // Second react without an explicit action undoes the first.
    let second = interactions.react(&subject, "❤️", false).await.unwrap();
    assert_eq!(second.count, 0);
    assert!(second.removed);

    // The zero-count key is gone from the persisted record, not stored as 0.
    let record = interactions.get(&subject).await;
    assert!(record.reactions.is_empty());
}

#[tokio::test]
async fn explicit_remove_floors_at_zero() {
    let (interactions, _, _dir) = test_services();
    let subject = photo("p2");

    let outcome = interactions.react(&subject, "👍", true).await.unwrap();
    assert_eq!(outcome.count, 0);
    assert!(outcome.removed);
    assert!(interactions.get(&subject).await.reactions.is_empty());
}

#[tokio::test]
async fn react_requires_an_emoji() {
    let (interactions, _, _dir) = test_services();

    let err = interactions.react(&photo("p3"), "  ", false).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reacts_are_not_lost() {
    let (interactions, _, _dir) = test_services();

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let interactions = interactions.clone();
            tokio::spawn(async move {
                let emoji = format!("e{}", i);
                interactions.react(&photo("busy"), &emoji, false).await.unwrap();
            })
        })
        .collect();
    futures_util::future::join_all(tasks).await;

    let record = interactions.get(&photo("busy")).await;
    assert_eq!(record.reactions.len(), 20);
    assert!(record.reactions.values().all(|&count| count == 1));
}

// Comments

#[tokio::test]
async fn comment_round_trips_with_unique_increasing_ids() {
    let (interactions, _, _dir) = test_services();
    let subject = photo("p4");

    let first = interactions
        .comment(&subject, "  what a view  ", None)
        .await
        .unwrap();
    assert_eq!(first.text, "what a view");
    assert_eq!(first.author, "Anonymous");

    for i in 0..5 {
        interactions
            .comment(&subject, &format!("again {}", i), Some("maya"))
            .await
            .unwrap();
    }

    let record = interactions.get(&subject).await;
    assert_eq!(record.comments.len(), 6);
    assert_eq!(record.comments[1].author, "maya");

    let ids: Vec<i64> = record
        .comments
        .iter()
        .map(|c| c.id.parse().unwrap())
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn comment_ids_advance_past_a_future_tail() {
    let (interactions, _, dir) = test_services();
    let store = JsonStore::new(dir.path());

    // A record whose last comment id is far in the future (e.g. restored
    // from a machine with a skewed clock) must still get increasing ids.
    let far_future = chrono::Utc::now().timestamp_millis() + 60_000;
    store
        .write(
            "interactions/p5.json",
            &json!({
                "reactions": {},
                "comments": [{"id": far_future.to_string(), "text": "hi", "author": "a", "timestamp": far_future}]
            }),
        )
        .await
        .unwrap();

    let comment = interactions.comment(&photo("p5"), "later", None).await.unwrap();
    assert_eq!(comment.id.parse::<i64>().unwrap(), far_future + 1);
}

#[tokio::test]
async fn empty_comment_text_is_rejected() {
    let (interactions, _, _dir) = test_services();
    let subject = photo("p6");

    for text in ["", "   ", "\n\t"] {
        let err = interactions.comment(&subject, text, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    let created = interactions.comment(&subject, "ok", None).await.unwrap();
    let err = interactions
        .edit_comment(&subject, &created.id, "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn edit_replaces_text_and_marks_edited() {
    let (interactions, _, _dir) = test_services();
    let subject = photo("p7");

    let created = interactions.comment(&subject, "first", Some("maya")).await.unwrap();
    assert!(created.edited.is_none());

    let edited = interactions
        .edit_comment(&subject, &created.id, " second ")
        .await
        .unwrap();
    assert_eq!(edited.text, "second");
    assert_eq!(edited.author, "maya");
    assert!(edited.edited.is_some());

    let err = interactions
        .edit_comment(&subject, "999", "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_the_comment_once() {
    let (interactions, _, _dir) = test_services();
    let subject = stack("s1");

    let created = interactions.comment(&subject, "bye", None).await.unwrap();
    interactions.delete_comment(&subject, &created.id).await.unwrap();
    assert!(interactions.get(&subject).await.comments.is_empty());

    let err = interactions
        .delete_comment(&subject, &created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn missing_subject_reads_as_the_empty_record() {
    let (interactions, _, _dir) = test_services();

    for _ in 0..3 {
        let record = interactions.get(&photo("ghost")).await;
        assert_eq!(record, InteractionRecord::default());
    }
}

// Roll-up

#[tokio::test]
async fn rollup_sums_reactions_and_appends_comments() {
    let (interactions, _, dir) = test_services();
    let store = JsonStore::new(dir.path());

    interactions
        .react(&stack("st"), "❤️", false)
        .await
        .unwrap();
    // A photo record accumulated before toggle semantics existed.
    store
        .write(
            "interactions/m1.json",
            &json!({
                "reactions": {"❤️": 2},
                "comments": [{"id": "100", "text": "c1", "author": "a", "timestamp": 100}]
            }),
        )
        .await
        .unwrap();

    let (stack_record, rollup) = interactions
        .rollup(&SubjectId::parse("st").unwrap(), &["m1".to_string()])
        .await;

    assert_eq!(stack_record.reactions.get("❤️"), Some(&1));
    assert_eq!(rollup.reactions.get("❤️"), Some(&3));
    assert_eq!(rollup.comments.len(), 1);
    assert_eq!(rollup.comments[0].text, "c1");
    assert_eq!(rollup.total_comment_count, 1);
    assert_eq!(rollup.total_reaction_count, 3);
}

#[tokio::test]
async fn rollup_orders_stack_comments_before_photo_comments() {
    let (interactions, _, _dir) = test_services();

    interactions.comment(&stack("tour"), "stack says", None).await.unwrap();
    interactions.comment(&photo("pa"), "photo a", None).await.unwrap();
    interactions.comment(&photo("pb"), "photo b", None).await.unwrap();

    // Caller order, not timestamp order: pb before pa.
    let (_, rollup) = interactions
        .rollup(
            &SubjectId::parse("tour").unwrap(),
            &["pb".to_string(), "pa".to_string()],
        )
        .await;

    let texts: Vec<&str> = rollup.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["stack says", "photo b", "photo a"]);
}

#[tokio::test]
async fn rollup_drops_malformed_photo_ids() {
    let (interactions, _, _dir) = test_services();

    interactions.react(&photo("ok1"), "👍", false).await.unwrap();

    let (_, rollup) = interactions
        .rollup(
            &SubjectId::parse("st2").unwrap(),
            &[
                "../../etc".to_string(),
                "".to_string(),
                "ok1".to_string(),
                "a b".to_string(),
            ],
        )
        .await;

    assert_eq!(rollup.reactions.get("👍"), Some(&1));
    assert_eq!(rollup.total_reaction_count, 1);
}

#[test]
fn photos_query_param_fails_soft() {
    use crate::api::rest::parse_photos_param;

    assert_eq!(
        parse_photos_param(Some(r#"["a","b"]"#)),
        vec!["a".to_string(), "b".to_string()]
    );
    assert!(parse_photos_param(Some("not json")).is_empty());
    assert!(parse_photos_param(Some(r#"{"a":1}"#)).is_empty());
    assert!(parse_photos_param(None).is_empty());
}

// Days

#[tokio::test]
async fn day_round_trips_deep_equal() {
    let (_, days, _dir) = test_services();
    let slug = DaySlug::parse("2024-07-14").unwrap();

    let document = json!({
        "slug": "2024-07-14",
        "date": "2024-07-14",
        "segment": "Alps",
        "title": "Col du Galibier",
        "stats": {"km": 92.4, "custom": {"anything": ["goes", 1, null]}},
        "polyline": {"type": "LineString", "coordinates": [[6.40, 45.06], [6.41, 45.07]]},
        "points": [{"t": 1720947600000i64, "lat": 45.06, "lon": 6.40}],
        "photos": [{"id": "p1", "url": "/img/p1.jpg", "thumb": "/img/p1_t.jpg",
                    "taken_at": 1720951200000i64, "lat": 45.07, "lon": 6.41,
                    "caption": "summit"}]
    });

    days.put(&slug, document.clone()).await.unwrap();
    assert_eq!(days.get(&slug).await.unwrap(), document);
}

#[tokio::test]
async fn day_get_missing_is_not_found() {
    let (_, days, _dir) = test_services();

    let err = days
        .get(&DaySlug::parse("1999-01-01").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn day_put_rejects_non_object_bodies() {
    let (_, days, _dir) = test_services();
    let slug = DaySlug::parse("2024-07-14").unwrap();

    for body in [json!([1, 2, 3]), json!("text"), json!(42), json!(null)] {
        let err = days.put(&slug, body).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}

#[tokio::test]
async fn index_stays_sorted_and_summarized() {
    let (_, days, _dir) = test_services();

    days.put(
        &DaySlug::parse("2024-07-15").unwrap(),
        json!({"title": "Rest day", "photos": []}),
    )
    .await
    .unwrap();
    days.put(
        &DaySlug::parse("2024-07-14").unwrap(),
        json!({
            "date": "2024-07-14",
            "title": "Col du Galibier",
            "photos": [{"id": "p1", "thumb": "/img/p1_t.jpg"}, {"id": "p2"}]
        }),
    )
    .await
    .unwrap();

    let index = days.list().await;
    let slugs: Vec<&str> = index.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["2024-07-14", "2024-07-15"]);

    assert_eq!(index[0].photo_count, 2);
    assert_eq!(index[0].cover.as_deref(), Some("/img/p1_t.jpg"));
    assert_eq!(index[0].title.as_deref(), Some("Col du Galibier"));
    assert_eq!(index[1].photo_count, 0);
    assert_eq!(index[1].cover, None);
}

#[tokio::test]
async fn day_replacement_updates_its_index_entry() {
    let (_, days, _dir) = test_services();
    let slug = DaySlug::parse("2024-07-14").unwrap();

    days.put(&slug, json!({"title": "Draft"})).await.unwrap();
    days.put(&slug, json!({"title": "Final", "photos": [{"id": "p1"}]}))
        .await
        .unwrap();

    let index = days.list().await;
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].title.as_deref(), Some("Final"));
    assert_eq!(index[0].photo_count, 1);
}
