use std::cell::RefCell;

use lr_core::record::{OwnerId, PostId};
use lr_core::{RawRecord, RecordError, Score};
use lr_runtime::MetricsRegistry;
use lr_sources::{DataSource, FetchError, SnapshotSource};
use lr_views::TopKConfig;
use lr_walker::{RankMode, StreamWalker, WalkError, WalkerConfig};
use pretty_assertions::assert_eq;
use serde_json::json;

const OWNER: OwnerId = -42;

fn post(id: PostId, likes: Score, comments: u32) -> RawRecord {
    RawRecord::from_value(json!({
        "id": id,
        "owner_id": OWNER,
        "text": format!("post {id}"),
        "likes": {"count": likes},
        "comments": {"count": comments},
    }))
    .unwrap()
}

fn comment(text: &str, likes: Option<Score>) -> RawRecord {
    let mut value = json!({"text": text});
    if let Some(likes) = likes {
        value["likes"] = json!({"count": likes});
    }
    RawRecord::from_value(value).unwrap()
}

fn config(k: usize) -> WalkerConfig {
    WalkerConfig {
        batch_size: 100,
        top_k: TopKConfig { k },
    }
}

fn summary(items: &[lr_core::ScoredItem]) -> Vec<(Score, u64, String)> {
    items
        .iter()
        .map(|i| (i.score, i.sequence, i.text.clone()))
        .collect()
}

#[test]
fn comment_sequence_runs_across_posts() {
    let source = SnapshotSource::default()
        .with_posts("club", vec![post(1, 0, 2), post(2, 0, 1)])
        .with_comments(OWNER, 1, vec![comment("a", Some(1)), comment("b", Some(2))])
        .with_comments(OWNER, 2, vec![comment("c", Some(3))]);
    let walker = StreamWalker::new(config(10), source);

    let ranked = walker.walk("club", RankMode::Comments).unwrap();

    assert_eq!(
        summary(&ranked),
        vec![
            (3, 2, "c".to_string()),
            (2, 1, "b".to_string()),
            (1, 0, "a".to_string()),
        ]
    );
}

#[test]
fn posts_rank_by_likes_with_later_ties_first() {
    let posts = [5, 9, 2, 9, 7]
        .iter()
        .enumerate()
        .map(|(i, &likes)| post(i as PostId, likes, 0))
        .collect();
    let source = SnapshotSource::default().with_posts("club", posts);
    let walker = StreamWalker::new(config(3), source);

    let ranked = walker.walk("club", RankMode::Posts).unwrap();

    assert_eq!(
        summary(&ranked),
        vec![
            (9, 3, "post 3".to_string()),
            (9, 1, "post 1".to_string()),
            (7, 4, "post 4".to_string()),
        ]
    );
}

#[test]
fn comments_without_likes_rank_as_zero() {
    let source = SnapshotSource::default()
        .with_posts("club", vec![post(1, 0, 2)])
        .with_comments(OWNER, 1, vec![comment("deleted", None), comment("liked", Some(1))]);
    let metrics = MetricsRegistry::default();
    let walker = StreamWalker::new(config(10), source).with_metrics(metrics.clone());

    let ranked = walker.walk("club", RankMode::Comments).unwrap();

    assert_eq!(
        summary(&ranked),
        vec![(1, 1, "liked".to_string()), (0, 0, "deleted".to_string())]
    );
    assert_eq!(metrics.snapshot().scores_defaulted, 1);
}

#[test]
fn batch_size_caps_the_posts_considered() {
    let posts = (0..5).map(|i| post(i, i * 10, 0)).collect();
    let source = SnapshotSource::default().with_posts("club", posts);
    let walker = StreamWalker::new(
        WalkerConfig { batch_size: 2, top_k: TopKConfig { k: 10 } },
        source,
    );

    let ranked = walker.walk("club", RankMode::Posts).unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].score, 10);
}

#[test]
fn metrics_count_every_offer() {
    let posts = [4, 4, 4, 4, 6].iter().map(|&l| post(l, l, 0)).collect();
    let source = SnapshotSource::default().with_posts("club", posts);
    let metrics = MetricsRegistry::default();
    let walker = StreamWalker::new(config(3), source).with_metrics(metrics.clone());

    walker.walk("club", RankMode::Posts).unwrap();

    let snap = metrics.snapshot();
    assert_eq!(snap.batches_fetched, 1);
    assert_eq!(snap.items_offered, 5);
    assert_eq!(snap.items_accepted, 4);
    assert_eq!(snap.items_evicted, 1);
    assert_eq!(snap.items_rejected, 1);
}

#[test]
fn missing_text_aborts_the_walk() {
    let broken = RawRecord::from_value(json!({"id": 1, "likes": {"count": 3}})).unwrap();
    let source = SnapshotSource::default().with_posts("club", vec![post(0, 1, 0), broken]);
    let walker = StreamWalker::new(config(10), source);

    let err = walker.walk("club", RankMode::Posts).unwrap_err();

    assert!(matches!(err, WalkError::Record(RecordError::MissingField("text"))));
}

#[test]
fn rejected_record_is_not_counted_as_defaulted() {
    let empty = RawRecord::from_value(json!({"id": 1})).unwrap();
    let source = SnapshotSource::default().with_posts("club", vec![empty]);
    let metrics = MetricsRegistry::default();
    let walker = StreamWalker::new(config(10), source).with_metrics(metrics.clone());

    assert!(walker.walk("club", RankMode::Posts).is_err());

    let snap = metrics.snapshot();
    assert_eq!(snap.scores_defaulted, 0);
    assert_eq!(snap.items_offered, 0);
}

/// Serves a fixed batch, then fails the nth nested fetch or the batch itself.
struct FlakySource {
    posts: Vec<RawRecord>,
    fail_batch: bool,
    fail_nested_call: Option<usize>,
    nested_calls: RefCell<usize>,
}

impl FlakySource {
    fn new(posts: Vec<RawRecord>) -> Self {
        Self {
            posts,
            fail_batch: false,
            fail_nested_call: None,
            nested_calls: RefCell::new(0),
        }
    }
}

impl DataSource for FlakySource {
    fn fetch_batch(&self, _collection: &str, _count: u32) -> Result<Vec<RawRecord>, FetchError> {
        if self.fail_batch {
            return Err(FetchError::Unavailable("connection refused".into()));
        }
        Ok(self.posts.clone())
    }

    fn fetch_nested(
        &self,
        _parent_id: PostId,
        _owner_id: OwnerId,
        _desired_count: u32,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let mut calls = self.nested_calls.borrow_mut();
        *calls += 1;
        if self.fail_nested_call == Some(*calls) {
            return Err(FetchError::Api { code: 15, message: "Access denied".into() });
        }
        Ok(vec![comment("ok", Some(1))])
    }

    fn fetch_description(&self, _collection: &str) -> Result<String, FetchError> {
        Err(FetchError::Unavailable("description".into()))
    }
}

#[test]
fn failed_batch_fetch_produces_no_ranking() {
    let mut source = FlakySource::new(vec![post(1, 5, 0)]);
    source.fail_batch = true;
    let metrics = MetricsRegistry::default();
    let walker = StreamWalker::new(config(10), source).with_metrics(metrics.clone());

    for mode in [RankMode::Posts, RankMode::Comments] {
        let err = walker.walk("club", mode).unwrap_err();
        assert!(matches!(err, WalkError::Fetch(FetchError::Unavailable(_))));
    }
    assert_eq!(metrics.snapshot().items_offered, 0);
}

#[test]
fn failed_nested_fetch_aborts_after_partial_progress() {
    let mut source = FlakySource::new(vec![post(1, 0, 1), post(2, 0, 1), post(3, 0, 1)]);
    source.fail_nested_call = Some(2);
    let walker = StreamWalker::new(config(10), source);

    let err = walker.walk("club", RankMode::Comments).unwrap_err();

    assert!(matches!(err, WalkError::Fetch(FetchError::Api { code: 15, .. })));
    assert_eq!(*walker.source().nested_calls.borrow(), 2);
}

#[test]
fn posts_without_comments_are_still_fetched() {
    let source = FlakySource::new(vec![post(1, 0, 0), post(2, 0, 3)]);
    let walker = StreamWalker::new(config(10), source);

    let ranked = walker.walk("club", RankMode::Comments).unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(*walker.source().nested_calls.borrow(), 2);
}

#[test]
fn failed_fetch_on_post_without_comments_aborts_the_walk() {
    let mut source = FlakySource::new(vec![post(1, 0, 0)]);
    source.fail_nested_call = Some(1);
    let walker = StreamWalker::new(config(10), source);

    let err = walker.walk("club", RankMode::Comments).unwrap_err();

    assert!(matches!(err, WalkError::Fetch(FetchError::Api { .. })));
}
