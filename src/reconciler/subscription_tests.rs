// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[cfg(test)]
mod tests {
    use super::super::error::{ReconcileError, SourceError};
    use super::super::source::{CollectionFilter, DocumentSource, Snapshot, SnapshotStream};
    use super::super::subscription::{
        reconcile_snapshot, Comparator, Reconciler, ReconcilerState, Subscription,
    };
    use crate::config::ReconcilerConfig;
    use crate::content::{newest_first, ContentRecord, ContentType, RawDocument};
    use async_trait::async_trait;
    use futures::stream::{self, StreamExt};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, OnceLock};
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    /// One scripted answer to `subscribe`
    enum Feed {
        /// The subscribe call itself fails
        Refuse(SourceError),
        /// Items are yielded, then the feed closes
        Items(Vec<Result<Snapshot, SourceError>>),
        /// Items are yielded, then the feed stays open forever
        ItemsThenHold(Vec<Result<Snapshot, SourceError>>),
    }

    struct ScriptedSource {
        feeds: Mutex<VecDeque<Feed>>,
        item_delay: Duration,
        fetch_result: Result<Vec<RawDocument>, SourceError>,
        fetch_delay: Duration,
        subscribe_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(feeds: Vec<Feed>) -> Self {
            Self {
                feeds: Mutex::new(feeds.into()),
                item_delay: Duration::ZERO,
                fetch_result: Ok(Vec::new()),
                fetch_delay: Duration::ZERO,
                subscribe_calls: AtomicUsize::new(0),
                fetch_calls: AtomicUsize::new(0),
            }
        }

        fn with_fetch(mut self, result: Result<Vec<RawDocument>, SourceError>) -> Self {
            self.fetch_result = result;
            self
        }

        fn with_item_delay(mut self, delay: Duration) -> Self {
            self.item_delay = delay;
            self
        }

        fn with_fetch_delay(mut self, delay: Duration) -> Self {
            self.fetch_delay = delay;
            self
        }

        fn subscribe_calls(&self) -> usize {
            self.subscribe_calls.load(Ordering::SeqCst)
        }

        fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentSource for ScriptedSource {
        async fn subscribe(
            &self,
            _filter: &CollectionFilter,
        ) -> Result<SnapshotStream, SourceError> {
            self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
            let feed = self
                .feeds
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Feed::Refuse(SourceError::Unavailable("script exhausted".into())));

            let delay = self.item_delay;
            let delayed = move |items: Vec<Result<Snapshot, SourceError>>| {
                stream::iter(items).then(move |item| async move {
                    tokio::time::sleep(delay).await;
                    item
                })
            };

            match feed {
                Feed::Refuse(e) => Err(e),
                Feed::Items(items) => Ok(delayed(items).boxed()),
                Feed::ItemsThenHold(items) => Ok(delayed(items).chain(stream::pending()).boxed()),
            }
        }

        async fn fetch_once(
            &self,
            _filter: &CollectionFilter,
        ) -> Result<Vec<RawDocument>, SourceError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.fetch_delay).await;
            self.fetch_result.clone()
        }
    }

    fn doc(id: &str, created_secs: i64) -> RawDocument {
        let value = json!({
            "id": id,
            "question": format!("Question {}", id),
            "status": "published",
            "createdAt": { "seconds": created_secs, "nanoseconds": 0 }
        });
        RawDocument::from_value(value).unwrap()
    }

    fn snap(docs: &[RawDocument]) -> Result<Snapshot, SourceError> {
        Ok(Snapshot::new(docs.to_vec()))
    }

    fn unavailable() -> SourceError {
        SourceError::Unavailable("connection reset".into())
    }

    fn denied() -> SourceError {
        SourceError::PermissionDenied("missing read rule".into())
    }

    struct Observed {
        updates: UnboundedReceiver<Vec<String>>,
        errors: UnboundedReceiver<ReconcileError>,
    }

    fn start(source: Arc<ScriptedSource>, config: ReconcilerConfig) -> (Subscription, Observed) {
        start_filtered(source, config, CollectionFilter::new(ContentType::Faq))
    }

    fn start_filtered(
        source: Arc<ScriptedSource>,
        config: ReconcilerConfig,
        filter: CollectionFilter,
    ) -> (Subscription, Observed) {
        let (update_tx, updates) = unbounded_channel();
        let (error_tx, errors) = unbounded_channel();
        let reconciler = Reconciler::new(source, config);

        let subscription = reconciler.subscribe(
            filter,
            move |records: Vec<ContentRecord>| {
                let ids = records.iter().map(|r| r.id().to_string()).collect();
                let _ = update_tx.send(ids);
            },
            move |error| {
                let _ = error_tx.send(error);
            },
        );

        (subscription, Observed { updates, errors })
    }

    fn config() -> ReconcilerConfig {
        ReconcilerConfig {
            max_retries: 3,
            retry_backoff_ms: 500,
            poll_interval_ms: 1000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_sequence_never_delivers_deleted_documents() {
        let a = doc("A", 100);
        let b = doc("B", 200);
        let source = Arc::new(ScriptedSource::new(vec![Feed::Items(vec![
            snap(&[a.clone()]),
            snap(&[a.clone(), b.clone()]),
            snap(&[b.clone()]),
        ])]));

        let (subscription, mut observed) = start(source.clone(), config());

        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["B", "A"]);
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["B"]);

        assert_eq!(subscription.settled().await, ReconcilerState::Closed);
        assert!(observed.updates.recv().await.is_none());
        assert!(observed.errors.try_recv().is_err());
        assert_eq!(source.subscribe_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_empty_snapshot_is_delivered() {
        let source = Arc::new(ScriptedSource::new(vec![Feed::ItemsThenHold(vec![snap(&[])])]));
        let (subscription, mut observed) = start(source, config());

        assert!(observed.updates.recv().await.unwrap().is_empty());
        assert_eq!(subscription.state(), ReconcilerState::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried_with_linear_backoff() {
        let source = Arc::new(ScriptedSource::new(vec![
            Feed::Refuse(unavailable()),
            Feed::Refuse(unavailable()),
            Feed::ItemsThenHold(vec![snap(&[doc("A", 1)])]),
        ]));
        let started = tokio::time::Instant::now();
        let (subscription, mut observed) = start(source.clone(), config());

        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);
        // 500ms before the first retry, 1000ms before the second
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(started.elapsed() < Duration::from_millis(2000));
        assert_eq!(source.subscribe_calls(), 3);
        assert_eq!(source.fetch_calls(), 0);
        assert_eq!(subscription.state(), ReconcilerState::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fall_back_to_fetch() {
        let source = Arc::new(
            ScriptedSource::new(vec![
                Feed::Refuse(unavailable()),
                Feed::Refuse(unavailable()),
                Feed::Refuse(unavailable()),
                Feed::Refuse(unavailable()),
                Feed::ItemsThenHold(vec![snap(&[doc("never", 1)])]),
            ])
            .with_fetch(Ok(vec![doc("A", 1), doc("B", 2)])),
        );
        let (subscription, mut observed) = start(source.clone(), config());

        assert_eq!(observed.updates.recv().await.unwrap(), vec!["B", "A"]);
        assert_eq!(subscription.settled().await, ReconcilerState::FallbackFetched);
        // one initial attempt plus three retries
        assert_eq!(source.subscribe_calls(), 4);
        assert_eq!(source.fetch_calls(), 1);
        assert!(observed.updates.recv().await.is_none());
        assert!(observed.errors.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_error_skips_retries() {
        let source = Arc::new(
            ScriptedSource::new(vec![Feed::Refuse(denied())]).with_fetch(Ok(vec![doc("A", 1)])),
        );
        let started = tokio::time::Instant::now();
        let (subscription, mut observed) = start(source.clone(), config());

        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);
        assert_eq!(subscription.settled().await, ReconcilerState::FallbackFetched);
        assert_eq!(source.subscribe_calls(), 1);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_index_skips_retries() {
        let source = Arc::new(
            ScriptedSource::new(vec![Feed::Refuse(SourceError::MissingIndex(
                "category+createdAt".into(),
            ))])
            .with_fetch(Ok(vec![])),
        );
        let (subscription, mut observed) = start(source.clone(), config());

        assert!(observed.updates.recv().await.unwrap().is_empty());
        assert_eq!(subscription.settled().await, ReconcilerState::FallbackFetched);
        assert_eq!(source.subscribe_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fallback_reports_empty_list_then_error() {
        let source =
            Arc::new(ScriptedSource::new(vec![Feed::Refuse(denied())]).with_fetch(Err(denied())));
        let (subscription, mut observed) = start(source, config());

        assert!(observed.updates.recv().await.unwrap().is_empty());
        let error = observed.errors.recv().await.unwrap();
        assert_eq!(error.collection, "faqs");
        assert_eq!(error.subscription_error, denied());
        assert_eq!(error.fallback_error, denied());
        assert_eq!(subscription.settled().await, ReconcilerState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_stream_error_resubscribes_and_resets_budget() {
        let source = Arc::new(ScriptedSource::new(vec![
            Feed::Items(vec![snap(&[doc("A", 1)]), Err(unavailable())]),
            Feed::Refuse(unavailable()),
            Feed::Refuse(unavailable()),
            Feed::Items(vec![snap(&[doc("A", 1), doc("B", 2)]), Err(unavailable())]),
            Feed::Refuse(unavailable()),
            Feed::Refuse(unavailable()),
            Feed::Items(vec![snap(&[doc("B", 2)])]),
        ]));
        let (subscription, mut observed) = start(source.clone(), config());

        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["B", "A"]);
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["B"]);
        assert_eq!(subscription.settled().await, ReconcilerState::Closed);
        assert_eq!(source.subscribe_calls(), 7);
        assert_eq!(source.fetch_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_is_idempotent() {
        let source = Arc::new(ScriptedSource::new(vec![Feed::ItemsThenHold(vec![snap(&[
            doc("A", 1),
        ])])]));
        let (subscription, mut observed) = start(source, config());
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);

        subscription.unsubscribe();
        subscription.unsubscribe();

        assert!(subscription.is_cancelled());
        assert_eq!(subscription.state(), ReconcilerState::Cancelled);
        assert_eq!(subscription.settled().await, ReconcilerState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_updates_after_unsubscribe_from_live_feed() {
        let source = Arc::new(
            ScriptedSource::new(vec![Feed::ItemsThenHold(vec![
                snap(&[doc("A", 1)]),
                snap(&[doc("A", 1), doc("B", 2)]),
            ])])
            .with_item_delay(Duration::from_secs(1)),
        );
        let (subscription, mut observed) = start(source, config());

        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);
        subscription.unsubscribe();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(observed.updates.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_callbacks_after_unsubscribe_during_retry_timer() {
        let source = Arc::new(
            ScriptedSource::new(vec![
                Feed::Refuse(unavailable()),
                Feed::ItemsThenHold(vec![snap(&[doc("A", 1)])]),
            ])
            .with_fetch(Ok(vec![doc("A", 1)])),
        );
        let (subscription, mut observed) = start(source.clone(), config());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(subscription.state(), ReconcilerState::Retrying { attempt: 1 });
        subscription.unsubscribe();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(observed.updates.recv().await.is_none());
        assert!(observed.errors.recv().await.is_none());
        assert_eq!(source.subscribe_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_callbacks_after_unsubscribe_during_fallback_fetch() {
        let source = Arc::new(
            ScriptedSource::new(vec![Feed::Refuse(denied())])
                .with_fetch(Err(denied()))
                .with_fetch_delay(Duration::from_secs(1)),
        );
        let (subscription, mut observed) = start(source.clone(), config());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.fetch_calls(), 1);
        subscription.unsubscribe();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(observed.updates.recv().await.is_none());
        assert!(observed.errors.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_subscription_unsubscribes() {
        let source = Arc::new(
            ScriptedSource::new(vec![Feed::ItemsThenHold(vec![
                snap(&[doc("A", 1)]),
                snap(&[doc("B", 2)]),
            ])])
            .with_item_delay(Duration::from_secs(1)),
        );
        let (subscription, mut observed) = start(source, config());
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);

        drop(subscription);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(observed.updates.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_from_inside_callback() {
        let source = Arc::new(
            ScriptedSource::new(vec![Feed::ItemsThenHold(vec![
                snap(&[doc("A", 1)]),
                snap(&[doc("A", 1), doc("B", 2)]),
            ])])
            .with_item_delay(Duration::from_secs(1)),
        );
        let slot: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());
        let (update_tx, mut updates) = unbounded_channel::<Vec<String>>();

        let inner = Arc::clone(&slot);
        let subscription = Reconciler::new(source, config()).subscribe(
            CollectionFilter::new(ContentType::Faq),
            move |records| {
                let _ = update_tx.send(records.iter().map(|r| r.id().to_string()).collect());
                if let Some(subscription) = inner.get() {
                    subscription.unsubscribe();
                }
            },
            |_| {},
        );
        let _ = slot.set(subscription);

        assert_eq!(updates.recv().await.unwrap(), vec!["A"]);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(updates.recv().await.is_none());
        assert!(slot.get().unwrap().is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unsubscribe_waits_for_callback_on_another_thread() {
        let source = Arc::new(ScriptedSource::new(vec![Feed::ItemsThenHold(vec![
            snap(&[doc("A", 1)]),
            snap(&[doc("B", 2)]),
        ])]));
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(AtomicUsize::new(0));

        let (done, count) = (Arc::clone(&finished), Arc::clone(&calls));
        let subscription = Reconciler::new(source, config()).subscribe(
            CollectionFilter::new(ContentType::Faq),
            move |_| {
                if count.fetch_add(1, Ordering::SeqCst) == 0 {
                    let _ = started_tx.send(());
                    std::thread::sleep(Duration::from_millis(200));
                    done.store(true, Ordering::SeqCst);
                }
            },
            |_| {},
        );

        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();
        subscription.unsubscribe();
        assert!(finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_is_applied_to_snapshots() {
        let mut draft = doc("draft", 5);
        draft.data.insert("status".to_string(), Value::from("draft"));
        let source = Arc::new(ScriptedSource::new(vec![Feed::Items(vec![snap(&[
            doc("A", 1),
            draft,
        ])])]));

        let filter = CollectionFilter::new(ContentType::Faq).published();
        let (_subscription, mut observed) = start_filtered(source, config(), filter);
        assert_eq!(observed.updates.recv().await.unwrap(), vec!["A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_order_is_used() {
        let source = Arc::new(ScriptedSource::new(vec![Feed::Items(vec![snap(&[
            doc("b", 1),
            doc("c", 3),
            doc("a", 2),
        ])])]));
        let (update_tx, mut updates) = unbounded_channel::<Vec<String>>();
        let by_id: Comparator = Arc::new(|x: &ContentRecord, y: &ContentRecord| x.id().cmp(y.id()));

        let reconciler = Reconciler::new(source, config());
        let _subscription = reconciler.subscribe_with_order(
            CollectionFilter::new(ContentType::Faq),
            by_id,
            move |records| {
                let _ = update_tx.send(records.iter().map(|r| r.id().to_string()).collect());
            },
            |_| {},
        );

        assert_eq!(updates.recv().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reconcile_snapshot_dedupes_last_write_wins() {
        let mut first = doc("A", 1);
        first.data.insert("question".to_string(), Value::from("old"));
        let mut second = doc("A", 1);
        second.data.insert("question".to_string(), Value::from("new"));
        let no_id = RawDocument::default();

        let filter = CollectionFilter::new(ContentType::Faq);
        let records = reconcile_snapshot(&filter, &[first, doc("B", 0), second, no_id], &newest_first);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "A");
        assert_eq!(records[0].primary_text(), "new");
        assert_eq!(records[1].id(), "B");
    }

    #[test]
    fn test_reconcile_snapshot_puts_undated_last() {
        let mut undated = doc("U", 0);
        undated.data.remove("createdAt");
        let filter = CollectionFilter::new(ContentType::Faq);
        let records =
            reconcile_snapshot(&filter, &[undated, doc("old", 1), doc("new", 9)], &newest_first);

        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["new", "old", "U"]);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ReconcilerState::Connecting.is_terminal());
        assert!(!ReconcilerState::Live.is_terminal());
        assert!(!ReconcilerState::Retrying { attempt: 2 }.is_terminal());
        assert!(ReconcilerState::FallbackFetched.is_terminal());
        assert!(ReconcilerState::Failed.is_terminal());
        assert!(ReconcilerState::Closed.is_terminal());
        assert!(ReconcilerState::Cancelled.is_terminal());
    }
}
