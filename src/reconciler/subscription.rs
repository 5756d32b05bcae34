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

use futures::StreamExt;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{self, AtomicBool};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::ReconcileError;
use super::source::{CollectionFilter, DocumentSource};
use crate::config::ReconcilerConfig;
use crate::content::{newest_first, normalize, ContentRecord, ContentType, RawDocument};

/// Ordering applied to every delivered list
pub type Comparator = Arc<dyn Fn(&ContentRecord, &ContentRecord) -> Ordering + Send + Sync>;

type UpdateCallback = Box<dyn FnMut(Vec<ContentRecord>) + Send>;
type ErrorCallback = Box<dyn FnMut(ReconcileError) + Send>;

/// Lifecycle of one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Waiting for the first snapshot
    Connecting,
    /// Snapshots are being pushed by the source
    Live,
    /// Waiting out the backoff before retry `attempt`
    Retrying { attempt: u32 },
    /// One static list was delivered from the fallback fetch
    FallbackFetched,
    /// Both the feed and the fallback failed
    Failed,
    /// The source ended the feed
    Closed,
    /// The caller unsubscribed
    Cancelled,
}

impl ReconcilerState {
    /// No further updates can follow
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReconcilerState::FallbackFetched
                | ReconcilerState::Failed
                | ReconcilerState::Closed
                | ReconcilerState::Cancelled
        )
    }
}

impl std::fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcilerState::Connecting => write!(f, "connecting"),
            ReconcilerState::Live => write!(f, "live"),
            ReconcilerState::Retrying { attempt } => write!(f, "retrying ({})", attempt),
            ReconcilerState::FallbackFetched => write!(f, "fallback_fetched"),
            ReconcilerState::Failed => write!(f, "failed"),
            ReconcilerState::Closed => write!(f, "closed"),
            ReconcilerState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Cancellation flag that is checked and acted on under the same lock as
/// every callback, so a cancel from another thread waits out a callback in
/// progress and nothing is delivered once it returns.
#[derive(Debug, Default)]
struct CallbackGate {
    cancelled: AtomicBool,
    running: Mutex<()>,
    /// Thread currently inside a callback
    runner: Mutex<Option<ThreadId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CallbackGate {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(atomic::Ordering::SeqCst)
    }

    /// Run `callback` unless cancelled
    fn run(&self, callback: impl FnOnce()) {
        let _running = lock(&self.running);
        if self.is_cancelled() {
            return;
        }
        *lock(&self.runner) = Some(thread::current().id());
        callback();
        *lock(&self.runner) = None;
    }

    /// Set the flag, then wait for a callback running on another thread.
    /// Returns false when already cancelled.
    fn cancel(&self) -> bool {
        if self.cancelled.swap(true, atomic::Ordering::SeqCst) {
            return false;
        }
        // Called from inside a callback: it holds `running` itself
        let reentrant = *lock(&self.runner) == Some(thread::current().id());
        if !reentrant {
            drop(lock(&self.running));
        }
        true
    }
}

/// Turn one snapshot into the list handed to callers: normalize, drop what
/// the filter rejects, de-duplicate by identity (last write wins), then sort.
pub fn reconcile_snapshot(
    filter: &CollectionFilter,
    documents: &[RawDocument],
    order: &(dyn Fn(&ContentRecord, &ContentRecord) -> Ordering + Send + Sync),
) -> Vec<ContentRecord> {
    let mut positions: HashMap<(ContentType, String), usize> = HashMap::new();
    let mut records: Vec<ContentRecord> = Vec::with_capacity(documents.len());

    for record in documents
        .iter()
        .filter_map(|doc| normalize(filter.content_type, doc))
        .filter(|record| filter.matches(record))
    {
        let key = (record.content_type(), record.id().to_string());
        match positions.get(&key) {
            Some(&index) => {
                debug!(
                    collection = filter.collection_name(),
                    id = record.id(),
                    "Duplicate document in snapshot, keeping the later one"
                );
                records[index] = record;
            }
            None => {
                positions.insert(key, records.len());
                records.push(record);
            }
        }
    }

    records.sort_by(|a, b| order(a, b));
    records
}

/// Turns a [`DocumentSource`] live feed into sorted, de-duplicated lists
pub struct Reconciler {
    source: Arc<dyn DocumentSource>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(source: Arc<dyn DocumentSource>, config: ReconcilerConfig) -> Self {
        Self { source, config }
    }

    /// Subscribe with the default newest-first ordering.
    ///
    /// `on_update` fires for every snapshot, the first one included.
    /// `on_error` fires at most once, after `on_update(vec![])`, when both the
    /// live feed and the fallback fetch failed. Must be called from within a
    /// tokio runtime. Dropping the returned [`Subscription`] unsubscribes.
    pub fn subscribe<U, E>(&self, filter: CollectionFilter, on_update: U, on_error: E) -> Subscription
    where
        U: FnMut(Vec<ContentRecord>) + Send + 'static,
        E: FnMut(ReconcileError) + Send + 'static,
    {
        let order: Comparator = Arc::new(newest_first);
        self.subscribe_with_order(filter, order, on_update, on_error)
    }

    /// Subscribe with a caller-supplied ordering
    pub fn subscribe_with_order<U, E>(
        &self,
        filter: CollectionFilter,
        order: Comparator,
        on_update: U,
        on_error: E,
    ) -> Subscription
    where
        U: FnMut(Vec<ContentRecord>) + Send + 'static,
        E: FnMut(ReconcileError) + Send + 'static,
    {
        let gate = Arc::new(CallbackGate::default());
        let (state_tx, state_rx) = watch::channel(ReconcilerState::Connecting);
        let collection = filter.collection_name();

        let driver = Driver {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            filter,
            order,
            gate: Arc::clone(&gate),
            state: state_tx,
            on_update: Box::new(on_update),
            on_error: Box::new(on_error),
        };

        debug!(collection = collection, "Starting subscription");
        let handle = tokio::spawn(driver.run());

        Subscription {
            collection,
            gate,
            state: state_rx,
            handle,
        }
    }
}

/// Handle to a running subscription
pub struct Subscription {
    collection: &'static str,
    gate: Arc<CallbackGate>,
    state: watch::Receiver<ReconcilerState>,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop all further callbacks. Safe to call any number of times, including
    /// from inside a callback. When a callback is running on another thread,
    /// blocks until it returns.
    pub fn unsubscribe(&self) {
        if !self.gate.cancel() {
            return;
        }
        self.handle.abort();
        debug!(collection = self.collection, "Subscription cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }

    pub fn state(&self) -> ReconcilerState {
        if self.is_cancelled() {
            return ReconcilerState::Cancelled;
        }
        *self.state.borrow()
    }

    /// Wait until the subscription reaches a terminal state. Never returns
    /// while the feed stays live.
    pub async fn settled(&self) -> ReconcilerState {
        let mut rx = self.state.clone();
        let reached = rx.wait_for(|s| s.is_terminal()).await.map(|s| *s);
        match reached {
            Ok(state) if !self.is_cancelled() => state,
            _ => self.state(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Background task owning the callbacks of one subscription
struct Driver {
    source: Arc<dyn DocumentSource>,
    config: ReconcilerConfig,
    filter: CollectionFilter,
    order: Comparator,
    gate: Arc<CallbackGate>,
    state: watch::Sender<ReconcilerState>,
    on_update: UpdateCallback,
    on_error: ErrorCallback,
}

impl Driver {
    fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }

    fn set_state(&self, next: ReconcilerState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(
                collection = self.filter.collection_name(),
                from = %previous,
                to = %next,
                "Subscription state changed"
            );
        }
    }

    fn emit_update(&mut self, records: Vec<ContentRecord>) {
        let on_update = self.on_update.as_mut();
        self.gate.run(|| on_update(records));
    }

    fn emit_error(&mut self, error: ReconcileError) {
        let on_error = self.on_error.as_mut();
        self.gate.run(|| on_error(error));
    }

    fn deliver(&mut self, documents: &[RawDocument]) {
        let records = reconcile_snapshot(&self.filter, documents, self.order.as_ref());
        debug!(
            collection = self.filter.collection_name(),
            documents = documents.len(),
            records = records.len(),
            "Delivering snapshot"
        );
        self.emit_update(records);
    }

    async fn run(mut self) {
        let collection = self.filter.collection_name();
        let mut attempt: u32 = 0;

        let subscription_error = loop {
            let error = match self.source.subscribe(&self.filter).await {
                Ok(mut stream) => {
                    let mut failure = None;
                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(snapshot) => {
                                attempt = 0;
                                self.set_state(ReconcilerState::Live);
                                self.deliver(&snapshot.documents);
                            }
                            Err(e) => {
                                failure = Some(e);
                                break;
                            }
                        }
                    }
                    match failure {
                        Some(e) => e,
                        None => {
                            self.set_state(ReconcilerState::Closed);
                            return;
                        }
                    }
                }
                Err(e) => e,
            };

            if !error.is_transient() || attempt >= self.config.max_retries {
                break error;
            }

            attempt += 1;
            let delay = self.config.retry_backoff() * attempt;
            warn!(
                collection = collection,
                attempt = attempt,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Live subscription failed, retrying"
            );
            self.set_state(ReconcilerState::Retrying { attempt });
            tokio::time::sleep(delay).await;
        };

        if self.is_cancelled() {
            return;
        }

        warn!(
            collection = collection,
            error = %subscription_error,
            "Falling back to one-shot fetch"
        );
        match self.source.fetch_once(&self.filter).await {
            Ok(documents) => {
                self.set_state(ReconcilerState::FallbackFetched);
                self.deliver(&documents);
            }
            Err(fallback_error) => {
                warn!(
                    collection = collection,
                    error = %fallback_error,
                    "Fallback fetch failed"
                );
                self.set_state(ReconcilerState::Failed);
                self.emit_update(Vec::new());
                self.emit_error(ReconcileError {
                    collection,
                    subscription_error,
                    fallback_error,
                });
            }
        }
    }
}

