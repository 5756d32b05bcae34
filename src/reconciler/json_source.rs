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

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::SourceError;
use super::source::{CollectionFilter, DocumentSource, Snapshot, SnapshotStream};
use crate::content::RawDocument;

/// Document source backed by JSON exports on disk.
///
/// Each collection lives in `<dir>/<collection>.json`, either as an array of
/// documents carrying an `id` field or as an object keyed by document id.
/// Subscriptions poll the file and emit a snapshot whenever its content hash
/// changes.
pub struct JsonDirSource {
    dir: PathBuf,
    poll_interval: Duration,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll_interval,
        }
    }

    pub fn collection_path(&self, filter: &CollectionFilter) -> PathBuf {
        self.dir.join(format!("{}.json", filter.collection_name()))
    }
}

/// Read a collection file, returning its content hash and documents
async fn read_collection(path: &Path) -> Result<(String, Vec<RawDocument>), SourceError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => {
            SourceError::PermissionDenied(format!("{}: {}", path.display(), e))
        }
        _ => SourceError::Unavailable(format!("{}: {}", path.display(), e)),
    })?;

    let hash = hex::encode(Sha256::digest(&bytes));
    let documents = parse_documents(&bytes)
        .map_err(|e| SourceError::InvalidData(format!("{}: {}", path.display(), e)))?;
    Ok((hash, documents))
}

/// Parse an export in either array or id-keyed object form
pub fn parse_documents(bytes: &[u8]) -> Result<Vec<RawDocument>, String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(RawDocument::from_value)
            .collect()),
        Value::Object(entries) => Ok(entries
            .into_iter()
            .filter_map(|(key, item)| {
                RawDocument::from_value(item).map(|mut doc| {
                    if doc.id.is_empty() {
                        doc.id = key;
                    }
                    doc
                })
            })
            .collect()),
        _ => Err("expected a JSON array or object of documents".to_string()),
    }
}

struct PollState {
    path: PathBuf,
    interval: Duration,
    last_hash: String,
    pending: Option<Snapshot>,
}

#[async_trait]
impl DocumentSource for JsonDirSource {
    async fn subscribe(&self, filter: &CollectionFilter) -> Result<SnapshotStream, SourceError> {
        let path = self.collection_path(filter);
        let (hash, documents) = read_collection(&path).await?;
        debug!(path = %path.display(), documents = documents.len(), "Watching collection file");

        let state = PollState {
            path,
            interval: self.poll_interval,
            last_hash: hash,
            pending: Some(Snapshot::new(documents)),
        };

        let feed = stream::unfold(state, |mut state| async move {
            if let Some(snapshot) = state.pending.take() {
                return Some((Ok(snapshot), state));
            }

            loop {
                tokio::time::sleep(state.interval).await;
                match read_collection(&state.path).await {
                    Ok((hash, documents)) => {
                        if hash != state.last_hash {
                            state.last_hash = hash;
                            return Some((Ok(Snapshot::new(documents)), state));
                        }
                    }
                    // A half-written export; the next write will fix it
                    Err(SourceError::InvalidData(reason)) => {
                        warn!(reason = %reason, "Ignoring unparseable collection file");
                    }
                    Err(e) => return Some((Err(e), state)),
                }
            }
        });

        Ok(feed.boxed())
    }

    async fn fetch_once(&self, filter: &CollectionFilter) -> Result<Vec<RawDocument>, SourceError> {
        let (_, documents) = read_collection(&self.collection_path(filter)).await?;
        Ok(documents)
    }
}
