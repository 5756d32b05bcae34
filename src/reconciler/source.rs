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
use futures::stream::BoxStream;

use super::error::SourceError;
use crate::content::{ContentRecord, ContentStatus, ContentType, RawDocument};

/// One event from a live feed: the complete matching document set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<RawDocument>,
    /// Served from a local cache rather than the backend
    pub from_cache: bool,
}

impl Snapshot {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            from_cache: false,
        }
    }
}

/// Ordered stream of snapshots for one subscription
pub type SnapshotStream = BoxStream<'static, Result<Snapshot, SourceError>>;

/// Which documents a subscription watches
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionFilter {
    pub content_type: ContentType,
    pub status: Option<ContentStatus>,
    pub category: Option<String>,
}

impl CollectionFilter {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            status: None,
            category: None,
        }
    }

    /// Public listings only see published records
    pub fn published(mut self) -> Self {
        self.status = Some(ContentStatus::Published);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn collection_name(&self) -> &'static str {
        self.content_type.collection_name()
    }

    pub fn matches(&self, record: &ContentRecord) -> bool {
        if record.content_type() != self.content_type {
            return false;
        }

        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            if record.category() != category {
                return false;
            }
        }

        true
    }
}

/// The document database as seen by the reconciler.
///
/// Implementations deliver full snapshots; the reconciler never assumes a
/// snapshot is a delta.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Open a live feed of snapshots matching `filter`
    async fn subscribe(&self, filter: &CollectionFilter) -> Result<SnapshotStream, SourceError>;

    /// Read the matching documents once, without subscribing
    async fn fetch_once(&self, filter: &CollectionFilter) -> Result<Vec<RawDocument>, SourceError>;
}
