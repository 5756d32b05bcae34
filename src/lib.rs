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

//! Help-center content engine: multi-field keyword search over articles,
//! videos and FAQs, plus a reconciler that turns a document store's live
//! feed into sorted, de-duplicated lists.

pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod content;
pub mod formatting;
pub mod logging;
pub mod reconciler;
pub mod search;
pub mod storage;

pub use config::Config;
pub use confirm::{ConfirmOutcome, DeleteConfirmation};
pub use content::{ContentRecord, ContentStatus, ContentType, RawDocument, SearchResult};
pub use reconciler::{
    CollectionFilter, DocumentSource, ReconcileError, Reconciler, ReconcilerState, SourceError,
    Subscription,
};
pub use search::{search, SearchEngine, SearchFilter};
