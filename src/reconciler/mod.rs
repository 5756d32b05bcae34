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

//! Realtime list reconciliation over a document source's live feed

pub mod error;
pub mod json_source;
pub mod source;
pub mod subscription;

mod subscription_tests;

pub use error::{ReconcileError, SourceError};
pub use json_source::JsonDirSource;
pub use source::{CollectionFilter, DocumentSource, Snapshot, SnapshotStream};
pub use subscription::{
    reconcile_snapshot, Comparator, Reconciler, ReconcilerState, Subscription,
};
