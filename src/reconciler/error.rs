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

use thiserror::Error;

/// Failures reported by a document source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Network or backend outage; may resolve on its own
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The query needs an index the backend does not have
    #[error("Missing index: {0}")]
    MissingIndex(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl SourceError {
    /// Whether retrying the same request can succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Unavailable(_))
    }
}

/// Terminal failure of a subscription, delivered through `on_error`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Live subscription to {collection} failed ({subscription_error}); fallback fetch failed: {fallback_error}"
)]
pub struct ReconcileError {
    pub collection: &'static str,
    /// Last error seen on the live feed
    pub subscription_error: SourceError,
    /// Error from the one-shot fetch
    #[source]
    pub fallback_error: SourceError,
}
