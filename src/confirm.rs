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

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::AdminConfig;

pub const DEFAULT_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// First click: the key is now waiting for a second one
    Armed,
    /// Second click inside the window: go ahead and delete
    Confirmed,
}

/// Two-step "click again to confirm" guard, tracked per key.
///
/// Callers pass the current instant so the window can be tested without
/// sleeping.
#[derive(Debug, Clone)]
pub struct DeleteConfirmation<K> {
    window: Duration,
    armed: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Default for DeleteConfirmation<K> {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRM_WINDOW)
    }
}

impl<K: Eq + Hash + Clone> DeleteConfirmation<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed: HashMap::new(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.delete_confirm_window())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a delete click for `key`
    pub fn request(&mut self, key: K, now: Instant) -> ConfirmOutcome {
        match self.armed.get(&key) {
            Some(&expires) if now < expires => {
                self.armed.remove(&key);
                debug!("Delete confirmed");
                ConfirmOutcome::Confirmed
            }
            _ => {
                self.armed.insert(key, now + self.window);
                ConfirmOutcome::Armed
            }
        }
    }

    pub fn is_armed(&self, key: &K, now: Instant) -> bool {
        self.armed.get(key).is_some_and(|&expires| now < expires)
    }

    /// Disarm `key`; returns whether it was armed
    pub fn cancel(&mut self, key: &K) -> bool {
        self.armed.remove(key).is_some()
    }

    /// Drop expired entries, returning how many were removed
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.armed.len();
        self.armed.retain(|_, expires| now < *expires);
        before - self.armed.len()
    }

    /// Keys currently holding an entry, expired or not
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}
