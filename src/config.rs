// Copyright 2025 Muvon Un Limited
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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Weight of a term found in an article or video title
    pub title_weight: f32,
    /// Weight of a term found in a FAQ question
    pub question_weight: f32,
    /// Weight of a term found in tags or keywords
    pub tag_weight: f32,
    /// Weight of a term found in body text
    pub body_weight: f32,
    /// Excerpt window in characters
    pub excerpt_length: usize,
    /// Result limit used when the caller gives none
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            title_weight: 3.0,
            question_weight: 2.5,
            tag_weight: 2.0,
            body_weight: 1.0,
            excerpt_length: 150,
            default_limit: 20,
        }
    }
}

/// Live subscription configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Retries for transient failures before falling back to a one-shot fetch
    pub max_retries: u32,
    /// Linear backoff step; retry N waits N * step
    pub retry_backoff_ms: u64,
    /// Poll interval for file-backed sources
    pub poll_interval_ms: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff_ms: 500,
            poll_interval_ms: 1000,
        }
    }
}

impl ReconcilerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Admin console behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// How long a "click again to delete" stays armed
    pub delete_confirm_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            delete_confirm_secs: 3,
        }
    }
}

impl AdminConfig {
    pub fn delete_confirm_window(&self) -> Duration {
        Duration::from_secs(self.delete_confirm_secs)
    }
}

/// Main configuration for helpdesk-core
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub reconciler: ReconcilerConfig,
    pub admin: AdminConfig,
}

const DEFAULT_TEMPLATE: &str = include_str!("../config-templates/default.toml");

impl Config {
    /// Load configuration from config.toml file
    /// First tries to load from system config directory, falls back to embedded template
    pub fn load() -> Result<Self> {
        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Invalid configuration in {}", config_path.display()))
        } else {
            let config = Self::from_toml(DEFAULT_TEMPLATE)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, DEFAULT_TEMPLATE)?;

            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
