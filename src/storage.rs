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

use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "helpdesk-core";

/// Base directory for per-user data before the app directory is appended.
///
/// `XDG_DATA_HOME` wins on Linux and the BSDs; Windows uses the roaming
/// data dir; everything else, macOS included, uses `~/.local/share`.
fn data_root() -> Result<PathBuf> {
    if cfg!(target_os = "windows") {
        return dirs::data_dir().ok_or_else(|| anyhow!("No data directory for this user"));
    }

    if !cfg!(target_os = "macos") {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(xdg));
        }
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("No home directory for this user"))?;
    Ok(home.join(".local").join("share"))
}

/// Directory holding config.toml and logs/, created on first use
pub fn get_system_storage_dir() -> Result<PathBuf> {
    let dir = data_root()?.join(APP_DIR);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn get_system_config_path() -> Result<PathBuf> {
    Ok(get_system_storage_dir()?.join("config.toml"))
}

/// Directory for rotated log files, created on demand
pub fn get_log_dir() -> Result<PathBuf> {
    let dir = get_system_storage_dir()?.join("logs");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

