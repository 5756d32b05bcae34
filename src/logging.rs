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

use anyhow::Result;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(debug_mode: bool) -> &'static str {
    if debug_mode {
        "info,helpdesk_core=debug"
    } else {
        "helpdesk_core=info"
    }
}

/// Initialize logging: human-readable output on stderr, plus daily-rotated
/// JSON files under the storage dir when `log_to_file` is set.
///
/// Stdout is left alone so `--format json` output stays machine-readable.
pub fn init_logging(debug_mode: bool, log_to_file: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug_mode)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = if log_to_file {
        let log_dir = crate::storage::get_log_dir()?;
        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "helpdesk.log");

        Some((
            log_dir,
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .json(),
        ))
    } else {
        None
    };
    let (log_dir, file_layer) = file_layer.unzip();

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        info!(
            log_directory = %dir.display(),
            debug_mode = debug_mode,
            "File logging initialized"
        );
    }

    Ok(())
}
