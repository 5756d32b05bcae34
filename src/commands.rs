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
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cli::Commands;
use crate::config::Config;
use crate::content::{normalize_all, ContentRecord, ContentStatus, ContentType, SearchResult};
use crate::formatting;
use crate::reconciler::{CollectionFilter, DocumentSource, JsonDirSource, Reconciler};
use crate::search::{SearchEngine, SearchFilter};

pub async fn execute(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Search {
            query,
            data,
            limit,
            types,
            category,
            include_drafts,
            format,
        } => {
            let filter = SearchFilter {
                content_types: types.as_deref().map(parse_types).transpose()?,
                category,
            };
            let limit = limit.unwrap_or(config.search.default_limit);
            let results = run_search(
                config,
                &data,
                &query.join(" "),
                &filter,
                include_drafts,
                limit,
            )
            .await?;
            print_results(&results, &format)
        }
        Commands::Watch {
            collection,
            data,
            status,
            category,
            format,
        } => {
            let content_type: ContentType = collection.parse().map_err(|e: String| anyhow!(e))?;
            let mut filter = CollectionFilter::new(content_type);
            filter.status = status.as_deref().map(parse_status).transpose()?;
            filter.category = category;
            watch(config, &data, filter, format == "json").await
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Parse a comma-separated list of content types
fn parse_types(list: &str) -> Result<Vec<ContentType>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ContentType>().map_err(|e| anyhow!(e)))
        .collect()
}

/// Parse a `--status` value; unlike ingestion, unknown values are rejected
fn parse_status(value: &str) -> Result<ContentStatus> {
    match value.trim().to_lowercase().as_str() {
        "published" => Ok(ContentStatus::Published),
        "draft" => Ok(ContentStatus::Draft),
        other => Err(anyhow!(
            "Unknown status '{}': expected published or draft",
            other
        )),
    }
}

/// Load every collection under `data` that the filter can match
async fn load_records(data: &Path, filter: &SearchFilter) -> Result<Vec<ContentRecord>> {
    let source = JsonDirSource::new(data, Default::default());
    let mut records = Vec::new();

    for content_type in ContentType::ALL {
        if let Some(ref types) = filter.content_types {
            if !types.contains(&content_type) {
                continue;
            }
        }

        let collection = CollectionFilter::new(content_type);
        let path = source.collection_path(&collection);
        if !path.exists() {
            debug!(path = %path.display(), "Collection file not present, skipping");
            continue;
        }

        let documents = source.fetch_once(&collection).await?;
        records.extend(normalize_all(content_type, &documents));
    }

    Ok(records)
}

async fn run_search(
    config: &Config,
    data: &Path,
    query: &str,
    filter: &SearchFilter,
    include_drafts: bool,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let mut records = load_records(data, filter).await?;
    if !include_drafts {
        records.retain(ContentRecord::is_published);
    }
    info!(records = records.len(), query = query, "Searching");

    let engine = SearchEngine::new(config.search.clone());
    Ok(engine.search_filtered(query, &records, filter, limit))
}

fn print_results(results: &[SearchResult], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(results)?),
        _ => print!("{}", formatting::format_search_results(results)),
    }
    Ok(())
}

async fn watch(config: &Config, data: &Path, filter: CollectionFilter, json: bool) -> Result<()> {
    let source: Arc<dyn DocumentSource> =
        Arc::new(JsonDirSource::new(data, config.reconciler.poll_interval()));
    let reconciler = Reconciler::new(source, config.reconciler.clone());
    let collection = filter.collection_name();

    let subscription = reconciler.subscribe(
        filter,
        move |records| {
            if json {
                match serde_json::to_string(&records) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(error = %e, "Failed to serialize update"),
                }
            } else {
                print!("{}", formatting::format_update(collection, &records));
            }
        },
        |error| eprintln!("Error: {}", error),
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            subscription.unsubscribe();
        }
        state = subscription.settled() => {
            if !json {
                eprintln!("{}", formatting::format_state(collection, state));
            }
        }
    }

    Ok(())
}
