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

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::content::{ContentRecord, ContentType, SearchResult};
use crate::reconciler::ReconcilerState;

fn type_label(content_type: ContentType) -> String {
    let label = format!("[{}]", content_type);
    match content_type {
        ContentType::Article => label.blue().to_string(),
        ContentType::Video => label.magenta().to_string(),
        ContentType::Faq => label.yellow().to_string(),
    }
}

pub fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found".to_string();
    }

    let mut output = String::new();

    for result in results {
        output.push_str(&"━".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "{} {}",
            type_label(result.content_type),
            result.title.bold()
        ));
        output.push('\n');

        let mut meta = vec![result.id.clone()];
        if !result.category.is_empty() {
            meta.push(result.category.clone());
        }
        if !result.author.is_empty() {
            meta.push(result.author.clone());
        }
        if let Some(created) = result.created_at {
            meta.push(format_relative_time(created));
        }
        output.push_str(&meta.join(" · ").bright_black().to_string());
        output.push('\n');

        if !result.excerpt.is_empty() {
            output.push_str(&result.excerpt);
            output.push('\n');
        }

        output.push_str(&format!("score {:.1}", result.relevance_score).green().to_string());
        output.push_str("\n\n");
    }

    output
}

/// One block per delivered list in `watch`
pub fn format_update(collection: &str, records: &[ContentRecord]) -> String {
    let mut output = String::new();

    output.push_str(
        &format!("{} ({} items)", collection, records.len())
            .cyan()
            .bold()
            .to_string(),
    );
    output.push('\n');
    output.push_str(&"─".repeat(60));
    output.push('\n');

    if records.is_empty() {
        output.push_str(&"(empty)".bright_black().to_string());
        output.push('\n');
        return output;
    }

    for record in records {
        let title = record.primary_text();
        let title = if title.chars().count() > 50 {
            format!("{}...", truncate_chars(title, 47))
        } else {
            title.to_string()
        };

        let status = format!("{:<10}", record.status().to_string());
        let status = if record.is_published() {
            status.green()
        } else {
            status.yellow()
        };

        let when = record
            .recency()
            .map(format_relative_time)
            .unwrap_or_else(|| "undated".to_string());

        output.push_str(&format!(
            "{:<24} {:<52} {} {}\n",
            truncate_chars(record.id(), 24),
            title,
            status,
            when.bright_black()
        ));
    }

    output
}

pub fn format_state(collection: &str, state: ReconcilerState) -> String {
    let label = state.to_string();
    let label = match state {
        ReconcilerState::Live | ReconcilerState::Closed => label.green(),
        ReconcilerState::Connecting | ReconcilerState::FallbackFetched => label.yellow(),
        ReconcilerState::Retrying { .. } => label.yellow(),
        ReconcilerState::Failed => label.red(),
        ReconcilerState::Cancelled => label.bright_black(),
    };
    format!("{}: {}", collection, label)
}

fn format_relative_time(dt: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{} minutes ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}
