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

//! Ingestion boundary between loosely-typed store documents and
//! [`ContentRecord`]. Nothing past this module sees an optional or untyped
//! field: missing values are defaulted here and logged, never rejected.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::types::{Article, ContentRecord, ContentStatus, ContentType, Faq, Video};

/// A document exactly as the store delivered it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDocument {
    /// Store-assigned document id
    pub id: String,
    /// Untrusted field map
    pub data: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Build from a JSON object, taking the id from its `id` field
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => {
                let id = match data.get("id") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => String::new(),
                };
                Some(Self { id, data })
            }
            _ => None,
        }
    }
}

/// Field reader that remembers which fields had to be defaulted
struct FieldReader<'a> {
    data: &'a Map<String, Value>,
    defaulted: Vec<&'static str>,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a Map<String, Value>) -> Self {
        Self {
            data,
            defaulted: Vec::new(),
        }
    }

    fn lookup(&self, keys: &[&str]) -> Option<&'a Value> {
        let data = self.data;
        keys.iter()
            .filter_map(move |k| data.get(*k))
            .find(|v| !v.is_null())
    }

    fn string(&mut self, name: &'static str, keys: &[&str]) -> String {
        match self.lookup(keys) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => {
                self.defaulted.push(name);
                String::new()
            }
        }
    }

    fn string_list(&mut self, name: &'static str, keys: &[&str]) -> Vec<String> {
        match self.lookup(keys) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            // Editors sometimes store tags as "a, b, c"
            Some(Value::String(s)) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => {
                self.defaulted.push(name);
                Vec::new()
            }
        }
    }

    fn integer(&mut self, name: &'static str, keys: &[&str]) -> i64 {
        let parsed = match self.lookup(keys) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            self.defaulted.push(name);
            0
        })
    }

    fn count(&mut self, name: &'static str, keys: &[&str]) -> u64 {
        self.integer(name, keys).max(0) as u64
    }

    fn status(&mut self) -> ContentStatus {
        match self.lookup(&["status"]) {
            Some(Value::String(s)) => ContentStatus::from(s.as_str()),
            Some(Value::Bool(true)) => ContentStatus::Published,
            _ => {
                self.defaulted.push("status");
                ContentStatus::Draft
            }
        }
    }

    fn timestamp(&mut self, name: &'static str, keys: &[&str]) -> Option<DateTime<Utc>> {
        let parsed = self.lookup(keys).and_then(parse_timestamp);
        if parsed.is_none() {
            self.defaulted.push(name);
        }
        parsed
    }
}

/// Parse the timestamp shapes seen in store exports: RFC 3339 strings,
/// epoch milliseconds, and `{seconds, nanoseconds}` objects.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Object(obj) => {
            let seconds = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos.min(999_999_999) as u32)
                .single()
        }
        _ => None,
    }
}

/// Convert a raw store document into a typed record.
///
/// Returns `None` only when the document has no usable id; every other gap is
/// filled with an empty or zero value.
pub fn normalize(content_type: ContentType, raw: &RawDocument) -> Option<ContentRecord> {
    let id = raw.id.trim();
    if id.is_empty() {
        warn!(
            collection = content_type.collection_name(),
            "Skipping document without an id"
        );
        return None;
    }
    let id = id.to_string();
    let mut r = FieldReader::new(&raw.data);

    let record = match content_type {
        ContentType::Article => ContentRecord::Article(Article {
            id,
            title: r.string("title", &["title"]),
            excerpt: r.string("excerpt", &["excerpt", "summary"]),
            content: r.string("content", &["content", "body"]),
            author: r.string("author", &["author", "authorName"]),
            category: r.string("category", &["category"]),
            tags: r.string_list("tags", &["tags"]),
            keywords: r.string_list("keywords", &["keywords"]),
            status: r.status(),
            created_at: r.timestamp("created_at", &["createdAt", "created_at"]),
            updated_at: r.timestamp("updated_at", &["updatedAt", "updated_at"]),
            published_at: r.timestamp("published_at", &["publishedAt", "published_at"]),
            views: r.count("views", &["views"]),
            read_time: r.count("read_time", &["readTime", "read_time"]).min(u32::MAX as u64)
                as u32,
        }),
        ContentType::Video => ContentRecord::Video(Video {
            id,
            title: r.string("title", &["title"]),
            description: r.string("description", &["description"]),
            video_url: r.string("video_url", &["videoUrl", "video_url"]),
            thumbnail_url: r.string("thumbnail_url", &["thumbnailUrl", "thumbnail_url"]),
            category: r.string("category", &["category"]),
            tags: r.string_list("tags", &["tags"]),
            author: r.string("author", &["author", "authorName"]),
            status: r.status(),
            duration: r.string("duration", &["duration"]),
            created_at: r.timestamp("created_at", &["createdAt", "created_at"]),
            updated_at: r.timestamp("updated_at", &["updatedAt", "updated_at"]),
        }),
        ContentType::Faq => ContentRecord::Faq(Faq {
            id,
            question: r.string("question", &["question"]),
            answer: r.string("answer", &["answer"]),
            category: r.string("category", &["category"]),
            tags: r.string_list("tags", &["tags"]),
            author: r.string("author", &["author", "authorName"]),
            status: r.status(),
            order: r.integer("order", &["order"]),
            created_at: r.timestamp("created_at", &["createdAt", "created_at"]),
            updated_at: r.timestamp("updated_at", &["updatedAt", "updated_at"]),
        }),
    };

    if !r.defaulted.is_empty() {
        debug!(
            collection = content_type.collection_name(),
            id = record.id(),
            defaulted = ?r.defaulted,
            "Defaulted missing document fields"
        );
    }

    Some(record)
}

/// Normalize a batch, dropping documents without ids
pub fn normalize_all(content_type: ContentType, docs: &[RawDocument]) -> Vec<ContentRecord> {
    docs.iter()
        .filter_map(|doc| normalize(content_type, doc))
        .collect()
}
