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
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Kinds of help-center content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Long-form help articles
    Article,
    /// Tutorial videos
    Video,
    /// Frequently asked questions
    Faq,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Article, ContentType::Video, ContentType::Faq];

    /// Name of the backing collection in the document store
    pub fn collection_name(&self) -> &'static str {
        match self {
            ContentType::Article => "articles",
            ContentType::Video => "videos",
            ContentType::Faq => "faqs",
        }
    }

    /// Tie-break priority in ranked output; higher sorts first
    pub fn priority(&self) -> u8 {
        match self {
            ContentType::Article => 2,
            ContentType::Video => 1,
            ContentType::Faq => 0,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Article => write!(f, "article"),
            ContentType::Video => write!(f, "video"),
            ContentType::Faq => write!(f, "faq"),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "article" | "articles" | "doc" | "docs" => Ok(ContentType::Article),
            "video" | "videos" | "tutorial" => Ok(ContentType::Video),
            "faq" | "faqs" | "question" => Ok(ContentType::Faq),
            other => Err(format!("Unknown content type: {}", other)),
        }
    }
}

/// Publication status of a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentStatus::Draft => write!(f, "draft"),
            ContentStatus::Published => write!(f, "published"),
        }
    }
}

impl From<&str> for ContentStatus {
    // Anything that is not explicitly published stays hidden
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "published" | "live" | "public" => ContentStatus::Published,
            _ => ContentStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub status: ContentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub views: u64,
    /// Estimated reading time in minutes
    pub read_time: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub status: ContentStatus,
    /// Display duration as entered by editors, e.g. "4:32"
    pub duration: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub status: ContentStatus,
    /// Manual position within its category
    pub order: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A normalized help-center record.
///
/// Ids are only unique inside one content type, so identity is the
/// `(ContentType, id)` pair returned by [`ContentRecord::key`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentRecord {
    Article(Article),
    Video(Video),
    Faq(Faq),
}

impl ContentRecord {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentRecord::Article(_) => ContentType::Article,
            ContentRecord::Video(_) => ContentType::Video,
            ContentRecord::Faq(_) => ContentType::Faq,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ContentRecord::Article(a) => &a.id,
            ContentRecord::Video(v) => &v.id,
            ContentRecord::Faq(f) => &f.id,
        }
    }

    /// Composite identity of the record
    pub fn key(&self) -> (ContentType, &str) {
        (self.content_type(), self.id())
    }

    pub fn status(&self) -> ContentStatus {
        match self {
            ContentRecord::Article(a) => a.status,
            ContentRecord::Video(v) => v.status,
            ContentRecord::Faq(f) => f.status,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status() == ContentStatus::Published
    }

    pub fn category(&self) -> &str {
        match self {
            ContentRecord::Article(a) => &a.category,
            ContentRecord::Video(v) => &v.category,
            ContentRecord::Faq(f) => &f.category,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            ContentRecord::Article(a) => &a.author,
            ContentRecord::Video(v) => &v.author,
            ContentRecord::Faq(f) => &f.author,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            ContentRecord::Article(a) => &a.tags,
            ContentRecord::Video(v) => &v.tags,
            ContentRecord::Faq(f) => &f.tags,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ContentRecord::Article(a) => a.created_at,
            ContentRecord::Video(v) => v.created_at,
            ContentRecord::Faq(f) => f.created_at,
        }
    }

    /// Only articles carry a publication timestamp
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ContentRecord::Article(a) => a.published_at,
            _ => None,
        }
    }

    /// Timestamp used for newest-first ordering
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.published_at().or_else(|| self.created_at())
    }

    /// Title, or the question for FAQs
    pub fn primary_text(&self) -> &str {
        match self {
            ContentRecord::Article(a) => &a.title,
            ContentRecord::Video(v) => &v.title,
            ContentRecord::Faq(f) => &f.question,
        }
    }

    /// Main body text, used to build result excerpts
    pub fn body_text(&self) -> &str {
        match self {
            ContentRecord::Article(a) if a.content.trim().is_empty() => &a.excerpt,
            ContentRecord::Article(a) => &a.content,
            ContentRecord::Video(v) => &v.description,
            ContentRecord::Faq(f) => &f.answer,
        }
    }
}

/// Newest first by [`ContentRecord::recency`]; records without a timestamp last
pub fn newest_first(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    match (a.recency(), b.recency()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A ranked projection of a [`ContentRecord`], built per query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub id: String,
    /// Title, or the question for FAQs
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub relevance_score: f32,
}
