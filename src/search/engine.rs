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

use std::cmp::Ordering;
use tracing::debug;

use super::excerpt::{build_excerpt, fold};
use crate::config::SearchConfig;
use crate::content::{newest_first, ContentRecord, ContentType, SearchResult};

/// Narrowing applied before scoring
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Only these content types (any of)
    pub content_types: Option<Vec<ContentType>>,
    /// Only this category, compared case-insensitively
    pub category: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, record: &ContentRecord) -> bool {
        if let Some(ref types) = self.content_types {
            if !types.contains(&record.content_type()) {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            if !record.category().eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }

        true
    }
}

/// Split a query into lowercase, de-duplicated terms
pub fn parse_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in fold(query.trim()).split_whitespace() {
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// Multi-field keyword ranking over in-memory help-center records.
///
/// Stateless apart from its weights: the same query over the same records
/// always yields the same order.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rank every record in the pool, drafts included (admin use)
    pub fn search(&self, query: &str, records: &[ContentRecord], limit: usize) -> Vec<SearchResult> {
        self.rank(query, records.iter(), limit)
    }

    /// Rank only published records (public use)
    pub fn search_published(
        &self,
        query: &str,
        records: &[ContentRecord],
        limit: usize,
    ) -> Vec<SearchResult> {
        self.rank(query, records.iter().filter(|r| r.is_published()), limit)
    }

    /// Rank records that pass `filter`
    pub fn search_filtered(
        &self,
        query: &str,
        records: &[ContentRecord],
        filter: &SearchFilter,
        limit: usize,
    ) -> Vec<SearchResult> {
        self.rank(query, records.iter().filter(|r| filter.matches(r)), limit)
    }

    fn rank<'a, I>(&self, query: &str, records: I, limit: usize) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = &'a ContentRecord>,
    {
        let terms = parse_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let limit = limit.max(1);

        let mut scored: Vec<(&ContentRecord, f32)> = records
            .into_iter()
            .filter_map(|record| {
                self.score_record(&terms, record)
                    .map(|score| (record, score))
            })
            .collect();

        scored.sort_by(|(a, score_a), (b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| newest_first(a, b))
                .then_with(|| {
                    b.content_type()
                        .priority()
                        .cmp(&a.content_type().priority())
                })
                .then_with(|| a.id().cmp(b.id()))
        });

        debug!(
            query = query,
            terms = terms.len(),
            matched = scored.len(),
            limit = limit,
            "Ranked search results"
        );

        scored
            .into_iter()
            .take(limit)
            .map(|(record, score)| self.to_result(record, &terms, score))
            .collect()
    }

    /// Searchable text of a record grouped by weight class, folded for
    /// matching. Fields sharing a class are joined so a term counts once per
    /// class: title or question, tags and keywords, body.
    fn weighted_fields(&self, record: &ContentRecord) -> Vec<(String, f32)> {
        let cfg = &self.config;
        match record {
            ContentRecord::Article(a) => vec![
                (fold(&a.title), cfg.title_weight),
                (
                    join_class(&[a.tags.join("\n").as_str(), a.keywords.join("\n").as_str()]),
                    cfg.tag_weight,
                ),
                (
                    join_class(&[a.excerpt.as_str(), a.content.as_str()]),
                    cfg.body_weight,
                ),
            ],
            ContentRecord::Video(v) => vec![
                (fold(&v.title), cfg.title_weight),
                (fold(&v.tags.join("\n")), cfg.tag_weight),
                (fold(&v.description), cfg.body_weight),
            ],
            ContentRecord::Faq(f) => vec![
                (fold(&f.question), cfg.question_weight),
                (fold(&f.tags.join("\n")), cfg.tag_weight),
                (fold(&f.answer), cfg.body_weight),
            ],
        }
    }

    /// Score a single field: each term present adds the field weight once
    pub(crate) fn score_field(terms: &[String], text: &str, field_weight: f32) -> f32 {
        if terms.is_empty() || text.is_empty() {
            return 0.0;
        }

        terms
            .iter()
            .filter(|term| text.contains(term.as_str()))
            .count() as f32
            * field_weight
    }

    /// Relevance of a record, or `None` when no term occurs in any field
    pub(crate) fn score_record(&self, terms: &[String], record: &ContentRecord) -> Option<f32> {
        let fields = self.weighted_fields(record);

        let matched = terms.iter().any(|term| {
            fields
                .iter()
                .any(|(text, _)| text.contains(term.as_str()))
        });
        if !matched {
            return None;
        }

        Some(
            fields
                .iter()
                .map(|(text, weight)| Self::score_field(terms, text, *weight))
                .sum(),
        )
    }

    fn to_result(&self, record: &ContentRecord, terms: &[String], score: f32) -> SearchResult {
        SearchResult {
            content_type: record.content_type(),
            id: record.id().to_string(),
            title: record.primary_text().to_string(),
            excerpt: build_excerpt(record.body_text(), terms, self.config.excerpt_length),
            category: record.category().to_string(),
            author: record.author().to_string(),
            created_at: record.created_at(),
            relevance_score: score,
        }
    }
}

/// Fold and join the fields of one weight class. Terms never contain
/// whitespace, so no term can match across the separator.
fn join_class(parts: &[&str]) -> String {
    let folded: Vec<String> = parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| fold(part))
        .collect();
    folded.join("\n")
}

/// Rank `records` against `query` with the default weights
pub fn search(query: &str, records: &[ContentRecord], limit: usize) -> Vec<SearchResult> {
    SearchEngine::default().search(query, records, limit)
}
