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

const ELLIPSIS: &str = "...";

/// Lowercase one char without changing the char count of the text
pub(crate) fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Char-for-char lowercase, so positions in the folded text map back to the
/// original
pub(crate) fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Cut an excerpt of at most `max_chars` characters out of `body`.
///
/// Starts at the beginning of the text unless the earliest term match ends
/// beyond that window, in which case the window is centered on the match.
/// `terms` must already be folded.
pub fn build_excerpt(body: &str, terms: &[String], max_chars: usize) -> String {
    let chars: Vec<char> = body.chars().collect();
    let total = chars.len();
    if max_chars == 0 || total <= max_chars {
        return body.trim().to_string();
    }

    let folded: Vec<char> = chars.iter().map(|c| fold_char(*c)).collect();
    let first_match = terms
        .iter()
        .filter_map(|term| {
            let needle: Vec<char> = term.chars().collect();
            find_chars(&folded, &needle).map(|pos| (pos, needle.len()))
        })
        .min();

    let start = match first_match {
        Some((pos, len)) if pos + len > max_chars => {
            let center = pos + len / 2;
            center.saturating_sub(max_chars / 2).min(total - max_chars)
        }
        _ => 0,
    };
    let end = (start + max_chars).min(total);

    let window: String = chars[start..end].iter().collect();
    let mut excerpt = String::with_capacity(window.len() + 2 * ELLIPSIS.len());
    if start > 0 {
        excerpt.push_str(ELLIPSIS);
        excerpt.push_str(window.trim_start());
    } else {
        excerpt.push_str(&window);
    }
    if end < total {
        let trimmed_len = excerpt.trim_end().len();
        excerpt.truncate(trimmed_len);
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}
