//! Keyword heuristics for saved messages.
//!
//! Two passes run over every message at save time: action-item
//! extraction (sentence-ish segments that look like commitments) and
//! auto-tagging (a fixed keyword-to-tag table). Both are pure substring
//! matching; false positives like "I will be late" are expected and
//! accepted.

/// Keywords that mark a segment as a candidate action item.
const ACTION_KEYWORDS: &[&str] = &[
    "need to", "should", "must", "have to", "will", "going to", "plan to", "todo", "task",
];

/// At most this many action items per message.
const MAX_ACTION_ITEMS: usize = 3;

/// Keyword-to-tag table, applied in order.
const TAG_RULES: &[(&str, &[&str])] = &[
    ("urgent", &["urgent", "asap", "immediately"]),
    ("deadline", &["deadline", "due", "timeline"]),
    ("meeting", &["meeting", "call", "zoom"]),
    ("bug", &["bug", "error", "broken", "fix"]),
    ("idea", &["idea", "concept", "brainstorm"]),
];

/// At most this many auto-derived tags per message.
const MAX_AUTO_TAGS: usize = 5;

/// Extracts up to 3 candidate action items from free text.
///
/// The text is split into segments on `.`; a segment qualifies if it
/// contains any of the action keywords, case-insensitive. Matching
/// segments are returned trimmed, in their original order.
pub fn extract_action_items(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|segment| {
            let lower = segment.to_lowercase();
            ACTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .take(MAX_ACTION_ITEMS)
        .map(String::from)
        .collect()
}

/// Derives tags from free text using the fixed keyword table.
///
/// Returns all matching tags in rule order, capped at 5.
pub fn auto_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TAG_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .take(MAX_AUTO_TAGS)
        .map(|(tag, _)| (*tag).to_string())
        .collect()
}

/// Merges caller-supplied tags into a base set.
///
/// Deduplication is case-insensitive; the first spelling seen wins.
/// Base tags keep their position, extras are appended in order.
pub fn merge_tags(base: Vec<String>, extra: &[String]) -> Vec<String> {
    let mut merged = base;
    for tag in extra {
        if !merged.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            merged.push(tag.clone());
        }
    }
    merged
}
