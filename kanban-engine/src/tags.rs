//! Tag normalization.
//!
//! Tags arrive either as a list or as the comma-separated string typed into
//! the task form. Stored tags are trimmed, non-empty and unique, in first-seen
//! order.

use std::collections::HashSet;

/// Normalize a list of tags: trim, drop empties, drop duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            result.push(trimmed.to_string());
        }
    }
    result
}

/// Parse the comma-separated tag string from a form field.
///
/// `"infra, urgent,,infra"` becomes `["infra", "urgent"]`.
pub fn format_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// Render stored tags back into the comma-separated form field value.
pub fn prefill_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// True when the tags are already in normalized form.
pub fn is_normalized(tags: &[String]) -> bool {
    normalize_tags(tags) == tags
}
