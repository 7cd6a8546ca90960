//! Sentinel-file message codec.
//!
//! The first line of the sentinel file is the title; everything after it is
//! an optional summary that keeps its original text, including the line
//! break that ends the title. Rendering is plain concatenation, so
//! `render(decode(s)) == s` for any content that survives trimming.

use crate::types::HaltMessage;

/// Title used when the sentinel file has no usable content.
pub const DEFAULT_TITLE: &str = "Merges halted";

/// Maximum description length accepted by the commit status API.
pub const STATUS_DESCRIPTION_LIMIT: usize = 140;

const ELLIPSIS: &str = "...";

/// Decodes sentinel-file content into a [`HaltMessage`].
pub fn decode(content: &str) -> HaltMessage {
    if content.trim().is_empty() {
        return default_message();
    }

    // A lone '\r' also ends the title.
    let first = content.split(['\n', '\r']).next().unwrap_or(content);
    let title = if first.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        first.to_string()
    };

    // Everything after the title, starting with the line break that ends it.
    let rest = &content[first.len()..];
    let summary = if rest.trim().is_empty() {
        None
    } else {
        Some(rest.to_string())
    };

    HaltMessage { title, summary }
}

fn default_message() -> HaltMessage {
    HaltMessage {
        title: DEFAULT_TITLE.to_string(),
        summary: None,
    }
}

/// Renders a message back to text: the title, then the summary verbatim.
pub fn render(message: &HaltMessage) -> String {
    match &message.summary {
        Some(summary) => format!("{}{}", message.title, summary),
        None => message.title.clone(),
    }
}

/// Renders the title for a commit status description, truncating to
/// [`STATUS_DESCRIPTION_LIMIT`] characters with a trailing `...`.
pub fn render_status_description(message: &HaltMessage) -> String {
    let title = &message.title;
    if title.chars().count() <= STATUS_DESCRIPTION_LIMIT {
        return title.clone();
    }
    let mut out: String = title
        .chars()
        .take(STATUS_DESCRIPTION_LIMIT - ELLIPSIS.len())
        .collect();
    out.push_str(ELLIPSIS);
    out
}

/// Whether the message carries the default title.
///
/// This compares by value: a sentinel file whose first line is literally
/// the default title is indistinguishable from an empty one.
pub fn is_default(message: &HaltMessage) -> bool {
    message.title == DEFAULT_TITLE
}
