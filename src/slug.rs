//! Anchor id generation for headings.
//!
//! Heading text becomes a URL fragment through [`slugify`]:
//!
//! - `"Right to Equality (Art. 14–18)"` → `"right-to-equality-art-1418"`
//! - `"  Overview  "` → `"overview"`
//! - `"?!"` → `""` (caller falls back to a positional id)
//!
//! Letters and digits outside ASCII are kept, so Devanagari headings produce
//! readable anchors instead of collapsing to fallbacks.

/// Slugify free text: lowercase, drop punctuation, whitespace runs become a
/// single hyphen, no leading or trailing hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
        // anything else is punctuation and vanishes without separating words
    }
    slug
}

/// Positional id used when a heading's slug is empty or already taken.
///
/// Main content uses the `heading` prefix; supplementary content uses its
/// configured prefix so the two sources never share a namespace.
pub fn fallback_id(prefix: &str, fragment_index: usize, heading_index: usize) -> String {
    format!("{prefix}-{fragment_index}-{heading_index}")
}

/// True if `s` would survive [`slugify`] unchanged and is non-empty.
pub fn is_slug(s: &str) -> bool {
    !s.is_empty() && slugify(s) == s
}
