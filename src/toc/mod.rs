//! Table-of-contents extraction.
//!
//! Content arrives from the API as HTML strings: the article body plus any
//! supplementary blocks (revision notes, previous-year questions). The TOC
//! is built from their second-level headings only. `h1` is the page title
//! and anything deeper would make the sidebar too long to scan.
//!
//! Extraction is a pure function from HTML to `(annotated HTML, entries)`.
//! Each selected heading gets an `id` attribute matching its TOC entry, and
//! callers render the annotated HTML so the visible headings and the TOC
//! links always agree:
//!
//! ```text
//! <h2>Overview</h2>          →  <h2 id="overview">Overview</h2>
//! <h2>Overview</h2>          →  <h2 id="heading-0-1">Overview</h2>
//! <h2>?!</h2>                →  <h2 id="heading-0-2">?!</h2>
//! ```
//!
//! An id that some other element on the page already carries is never handed
//! to a heading; that heading takes the fallback instead.
//!
//! A fragment is only re-serialized when an id actually changed. Otherwise
//! the caller's original string is handed back untouched.
//!
//! The submodules cover what happens after rendering: [`tracking`] follows
//! which heading is on screen, [`navigate`] resolves TOC clicks to scroll
//! targets.

pub mod navigate;
mod serialize;
pub mod tracking;

use crate::slug::{fallback_id, slugify};
use crate::types::{ContentFragment, HeadingEntry};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Prefix for fallback ids of headings in main content.
pub const MAIN_FALLBACK_PREFIX: &str = "heading";

/// Default prefix for fallback ids of headings in supplementary content.
pub const DEFAULT_SUPPLEMENTARY_PREFIX: &str = "supplementary";

static TOC_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("static selector is valid"));

static WITH_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[id]").expect("static selector is valid"));

/// A fragment after annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedFragment {
    /// HTML to render. Identical to the input when `modified` is false.
    pub content: String,
    pub is_supplementary: bool,
    /// True if any heading id was added or rewritten.
    pub modified: bool,
}

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TocExtraction {
    pub fragments: Vec<AnnotatedFragment>,
    pub headings: Vec<HeadingEntry>,
}

impl TocExtraction {
    /// All annotated fragments concatenated in order.
    pub fn combined_html(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Heading extractor with a configurable supplementary id prefix.
#[derive(Debug, Clone)]
pub struct HeadingExtractor {
    supplementary_prefix: String,
}

impl Default for HeadingExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPLEMENTARY_PREFIX)
    }
}

impl HeadingExtractor {
    pub fn new(supplementary_prefix: &str) -> Self {
        Self {
            supplementary_prefix: supplementary_prefix.to_string(),
        }
    }

    pub fn extract(&self, fragments: &[ContentFragment]) -> TocExtraction {
        let docs: Vec<Html> = fragments
            .iter()
            .map(|f| Html::parse_fragment(&f.content))
            .collect();
        let mut used = reserved_ids(&docs);
        let mut extraction = TocExtraction::default();

        for (fragment_index, (fragment, doc)) in fragments.iter().zip(&docs).enumerate() {
            let prefix = if fragment.is_supplementary {
                self.supplementary_prefix.as_str()
            } else {
                MAIN_FALLBACK_PREFIX
            };
            let mut ids = Vec::new();
            let mut modified = false;

            for (heading_index, element) in doc.select(&TOC_HEADING).enumerate() {
                let text = collapse_whitespace(&element.text().collect::<String>());
                let candidate = slugify(&text);
                let id = if candidate.is_empty() || used.contains(&candidate) {
                    unique_fallback(prefix, fragment_index, heading_index, &used)
                } else {
                    candidate
                };
                used.insert(id.clone());

                if element.value().attr("id") != Some(id.as_str()) {
                    modified = true;
                }
                extraction.headings.push(HeadingEntry {
                    id: id.clone(),
                    text,
                    level: 2,
                    source_is_supplementary: fragment.is_supplementary,
                });
                ids.push(id);
            }

            let content = if modified {
                serialize::fragment_with_heading_ids(doc, &ids)
            } else {
                fragment.content.clone()
            };
            debug!(
                fragment_index,
                headings = ids.len(),
                modified,
                "extracted headings from fragment"
            );
            extraction.fragments.push(AnnotatedFragment {
                content,
                is_supplementary: fragment.is_supplementary,
                modified,
            });
        }

        extraction
    }
}

/// Extract with the default supplementary prefix.
pub fn extract_headings(fragments: &[ContentFragment]) -> TocExtraction {
    HeadingExtractor::default().extract(fragments)
}

/// Ids already carried by non-heading elements anywhere on the page. Heading
/// ids are excluded because every `h2` is re-assigned.
fn reserved_ids(docs: &[Html]) -> HashSet<String> {
    docs.iter()
        .flat_map(|doc| doc.select(&WITH_ID))
        .filter(|el| el.value().name() != "h2")
        .filter_map(|el| el.value().id())
        .map(str::to_string)
        .collect()
}

fn unique_fallback(
    prefix: &str,
    fragment_index: usize,
    heading_index: usize,
    used: &HashSet<String>,
) -> String {
    let base = fallback_id(prefix, fragment_index, heading_index);
    if !used.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|id| !used.contains(id))
        .unwrap_or(base)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
