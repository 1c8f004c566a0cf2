//! TOC click resolution.
//!
//! A click on a TOC entry never performs the browser's default anchor jump.
//! Instead [`Navigator::navigate`] resolves the target heading in the
//! rendered page and returns a [`NavigationAction`]: where to smooth-scroll
//! (offset by the fixed header), which fragment to write into the URL with
//! a history replace, and which element to highlight.
//!
//! Lookup is by id first. Content that was re-rendered by something that
//! stripped the ids is still reachable through a text match on the heading.
//! When both miss the click does nothing.

use crate::config::TocConfig;
use crate::toc::collapse_whitespace;
use crate::types::HeadingEntry;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::debug;

static ANY_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("static selector is valid")
});

/// A heading as it exists in the rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedHeading {
    pub id: Option<String>,
    pub text: String,
    /// Offset from the top of the document, in pixels.
    pub top: f64,
}

/// Lookup table over the headings of a rendered page.
#[derive(Debug, Clone, Default)]
pub struct HeadingIndex {
    headings: Vec<RenderedHeading>,
}

impl HeadingIndex {
    pub fn new(headings: Vec<RenderedHeading>) -> Self {
        Self { headings }
    }

    /// Index every heading of an HTML document or fragment.
    ///
    /// Layout is unknown here, so `top` is 0 until [`set_top`](Self::set_top)
    /// records a measured offset.
    pub fn from_html(html: &str) -> Self {
        let doc = Html::parse_fragment(html);
        let headings = doc
            .select(&ANY_HEADING)
            .map(|el| RenderedHeading {
                id: el.value().id().map(str::to_string),
                text: collapse_whitespace(&el.text().collect::<String>()),
                top: 0.0,
            })
            .collect();
        Self { headings }
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Record the measured offset of the heading with `id`.
    pub fn set_top(&mut self, id: &str, top: f64) {
        if let Some(h) = self.headings.iter_mut().find(|h| h.id.as_deref() == Some(id)) {
            h.top = top;
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&RenderedHeading> {
        self.headings.iter().find(|h| h.id.as_deref() == Some(id))
    }

    pub fn by_text(&self, text: &str) -> Option<&RenderedHeading> {
        let wanted = collapse_whitespace(text);
        if wanted.is_empty() {
            return None;
        }
        self.headings.iter().find(|h| h.text == wanted)
    }
}

/// How the URL fragment is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Replace,
    Push,
}

/// What the page should do in response to a TOC click.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationAction {
    pub target_id: String,
    /// Scroll position: element top minus header offset, never negative.
    pub scroll_top: f64,
    /// `#<id>` for the address bar.
    pub fragment: String,
    pub history: HistoryMode,
    /// True when the target was found by text because its id was missing.
    pub matched_by_text: bool,
}

#[derive(Debug, Clone)]
struct Highlight {
    id: String,
    until: Instant,
}

/// Resolves TOC clicks and owns the transient target highlight.
#[derive(Debug, Clone)]
pub struct Navigator {
    header_offset: f64,
    highlight_for: Duration,
    highlight: Option<Highlight>,
}

impl Navigator {
    pub fn new(header_offset: u32, highlight_for: Duration) -> Self {
        Self {
            header_offset: f64::from(header_offset),
            highlight_for,
            highlight: None,
        }
    }

    /// Header offset and highlight duration from the `[toc]` config section.
    pub fn from_config(config: &TocConfig) -> Self {
        Self::new(config.header_offset, config.highlight())
    }

    pub fn navigate(
        &mut self,
        entry: &HeadingEntry,
        index: &HeadingIndex,
        now: Instant,
    ) -> Option<NavigationAction> {
        let (target, matched_by_text) = match index.by_id(&entry.id) {
            Some(h) => (h, false),
            None => (index.by_text(&entry.text)?, true),
        };
        let target_id = target.id.clone().unwrap_or_else(|| entry.id.clone());
        debug!(target = %target_id, matched_by_text, "resolved toc click");

        // Starting a new highlight drops the previous one.
        self.highlight = Some(Highlight {
            id: target_id.clone(),
            until: now + self.highlight_for,
        });

        Some(NavigationAction {
            scroll_top: (target.top - self.header_offset).max(0.0),
            fragment: format!("#{target_id}"),
            target_id,
            history: HistoryMode::Replace,
            matched_by_text,
        })
    }

    /// The highlighted element id at `now`. Expired highlights clear themselves.
    pub fn highlighted(&mut self, now: Instant) -> Option<&str> {
        if self.highlight.as_ref().is_some_and(|h| now >= h.until) {
            self.highlight = None;
        }
        self.highlight.as_ref().map(|h| h.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str) -> HeadingEntry {
        HeadingEntry {
            id: id.to_string(),
            text: text.to_string(),
            level: 2,
            source_is_supplementary: false,
        }
    }

    fn navigator() -> Navigator {
        Navigator::new(80, Duration::from_millis(2000))
    }

    #[test]
    fn resolves_by_id_with_header_offset() {
        let mut index = HeadingIndex::from_html(r#"<h2 id="overview">Overview</h2>"#);
        index.set_top("overview", 500.0);
        let action = navigator()
            .navigate(&entry("overview", "Overview"), &index, Instant::now())
            .unwrap();
        assert_eq!(action.target_id, "overview");
        assert_eq!(action.scroll_top, 420.0);
        assert_eq!(action.fragment, "#overview");
        assert_eq!(action.history, HistoryMode::Replace);
        assert!(!action.matched_by_text);
    }

    #[test]
    fn scroll_top_is_clamped_at_zero() {
        let index = HeadingIndex::from_html(r#"<h2 id="a">A</h2>"#);
        let action = navigator().navigate(&entry("a", "A"), &index, Instant::now()).unwrap();
        assert_eq!(action.scroll_top, 0.0);
    }

    #[test]
    fn falls_back_to_text_when_id_was_stripped() {
        let index = HeadingIndex::from_html("<h2>Right to  <b>Freedom</b></h2>");
        let action = navigator()
            .navigate(&entry("right-to-freedom", "Right to Freedom"), &index, Instant::now())
            .unwrap();
        assert!(action.matched_by_text);
        assert_eq!(action.fragment, "#right-to-freedom");
    }

    #[test]
    fn miss_is_a_no_op() {
        let index = HeadingIndex::from_html("<h2>Something else</h2>");
        let mut nav = navigator();
        let now = Instant::now();
        assert!(nav.navigate(&entry("gone", "Gone"), &index, now).is_none());
        assert_eq!(nav.highlighted(now), None);
    }

    #[test]
    fn highlight_expires() {
        let index = HeadingIndex::from_html(r#"<h2 id="a">A</h2>"#);
        let mut nav = navigator();
        let start = Instant::now();
        nav.navigate(&entry("a", "A"), &index, start);
        assert_eq!(nav.highlighted(start + Duration::from_millis(1999)), Some("a"));
        assert_eq!(nav.highlighted(start + Duration::from_millis(2000)), None);
    }

    #[test]
    fn config_sets_offset_and_highlight() {
        let config = TocConfig {
            header_offset: 100,
            highlight_ms: 500,
            ..TocConfig::default()
        };
        let mut index = HeadingIndex::from_html(r#"<h2 id="a">A</h2>"#);
        index.set_top("a", 300.0);
        let mut nav = Navigator::from_config(&config);
        let start = Instant::now();
        let action = nav.navigate(&entry("a", "A"), &index, start).unwrap();
        assert_eq!(action.scroll_top, 200.0);
        assert_eq!(nav.highlighted(start + Duration::from_millis(499)), Some("a"));
        assert_eq!(nav.highlighted(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn newer_click_supersedes_highlight() {
        let index = HeadingIndex::from_html(r#"<h2 id="a">A</h2><h2 id="b">B</h2>"#);
        let mut nav = navigator();
        let start = Instant::now();
        nav.navigate(&entry("a", "A"), &index, start);
        let later = start + Duration::from_millis(1500);
        nav.navigate(&entry("b", "B"), &index, later);
        assert_eq!(nav.highlighted(start + Duration::from_millis(2500)), Some("b"));
        assert_eq!(nav.highlighted(later + Duration::from_millis(2000)), None);
    }

    #[test]
    fn index_covers_all_heading_levels() {
        let index = HeadingIndex::from_html("<h1>T</h1><h2>A</h2><h4 id=\"d\">D</h4><p>x</p>");
        assert_eq!(index.len(), 3);
        assert!(index.by_id("d").is_some());
        assert!(index.by_text("  ").is_none());
    }
}
