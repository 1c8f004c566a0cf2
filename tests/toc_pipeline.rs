//! Article content through extraction, caching, tracking, click navigation
//! and page rendering.

use content_nav::api::Envelope;
use content_nav::cache::TocCache;
use content_nav::config::TocConfig;
use content_nav::hierarchy::NavState;
use content_nav::render::{PageView, render_page};
use content_nav::toc::navigate::{HeadingIndex, HistoryMode, Navigator};
use content_nav::toc::tracking::{ActiveHeadingTracker, Observation};
use content_nav::types::{ContentFragment, HeadingEntry, PageNode};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

fn article_with_notes() -> Vec<ContentFragment> {
    vec![
        ContentFragment::main(fixture("article.html")),
        ContentFragment::supplementary(fixture("notes.html")),
    ]
}

fn entry<'a>(headings: &'a [HeadingEntry], id: &str) -> &'a HeadingEntry {
    headings
        .iter()
        .find(|h| h.id == id)
        .unwrap_or_else(|| panic!("no heading with id {id:?}"))
}

#[test]
fn article_and_notes_get_stable_unique_ids() {
    let mut cache = TocCache::default();
    let toc = cache.get_or_extract(&article_with_notes());

    let ids: Vec<&str> = toc.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "overview",
            "right-to-equality-art-1418",
            "heading-0-2",
            "heading-0-3",
            "right-to-freedom",
            "previous-year-questions",
            "supplementary-1-1",
        ]
    );
    assert_eq!(toc.headings[3].text, "");
    assert!(toc.headings[5].source_is_supplementary);
    assert!(toc.fragments.iter().all(|f| f.modified));

    // Re-rendering the same content reuses the extraction.
    let again = cache.get_or_extract(&article_with_notes());
    assert_eq!(again.headings, toc.headings);
    assert_eq!(cache.stats(), (1, 1));
}

#[test]
fn tracker_follows_observations_and_survives_content_updates() {
    let mut cache = TocCache::default();
    let toc = cache.get_or_extract(&article_with_notes());
    let mut tracker = ActiveHeadingTracker::new(&toc.headings);

    let active = tracker.observe(&[
        Observation::leaving("overview"),
        Observation::entering("right-to-freedom"),
        Observation::entering("not-on-this-page"),
    ]);
    assert_eq!(active, Some("right-to-freedom"));

    // Editor removes the freedom section; the reset hook runs once the new
    // content is committed.
    let edited = vec![ContentFragment::main(
        "<h2>Overview</h2><p>Trimmed.</p><h2>Right to Equality</h2>",
    )];
    let updated = cache.get_or_extract(&edited);
    tracker.reset(&updated.headings);
    assert_eq!(tracker.active(), None);

    tracker.observe(&[Observation::entering("right-to-equality")]);
    assert_eq!(tracker.active(), Some("right-to-equality"));
}

#[test]
fn click_scrolls_below_header_and_highlights_briefly() {
    let toc = TocCache::default().get_or_extract(&article_with_notes());
    let mut index = HeadingIndex::from_html(&toc.combined_html());
    index.set_top("right-to-freedom", 1200.0);

    let settings = TocConfig {
        header_offset: 64,
        highlight_ms: 1200,
        ..TocConfig::default()
    };
    let mut navigator = Navigator::from_config(&settings);
    let now = Instant::now();
    let action = navigator
        .navigate(entry(&toc.headings, "right-to-freedom"), &index, now)
        .expect("annotated heading is found by id");

    assert_eq!(action.target_id, "right-to-freedom");
    assert_eq!(action.scroll_top, 1136.0);
    assert_eq!(action.fragment, "#right-to-freedom");
    assert_eq!(action.history, HistoryMode::Replace);
    assert!(!action.matched_by_text);

    assert_eq!(
        navigator.highlighted(now + Duration::from_millis(1199)),
        Some("right-to-freedom")
    );
    assert_eq!(navigator.highlighted(now + Duration::from_millis(1200)), None);
}

#[test]
fn click_falls_back_to_text_when_ids_were_stripped() {
    let toc = TocCache::default().get_or_extract(&article_with_notes());
    // The page shows the original markup: no ids at all.
    let index = HeadingIndex::from_html(&fixture("article.html"));

    let mut navigator = Navigator::from_config(&TocConfig::default());
    let action = navigator
        .navigate(entry(&toc.headings, "right-to-freedom"), &index, Instant::now())
        .expect("heading is found by its text");
    assert!(action.matched_by_text);
    assert_eq!(action.target_id, "right-to-freedom");
    assert_eq!(action.scroll_top, 0.0);

    let missing = HeadingEntry {
        id: "gone".to_string(),
        text: "Removed Section".to_string(),
        level: 2,
        source_is_supplementary: false,
    };
    assert_eq!(navigator.navigate(&missing, &index, Instant::now()), None);
}

#[test]
fn rendered_page_links_toc_to_anchors() {
    let pages: Envelope<Vec<PageNode>> = serde_json::from_str(&fixture("pages.json")).unwrap();
    let nav = NavState::from_pages(&pages.data);
    let toc = TocCache::default().get_or_extract(&article_with_notes());
    let mut tracker = ActiveHeadingTracker::new(&toc.headings);
    tracker.set_active("previous-year-questions");
    let settings = TocConfig {
        highlight_ms: 1500,
        ..TocConfig::default()
    };

    let html = render_page(&PageView {
        title: "Fundamental Rights",
        nav: &nav,
        current_page_id: Some("4"),
        toc: &toc,
        active_heading: tracker.active(),
        toc_settings: &settings,
    })
    .into_string();

    for heading in toc.headings.iter().filter(|h| !h.text.is_empty()) {
        assert!(html.contains(&format!(r#"id="{}""#, heading.id)), "anchor {}", heading.id);
        assert!(html.contains(&format!(r##"href="#{}""##, heading.id)), "link {}", heading.id);
    }
    // The blank heading keeps its anchor but has no TOC link.
    assert!(html.contains(r#"id="heading-0-3""#));
    assert!(!html.contains(r##"href="#heading-0-3""##));

    assert!(html.contains(r#"data-highlight-ms="1500""#));
    assert!(html.contains(r#"class="active supplementary""#));
    assert!(html.contains(r#"class="current""#));
    assert!(html.contains(r#"<section class="supplementary">"#));
    assert!(html.contains(
        r#"<a href="/upsc-notes/polity">Polity</a> › <a href="/upsc-notes/polity/fundamental-rights">Fundamental Rights</a>"#
    ));
}
