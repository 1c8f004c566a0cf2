//! HTML rendering.
//!
//! Turns derived state (navigation rows, TOC entries, search snapshots) into
//! markup. Every function here is pure; the CLI decides where output goes.
//!
//! ## Components
//!
//! - **Navigation** (`nav.site-nav`): one `li` per [`NavEntry`], indented by
//!   derived depth, `current` on the page being viewed, `open` on its
//!   ancestors. A failed load draws a static placeholder; an empty tree draws
//!   nothing.
//! - **TOC** (`nav.toc`): links to `#<id>` anchors, `active` on the tracked
//!   heading. Carries the observer root margin and the click highlight
//!   duration as data attributes.
//! - **Search** (`section.search`): status line plus results.
//! - **Content page**: header, navigation, annotated article, TOC.
//!
//! Uses [maud](https://maud.lambda.xyz/), so all interpolated text is escaped.
//! Annotated article HTML is the only pre-escaped input.

use crate::config::TocConfig;
use crate::hierarchy::{NavEntry, NavState, TreeNode, ancestors_of, nav_entries};
use crate::output::plain_snippet;
use crate::search::{SearchSnapshot, SearchStatus};
use crate::toc::TocExtraction;
use crate::toc::tracking::observer_root_margin;
use crate::types::HeadingEntry;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS: &str = include_str!("../static/style.css");

/// Placeholder shown when the navigation could not be loaded.
pub const NAV_LOAD_FAILED: &str = "Failed to load navigation.";
/// Placeholder shown when a search request failed.
pub const SEARCH_FAILED: &str = "Failed to load results.";

/// Convert markdown source to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

// ============================================================================
// Document shell
// ============================================================================

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Fixed header with breadcrumb and the search form.
fn site_header(breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb { (breadcrumb) }
            form.search-form action="/search" method="get" role="search" {
                input type="search" name="query" placeholder="Search notes, blogs, current affairs";
            }
        }
    }
}

fn render_breadcrumb(tree: &[TreeNode], current_page_id: Option<&str>) -> Markup {
    let path = current_page_id
        .map(|id| ancestors_of(tree, id))
        .unwrap_or_default();
    html! {
        a href="/" { "Home" }
        @for node in &path {
            " › "
            a href=(node.page.href()) { (node.page.title) }
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Render navigation rows.
pub fn render_nav(entries: &[NavEntry]) -> Markup {
    html! {
        nav.site-nav aria-label="Pages" {
            ul {
                @for entry in entries {
                    (render_nav_entry(entry))
                }
            }
        }
    }
}

fn render_nav_entry(entry: &NavEntry) -> Markup {
    let class = match (entry.is_current, entry.is_open) {
        (true, _) => Some("current"),
        (false, true) => Some("open"),
        _ => None,
    };
    html! {
        li class=[class] data-depth=(entry.depth) style={ "padding-left: " (entry.indent_rem()) "rem" } {
            a href=(entry.href) aria-current=[entry.is_current.then_some("page")] { (entry.title) }
        }
    }
}

/// Render a navigation load outcome.
pub fn render_nav_state(state: &NavState, current_page_id: Option<&str>) -> Markup {
    match state {
        NavState::Loaded(tree) => render_nav(&nav_entries(tree, current_page_id)),
        NavState::Empty => html! {},
        NavState::Failed(_) => html! {
            nav.site-nav aria-label="Pages" {
                p.nav-error { (NAV_LOAD_FAILED) }
            }
        },
    }
}

// ============================================================================
// Table of contents
// ============================================================================

/// Render the TOC. Headings with no text keep their anchor but get no entry.
pub fn render_toc(headings: &[HeadingEntry], active: Option<&str>, settings: &TocConfig) -> Markup {
    html! {
        @if headings.iter().any(|h| !h.text.is_empty()) {
            nav.toc aria-label="On this page"
                data-root-margin=(observer_root_margin(settings.header_offset))
                data-highlight-ms=(settings.highlight_ms) {
                ul {
                    @for heading in headings.iter().filter(|h| !h.text.is_empty()) {
                        li class=[toc_item_class(heading, active)] {
                            a href={ "#" (heading.id) } { (heading.text) }
                        }
                    }
                }
            }
        }
    }
}

fn toc_item_class(heading: &HeadingEntry, active: Option<&str>) -> Option<String> {
    let mut classes = Vec::new();
    if active == Some(heading.id.as_str()) {
        classes.push("active");
    }
    if heading.source_is_supplementary {
        classes.push("supplementary");
    }
    (!classes.is_empty()).then(|| classes.join(" "))
}

// ============================================================================
// Search
// ============================================================================

/// Status line for the search surface: `(css class, text)`.
fn search_status_line(snapshot: &SearchSnapshot) -> Option<(&'static str, String)> {
    match &snapshot.status {
        SearchStatus::Idle => None,
        SearchStatus::Pending | SearchStatus::Loading => {
            Some(("search-status", "Searching…".to_string()))
        }
        SearchStatus::Failed(_) => Some(("search-error", SEARCH_FAILED.to_string())),
        SearchStatus::Success if snapshot.results.is_empty() => Some((
            "search-status",
            format!("No results for “{}”.", snapshot.query.trim()),
        )),
        SearchStatus::Success => None,
    }
}

pub fn render_search(snapshot: &SearchSnapshot) -> Markup {
    html! {
        section.search aria-live="polite" {
            @if let Some((class, text)) = search_status_line(snapshot) {
                p class=(class) { (text) }
            }
            @if !snapshot.results.is_empty() {
                ul.search-results {
                    @for item in &snapshot.results {
                        li {
                            @if let Some(image) = &item.image_url {
                                img src=(image) alt="" loading="lazy";
                            }
                            div {
                                a href=(item.href()) { (item.display_title()) }
                                @if let Some(content) = &item.content {
                                    p.search-snippet { (plain_snippet(content, 160)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Content page
// ============================================================================

/// Everything needed to render one content page.
pub struct PageView<'a> {
    pub title: &'a str,
    pub nav: &'a NavState,
    pub current_page_id: Option<&'a str>,
    pub toc: &'a TocExtraction,
    pub active_heading: Option<&'a str>,
    pub toc_settings: &'a TocConfig,
}

/// Full page: header, navigation, annotated article, TOC.
pub fn render_page(view: &PageView<'_>) -> Markup {
    let content = html! {
        (site_header(render_breadcrumb(view.nav.tree(), view.current_page_id)))
        div.layout {
            aside.sidebar { (render_nav_state(view.nav, view.current_page_id)) }
            article {
                @for fragment in &view.toc.fragments {
                    @if fragment.is_supplementary {
                        section.supplementary { (PreEscaped(&fragment.content)) }
                    } @else {
                        (PreEscaped(&fragment.content))
                    }
                }
            }
            aside.toc-column { (render_toc(&view.toc.headings, view.active_heading, view.toc_settings)) }
        }
    };
    base_document(view.title, content)
}
