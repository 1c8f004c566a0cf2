//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and title. Link targets,
//! anchors and snippets follow as secondary context, either on the same line
//! after an arrow or on indented lines below. The output reads as a content
//! inventory that can still be traced back to URLs.
//!
//! # Output Format
//!
//! ## Tree
//!
//! ```text
//! 001 UPSC Notes → /upsc
//!     001 Polity → /upsc/polity
//!         001 Fundamental Rights → /upsc/polity/fundamental-rights *
//!     002 Economy → /upsc/economy
//! 002 Blog → https://blog.example.com
//! ```
//!
//! `*` marks the current page.
//!
//! ## TOC
//!
//! ```text
//! 001 Overview #overview
//! 002 Right to Equality #right-to-equality
//! 003 Previous Year Questions #previous-year-questions (supplementary)
//!
//! 3 headings, 2 fragments annotated
//! ```
//!
//! ## Search
//!
//! ```text
//! [success] polity
//! 001 Polity → /upsc/polity
//!     Part III of the Constitution...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::hierarchy::{NavState, TreeNode};
use crate::render::{NAV_LOAD_FAILED, SEARCH_FAILED};
use crate::search::{SearchSnapshot, SearchStatus};
use crate::toc::{TocExtraction, collapse_whitespace};
use crate::types::ResultItem;
use scraper::Html;

/// Snippet length in the CLI result listing.
const SNIPPET_CHARS: usize = 120;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Elements whose text is never shown to a reader.
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of an HTML fragment with entities decoded. Text nodes are
/// joined by a space so adjacent block elements don't glue words together.
fn html_text(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    doc.root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_TEXT_ELEMENTS.contains(&el.name()))
            });
            (!hidden).then_some(&**text)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain-text preview of an HTML snippet, at most `max_chars` characters
/// plus `...` when truncated.
pub(crate) fn plain_snippet(html: &str, max_chars: usize) -> String {
    let text = collapse_whitespace(&html_text(html));
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}

// ============================================================================
// Navigation tree
// ============================================================================

/// Format the navigation tree, one line per page, indented by depth.
/// Each line's index is the page's position among its siblings.
pub fn format_tree(roots: &[TreeNode], current_page_id: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<(&TreeNode, usize, usize)> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (node, 0, i + 1))
        .collect();
    while let Some((node, depth, pos)) = stack.pop() {
        let marker = if current_page_id == Some(node.page.id.as_str()) {
            " *"
        } else {
            ""
        };
        lines.push(format!(
            "{}{} {} → {}{}",
            indent(depth),
            format_index(pos),
            node.page.title,
            node.page.href(),
            marker
        ));
        stack.extend(
            node.children
                .iter()
                .enumerate()
                .rev()
                .map(|(i, child)| (child, depth + 1, i + 1)),
        );
    }
    lines
}

/// Format a navigation load outcome.
pub fn format_nav_state(state: &NavState, current_page_id: Option<&str>) -> Vec<String> {
    match state {
        NavState::Loaded(tree) => format_tree(tree, current_page_id),
        NavState::Empty => vec!["No pages".to_string()],
        NavState::Failed(err) => vec![NAV_LOAD_FAILED.to_string(), format!("    Error: {}", err)],
    }
}

pub fn print_tree(roots: &[TreeNode], current_page_id: Option<&str>) {
    for line in format_tree(roots, current_page_id) {
        println!("{}", line);
    }
}

pub fn print_nav_state(state: &NavState, current_page_id: Option<&str>) {
    for line in format_nav_state(state, current_page_id) {
        println!("{}", line);
    }
}

// ============================================================================
// Table of contents
// ============================================================================

/// Format extracted headings plus a summary line.
pub fn format_toc(extraction: &TocExtraction) -> Vec<String> {
    let mut lines = Vec::new();
    let listed = extraction.headings.iter().filter(|h| !h.text.is_empty());
    for (i, heading) in listed.enumerate() {
        let source = if heading.source_is_supplementary {
            " (supplementary)"
        } else {
            ""
        };
        lines.push(format!(
            "{} {} #{}{}",
            format_index(i + 1),
            heading.text,
            heading.id,
            source
        ));
    }

    let annotated = extraction.fragments.iter().filter(|f| f.modified).count();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{} {}, {} {} annotated",
        extraction.headings.len(),
        plural(extraction.headings.len(), "heading", "headings"),
        annotated,
        plural(annotated, "fragment", "fragments")
    ));
    lines
}

pub fn print_toc(extraction: &TocExtraction) {
    for line in format_toc(extraction) {
        println!("{}", line);
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

// ============================================================================
// Search
// ============================================================================

/// Format a result list: title and route, then an indented snippet.
pub fn format_results(items: &[ResultItem]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            item.display_title(),
            item.href()
        ));
        if let Some(content) = &item.content {
            let snippet = plain_snippet(content, SNIPPET_CHARS);
            if !snippet.is_empty() {
                lines.push(format!("{}{}", indent(1), snippet));
            }
        }
    }
    lines
}

/// Format a search snapshot: a status header, then results when present.
pub fn format_snapshot(snapshot: &SearchSnapshot) -> Vec<String> {
    let query = snapshot.query.trim();
    let mut lines = Vec::new();
    match &snapshot.status {
        SearchStatus::Idle => lines.push("[idle]".to_string()),
        SearchStatus::Pending => lines.push(format!("[pending] {}", query)),
        SearchStatus::Loading => lines.push(format!("[loading] {}", query)),
        SearchStatus::Success => {
            lines.push(format!("[success] {}", query));
            if snapshot.results.is_empty() {
                lines.push(format!("{}No results", indent(1)));
            }
        }
        SearchStatus::Failed(err) => {
            lines.push(format!("[failed] {}", query));
            lines.push(format!("{}{}", indent(1), SEARCH_FAILED));
            lines.push(format!("{}Error: {}", indent(1), err));
        }
    }
    lines.extend(format_results(&snapshot.results));
    lines
}

pub fn print_results(items: &[ResultItem]) {
    if items.is_empty() {
        println!("No results");
        return;
    }
    for line in format_results(items) {
        println!("{}", line);
    }
}

pub fn print_snapshot(snapshot: &SearchSnapshot) {
    for line in format_snapshot(snapshot) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_tree;
    use crate::test_helpers::load_fixture_pages;
    use crate::toc::extract_headings;
    use crate::types::{ContentFragment, PageNode};

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "    ");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn snippet_strips_tags_and_collapses_whitespace() {
        assert_eq!(
            plain_snippet("<p>Part <b>III</b>\n  of the</p><p>Constitution</p>", 100),
            "Part III of the Constitution"
        );
    }

    #[test]
    fn snippet_decodes_entities() {
        assert_eq!(plain_snippet("<p>Rights &amp; Duties</p>", 100), "Rights & Duties");
        assert_eq!(plain_snippet("a &lt; b > c", 100), "a < b > c");
    }

    #[test]
    fn snippet_skips_script_and_style() {
        assert_eq!(
            plain_snippet("<style>p { color: red }</style><p>Preamble</p><script>track()</script>", 100),
            "Preamble"
        );
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        assert_eq!(plain_snippet("अनुच्छेद चौदह", 4), "अनुच...");
        assert_eq!(plain_snippet("short", 5), "short");
        assert_eq!(plain_snippet("two words", 4), "two...");
    }

    // =========================================================================
    // Tree
    // =========================================================================

    #[test]
    fn long_parent_chain_prints_every_level() {
        let pages: Vec<PageNode> = (0..2_000)
            .map(|i| {
                let page = PageNode::new(&i.to_string(), "Level").with_slug(&format!("l{i}"));
                if i == 0 { page } else { page.with_parent(&(i - 1).to_string()) }
            })
            .collect();
        let lines = format_tree(&build_tree(&pages), Some("1999"));
        assert_eq!(lines.len(), 2_000);
        assert_eq!(lines[1999], format!("{}001 Level → /l1999 *", indent(1999)));
    }

    #[test]
    fn tree_lines_are_indexed_per_level() {
        let tree = build_tree(&[
            PageNode::new("1", "Polity").with_slug("polity"),
            PageNode::new("2", "Parliament").with_slug("polity/parliament").with_parent("1"),
            PageNode::new("3", "Economy").with_slug("economy"),
        ]);
        let lines = format_tree(&tree, Some("2"));
        assert_eq!(
            lines,
            vec![
                "001 Polity → /polity",
                "    001 Parliament → /polity/parliament *",
                "002 Economy → /economy",
            ]
        );
    }

    #[test]
    fn fixture_tree_shows_external_link_and_dangling_root() {
        let lines = format_tree(&build_tree(&load_fixture_pages()), None);
        assert_eq!(lines.len(), 7);
        assert!(lines.iter().any(|l| l.starts_with("002 Blog → https://")));
        assert!(lines.iter().any(|l| l.starts_with("003 Archived Syllabus")));
    }

    #[test]
    fn nav_state_failure_and_empty() {
        let failed = format_nav_state(&NavState::Failed("status 500".into()), None);
        assert_eq!(failed[0], NAV_LOAD_FAILED);
        assert_eq!(failed[1], "    Error: status 500");
        assert_eq!(format_nav_state(&NavState::Empty, None), vec!["No pages"]);
    }

    // =========================================================================
    // TOC
    // =========================================================================

    #[test]
    fn toc_lists_headings_with_summary() {
        let toc = extract_headings(&[
            ContentFragment::main("<h2>Overview</h2>"),
            ContentFragment::supplementary("<h2>Notes</h2>"),
        ]);
        let lines = format_toc(&toc);
        assert_eq!(lines[0], "001 Overview #overview");
        assert_eq!(lines[1], "002 Notes #notes (supplementary)");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "2 headings, 2 fragments annotated");
    }

    #[test]
    fn toc_without_headings_only_summarizes() {
        let toc = extract_headings(&[ContentFragment::main("<p>Nothing here</p>")]);
        assert_eq!(format_toc(&toc), vec!["0 headings, 0 fragments annotated"]);
    }

    // =========================================================================
    // Search
    // =========================================================================

    fn item(slug: &str, title: Option<&str>, content: Option<&str>) -> ResultItem {
        ResultItem {
            slug: slug.to_string(),
            title: title.map(str::to_string),
            content: content.map(str::to_string),
            image_url: None,
        }
    }

    #[test]
    fn results_fall_back_to_slug_title() {
        let lines = format_results(&[
            item("upsc/polity", Some("Polity"), Some("<p>Part III</p>")),
            item("blog/untitled", None, None),
        ]);
        assert_eq!(
            lines,
            vec![
                "001 Polity → /upsc/polity",
                "    Part III",
                "002 blog/untitled → /blog/untitled",
            ]
        );
    }

    #[test]
    fn snapshot_headers_follow_status() {
        let mut snapshot = SearchSnapshot {
            query: " polity ".into(),
            status: SearchStatus::Pending,
            results: vec![],
        };
        assert_eq!(format_snapshot(&snapshot), vec!["[pending] polity"]);

        snapshot.status = SearchStatus::Success;
        assert_eq!(format_snapshot(&snapshot), vec!["[success] polity", "    No results"]);

        snapshot.status = SearchStatus::Failed("timed out".into());
        let lines = format_snapshot(&snapshot);
        assert_eq!(lines[0], "[failed] polity");
        assert_eq!(lines[1], format!("    {}", SEARCH_FAILED));
        assert_eq!(lines[2], "    Error: timed out");

        assert_eq!(format_snapshot(&SearchSnapshot::default()), vec!["[idle]"]);
    }
}
