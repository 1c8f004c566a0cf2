//! Shared data shapes.
//!
//! `PageNode` and `ResultItem` mirror the content API's JSON and are decoded
//! as-is. `HeadingEntry` and `ContentFragment` are produced and consumed
//! locally by the TOC extractor and the renderers.

use serde::{Deserialize, Serialize};

/// A page record from `GET /page/navigation`.
///
/// The API returns these as a flat list; nesting is derived from `parent_id`
/// by [`crate::hierarchy::build_tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNode {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    /// Absolute URL that overrides `slug` when linking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Advisory depth from the API. Never used for layout: it may be stale
    /// or missing, the real depth comes from the parent chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl PageNode {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            slug: String::new(),
            link: None,
            parent_id: None,
            level: None,
        }
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    /// Link target: `link` if set, otherwise `slug` rooted at `/`.
    pub fn href(&self) -> String {
        if let Some(link) = self.link.as_deref().filter(|l| !l.is_empty()) {
            return link.to_string();
        }
        root_path(&self.slug)
    }
}

/// A single search hit. Only `slug` is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ResultItem {
    pub fn href(&self) -> String {
        root_path(&self.slug)
    }

    /// Title for display, falling back to the slug.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.slug)
    }
}

/// One `h2` pulled out of rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingEntry {
    /// Anchor id, unique within one extraction pass.
    pub id: String,
    pub text: String,
    pub level: u8,
    pub source_is_supplementary: bool,
}

/// An HTML source handed to the TOC extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFragment {
    pub content: String,
    #[serde(default)]
    pub is_supplementary: bool,
}

impl ContentFragment {
    pub fn main(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_supplementary: false,
        }
    }

    pub fn supplementary(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_supplementary: true,
        }
    }
}

fn root_path(slug: &str) -> String {
    if slug.starts_with('/') || slug.starts_with("http://") || slug.starts_with("https://") {
        slug.to_string()
    } else {
        format!("/{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_node_decodes_camel_case() {
        let json = r#"{"_id":"7","title":"Polity","slug":"upsc/polity","parentId":"1","level":2}"#;
        let node: PageNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, "7");
        assert_eq!(node.parent_id.as_deref(), Some("1"));
        assert_eq!(node.level, Some(2));
        assert_eq!(node.link, None);
    }

    #[test]
    fn page_node_null_parent_is_root() {
        let json = r#"{"id":"1","title":"A","slug":"a","parentId":null}"#;
        let node: PageNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.parent_id, None);
    }

    #[test]
    fn href_prefers_link_over_slug() {
        let mut node = PageNode::new("1", "A").with_slug("notes/a");
        assert_eq!(node.href(), "/notes/a");
        node.link = Some("https://example.com/a".to_string());
        assert_eq!(node.href(), "https://example.com/a");
    }

    #[test]
    fn href_keeps_rooted_slug() {
        let node = PageNode::new("1", "A").with_slug("/blog/a");
        assert_eq!(node.href(), "/blog/a");
    }

    #[test]
    fn result_item_display_title_falls_back_to_slug() {
        let item: ResultItem = serde_json::from_str(r#"{"slug":"x","title":"  "}"#).unwrap();
        assert_eq!(item.display_title(), "x");
        assert_eq!(item.href(), "/x");
    }

    #[test]
    fn result_item_reads_image_url() {
        let item: ResultItem =
            serde_json::from_str(r#"{"slug":"x","imageUrl":"https://cdn/x.png"}"#).unwrap();
        assert_eq!(item.image_url.as_deref(), Some("https://cdn/x.png"));
    }
}
