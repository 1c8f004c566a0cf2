//! # Content Nav
//!
//! Reader-facing navigation for a content site whose pages and search index
//! live behind a REST API. Three components, each usable on its own:
//!
//! ```text
//! 1. Hierarchy   flat PageNode[]     →  TreeNode forest   →  nav rows
//! 2. TOC         HTML fragments      →  annotated HTML + HeadingEntry[]
//! 3. Search      input changes       →  one request in flight → snapshots
//! ```
//!
//! The API itself is out of scope; [`api::ContentApi`] is the seam, with a
//! reqwest implementation for the real thing and in-memory stand-ins in
//! tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared data shapes: `PageNode`, `ResultItem`, `HeadingEntry`, `ContentFragment` |
//! | [`hierarchy`] | Flat list → tree, ancestor paths, render-ready nav rows, load outcome |
//! | [`slug`] | Heading text → anchor id, positional fallback ids |
//! | [`toc`] | Heading extraction and id injection, active-heading tracking, click-to-navigate |
//! | [`cache`] | Fingerprint-keyed extraction cache owned by one page |
//! | [`api`] | `ContentApi` trait, HTTP client, search response normalization |
//! | [`search`] | Debounced, cancellable search state machine |
//! | [`render`] | Static HTML for navigation, TOC, search and full pages using Maud |
//! | [`output`] | CLI text formatting |
//! | [`config`] | `content-nav.toml` loading, validation and stock defaults |
//!
//! # Design Decisions
//!
//! ## Derived Depth
//!
//! Pages carry an advisory `level` from the API. It is ignored: depth is
//! always the distance from a root in the tree built from `parentId` links,
//! so a stale `level` cannot misplace a page. Pages whose parent is missing
//! become roots rather than disappearing.
//!
//! ## Pure Extraction, Explicit Cache
//!
//! Heading extraction is a pure function from fragments to annotated HTML
//! plus entries. Memoization is a separate [`cache::TocCache`] keyed by a
//! SHA-256 fingerprint of the input, owned by whoever renders the page.
//!
//! ## Newest Request Wins
//!
//! The search controller owns exactly one debounce timer and one
//! cancellation token. Responses are committed only when their request id
//! is still the active one, so a slow stale response can never overwrite a
//! newer result.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Interpolation is
//! escaped by default; the annotated article HTML is the only pre-escaped
//! input.

pub mod api;
pub mod cache;
pub mod config;
pub mod hierarchy;
pub mod output;
pub mod render;
pub mod search;
pub mod slug;
pub mod toc;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
