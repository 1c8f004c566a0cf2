//! Fingerprint cache for TOC extraction.
//!
//! Extraction reparses every fragment, and a page re-renders far more often
//! than its content changes. A [`TocCache`] remembers the last extraction
//! together with a fingerprint of the input and hands it back while the
//! input is unchanged.
//!
//! # Design
//!
//! The cache belongs to one component instance (one rendered page). It is
//! not shared and holds a single entry: a new fingerprint replaces the old
//! extraction wholesale. Nothing is mutated in place.
//!
//! ## Fingerprint
//!
//! SHA-256 over each fragment's supplementary flag, byte length, and content,
//! plus the extractor's supplementary prefix, since the prefix changes the
//! fallback ids. Lengths are included so that moving text from one fragment
//! to the next changes the digest.

use crate::toc::{HeadingExtractor, TocExtraction};
use crate::types::ContentFragment;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

/// SHA-256 fingerprint of a fragment list, as a hex string.
pub fn fingerprint(fragments: &[ContentFragment], supplementary_prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"toc\0");
    hasher.update(supplementary_prefix.as_bytes());
    hasher.update(b"\0");
    for fragment in fragments {
        hasher.update([u8::from(fragment.is_supplementary)]);
        hasher.update((fragment.content.len() as u64).to_le_bytes());
        hasher.update(fragment.content.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Single-entry extraction cache owned by one page instance.
#[derive(Debug)]
pub struct TocCache {
    extractor: HeadingExtractor,
    supplementary_prefix: String,
    entry: Option<(String, Arc<TocExtraction>)>,
    hits: u64,
    misses: u64,
}

impl TocCache {
    pub fn new(supplementary_prefix: &str) -> Self {
        Self {
            extractor: HeadingExtractor::new(supplementary_prefix),
            supplementary_prefix: supplementary_prefix.to_string(),
            entry: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached extraction for these fragments, extracting on a miss.
    pub fn get_or_extract(&mut self, fragments: &[ContentFragment]) -> Arc<TocExtraction> {
        let key = fingerprint(fragments, &self.supplementary_prefix);
        if let Some((cached_key, extraction)) = &self.entry
            && *cached_key == key
        {
            self.hits += 1;
            return Arc::clone(extraction);
        }

        self.misses += 1;
        debug!(fingerprint = %key, "toc cache miss, extracting");
        let extraction = Arc::new(self.extractor.extract(fragments));
        self.entry = Some((key, Arc::clone(&extraction)));
        extraction
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl Default for TocCache {
    fn default() -> Self {
        Self::new(crate::toc::DEFAULT_SUPPLEMENTARY_PREFIX)
    }
}
