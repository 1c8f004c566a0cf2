//! Active heading tracking.
//!
//! The page observes heading visibility with a viewport-relative observer
//! whose root margin shrinks the viewport to a band just below the fixed
//! header. Each batch of observer callbacks is fed to
//! [`ActiveHeadingTracker::observe`]; the last heading reported as entering
//! the band becomes active.
//!
//! Observations can mention headings the tracker does not know about, for
//! example headings inside a collapsed section that were never extracted, or
//! stale callbacks arriving after the content changed. Those are ignored.

use crate::types::HeadingEntry;
use std::collections::HashSet;

/// One visibility report for a heading element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub id: String,
    pub is_intersecting: bool,
}

impl Observation {
    pub fn entering(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_intersecting: true,
        }
    }

    pub fn leaving(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_intersecting: false,
        }
    }
}

/// Observer root margin for a header of `header_offset` pixels: the band
/// starts under the header and ends at 20% of the viewport height.
pub fn observer_root_margin(header_offset: u32) -> String {
    format!("-{header_offset}px 0px -80% 0px")
}

#[derive(Debug, Clone, Default)]
pub struct ActiveHeadingTracker {
    known: HashSet<String>,
    active: Option<String>,
}

impl ActiveHeadingTracker {
    pub fn new(headings: &[HeadingEntry]) -> Self {
        let mut tracker = Self::default();
        tracker.reset(headings);
        tracker
    }

    /// Re-sync with freshly extracted headings once new content has been
    /// committed to the page.
    ///
    /// Keeps the active heading if it still exists.
    pub fn reset(&mut self, headings: &[HeadingEntry]) {
        self.known = headings.iter().map(|h| h.id.clone()).collect();
        if self.active.as_ref().is_some_and(|id| !self.known.contains(id)) {
            self.active = None;
        }
    }

    /// Apply a batch of observations in delivery order.
    pub fn observe(&mut self, observations: &[Observation]) -> Option<&str> {
        for obs in observations {
            if obs.is_intersecting && self.known.contains(&obs.id) {
                self.active = Some(obs.id.clone());
            }
        }
        self.active()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Force the active heading, e.g. right after a TOC click. Unknown ids
    /// are ignored.
    pub fn set_active(&mut self, id: &str) {
        if self.known.contains(id) {
            self.active = Some(id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(ids: &[&str]) -> Vec<HeadingEntry> {
        ids.iter()
            .map(|id| HeadingEntry {
                id: id.to_string(),
                text: id.to_string(),
                level: 2,
                source_is_supplementary: false,
            })
            .collect()
    }

    #[test]
    fn last_entering_heading_wins() {
        let mut tracker = ActiveHeadingTracker::new(&headings(&["a", "b", "c"]));
        let active = tracker.observe(&[Observation::entering("a"), Observation::entering("b")]);
        assert_eq!(active, Some("b"));
    }

    #[test]
    fn leaving_does_not_clear_active() {
        let mut tracker = ActiveHeadingTracker::new(&headings(&["a", "b"]));
        tracker.observe(&[Observation::entering("a")]);
        assert_eq!(tracker.observe(&[Observation::leaving("a")]), Some("a"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut tracker = ActiveHeadingTracker::new(&headings(&["a"]));
        tracker.observe(&[Observation::entering("a")]);
        assert_eq!(tracker.observe(&[Observation::entering("collapsed")]), Some("a"));
        tracker.set_active("collapsed");
        assert_eq!(tracker.active(), Some("a"));
    }

    #[test]
    fn reset_drops_vanished_active_heading() {
        let mut tracker = ActiveHeadingTracker::new(&headings(&["a", "b"]));
        tracker.observe(&[Observation::entering("b")]);
        tracker.reset(&headings(&["a", "b", "c"]));
        assert_eq!(tracker.active(), Some("b"));
        tracker.reset(&headings(&["a"]));
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn empty_tracker_never_activates() {
        let mut tracker = ActiveHeadingTracker::default();
        assert_eq!(tracker.observe(&[Observation::entering("a")]), None);
    }

    #[test]
    fn root_margin_uses_header_offset() {
        assert_eq!(observer_root_margin(80), "-80px 0px -80% 0px");
    }
}
