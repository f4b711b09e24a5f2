//! Interaction and page-view recording.
//!
//! Events are appended to the active session in arrival order; nothing is
//! reordered or deduplicated. Dwell time for a page is filled in
//! retroactively when the next navigation arrives, producing a new frozen
//! record instead of mutating history in place.

use crate::adapter::types::{InteractionEvent, InteractionKind, PageVisit};
use crate::core::session::{PageView, Session};
use chrono::{DateTime, Utc};

/// Default floor below which a navigation is treated as a redirect bounce
/// and its dwell time is not counted.
pub const DEFAULT_MIN_DWELL_MS: i64 = 1000;

/// Appends normalized events into a session's logs.
#[derive(Debug, Clone, Copy)]
pub struct InteractionRecorder {
    min_dwell_ms: i64,
}

impl InteractionRecorder {
    pub fn new(min_dwell_ms: i64) -> Self {
        Self { min_dwell_ms }
    }

    /// Open a new page view, finalizing the previous one first.
    pub fn record_page_view(&self, session: &mut Session, visit: &PageVisit, now: DateTime<Utc>) {
        self.finalize_open_view(session, now);
        session
            .page_views
            .push(PageView::open(&visit.path, &visit.title, now));
    }

    /// Freeze the dwell time of the currently open page view.
    ///
    /// Micro-navigations below the minimum dwell floor keep a zero dwell.
    /// Called on navigation and when a session ends, so closing a session
    /// never discards the time spent on the last page.
    pub fn finalize_open_view(&self, session: &mut Session, now: DateTime<Utc>) {
        if let Some(open) = session.page_views.last_mut() {
            let elapsed = (now - open.timestamp).num_milliseconds();
            if open.time_spent_ms == 0 && elapsed > self.min_dwell_ms {
                let frozen = PageView {
                    time_spent_ms: elapsed,
                    ..open.clone()
                };
                *open = frozen;
            }
        }
    }

    /// Append an interaction to the session log and update the open page
    /// view's counters.
    pub fn record_interaction(&self, session: &mut Session, event: InteractionEvent) {
        if let Some(open) = session.page_views.last_mut() {
            open.interaction_count += 1;
            if event.kind == InteractionKind::Scroll {
                if let Some(depth) = event.scroll_depth() {
                    open.scroll_depth = depth;
                }
            }
        }
        session.interactions.push(event);
    }
}

impl Default for InteractionRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DWELL_MS)
    }
}
