//! Update dispatcher — the only writer of board and history state.
//!
//! DESIGN
//! ======
//! A dispatch builds its `HistoryEntry` up front, then takes the session's
//! single write lock once and applies both mutations under it. Readers hold
//! the read lock, so they see either the whole dispatch or none of it.
//! Dispatching never fails; inputs are validated by the caller.

use tracing::info;
use uuid::Uuid;

use crate::state::{BoardPatch, ContentKind, HistoryEntry, ImageRef, Session, SummaryResult, TargetId, now_ms};

/// Write capability over a session's board and history.
#[derive(Clone)]
pub struct UpdateDispatcher {
    session: Session,
}

impl UpdateDispatcher {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self { session: session.clone() }
    }

    /// Record a dispatch in history and merge its headline into the board.
    ///
    /// The ticker receives `short_summary` as a new item; every other target
    /// has its text replaced. The image is replaced only when `image` is
    /// `Some`.
    pub async fn dispatch(
        &self,
        target: TargetId,
        summary: SummaryResult,
        image: Option<ImageRef>,
        kind: ContentKind,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: now_ms(),
            kind,
            target,
            detailed_summary: summary.detailed_summary,
            short_summary: summary.short_summary,
            image_preview: image.clone(),
        };
        let patch = BoardPatch::text(entry.short_summary.clone()).with_image(image);

        {
            let mut dashboard = self.session.dashboard.write().await;
            dashboard.history.push(entry.clone());
            dashboard.board.apply(target, patch);
        }

        info!(%target, ?kind, entry_id = %entry.id, "dispatch: board updated");
        entry
    }

    /// Prepend a message to the ticker without recording history.
    pub async fn push_ticker(&self, message: String) {
        self.session
            .dashboard
            .write()
            .await
            .board
            .apply(TargetId::Updates, BoardPatch::text(message));
        info!("dispatch: ticker message pushed");
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
