//! Viewer — read-only access to the live board.
//!
//! DESIGN
//! ======
//! The display side never writes. It polls `snapshot()` and renders whatever
//! it gets; each snapshot is taken under the read lock, so a dispatch is
//! either fully visible or not at all.

use crate::state::{BoardState, Session, TargetId, TickerFeed};

/// Read capability over a session's board.
#[derive(Clone)]
pub struct Viewer {
    session: Session,
}

impl Viewer {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self { session: session.clone() }
    }

    /// Consistent copy of all five targets.
    pub async fn snapshot(&self) -> BoardState {
        self.session.board().await
    }

    /// Headline currently shown for `target`; for the ticker, its newest item.
    pub async fn headline(&self, target: TargetId) -> Option<String> {
        self.session
            .dashboard
            .read()
            .await
            .board
            .text(target)
            .map(str::to_string)
    }

    /// Ticker items, newest first.
    pub async fn ticker(&self) -> TickerFeed {
        self.session.dashboard.read().await.board.updates.clone()
    }
}

#[cfg(test)]
#[path = "viewer_test.rs"]
mod tests;
