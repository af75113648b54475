//! Noticeboard — content pipeline for a campus digital-signage dashboard.
//!
//! ARCHITECTURE
//! ============
//! An operator submits text and/or an image through the [`AdminConsole`],
//! either verbatim or via an LLM that condenses it into a headline and a
//! detailed summary. Each accepted submission becomes one atomic update to a
//! [`BoardState`] target plus an entry in the bounded [`HistoryLog`]. The
//! [`Viewer`] reads consistent snapshots of the board.
//!
//! ```no_run
//! # async fn demo() -> Result<(), noticeboard::DispatchError> {
//! use noticeboard::{AdminConsole, Session, TargetId, Viewer};
//!
//! let session = Session::from_env();
//! let console = AdminConsole::new(&session);
//! console.dispatch_manual(TargetId::Exam, "Final exams moved to next Tuesday", None).await?;
//! let board = Viewer::new(&session).snapshot().await;
//! assert_eq!(board.exam.text, "Final exams moved to next Tuesday");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod llm;
pub mod services;
pub mod state;

pub use error::{ErrorCode, OperatorNotice};
pub use image::{ImageError, ImagePayload};
pub use services::admin::{AdminConsole, DispatchError, MANUAL_PLACEHOLDER, PRESET_COMMANDS};
pub use services::dispatch::UpdateDispatcher;
pub use services::summarizer::{ContentSummarizer, SummarizeError};
pub use services::viewer::Viewer;
pub use state::{
    BoardPatch, BoardState, ContentKind, DisplayRecord, HistoryEntry, HistoryLog, ImageRef, Session, SummaryResult,
    TargetId, TickerFeed,
};
