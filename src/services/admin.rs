//! Admin console — the operator's write interface.
//!
//! DESIGN
//! ======
//! Both dispatch modes validate their inputs before any conversion, network
//! or state work, then funnel through the same `UpdateDispatcher`:
//!
//! - Manual: the operator's text is the headline and the detail verbatim.
//! - AI-assisted: the summarizer runs first, with no lock held. Any failure
//!   aborts before the dispatcher is touched, so state is all-or-nothing.
//!
//! A console allows one AI-assisted dispatch in flight at a time; a second
//! submission while one is outstanding is rejected rather than queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::dispatch::UpdateDispatcher;
use super::summarizer::{ContentSummarizer, SummarizeError};
use crate::error::{ErrorCode, OperatorNotice};
use crate::image::ImagePayload;
use crate::state::{ContentKind, HistoryEntry, HistoryLog, Session, SummaryResult, TargetId};

/// Headline stored when a manual dispatch carries only an image.
pub const MANUAL_PLACEHOLDER: &str = "Update Applied";

/// One-click ticker commands offered by the console.
pub const PRESET_COMMANDS: [&str; 6] = [
    "Tomorrow is a Campus Holiday! 🏖️",
    "System Maintenance scheduled for 2:00 PM 🛠️",
    "Library extended hours start today 📚",
    "Emergency Drill at 11:00 AM - Remain Calm 🚨",
    "New Cafeteria Menu is now live! 🍎",
    "Stay Hydrated! Campus Water Day 💧",
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("submission has neither text nor an image")]
    Validation,
    #[error("an AI-assisted dispatch is already in progress")]
    Busy,
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

impl ErrorCode for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation => "E_VALIDATION",
            Self::Busy => "E_BUSY",
            Self::Summarize(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Validation => false,
            Self::Busy => true,
            Self::Summarize(e) => e.retryable(),
        }
    }
}

impl DispatchError {
    /// Message and remediation detail for display to the operator.
    #[must_use]
    pub fn notice(&self) -> OperatorNotice {
        match self {
            Self::Validation => OperatorNotice::new(
                "Data payload required. Please input text or attach a visual asset.",
                self.error_code(),
            ),
            Self::Busy => OperatorNotice::new("Synthesis already in progress.", self.error_code())
                .with_detail("Wait for the current request to finish before submitting again."),
            Self::Summarize(e) => OperatorNotice::new("Synthesis error.", self.error_code()).with_detail(e.to_string()),
        }
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Blank text counts as absent.
fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn validate(text: Option<&str>, image: Option<&ImagePayload>) -> Result<ContentKind, DispatchError> {
    ContentKind::classify(non_blank(text).is_some(), image.is_some()).ok_or_else(|| {
        warn!("admin: rejected empty submission");
        DispatchError::Validation
    })
}

// =============================================================================
// CONSOLE
// =============================================================================

/// Operator write interface over a session.
#[derive(Clone)]
pub struct AdminConsole {
    session: Session,
    dispatcher: UpdateDispatcher,
    summarizer: ContentSummarizer,
    ai_in_flight: Arc<AtomicBool>,
}

impl AdminConsole {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            dispatcher: UpdateDispatcher::new(session),
            summarizer: ContentSummarizer::new(session.llm.clone()),
            ai_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an AI-assisted dispatch is outstanding (the console's submit
    /// control should be disabled).
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.ai_in_flight.load(Ordering::Acquire)
    }

    /// Publish the operator's own text as typed, bypassing the summarizer.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Validation`] when there is neither text nor
    /// an image. Never fails otherwise.
    pub async fn dispatch_manual(
        &self,
        target: TargetId,
        text: &str,
        image: Option<ImagePayload>,
    ) -> Result<HistoryEntry, DispatchError> {
        let kind = validate(Some(text), image.as_ref())?;

        let headline = match non_blank(Some(text)) {
            Some(_) => text.to_string(),
            None => MANUAL_PLACEHOLDER.to_string(),
        };
        let summary = SummaryResult { short_summary: headline.clone(), detailed_summary: headline };
        let image_ref = image.as_ref().map(ImagePayload::to_image_ref);

        info!(%target, ?kind, "admin: manual dispatch");
        Ok(self.dispatcher.dispatch(target, summary, image_ref, kind).await)
    }

    /// Summarize the input with the LLM, then publish the result.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Validation`] for an empty submission,
    /// [`DispatchError::Busy`] while another AI dispatch from this console is
    /// outstanding, and [`DispatchError::Summarize`] on any summarizer
    /// failure. No state changes in any error case.
    pub async fn dispatch_with_ai(
        &self,
        target: TargetId,
        text: Option<&str>,
        image: Option<ImagePayload>,
    ) -> Result<HistoryEntry, DispatchError> {
        let kind = validate(text, image.as_ref())?;

        if self
            .ai_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(%target, "admin: AI dispatch rejected, another is in flight");
            return Err(DispatchError::Busy);
        }
        let _guard = InFlightGuard(&self.ai_in_flight);

        info!(%target, ?kind, "admin: AI-assisted dispatch");
        let summary = self
            .summarizer
            .summarize(non_blank(text), image.as_ref())
            .await
            .inspect_err(|e| warn!(%target, error = %e, "admin: AI dispatch aborted"))?;

        let image_ref = image.as_ref().map(ImagePayload::to_image_ref);
        Ok(self.dispatcher.dispatch(target, summary, image_ref, kind).await)
    }

    /// Push a ticker message (preset or custom). Blank messages are ignored.
    /// Returns whether the ticker changed.
    pub async fn push_ticker(&self, message: &str) -> bool {
        let Some(message) = non_blank(Some(message)) else {
            return false;
        };
        self.dispatcher.push_ticker(message.to_string()).await;
        true
    }

    /// Audit log for the console's activity panel.
    pub async fn history(&self) -> HistoryLog {
        self.session.history().await
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
