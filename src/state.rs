//! Shared session state.
//!
//! DESIGN
//! ======
//! `Session` is the handle passed to both the admin console and the viewer.
//! It owns one `Dashboard` (board + history) behind a single `RwLock`, so a
//! dispatch mutates both under one write guard and no reader can observe a
//! board update without its history entry. Only the dispatcher takes the
//! write lock; viewers clone snapshots under the read lock.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::llm::{LlmChat, LlmClient};

/// Maximum history entries retained, newest first.
pub const HISTORY_LIMIT: usize = 15;

/// Maximum ticker items retained, newest first.
pub const TICKER_LIMIT: usize = 15;

// =============================================================================
// TARGETS
// =============================================================================

/// One of the five fixed notice slots on the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetId {
    Exam,
    Event,
    Updates,
    Quote,
    General,
}

impl TargetId {
    /// All targets, in admin console order.
    pub const ALL: [TargetId; 5] = [Self::Exam, Self::Updates, Self::Event, Self::Quote, Self::General];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Event => "event",
            Self::Updates => "updates",
            Self::Quote => "quote",
            Self::General => "general",
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown board target: {0}")]
pub struct UnknownTarget(pub String);

impl FromStr for TargetId {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam" => Ok(Self::Exam),
            "event" => Ok(Self::Event),
            "updates" => Ok(Self::Updates),
            "quote" => Ok(Self::Quote),
            "general" => Ok(Self::General),
            other => Err(UnknownTarget(other.to_string())),
        }
    }
}

// =============================================================================
// BOARD RECORDS
// =============================================================================

/// Inline `data:` URL or remote URL of an image shown on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Partial update to a board target. Absent fields leave state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPatch {
    pub text: Option<String>,
    pub image: Option<ImageRef>,
}

impl BoardPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), image: None }
    }

    #[must_use]
    pub fn with_image(mut self, image: Option<ImageRef>) -> Self {
        self.image = image;
        self
    }
}

/// What a single (non-ticker) notice box displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageRef>,
}

impl DisplayRecord {
    pub fn new(text: impl Into<String>, image_ref: Option<ImageRef>) -> Self {
        Self { text: text.into(), image_ref }
    }

    /// Merge a patch field by field: text is replaced when present, the image
    /// only when a new one is supplied.
    pub fn apply(&mut self, patch: BoardPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(image) = patch.image {
            self.image_ref = Some(image);
        }
    }
}

/// The `updates` target: a most-recent-first feed plus one shared image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerFeed {
    pub items: VecDeque<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageRef>,
}

impl TickerFeed {
    /// Prepend the patch text (capped at [`TICKER_LIMIT`]) and replace the
    /// shared image only when a new one is supplied.
    pub fn apply(&mut self, patch: BoardPatch) {
        if let Some(text) = patch.text {
            self.items.push_front(text);
            self.items.truncate(TICKER_LIMIT);
        }
        if let Some(image) = patch.image {
            self.image_ref = Some(image);
        }
    }
}

// =============================================================================
// BOARD STATE
// =============================================================================

/// Everything the viewer displays. Every target always has text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub exam: DisplayRecord,
    pub event: DisplayRecord,
    pub updates: TickerFeed,
    pub quote: DisplayRecord,
    pub general: DisplayRecord,
}

/// Rotating quotes for the quote box, selected by day of year.
pub const DAILY_QUOTES: [&str; 5] = [
    "Believe you can and you're halfway there.",
    "Education is the most powerful weapon which you can use to change the world.",
    "Intelligence plus character - that is the goal of true education.",
    "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    "The beautiful thing about learning is that no one can take it away from you.",
];

/// Quote for a 1-based ordinal day of the year.
#[must_use]
pub fn quote_for_day(day_of_year: u16) -> &'static str {
    DAILY_QUOTES[usize::from(day_of_year) % DAILY_QUOTES.len()]
}

fn seed_image(photo: &str) -> Option<ImageRef> {
    Some(ImageRef::new(format!("https://images.unsplash.com/{photo}?auto=format&fit=crop&w=600&q=80")))
}

impl BoardState {
    /// Default campus content. The ticker starts empty so it only ever shows
    /// operator commands.
    #[must_use]
    pub fn campus_default() -> Self {
        Self {
            exam: DisplayRecord::new(
                "Final Exams starting next Monday. Check your assigned rooms in the main hall.",
                seed_image("photo-1434030216411-0b793f4b4173"),
            ),
            event: DisplayRecord::new(
                "Annual Science Fair on Friday. Registration closes this evening.",
                seed_image("photo-1523580494863-6f3031224c94"),
            ),
            updates: TickerFeed { items: VecDeque::new(), image_ref: seed_image("photo-1504711432819-04220752705a") },
            quote: DisplayRecord::new(
                "The only way to do great work is to love what you do.",
                seed_image("photo-1499750310107-5fef28a66643"),
            ),
            general: DisplayRecord::new(
                "Welcome to the new digital dashboard. Summaries will appear here.",
                seed_image("photo-1550751827-4bd374c3f58b"),
            ),
        }
    }

    /// Merge a patch into one target.
    pub fn apply(&mut self, target: TargetId, patch: BoardPatch) {
        match target {
            TargetId::Updates => self.updates.apply(patch),
            TargetId::Exam => self.exam.apply(patch),
            TargetId::Event => self.event.apply(patch),
            TargetId::Quote => self.quote.apply(patch),
            TargetId::General => self.general.apply(patch),
        }
    }

    /// Headline text for a target. For the ticker this is the newest item.
    #[must_use]
    pub fn text(&self, target: TargetId) -> Option<&str> {
        match target {
            TargetId::Updates => self.updates.items.front().map(String::as_str),
            TargetId::Exam => Some(&self.exam.text),
            TargetId::Event => Some(&self.event.text),
            TargetId::Quote => Some(&self.quote.text),
            TargetId::General => Some(&self.general.text),
        }
    }

    #[must_use]
    pub fn image(&self, target: TargetId) -> Option<&ImageRef> {
        match target {
            TargetId::Updates => self.updates.image_ref.as_ref(),
            TargetId::Exam => self.exam.image_ref.as_ref(),
            TargetId::Event => self.event.image_ref.as_ref(),
            TargetId::Quote => self.quote.image_ref.as_ref(),
            TargetId::General => self.general.image_ref.as_ref(),
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::campus_default()
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// Which inputs the operator supplied for a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Both,
}

impl ContentKind {
    /// Classify a submission. `None` when neither input is present.
    #[must_use]
    pub fn classify(has_text: bool, has_image: bool) -> Option<Self> {
        match (has_text, has_image) {
            (true, true) => Some(Self::Both),
            (false, true) => Some(Self::Image),
            (true, false) => Some(Self::Text),
            (false, false) => None,
        }
    }
}

/// Headline plus longer Markdown summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub short_summary: String,
    pub detailed_summary: String,
}

/// One past dispatch. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    pub kind: ContentKind,
    pub target: TargetId,
    pub detailed_summary: String,
    pub short_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<ImageRef>,
}

/// Bounded audit log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, silently dropping the oldest beyond [`HISTORY_LIMIT`].
    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl std::ops::Index<usize> for HistoryLog {
    type Output = HistoryEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Board and history, always mutated together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Dashboard {
    pub(crate) board: BoardState,
    pub(crate) history: HistoryLog,
}

/// Top-level application session. Clone is cheap; all clones share state.
#[derive(Clone)]
pub struct Session {
    pub(crate) dashboard: Arc<RwLock<Dashboard>>,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub(crate) llm: Option<Arc<dyn LlmChat>>,
}

impl Session {
    /// Seed a session with the campus default board and today's quote.
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>) -> Self {
        let mut board = BoardState::campus_default();
        let today = time::OffsetDateTime::now_utc().ordinal();
        board.quote.text = quote_for_day(today).to_string();
        Self::with_board(board, llm)
    }

    #[must_use]
    pub fn with_board(board: BoardState, llm: Option<Arc<dyn LlmChat>>) -> Self {
        let dashboard = Dashboard { board, history: HistoryLog::new() };
        Self { dashboard: Arc::new(RwLock::new(dashboard)), llm }
    }

    /// Build a session from environment configuration (loading `.env` if
    /// present). A missing or ill-formed credential is not fatal: AI-assisted
    /// dispatch is disabled and fails with `AiUnavailable`.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let llm: Option<Arc<dyn LlmChat>> = match LlmClient::from_env() {
            Ok(client) => {
                tracing::info!(provider = client.provider_name(), model = client.model(), "LLM client initialized");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM client not configured; AI summarization disabled");
                None
            }
        };

        Self::new(llm)
    }

    /// Whether AI-assisted dispatch can be attempted.
    #[must_use]
    pub fn ai_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Copy of the current board.
    pub async fn board(&self) -> BoardState {
        self.dashboard.read().await.board.clone()
    }

    /// Copy of the current history log.
    pub async fn history(&self) -> HistoryLog {
        self.dashboard.read().await.history.clone()
    }
}

/// Current time as milliseconds since Unix epoch.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
