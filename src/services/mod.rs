//! Pipeline services built on a shared `Session`.
//!
//! ARCHITECTURE
//! ============
//! The admin console validates operator input and optionally routes it
//! through the summarizer; every accepted update lands through the
//! dispatcher, the only writer of board and history state. The viewer is
//! read-only.

pub mod admin;
pub mod dispatch;
pub mod summarizer;
pub mod viewer;
