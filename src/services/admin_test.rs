use super::*;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, StructuredRequest};
use crate::state::test_helpers::{self, MockLlm};
use tokio::sync::Notify;

fn png() -> ImagePayload {
    ImagePayload::new(vec![0x89, b'P', b'N', b'G'], "image/png").unwrap()
}

fn ai_console(llm: MockLlm) -> (AdminConsole, Session, Arc<MockLlm>) {
    let llm = Arc::new(llm);
    let session = test_helpers::test_session_with_llm(llm.clone());
    (AdminConsole::new(&session), session, llm)
}

// =========================================================================
// Validation
// =========================================================================

#[tokio::test]
async fn manual_empty_submission_is_rejected_without_mutation() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);
    let before = test_helpers::dashboard_snapshot(&session).await;

    let err = console
        .dispatch_manual(TargetId::Exam, "   ", None)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Validation));
    assert_eq!(test_helpers::dashboard_snapshot(&session).await, before);
}

#[tokio::test]
async fn ai_empty_submission_is_rejected_before_any_call() {
    let (console, session, llm) = ai_console(MockLlm::new(Vec::new()));
    let before = test_helpers::dashboard_snapshot(&session).await;

    let err = console
        .dispatch_with_ai(TargetId::General, Some(""), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Validation));
    let err = console
        .dispatch_with_ai(TargetId::General, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Validation));

    assert_eq!(llm.call_count(), 0);
    assert_eq!(test_helpers::dashboard_snapshot(&session).await, before);
}

#[test]
fn validation_notice_wording() {
    let notice = DispatchError::Validation.notice();
    assert_eq!(notice.message, "Data payload required. Please input text or attach a visual asset.");
    assert_eq!(notice.code, "E_VALIDATION");
    assert!(notice.detail.is_none());
}

// =========================================================================
// Manual dispatch
// =========================================================================

#[tokio::test]
async fn manual_exam_scenario() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);

    console
        .dispatch_manual(TargetId::Exam, "Final exams moved to next Tuesday", None)
        .await
        .unwrap();

    let board = session.board().await;
    let history = console.history().await;
    assert_eq!(board.exam.text, "Final exams moved to next Tuesday");
    assert_eq!(history[0].short_summary, "Final exams moved to next Tuesday");
    assert_eq!(history[0].detailed_summary, "Final exams moved to next Tuesday");
    assert_eq!(history[0].target, TargetId::Exam);
    assert_eq!(history[0].kind, ContentKind::Text);
}

#[tokio::test]
async fn manual_text_is_stored_as_typed() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);
    let raw = "  Exams moved\n";

    let entry = console
        .dispatch_manual(TargetId::Exam, raw, None)
        .await
        .unwrap();

    assert_eq!(entry.short_summary, raw);
    assert_eq!(entry.detailed_summary, raw);
    assert_eq!(session.board().await.exam.text, raw);
}

#[tokio::test]
async fn manual_image_only_uses_placeholder() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);
    let image = png();

    let entry = console
        .dispatch_manual(TargetId::General, "", Some(image.clone()))
        .await
        .unwrap();

    assert_eq!(entry.short_summary, MANUAL_PLACEHOLDER);
    assert_eq!(entry.detailed_summary, MANUAL_PLACEHOLDER);
    assert_eq!(entry.kind, ContentKind::Image);
    let board = session.board().await;
    assert_eq!(board.general.text, "Update Applied");
    assert_eq!(board.general.image_ref, Some(image.to_image_ref()));
    assert_eq!(entry.image_preview, Some(image.to_image_ref()));
}

#[tokio::test]
async fn manual_updates_scenario() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);
    for text in ["A", "B", "C"] {
        console
            .dispatch_manual(TargetId::Updates, text, None)
            .await
            .unwrap();
    }
    let items: Vec<String> = session.board().await.updates.items.into_iter().collect();
    assert_eq!(items, ["C", "B", "A"]);
    assert_eq!(console.history().await.len(), 3);
}

#[tokio::test]
async fn manual_text_only_keeps_image_then_new_image_replaces() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);
    let seeded = session.board().await.event.image_ref;

    console
        .dispatch_manual(TargetId::Event, "Robotics expo", None)
        .await
        .unwrap();
    assert_eq!(session.board().await.event.image_ref, seeded);

    let image = png();
    console
        .dispatch_manual(TargetId::Event, "Robotics expo poster", Some(image.clone()))
        .await
        .unwrap();
    assert_eq!(session.board().await.event.image_ref, Some(image.to_image_ref()));
}

// =========================================================================
// AI-assisted dispatch
// =========================================================================

#[tokio::test]
async fn ai_dispatch_publishes_short_summary() {
    let (console, session, llm) = ai_console(MockLlm::replying(
        "```json\n{\"shortSummary\":\"Fair moved to Monday 🔬\",\"detailedSummary\":\"## Science Fair\"}\n```",
    ));

    let entry = console
        .dispatch_with_ai(TargetId::Event, Some("  The science fair is now on Monday  "), Some(png()))
        .await
        .unwrap();

    assert_eq!(llm.calls(), vec![(Some("The science fair is now on Monday".to_string()), true)]);
    assert_eq!(entry.kind, ContentKind::Both);
    assert_eq!(entry.detailed_summary, "## Science Fair");
    assert_eq!(session.board().await.event.text, "Fair moved to Monday 🔬");
    assert!(!console.is_busy());
}

#[tokio::test]
async fn ai_dispatch_without_credential_is_unavailable() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);
    let before = test_helpers::dashboard_snapshot(&session).await;

    let err = console
        .dispatch_with_ai(TargetId::General, Some("hello"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Summarize(SummarizeError::AiUnavailable)));
    assert_eq!(test_helpers::dashboard_snapshot(&session).await, before);
}

#[tokio::test]
async fn ai_failure_leaves_state_unchanged() {
    let failures = [
        LlmError::ApiResponse { status: 401, body: "invalid key".into() },
        LlmError::ApiRequest("connection reset".into()),
        LlmError::ApiResponse { status: 503, body: "overloaded".into() },
    ];
    for failure in failures {
        let (console, session, _) = ai_console(MockLlm::failing(failure));
        let before = test_helpers::dashboard_snapshot(&session).await;

        let err = console
            .dispatch_with_ai(TargetId::Updates, Some("hello"), Some(png()))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Summarize(_)));
        assert_eq!(test_helpers::dashboard_snapshot(&session).await, before);
        assert!(!console.is_busy());
    }
}

#[tokio::test]
async fn ai_malformed_reply_leaves_state_unchanged() {
    let (console, session, _) = ai_console(MockLlm::replying("I'm not sure what you mean."));
    let before = test_helpers::dashboard_snapshot(&session).await;

    let err = console
        .dispatch_with_ai(TargetId::Quote, Some("quote please"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Summarize(SummarizeError::AiMalformedResponse(_))));
    assert_eq!(test_helpers::dashboard_snapshot(&session).await, before);
}

#[tokio::test]
async fn ai_error_notice_carries_detail() {
    let (console, _, _) = ai_console(MockLlm::failing(LlmError::ApiResponse { status: 403, body: String::new() }));
    let err = console
        .dispatch_with_ai(TargetId::General, Some("hello"), None)
        .await
        .unwrap_err();

    let notice = err.notice();
    assert_eq!(notice.message, "Synthesis error.");
    assert_eq!(notice.code, "E_AI_AUTH");
    assert_eq!(notice.detail.as_deref(), Some("AI service rejected the credential (status 403)"));
}

// =========================================================================
// In-flight guard
// =========================================================================

/// Holds every request until released.
struct GatedLlm {
    release: Notify,
}

#[async_trait::async_trait]
impl LlmChat for GatedLlm {
    async fn generate(&self, _request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        self.release.notified().await;
        Ok(r#"{"shortSummary":"first","detailedSummary":"first"}"#.to_string())
    }
}

#[tokio::test]
async fn second_ai_dispatch_while_first_outstanding_is_busy() {
    let gate = Arc::new(GatedLlm { release: Notify::new() });
    let llm: Arc<dyn LlmChat> = gate.clone();
    let session = Session::with_board(crate::state::BoardState::campus_default(), Some(llm));
    let console = AdminConsole::new(&session);

    let first = tokio::spawn({
        let console = console.clone();
        async move {
            console
                .dispatch_with_ai(TargetId::General, Some("first"), None)
                .await
        }
    });
    while !console.is_busy() {
        tokio::task::yield_now().await;
    }

    let err = console
        .dispatch_with_ai(TargetId::General, Some("second"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Busy));
    assert!(session.history().await.is_empty());

    gate.release.notify_one();
    let entry = first.await.unwrap().unwrap();
    assert_eq!(entry.short_summary, "first");
    assert!(!console.is_busy());
    assert_eq!(session.history().await.len(), 1);
}

#[tokio::test]
async fn manual_dispatch_is_not_blocked_by_pending_ai() {
    let gate = Arc::new(GatedLlm { release: Notify::new() });
    let llm: Arc<dyn LlmChat> = gate.clone();
    let session = Session::with_board(crate::state::BoardState::campus_default(), Some(llm));
    let console = AdminConsole::new(&session);

    let pending = tokio::spawn({
        let console = console.clone();
        async move {
            console
                .dispatch_with_ai(TargetId::General, Some("slow"), None)
                .await
        }
    });
    while !console.is_busy() {
        tokio::task::yield_now().await;
    }

    console
        .dispatch_manual(TargetId::Exam, "Room change", None)
        .await
        .unwrap();
    assert_eq!(session.history().await.len(), 1);

    gate.release.notify_one();
    pending.await.unwrap().unwrap();
    assert_eq!(session.history().await.len(), 2);
}

// =========================================================================
// Ticker
// =========================================================================

#[tokio::test]
async fn push_ticker_accepts_presets_and_ignores_blank() {
    let session = test_helpers::test_session();
    let console = AdminConsole::new(&session);

    assert!(console.push_ticker(PRESET_COMMANDS[2]).await);
    assert!(!console.push_ticker("   ").await);

    let board = session.board().await;
    assert_eq!(board.updates.items.len(), 1);
    assert_eq!(board.text(TargetId::Updates), Some("Library extended hours start today 📚"));
    assert!(console.history().await.is_empty());
}
