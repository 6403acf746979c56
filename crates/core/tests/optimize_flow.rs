//! E2E tests for the optimize pipeline (Pipeline B).
//!
//! These tests drive `Idle → InitialFix → Reflection → FinalCheck → Done`
//! and verify round accounting, round-level failure resilience,
//! cancellation mid-loop, and the one-time history append.

mod common;

use common::assertions::*;
use common::fixtures::*;
use common::mock_backends::{RoutedBackend, Script};
use prd_core::backend::{Backend, BackendError};
use prd_core::pipeline::{OptimizeController, OptimizeState, PipelineError, RunOutcome};
use prd_protocol::{FeatureKind, StageStatus};
use std::sync::Arc;

const INITIAL_FIX_MARKER: &str = "请根据用户提供的旧策划案和修改意见";
const CRITIQUE_MARKER: &str = "挑剔的高级开发人员";
const FIX_MARKER: &str = "你是策划酸奶";
const CHECK_MARKER: &str = "正在对策划案进行复检清单检查";

fn transient_free_backend(critique: Script, fix: Script) -> RoutedBackend {
    RoutedBackend::new(Script::Empty)
        .route(INITIAL_FIX_MARKER, Script::Reply("初步修正稿".to_string()))
        .route(CRITIQUE_MARKER, critique)
        .route(FIX_MARKER, fix)
        .route(CHECK_MARKER, Script::Reply("✅ 全部通过".to_string()))
}

#[tokio::test]
async fn test_e2e_two_rounds_complete() {
    let backend = Arc::new(transient_free_backend(
        Script::sequence(vec![
            Script::Reply("第一轮问题清单".to_string()),
            Script::Reply("第二轮问题清单".to_string()),
        ]),
        Script::sequence(vec![
            Script::Reply("第一轮修订稿".to_string()),
            Script::Reply("第二轮修订稿".to_string()),
        ]),
    ));
    let engine = test_engine(Arc::clone(&backend) as Arc<dyn Backend>);
    let mut session = test_session();
    let mut controller = OptimizeController::new();
    let (tx, mut rx) = ui_channel();

    let outcome = controller
        .submit(&engine, &mut session, "旧策划案全文", "补充验收标准", None, 2, &tx)
        .await
        .expect("validation passes");

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(controller.state(), OptimizeState::Done);
    assert_eq!(controller.rounds_completed(), 2);
    // The final document is exactly round 2's fix output.
    assert_eq!(controller.document(), "第二轮修订稿");
    assert_eq!(controller.check_report(), Some("✅ 全部通过"));

    let events = drain_ui(&mut rx);
    assert_eq!(count_rounds_started(&events), 2);
    assert_stage_finished(&events, "initial-fix", StageStatus::Completed);
    assert_stage_finished(&events, "reflection-round-2-fix", StageStatus::Completed);
    assert_stage_finished(&events, "final-check", StageStatus::Completed);

    controller.record_history(&mut session.history, None);
    assert_eq!(session.history.len(), 1);
    let record = session.history.latest().expect("record");
    assert_eq!(record.function_type, FeatureKind::OptimizePrd);
    assert_eq!(record.function_type.label(), "优化策划案");
    assert_eq!(record.output_text, "第二轮修订稿");
}

#[tokio::test]
async fn test_failed_critique_skips_round_without_corrupting_state() {
    // Critique fails on round 2 of 3; rounds 1 and 3 would succeed, but
    // the fake only scripts one fix revision so round 3's critique
    // failure keeps the loop attempting without changing the document.
    let backend = Arc::new(transient_free_backend(
        Script::sequence(vec![
            Script::Reply("第一轮问题清单".to_string()),
            Script::Fail(BackendError::Api("invalid request".to_string())),
            Script::Fail(BackendError::Api("invalid request".to_string())),
        ]),
        Script::Reply("第一轮修订稿".to_string()),
    ));
    let engine = test_engine(Arc::clone(&backend) as Arc<dyn Backend>);
    let mut session = test_session();
    let mut controller = OptimizeController::new();
    let (tx, mut rx) = ui_channel();

    let outcome = controller
        .submit(&engine, &mut session, "旧策划案全文", "", None, 3, &tx)
        .await
        .expect("validation passes");

    assert_eq!(outcome, RunOutcome::Completed);
    // Round 1 applied; rounds 2 and 3 skipped but still attempted.
    assert_eq!(controller.rounds_completed(), 1);
    assert_eq!(controller.document(), "第一轮修订稿");

    let events = drain_ui(&mut rx);
    assert_eq!(count_rounds_started(&events), 3);
    assert_stage_finished(&events, "reflection-round-2-critique", StageStatus::Failed);
    assert_stage_finished(&events, "reflection-round-3-critique", StageStatus::Failed);
}

#[tokio::test]
async fn test_failed_fix_keeps_last_good_document() {
    let backend = Arc::new(transient_free_backend(
        Script::Reply("问题清单".to_string()),
        Script::Fail(BackendError::Api("invalid request".to_string())),
    ));
    let engine = test_engine(backend);
    let mut session = test_session();
    let mut controller = OptimizeController::new();
    let (tx, mut rx) = ui_channel();

    let outcome = controller
        .submit(&engine, &mut session, "旧策划案全文", "", None, 2, &tx)
        .await
        .expect("validation passes");

    // Fix failures are downgraded to warnings; the initial fix survives.
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(controller.rounds_completed(), 0);
    assert_eq!(controller.document(), "初步修正稿");

    let events = drain_ui(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, prd_protocol::UiEvent::Notice { text } if text.contains("保持当前版本"))));
}

#[tokio::test]
async fn test_empty_critique_skips_round() {
    let backend = Arc::new(transient_free_backend(
        Script::Empty,
        Script::Reply("不应出现的修订".to_string()),
    ));
    let engine = test_engine(Arc::clone(&backend) as Arc<dyn Backend>);
    let mut session = test_session();
    let mut controller = OptimizeController::new();
    let (tx, _rx) = ui_channel();

    let outcome = controller
        .submit(&engine, &mut session, "旧策划案全文", "", None, 2, &tx)
        .await
        .expect("validation passes");

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(controller.rounds_completed(), 0);
    assert_eq!(controller.document(), "初步修正稿");

    // The fix instruction was never invoked.
    let fix_calls = backend
        .captured_requests()
        .iter()
        .filter(|request| {
            request
                .system_instruction
                .as_deref()
                .is_some_and(|instruction| instruction.contains(FIX_MARKER))
        })
        .count();
    assert_eq!(fix_calls, 0);
}

#[tokio::test]
async fn test_cancellation_between_rounds_still_runs_final_check() {
    let mut session = test_session();
    // Round 1's fix delivers fully and trips the cancel flag as its
    // stream ends; the loop observes the flag before round 2 begins.
    let backend = Arc::new(transient_free_backend(
        Script::Reply("问题清单".to_string()),
        Script::ReplyThenCancel("第一轮修订稿".to_string(), session.cancel.clone()),
    ));
    let engine = test_engine(backend);
    let mut controller = OptimizeController::new();
    let (tx, mut rx) = ui_channel();

    let outcome = controller
        .submit(&engine, &mut session, "旧策划案全文", "", None, 5, &tx)
        .await
        .expect("validation passes");

    // The optimize operation is not aborted: the loop stops, retaining
    // the current document, and proceeds directly to the final check.
    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(controller.state(), OptimizeState::Done);
    assert_eq!(controller.rounds_completed(), 1);
    assert_eq!(controller.document(), "第一轮修订稿");
    assert_eq!(controller.check_report(), Some("✅ 全部通过"));

    let events = drain_ui(&mut rx);
    assert_eq!(count_rounds_started(&events), 1);
    assert_stage_finished(&events, "reflection-round-1-fix", StageStatus::Completed);
    assert_stage_finished(&events, "final-check", StageStatus::Completed);
}

#[tokio::test]
async fn test_initial_fix_failure_reverts_to_idle() {
    let backend = Arc::new(
        RoutedBackend::new(Script::Empty).route(
            INITIAL_FIX_MARKER,
            Script::Fail(BackendError::Api("invalid API key".to_string())),
        ),
    );
    let engine = test_engine(Arc::clone(&backend) as Arc<dyn Backend>);
    let mut session = test_session();
    let mut controller = OptimizeController::new();
    let (tx, _rx) = ui_channel();

    let outcome = controller
        .submit(&engine, &mut session, "旧策划案全文", "", None, 2, &tx)
        .await
        .expect("validation passes");

    assert!(matches!(outcome, RunOutcome::Failed(_)));
    assert_eq!(controller.state(), OptimizeState::Idle);
    assert_eq!(backend.call_count(), 1, "no reflection or check calls");
}

#[tokio::test]
async fn test_empty_old_document_rejected() {
    let backend = Arc::new(transient_free_backend(Script::Empty, Script::Empty));
    let engine = test_engine(Arc::clone(&backend) as Arc<dyn Backend>);
    let mut session = test_session();
    let mut controller = OptimizeController::new();
    let (tx, _rx) = ui_channel();

    let result = controller
        .submit(&engine, &mut session, "", "意见", None, 2, &tx)
        .await;

    assert_eq!(
        result,
        Err(PipelineError::EmptyInput("旧策划案".to_string()))
    );
    assert_eq!(backend.call_count(), 0);
}
