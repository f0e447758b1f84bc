//! Space provisioning when a `space:configure` job becomes ready.

mod support;

use services::services::{
    domain_events::{EventHandler, HandlerError, SpaceConfigureHandler, jobs},
    platform::models::ActionMode,
};
use support::{FakePlatform, RecordingWebhook, event_context, handler_context, job_ready};

#[tokio::test]
async fn test_creates_workbook_then_completes_job() {
    let platform = FakePlatform::new();
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);
    let handler = SpaceConfigureHandler::new("Workbook One");

    let event = job_ready(
        jobs::SPACE_CONFIGURE,
        event_context("us_jb_cfg", Some("us_sp_1"), None),
    );
    handler.handle(event, &ctx).await.unwrap();

    let state = platform.state();
    assert_eq!(
        state.calls,
        vec!["ack_job", "create_workbook", "complete_job"]
    );
    assert_eq!(state.acks[0].0, "us_jb_cfg");
    assert_eq!(state.acks[0].1.progress, 10);

    let created = &state.created_workbooks[0];
    assert_eq!(created.space_id, "us_sp_1");
    assert_eq!(created.name, "Workbook One");
    let sheet_names: Vec<_> = created.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sheet_names, vec!["Contacts", "Companies"]);
    assert_eq!(created.actions.len(), 1);
    assert_eq!(created.actions[0].operation, "submitAction");
    assert_eq!(created.actions[0].mode, ActionMode::Foreground);
    assert_eq!(created.actions[0].label, "Submit");
    assert!(created.actions[0].primary);

    assert_eq!(state.completed.len(), 1);
    assert_eq!(
        state.completed[0].1.message,
        "Space is created with 1 workbook, 2 sheets, and a workbook-level Submit button"
    );
    assert!(state.failed.is_empty());
}

#[tokio::test]
async fn test_uses_configured_workbook_name() {
    let platform = FakePlatform::new();
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);

    SpaceConfigureHandler::new("Contacts Import")
        .handle(
            job_ready(
                jobs::SPACE_CONFIGURE,
                event_context("us_jb_cfg", Some("us_sp_1"), None),
            ),
            &ctx,
        )
        .await
        .unwrap();

    assert_eq!(
        platform.state().created_workbooks[0].name,
        "Contacts Import"
    );
}

#[tokio::test]
async fn test_create_failure_fails_job_with_generic_message() {
    let platform = FakePlatform::new();
    platform.fail_op("create_workbook");
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);

    SpaceConfigureHandler::new("Workbook One")
        .handle(
            job_ready(
                jobs::SPACE_CONFIGURE,
                event_context("us_jb_cfg", Some("us_sp_1"), None),
            ),
            &ctx,
        )
        .await
        .unwrap();

    let state = platform.state();
    assert!(state.completed.is_empty());
    assert_eq!(state.failed.len(), 1);
    assert_eq!(state.failed[0].0, "us_jb_cfg");
    assert_eq!(
        state.failed[0].1.message,
        "Creating a Space encountered an error. See Event Logs."
    );
}

#[tokio::test]
async fn test_missing_space_fails_after_ack() {
    let platform = FakePlatform::new();
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);

    SpaceConfigureHandler::new("Workbook One")
        .handle(
            job_ready(jobs::SPACE_CONFIGURE, event_context("us_jb_cfg", None, None)),
            &ctx,
        )
        .await
        .unwrap();

    let state = platform.state();
    assert_eq!(state.calls, vec!["ack_job", "fail_job"]);
    assert!(state.created_workbooks.is_empty());
}

#[tokio::test]
async fn test_complete_failure_falls_back_to_fail() {
    let platform = FakePlatform::new();
    platform.fail_op("complete_job");
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);

    SpaceConfigureHandler::new("Workbook One")
        .handle(
            job_ready(
                jobs::SPACE_CONFIGURE,
                event_context("us_jb_cfg", Some("us_sp_1"), None),
            ),
            &ctx,
        )
        .await
        .unwrap();

    let state = platform.state();
    assert_eq!(
        state.calls,
        vec!["ack_job", "create_workbook", "complete_job", "fail_job"]
    );
    assert_eq!(state.failed.len(), 1);
}

#[tokio::test]
async fn test_unreachable_fail_call_surfaces_error() {
    let platform = FakePlatform::new();
    platform.fail_op("create_workbook");
    platform.fail_op("fail_job");
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);

    let err = SpaceConfigureHandler::new("Workbook One")
        .handle(
            job_ready(
                jobs::SPACE_CONFIGURE,
                event_context("us_jb_cfg", Some("us_sp_1"), None),
            ),
            &ctx,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::Platform(_)));
    let state = platform.state();
    assert_eq!(state.calls, vec!["ack_job", "create_workbook", "fail_job"]);
    assert!(state.completed.is_empty());
    assert!(state.failed.is_empty());
}

#[tokio::test]
async fn test_event_without_job_id_makes_no_calls() {
    let platform = FakePlatform::new();
    let webhook = RecordingWebhook::new();
    let ctx = handler_context(&platform, &webhook);

    let mut context = event_context("unused", Some("us_sp_1"), None);
    context.job_id = None;

    let err = SpaceConfigureHandler::new("Workbook One")
        .handle(job_ready(jobs::SPACE_CONFIGURE, context), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::MissingContext("jobId")));
    assert!(platform.state().calls.is_empty());
}

#[test]
fn test_handles_only_ready_space_configure() {
    let handler = SpaceConfigureHandler::new("Workbook One");
    let context = event_context("us_jb_cfg", Some("us_sp_1"), None);

    assert!(handler.handles(&job_ready(jobs::SPACE_CONFIGURE, context.clone())));
    assert!(!handler.handles(&job_ready(jobs::SUBMIT_ACTION, context.clone())));
    assert!(!handler.handles(&support::job_completed(jobs::SPACE_CONFIGURE, context)));
}
