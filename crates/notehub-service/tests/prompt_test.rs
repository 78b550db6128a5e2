//! Integration tests for prompt block formatting.

mod helpers;

use helpers::TestApp;
use notehub_entity::rule::OperationKind;

#[tokio::test]
async fn test_empty_selection_renders_nothing() {
    let app = TestApp::new();
    let out = app.prompt.format(&app.ctx, &[]).await.unwrap();
    assert_eq!(out, "");
}

#[tokio::test]
async fn test_block_layout_and_caller_order() {
    let app = TestApp::new();
    let dir = app.mkdir("Projects", None).await;
    let attached = app.mkrule("Style Guide", vec![OperationKind::Prompt]).await;
    let floating = app.mkrule("Tone", vec![OperationKind::Prompt]).await;
    app.attach(attached.id, dir.id).await;

    // Caller order is preserved, not re-sorted by hierarchy.
    let out = app
        .prompt
        .format(&app.ctx, &[floating.id, attached.id])
        .await
        .unwrap();

    assert!(out.starts_with("=================================================="));
    assert!(out.contains("CUSTOM RULES"));
    assert!(out.contains("END CUSTOM RULES"));
    assert!(out.contains("RULE #1 [(unattached)] Tone"));
    assert!(out.contains("RULE #2 [/Projects] Style Guide"));
    assert!(out.contains("Follow the Style Guide rule."));

    let tone_pos = out.find("Tone").unwrap();
    let style_pos = out.find("Style Guide").unwrap();
    assert!(tone_pos < style_pos);
}

#[tokio::test]
async fn test_missing_ids_are_skipped_and_numbering_stays_dense() {
    let app = TestApp::new();
    let first = app.mkrule("First", vec![OperationKind::Prompt]).await;
    let second = app.mkrule("Second", vec![OperationKind::Prompt]).await;
    let stale = notehub_core::types::RuleId::new();

    let out = app
        .prompt
        .format(&app.ctx, &[first.id, stale, second.id])
        .await
        .unwrap();

    assert!(out.contains("RULE #1 [(unattached)] First"));
    assert!(out.contains("RULE #2 [(unattached)] Second"));
    assert!(!out.contains("RULE #3"));
}

#[tokio::test]
async fn test_all_stale_ids_render_nothing() {
    let app = TestApp::new();
    let stale = notehub_core::types::RuleId::new();
    let out = app.prompt.format(&app.ctx, &[stale]).await.unwrap();
    assert_eq!(out, "");
}
