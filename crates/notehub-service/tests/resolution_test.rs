//! Integration tests for rule cascade resolution.

mod helpers;

use helpers::TestApp;
use notehub_core::error::ErrorKind;
use notehub_entity::rule::OperationKind;

#[tokio::test]
async fn test_inheritance_scenario() {
    // Create root dir "Projects" → child "Web" → attach "Style Guide"
    // (prompt) to "Projects" → resolving "Web" for prompt inherits it.
    let app = TestApp::new();
    let projects = app.mkdir("Projects", None).await;
    let web = app.mkdir("Web", Some(projects.id)).await;
    let style = app.mkrule("Style Guide", vec![OperationKind::Prompt]).await;
    app.attach(style.id, projects.id).await;

    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, web.id, Some(OperationKind::Prompt))
        .await
        .unwrap();

    assert_eq!(resolved.rules.len(), 1);
    let entry = &resolved.rules[0];
    assert_eq!(entry.rule.id, style.id);
    assert_eq!(entry.hierarchy_level, 0);
    assert_eq!(entry.source_directory_id, projects.id);
    assert_eq!(entry.source_path, "/Projects");

    assert_eq!(resolved.inheritance[&projects.id], vec![style.id]);
    assert!(resolved.inheritance[&web.id].is_empty());
}

#[tokio::test]
async fn test_ancestor_rules_order_first() {
    let app = TestApp::new();
    let root = app.mkdir("Workspace", None).await;
    let child = app.mkdir("Child", Some(root.id)).await;
    let grandchild = app.mkdir("Grandchild", Some(child.id)).await;

    // "Zeta" at the root must still sort before "Alpha" at the leaf.
    let zeta = app.mkrule("Zeta", vec![OperationKind::Prompt]).await;
    let alpha = app.mkrule("Alpha", vec![OperationKind::Prompt]).await;
    app.attach(zeta.id, root.id).await;
    app.attach(alpha.id, grandchild.id).await;

    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, grandchild.id, Some(OperationKind::Prompt))
        .await
        .unwrap();

    let ids: Vec<_> = resolved.rules.iter().map(|r| r.rule.id).collect();
    assert_eq!(ids, vec![zeta.id, alpha.id]);
    assert_eq!(resolved.rules[0].hierarchy_level, 0);
    assert_eq!(resolved.rules[1].hierarchy_level, 2);
}

#[tokio::test]
async fn test_operation_filter() {
    let app = TestApp::new();
    let dir = app.mkdir("Dir", None).await;
    let quiz_only = app.mkrule("QuizOnly", vec![OperationKind::Quiz]).await;
    let both = app
        .mkrule("Both", vec![OperationKind::Quiz, OperationKind::Prompt])
        .await;
    app.attach(quiz_only.id, dir.id).await;
    app.attach(both.id, dir.id).await;

    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, dir.id, Some(OperationKind::Prompt))
        .await
        .unwrap();
    let ids: Vec<_> = resolved.rules.iter().map(|r| r.rule.id).collect();
    assert_eq!(ids, vec![both.id]);

    // No filter: everything comes back.
    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, dir.id, None)
        .await
        .unwrap();
    assert_eq!(resolved.rules.len(), 2);
}

#[tokio::test]
async fn test_shallowest_attachment_wins() {
    let app = TestApp::new();
    let root = app.mkdir("Workspace", None).await;
    let leaf = app.mkdir("Leaf", Some(root.id)).await;
    let shared = app.mkrule("Shared", vec![OperationKind::Prompt]).await;
    app.attach(shared.id, root.id).await;
    app.attach(shared.id, leaf.id).await;

    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, leaf.id, Some(OperationKind::Prompt))
        .await
        .unwrap();

    // Deduplicated, positioned at the ancestor level.
    assert_eq!(resolved.rules.len(), 1);
    assert_eq!(resolved.rules[0].hierarchy_level, 0);
    assert_eq!(resolved.rules[0].source_directory_id, root.id);

    // But the inheritance map reports both attachment points.
    assert_eq!(resolved.inheritance[&root.id], vec![shared.id]);
    assert_eq!(resolved.inheritance[&leaf.id], vec![shared.id]);
}

#[tokio::test]
async fn test_same_level_sorts_by_name_then_id() {
    let app = TestApp::new();
    let dir = app.mkdir("Dir", None).await;
    let beta = app.mkrule("beta", vec![OperationKind::Prompt]).await;
    let alpha = app.mkrule("Alpha", vec![OperationKind::Prompt]).await;
    let twin_a = app.mkrule("Twin", vec![OperationKind::Prompt]).await;
    let twin_b = app.mkrule("Twin", vec![OperationKind::Prompt]).await;
    for id in [beta.id, alpha.id, twin_a.id, twin_b.id] {
        app.attach(id, dir.id).await;
    }

    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, dir.id, Some(OperationKind::Prompt))
        .await
        .unwrap();
    let names: Vec<&str> = resolved.rules.iter().map(|r| r.rule.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta", "Twin", "Twin"]);

    // Identical (level, name) ties break by id ascending.
    let twins: Vec<_> = resolved
        .rules
        .iter()
        .filter(|r| r.rule.name == "Twin")
        .map(|r| r.rule.id)
        .collect();
    let mut expected = vec![twin_a.id, twin_b.id];
    expected.sort();
    assert_eq!(twins, expected);
}

#[tokio::test]
async fn test_empty_chain_is_ok_not_error() {
    let app = TestApp::new();
    let root = app.mkdir("Workspace", None).await;
    let leaf = app.mkdir("Leaf", Some(root.id)).await;

    let resolved = app
        .resolution
        .resolve_for_directory(&app.ctx, leaf.id, Some(OperationKind::Prompt))
        .await
        .unwrap();
    assert!(resolved.rules.is_empty());
    assert!(resolved.inheritance[&root.id].is_empty());
    assert!(resolved.inheritance[&leaf.id].is_empty());
}

#[tokio::test]
async fn test_missing_directory_is_not_found() {
    let app = TestApp::new();
    let err = app
        .resolution
        .resolve_for_directory(
            &app.ctx,
            notehub_core::types::DirectoryId::new(),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_applicable_rules_reports_defaults() {
    let app = TestApp::new();
    let dir = app.mkdir("Dir", None).await;
    let normal = app.mkrule("Normal", vec![OperationKind::Upload]).await;
    let preset = app
        .mkrule_with("Preset", vec![OperationKind::Upload], true)
        .await;
    app.attach(normal.id, dir.id).await;
    app.attach(preset.id, dir.id).await;

    let applicable = app
        .resolution
        .applicable_rules(&app.ctx, dir.id, OperationKind::Upload)
        .await
        .unwrap();
    assert_eq!(applicable.rules.len(), 2);
    assert_eq!(applicable.default_rule_ids, vec![preset.id]);
}

#[tokio::test]
async fn test_direct_rules_skip_inheritance() {
    let app = TestApp::new();
    let root = app.mkdir("Workspace", None).await;
    let leaf = app.mkdir("Leaf", Some(root.id)).await;
    let inherited = app.mkrule("Inherited", vec![OperationKind::Prompt]).await;
    let local = app.mkrule("Local", vec![OperationKind::Prompt]).await;
    app.attach(inherited.id, root.id).await;
    app.attach(local.id, leaf.id).await;

    let direct = app.resolution.direct_rules(&app.ctx, leaf.id).await.unwrap();
    let ids: Vec<_> = direct.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![local.id]);
}
