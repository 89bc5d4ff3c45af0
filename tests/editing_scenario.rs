// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fs;

use mindmapr::format::{DiagramDocument, EdgeRecord, NodeRecord};
use mindmapr::interact::{
    Editor, EditorCommand, EditorError, EditorState, Handled, InputEvent, NullPresenter,
};
use mindmapr::model::{
    AccountId, DiagramId, DropReason, EndpointProblem, GraphError, NodeId, Point,
};
use mindmapr::store::{DocumentStore, StoreError};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct ScenarioCtx {
    _tmp: TempDir,
    store: DocumentStore,
    account: AccountId,
    editor: Editor,
}

#[fixture]
fn ctx() -> ScenarioCtx {
    let tmp = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(tmp.path().join("data"));
    let account = AccountId::new("dana").unwrap();
    store.create_account_workspace(&account).unwrap();
    ScenarioCtx {
        _tmp: tmp,
        store,
        account,
        editor: Editor::default(),
    }
}

/// Double-activates so the new node's top-left corner lands on `(x, y)`.
fn add_node_at(editor: &mut Editor, x: f64, y: f64) -> NodeId {
    let event = InputEvent::DoubleActivate(Point::new(x + 80.0, y + 26.0));
    match editor.handle(event, &mut NullPresenter).unwrap() {
        Handled::NodeCreated(node_id) => node_id,
        other => panic!("expected a new node, got {other:?}"),
    }
}

fn click(editor: &mut Editor, x: f64, y: f64) -> Handled {
    editor
        .handle(InputEvent::PointerDown(Point::new(x, y)), &mut NullPresenter)
        .unwrap()
}

#[rstest]
fn connect_save_and_reload_preserves_the_graph(mut ctx: ScenarioCtx) {
    let a = add_node_at(&mut ctx.editor, 10.0, 10.0);
    let b = add_node_at(&mut ctx.editor, 200.0, 10.0);

    click(&mut ctx.editor, 20.0, 20.0);
    ctx.editor
        .handle(
            InputEvent::Command(EditorCommand::StartConnection),
            &mut NullPresenter,
        )
        .unwrap();
    assert!(ctx.editor.is_connecting());
    let edge_id = match click(&mut ctx.editor, 210.0, 20.0) {
        Handled::EdgeCreated(edge_id) => edge_id,
        other => panic!("expected an edge, got {other:?}"),
    };
    assert_eq!(ctx.editor.state(), &EditorState::Idle);

    let diagram_id = DiagramId::generate();
    let meta = ctx
        .store
        .save_diagram(
            &ctx.account,
            &diagram_id,
            "test",
            &ctx.editor.diagram().to_document(),
        )
        .unwrap();
    assert_eq!(meta.title, "test");

    let (loaded, report) = ctx.store.load_diagram(&ctx.account, &diagram_id).unwrap();
    assert!(report.is_clean());

    let nodes: BTreeSet<(String, i64, i64)> = loaded
        .nodes()
        .map(|node| {
            (
                node.node_id().to_string(),
                node.position().x as i64,
                node.position().y as i64,
            )
        })
        .collect();
    let expected: BTreeSet<(String, i64, i64)> = [
        (a.to_string(), 10, 10),
        (b.to_string(), 200, 10),
    ]
    .into_iter()
    .collect();
    assert_eq!(nodes, expected);

    let edges: Vec<_> = loaded
        .edges()
        .map(|edge| (edge.edge_id().clone(), edge.a().clone(), edge.b().clone()))
        .collect();
    assert_eq!(edges, vec![(edge_id, a, b)]);
    assert!(loaded.is_consistent());
}

#[rstest]
fn connecting_a_node_to_itself_is_rejected(mut ctx: ScenarioCtx) {
    let a = add_node_at(&mut ctx.editor, 10.0, 10.0);
    let b = add_node_at(&mut ctx.editor, 200.0, 10.0);
    ctx.editor.connect(&a, &b, &mut NullPresenter).unwrap();

    let err = ctx.editor.connect(&a, &a, &mut NullPresenter).unwrap_err();

    assert!(matches!(
        err,
        EditorError::Graph(GraphError::InvalidEndpoint {
            problem: EndpointProblem::SelfLoop,
            ..
        })
    ));
    assert_eq!(ctx.editor.state(), &EditorState::Idle);
    assert_eq!(ctx.editor.diagram().edge_count(), 1);
}

#[rstest]
fn loading_drops_edges_with_unknown_endpoints(ctx: ScenarioCtx) {
    let node = |id: &str, x: f64| NodeRecord {
        id: id.to_owned(),
        x,
        y: 40.0,
        text: id.to_uppercase(),
        width: 160.0,
        height: 52.0,
    };
    let edge = |id: &str, a: &str, b: &str| EdgeRecord {
        id: id.to_owned(),
        a: a.to_owned(),
        b: b.to_owned(),
    };
    let document = DiagramDocument {
        nodes: vec![node("root", 0.0), node("leaf", 300.0), node("twig", 600.0)],
        edges: vec![
            edge("e1", "root", "leaf"),
            edge("e2", "root", "nowhere"),
            edge("e3", "leaf", "twig"),
        ],
    };
    let diagram_id = DiagramId::new("partial").unwrap();
    ctx.store
        .save_diagram(&ctx.account, &diagram_id, "partial", &document)
        .unwrap();

    let (loaded, report) = ctx.store.load_diagram(&ctx.account, &diagram_id).unwrap();

    assert_eq!(loaded.node_count(), 3);
    let kept: Vec<_> = loaded.edges().map(|e| e.edge_id().to_string()).collect();
    assert_eq!(kept, vec!["e1", "e3"]);
    let dropped: Vec<_> = report.dropped_edges().collect();
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].id.as_deref(), Some("e2"));
    assert_eq!(
        dropped[0].reason,
        DropReason::MissingEndpoint("nowhere".to_owned())
    );
}

#[rstest]
fn deleting_a_diagram_removes_body_and_index_entry(ctx: ScenarioCtx) {
    let diagram_id = DiagramId::new("scratch").unwrap();
    ctx.store
        .save_diagram(
            &ctx.account,
            &diagram_id,
            "scratch",
            &DiagramDocument::default(),
        )
        .unwrap();
    let body = ctx.store.body_path(&ctx.account, &diagram_id);
    assert!(body.exists());

    assert!(ctx.store.delete_diagram(&ctx.account, &diagram_id).unwrap());

    assert!(!body.exists());
    let index = fs::read_to_string(ctx.store.index_path(&ctx.account)).unwrap();
    assert!(!index.contains("scratch"));
    assert!(ctx.store.list_diagrams(&ctx.account).unwrap().is_empty());
    assert!(matches!(
        ctx.store.load_diagram(&ctx.account, &diagram_id),
        Err(StoreError::NotFound { .. })
    ));
    assert!(!ctx.store.delete_diagram(&ctx.account, &diagram_id).unwrap());
}
