// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;

use chrono::NaiveDateTime;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::{DocumentStore, StoreError, WriteDurability, INDEX_FILENAME, TIMESTAMP_FORMAT};
use crate::model::fixtures::{diamond, diamond_document};
use crate::model::{AccountId, DiagramId, DropReason, GraphError, NodeId, Point};

struct StoreTestCtx {
    tmp: TempDir,
    store: DocumentStore,
    account: AccountId,
}

#[fixture]
fn ctx() -> StoreTestCtx {
    let tmp = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(tmp.path().join("data"));
    StoreTestCtx {
        tmp,
        store,
        account: AccountId::new("alice").unwrap(),
    }
}

fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap()
}

fn diagram_id(raw: &str) -> DiagramId {
    DiagramId::new(raw).unwrap()
}

#[rstest]
fn create_account_workspace_is_idempotent(ctx: StoreTestCtx) {
    ctx.store.create_account_workspace(&ctx.account).unwrap();
    let index_path = ctx.store.index_path(&ctx.account);
    assert_eq!(fs::read_to_string(&index_path).unwrap(), "{}\n");
    assert!(ctx.store.account_dir(&ctx.account).join("maps").is_dir());

    ctx.store
        .save_diagram_at(
            &ctx.account,
            &diagram_id("m1"),
            "First",
            &diamond_document(),
            at("2026-03-01 09:00:00"),
        )
        .unwrap();
    ctx.store.create_account_workspace(&ctx.account).unwrap();

    assert_eq!(ctx.store.list_diagrams(&ctx.account).unwrap().len(), 1);
}

#[rstest]
fn list_is_empty_for_unknown_account(ctx: StoreTestCtx) {
    let other = AccountId::new("nobody").unwrap();
    assert!(ctx.store.list_diagrams(&other).unwrap().is_empty());
    assert!(!ctx.store.account_dir(&other).exists());
}

#[rstest]
fn save_writes_body_and_index_in_the_documented_layout(ctx: StoreTestCtx) {
    let meta = ctx
        .store
        .save_diagram_at(
            &ctx.account,
            &diagram_id("m1"),
            "Planning",
            &diamond_document(),
            at("2026-03-01 09:00:00"),
        )
        .unwrap();

    assert_eq!(meta.title, "Planning");
    assert_eq!(meta.created, at("2026-03-01 09:00:00"));
    assert_eq!(meta.modified, meta.created);

    let account_dir = ctx.tmp.path().join("data").join("alice");
    let body = fs::read_to_string(account_dir.join("maps").join("m1.json")).unwrap();
    assert!(body.ends_with("}\n"));
    let body_json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body_json["nodes"][0]["id"], "n-a");
    assert_eq!(body_json["edges"][3]["b"], "n-d");

    let index = fs::read_to_string(account_dir.join(INDEX_FILENAME)).unwrap();
    let index_json: serde_json::Value = serde_json::from_str(&index).unwrap();
    assert_eq!(
        index_json,
        serde_json::json!({
            "m1": {
                "title": "Planning",
                "created": "2026-03-01 09:00:00",
                "modified": "2026-03-01 09:00:00"
            }
        })
    );
}

#[rstest]
fn resave_bumps_modified_and_keeps_title(ctx: StoreTestCtx) {
    let id = diagram_id("m1");
    ctx.store
        .save_diagram_at(
            &ctx.account,
            &id,
            "Original",
            &diamond_document(),
            at("2026-03-01 09:00:00"),
        )
        .unwrap();

    let meta = ctx
        .store
        .save_diagram_at(
            &ctx.account,
            &id,
            "Renamed",
            &diamond_document(),
            at("2026-03-02 10:30:00"),
        )
        .unwrap();

    assert_eq!(meta.title, "Original");
    assert_eq!(meta.created, at("2026-03-01 09:00:00"));
    assert_eq!(meta.modified, at("2026-03-02 10:30:00"));
    assert_eq!(ctx.store.diagram_meta(&ctx.account, &id).unwrap(), Some(meta));
}

#[rstest]
fn list_orders_by_modified_descending_then_id(ctx: StoreTestCtx) {
    let doc = diamond_document();
    for (id, ts) in [
        ("b", "2026-03-01 09:00:00"),
        ("c", "2026-03-03 09:00:00"),
        ("a", "2026-03-01 09:00:00"),
    ] {
        ctx.store
            .save_diagram_at(&ctx.account, &diagram_id(id), id, &doc, at(ts))
            .unwrap();
    }

    let ids: Vec<String> = ctx
        .store
        .list_diagrams(&ctx.account)
        .unwrap()
        .into_iter()
        .map(|meta| meta.diagram_id.into_string())
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[rstest]
fn load_rebuilds_the_saved_diagram(ctx: StoreTestCtx) {
    let id = diagram_id("m1");
    let original = diamond();
    ctx.store
        .save_diagram(&ctx.account, &id, "Planning", &original.to_document())
        .unwrap();

    let (loaded, report) = ctx.store.load_diagram(&ctx.account, &id).unwrap();

    assert!(report.is_clean());
    assert_eq!(loaded, original);
}

#[rstest]
fn load_of_unknown_id_is_not_found(ctx: StoreTestCtx) {
    let err = ctx
        .store
        .load_diagram(&ctx.account, &diagram_id("missing"))
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::NotFound { diagram_id, .. } if diagram_id.as_str() == "missing"
    ));
}

#[rstest]
fn load_with_index_entry_but_no_body_is_not_found(ctx: StoreTestCtx) {
    let id = diagram_id("m1");
    ctx.store
        .save_diagram(&ctx.account, &id, "Planning", &diamond_document())
        .unwrap();
    fs::remove_file(ctx.store.body_path(&ctx.account, &id)).unwrap();

    let err = ctx.store.load_diagram(&ctx.account, &id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[rstest]
fn load_drops_edges_with_dangling_endpoints(ctx: StoreTestCtx) {
    let id = diagram_id("m1");
    ctx.store
        .save_diagram(&ctx.account, &id, "Planning", &diamond_document())
        .unwrap();
    fs::write(
        ctx.store.body_path(&ctx.account, &id),
        r#"{
  "nodes": [
    {"id": "A", "x": 10, "y": 10, "text": "A"},
    {"id": "B", "x": 200, "y": 10, "text": "B"}
  ],
  "edges": [
    {"id": "e1", "a": "A", "b": "B"},
    {"id": "e2", "a": "A", "b": "ghost"}
  ]
}"#,
    )
    .unwrap();

    let (diagram, report) = ctx.store.load_diagram(&ctx.account, &id).unwrap();

    assert_eq!(diagram.node_count(), 2);
    assert_eq!(diagram.edge_count(), 1);
    let dropped: Vec<_> = report.dropped_edges().collect();
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].id.as_deref(), Some("e2"));
    assert_eq!(
        dropped[0].reason,
        DropReason::MissingEndpoint("ghost".to_owned())
    );
}

#[rstest]
fn load_of_non_json_body_is_malformed(ctx: StoreTestCtx) {
    let id = diagram_id("m1");
    ctx.store
        .save_diagram(&ctx.account, &id, "Planning", &diamond_document())
        .unwrap();
    fs::write(ctx.store.body_path(&ctx.account, &id), "not json").unwrap();

    let err = ctx.store.load_diagram(&ctx.account, &id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Malformed {
            source: GraphError::MalformedDocument { .. },
            ..
        }
    ));
}

#[rstest]
fn create_diagram_stores_an_empty_body_with_a_fresh_id(ctx: StoreTestCtx) {
    let first = ctx
        .store
        .create_diagram_at(&ctx.account, "Ideas", at("2026-03-01 09:00:00"))
        .unwrap();
    let second = ctx.store.create_diagram(&ctx.account, "Ideas").unwrap();

    assert_ne!(first.diagram_id, second.diagram_id);
    assert_eq!(first.title, "Ideas");
    let (diagram, report) = ctx
        .store
        .load_diagram(&ctx.account, &first.diagram_id)
        .unwrap();
    assert!(diagram.is_empty());
    assert!(report.is_clean());
}

#[rstest]
fn delete_removes_body_and_index_entry(ctx: StoreTestCtx) {
    let keep = diagram_id("keep");
    let gone = diagram_id("gone");
    for id in [&keep, &gone] {
        ctx.store
            .save_diagram(&ctx.account, id, id.as_str(), &diamond_document())
            .unwrap();
    }

    assert!(ctx.store.delete_diagram(&ctx.account, &gone).unwrap());

    assert!(!ctx.store.body_path(&ctx.account, &gone).exists());
    assert!(ctx.store.body_path(&ctx.account, &keep).exists());
    let listed: Vec<_> = ctx
        .store
        .list_diagrams(&ctx.account)
        .unwrap()
        .into_iter()
        .map(|meta| meta.diagram_id)
        .collect();
    assert_eq!(listed, vec![keep]);
    assert!(matches!(
        ctx.store.load_diagram(&ctx.account, &gone),
        Err(StoreError::NotFound { .. })
    ));
}

#[rstest]
fn delete_of_unknown_id_is_a_no_op(ctx: StoreTestCtx) {
    ctx.store.create_account_workspace(&ctx.account).unwrap();
    assert!(!ctx
        .store
        .delete_diagram(&ctx.account, &diagram_id("missing"))
        .unwrap());
    assert_eq!(
        fs::read_to_string(ctx.store.index_path(&ctx.account)).unwrap(),
        "{}\n"
    );
}

#[rstest]
fn import_uses_file_stem_and_repairs_the_document(ctx: StoreTestCtx) {
    let source = ctx.tmp.path().join("roadmap.json");
    fs::write(
        &source,
        r#"{"nodes":[{"id":"A"},{"id":"B","x":200}],"edges":[{"id":"e1","a":"A","b":"A"}]}"#,
    )
    .unwrap();

    let imported = ctx.store.import_diagram(&ctx.account, &source).unwrap();

    assert_eq!(imported.meta.diagram_id.as_str(), "roadmap");
    assert_eq!(imported.meta.title, "roadmap");
    assert_eq!(imported.diagram.node_count(), 2);
    assert_eq!(imported.diagram.edge_count(), 0);
    assert_eq!(imported.report.dropped[0].reason, DropReason::SelfLoop);

    let (stored, report) = ctx
        .store
        .load_diagram(&ctx.account, &imported.meta.diagram_id)
        .unwrap();
    assert!(report.is_clean());
    let a = stored.node(&NodeId::new("A").unwrap()).unwrap();
    assert_eq!(a.position(), Point::new(10.0, 10.0));
}

#[rstest]
fn import_keeps_title_of_existing_diagram(ctx: StoreTestCtx) {
    let id = diagram_id("roadmap");
    ctx.store
        .save_diagram(&ctx.account, &id, "Q3 Roadmap", &diamond_document())
        .unwrap();
    let source = ctx.tmp.path().join("roadmap.json");
    fs::write(&source, r#"{"nodes":[],"edges":[]}"#).unwrap();

    let imported = ctx.store.import_diagram(&ctx.account, &source).unwrap();

    assert_eq!(imported.meta.title, "Q3 Roadmap");
    assert!(imported.diagram.is_empty());
}

#[rstest]
fn import_of_missing_file_is_io_error(ctx: StoreTestCtx) {
    let err = ctx
        .store
        .import_diagram(&ctx.account, &ctx.tmp.path().join("nope.json"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[rstest]
fn unsafe_ids_are_stored_under_encoded_names(ctx: StoreTestCtx) {
    let account = AccountId::new("..").unwrap();
    let id = diagram_id("a:b");
    ctx.store
        .save_diagram(&account, &id, "Odd", &diamond_document())
        .unwrap();

    let account_dir = ctx.tmp.path().join("data").join("~2e2e");
    assert!(account_dir.join("maps").join("~613a62.json").is_file());
    let (diagram, _) = ctx.store.load_diagram(&account, &id).unwrap();
    assert_eq!(diagram.node_count(), 4);
}

#[rstest]
fn durable_writes_produce_the_same_files(ctx: StoreTestCtx) {
    let store = ctx.store.clone().with_durability(WriteDurability::Durable);
    assert_eq!(store.durability(), WriteDurability::Durable);

    let id = diagram_id("m1");
    store
        .save_diagram(&ctx.account, &id, "Planning", &diamond_document())
        .unwrap();

    let (diagram, _) = ctx.store.load_diagram(&ctx.account, &id).unwrap();
    assert_eq!(diagram.edge_count(), 4);
    let leftovers: Vec<_> = fs::read_dir(ctx.store.account_dir(&ctx.account).join("maps"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".mindmapr.tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[cfg(unix)]
#[rstest]
fn symlinked_account_dir_is_refused(ctx: StoreTestCtx) {
    let elsewhere = ctx.tmp.path().join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();
    fs::create_dir_all(ctx.store.root()).unwrap();
    std::os::unix::fs::symlink(&elsewhere, ctx.store.account_dir(&ctx.account)).unwrap();

    let err = ctx
        .store
        .save_diagram(&ctx.account, &diagram_id("m1"), "Planning", &diamond_document())
        .unwrap_err();
    assert!(matches!(err, StoreError::SymlinkRefused { .. }));
}
