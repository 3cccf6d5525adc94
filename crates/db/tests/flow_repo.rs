//! Integration tests for flow document persistence.
//!
//! Exercises the save policy against a real database:
//! - Round trip of nodes, edges, name and trigger keywords
//! - Name-keyed upsert for drafts without an id
//! - Fallback insert under a disambiguated name on rename collisions
//! - Owner scoping

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use wabiz_core::flow::{FlowCanvas, FlowDraft, NodeKind, Position};
use wabiz_db::models::flow::SaveOutcome;
use wabiz_db::repositories::FlowRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn greeter(name: &str) -> FlowDraft {
    let mut canvas = FlowCanvas::new(name);
    let trigger = canvas.add_node(NodeKind::Trigger, Position { x: 0.0, y: 0.0 });
    let reply = canvas.add_node(NodeKind::Message, Position { x: 0.0, y: 120.0 });
    let wait = canvas.add_node(NodeKind::Delay, Position { x: 0.0, y: 240.0 });
    canvas.connect(&trigger, &reply);
    canvas.connect(&reply, &wait);
    canvas
        .update_node_data(&reply, &json!({ "content": "Welcome to the shop" }))
        .unwrap();
    canvas.set_trigger_input("hello, hi ,");
    canvas.save().unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn saved_flow_round_trips(pool: PgPool) {
    let owner = Uuid::new_v4();
    let draft = greeter("Greeter");

    let saved = FlowRepo::save(&pool, owner, &draft, Utc::now()).await.unwrap();
    assert_eq!(saved.outcome, SaveOutcome::Created);

    let loaded = FlowRepo::find_by_id(&pool, owner, saved.flow.id)
        .await
        .unwrap()
        .expect("flow should exist")
        .into_draft();

    assert_eq!(loaded.id, Some(saved.flow.id));
    assert_eq!(loaded.name, draft.name);
    assert_eq!(loaded.nodes, draft.nodes);
    assert_eq!(loaded.edges, draft.edges);
    assert_eq!(loaded.trigger_keywords, vec!["hello", "hi"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dangling_edges_survive_persistence(pool: PgPool) {
    let owner = Uuid::new_v4();
    let mut canvas = FlowCanvas::from_draft(greeter("Dangling"));
    canvas.delete_node("node_2").unwrap();
    let draft = canvas.save().unwrap();

    let saved = FlowRepo::save(&pool, owner, &draft, Utc::now()).await.unwrap();

    assert_eq!(saved.flow.nodes.0.len(), 2);
    assert_eq!(saved.flow.edges.0.len(), 2);
    assert!(saved.flow.edges.0.iter().any(|e| e.target == "node_2"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn saving_same_name_without_id_updates_existing(pool: PgPool) {
    let owner = Uuid::new_v4();
    let first = FlowRepo::save(&pool, owner, &greeter("Support"), Utc::now())
        .await
        .unwrap();

    let mut second = greeter("Support");
    second.trigger_keywords = vec!["help".to_string()];
    let again = FlowRepo::save(&pool, owner, &second, Utc::now()).await.unwrap();

    assert_eq!(again.outcome, SaveOutcome::Updated);
    assert_eq!(again.flow.id, first.flow.id);
    assert_eq!(again.flow.trigger_keywords, vec!["help"]);
    assert_eq!(FlowRepo::list_by_owner(&pool, owner).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn renaming_onto_another_document_inserts_disambiguated_copy(pool: PgPool) {
    let owner = Uuid::new_v4();
    let taken = FlowRepo::save(&pool, owner, &greeter("Orders"), Utc::now())
        .await
        .unwrap()
        .flow;
    let mine = FlowRepo::save(&pool, owner, &greeter("Returns"), Utc::now())
        .await
        .unwrap()
        .flow;

    let mut draft = mine.clone().into_draft();
    draft.name = "Orders".to_string();
    draft.trigger_keywords = vec!["refund".to_string()];
    let saved = FlowRepo::save(&pool, owner, &draft, Utc::now()).await.unwrap();

    assert_eq!(saved.outcome, SaveOutcome::Renamed);
    assert_ne!(saved.flow.id, taken.id);
    assert_ne!(saved.flow.id, mine.id);
    assert!(saved.flow.name.starts_with("Orders ("));

    // The document that owned the name is untouched.
    let untouched = FlowRepo::find_by_id(&pool, owner, taken.id).await.unwrap().unwrap();
    assert_eq!(untouched.name, "Orders");
    assert_eq!(untouched.trigger_keywords, vec!["hello", "hi"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn saving_by_id_updates_in_place(pool: PgPool) {
    let owner = Uuid::new_v4();
    let flow = FlowRepo::save(&pool, owner, &greeter("Promo"), Utc::now())
        .await
        .unwrap()
        .flow;

    let mut canvas = FlowCanvas::from_draft(flow.clone().into_draft());
    canvas.add_node(NodeKind::Question, Position { x: 200.0, y: 0.0 });
    canvas.set_name("Promo v2");
    let saved = FlowRepo::save(&pool, owner, &canvas.save().unwrap(), Utc::now())
        .await
        .unwrap();

    assert_eq!(saved.outcome, SaveOutcome::Updated);
    assert_eq!(saved.flow.id, flow.id);
    assert_eq!(saved.flow.name, "Promo v2");
    assert_eq!(saved.flow.nodes.0.len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn same_name_is_allowed_across_owners(pool: PgPool) {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let a = FlowRepo::save(&pool, alice, &greeter("Welcome"), Utc::now()).await.unwrap();
    let b = FlowRepo::save(&pool, bob, &greeter("Welcome"), Utc::now()).await.unwrap();

    assert_eq!(a.outcome, SaveOutcome::Created);
    assert_eq!(b.outcome, SaveOutcome::Created);
    assert_ne!(a.flow.id, b.flow.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_owners_cannot_save_over_a_flow(pool: PgPool) {
    let alice = Uuid::new_v4();
    let mallory = Uuid::new_v4();
    let flow = FlowRepo::save(&pool, alice, &greeter("Private"), Utc::now())
        .await
        .unwrap()
        .flow;

    let result = FlowRepo::save(&pool, mallory, &flow.clone().into_draft(), Utc::now()).await;
    assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
    assert!(FlowRepo::find_by_id(&pool, mallory, flow.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn toggle_and_delete(pool: PgPool) {
    let owner = Uuid::new_v4();
    let flow = FlowRepo::save(&pool, owner, &greeter("Toggle"), Utc::now())
        .await
        .unwrap()
        .flow;
    assert!(!flow.is_active);

    let active = FlowRepo::set_active(&pool, owner, flow.id, true).await.unwrap().unwrap();
    assert!(active.is_active);

    let summaries = FlowRepo::list_by_owner(&pool, owner).await.unwrap();
    assert_eq!(summaries[0].node_count, 3);

    assert!(FlowRepo::delete(&pool, owner, flow.id).await.unwrap());
    assert!(!FlowRepo::delete(&pool, owner, flow.id).await.unwrap());
}
