#![allow(dead_code)]

use jot_core::{
    ErrorKind, NewNote, NoteContent, NoteStore, NoteUpdate, OpContext, StoreError,
    ValidationError,
};
use serde_json::json;
use uuid::Uuid;

fn ctx() -> OpContext {
    OpContext::background()
}

pub async fn create_then_get_returns_fresh_note<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("Groceries", "milk, eggs"))
        .await
        .expect("create");

    let note = store.get(&ctx(), id).await.expect("get");
    assert_eq!(note.id, id);
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.content, NoteContent::text("milk, eggs"));
    assert_eq!(note.text_content, None);
    assert!(!note.is_favorite);
    assert_eq!(note.created_at, note.updated_at);
    assert!(note.last_visited.expect("visited") >= note.created_at);
}

pub async fn create_keeps_caller_fields<S: NoteStore>(store: &S) {
    let id = store
        .create(
            &ctx(),
            NewNote::new("  Padded  ", "body")
                .with_text_content("body")
                .favorite(true),
        )
        .await
        .expect("create");

    let note = store.get(&ctx(), id).await.expect("get");
    assert_eq!(note.title, "Padded");
    assert_eq!(note.text_content.as_deref(), Some("body"));
    assert!(note.is_favorite);
}

pub async fn empty_fields_are_rejected_without_writing<S: NoteStore>(store: &S) {
    let err = store
        .create(&ctx(), NewNote::new("", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyTitle)));

    let err = store
        .create(&ctx(), NewNote::new("Title", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyContent)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(store.list(&ctx()).await.expect("list").is_empty());
}

pub async fn list_returns_notes_in_insertion_order<S: NoteStore>(store: &S) {
    assert!(store.list(&ctx()).await.expect("empty list").is_empty());

    let mut ids = Vec::new();
    for title in ["first", "second", "third"] {
        ids.push(
            store
                .create(&ctx(), NewNote::new(title, "x"))
                .await
                .expect("create"),
        );
    }
    store.delete(&ctx(), ids[1]).await.expect("delete");

    let listed = store.list(&ctx()).await.expect("list");
    let titles: Vec<_> = listed.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["first", "third"]);
}

pub async fn list_does_not_touch_last_visited<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("t", "c"))
        .await
        .expect("create");
    let before = store.list(&ctx()).await.expect("list")[0].last_visited;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let after = store.list(&ctx()).await.expect("list")[0].last_visited;
    assert_eq!(before, after);

    let visited = store.get(&ctx(), id).await.expect("get").last_visited;
    assert!(visited > before);
}

pub async fn repeated_gets_never_move_last_visited_back<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("t", "c"))
        .await
        .expect("create");

    let first = store.get(&ctx(), id).await.expect("first get");
    let second = store.get(&ctx(), id).await.expect("second get");
    assert!(second.last_visited >= first.last_visited);
    assert_eq!(second.updated_at, first.updated_at);
}

pub async fn get_missing_note_is_not_found<S: NoteStore>(store: &S) {
    let missing = Uuid::new_v4();
    let err = store.get(&ctx(), missing).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
    assert_eq!(err.kind().status_code(), 404);
}

pub async fn toggle_twice_restores_favorite<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("t", "c"))
        .await
        .expect("create");
    let created = store.get(&ctx(), id).await.expect("get");

    let once = store.toggle_favorite(&ctx(), id).await.expect("toggle");
    assert!(once.is_favorite);
    assert_eq!(once.updated_at, created.updated_at);

    let twice = store.toggle_favorite(&ctx(), id).await.expect("toggle");
    assert!(!twice.is_favorite);

    let err = store.toggle_favorite(&ctx(), Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

pub async fn update_overwrites_mutable_fields<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("Draft", "v1"))
        .await
        .expect("create");
    let original = store.get(&ctx(), id).await.expect("get");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let doc = json!({"type": "doc", "content": [{"type": "text", "text": "v2"}]});
    let mut update = NoteUpdate::new("Final", doc.clone())
        .with_text_content("v2")
        .favorite(true);
    update.created_at = Some(original.created_at - chrono::Duration::days(30));

    let updated = store.update(&ctx(), id, update).await.expect("update");
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.content, NoteContent::Document(doc));
    assert_eq!(updated.text_content.as_deref(), Some("v2"));
    assert!(updated.is_favorite);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);

    assert_eq!(store.get(&ctx(), id).await.expect("get").title, "Final");
}

pub async fn update_validates_like_create<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("Keep", "me"))
        .await
        .expect("create");

    let err = store
        .update(&ctx(), id, NoteUpdate::new(" ", "changed"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyTitle)));

    let err = store
        .update(&ctx(), id, NoteUpdate::new("Keep", json!(null)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyContent)));

    let note = store.get(&ctx(), id).await.expect("get");
    assert_eq!(note.title, "Keep");
    assert_eq!(note.content, NoteContent::text("me"));

    let err = store
        .update(&ctx(), Uuid::new_v4(), NoteUpdate::new("a", "b"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

pub async fn delete_is_final_and_idempotent<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("t", "c"))
        .await
        .expect("create");

    assert!(store.delete(&ctx(), id).await.expect("delete"));
    assert!(!store.delete(&ctx(), id).await.expect("second delete"));

    let err = store.get(&ctx(), id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

pub async fn structured_content_round_trips<S: NoteStore>(store: &S) {
    let doc = json!({
        "type": "doc",
        "content": [
            {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Plan"}]},
            {"type": "paragraph", "content": [{"type": "text", "text": "ünïcode ✓"}]}
        ]
    });
    let lookalike = NoteContent::text(r#"{"type":"doc"}"#);

    let doc_id = store
        .create(&ctx(), NewNote::new("doc", doc.clone()))
        .await
        .expect("create doc");
    let text_id = store
        .create(&ctx(), NewNote::new("text", lookalike.clone()))
        .await
        .expect("create text");

    assert_eq!(
        store.get(&ctx(), doc_id).await.expect("get").content,
        NoteContent::Document(doc)
    );
    assert_eq!(store.get(&ctx(), text_id).await.expect("get").content, lookalike);
}

pub async fn cancelled_context_writes_nothing<S: NoteStore>(store: &S) {
    let cancelled = OpContext::background();
    cancelled.cancel();

    let err = store
        .create(&cancelled, NewNote::new("t", "c"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Cancelled));
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    let id = store
        .create(&ctx(), NewNote::new("t", "c"))
        .await
        .expect("create");
    let err = store.toggle_favorite(&cancelled, id).await.unwrap_err();
    assert!(matches!(err, StoreError::Cancelled));

    let notes = store.list(&ctx()).await.expect("list");
    assert_eq!(notes.len(), 1);
    assert!(!notes[0].is_favorite);
}

/// Create, read, favorite, edit, delete: one note's whole life.
pub async fn groceries_walkthrough<S: NoteStore>(store: &S) {
    let id = store
        .create(&ctx(), NewNote::new("Groceries", "milk, eggs"))
        .await
        .expect("create");

    let note = store.get(&ctx(), id).await.expect("get");
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.content, NoteContent::text("milk, eggs"));
    assert!(!note.is_favorite);

    let note = store.toggle_favorite(&ctx(), id).await.expect("toggle");
    assert!(note.is_favorite);

    let edited = store
        .update(
            &ctx(),
            id,
            NoteUpdate::new("Groceries v2", "milk, eggs, bread").favorite(true),
        )
        .await
        .expect("update");
    assert_eq!(edited.content, NoteContent::text("milk, eggs, bread"));
    assert!(edited.updated_at >= note.updated_at);
    assert!(edited.is_favorite);

    assert!(store.delete(&ctx(), id).await.expect("delete"));
    let err = store.get(&ctx(), id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// `n` callers toggle the same note at once; no flip may be lost.
pub async fn concurrent_toggles_are_not_lost<S>(store: S, n: usize)
where
    S: NoteStore + Clone + 'static,
{
    let id = store
        .create(&ctx(), NewNote::new("contended", "c"))
        .await
        .expect("create");

    let handles: Vec<_> = (0..n)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.toggle_favorite(&OpContext::background(), id).await })
        })
        .collect();

    for handle in handles {
        handle.await.expect("join").expect("toggle");
    }

    let note = store.get(&ctx(), id).await.expect("get");
    assert_eq!(note.is_favorite, n % 2 == 1, "after {n} toggles");
}
