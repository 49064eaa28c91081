use crate::context::OpContext;
use crate::error::{StoreError, StoreResult};
use crate::note::{NewNote, Note, NoteId, NoteUpdate};
use crate::store::NoteStore;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Note store kept entirely in process memory.
///
/// Every operation takes the map lock once and finishes before releasing it,
/// giving the same atomicity as the single-statement SQL backend. Clones share
/// the same notes.
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteStore {
    notes: Arc<RwLock<IndexMap<NoteId, Note>>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.read().is_empty()
    }
}

/// Matches the microsecond precision of the SQL backend.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create(&self, ctx: &OpContext, note: NewNote) -> StoreResult<NoteId> {
        let note = note.validated().inspect_err(|e| warn!(error = %e, "rejected new note"))?;

        let id = ctx
            .run(async move {
                let id = Uuid::new_v4();
                let at = now();
                let stored = Note {
                    id,
                    title: note.title,
                    content: note.content,
                    text_content: note.text_content,
                    is_favorite: note.is_favorite,
                    created_at: at,
                    updated_at: at,
                    last_visited: Some(at),
                };
                self.notes.write().insert(id, stored);
                Ok(id)
            })
            .await?;

        info!(note_id = %id, "note created");
        Ok(id)
    }

    async fn list(&self, ctx: &OpContext) -> StoreResult<Vec<Note>> {
        let notes = ctx
            .run(async { Ok(self.notes.read().values().cloned().collect::<Vec<_>>()) })
            .await?;

        debug!(count = notes.len(), "listed notes");
        Ok(notes)
    }

    async fn get(&self, ctx: &OpContext, id: NoteId) -> StoreResult<Note> {
        ctx.run(async {
            let mut notes = self.notes.write();
            let note = notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;

            let at = now();
            note.last_visited = Some(note.last_visited.map_or(at, |prev| prev.max(at)));
            Ok(note.clone())
        })
        .await
        .inspect(|_| debug!(note_id = %id, "note visited"))
    }

    async fn update(&self, ctx: &OpContext, id: NoteId, update: NoteUpdate) -> StoreResult<Note> {
        let update = update
            .validated()
            .inspect_err(|e| warn!(note_id = %id, error = %e, "rejected note update"))?;

        let note = ctx
            .run(async move {
                let mut notes = self.notes.write();
                let note = notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;

                let at = now();
                note.title = update.title;
                note.content = update.content;
                note.text_content = update.text_content;
                note.is_favorite = update.is_favorite;
                note.updated_at = note.created_at.max(at);
                note.last_visited = Some(note.last_visited.map_or(at, |prev| prev.max(at)));
                Ok(note.clone())
            })
            .await?;

        info!(note_id = %id, "note updated");
        Ok(note)
    }

    async fn toggle_favorite(&self, ctx: &OpContext, id: NoteId) -> StoreResult<Note> {
        let note = ctx
            .run(async {
                let mut notes = self.notes.write();
                let note = notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
                note.is_favorite = !note.is_favorite;
                Ok(note.clone())
            })
            .await?;

        info!(note_id = %id, is_favorite = note.is_favorite, "favorite toggled");
        Ok(note)
    }

    async fn delete(&self, ctx: &OpContext, id: NoteId) -> StoreResult<bool> {
        // shift_remove keeps the remaining notes in insertion order
        let removed = ctx
            .run(async { Ok(self.notes.write().shift_remove(&id).is_some()) })
            .await?;

        info!(note_id = %id, removed, "note deleted");
        Ok(removed)
    }
}
