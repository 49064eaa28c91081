//! The note persistence contract and its backends.
//!
//! [`NoteStore`] is what a request layer holds on to. Each method performs one
//! unit of work against the backing store and returns the result or a typed
//! [`StoreError`](crate::error::StoreError). Implementations are `Send + Sync`
//! and need no locking on the caller's side.
//!
//! - [`sqlite::SqliteNoteStore`]: relational backend over an sqlx pool.
//! - [`memory::MemoryNoteStore`]: in-process backend for tests and embedding.

pub mod memory;
pub mod sqlite;

use crate::context::OpContext;
use crate::error::StoreResult;
use crate::note::{NewNote, Note, NoteId, NoteUpdate};
use async_trait::async_trait;

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persists a new note and returns its store-assigned id.
    ///
    /// # Errors
    /// - [`StoreError::Validation`](crate::error::StoreError::Validation) if the
    ///   title or content is empty; nothing is written.
    /// - [`StoreError::Storage`](crate::error::StoreError::Storage) on backend failure.
    async fn create(&self, ctx: &OpContext, note: NewNote) -> StoreResult<NoteId>;

    /// Returns every note in insertion order. An empty store yields an empty vector.
    async fn list(&self, ctx: &OpContext) -> StoreResult<Vec<Note>>;

    /// Returns one note and stamps its `last_visited` in the same atomic step.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`](crate::error::StoreError::NotFound) if no note has this id.
    async fn get(&self, ctx: &OpContext, id: NoteId) -> StoreResult<Note>;

    /// Overwrites title, content, text content and favorite flag, refreshing
    /// `updated_at`. Validation matches [`create`](Self::create).
    async fn update(&self, ctx: &OpContext, id: NoteId, update: NoteUpdate) -> StoreResult<Note>;

    /// Flips `is_favorite` atomically and returns the note as stored afterwards.
    ///
    /// Not safe to retry blindly: every successful call flips the flag again.
    async fn toggle_favorite(&self, ctx: &OpContext, id: NoteId) -> StoreResult<Note>;

    /// Removes a note permanently.
    ///
    /// Idempotent: returns `Ok(false)` when nothing matched `id`.
    async fn delete(&self, ctx: &OpContext, id: NoteId) -> StoreResult<bool>;
}
