//! # jot_core
//!
//! Persistence core for a personal note-taking backend: create, list, read,
//! edit, favorite and delete notes held in a relational store.
//!
//! ## Features
//!
//! - **One contract, two backends**: the [`NoteStore`] trait, implemented by a
//!   SQLite store over an sqlx pool and by an in-memory store
//! - **Atomic read-modify-write**: favorite toggling and visit stamping are a
//!   single `UPDATE ... RETURNING` statement, so concurrent callers never lose updates
//! - **Cancellation and deadlines**: every call takes an [`OpContext`]
//! - **Typed failures**: [`StoreError`] separates validation, missing notes,
//!   storage failures and cancellation, each with a stable status code
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jot_core::{NewNote, NoteStore, OpContext, StoreConfig};
//! use jot_core::store::sqlite::SqliteNoteStore;
//!
//! # async fn run() -> Result<(), jot_core::StoreError> {
//! let config = StoreConfig::from_env()?;
//! let store = SqliteNoteStore::connect(&config).await?;
//! let ctx = config.op_context();
//!
//! let id = store.create(&ctx, NewNote::new("Groceries", "milk, eggs")).await?;
//! let note = store.toggle_favorite(&ctx, id).await?;
//! assert!(note.is_favorite);
//!
//! store.delete(&ctx, id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`StoreResult<T>`]. A request layer can branch on
//! [`StoreError::kind`] and use [`ErrorKind::status_code`] for its responses.
//!
//! ```rust
//! use jot_core::{ErrorKind, StoreError};
//!
//! fn status_for(err: &StoreError) -> u16 {
//!     err.kind().status_code()
//! }
//!
//! let missing = StoreError::NotFound(uuid::Uuid::new_v4());
//! assert_eq!(missing.kind(), ErrorKind::NotFound);
//! assert_eq!(status_for(&missing), 404);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod note;
pub mod store;

/// Re-exports the most commonly used types for convenience.
pub use config::StoreConfig;
pub use context::OpContext;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use note::{NewNote, Note, NoteContent, NoteId, NoteUpdate, ValidationError};
pub use store::NoteStore;
