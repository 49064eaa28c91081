use crate::config::StoreConfig;
use crate::context::OpContext;
use crate::error::{StoreError, StoreResult};
use crate::note::{NewNote, Note, NoteContent, NoteId, NoteUpdate};
use crate::store::NoteStore;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteConnection, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Connection, Row, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

const NOTE_COLUMNS: &str =
    "id, content, title, is_favorite, created_at, updated_at, last_visited, text_content";

/// Note store backed by a SQLite database through an sqlx connection pool.
///
/// Cloning is cheap and shares the pool. Every operation is a single SQL
/// statement, so concurrent callers never observe or produce half-applied
/// changes. Writes run in a transaction that is only committed while the
/// caller's [`OpContext`] is still live.
#[derive(Debug, Clone)]
pub struct SqliteNoteStore {
    pool: SqlitePool,
}

impl SqliteNoteStore {
    /// Opens (creating if missing) the database named by `config.database_url`
    /// and makes sure the `notes` table exists.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if let Some(limit) = config.operation_timeout {
            pool_options = pool_options.acquire_timeout(limit);
        }

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;

        info!(url = %config.database_url, "note store connected");
        Ok(store)
    }

    /// Opens a database file at `path` with default pool settings.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let config = StoreConfig {
            database_url: format!("sqlite://{}", path.as_ref().display()),
            ..StoreConfig::default()
        };
        Self::connect(&config).await
    }

    /// A private database that lives as long as this store.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Runs one write statement in its own transaction and returns the row
    /// it produced, if any.
    ///
    /// The statement races the caller's token and deadline, and the
    /// transaction commits only if the caller is still waiting once it has
    /// finished. On every early return the transaction is dropped, which
    /// makes sqlx roll it back, so a statement the driver completes after
    /// the caller gave up is never made durable.
    async fn write_one<'q>(
        &self,
        ctx: &OpContext,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> StoreResult<Option<SqliteRow>> {
        let guard = ctx.start();

        let mut conn = guard.run(async { Ok(self.pool.acquire().await?) }).await?;
        let mut tx = conn.begin().await?;

        let executor: &mut SqliteConnection = &mut tx;
        let row = guard
            .run(async move { Ok(query.fetch_optional(executor).await?) })
            .await?;

        guard.check()?;
        tx.commit().await?;
        Ok(row)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY NOT NULL,
                content TEXT NOT NULL,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                is_favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_visited TEXT,
                text_content TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn create(&self, ctx: &OpContext, note: NewNote) -> StoreResult<NoteId> {
        let note = note.validated().inspect_err(|e| warn!(error = %e, "rejected new note"))?;
        let id = Uuid::new_v4();
        let now = stamp(Utc::now());
        let content = encode_content(&note.content)?;

        let query = sqlx::query(
            "INSERT INTO notes (id, content, title, is_favorite, created_at, updated_at, last_visited, text_content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?5, ?6) RETURNING id",
        )
        .bind(id.to_string())
        .bind(&content)
        .bind(&note.title)
        .bind(note.is_favorite)
        .bind(&now)
        .bind(&note.text_content);
        self.write_one(ctx, query).await?;

        info!(note_id = %id, "note created");
        Ok(id)
    }

    async fn list(&self, ctx: &OpContext) -> StoreResult<Vec<Note>> {
        let rows = ctx
            .run(async {
                let sql = format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY rowid");
                Ok(sqlx::query(&sql).fetch_all(&self.pool).await?)
            })
            .await?;

        debug!(count = rows.len(), "listed notes");
        rows.into_iter().map(map_note_row).collect()
    }

    async fn get(&self, ctx: &OpContext, id: NoteId) -> StoreResult<Note> {
        let now = stamp(Utc::now());
        let sql = format!(
            "UPDATE notes SET last_visited = MAX(COALESCE(last_visited, ''), ?2)
             WHERE id = ?1 RETURNING {NOTE_COLUMNS}"
        );
        let query = sqlx::query(&sql).bind(id.to_string()).bind(&now);

        let row = self.write_one(ctx, query).await?;

        debug!(note_id = %id, found = row.is_some(), "note visited");
        row.map(map_note_row).ok_or(StoreError::NotFound(id))?
    }

    async fn update(&self, ctx: &OpContext, id: NoteId, update: NoteUpdate) -> StoreResult<Note> {
        let update = update
            .validated()
            .inspect_err(|e| warn!(note_id = %id, error = %e, "rejected note update"))?;
        let now = stamp(Utc::now());
        let content = encode_content(&update.content)?;

        let sql = format!(
            "UPDATE notes SET
                content = ?2,
                title = ?3,
                is_favorite = ?4,
                text_content = ?5,
                updated_at = MAX(created_at, ?6),
                last_visited = MAX(COALESCE(last_visited, ''), ?6)
             WHERE id = ?1 RETURNING {NOTE_COLUMNS}"
        );
        let query = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(&content)
            .bind(&update.title)
            .bind(update.is_favorite)
            .bind(&update.text_content)
            .bind(&now);

        let row = self.write_one(ctx, query).await?;

        let note = row.map(map_note_row).ok_or(StoreError::NotFound(id))??;
        info!(note_id = %id, "note updated");
        Ok(note)
    }

    async fn toggle_favorite(&self, ctx: &OpContext, id: NoteId) -> StoreResult<Note> {
        let sql = format!(
            "UPDATE notes SET is_favorite = NOT is_favorite WHERE id = ?1 RETURNING {NOTE_COLUMNS}"
        );
        let query = sqlx::query(&sql).bind(id.to_string());

        let row = self.write_one(ctx, query).await?;

        let note = row.map(map_note_row).ok_or(StoreError::NotFound(id))??;
        info!(note_id = %id, is_favorite = note.is_favorite, "favorite toggled");
        Ok(note)
    }

    async fn delete(&self, ctx: &OpContext, id: NoteId) -> StoreResult<bool> {
        let query = sqlx::query("DELETE FROM notes WHERE id = ?1 RETURNING id").bind(id.to_string());

        let removed = self.write_one(ctx, query).await?.is_some();
        info!(note_id = %id, removed, "note deleted");
        Ok(removed)
    }
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_stamp(column: &str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow(format!("{column} = {value:?}: {e}")))
}

fn encode_content(content: &NoteContent) -> StoreResult<String> {
    Ok(content.to_stored()?)
}

fn map_note_row(row: SqliteRow) -> StoreResult<Note> {
    let id: String = row.try_get("id")?;
    let content: String = row.try_get("content")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let last_visited: Option<String> = row.try_get("last_visited")?;

    Ok(Note {
        id: Uuid::parse_str(&id).map_err(|e| StoreError::CorruptRow(format!("id = {id:?}: {e}")))?,
        title: row.try_get("title")?,
        content: NoteContent::from_stored(&content)
            .map_err(|e| StoreError::CorruptRow(format!("content: {e}")))?,
        text_content: row.try_get("text_content")?,
        is_favorite: row.try_get("is_favorite")?,
        created_at: parse_stamp("created_at", &created_at)?,
        updated_at: parse_stamp("updated_at", &updated_at)?,
        last_visited: last_visited
            .filter(|v| !v.is_empty())
            .map(|v| parse_stamp("last_visited", &v))
            .transpose()?,
    })
}
