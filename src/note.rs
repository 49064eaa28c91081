use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub type NoteId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("content is required")]
    EmptyContent,
}

/// Body of a note.
///
/// Clients send either plain text or a structured editor document. The store
/// never looks inside a document; it only needs to tell whether the body is
/// empty and to hand it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteContent {
    Text(String),
    Document(Value),
}

impl NoteContent {
    pub fn text(body: impl Into<String>) -> Self {
        NoteContent::Text(body.into())
    }

    pub fn document(doc: Value) -> Self {
        match doc {
            Value::String(s) => NoteContent::Text(s),
            other => NoteContent::Document(other),
        }
    }

    /// Returns `true` for whitespace-only text and for `null`, `{}`, `[]`
    /// or blank-string documents.
    pub fn is_empty(&self) -> bool {
        match self {
            NoteContent::Text(s) => s.trim().is_empty(),
            NoteContent::Document(Value::Null) => true,
            NoteContent::Document(Value::Object(map)) => map.is_empty(),
            NoteContent::Document(Value::Array(items)) => items.is_empty(),
            NoteContent::Document(Value::String(s)) => s.trim().is_empty(),
            NoteContent::Document(_) => false,
        }
    }

    /// Encodes the body as a single JSON value for storage.
    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_stored(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(raw).map(NoteContent::document)
    }
}

impl From<&str> for NoteContent {
    fn from(value: &str) -> Self {
        NoteContent::Text(value.to_owned())
    }
}

impl From<String> for NoteContent {
    fn from(value: String) -> Self {
        NoteContent::Text(value)
    }
}

impl From<Value> for NoteContent {
    fn from(value: Value) -> Self {
        NoteContent::document(value)
    }
}

/// A note as persisted by a [`NoteStore`](crate::store::NoteStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: NoteContent,
    pub text_content: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_visited: Option<DateTime<Utc>>,
}

/// Input for creating a note. Ids and timestamps are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub content: NoteContent,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<NoteContent>) -> Self {
        NewNote {
            title: title.into(),
            content: content.into(),
            text_content: None,
            is_favorite: false,
        }
    }

    pub fn with_text_content(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Checks the required fields and returns a copy with the title trimmed.
    pub fn validated(&self) -> Result<NewNote, ValidationError> {
        let title = valid_title(&self.title)?;
        valid_content(&self.content)?;

        Ok(NewNote {
            title,
            content: self.content.clone(),
            text_content: self.text_content.clone(),
            is_favorite: self.is_favorite,
        })
    }
}

/// Replacement values for every mutable field of a note.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub title: String,
    pub content: NoteContent,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Clients echo back the whole note, creation time included. It is never
    /// written: the stored `created_at` is immutable.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NoteUpdate {
    pub fn new(title: impl Into<String>, content: impl Into<NoteContent>) -> Self {
        NoteUpdate {
            title: title.into(),
            content: content.into(),
            text_content: None,
            is_favorite: false,
            created_at: None,
        }
    }

    pub fn with_text_content(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Same rules as [`NewNote::validated`].
    pub fn validated(&self) -> Result<NoteUpdate, ValidationError> {
        let title = valid_title(&self.title)?;
        valid_content(&self.content)?;

        Ok(NoteUpdate {
            title,
            ..self.clone()
        })
    }
}

impl From<&Note> for NoteUpdate {
    fn from(note: &Note) -> Self {
        NoteUpdate {
            title: note.title.clone(),
            content: note.content.clone(),
            text_content: note.text_content.clone(),
            is_favorite: note.is_favorite,
            created_at: Some(note.created_at),
        }
    }
}

/// Trims whitespace and ensures the title is not empty.
fn valid_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    Ok(trimmed.to_owned())
}

fn valid_content(content: &NoteContent) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}
