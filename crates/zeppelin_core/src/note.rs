use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::ParagraphResult;

/// Point-in-time view of a note and all of its paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResult {
    pub note_id: String,
    /// Reported by the server under `info.isRunning`. Not derived from the
    /// paragraph statuses.
    pub is_running: bool,
    pub paragraph_results: Vec<ParagraphResult>,
}

impl NoteResult {
    /// Decode the body of a note query. The id is the one the caller asked
    /// for, since the body is not guaranteed to echo it.
    pub fn from_json(note_id: impl Into<String>, note: &Value) -> Self {
        let is_running = note
            .get("info")
            .and_then(|info| info.get("isRunning"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let paragraph_results = note
            .get("paragraphs")
            .and_then(Value::as_array)
            .map(|paragraphs| paragraphs.iter().map(ParagraphResult::from_json).collect())
            .unwrap_or_default();

        Self {
            note_id: note_id.into(),
            is_running,
            paragraph_results,
        }
    }
}

impl fmt::Display for NoteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NoteResult{{noteId='{}', isRunning='{}', paragraphResults=[",
            self.note_id, self.is_running
        )?;
        for (index, paragraph) in self.paragraph_results.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{paragraph}")?;
        }
        f.write_str("]}")
    }
}
