use delve_common::{Language, MessageId, MessageTextId, RecordId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// One language's text for one message. The row id (`id`) is unique per
/// row; `message_id` groups the languages of one logical message. At most
/// one row may exist per (message id, language) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTextRow {
    pub id: MessageTextId,
    pub message_id: MessageId,
    pub language: Language,
    /// UTF-16LE bytes, the encoding the text collection has always used.
    pub text: Vec<u8>,
}

impl Record for MessageTextRow {
    const SPEC: TableSpec = TableSpec {
        name: "MessageTexts",
        columns: &["MessageTextID", "MessageID", "Language", "Text"],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
