//! Message text resolution and mutation.
//!
//! Texts are stored as UTF-16LE byte blobs, one row per (message id,
//! language). Resolution prefers the active language, falls back to
//! English, then to any row with the id, and finally to the empty string.
//! Every call returns an owned `String`; nothing here hands out references
//! into the row storage.

use delve_common::{EntityKind, Language, MessageId, MessageTextId};
use tracing::warn;

use crate::datastore::Datastore;
use crate::records::MessageTextRow;

/// Message ids below this value are "basic" application messages with fixed
/// ids installed from text sources. The message counter starts here so
/// allocated ids never collide with them.
pub const BASIC_MESSAGE_CEILING: MessageId = 10_000;

/// Longest stored text accepted on read, in bytes. Blobs beyond this are
/// treated as corrupted and truncated.
pub const MAX_MESSAGE_TEXT_BYTES: usize = 65_534;

/// Encodes text as the UTF-16LE blob the text collection stores.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// Decodes a stored UTF-16LE blob, replacing invalid sequences.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

impl Datastore {
    pub fn active_language(&self) -> Language {
        self.active_language
    }

    pub fn set_active_language(&mut self, language: Language) {
        self.active_language = language;
    }

    /// Resolves a message id to text: active language, then English, then
    /// any language, then the empty string.
    pub fn message_text(&self, message_id: MessageId) -> String {
        let rows = self.message_texts();
        let row = rows
            .iter()
            .find(|row| row.message_id == message_id && row.language == self.active_language)
            .or_else(|| {
                rows.iter()
                    .find(|row| row.message_id == message_id && row.language == Language::English)
            })
            .or_else(|| rows.iter().find(|row| row.message_id == message_id));

        match row {
            Some(row) => decode_row(row),
            None => String::new(),
        }
    }

    /// Allocates a new message id and stores `text` under the active
    /// language.
    pub fn add_message_text(&mut self, text: &str) -> MessageId {
        let message_id = self.next_id(EntityKind::Message);
        let language = self.active_language;
        self.put_message_text(message_id, language, text);
        message_id
    }

    /// Replaces the active-language text of a message. Returns `false`
    /// without touching the store when the new text is byte-identical to
    /// the stored one.
    pub fn change_message_text(&mut self, message_id: MessageId, text: &str) -> bool {
        let encoded = encode_utf16le(text);
        let existing = self
            .message_texts()
            .iter()
            .find(|row| row.message_id == message_id && row.language == self.active_language);
        if let Some(row) = existing {
            if row.text == encoded {
                return false;
            }
            let id = row.id;
            if let Some(row) = self.message_texts_mut().get_mut(id) {
                row.text = encoded;
            }
        } else {
            let language = self.active_language;
            self.put_message_text(message_id, language, text);
        }
        true
    }

    /// Removes every row of a message, all languages.
    pub fn delete_message(&mut self, message_id: MessageId) {
        let any = self
            .message_texts()
            .iter()
            .any(|row| row.message_id == message_id);
        if any {
            self.message_texts_mut()
                .retain(|row| row.message_id != message_id);
        }
    }

    /// Upserts the exact (message id, language) row, keeping the
    /// one-row-per-pair invariant. Returns the row id.
    pub fn put_message_text(
        &mut self,
        message_id: MessageId,
        language: Language,
        text: &str,
    ) -> MessageTextId {
        let encoded = encode_utf16le(text);
        let existing = self
            .message_texts()
            .iter()
            .find(|row| row.message_id == message_id && row.language == language)
            .map(|row| row.id);
        match existing {
            Some(id) => {
                if let Some(row) = self.message_texts_mut().get_mut(id) {
                    row.text = encoded;
                }
                id
            }
            None => {
                let id = self.next_id(EntityKind::MessageText);
                self.message_texts_mut().insert(MessageTextRow {
                    id,
                    message_id,
                    language,
                    text: encoded,
                });
                id
            }
        }
    }

    /// Removes every basic message (id below the ceiling), used before
    /// re-installing texts from sources.
    pub fn delete_basic_messages(&mut self) {
        let any = self
            .message_texts()
            .iter()
            .any(|row| row.message_id < BASIC_MESSAGE_CEILING);
        if any {
            self.message_texts_mut()
                .retain(|row| row.message_id >= BASIC_MESSAGE_CEILING);
        }
    }
}

fn decode_row(row: &MessageTextRow) -> String {
    let bytes = if row.text.len() > MAX_MESSAGE_TEXT_BYTES {
        warn!(
            message_id = row.message_id,
            len = row.text.len(),
            "stored message text exceeds the cap, truncating"
        );
        // Keep whole UTF-16 code units.
        &row.text[..MAX_MESSAGE_TEXT_BYTES & !1]
    } else {
        &row.text[..]
    };
    if bytes.len() % 2 != 0 {
        warn!(
            message_id = row.message_id,
            "stored message text has odd byte length"
        );
    }
    decode_utf16le(bytes)
}
