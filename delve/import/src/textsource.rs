//! Localized text sources and the id manifest.
//!
//! Basic interface strings ship as bracket-tagged text files:
//!
//! ```text
//!   [MID_Yes]
//!   [English] Yes
//!   [French]  Oui
//! ```
//!
//! A group tag (any tag starting with `MID_`) names a message, a language
//! tag opens one translation, and text runs to the next tag. Literal
//! brackets are doubled (`[[` and `]]`); inside a tag a single `[` closes
//! the tag and starts the next one. A bracketed token in text that is
//! neither a group nor a language stays literal, brackets included. Text
//! is trimmed at both ends, so sources can be indented and spaced freely.
//!
//! Ids assigned to group names persist in a manifest file kept next to
//! the sources, so re-imports hand the same name the same id.

use std::collections::BTreeMap;
use std::io;
use std::iter::Peekable;
use std::path::Path;
use std::str::CharIndices;

use delve_common::{Language, MessageId};
use delve_store::{BASIC_MESSAGE_CEILING, Datastore};
use thiserror::Error;

/// Tag prefix marking a message group.
pub const GROUP_PREFIX: &str = "MID_";

/// Manifest file name, kept in the same directory as the sources.
pub const MANIFEST_FILE_NAME: &str = "message_ids.txt";

/// Errors from parsing text sources or their id manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextSourceError {
    #[error("empty tag at byte {0}")]
    EmptyTag(usize),

    #[error("unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),

    #[error("language tag [{0}] appears before any message group")]
    OrphanLanguage(String),

    #[error("text {0:?} appears before any language tag")]
    StrayText(String),

    #[error("manifest line {line}: {reason}")]
    Manifest { line: usize, reason: String },

    #[error("no free basic message id left for `{0}`")]
    BasicIdsExhausted(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for TextSourceError {
    fn from(err: io::Error) -> Self {
        TextSourceError::Io(err.to_string())
    }
}

/// One named message with its translations, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroup {
    /// Group name as written, prefix included, e.g. `MID_Yes`.
    pub name: String,
    pub texts: Vec<(Language, String)>,
}

enum TagEnd {
    Closed,
    /// A single `[` ended the tag; the next tag is already open.
    Reopened,
}

struct RawTag {
    body: String,
    end: TagEnd,
}

/// Parses one text-source file into its message groups.
pub fn parse_text_source(source: &str) -> Result<Vec<MessageGroup>, TextSourceError> {
    let mut groups: Vec<MessageGroup> = Vec::new();
    let mut language: Option<Language> = None;
    let mut text = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '[' => {
                if chars.next_if(|&(_, c)| c == '[').is_some() {
                    text.push('[');
                    continue;
                }
                loop {
                    let tag = read_tag(&mut chars, pos)?;
                    dispatch_tag(&mut groups, &mut language, &mut text, tag.body)?;
                    if matches!(tag.end, TagEnd::Closed) {
                        break;
                    }
                }
            }
            ']' => {
                // `]]` collapses; a lone `]` is already literal.
                chars.next_if(|&(_, c)| c == ']');
                text.push(']');
            }
            _ => text.push(ch),
        }
    }
    flush_text(&mut groups, language, &mut text)?;
    Ok(groups)
}

fn read_tag(
    chars: &mut Peekable<CharIndices<'_>>,
    open_pos: usize,
) -> Result<RawTag, TextSourceError> {
    let mut body = String::new();
    loop {
        match chars.next() {
            None => return Err(TextSourceError::UnterminatedTag(open_pos)),
            Some((_, ']')) => {
                if chars.next_if(|&(_, c)| c == ']').is_some() {
                    body.push(']');
                } else if body.trim().is_empty() {
                    return Err(TextSourceError::EmptyTag(open_pos));
                } else {
                    return Ok(RawTag { body, end: TagEnd::Closed });
                }
            }
            Some((_, '[')) => {
                if chars.next_if(|&(_, c)| c == '[').is_some() {
                    body.push('[');
                } else if body.trim().is_empty() {
                    return Err(TextSourceError::EmptyTag(open_pos));
                } else {
                    return Ok(RawTag { body, end: TagEnd::Reopened });
                }
            }
            Some((_, c)) => body.push(c),
        }
    }
}

fn dispatch_tag(
    groups: &mut Vec<MessageGroup>,
    language: &mut Option<Language>,
    text: &mut String,
    body: String,
) -> Result<(), TextSourceError> {
    let trimmed = body.trim();
    if trimmed.starts_with(GROUP_PREFIX) {
        flush_text(groups, *language, text)?;
        *language = None;
        groups.push(MessageGroup {
            name: trimmed.to_string(),
            texts: Vec::new(),
        });
    } else if let Some(tag_language) = Language::from_tag(trimmed) {
        flush_text(groups, *language, text)?;
        if groups.is_empty() {
            return Err(TextSourceError::OrphanLanguage(trimmed.to_string()));
        }
        *language = Some(tag_language);
    } else {
        // Not a tag we know: keep it as literal text.
        text.push('[');
        text.push_str(&body);
        text.push(']');
    }
    Ok(())
}

fn flush_text(
    groups: &mut Vec<MessageGroup>,
    language: Option<Language>,
    text: &mut String,
) -> Result<(), TextSourceError> {
    let trimmed = text.trim();
    match language {
        Some(language) => {
            if let Some(group) = groups.last_mut() {
                group.texts.push((language, trimmed.to_string()));
            }
        }
        None => {
            if !trimmed.is_empty() {
                return Err(TextSourceError::StrayText(trimmed.to_string()));
            }
        }
    }
    text.clear();
    Ok(())
}

/// Persistent name-to-id assignments for text-source groups.
///
/// Basic message ids sit below [`BASIC_MESSAGE_CEILING`]; the manifest
/// keeps them stable across re-imports so references held elsewhere (and
/// translations added later) keep pointing at the same message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdManifest {
    by_name: BTreeMap<String, MessageId>,
}

impl IdManifest {
    pub fn new() -> IdManifest {
        IdManifest::default()
    }

    /// Loads a manifest file, treating a missing file as empty.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<IdManifest, TextSourceError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => IdManifest::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(IdManifest::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Parses `name = id` lines. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<IdManifest, TextSourceError> {
        let mut by_name = BTreeMap::new();
        let mut used = BTreeMap::new();
        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let manifest_error = |reason: String| TextSourceError::Manifest {
                line: index + 1,
                reason,
            };
            let (name, id_text) = line
                .split_once('=')
                .ok_or_else(|| manifest_error("expected `name = id`".into()))?;
            let name = name.trim();
            let id_text = id_text.trim();
            if name.is_empty() {
                return Err(manifest_error("empty name".into()));
            }
            let id: MessageId = id_text
                .parse()
                .map_err(|_| manifest_error(format!("invalid id `{id_text}`")))?;
            if id == 0 || id >= BASIC_MESSAGE_CEILING {
                return Err(manifest_error(format!("id {id} outside the basic range")));
            }
            if let Some(other) = used.insert(id, name.to_string()) {
                return Err(manifest_error(format!(
                    "id {id} assigned to both `{other}` and `{name}`"
                )));
            }
            if by_name.insert(name.to_string(), id).is_some() {
                return Err(manifest_error(format!("duplicate name `{name}`")));
            }
        }
        Ok(IdManifest { by_name })
    }

    pub fn get(&self, name: &str) -> Option<MessageId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Returns the id for a name, assigning the next unused basic id to a
    /// name seen for the first time.
    pub fn id_for(&mut self, name: &str) -> Result<MessageId, TextSourceError> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        let next = self.by_name.values().copied().max().unwrap_or(0) + 1;
        if next >= BASIC_MESSAGE_CEILING {
            return Err(TextSourceError::BasicIdsExhausted(name.to_string()));
        }
        self.by_name.insert(name.to_string(), next);
        Ok(next)
    }

    /// Renders manifest lines in ascending id order.
    pub fn render(&self) -> String {
        let mut entries: Vec<(&String, MessageId)> = self
            .by_name
            .iter()
            .map(|(name, &id)| (name, id))
            .collect();
        entries.sort_by_key(|&(_, id)| id);
        let mut out = String::from("# Message ids for imported text groups.\n");
        for (name, id) in entries {
            out.push_str(&format!("{name} = {id}\n"));
        }
        out
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TextSourceError> {
        std::fs::write(path.as_ref(), self.render())?;
        Ok(())
    }
}

/// Installs parsed groups into the store under manifest-assigned ids.
/// Callers doing a full refresh clear the old basic messages first.
pub fn install_messages(
    store: &mut Datastore,
    groups: &[MessageGroup],
    manifest: &mut IdManifest,
) -> Result<(), TextSourceError> {
    for group in groups {
        let id = manifest.id_for(&group.name)?;
        for (language, text) in &group.texts {
            store.put_message_text(id, *language, text);
        }
    }
    Ok(())
}
