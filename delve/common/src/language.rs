use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages a message text row may carry. English doubles as the fallback
/// when the active language has no row for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    French,
    German,
    Dutch,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::French,
        Language::German,
        Language::Dutch,
        Language::Spanish,
    ];

    /// Tag spelling used by text-source files, e.g. `[French]`.
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
            Language::German => "German",
            Language::Dutch => "Dutch",
            Language::Spanish => "Spanish",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|language| language.tag() == tag)
    }

    /// Numeric code used by legacy data files. Zero is unused there.
    pub fn code(self) -> u8 {
        match self {
            Language::English => 1,
            Language::French => 2,
            Language::German => 3,
            Language::Dutch => 4,
            Language::Spanish => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Language> {
        Language::ALL.into_iter().find(|language| language.code() == code)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
