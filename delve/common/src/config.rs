use std::path::{Path, PathBuf};

use crate::ids::CollectionKind;
use crate::language::Language;

const DEFAULT_DATA_DIR_NAME: &str = "delve-data";

/// Configuration for opening or creating a data set.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the three collection files and their backups.
    pub data_dir: PathBuf,

    /// Language preferred by the message resolver.
    pub language: Language,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR_NAME),
            language: Language::default(),
        }
    }
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::default().with_data_dir(data_dir)
    }

    pub fn with_data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn collection_path(&self, collection: CollectionKind) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    pub fn backup_path(&self, collection: CollectionKind) -> PathBuf {
        self.data_dir.join(backup_file_name(collection.file_name()))
    }
}

/// Shadow-backup naming: the final character of the file name becomes `_`,
/// so `hold.dat` is shadowed by `hold.da_`.
pub fn backup_file_name(name: &str) -> String {
    let mut mangled = String::from(name);
    if mangled.pop().is_some() {
        mangled.push('_');
    }
    mangled
}
