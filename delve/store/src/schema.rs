//! Schema descriptions.
//!
//! Each collection file carries a human-readable description of the tables
//! and columns it claims to contain, e.g.
//! `[Counters:Kind,LastId][Players:PlayerID,...]`. On open, the description
//! is tokenized and compared against the tables this build expects, so a
//! file whose layout drifted (or whose bytes rotted) is rejected before the
//! payload is decoded. Tokenization never indexes past a checked bound and
//! accepts only ASCII alphanumerics, `_`, and the four structural
//! characters.

use crate::file::{StoreFileError, StoreFileResult};

/// Compile-time description of one table: its name and column names, in
/// declaration order.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// A table parsed out of a schema description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDesc {
    pub name: String,
    pub columns: Vec<String>,
}

/// Renders the canonical description for a set of tables.
pub fn generate(tables: &[TableSpec]) -> String {
    let mut out = String::new();
    for table in tables {
        out.push('[');
        out.push_str(table.name);
        out.push(':');
        for (index, column) in table.columns.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            out.push_str(column);
        }
        out.push(']');
    }
    out
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Tokenizes a schema description into tables.
///
/// A table with zero columns, an empty name or column, characters outside
/// the allowed set, or an unterminated bracket all fail tokenization.
pub fn tokenize(description: &str) -> StoreFileResult<Vec<TableDesc>> {
    enum State {
        Outside,
        Name,
        Columns,
    }

    let mut tables = Vec::new();
    let mut state = State::Outside;
    let mut name = String::new();
    let mut columns: Vec<String> = Vec::new();
    let mut column = String::new();

    for ch in description.chars() {
        match state {
            State::Outside => match ch {
                '[' => {
                    name.clear();
                    state = State::Name;
                }
                _ => {
                    return Err(StoreFileError::Schema(format!(
                        "unexpected character {ch:?} outside a table"
                    )));
                }
            },
            State::Name => match ch {
                ':' => {
                    if name.is_empty() {
                        return Err(StoreFileError::Schema("empty table name".into()));
                    }
                    columns = Vec::new();
                    column = String::new();
                    state = State::Columns;
                }
                ']' => {
                    return Err(StoreFileError::Schema(format!(
                        "table `{name}` declares no columns"
                    )));
                }
                _ if is_name_char(ch) => name.push(ch),
                _ => {
                    return Err(StoreFileError::Schema(format!(
                        "unexpected character {ch:?} in table name"
                    )));
                }
            },
            State::Columns => match ch {
                ',' => {
                    if column.is_empty() {
                        return Err(StoreFileError::Schema(format!(
                            "empty column name in table `{name}`"
                        )));
                    }
                    columns.push(std::mem::take(&mut column));
                }
                ']' => {
                    if column.is_empty() {
                        return Err(StoreFileError::Schema(format!(
                            "empty column name in table `{name}`"
                        )));
                    }
                    columns.push(std::mem::take(&mut column));
                    tables.push(TableDesc {
                        name: std::mem::take(&mut name),
                        columns: std::mem::take(&mut columns),
                    });
                    state = State::Outside;
                }
                _ if is_name_char(ch) => column.push(ch),
                _ => {
                    return Err(StoreFileError::Schema(format!(
                        "unexpected character {ch:?} in column name"
                    )));
                }
            },
        }
    }

    if !matches!(state, State::Outside) {
        return Err(StoreFileError::Schema("unterminated table".into()));
    }

    Ok(tables)
}

/// Tokenizes a description and compares it against the expected tables.
pub fn validate(description: &str, expected: &[TableSpec]) -> StoreFileResult<()> {
    let found = tokenize(description)?;

    let matches = found.len() == expected.len()
        && found.iter().zip(expected).all(|(desc, spec)| {
            desc.name == spec.name
                && desc.columns.len() == spec.columns.len()
                && desc.columns.iter().zip(spec.columns).all(|(a, b)| a == b)
        });

    if !matches {
        return Err(StoreFileError::SchemaMismatch {
            expected: generate(expected),
            found: description.to_string(),
        });
    }
    Ok(())
}
