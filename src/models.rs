use std::collections::BTreeMap;

use serde::Serialize;

/// Column name to raw string value, exactly as read from the source
/// (post decode repair and trim, pre any typed coercion).
pub type RawFields = BTreeMap<String, String>;

#[derive(Clone, Debug)]
pub struct RawRecord {
    /// 1-based line number of the row in the source file.
    pub line: u64,
    pub fields: RawFields,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Director,
    Actor,
    Genre,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Director => "director",
            EntityKind::Actor => "actor",
            EntityKind::Genre => "genre",
        }
    }
}

/// A source row after field normalization: typed movie columns plus the
/// still-raw entity name lists, ready for resolution.
#[derive(Clone, Debug)]
pub struct NormalizedMovie {
    pub movie_id: String,
    pub title: String,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub rating: Option<f64>,
    pub gross: Option<f64>,
    pub runtime_min: Option<i32>,
    pub description: Option<String>,
    pub raw_row: serde_json::Value,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedEntity {
    pub id: String,
    /// First-seen display casing.
    pub name: String,
}

/// Resolved association targets for one movie. Actor order is billing order.
#[derive(Clone, Debug, Default)]
pub struct MovieLinks {
    pub directors: Vec<ResolvedEntity>,
    pub actors: Vec<ResolvedEntity>,
    pub genres: Vec<ResolvedEntity>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RunSummary {
    pub read: u64,
    pub skipped: u64,
    pub failed: u64,
    pub loaded: u64,
}
