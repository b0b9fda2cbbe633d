//! Column definitions: a closed set of column kinds with render/sort/filter behavior.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fmt::{FmtStyle, format_count, format_date};

/// Sort key types for table columns.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Empty,
    Integer(i64),
    Float(f64),
    String(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Integer(_) | SortKey::Float(_) => 1,
            SortKey::String(_) => 2,
        }
    }

    /// Total order over keys. Empty sorts before everything, numbers compare
    /// across integer/float, and mismatched kinds fall back to kind rank.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.total_cmp(b),
            (SortKey::Integer(a), SortKey::Float(b)) => (*a as f64).total_cmp(b),
            (SortKey::Float(a), SortKey::Integer(b)) => a.total_cmp(&(*b as f64)),
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Raw value of one cell, as exposed by a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(DateTime<Utc>),
    Tags(Vec<String>),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn opt_date(ts: Option<DateTime<Utc>>) -> Self {
        ts.map(CellValue::Date).unwrap_or(CellValue::Empty)
    }
}

/// Column kind: decides how a cell is rendered, sorted and matched by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum ColumnKind {
    /// Free text (titles, names, emails).
    Text,
    /// Counters and measurements.
    Number,
    /// Timestamps, rendered as dates.
    Date,
    /// Enumerated state (draft/published, admin/author), rendered capitalized.
    Status,
    /// List of labels.
    Tags,
}

impl ColumnKind {
    /// Default display width in pixels.
    pub fn default_width(self) -> u16 {
        match self {
            ColumnKind::Text => 240,
            ColumnKind::Number => 96,
            ColumnKind::Date => 128,
            ColumnKind::Status => 112,
            ColumnKind::Tags => 200,
        }
    }

    /// Display text for a cell.
    pub fn render(self, value: &CellValue) -> String {
        match (self, value) {
            (_, CellValue::Empty) => "-".to_string(),
            (ColumnKind::Status, CellValue::Text(s)) => capitalize(s),
            (_, CellValue::Text(s)) => s.clone(),
            (_, CellValue::Integer(n)) => format_count(*n, FmtStyle::Compact),
            (_, CellValue::Float(f)) => format!("{:.1}", f),
            (ColumnKind::Date, CellValue::Date(ts)) => format_date(*ts, FmtStyle::Compact),
            (_, CellValue::Date(ts)) => format_date(*ts, FmtStyle::Detail),
            (_, CellValue::Tags(tags)) => tags.join(", "),
        }
    }

    /// Sort key for a cell.
    pub fn sort_key(self, value: &CellValue) -> SortKey {
        match value {
            CellValue::Empty => SortKey::Empty,
            CellValue::Text(s) => SortKey::String(s.to_lowercase()),
            CellValue::Integer(n) => SortKey::Integer(*n),
            CellValue::Float(f) => SortKey::Float(*f),
            CellValue::Date(ts) => SortKey::Integer(ts.timestamp_millis()),
            CellValue::Tags(tags) => SortKey::String(tags.join(",").to_lowercase()),
        }
    }

    /// Lowercased text the free-text filter matches against.
    ///
    /// Numbers match on their full digits, not the compact rendering.
    pub fn filter_text(self, value: &CellValue) -> String {
        match value {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.to_lowercase(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Date(ts) => format_date(*ts, FmtStyle::Compact),
            CellValue::Tags(tags) => tags.join(" ").to_lowercase(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One column of a table: a named accessor with independently toggled capabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub id: String,
    pub header: String,
    pub kind: ColumnKind,
    /// Display width in pixels, used for pin offsets.
    pub width: u16,
    pub sortable: bool,
    /// The single column the free-text filter is bound to.
    pub searchable: bool,
    pub pinnable: bool,
    pub hideable: bool,
}

impl ColumnDef {
    pub fn new(id: impl Into<String>, header: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            kind,
            width: kind.default_width(),
            sortable: true,
            searchable: false,
            pinnable: true,
            hideable: true,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn unpinnable(mut self) -> Self {
        self.pinnable = false;
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.hideable = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sort_key_total_order() {
        assert_eq!(
            SortKey::Integer(2).compare(&SortKey::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            SortKey::Empty.compare(&SortKey::String("a".into())),
            Ordering::Less
        );
        assert_eq!(
            SortKey::String("b".into()).compare(&SortKey::String("a".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn render_by_kind() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(ColumnKind::Date.render(&CellValue::Date(ts)), "2024-03-01");
        assert_eq!(ColumnKind::Status.render(&CellValue::text("draft")), "Draft");
        assert_eq!(ColumnKind::Number.render(&CellValue::Integer(15_400)), "15.4K");
        assert_eq!(
            ColumnKind::Tags.render(&CellValue::Tags(vec!["rust".into(), "web".into()])),
            "rust, web"
        );
        assert_eq!(ColumnKind::Text.render(&CellValue::Empty), "-");
    }

    #[test]
    fn filter_text_uses_full_numbers() {
        assert_eq!(ColumnKind::Number.filter_text(&CellValue::Integer(15_400)), "15400");
        assert_eq!(ColumnKind::Text.filter_text(&CellValue::text("Hello")), "hello");
    }
}
