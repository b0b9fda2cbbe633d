//! Sort state: an ordered list of (column, direction) pairs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortEntry {
    pub column: String,
    pub direction: SortDirection,
}

/// Multi-column sort state. Earlier entries take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    entries: Vec<SortEntry>,
}

impl SortState {
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.direction)
    }

    /// Header click: cycles the column through ascending -> descending -> none.
    ///
    /// Without `multi` the column replaces every other sort entry; with `multi`
    /// it is updated in place or appended. Returns the column's new direction.
    pub fn toggle(&mut self, column: &str, multi: bool) -> Option<SortDirection> {
        let next = match self.direction_of(column) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };

        if multi {
            match (next, self.entries.iter().position(|e| e.column == column)) {
                (Some(direction), Some(idx)) => self.entries[idx].direction = direction,
                (Some(direction), None) => self.entries.push(SortEntry {
                    column: column.to_string(),
                    direction,
                }),
                (None, Some(idx)) => {
                    self.entries.remove(idx);
                }
                (None, None) => {}
            }
        } else {
            self.entries.clear();
            if let Some(direction) = next {
                self.entries.push(SortEntry {
                    column: column.to_string(),
                    direction,
                });
            }
        }
        next
    }

    /// Drops any entry for `column` (e.g. when it gets hidden).
    pub fn remove(&mut self, column: &str) {
        self.entries.retain(|e| e.column != column);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
