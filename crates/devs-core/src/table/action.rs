//! Gesture reducer: every user interaction with a table as one serializable action.

use serde::Deserialize;

use super::{Density, PinSide, TableError, TableRow, TableState};

/// A single user gesture. Deserialized from `{"type": "toggle_sort", ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableAction<K> {
    ToggleSort {
        column: String,
        #[serde(default)]
        multi: bool,
    },
    ClearSort,
    SetFilter {
        text: String,
    },
    MoveColumn {
        active: String,
        over: String,
    },
    MoveRow {
        active: K,
        over: K,
    },
    PinColumn {
        column: String,
        side: PinSide,
    },
    SetColumnVisibility {
        column: String,
        visible: bool,
    },
    ToggleRow {
        key: K,
    },
    TogglePage,
    ClearSelection,
    ToggleExpanded {
        key: K,
    },
    SetPage {
        index: usize,
    },
    NextPage,
    PreviousPage,
    SetPageSize {
        size: usize,
    },
    SetDensity {
        density: Density,
    },
}

/// Result of applying an action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome<T> {
    Changed,
    Unchanged,
    /// Manual row order changed; carries the full reordered data for the owner.
    RowsReordered(Vec<T>),
}

impl<T> ActionOutcome<T> {
    fn from_changed(changed: bool) -> Self {
        if changed {
            ActionOutcome::Changed
        } else {
            ActionOutcome::Unchanged
        }
    }
}

impl<T: TableRow> TableState<T> {
    /// Applies one gesture.
    pub fn apply(&mut self, action: TableAction<T::Key>) -> Result<ActionOutcome<T>, TableError> {
        let outcome = match action {
            TableAction::ToggleSort { column, multi } => {
                self.toggle_sort(&column, multi)?;
                ActionOutcome::Changed
            }
            TableAction::ClearSort => ActionOutcome::from_changed(self.clear_sort()),
            TableAction::SetFilter { text } => ActionOutcome::from_changed(self.set_filter(&text)?),
            TableAction::MoveColumn { active, over } => {
                ActionOutcome::from_changed(self.move_column(&active, &over)?)
            }
            TableAction::MoveRow { active, over } => match self.move_row(&active, &over)? {
                Some(rows) => ActionOutcome::RowsReordered(rows),
                None => ActionOutcome::Unchanged,
            },
            TableAction::PinColumn { column, side } => {
                ActionOutcome::from_changed(self.pin_column(&column, side)?)
            }
            TableAction::SetColumnVisibility { column, visible } => {
                ActionOutcome::from_changed(self.set_column_visibility(&column, visible)?)
            }
            TableAction::ToggleRow { key } => {
                self.toggle_row(&key)?;
                ActionOutcome::Changed
            }
            TableAction::TogglePage => {
                self.toggle_page()?;
                ActionOutcome::Changed
            }
            TableAction::ClearSelection => ActionOutcome::from_changed(self.clear_selection()),
            TableAction::ToggleExpanded { key } => {
                self.toggle_expanded(&key)?;
                ActionOutcome::Changed
            }
            TableAction::SetPage { index } => ActionOutcome::from_changed(self.set_page(index)?),
            TableAction::NextPage => ActionOutcome::from_changed(self.next_page()),
            TableAction::PreviousPage => ActionOutcome::from_changed(self.previous_page()),
            TableAction::SetPageSize { size } => {
                ActionOutcome::from_changed(self.set_page_size(size)?)
            }
            TableAction::SetDensity { density } => {
                ActionOutcome::from_changed(self.set_density(density))
            }
        };
        Ok(outcome)
    }
}
