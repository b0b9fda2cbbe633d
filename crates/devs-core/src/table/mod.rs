//! Generic table state: ordering, pinning, selection, sorting, filtering, paging.
//!
//! `TableState<T>` is renderer-agnostic. A frontend feeds it gestures (header clicks,
//! drags, checkbox toggles) and renders [`TableView`] projections of it. Nothing here is
//! persisted: state lives from `new` + `set_data` until the owner drops it.

mod action;
mod column;
mod drag;
mod order;
mod paging;
mod pin;
mod sort;
mod view;

pub use action::{ActionOutcome, TableAction};
pub use column::{CellValue, ColumnDef, ColumnKind, SortKey};
pub use drag::{
    ActiveDrag, DragGesture, DragKind, GestureEnd, POINTER_ACTIVATION_DISTANCE, Point,
    SensorKind, TOUCH_ACTIVATION_DELAY_MS, TOUCH_TOLERANCE,
};
pub use order::Order;
pub use paging::{PAGE_SIZES, Pagination};
pub use pin::{PINNED_Z_INDEX, PinSide, Placement, ShadowEdge, layout};
pub use sort::{SortDirection, SortEntry, SortState};
pub use view::{HeaderView, PageInfo, PageSelection, RowView, TableView};

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trait for table row items.
pub trait TableRow: Clone {
    /// Stable identity used for selection, expansion and row ordering.
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    fn key(&self) -> Self::Key;

    /// Raw cell value for the column with the given id.
    fn cell(&self, column: &str) -> CellValue;

    /// Content shown when the row is expanded. Rows without detail cannot expand.
    fn detail(&self) -> Option<String> {
        None
    }
}

/// Features enabled for a table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub row_drag: bool,
    pub column_drag: bool,
    pub selection: bool,
    pub expansion: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            row_drag: true,
            column_drag: true,
            selection: true,
            expansion: true,
        }
    }
}

/// Row height preset. Presentation only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum Density {
    Compact,
    #[default]
    Normal,
    Spacious,
}

impl Density {
    /// Row height in pixels.
    pub fn row_height(self) -> u16 {
        match self {
            Density::Compact => 32,
            Density::Normal => 44,
            Density::Spacious => 56,
        }
    }
}

/// Error returned for gestures the table cannot honor. State is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    UnknownColumn(String),
    /// Row key not present (or, for selection, not on the current page).
    UnknownRow(String),
    /// Pinned columns can neither be dragged nor be drop targets.
    ColumnPinned(String),
    ColumnNotSortable(String),
    ColumnNotPinnable(String),
    ColumnNotHideable(String),
    /// Hidden columns cannot be sorted.
    ColumnHidden(String),
    /// Manual row order is suspended while a sort is active.
    SortActive,
    /// Another drag is already active.
    DragInProgress,
    NoActiveDrag,
    FeatureDisabled(&'static str),
    InvalidPageSize(usize),
    PageOutOfRange(usize),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::UnknownColumn(c) => write!(f, "unknown column: {}", c),
            TableError::UnknownRow(k) => write!(f, "unknown row: {}", k),
            TableError::ColumnPinned(c) => write!(f, "column {} is pinned", c),
            TableError::ColumnNotSortable(c) => write!(f, "column {} is not sortable", c),
            TableError::ColumnNotPinnable(c) => write!(f, "column {} cannot be pinned", c),
            TableError::ColumnNotHideable(c) => write!(f, "column {} cannot be hidden", c),
            TableError::ColumnHidden(c) => write!(f, "column {} is hidden", c),
            TableError::SortActive => write!(f, "rows cannot be reordered while sorted"),
            TableError::DragInProgress => write!(f, "another drag is in progress"),
            TableError::NoActiveDrag => write!(f, "no drag in progress"),
            TableError::FeatureDisabled(feature) => write!(f, "{} is disabled", feature),
            TableError::InvalidPageSize(n) => write!(f, "unsupported page size: {}", n),
            TableError::PageOutOfRange(i) => write!(f, "page {} out of range", i),
        }
    }
}

impl std::error::Error for TableError {}

/// State for a generic data table.
#[derive(Debug, Clone)]
pub struct TableState<T: TableRow> {
    columns: Vec<ColumnDef>,
    options: TableOptions,
    /// Rows in input order.
    rows: Vec<T>,
    /// Row key -> index into `rows`.
    index: HashMap<T::Key, usize>,
    column_order: Order<String>,
    row_order: Order<T::Key>,
    sort: SortState,
    /// Lowercased filter text.
    filter: Option<String>,
    search_column: Option<String>,
    pins: HashMap<String, PinSide>,
    hidden: HashSet<String>,
    selection: HashSet<T::Key>,
    expanded: HashSet<T::Key>,
    pagination: Pagination,
    density: Density,
    drag: Option<ActiveDrag<T::Key>>,
}

impl<T: TableRow> TableState<T> {
    pub fn new(columns: Vec<ColumnDef>, options: TableOptions) -> Self {
        let column_order = Order::new(columns.iter().map(|c| c.id.clone()));
        let search_column = columns.iter().find(|c| c.searchable).map(|c| c.id.clone());
        Self {
            columns,
            options,
            rows: Vec::new(),
            index: HashMap::new(),
            column_order,
            row_order: Order::default(),
            sort: SortState::default(),
            filter: None,
            search_column,
            pins: HashMap::new(),
            hidden: HashSet::new(),
            selection: HashSet::new(),
            expanded: HashSet::new(),
            pagination: Pagination::default(),
            density: Density::default(),
            drag: None,
        }
    }

    /// Table with initial rows.
    pub fn with_rows(columns: Vec<ColumnDef>, options: TableOptions, rows: Vec<T>) -> Self {
        let mut table = Self::new(columns, options);
        table.set_data(rows);
        table
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replaces the row data (parent-supplied data change).
    ///
    /// Clears the selection, keeps the manual row order for rows that survived,
    /// and drops expansion state of rows that disappeared.
    pub fn set_data(&mut self, rows: Vec<T>) {
        let keys: Vec<T::Key> = rows.iter().map(|r| r.key()).collect();
        self.index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        self.row_order.reconcile(&keys);
        self.rows = rows;
        self.selection.clear();
        let index = &self.index;
        self.expanded.retain(|k| index.contains_key(k));
        self.sync();
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    // -------------------------------------------------------------------------
    // Column access
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id == id)
    }

    fn require_column(&self, id: &str) -> Result<&ColumnDef, TableError> {
        self.column(id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    /// Column ids in current left-to-right order (hidden ones included).
    pub fn column_order(&self) -> &[String] {
        self.column_order.keys()
    }

    /// Visible columns in column order (pinning not applied).
    pub fn visible_columns(&self) -> Vec<&ColumnDef> {
        self.column_order
            .keys()
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .filter_map(|id| self.column(id))
            .collect()
    }

    pub fn pin_side(&self, column: &str) -> PinSide {
        self.pins.get(column).copied().unwrap_or_default()
    }

    /// Whether the column can be picked up or dropped onto.
    pub fn is_column_draggable(&self, column: &str) -> bool {
        self.options.column_drag && self.column(column).is_some() && !self.pin_side(column).is_pinned()
    }

    // -------------------------------------------------------------------------
    // Sorting and filtering
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Header click on a sortable column. Returns the column's new direction.
    pub fn toggle_sort(
        &mut self,
        column: &str,
        multi: bool,
    ) -> Result<Option<SortDirection>, TableError> {
        if !self.require_column(column)?.sortable {
            return Err(TableError::ColumnNotSortable(column.to_string()));
        }
        if !self.is_column_visible(column) {
            return Err(TableError::ColumnHidden(column.to_string()));
        }
        let direction = self.sort.toggle(column, multi);
        self.sync();
        Ok(direction)
    }

    pub fn clear_sort(&mut self) -> bool {
        if !self.sort.is_active() {
            return false;
        }
        self.sort.clear();
        self.sync();
        true
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn search_column(&self) -> Option<&str> {
        self.search_column.as_deref()
    }

    /// Sets the free-text filter on the searchable column. Blank text clears it.
    /// Any change resets paging to the first page.
    pub fn set_filter(&mut self, text: &str) -> Result<bool, TableError> {
        if self.search_column.is_none() {
            return Err(TableError::FeatureDisabled("filter"));
        }
        let text = text.trim();
        let next = (!text.is_empty()).then(|| text.to_lowercase());
        if next == self.filter {
            return Ok(false);
        }
        self.filter = next;
        self.pagination.page_index = 0;
        self.sync();
        Ok(true)
    }

    fn matches_filter(&self, row: &T) -> bool {
        match (&self.filter, &self.search_column) {
            (Some(needle), Some(column)) => {
                let kind = self
                    .column(column)
                    .map(|c| c.kind)
                    .unwrap_or(ColumnKind::Text);
                kind.filter_text(&row.cell(column)).contains(needle.as_str())
            }
            _ => true,
        }
    }

    /// Rows in display order: sorted when a sort is active (ties keep the manual
    /// order), manual row order otherwise; then filtered.
    pub fn filtered_rows(&self) -> Vec<&T> {
        let ordered = self
            .row_order
            .keys()
            .iter()
            .filter_map(|k| self.index.get(k))
            .map(|&i| &self.rows[i])
            .filter(|row| self.matches_filter(row));

        if !self.sort.is_active() {
            return ordered.collect();
        }

        let specs: Vec<(&str, ColumnKind, SortDirection)> = self
            .sort
            .entries()
            .iter()
            .filter_map(|e| {
                self.column(&e.column)
                    .map(|c| (c.id.as_str(), c.kind, e.direction))
            })
            .collect();

        let mut keyed: Vec<(Vec<SortKey>, &T)> = ordered
            .map(|row| {
                let keys = specs
                    .iter()
                    .map(|(id, kind, _)| kind.sort_key(&row.cell(id)))
                    .collect();
                (keys, row)
            })
            .collect();

        keyed.sort_by(|a, b| {
            for (i, (_, _, direction)) in specs.iter().enumerate() {
                let cmp = a.0[i].compare(&b.0[i]);
                let cmp = match direction {
                    SortDirection::Asc => cmp,
                    SortDirection::Desc => cmp.reverse(),
                };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });

        keyed.into_iter().map(|(_, row)| row).collect()
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<&T> {
        let rows = self.filtered_rows();
        let range = self.pagination.range(rows.len());
        rows[range].to_vec()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered_rows().len())
    }

    pub fn next_page(&mut self) -> bool {
        if !self.pagination.can_next(self.filtered_rows().len()) {
            return false;
        }
        self.pagination.page_index += 1;
        self.sync();
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.pagination.can_previous() {
            return false;
        }
        self.pagination.page_index -= 1;
        self.sync();
        true
    }

    pub fn set_page(&mut self, index: usize) -> Result<bool, TableError> {
        let count = self.page_count();
        if index >= count.max(1) {
            return Err(TableError::PageOutOfRange(index));
        }
        if index == self.pagination.page_index {
            return Ok(false);
        }
        self.pagination.page_index = index;
        self.sync();
        Ok(true)
    }

    /// Changes the page size, keeping the first row of the current page visible.
    pub fn set_page_size(&mut self, size: usize) -> Result<bool, TableError> {
        if !PAGE_SIZES.contains(&size) {
            return Err(TableError::InvalidPageSize(size));
        }
        if size == self.pagination.page_size {
            return Ok(false);
        }
        let first_row = self.pagination.page_index * self.pagination.page_size;
        self.pagination.page_size = size;
        self.pagination.page_index = first_row / size;
        self.sync();
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Selection and expansion
    // -------------------------------------------------------------------------

    pub fn selection(&self) -> &HashSet<T::Key> {
        &self.selection
    }

    pub fn is_selected(&self, key: &T::Key) -> bool {
        self.selection.contains(key)
    }

    /// Selected rows in display order.
    pub fn selected_rows(&self) -> Vec<&T> {
        self.page_rows()
            .into_iter()
            .filter(|r| self.selection.contains(&r.key()))
            .collect()
    }

    /// Toggles one row of the current page. Returns its new selected state.
    pub fn toggle_row(&mut self, key: &T::Key) -> Result<bool, TableError> {
        if !self.options.selection {
            return Err(TableError::FeatureDisabled("selection"));
        }
        if !self.page_rows().iter().any(|r| &r.key() == key) {
            return Err(TableError::UnknownRow(key.to_string()));
        }
        if self.selection.remove(key) {
            Ok(false)
        } else {
            self.selection.insert(key.clone());
            Ok(true)
        }
    }

    /// Header checkbox: selects every row of the page unless all are already selected,
    /// in which case the page is deselected.
    pub fn toggle_page(&mut self) -> Result<PageSelection, TableError> {
        if !self.options.selection {
            return Err(TableError::FeatureDisabled("selection"));
        }
        let keys: Vec<T::Key> = self.page_rows().iter().map(|r| r.key()).collect();
        if self.page_selection() == PageSelection::All {
            for key in &keys {
                self.selection.remove(key);
            }
        } else {
            self.selection.extend(keys);
        }
        Ok(self.page_selection())
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = !self.selection.is_empty();
        self.selection.clear();
        changed
    }

    /// Tri-state of the header checkbox for the current page.
    pub fn page_selection(&self) -> PageSelection {
        let page = self.page_rows();
        let selected = page
            .iter()
            .filter(|r| self.selection.contains(&r.key()))
            .count();
        if selected == 0 {
            PageSelection::None
        } else if selected == page.len() {
            PageSelection::All
        } else {
            PageSelection::Some
        }
    }

    pub fn is_expanded(&self, key: &T::Key) -> bool {
        self.expanded.contains(key)
    }

    /// Toggles the detail panel of a row. Returns the new expanded state.
    pub fn toggle_expanded(&mut self, key: &T::Key) -> Result<bool, TableError> {
        if !self.options.expansion {
            return Err(TableError::FeatureDisabled("expansion"));
        }
        let row = self
            .row(key)
            .ok_or_else(|| TableError::UnknownRow(key.to_string()))?;
        if row.detail().is_none() {
            return Err(TableError::FeatureDisabled("expansion"));
        }
        if self.expanded.remove(key) {
            Ok(false)
        } else {
            self.expanded.insert(key.clone());
            Ok(true)
        }
    }

    // -------------------------------------------------------------------------
    // Columns: pinning and visibility
    // -------------------------------------------------------------------------

    /// Pins (or unpins with [`PinSide::None`]) a column.
    pub fn pin_column(&mut self, column: &str, side: PinSide) -> Result<bool, TableError> {
        let def = self.require_column(column)?;
        if side.is_pinned() && !def.pinnable {
            return Err(TableError::ColumnNotPinnable(column.to_string()));
        }
        if matches!(&self.drag, Some(ActiveDrag::Column(c)) if c == column) {
            return Err(TableError::DragInProgress);
        }
        if self.pin_side(column) == side {
            return Ok(false);
        }
        if side.is_pinned() {
            self.pins.insert(column.to_string(), side);
        } else {
            self.pins.remove(column);
        }
        Ok(true)
    }

    pub fn is_column_visible(&self, column: &str) -> bool {
        !self.hidden.contains(column)
    }

    /// Shows or hides a column. Hiding drops any sort on it.
    pub fn set_column_visibility(&mut self, column: &str, visible: bool) -> Result<bool, TableError> {
        let def = self.require_column(column)?;
        if !visible && !def.hideable {
            return Err(TableError::ColumnNotHideable(column.to_string()));
        }
        let changed = if visible {
            self.hidden.remove(column)
        } else {
            self.hidden.insert(column.to_string())
        };
        if changed && !visible {
            self.sort.remove(column);
            self.sync();
        }
        Ok(changed)
    }

    // -------------------------------------------------------------------------
    // Drag and drop
    // -------------------------------------------------------------------------

    pub fn active_drag(&self) -> Option<&ActiveDrag<T::Key>> {
        self.drag.as_ref()
    }

    /// Picks up a column header or a row handle.
    pub fn begin_drag(&mut self, drag: ActiveDrag<T::Key>) -> Result<(), TableError> {
        if self.drag.is_some() {
            return Err(TableError::DragInProgress);
        }
        match &drag {
            ActiveDrag::Column(column) => {
                if !self.options.column_drag {
                    return Err(TableError::FeatureDisabled("column drag"));
                }
                self.require_column(column)?;
                if self.pin_side(column).is_pinned() {
                    return Err(TableError::ColumnPinned(column.clone()));
                }
            }
            ActiveDrag::Row(key) => {
                if !self.options.row_drag {
                    return Err(TableError::FeatureDisabled("row drag"));
                }
                if self.sort.is_active() {
                    return Err(TableError::SortActive);
                }
                if !self.index.contains_key(key) {
                    return Err(TableError::UnknownRow(key.to_string()));
                }
            }
        }
        self.drag = Some(drag);
        Ok(())
    }

    /// Abandons the active drag (escape key, drop outside any target).
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Drops the dragged column over `over`. Returns `false` for a drop onto itself.
    /// A rejected target keeps the drag active.
    pub fn drop_column(&mut self, over: &str) -> Result<bool, TableError> {
        let active = match &self.drag {
            Some(ActiveDrag::Column(c)) => c.clone(),
            Some(ActiveDrag::Row(_)) => return Err(TableError::DragInProgress),
            None => return Err(TableError::NoActiveDrag),
        };
        self.require_column(over)?;
        if self.pin_side(over).is_pinned() {
            return Err(TableError::ColumnPinned(over.to_string()));
        }
        self.drag = None;
        Ok(self.column_order.move_key(&active, &over.to_string()))
    }

    /// Drops the dragged row over `over`.
    ///
    /// Returns the full reordered data when the order changed. Keys that are no
    /// longer part of the data are filtered out and make the drop a no-op. A drop
    /// rejected because of an active sort keeps the drag.
    pub fn drop_row(&mut self, over: &T::Key) -> Result<Option<Vec<T>>, TableError> {
        let active = match &self.drag {
            Some(ActiveDrag::Row(k)) => k.clone(),
            Some(ActiveDrag::Column(_)) => return Err(TableError::DragInProgress),
            None => return Err(TableError::NoActiveDrag),
        };
        if self.sort.is_active() {
            return Err(TableError::SortActive);
        }
        self.drag = None;

        let current: Vec<T::Key> = self.rows.iter().map(|r| r.key()).collect();
        self.row_order.reconcile(&current);
        if !self.row_order.move_key(&active, over) {
            return Ok(None);
        }
        debug!(active = %active, over = %over, "row order changed");
        self.sync();
        Ok(Some(self.ordered_data()))
    }

    /// Convenience for a complete column drag: pick up `active`, drop over `over`.
    pub fn move_column(&mut self, active: &str, over: &str) -> Result<bool, TableError> {
        self.begin_drag(ActiveDrag::Column(active.to_string()))?;
        let result = self.drop_column(over);
        if result.is_err() {
            self.drag = None;
        }
        result
    }

    /// Convenience for a complete row drag: pick up `active`, drop over `over`.
    pub fn move_row(&mut self, active: &T::Key, over: &T::Key) -> Result<Option<Vec<T>>, TableError> {
        self.begin_drag(ActiveDrag::Row(active.clone()))?;
        let result = self.drop_row(over);
        if result.is_err() {
            self.drag = None;
        }
        result
    }

    /// All rows in manual row order, as handed back to the data owner after a reorder.
    pub fn ordered_data(&self) -> Vec<T> {
        self.row_order
            .keys()
            .iter()
            .filter_map(|k| self.index.get(k))
            .map(|&i| self.rows[i].clone())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn set_density(&mut self, density: Density) -> bool {
        let changed = self.density != density;
        self.density = density;
        changed
    }

    /// Restores invariants after any change: page index within bounds and selection
    /// limited to rows of the rendered page.
    fn sync(&mut self) {
        let total = self.filtered_rows().len();
        self.pagination.clamp(total);
        let visible: HashSet<T::Key> = self.page_rows().iter().map(|r| r.key()).collect();
        self.selection.retain(|k| visible.contains(k));
    }
}
