//! Renderer-agnostic projection of a table.
//!
//! These types carry everything a frontend needs to draw the current page
//! (placed headers, formatted cells, checkbox states, pager) without any
//! dependency on a rendering framework.

use serde::Serialize;

use super::{
    ColumnKind, Density, DragKind, PAGE_SIZES, PinSide, Placement, SortDirection, TableRow,
    TableState, layout,
};

/// Tri-state of the "select all" checkbox for the visible page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum PageSelection {
    All,
    Some,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub id: String,
    pub header: String,
    pub kind: ColumnKind,
    pub width: u16,
    pub placement: Placement,
    pub sort: Option<SortDirection>,
    /// Position in a multi-column sort (0 = primary).
    pub sort_index: Option<usize>,
    pub sortable: bool,
    pub draggable: bool,
    pub pinnable: bool,
    pub hideable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView<K> {
    pub key: K,
    /// Rendered cells, aligned with `TableView::headers`.
    pub cells: Vec<String>,
    pub selected: bool,
    pub expanded: bool,
    /// Detail content, present only while expanded.
    pub detail: Option<String>,
    pub expandable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub page_sizes: &'static [usize],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView<K> {
    /// Visible columns in display order (left-pinned, scrollable, right-pinned).
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView<K>>,
    pub hidden_columns: Vec<String>,
    pub page: PageInfo,
    pub selection: PageSelection,
    pub selected_count: usize,
    pub filter: Option<String>,
    pub search_column: Option<String>,
    pub density: Density,
    pub row_height: u16,
    /// Whether row handles are live (row drag enabled and no sort active).
    pub rows_draggable: bool,
    pub drag: Option<DragKind>,
}

impl<T: TableRow> TableState<T> {
    /// Projects the current page.
    pub fn view(&self) -> TableView<T::Key> {
        let visible = self.visible_columns();
        let sides: Vec<(PinSide, u16)> = visible
            .iter()
            .map(|c| (self.pin_side(&c.id), c.width))
            .collect();
        let placed = layout(&sides);

        let headers: Vec<HeaderView> = placed
            .iter()
            .map(|(idx, placement)| {
                let col = visible[*idx];
                let sort_index = self
                    .sort
                    .entries()
                    .iter()
                    .position(|e| e.column == col.id);
                HeaderView {
                    id: col.id.clone(),
                    header: col.header.clone(),
                    kind: col.kind,
                    width: col.width,
                    placement: *placement,
                    sort: self.sort.direction_of(&col.id),
                    sort_index,
                    sortable: col.sortable,
                    draggable: self.is_column_draggable(&col.id),
                    pinnable: col.pinnable,
                    hideable: col.hideable,
                }
            })
            .collect();

        let filtered = self.filtered_rows();
        let range = self.pagination.range(filtered.len());
        let rows = filtered[range]
            .iter()
            .map(|row| {
                let key = row.key();
                let cells = headers
                    .iter()
                    .map(|h| h.kind.render(&row.cell(&h.id)))
                    .collect();
                let detail = row.detail();
                let expanded = self.expanded.contains(&key);
                RowView {
                    selected: self.selection.contains(&key),
                    expanded,
                    expandable: self.options.expansion && detail.is_some(),
                    detail: if expanded { detail } else { None },
                    cells,
                    key,
                }
            })
            .collect();

        let hidden_columns: Vec<String> = self
            .column_order
            .keys()
            .iter()
            .filter(|id| self.hidden.contains(*id))
            .cloned()
            .collect();

        TableView {
            headers,
            rows,
            hidden_columns,
            page: PageInfo {
                page_index: self.pagination.page_index,
                page_size: self.pagination.page_size,
                page_count: self.pagination.page_count(filtered.len()),
                total_rows: self.rows.len(),
                filtered_rows: filtered.len(),
                can_previous: self.pagination.can_previous(),
                can_next: self.pagination.can_next(filtered.len()),
                page_sizes: &PAGE_SIZES,
            },
            selection: self.page_selection(),
            selected_count: self.selection.len(),
            filter: self.filter.clone(),
            search_column: self.search_column.clone(),
            density: self.density,
            row_height: self.density.row_height(),
            rows_draggable: self.options.row_drag && !self.sort.is_active(),
            drag: self.drag.as_ref().map(|d| d.kind()),
        }
    }
}
