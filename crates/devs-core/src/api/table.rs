//! Serializable table projection returned by the admin table endpoints.

use std::fmt::Display;

use serde::Serialize;
use utoipa::ToSchema;

use crate::table::{
    ColumnKind, Density, DragKind, PageSelection, Placement, SortDirection, TableView,
};

/// Full table state for one rendered page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiTableView {
    /// Table name (e.g. "posts").
    pub table: String,
    /// Visible columns in display order.
    pub headers: Vec<ApiHeader>,
    pub rows: Vec<ApiRow>,
    /// Hidden column ids in column order.
    pub hidden_columns: Vec<String>,
    pub page: ApiPageInfo,
    /// State of the page-level "select all" checkbox.
    pub selection: PageSelection,
    pub selected_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Column the free-text filter applies to; absent when filtering is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_column: Option<String>,
    pub density: Density,
    /// Row height in pixels for the current density.
    pub row_height: u16,
    /// Row drag handles are live only while no sort is active.
    pub rows_draggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag: Option<DragKind>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiHeader {
    pub id: String,
    pub header: String,
    pub kind: ColumnKind,
    pub width: u16,
    pub placement: Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirection>,
    /// Position within a multi-column sort (0 = primary).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<usize>,
    pub sortable: bool,
    pub draggable: bool,
    pub pinnable: bool,
    pub hideable: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiRow {
    /// Row key as a string.
    pub key: String,
    /// Rendered cells aligned with `headers`.
    pub cells: Vec<String>,
    pub selected: bool,
    pub expanded: bool,
    pub expandable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiPageInfo {
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub page_sizes: Vec<usize>,
}

/// Converts a table projection, stringifying row keys.
pub fn convert<K: Display>(table: &str, view: TableView<K>) -> ApiTableView {
    let headers = view
        .headers
        .into_iter()
        .map(|h| ApiHeader {
            id: h.id,
            header: h.header,
            kind: h.kind,
            width: h.width,
            placement: h.placement,
            sort: h.sort,
            sort_index: h.sort_index,
            sortable: h.sortable,
            draggable: h.draggable,
            pinnable: h.pinnable,
            hideable: h.hideable,
        })
        .collect();
    let rows = view
        .rows
        .into_iter()
        .map(|r| ApiRow {
            key: r.key.to_string(),
            cells: r.cells,
            selected: r.selected,
            expanded: r.expanded,
            expandable: r.expandable,
            detail: r.detail,
        })
        .collect();
    ApiTableView {
        table: table.to_string(),
        headers,
        rows,
        hidden_columns: view.hidden_columns,
        page: ApiPageInfo {
            page_index: view.page.page_index,
            page_size: view.page.page_size,
            page_count: view.page.page_count,
            total_rows: view.page.total_rows,
            filtered_rows: view.page.filtered_rows,
            can_previous: view.page.can_previous,
            can_next: view.page.can_next,
            page_sizes: view.page.page_sizes.to_vec(),
        },
        selection: view.selection,
        selected_count: view.selected_count,
        filter: view.filter,
        search_column: view.search_column,
        density: view.density,
        row_height: view.row_height,
        rows_draggable: view.rows_draggable,
        drag: view.drag,
    }
}
