//! Client-side pagination over the filtered row set.

use std::ops::Range;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZES: [usize; 5] = [10, 20, 30, 40, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: PAGE_SIZES[0],
        }
    }
}

impl Pagination {
    /// `ceil(total / page_size)`; zero rows means zero pages.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.page_index + 1 < self.page_count(total)
    }

    /// Index range of the current page within the filtered rows.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.page_index.saturating_mul(self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// Pulls the page index back inside `[0, page_count)` after the row set shrank.
    pub fn clamp(&mut self, total: usize) {
        let count = self.page_count(total);
        if count == 0 {
            self.page_index = 0;
        } else if self.page_index >= count {
            self.page_index = count - 1;
        }
    }
}
