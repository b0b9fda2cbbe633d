//! Column pinning: display order and sticky offsets for pinned columns.

use serde::{Deserialize, Serialize};

/// Stacking order for pinned columns; scrollable columns sit at 0.
pub const PINNED_Z_INDEX: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum PinSide {
    #[default]
    None,
    Left,
    Right,
}

impl PinSide {
    pub fn is_pinned(self) -> bool {
        self != PinSide::None
    }
}

/// Edge of a pinned column that casts the separation shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum ShadowEdge {
    Left,
    Right,
}

/// Horizontal placement of one rendered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Placement {
    pub side: PinSide,
    /// Sticky offset in pixels from the pinned edge (0 for scrollable columns).
    pub offset: u32,
    pub z_index: u8,
    pub shadow: Option<ShadowEdge>,
}

/// Lays out columns given as `(pin side, width)` in column order.
///
/// Returns `(input index, placement)` in display order: left-pinned columns first,
/// then scrollable ones, then right-pinned, each group keeping column order. A left
/// column's offset is the total width of left-pinned columns before it; a right
/// column's offset is the total width of right-pinned columns after it. The innermost
/// column of each pinned group gets the shadow.
pub fn layout(columns: &[(PinSide, u16)]) -> Vec<(usize, Placement)> {
    let group = |side: PinSide| -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, (s, _))| *s == side)
            .map(|(i, _)| i)
            .collect()
    };
    let left = group(PinSide::Left);
    let center = group(PinSide::None);
    let right = group(PinSide::Right);

    let mut out = Vec::with_capacity(columns.len());

    let mut offset = 0u32;
    for (n, &idx) in left.iter().enumerate() {
        out.push((
            idx,
            Placement {
                side: PinSide::Left,
                offset,
                z_index: PINNED_Z_INDEX,
                shadow: (n + 1 == left.len()).then_some(ShadowEdge::Right),
            },
        ));
        offset += u32::from(columns[idx].1);
    }

    for &idx in &center {
        out.push((
            idx,
            Placement {
                side: PinSide::None,
                offset: 0,
                z_index: 0,
                shadow: None,
            },
        ));
    }

    let mut right_placed = Vec::with_capacity(right.len());
    let mut offset = 0u32;
    for (n, &idx) in right.iter().enumerate().rev() {
        right_placed.push((
            idx,
            Placement {
                side: PinSide::Right,
                offset,
                z_index: PINNED_Z_INDEX,
                shadow: (n == 0).then_some(ShadowEdge::Left),
            },
        ));
        offset += u32::from(columns[idx].1);
    }
    right_placed.reverse();
    out.extend(right_placed);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpinned_columns_keep_order_without_offsets() {
        let placed = layout(&[(PinSide::None, 100), (PinSide::None, 50)]);
        let order: Vec<_> = placed.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, [0, 1]);
        assert!(placed.iter().all(|(_, p)| p.offset == 0 && p.z_index == 0));
    }

    #[test]
    fn pinned_offsets_accumulate_per_side() {
        let placed = layout(&[
            (PinSide::None, 100),
            (PinSide::Left, 40),
            (PinSide::Right, 80),
            (PinSide::Left, 60),
            (PinSide::Right, 30),
        ]);
        let order: Vec<_> = placed.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, [1, 3, 0, 2, 4]);

        let by_idx = |i: usize| placed.iter().find(|(idx, _)| *idx == i).unwrap().1;
        assert_eq!(by_idx(1).offset, 0);
        assert_eq!(by_idx(3).offset, 40);
        assert_eq!(by_idx(3).shadow, Some(ShadowEdge::Right));
        assert_eq!(by_idx(1).shadow, None);
        assert_eq!(by_idx(4).offset, 0);
        assert_eq!(by_idx(2).offset, 30);
        assert_eq!(by_idx(2).shadow, Some(ShadowEdge::Left));
        assert_eq!(by_idx(2).z_index, PINNED_Z_INDEX);
    }
}
