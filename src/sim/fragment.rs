//! Shape fragments: immutable, position-independent cell sets
//!
//! A fragment stores its cells normalized so the smallest coordinate on each
//! axis is zero, together with its tight bounding box. The same type is used
//! for the player's shape and for elimination patterns. Absolute positions
//! are always produced by adding an external shift; fragments never move.

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::IVec2;

use crate::rotate_in_box;

/// Immutable set of grid offsets with a tight bounding box
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// Bounding box size (zero for the empty fragment)
    size: IVec2,
    /// Normalized offsets, sorted by (y, x), no duplicates
    cells: Vec<IVec2>,
    /// Memoized content hash (computed on first use)
    hash: OnceCell<u64>,
}

impl Fragment {
    /// The canonical empty fragment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize an arbitrary coordinate set.
    ///
    /// Returns the fragment and the shift that was subtracted, so
    /// `fragment.cells_at(shift)` reproduces the input set. Duplicates are
    /// collapsed. Empty input yields the empty fragment and a zero shift.
    pub fn new(cells: impl IntoIterator<Item = IVec2>) -> (Self, IVec2) {
        let mut cells: Vec<IVec2> = cells.into_iter().collect();
        if cells.is_empty() {
            return (Self::empty(), IVec2::ZERO);
        }

        let min = cells.iter().copied().fold(IVec2::MAX, IVec2::min);
        let max = cells.iter().copied().fold(IVec2::MIN, IVec2::max);
        for cell in &mut cells {
            *cell -= min;
        }
        cells.sort_unstable_by_key(|c| (c.y, c.x));
        cells.dedup();

        let fragment = Self {
            size: max - min + IVec2::ONE,
            cells,
            hash: OnceCell::new(),
        };
        (fragment, min)
    }

    /// Build from a boolean matrix drawn top row first (y axis points up)
    pub fn from_matrix<R: AsRef<[bool]>>(rows: &[R]) -> (Self, IVec2) {
        let height = rows.len() as i32;
        let cells = rows.iter().enumerate().flat_map(|(row, line)| {
            let y = height - 1 - row as i32;
            line.as_ref()
                .iter()
                .enumerate()
                .filter(|&(_, filled)| *filled)
                .map(move |(x, _)| IVec2::new(x as i32, y))
        });
        Self::new(cells)
    }

    /// Tight bounding box size
    #[inline]
    pub fn size(&self) -> IVec2 {
        self.size
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Normalized offsets
    pub fn cells(&self) -> &[IVec2] {
        &self.cells
    }

    /// Absolute cells for a given shift (no allocation)
    pub fn cells_at(&self, shift: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().map(move |&c| c + shift)
    }

    /// True iff the absolute `cell` is covered when viewed at `shift`
    pub fn contains(&self, cell: IVec2, shift: IVec2) -> bool {
        let local = cell - shift;
        self.cells
            .binary_search_by_key(&(local.y, local.x), |c| (c.y, c.x))
            .is_ok()
    }

    /// Absolute cells in grid column `x`, bottom to top
    pub fn vertical_slice(&self, x: i32, shift: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        self.cells_at(shift).filter(move |c| c.x == x)
    }

    /// A new fragment rotated 90 degrees inside its bounding box
    pub fn rotated(&self, clockwise: bool) -> Self {
        let size = self.size;
        Self::new(self.cells.iter().map(|&c| rotate_in_box(c, size, clockwise))).0
    }

    /// Content hash: commutative over cells, memoized after the first call
    pub fn hash_value(&self) -> u64 {
        *self.hash.get_or_init(|| {
            self.cells
                .iter()
                .fold(mix(self.size), |acc, &c| acc.wrapping_add(mix(c)))
        })
    }
}

/// SplitMix64 finalizer over a packed coordinate pair
fn mix(v: IVec2) -> u64 {
    let packed = ((v.x as u32 as u64) << 32) | v.y as u32 as u64;
    let mut z = packed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.hash_value() == other.hash_value()
            && self.cells == other.cells
    }
}

impl Eq for Fragment {}

impl Hash for Fragment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.size.y).rev() {
            for x in 0..self.size.x {
                let ch = if self.contains(IVec2::new(x, y), IVec2::ZERO) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn t_piece() -> Fragment {
        Fragment::from_matrix(&[[true, true, true], [false, true, false]]).0
    }

    #[test]
    fn empty_input_gives_empty_fragment() {
        let (fragment, shift) = Fragment::new(std::iter::empty());
        assert!(fragment.is_empty());
        assert_eq!(fragment.size(), IVec2::ZERO);
        assert_eq!(shift, IVec2::ZERO);
        assert_eq!(fragment, Fragment::empty());
    }

    #[test]
    fn normalizes_and_reports_shift() {
        let (fragment, shift) =
            Fragment::new([IVec2::new(5, 7), IVec2::new(6, 7), IVec2::new(6, 8)]);
        assert_eq!(shift, IVec2::new(5, 7));
        assert_eq!(fragment.size(), IVec2::new(2, 2));
        assert_eq!(
            fragment.cells(),
            &[IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(1, 1)]
        );
    }

    #[test]
    fn matrix_rows_are_drawn_top_first() {
        let t = t_piece();
        assert_eq!(t.size(), IVec2::new(3, 2));
        // Top row is y = 1
        assert!(t.contains(IVec2::new(0, 1), IVec2::ZERO));
        assert!(t.contains(IVec2::new(1, 0), IVec2::ZERO));
        assert!(!t.contains(IVec2::new(0, 0), IVec2::ZERO));
        assert_eq!(t.to_string(), "###\n.#.\n");
    }

    #[test]
    fn contains_respects_shift() {
        let t = t_piece();
        let shift = IVec2::new(10, 3);
        assert!(t.contains(IVec2::new(11, 3), shift));
        assert!(!t.contains(IVec2::new(10, 3), shift));
        assert!(!t.contains(IVec2::new(1, 0), shift));
    }

    #[test]
    fn vertical_slice_lists_column_cells() {
        let t = t_piece();
        let shift = IVec2::new(2, 2);
        let middle: Vec<_> = t.vertical_slice(3, shift).collect();
        assert_eq!(middle, vec![IVec2::new(3, 2), IVec2::new(3, 3)]);
        assert_eq!(t.vertical_slice(7, shift).count(), 0);
    }

    #[test]
    fn equality_ignores_external_shift() {
        let a = Fragment::new([IVec2::new(0, 0), IVec2::new(1, 0)]).0;
        let b = Fragment::new([IVec2::new(-4, 9), IVec2::new(-3, 9)]).0;
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn rotation_changes_size_and_layout() {
        let t = t_piece();
        let cw = t.rotated(true);
        assert_eq!(cw.size(), IVec2::new(2, 3));
        assert_ne!(cw, t);
        assert_eq!(cw.rotated(false), t);
    }

    #[test]
    fn square_is_rotation_symmetric() {
        let o = Fragment::from_matrix(&[[true, true], [true, true]]).0;
        assert_eq!(o.rotated(true), o);
    }

    fn arb_cells() -> impl Strategy<Value = Vec<IVec2>> {
        prop::collection::vec((-20i32..20, -20i32..20), 1..12)
            .prop_map(|v| v.into_iter().map(|(x, y)| IVec2::new(x, y)).collect())
    }

    proptest! {
        #[test]
        fn prop_shift_round_trips_absolute_cells(cells in arb_cells()) {
            let (fragment, shift) = Fragment::new(cells.iter().copied());
            let original: HashSet<IVec2> = cells.into_iter().collect();
            let rebuilt: HashSet<IVec2> = fragment.cells_at(shift).collect();
            prop_assert_eq!(rebuilt.len(), fragment.len());
            prop_assert_eq!(rebuilt, original);
        }

        #[test]
        fn prop_four_rotations_are_identity(cells in arb_cells(), clockwise in any::<bool>()) {
            let (fragment, _) = Fragment::new(cells);
            let turned = fragment
                .rotated(clockwise)
                .rotated(clockwise)
                .rotated(clockwise)
                .rotated(clockwise);
            prop_assert_eq!(turned, fragment);
        }
    }
}
