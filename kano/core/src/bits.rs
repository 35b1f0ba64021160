use roaring::RoaringBitmap;
use std::fmt;

/// A fixed-width set of indices backed by a [`RoaringBitmap`].
///
/// Every member is less than `width`, so complements and fullness are defined.
#[derive(Clone, Default)]
pub struct BitSet {
    width: usize,
    bits: RoaringBitmap,
}

/// A list of equal-width [`BitSet`] rows.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitMatrix {
    cols: usize,
    rows: Vec<BitSet>,
}

// === impl BitSet ===

impl BitSet {
    /// Returns a set of the given width with no members.
    pub fn new(width: usize) -> Self {
        assert!(
            width <= u32::MAX as usize,
            "width {width} exceeds the bitmap range"
        );
        Self {
            width,
            bits: RoaringBitmap::new(),
        }
    }

    /// Returns a set of the given width containing every index.
    pub fn full(width: usize) -> Self {
        let mut set = Self::new(width);
        set.bits.insert_range(0..width as u32);
        set
    }

    pub fn from_indices(width: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(width);
        for i in indices {
            set.insert(i);
        }
        set
    }

    pub fn from_bools(bits: impl IntoIterator<Item = bool>) -> Self {
        let bits = bits.into_iter().collect::<Vec<_>>();
        Self::from_indices(
            bits.len(),
            bits.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i),
        )
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        i < self.width && self.bits.contains(i as u32)
    }

    #[inline]
    pub fn insert(&mut self, i: usize) {
        assert!(i < self.width, "index {i} out of range for width {}", self.width);
        self.bits.insert(i as u32);
    }

    #[inline]
    pub fn remove(&mut self, i: usize) {
        if i < self.width {
            self.bits.remove(i as u32);
        }
    }

    pub fn set(&mut self, i: usize, on: bool) {
        if on {
            self.insert(i)
        } else {
            self.remove(i)
        }
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    pub fn intersect_with(&mut self, other: &Self) {
        debug_assert_eq!(self.width, other.width);
        self.bits &= &other.bits;
    }

    pub fn union_with(&mut self, other: &Self) {
        debug_assert_eq!(self.width, other.width);
        self.bits |= &other.bits;
    }

    pub fn difference_with(&mut self, other: &Self) {
        debug_assert_eq!(self.width, other.width);
        self.bits -= &other.bits;
    }

    pub fn negate(&mut self) {
        let mut complement = Self::full(self.width);
        complement.bits -= &self.bits;
        *self = complement;
    }

    /// Returns true if every member of `other` is a member of `self`.
    #[inline]
    pub fn is_superset(&self, other: &Self) -> bool {
        self.bits.is_superset(&other.bits)
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.bits.len() as usize
    }

    /// Returns true if no index is a member.
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns true if every index is a member.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count_ones() == self.width
    }

    /// Iterates over members in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().map(|i| i as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width).map(move |i| self.contains(i))
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.bits.len() == other.bits.len()
            && self.bits.is_subset(&other.bits)
    }
}

impl Eq for BitSet {}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for on in self.iter() {
            f.write_str(if on { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet({self})")
    }
}

// === impl BitMatrix ===

impl BitMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: vec![BitSet::new(cols); rows],
        }
    }

    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: vec![BitSet::full(cols); rows],
        }
    }

    /// Builds a matrix from rows, which must all share the width `cols`.
    pub fn from_rows(cols: usize, rows: impl IntoIterator<Item = BitSet>) -> Self {
        let rows = rows.into_iter().collect::<Vec<_>>();
        assert!(
            rows.iter().all(|r| r.width() == cols),
            "all rows must have width {cols}"
        );
        Self { cols, rows }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn row(&self, i: usize) -> &BitSet {
        &self.rows[i]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut BitSet {
        &mut self.rows[i]
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows[i].contains(j)
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, on: bool) {
        self.rows[i].set(j, on)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BitSet> {
        self.rows.iter()
    }

    /// Transposes the matrix. Square matrices are transposed in place.
    pub fn transpose(&mut self) {
        if self.rows() != self.cols {
            *self = self.transposed();
            return;
        }

        let n = self.cols;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.get(i, j), self.get(j, i));
                self.set(i, j, b);
                self.set(j, i, a);
            }
        }
    }

    pub fn transposed(&self) -> Self {
        let mut t = Self::new(self.cols, self.rows());
        for (i, row) in self.rows.iter().enumerate() {
            for j in row.iter_ones() {
                t.set(j, i, true);
            }
        }
        t
    }
}

impl std::ops::Index<usize> for BitMatrix {
    type Output = BitSet;

    #[inline]
    fn index(&self, i: usize) -> &BitSet {
        &self.rows[i]
    }
}

impl<'m> IntoIterator for &'m BitMatrix {
    type Item = &'m BitSet;
    type IntoIter = std::slice::Iter<'m, BitSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rows.iter().map(|r| r.to_string()))
            .finish()
    }
}
