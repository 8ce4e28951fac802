//! Fixed-size occupancy grid with line detection, line removal and bit packing

/// Number of cells packed into one word of the wire representation
pub const WORD_BITS: usize = 32;

/// Boolean occupancy matrix, row 0 on top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<bool>>,
}

impl Grid {
    /// Create an empty grid. Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Grid {
            width,
            height,
            rows: vec![vec![false; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> bool {
        self.rows[y][x]
    }

    pub fn set(&mut self, x: usize, y: usize) {
        self.rows[y][x] = true;
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(false);
        }
    }

    /// True iff every cell of `row` is occupied
    pub fn is_row_complete(&self, row: usize) -> bool {
        assert!(row < self.height, "row {} outside grid of height {}", row, self.height);
        self.rows[row].iter().all(|&cell| cell)
    }

    /// Complete rows within `[from, to]`, ordered from bottom to top.
    ///
    /// `from` is clamped to the first row and `to` to the last, so the span
    /// of a piece that sticks out above the grid can be passed as is.
    pub fn find_complete_rows(&self, from: i32, to: i32) -> Vec<usize> {
        let from = from.max(0);
        let to = to.min(self.height as i32 - 1);
        if to < from {
            return Vec::new();
        }
        (from as usize..=to as usize)
            .rev()
            .filter(|&row| self.is_row_complete(row))
            .collect()
    }

    /// Remove `rows` (treated as a set) and drop everything above them.
    ///
    /// Retained rows keep their relative order; as many empty rows as were
    /// removed are inserted at the top.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        let mut removed = rows.to_vec();
        removed.sort_unstable();
        removed.dedup();
        if removed.is_empty() {
            return;
        }
        if let Some(&last) = removed.last() {
            assert!(last < self.height, "row {} outside grid of height {}", last, self.height);
        }

        let width = self.width;
        let kept: Vec<Vec<bool>> = std::mem::take(&mut self.rows)
            .into_iter()
            .enumerate()
            .filter(|(index, _)| removed.binary_search(index).is_err())
            .map(|(_, row)| row)
            .collect();

        self.rows = std::iter::repeat_with(|| vec![false; width])
            .take(removed.len())
            .chain(kept)
            .collect();
    }

    /// Number of words needed to pack the whole grid
    pub fn word_count(&self) -> usize {
        (self.width * self.height).div_ceil(WORD_BITS)
    }

    /// Pack the grid row-major, one bit per cell, least significant bit first
    pub fn to_bitset(&self) -> Vec<u32> {
        let mut words = vec![0u32; self.word_count()];
        for (index, &occupied) in self.rows.iter().flatten().enumerate() {
            if occupied {
                words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
            }
        }
        words
    }

    /// Overwrite the grid from a packing produced by [`Grid::to_bitset`].
    ///
    /// An empty slice leaves the grid unchanged. Any other length must match
    /// [`Grid::word_count`].
    pub fn from_bitset(&mut self, words: &[u32]) {
        if words.is_empty() {
            return;
        }
        assert_eq!(
            words.len(),
            self.word_count(),
            "bitset does not match a {}x{} grid",
            self.width,
            self.height
        );
        for (index, cell) in self.rows.iter_mut().flatten().enumerate() {
            *cell = words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0;
        }
    }
}
