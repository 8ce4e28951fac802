//! Static catalog of piece shapes and their rotation states

/// Largest extent of any shape in the catalog
const MAX_EXTENT: usize = 4;

/// Immutable occupancy matrix of one rotation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    matrix: [[bool; MAX_EXTENT]; MAX_EXTENT],
    width: usize,
    height: usize,
}

impl Shape {
    /// Build a shape from rows of 0/1 values, row 0 on top
    const fn from_rows(rows: &[&[u8]]) -> Shape {
        assert!(!rows.is_empty() && rows.len() <= MAX_EXTENT);
        let width = rows[0].len();
        assert!(width > 0 && width <= MAX_EXTENT);

        let mut matrix = [[false; MAX_EXTENT]; MAX_EXTENT];
        let mut y = 0;
        while y < rows.len() {
            assert!(rows[y].len() == width);
            let mut x = 0;
            while x < width {
                matrix[y][x] = rows[y][x] != 0;
                x += 1;
            }
            y += 1;
        }

        Shape {
            matrix,
            width,
            height: rows.len(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at column `x`, row `y` of the shape is occupied
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.matrix[y][x]
    }

    /// Occupied cells as (column, row) offsets, in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.matrix[y][x].then_some((x, y)))
        })
    }
}

const I_SHAPES: [Shape; 2] = [
    Shape::from_rows(&[&[1, 1, 1, 1]]),
    Shape::from_rows(&[&[1], &[1], &[1], &[1]]),
];

const O_SHAPES: [Shape; 1] = [Shape::from_rows(&[&[1, 1], &[1, 1]])];

const J_SHAPES: [Shape; 4] = [
    Shape::from_rows(&[&[1, 1, 1], &[0, 0, 1]]),
    Shape::from_rows(&[&[1, 1], &[1, 0], &[1, 0]]),
    Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
    Shape::from_rows(&[&[0, 1], &[0, 1], &[1, 1]]),
];

const L_SHAPES: [Shape; 4] = [
    Shape::from_rows(&[&[1, 1, 1], &[1, 0, 0]]),
    Shape::from_rows(&[&[1, 1], &[0, 1], &[0, 1]]),
    Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
    Shape::from_rows(&[&[1, 0], &[1, 0], &[1, 1]]),
];

const S_SHAPES: [Shape; 2] = [
    Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
    Shape::from_rows(&[&[1, 0], &[1, 1], &[0, 1]]),
];

const Z_SHAPES: [Shape; 2] = [
    Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
    Shape::from_rows(&[&[0, 1], &[1, 1], &[1, 0]]),
];

const T_SHAPES: [Shape; 4] = [
    Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]),
    Shape::from_rows(&[&[1, 0], &[1, 1], &[1, 0]]),
    Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
    Shape::from_rows(&[&[0, 1], &[1, 1], &[0, 1]]),
];

/// The seven piece types, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    I,
    O,
    J,
    L,
    S,
    Z,
    T,
}

impl PieceType {
    /// All piece types, indexed by their wire value
    pub const ALL: [PieceType; 7] = [
        PieceType::I,
        PieceType::O,
        PieceType::J,
        PieceType::L,
        PieceType::S,
        PieceType::Z,
        PieceType::T,
    ];

    /// Piece type for a wire index, if any
    pub fn from_index(index: usize) -> Option<PieceType> {
        Self::ALL.get(index).copied()
    }

    /// Wire index of the piece type
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Rotation states of the piece type, in rotation order
    pub fn shapes(&self) -> &'static [Shape] {
        match self {
            PieceType::I => &I_SHAPES,
            PieceType::O => &O_SHAPES,
            PieceType::J => &J_SHAPES,
            PieceType::L => &L_SHAPES,
            PieceType::S => &S_SHAPES,
            PieceType::Z => &Z_SHAPES,
            PieceType::T => &T_SHAPES,
        }
    }

    /// Number of distinct rotation states
    pub fn state_count(&self) -> usize {
        self.shapes().len()
    }

    /// Shape for a rotation index, wrapping modulo the state count
    pub fn shape(&self, rotation: usize) -> &'static Shape {
        let shapes = self.shapes();
        &shapes[rotation % shapes.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_counts() {
        let counts: Vec<usize> = PieceType::ALL.iter().map(|p| p.state_count()).collect();
        assert_eq!(counts, vec![2, 1, 4, 4, 2, 2, 4]);
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for piece in PieceType::ALL {
            for shape in piece.shapes() {
                assert_eq!(shape.cells().count(), 4, "{:?} {:?}", piece, shape);
            }
        }
    }

    #[test]
    fn test_index_roundtrip() {
        for (index, piece) in PieceType::ALL.iter().enumerate() {
            assert_eq!(piece.index(), index);
            assert_eq!(PieceType::from_index(index), Some(*piece));
        }
        assert_eq!(PieceType::from_index(7), None);
    }

    #[test]
    fn test_shape_dimensions() {
        let i = PieceType::I.shape(0);
        assert_eq!((i.width(), i.height()), (4, 1));
        let i_vertical = PieceType::I.shape(1);
        assert_eq!((i_vertical.width(), i_vertical.height()), (1, 4));
        let t = PieceType::T.shape(1);
        assert_eq!((t.width(), t.height()), (2, 3));
    }

    #[test]
    fn test_cells_are_row_major() {
        // J state 0: ###/..#
        let cells: Vec<_> = PieceType::J.shape(0).cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_shape_wraps_rotation() {
        assert_eq!(PieceType::S.shape(2), PieceType::S.shape(0));
        assert_eq!(PieceType::O.shape(3), PieceType::O.shape(0));
    }

    #[test]
    fn test_is_occupied_out_of_range() {
        let o = PieceType::O.shape(0);
        assert!(o.is_occupied(1, 1));
        assert!(!o.is_occupied(2, 0));
        assert!(!o.is_occupied(0, 2));
    }
}
