//! Active piece: a shape, its rotation state and its position on the grid

use crate::shape::{PieceType, Shape};

/// Integer grid coordinate. `y` may be negative above the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned bounds of a placed shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Index of the bottom row covered by the rectangle
    pub fn bottom_row(&self) -> i32 {
        self.y + self.height - 1
    }
}

/// Entry of the next-piece queue: what to spawn, in which rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceDescriptor {
    pub piece: PieceType,
    pub rotation: usize,
}

impl PieceDescriptor {
    pub fn new(piece: PieceType, rotation: usize) -> Self {
        PieceDescriptor {
            piece,
            rotation: rotation % piece.state_count(),
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.piece.shape(self.rotation)
    }
}

/// The falling, player-controllable piece.
///
/// A `Sprite` is an immutable value: moving or rotating it produces a new
/// sprite, which the caller validates before accepting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite {
    piece: PieceType,
    rotation: usize,
    position: Point,
}

impl Sprite {
    /// Create a sprite. The rotation index wraps modulo the piece's state count.
    pub fn new(piece: PieceType, rotation: usize, position: Point) -> Self {
        Sprite {
            piece,
            rotation: rotation % piece.state_count(),
            position,
        }
    }

    /// Sprite for a queued piece, centred horizontally and sitting just above the grid
    pub fn spawn(descriptor: PieceDescriptor, grid_width: usize) -> Self {
        let shape = descriptor.shape();
        let x = (grid_width as i32 - shape.width() as i32) / 2;
        let y = -(shape.height() as i32);
        Sprite::new(descriptor.piece, descriptor.rotation, Point::new(x, y))
    }

    pub fn piece(&self) -> PieceType {
        self.piece
    }

    pub fn rotation(&self) -> usize {
        self.rotation
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn shape(&self) -> &'static Shape {
        self.piece.shape(self.rotation)
    }

    /// Same piece advanced to its next rotation state, position unchanged
    pub fn rotate(&self) -> Sprite {
        Sprite::new(self.piece, self.rotation + 1, self.position)
    }

    /// Same piece translated by (dx, dy)
    pub fn moved(&self, dx: i32, dy: i32) -> Sprite {
        Sprite {
            position: Point::new(self.position.x + dx, self.position.y + dy),
            ..*self
        }
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box_at(self.position)
    }

    /// Bounds of the current rotation's shape if placed at `position`
    pub fn bounding_box_at(&self, position: Point) -> Rect {
        let shape = self.shape();
        Rect {
            x: position.x,
            y: position.y,
            width: shape.width() as i32,
            height: shape.height() as i32,
        }
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.occupied_cells_at(self.position)
    }

    /// Absolute coordinates of every occupied cell at `position`, row-major
    pub fn occupied_cells_at(&self, position: Point) -> impl Iterator<Item = Point> + '_ {
        self.shape()
            .cells()
            .map(move |(x, y)| {
                Point::new(
                    position.x.saturating_add(x as i32),
                    position.y.saturating_add(y as i32),
                )
            })
    }
}
