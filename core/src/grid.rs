use crate::*;
use ndarray::Array2;

// Displacement mapping for the 8-neighborhood, row by row
const DISPLACEMENTS: [(Coord, Coord); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Bounds-checked 2D matrix shared by the grid-based games.
///
/// Out-of-range reads return the neutral value instead of failing, because
/// flood fill and neighbor counting probe speculatively past the edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    cells: Array2<T>,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: Array2::default((width, height)),
        }
    }

    pub fn from_elem(width: usize, height: usize, value: T) -> Self {
        Self {
            cells: Array2::from_elem((width, height), value),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.dim().0
    }

    pub fn height(&self) -> usize {
        self.cells.dim().1
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, (x, y): Point) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let (width, height) = self.cells.dim();
        (x < width && y < height).then_some((x, y))
    }

    pub fn contains(&self, point: Point) -> bool {
        self.index(point).is_some()
    }

    pub fn get(&self, point: Point) -> T {
        match self.index(point) {
            Some(index) => self.cells[index],
            None => T::default(),
        }
    }

    /// Bounds-checked write; out-of-range writes are dropped.
    pub fn set(&mut self, point: Point, value: T) -> bool {
        match self.index(point) {
            Some(index) => {
                self.cells[index] = value;
                true
            }
            None => false,
        }
    }

    /// Iterates the in-bounds subset of the 8-neighborhood of `center`.
    pub fn neighbors(&self, center: Point) -> NeighborIter {
        let (width, height) = self.cells.dim();
        NeighborIter::new(center, (width as Coord, height as Coord))
    }
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Point,
    bounds: Point,
    index: usize,
}

impl NeighborIter {
    fn new(center: Point, bounds: Point) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < DISPLACEMENTS.len() {
            let (dx, dy) = DISPLACEMENTS[self.index];
            self.index += 1;

            let next = (self.center.0 + dx, self.center.1 + dy);
            let in_bounds =
                next.0 >= 0 && next.0 < self.bounds.0 && next.1 >= 0 && next.1 < self.bounds.1;
            if in_bounds {
                return Some(next);
            }
        }
        None
    }
}
