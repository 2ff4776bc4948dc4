//! Dense row-major 2D storage addressed by [`Point`].

use crate::game::Point;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A fixed-size grid of cells.
///
/// # Examples
///
/// ```
/// use caverns::{Grid, Point};
///
/// let mut walls = Grid::new(4, 3, true);
/// walls[Point::new(1, 1)] = false;
/// assert!(!walls[Point::new(1, 1)]);
/// assert_eq!(walls.get(Point::new(4, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `fill`.
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![fill; (width * height) as usize],
        }
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|cell| *cell = value.clone());
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    fn offset(&self, point: Point) -> Option<usize> {
        self.in_bounds(point)
            .then(|| (point.y * self.width + point.x) as usize)
    }

    pub fn get(&self, point: Point) -> Option<&T> {
        self.offset(point).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, point: Point) -> Option<&mut T> {
        let i = self.offset(point)?;
        Some(&mut self.cells[i])
    }

    /// Writes a cell. Out-of-bounds writes are ignored and return false.
    pub fn set(&mut self, point: Point, value: T) -> bool {
        match self.get_mut(point) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Every coordinate, row by row.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    /// Every coordinate with its cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> {
        self.points().zip(self.cells.iter())
    }
}

impl<T> Index<Point> for Grid<T> {
    type Output = T;

    fn index(&self, point: Point) -> &T {
        match self.offset(point) {
            Some(i) => &self.cells[i],
            None => panic!(
                "point ({}, {}) outside {}x{} grid",
                point.x, point.y, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Point> for Grid<T> {
    fn index_mut(&mut self, point: Point) -> &mut T {
        let (width, height) = (self.width, self.height);
        match self.offset(point) {
            Some(i) => &mut self.cells[i],
            None => panic!(
                "point ({}, {}) outside {}x{} grid",
                point.x, point.y, width, height
            ),
        }
    }
}
