use crate::color::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// The square of screen pixels sampled around the cursor. `right` and `bottom`
/// are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureBounds {
    pub left: i64,
    pub top: i64,
    pub size: usize,
}

impl CaptureBounds {
    /// `size` is expected to be odd, so `center` lands on the middle cell.
    pub fn centered(center: Point, size: usize) -> Self {
        let half = (size / 2) as i64;
        Self {
            left: center.x - half,
            top: center.y - half,
            size,
        }
    }

    pub fn right(&self) -> i64 {
        self.left + self.size as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.size as i64
    }

    pub fn center(&self) -> Point {
        let half = (self.size / 2) as i64;
        Point::new(self.left + half, self.top + half)
    }
}

/// Row-major `size x size` cells. `None` marks pixels outside the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    size: usize,
    cells: Vec<Option<Rgb>>,
}

impl PixelGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells[y * self.size + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Option<Rgb>) {
        if x < self.size && y < self.size {
            self.cells[y * self.size + x] = color;
        }
    }

    pub fn center(&self) -> Option<Rgb> {
        let mid = self.size / 2;
        self.cell(mid, mid)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<Rgb>]> {
        // chunks(0) panics
        self.cells.chunks(self.size.max(1))
    }
}
