#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: u16, y: u16) -> Point {
        Point { x, y }
    }

    /// Checked offset. Returns None when the result leaves the u16 range.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Point> {
        let x = i32::from(self.x) + dx;
        let y = i32::from(self.y) + dy;
        if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
            return None;
        }
        Some(Point {
            x: x as u16,
            y: y as u16,
        })
    }

    /// Offset clamped into `[0, width) x [0, height)`. Used by the placement
    /// search, which must always land inside the grid.
    pub fn clamped_offset(self, dx: i32, dy: i32, width: u16, height: u16) -> Point {
        let max_x = (i32::from(width) - 1).max(0);
        let max_y = (i32::from(height) - 1).max(0);
        let x = (i32::from(self.x) + dx).clamp(0, max_x);
        let y = (i32::from(self.y) + dy).clamp(0, max_y);
        Point {
            x: x as u16,
            y: y as u16,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
