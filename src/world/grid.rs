use crate::world::position::Point;
use std::fs;
use std::path::Path;

/// Walkability mask for one map. Grids are parsed once and shared between
/// live maps through an `Arc`, so mutation only happens before sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionGrid {
    width: u16,
    height: u16,
    blocked: Vec<bool>,
}

impl CollisionGrid {
    /// All-open grid, used by tests and as a starting point for fixtures.
    pub fn open(width: u16, height: u16) -> CollisionGrid {
        CollisionGrid {
            width,
            height,
            blocked: vec![false; usize::from(width) * usize::from(height)],
        }
    }

    pub fn load(path: &Path) -> Result<CollisionGrid, String> {
        let data = fs::read_to_string(path)
            .map_err(|err| format!("grid read failed for {}: {}", path.display(), err))?;
        let label = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("grid");
        CollisionGrid::parse(&data, label)
    }

    /// Text grid format: a `width height` header line, then `height` rows of
    /// `width` cells each, `#` blocked and `.` open.
    pub fn parse(data: &str, label: &str) -> Result<CollisionGrid, String> {
        let mut lines = data.lines().enumerate();
        let (header_no, header) = lines
            .find(|(_, line)| !line.trim().is_empty())
            .ok_or_else(|| format!("{} is empty, expected a 'width height' header", label))?;
        let mut parts = header.split_whitespace();
        let width = parse_dimension(parts.next(), label, "width", header_no + 1)?;
        let height = parse_dimension(parts.next(), label, "height", header_no + 1)?;
        if parts.next().is_some() {
            return Err(format!(
                "{} header has trailing tokens at line {}",
                label,
                header_no + 1
            ));
        }

        let mut grid = CollisionGrid::open(width, height);
        let mut rows = 0u16;
        for (idx, raw_line) in lines {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if rows >= height {
                return Err(format!(
                    "{} has more than {} rows at line {}",
                    label,
                    height,
                    idx + 1
                ));
            }
            let mut cells = 0u16;
            for ch in line.chars() {
                if cells >= width {
                    return Err(format!(
                        "{} row is wider than {} at line {}",
                        label,
                        width,
                        idx + 1
                    ));
                }
                let blocked = match ch {
                    '.' => false,
                    '#' => true,
                    other => {
                        return Err(format!(
                            "{} unknown cell '{}' at line {}",
                            label,
                            other,
                            idx + 1
                        ));
                    }
                };
                grid.set_blocked(Point::new(cells, rows), blocked);
                cells += 1;
            }
            if cells != width {
                return Err(format!(
                    "{} row has {} cells, expected {} at line {}",
                    label,
                    cells,
                    width,
                    idx + 1
                ));
            }
            rows += 1;
        }
        if rows != height {
            return Err(format!(
                "{} has {} rows, expected {}",
                label, rows, height
            ));
        }
        Ok(grid)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Out-of-bounds cells count as blocked.
    pub fn blocked(&self, point: Point) -> bool {
        if !self.in_bounds(point) {
            return true;
        }
        self.blocked[self.cell_index(point)]
    }

    pub fn set_blocked(&mut self, point: Point, blocked: bool) {
        if !self.in_bounds(point) {
            return;
        }
        let index = self.cell_index(point);
        self.blocked[index] = blocked;
    }

    pub fn open_cell_count(&self) -> usize {
        self.blocked.iter().filter(|cell| !**cell).count()
    }

    fn cell_index(&self, point: Point) -> usize {
        usize::from(point.y) * usize::from(self.width) + usize::from(point.x)
    }
}

fn parse_dimension(
    token: Option<&str>,
    label: &str,
    which: &str,
    line_no: usize,
) -> Result<u16, String> {
    let token = token.ok_or_else(|| {
        format!(
            "{} header missing {} at line {}",
            label, which, line_no
        )
    })?;
    let value = token.parse::<u16>().map_err(|_| {
        format!(
            "{} header {} is not a number at line {}, got '{}'",
            label, which, line_no, token
        )
    })?;
    if value == 0 {
        return Err(format!(
            "{} header {} must be nonzero at line {}",
            label, which, line_no
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let data = "4 3\n....\n.##.\n....\n";
        let grid = CollisionGrid::parse(data, "test.map").expect("parse");
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(!grid.blocked(Point::new(0, 0)));
        assert!(grid.blocked(Point::new(1, 1)));
        assert!(grid.blocked(Point::new(2, 1)));
        assert!(!grid.blocked(Point::new(3, 2)));
        assert_eq!(grid.open_cell_count(), 10);
    }

    #[test]
    fn out_of_bounds_is_blocked() {
        let grid = CollisionGrid::open(4, 3);
        assert!(grid.blocked(Point::new(4, 0)));
        assert!(grid.blocked(Point::new(0, 3)));
        assert!(!grid.blocked(Point::new(3, 2)));
    }

    #[test]
    fn rejects_short_and_wide_rows() {
        let short = CollisionGrid::parse("3 2\n...\n..\n", "test.map").unwrap_err();
        assert!(short.contains("2 cells, expected 3"));
        let wide = CollisionGrid::parse("3 2\n....\n...\n", "test.map").unwrap_err();
        assert!(wide.contains("wider than 3"));
    }

    #[test]
    fn rejects_row_count_mismatch() {
        let missing = CollisionGrid::parse("3 3\n...\n...\n", "test.map").unwrap_err();
        assert!(missing.contains("2 rows, expected 3"));
        let extra = CollisionGrid::parse("3 1\n...\n...\n", "test.map").unwrap_err();
        assert!(extra.contains("more than 1 rows"));
    }

    #[test]
    fn rejects_unknown_cells_and_bad_headers() {
        let unknown = CollisionGrid::parse("2 1\n.x\n", "test.map").unwrap_err();
        assert!(unknown.contains("unknown cell 'x'"));
        let zero = CollisionGrid::parse("0 4\n", "test.map").unwrap_err();
        assert!(zero.contains("width must be nonzero"));
        let empty = CollisionGrid::parse("\n\n", "test.map").unwrap_err();
        assert!(empty.contains("empty"));
    }
}
