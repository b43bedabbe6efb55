use chrono::NaiveDate;

/// Dense row-major grid of file counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountGrid {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl CountGrid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        let idx = self.index(row, col);
        self.cells[idx] = value;
    }

    pub fn row(&self, row: usize) -> &[u32] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn max(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    fn column_is_zero(&self, col: usize) -> bool {
        (0..self.rows).all(|row| self.get(row, col) == 0)
    }

    fn drop_column(&mut self, col: usize) {
        let mut cells = Vec::with_capacity(self.rows * (self.cols - 1));
        for row in 0..self.rows {
            for c in 0..self.cols {
                if c != col {
                    cells.push(self.get(row, c));
                }
            }
        }
        self.cells = cells;
        self.cols -= 1;
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({}, {}) outside {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

/// Video and metadata counts per camera (rows) and night date (columns).
#[derive(Debug, Clone)]
pub struct CountMatrix {
    pub camera_ids: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub video: CountGrid,
    pub metadata: CountGrid,
}

impl CountMatrix {
    pub fn build(camera_ids: &[String], dates: &[NaiveDate]) -> Self {
        Self {
            camera_ids: camera_ids.to_vec(),
            dates: dates.to_vec(),
            video: CountGrid::zeros(camera_ids.len(), dates.len()),
            metadata: CountGrid::zeros(camera_ids.len(), dates.len()),
        }
    }

    /// Drops the last date column when no camera has any video for it, which
    /// happens while the most recent night is still uploading. The metadata
    /// grid loses the same column. Returns the dropped date.
    pub fn trim_empty_trailing_date(&mut self) -> Option<NaiveDate> {
        let last = self.dates.len().checked_sub(1)?;
        if !self.video.column_is_zero(last) {
            return None;
        }
        self.video.drop_column(last);
        self.metadata.drop_column(last);
        self.dates.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap())
            .collect()
    }

    fn cameras(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("T{:02}", i)).collect()
    }

    #[test]
    fn test_build_shape_and_zeroed() {
        let m = CountMatrix::build(&cameras(3), &dates(5));
        assert_eq!(m.video.shape(), (3, 5));
        assert_eq!(m.metadata.shape(), (3, 5));
        assert_eq!(m.video.total(), 0);
        assert_eq!(m.metadata.max(), 0);
    }

    #[test]
    fn test_set_and_row() {
        let mut grid = CountGrid::zeros(2, 3);
        grid.set(1, 2, 7);
        grid.set(0, 0, 1);
        assert_eq!(grid.row(1), &[0, 0, 7]);
        assert_eq!(grid.max(), 7);
        assert_eq!(grid.total(), 8);
    }

    #[test]
    fn test_trim_drops_all_zero_last_column() {
        let mut m = CountMatrix::build(&cameras(2), &dates(3));
        m.video.set(0, 1, 4);
        m.metadata.set(1, 2, 2);
        let dropped = m.trim_empty_trailing_date();
        assert_eq!(dropped, Some(dates(3)[2]));
        assert_eq!(m.dates, dates(2));
        assert_eq!(m.video.shape(), (2, 2));
        assert_eq!(m.metadata.shape(), (2, 2));
        assert_eq!(m.video.get(0, 1), 4);
        assert_eq!(m.metadata.total(), 0);
    }

    #[test]
    fn test_trim_keeps_populated_last_column() {
        let mut m = CountMatrix::build(&cameras(2), &dates(3));
        m.video.set(1, 2, 1);
        assert_eq!(m.trim_empty_trailing_date(), None);
        assert_eq!(m.video.shape(), (2, 3));
    }

    #[test]
    fn test_trim_empty_matrix() {
        let mut m = CountMatrix::build(&cameras(2), &[]);
        assert_eq!(m.trim_empty_trailing_date(), None);
    }
}
