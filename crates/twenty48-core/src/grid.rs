//! Value grids: the snapshot and injection format shared with presentation layers.

use crate::error::GridError;

/// 4x4 tile values indexed `[row][col]`, 0 meaning empty.
pub type Grid = [[u32; 4]; 4];

/// Build a [`Grid`] from dynamically sized rows, checking the shape.
///
/// ```
/// use twenty48_core::grid::grid_from_rows;
/// let rows: Vec<Vec<u32>> = vec![vec![2, 2, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]];
/// assert_eq!(grid_from_rows(&rows).unwrap()[0], [2, 2, 0, 0]);
/// assert!(grid_from_rows(&rows[..3]).is_err());
/// ```
pub fn grid_from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Grid, GridError> {
    if rows.len() != 4 {
        return Err(GridError::RowCount(rows.len()));
    }
    let mut grid = [[0; 4]; 4];
    for (row, (dst, src)) in grid.iter_mut().zip(rows).enumerate() {
        let src = src.as_ref();
        if src.len() != 4 {
            return Err(GridError::RowLength { row, len: src.len() });
        }
        dst.copy_from_slice(src);
    }
    Ok(grid)
}

/// Number of non-empty cells.
pub fn count_tiles(grid: &Grid) -> usize {
    grid.iter().flatten().filter(|&&v| v != 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_rows() {
        let rows: Vec<Vec<u32>> = vec![vec![0; 4], vec![0; 4], vec![0; 5], vec![0; 4]];
        assert_eq!(
            grid_from_rows(&rows),
            Err(GridError::RowLength { row: 2, len: 5 })
        );
        let rows: Vec<Vec<u32>> = vec![vec![0; 4]; 5];
        assert_eq!(grid_from_rows(&rows), Err(GridError::RowCount(5)));
    }

    #[test]
    fn counts_occupied_cells() {
        let grid = [[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 15, 16]];
        assert_eq!(count_tiles(&grid), 16);
        assert_eq!(count_tiles(&[[2, 0, 0, 0], [0; 4], [0, 0, 4, 0], [0; 4]]), 2);
        assert_eq!(count_tiles(&[[0; 4]; 4]), 0);
    }
}
