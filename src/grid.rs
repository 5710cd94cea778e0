//! Grid
//!
//! The `lines × cols` cell matrix and the span-splitting algorithm (spec §4.1).
//! Generalizes `dreg-core::buffer::Buffer`'s flat cell store (one cell slot per
//! `(x, y)`, `index_of`/`pos_of` arithmetic) from "every cell independently painted"
//! to "every cell belongs to a span headed by one of its members".

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::intern::TextTable;
use crate::width::split_point_columns;

/// The fixed `lines × cols` matrix of cells.
#[derive(Clone, Debug)]
pub struct Grid {
    lines: u16,
    cols: u16,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(lines: u16, cols: u16) -> Self {
        let rows = (0..lines).map(|_| Self::fresh_row(cols)).collect();
        Self { lines, cols, rows }
    }

    fn fresh_row(cols: u16) -> Vec<Cell> {
        let mut row = Vec::with_capacity(cols as usize);
        if cols > 0 {
            row.push(Cell::skip(cols));
            for start_col in 1..cols {
                let _ = start_col;
                row.push(Cell::Cont { start_col: 0 });
            }
        }
        row
    }

    pub fn lines(&self) -> u16 {
        self.lines
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn row(&self, line: u16) -> &[Cell] {
        &self.rows[line as usize]
    }

    pub fn cell(&self, line: u16, col: u16) -> &Cell {
        &self.rows[line as usize][col as usize]
    }

    pub fn cell_mut(&mut self, line: u16, col: u16) -> &mut Cell {
        &mut self.rows[line as usize][col as usize]
    }

    /// Reset every row to its initial single-Skip-span state.
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            *row = Self::fresh_row(self.cols);
        }
    }

    /// Find the head cell enclosing column `at` on `line`: returns
    /// `(head_col, span_end_exclusive)`.
    fn enclosing(&self, line: u16, at: u16) -> (u16, u16) {
        let row = &self.rows[line as usize];
        let head_col = match &row[at as usize] {
            Cell::Cont { start_col } => *start_col,
            _ => at,
        };
        let len = row[head_col as usize]
            .head_len()
            .expect("enclosing head must have a length");
        (head_col, head_col + len)
    }

    /// Ensure column `at` is a span boundary (either already a head, or the start of
    /// a fresh tail head split out of whatever span currently crosses it).
    fn split_boundary(&mut self, line: u16, at: u16, texts: &TextTable) -> Result<()> {
        if at >= self.cols {
            return Ok(());
        }
        if self.rows[line as usize][at as usize].is_head() {
            return Ok(());
        }
        let (head_col, span_end) = self.enclosing(line, at);
        let head = self.rows[line as usize][head_col as usize].clone();
        let tail_len = span_end - at;

        let tail_state = match head {
            Cell::Skip { .. } => Cell::Skip { len: tail_len },
            Cell::Erase { pen_idx, .. } => Cell::Erase {
                len: tail_len,
                pen_idx,
            },
            Cell::Text {
                pen_idx,
                text_idx,
                text_offs,
                ..
            } => {
                let delta = at - head_col;
                let raw_offs = text_offs + delta;
                let original = texts.get(text_idx);
                let rounded = split_point_columns(original, raw_offs);
                Cell::Text {
                    len: tail_len,
                    pen_idx,
                    text_idx,
                    text_offs: rounded,
                }
            }
            Cell::Line { .. } | Cell::Cont { .. } => {
                return Err(Error::InvariantViolation(
                    "cannot split through a Line or Cont cell",
                ));
            }
        };

        let row = &mut self.rows[line as usize];
        row[at as usize] = tail_state;
        for c in (at + 1)..span_end {
            row[c as usize] = Cell::Cont { start_col: at };
        }
        row[head_col as usize].set_head_len(at - head_col);
        Ok(())
    }

    /// Carve out `[col, col + len)` on `line` as a fresh, writable span, splitting any
    /// pre-existing span it crosses so the grid invariants hold (spec §4.1). The new
    /// head cell is left in a placeholder `Skip` state; the caller overwrites its
    /// fields immediately after.
    pub fn make_span(&mut self, line: u16, col: u16, len: u16, texts: &TextTable) -> Result<()> {
        if len == 0 {
            return Err(Error::InvariantViolation("make_span called with len == 0"));
        }
        let target_end = col.checked_add(len).ok_or(Error::InvariantViolation(
            "make_span range overflows u16",
        ))?;
        if target_end > self.cols {
            return Err(Error::InvariantViolation(
                "make_span range exceeds grid width",
            ));
        }

        self.split_boundary(line, target_end, texts)?;
        self.split_boundary(line, col, texts)?;

        let row = &mut self.rows[line as usize];
        row[col as usize] = Cell::Skip { len };
        for c in (col + 1)..target_end {
            row[c as usize] = Cell::Cont { start_col: col };
        }
        Ok(())
    }

    /// Validate the head/continuation invariants (spec §8): no row has a `Cont` at
    /// column 0, and every `Cont` cell's `start_col` points to a head whose length
    /// covers it. Not on any hot path; exposed for tests, including the integration
    /// tests in `tests/` via [`crate::buffer::RenderBuffer::check_invariants`].
    pub(crate) fn check_invariants(&self) -> Result<()> {
        for (line_idx, row) in self.rows.iter().enumerate() {
            if !row.is_empty() && !row[0].is_head() {
                return Err(Error::InvariantViolation("column 0 is a Cont cell"));
            }
            let mut col = 0u16;
            while (col as usize) < row.len() {
                let cell = &row[col as usize];
                let len = cell.head_len().ok_or(Error::InvariantViolation(
                    "expected head cell while walking row",
                ))?;
                if len == 0 {
                    return Err(Error::InvariantViolation("zero-length head span"));
                }
                for c in (col + 1)..(col + len) {
                    match &row[c as usize] {
                        Cell::Cont { start_col } if *start_col == col => {}
                        _ => {
                            return Err(Error::InvariantViolation(
                                "Cont cell does not reference the correct head",
                            ));
                        }
                    }
                }
                let _ = line_idx;
                col += len;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn fresh_grid_is_all_skip() {
        let grid = Grid::new(2, 5);
        assert!(matches!(grid.cell(0, 0), Cell::Skip { len: 5 }));
        assert!(matches!(grid.cell(0, 4), Cell::Cont { start_col: 0 }));
        grid.check_invariants().unwrap();
    }

    #[test]
    fn make_span_splits_right_and_left() {
        let mut grid = Grid::new(1, 10);
        let texts = TextTable::new();
        grid.make_span(0, 2, 4, &texts).unwrap(); // claim [2,6)
        grid.check_invariants().unwrap();
        assert!(matches!(grid.cell(0, 0), Cell::Skip { len: 2 }));
        assert!(matches!(grid.cell(0, 2), Cell::Skip { len: 4 }));
        assert!(matches!(grid.cell(0, 6), Cell::Skip { len: 4 }));
    }

    #[test]
    fn make_span_splits_through_existing_text() {
        let mut grid = Grid::new(1, 20);
        let mut texts = TextTable::new();
        let idx = texts.intern("Some long text");
        grid.make_span(0, 0, 14, &texts).unwrap();
        *grid.cell_mut(0, 0) = Cell::Text {
            len: 14,
            pen_idx: 0,
            text_idx: idx,
            text_offs: 0,
        };
        grid.make_span(0, 5, 4, &texts).unwrap();
        grid.check_invariants().unwrap();
        // Tail head after the overwritten region should continue at text_offs 9.
        match grid.cell(0, 9) {
            Cell::Text { text_offs, len, .. } => {
                assert_eq!(*text_offs, 9);
                assert_eq!(*len, 5);
            }
            other => panic!("expected Text tail head, got {other:?}"),
        }
    }

    #[test]
    fn make_span_rejects_zero_length() {
        let mut grid = Grid::new(1, 10);
        let texts = TextTable::new();
        assert!(grid.make_span(0, 0, 0, &texts).is_err());
    }

    #[test]
    fn make_span_rejects_out_of_bounds() {
        let mut grid = Grid::new(1, 10);
        let texts = TextTable::new();
        assert!(grid.make_span(0, 8, 5, &texts).is_err());
    }
}
