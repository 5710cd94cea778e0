//! Render buffer
//!
//! [`RenderBuffer`] wires every collaborator together: the [`Grid`] and its
//! [`PenTable`]/[`TextTable`], the virtual cursor, the [`Clip`], the current pen, and
//! the [`Stack`]. Grounded in the overall shape of `dreg-core::buffer::Buffer` plus the
//! flush loop of `dreg`'s root `src/terminal.rs` (`Terminal::flush`'s diff-and-emit
//! walk), generalized from "diff against previous frame" to "walk a span grid and emit
//! the minimal sink calls, then reset" (spec §4.7).

use crate::cell::Cell;
use crate::clip::Clip;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::intern::{PenTable, TextTable};
use crate::line::{glyph_for_mask, Cap, Direction, LineMask};
use crate::pen::Pen;
use crate::rect::Rect;
use crate::sink::WindowSink;
use crate::stack::Stack;
use crate::width::{display_width, substring_by_display_columns};

/// A terminal render buffer: accumulates drawing operations over a `lines × cols`
/// grid and flushes a minimal ordered sequence of sink calls.
#[derive(Debug)]
pub struct RenderBuffer {
    grid: Grid,
    pens: PenTable,
    texts: TextTable,
    cursor: Option<(i32, i32)>,
    clip: Clip,
    current_pen: Option<Pen>,
    stack: Stack,
}

impl RenderBuffer {
    /// Build a new buffer of `lines` rows and `cols` columns, fully visible, with an
    /// unset cursor and no active pen.
    pub fn new(lines: u16, cols: u16) -> Self {
        Self {
            grid: Grid::new(lines, cols),
            pens: PenTable::new(),
            texts: TextTable::new(),
            cursor: None,
            clip: Clip::full(lines, cols),
            current_pen: None,
            stack: Stack::new(),
        }
    }

    pub fn lines(&self) -> u16 {
        self.grid.lines()
    }

    pub fn cols(&self) -> u16 {
        self.grid.cols()
    }

    pub fn cursor(&self) -> Option<(i32, i32)> {
        self.cursor
    }

    /// Validate the grid's head/continuation invariants (spec §8). Exposed so tests
    /// that drive arbitrary operation sequences can assert nothing broke, without
    /// giving callers access to the grid itself.
    pub fn check_invariants(&self) -> Result<()> {
        self.grid.check_invariants()
    }

    fn resolve_pen(&self, explicit: Option<&Pen>) -> Result<Pen> {
        match (explicit, &self.current_pen) {
            (Some(_), Some(_)) => Err(Error::PenConflict),
            (Some(p), None) => Ok(p.clone()),
            (None, Some(p)) => Ok(p.clone()),
            (None, None) => Ok(Pen::empty()),
        }
    }

    // -- absolute drawing operations (spec §4.3) -----------------------------------

    pub fn skip_at(&mut self, line: i32, col: i32, len: u16) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let Some((l, c, len2, _src)) = self.clip.transform(line, col, len) else {
            return Ok(());
        };
        self.grid.make_span(l, c, len2, &self.texts)?;
        *self.grid.cell_mut(l, c) = Cell::Skip { len: len2 };
        Ok(())
    }

    pub fn text_at(&mut self, line: i32, col: i32, text: &str, pen: &Pen) -> Result<()> {
        let width = display_width(text);
        if width == 0 {
            return Ok(());
        }
        let Some((l, c, len2, src_offset)) = self.clip.transform(line, col, width) else {
            return Ok(());
        };
        let text_idx = self.texts.intern(text);
        let pen_idx = self.pens.intern(pen);
        self.grid.make_span(l, c, len2, &self.texts)?;
        *self.grid.cell_mut(l, c) = Cell::Text {
            len: len2,
            pen_idx,
            text_idx,
            text_offs: src_offset,
        };
        Ok(())
    }

    pub fn erase_at(&mut self, line: i32, col: i32, len: u16, pen: &Pen) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let Some((l, c, len2, _src)) = self.clip.transform(line, col, len) else {
            return Ok(());
        };
        let pen_idx = self.pens.intern(pen);
        self.grid.make_span(l, c, len2, &self.texts)?;
        *self.grid.cell_mut(l, c) = Cell::Erase { len: len2, pen_idx };
        Ok(())
    }

    /// A 1-wide [`Self::text_at`] whose interned string is a single codepoint.
    pub fn char_at(&mut self, line: i32, col: i32, ch: char, pen: &Pen) -> Result<()> {
        let mut buf = [0u8; 4];
        self.text_at(line, col, ch.encode_utf8(&mut buf), pen)
    }

    /// Empty the interning tables, then re-erase every line with `pen` (spec §4.3).
    pub fn clear(&mut self, pen: &Pen) -> Result<()> {
        self.pens.clear();
        self.texts.clear();
        let cols = self.grid.cols();
        for line in 0..self.grid.lines() {
            self.erase_at(line as i32, 0, cols, pen)?;
        }
        Ok(())
    }

    // -- cursor-relative drawing operations (spec §4.3) ------------------------------

    pub fn goto(&mut self, line: i32, col: i32) {
        self.cursor = Some((line, col));
    }

    /// Fail with [`Error::OutOfRange`] if `[col, col + len)` on `line` would be fully
    /// clipped away. Relative operations hard-fail here rather than silently no-op the
    /// way their absolute counterparts do (spec §7): a cursor driven out of range by
    /// `goto` is a caller bug, not a clip to report quietly.
    fn require_in_range(&self, line: i32, col: i32, len: u16, what: &'static str) -> Result<()> {
        if len > 0 && self.clip.transform(line, col, len).is_none() {
            return Err(Error::OutOfRange(what));
        }
        Ok(())
    }

    pub fn text(&mut self, text: &str, pen: Option<&Pen>) -> Result<()> {
        let (line, col) = self.cursor.ok_or(Error::NoCursor)?;
        let resolved = self.resolve_pen(pen)?;
        let width = display_width(text);
        self.require_in_range(line, col, width, "text: cursor position out of range")?;
        self.text_at(line, col, text, &resolved)?;
        self.cursor = Some((line, col + width as i32));
        Ok(())
    }

    pub fn erase(&mut self, len: u16, pen: Option<&Pen>) -> Result<()> {
        let (line, col) = self.cursor.ok_or(Error::NoCursor)?;
        let resolved = self.resolve_pen(pen)?;
        self.require_in_range(line, col, len, "erase: cursor position out of range")?;
        self.erase_at(line, col, len, &resolved)?;
        self.cursor = Some((line, col + len as i32));
        Ok(())
    }

    pub fn skip(&mut self, len: u16) -> Result<()> {
        let (_, col) = self.cursor.ok_or(Error::NoCursor)?;
        let target = col
            .checked_add(len as i32)
            .ok_or(Error::OutOfRange("skip: length overflows column range"))?;
        self.skip_to(target)
    }

    /// Skip inclusive to `col`. If the cursor is already at or past `col`, just move
    /// the cursor (backwards) with no buffer change.
    pub fn skip_to(&mut self, col: i32) -> Result<()> {
        let (line, cur_col) = self.cursor.ok_or(Error::NoCursor)?;
        if col <= cur_col {
            self.cursor = Some((line, col));
            return Ok(());
        }
        let len = u16::try_from(col - cur_col)
            .map_err(|_| Error::OutOfRange("skip_to: target column too far from cursor"))?;
        self.require_in_range(line, cur_col, len, "skip_to: range out of range")?;
        self.skip_at(line, cur_col, len)?;
        self.cursor = Some((line, col));
        Ok(())
    }

    /// Erase inclusive to `col`. If the cursor is already at or past `col`, just move
    /// the cursor (backwards) with no buffer change.
    pub fn erase_to(&mut self, col: i32, pen: Option<&Pen>) -> Result<()> {
        let (line, cur_col) = self.cursor.ok_or(Error::NoCursor)?;
        let resolved = self.resolve_pen(pen)?;
        if col <= cur_col {
            self.cursor = Some((line, col));
            return Ok(());
        }
        let len = u16::try_from(col - cur_col)
            .map_err(|_| Error::OutOfRange("erase_to: target column too far from cursor"))?;
        self.require_in_range(line, cur_col, len, "erase_to: range out of range")?;
        self.erase_at(line, cur_col, len, &resolved)?;
        self.cursor = Some((line, col));
        Ok(())
    }

    // -- line engine (spec §4.4) ------------------------------------------------------

    pub fn line_cell(&mut self, line: i32, col: i32, bits: u8, pen: &Pen) -> Result<()> {
        let Some((l, c, _len, _src)) = self.clip.transform(line, col, 1) else {
            return Ok(());
        };
        let pen_idx = self.pens.intern(pen);
        let already_line = matches!(self.grid.cell(l, c), Cell::Line { .. });
        if !already_line {
            self.grid.make_span(l, c, 1, &self.texts)?;
            *self.grid.cell_mut(l, c) = Cell::Line {
                pen_idx,
                mask: LineMask::EMPTY,
            };
        } else {
            let existing_pen_idx = match self.grid.cell(l, c) {
                Cell::Line { pen_idx, .. } => *pen_idx,
                _ => unreachable!(),
            };
            if existing_pen_idx != pen_idx {
                log::warn!(
                    "pen collision on line cell ({l}, {c}): replacing pen {existing_pen_idx} with {pen_idx}"
                );
                *self.grid.cell_mut(l, c) = Cell::Line {
                    pen_idx,
                    mask: LineMask::EMPTY,
                };
            }
        }
        if let Cell::Line { mask, .. } = self.grid.cell_mut(l, c) {
            *mask = mask.or_bits(bits);
        }
        Ok(())
    }

    pub fn hline_at(
        &mut self,
        line: i32,
        start: i32,
        end: i32,
        weight: u8,
        pen: &Pen,
        caps: Cap,
    ) -> Result<()> {
        let mut col = start;
        while col <= end {
            let mut bits = 0u8;
            let has_west = !(col == start && !caps.contains(Cap::START));
            let has_east = !(col == end && !caps.contains(Cap::END));
            if has_west {
                bits |= LineMask::bits_for(Direction::West, weight);
            }
            if has_east {
                bits |= LineMask::bits_for(Direction::East, weight);
            }
            self.line_cell(line, col, bits, pen)?;
            col += 1;
        }
        Ok(())
    }

    pub fn vline_at(
        &mut self,
        col: i32,
        start: i32,
        end: i32,
        weight: u8,
        pen: &Pen,
        caps: Cap,
    ) -> Result<()> {
        let mut line = start;
        while line <= end {
            let mut bits = 0u8;
            let has_north = !(line == start && !caps.contains(Cap::START));
            let has_south = !(line == end && !caps.contains(Cap::END));
            if has_north {
                bits |= LineMask::bits_for(Direction::North, weight);
            }
            if has_south {
                bits |= LineMask::bits_for(Direction::South, weight);
            }
            self.line_cell(line, col, bits, pen)?;
            line += 1;
        }
        Ok(())
    }

    // -- clipping & translation (spec §4.6) -------------------------------------------

    pub fn clip(&mut self, rect: Rect) {
        self.clip.clip(rect);
    }

    pub fn translate(&mut self, d_line: i32, d_col: i32) {
        self.clip.translate(d_line, d_col);
    }

    // -- state stack (spec §4.5) -------------------------------------------------------

    pub fn save(&mut self) {
        self.stack.save(self.cursor, self.clip, self.current_pen.clone());
    }

    pub fn save_pen(&mut self) {
        self.stack.save_pen(self.current_pen.clone());
    }

    pub fn restore(&mut self) {
        if let Some(restored) = self.stack.restore() {
            self.current_pen = restored.pen;
            if let Some((cursor, clip)) = restored.cursor_and_clip {
                self.cursor = cursor;
                self.clip = clip;
            }
        }
    }

    pub fn set_pen(&mut self, pen: Option<Pen>) {
        let base = self.stack.top_base_pen().cloned();
        self.current_pen = match (base, pen) {
            (Some(base), Some(p)) => Some(Pen::merge(&base, &p)),
            (Some(base), None) => Some(Pen::merge(&base, &Pen::empty())),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        };
    }

    // -- flush (spec §4.7) --------------------------------------------------------------

    /// Walk the grid in row-major order, emit the minimal sink call sequence, then
    /// reset the buffer to its initial state.
    pub fn flush_to_window<S: WindowSink>(&mut self, sink: &mut S) -> Result<()> {
        let cols = self.grid.cols();
        for line in 0..self.grid.lines() {
            let mut phys_col: Option<u16> = None;
            let mut col = 0u16;
            while col < cols {
                let cell = self.grid.cell(line, col).clone();
                match cell {
                    Cell::Skip { len } => {
                        col += len;
                    }
                    Cell::Cont { .. } => {
                        return Err(Error::InvariantViolation(
                            "Cont cell encountered at head position during flush",
                        ));
                    }
                    Cell::Text {
                        len,
                        pen_idx,
                        text_idx,
                        text_offs,
                    } => {
                        if phys_col != Some(col) {
                            sink.goto(line, col);
                        }
                        let text = self.texts.get(text_idx);
                        let slice = substring_by_display_columns(text, text_offs, len);
                        let pen = self.pens.get(pen_idx).clone();
                        sink.print(&slice, &pen);
                        col += len;
                        phys_col = Some(col);
                    }
                    Cell::Erase { len, pen_idx } => {
                        if phys_col != Some(col) {
                            sink.goto(line, col);
                        }
                        let next_col = col + len;
                        let next_is_skip = next_col >= cols
                            || matches!(self.grid.cell(line, next_col), Cell::Skip { .. });
                        let move_end = next_col < cols && !next_is_skip;
                        let pen = self.pens.get(pen_idx).clone();
                        sink.erasech(len, move_end, &pen);
                        col = next_col;
                        phys_col = if move_end { Some(col) } else { None };
                    }
                    Cell::Line { pen_idx, mask } => {
                        if phys_col != Some(col) {
                            sink.goto(line, col);
                        }
                        let mut chars = String::new();
                        chars.push(glyph_for_mask(mask));
                        let mut end = col + 1;
                        while end < cols {
                            match self.grid.cell(line, end) {
                                Cell::Line {
                                    pen_idx: p,
                                    mask: m,
                                } if *p == pen_idx => {
                                    chars.push(glyph_for_mask(*m));
                                    end += 1;
                                }
                                _ => break,
                            }
                        }
                        let pen = self.pens.get(pen_idx).clone();
                        sink.print(&chars, &pen);
                        col = end;
                        phys_col = Some(col);
                    }
                }
            }
        }
        self.reset();
        Ok(())
    }

    /// Return the buffer to its initial state: empty grid, empty interning tables, no
    /// cursor, full clip, no pen, empty stack.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.pens.clear();
        self.texts.clear();
        self.cursor = None;
        self.clip = Clip::full(self.grid.lines(), self.grid.cols());
        self.current_pen = None;
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pen::AttrValue;
    use crate::sink::{Call, RecordingSink};
    use pretty_assertions::assert_eq;

    #[test]
    fn basic_text_flushes_single_print() {
        let mut buf = RenderBuffer::new(10, 20);
        buf.text_at(2, 5, "Hello, world!", &Pen::empty()).unwrap();
        let mut sink = RecordingSink::new();
        buf.flush_to_window(&mut sink).unwrap();
        assert_eq!(
            sink.calls,
            vec![
                Call::Goto { line: 2, col: 5 },
                Call::Print {
                    text: "Hello, world!".to_string(),
                    pen: Pen::empty()
                },
            ]
        );
    }

    #[test]
    fn overlapping_text_splits_span() {
        let mut buf = RenderBuffer::new(10, 20);
        let fg1 = Pen::new([("fg", AttrValue::Int(1))]);
        let fg2 = Pen::new([("fg", AttrValue::Int(2))]);
        buf.text_at(0, 0, "Some long text", &fg1).unwrap();
        buf.text_at(0, 5, "more", &fg2).unwrap();
        let mut sink = RecordingSink::new();
        buf.flush_to_window(&mut sink).unwrap();
        assert_eq!(
            sink.calls,
            vec![
                Call::Goto { line: 0, col: 0 },
                Call::Print {
                    text: "Some ".to_string(),
                    pen: fg1.clone()
                },
                Call::Print {
                    text: "more".to_string(),
                    pen: fg2
                },
                Call::Print {
                    text: " text".to_string(),
                    pen: fg1
                },
            ]
        );
    }

    #[test]
    fn flush_resets_buffer() {
        let mut buf = RenderBuffer::new(3, 3);
        buf.text_at(0, 0, "hi", &Pen::empty()).unwrap();
        let mut sink = RecordingSink::new();
        buf.flush_to_window(&mut sink).unwrap();
        let mut sink2 = RecordingSink::new();
        buf.flush_to_window(&mut sink2).unwrap();
        assert!(sink2.calls.is_empty());
    }

    #[test]
    fn relative_ops_require_cursor() {
        let mut buf = RenderBuffer::new(5, 5);
        assert_eq!(buf.text("x", None), Err(Error::NoCursor));
    }

    #[test]
    fn relative_text_rejects_pen_conflict() {
        let mut buf = RenderBuffer::new(5, 5);
        buf.goto(0, 0);
        buf.set_pen(Some(Pen::empty()));
        assert_eq!(
            buf.text("x", Some(&Pen::new([("fg", AttrValue::Int(1))]))),
            Err(Error::PenConflict)
        );
    }

    #[test]
    fn relative_text_hard_fails_out_of_range() {
        let mut buf = RenderBuffer::new(10, 20);
        buf.goto(1000, 0);
        assert!(matches!(buf.text("x", None), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn relative_erase_hard_fails_out_of_range() {
        let mut buf = RenderBuffer::new(10, 20);
        buf.goto(-5, 0);
        assert!(matches!(buf.erase(3, None), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn skip_to_far_column_hard_fails_instead_of_truncating() {
        let mut buf = RenderBuffer::new(10, 20);
        buf.goto(0, 0);
        // col - cur_col overflows u16; must error rather than silently truncate.
        assert!(matches!(
            buf.skip_to(i32::from(u16::MAX) + 10),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn absolute_ops_still_clip_silently() {
        let mut buf = RenderBuffer::new(10, 20);
        // Absolute operations remain clip-is-success: no error for an out-of-range row.
        assert_eq!(buf.text_at(1000, 0, "x", &Pen::empty()), Ok(()));
    }

    #[test]
    fn clipping_past_left_and_right_edges() {
        let mut buf = RenderBuffer::new(10, 20);
        buf.text_at(4, -3, "[LLLLLLLL]", &Pen::empty()).unwrap();
        buf.text_at(5, 15, "[RRRRRRRR]", &Pen::empty()).unwrap();
        let mut sink = RecordingSink::new();
        buf.flush_to_window(&mut sink).unwrap();
        assert_eq!(
            sink.calls,
            vec![
                Call::Goto { line: 4, col: 0 },
                Call::Print {
                    text: "LLLLLL]".to_string(),
                    pen: Pen::empty()
                },
                Call::Goto { line: 5, col: 15 },
                Call::Print {
                    text: "[RRRR".to_string(),
                    pen: Pen::empty()
                },
            ]
        );
    }

    #[test]
    fn save_restore_pen_merges_over_base() {
        let mut buf = RenderBuffer::new(10, 20);
        buf.goto(3, 0);
        buf.set_pen(Some(Pen::new([("bg", AttrValue::Int(1))])));
        buf.text("123", None).unwrap();
        buf.save_pen();
        buf.set_pen(Some(Pen::new([("fg", AttrValue::Int(4))])));
        buf.text("456", None).unwrap();
        buf.restore();
        buf.text("789", None).unwrap();

        let mut sink = RecordingSink::new();
        buf.flush_to_window(&mut sink).unwrap();
        let prints: Vec<_> = sink
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Print { text, pen } => Some((text.clone(), pen.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            prints,
            vec![
                ("123".to_string(), Pen::new([("bg", AttrValue::Int(1))])),
                (
                    "456".to_string(),
                    Pen::new([("bg", AttrValue::Int(1)), ("fg", AttrValue::Int(4))])
                ),
                ("789".to_string(), Pen::new([("bg", AttrValue::Int(1))])),
            ]
        );
    }

    #[test]
    fn line_merging_produces_expected_glyphs() {
        let mut buf = RenderBuffer::new(30, 30);
        let pen = Pen::empty();
        for row in [10, 12, 14] {
            buf.hline_at(row, 10, 14, crate::line::LINE_SINGLE, &pen, Cap::empty())
                .unwrap();
        }
        for col in [10, 12, 14] {
            buf.vline_at(col, 10, 14, crate::line::LINE_SINGLE, &pen, Cap::empty())
                .unwrap();
        }
        assert!(matches!(buf.grid.cell(10, 10), Cell::Line { mask, .. } if glyph_for_mask(*mask) == '┌'));
        assert!(matches!(buf.grid.cell(10, 12), Cell::Line { mask, .. } if glyph_for_mask(*mask) == '┬'));
        assert!(matches!(buf.grid.cell(10, 14), Cell::Line { mask, .. } if glyph_for_mask(*mask) == '┐'));
        assert!(matches!(buf.grid.cell(12, 12), Cell::Line { mask, .. } if glyph_for_mask(*mask) == '┼'));
        assert!(matches!(buf.grid.cell(14, 14), Cell::Line { mask, .. } if glyph_for_mask(*mask) == '┘'));
    }
}
