//! Window sink
//!
//! The terminal window collaborator from spec §1/§6: accepts `goto`, `print`,
//! `erasech`. Declared an external interface only — `spanbuf` never talks to a real
//! terminal. Grounded in the *shape* of `dreg`'s `Terminal::flush` (root
//! `src/terminal.rs`), which drives a writer with the same three kinds of calls
//! (`MoveTo`, style-then-`Print`, and a `Clear`), but kept abstract per the spec.

use crate::pen::Pen;

/// The result of a `print`/`erasech` call: how many display columns were advanced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub columns: u16,
}

/// The terminal window sink invoked during [`crate::RenderBuffer::flush_to_window`].
pub trait WindowSink {
    /// Move the sink's cursor to `(line, col)`.
    fn goto(&mut self, line: u16, col: u16);

    /// Print `text` with `pen`, returning how many columns were printed.
    fn print(&mut self, text: &str, pen: &Pen) -> Position;

    /// Erase `len` columns with `pen`'s background. `move_end` is `true` iff the
    /// sink's cursor should be considered still-valid immediately after the erased
    /// run (spec §4.7: set iff a non-`Skip` cell follows on the same row).
    fn erasech(&mut self, len: u16, move_end: bool, pen: &Pen) -> Position;
}

/// A call recorded by [`RecordingSink`], for asserting exact flush sequences in tests.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Goto { line: u16, col: u16 },
    Print { text: String, pen: Pen },
    Erasech { len: u16, move_end: bool, pen: Pen },
}

/// A [`WindowSink`] that records every call instead of touching a real terminal.
///
/// Used throughout this crate's own test suite, the same way a fake backend would
/// stand in for `crossterm` in the teacher's tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<Call>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowSink for RecordingSink {
    fn goto(&mut self, line: u16, col: u16) {
        self.calls.push(Call::Goto { line, col });
    }

    fn print(&mut self, text: &str, pen: &Pen) -> Position {
        let columns = crate::width::display_width(text);
        self.calls.push(Call::Print {
            text: text.to_string(),
            pen: pen.clone(),
        });
        Position { columns }
    }

    fn erasech(&mut self, len: u16, move_end: bool, pen: &Pen) -> Position {
        self.calls.push(Call::Erasech {
            len,
            move_end,
            pen: pen.clone(),
        });
        Position { columns: len }
    }
}
