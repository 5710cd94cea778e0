//! State stack
//!
//! The save/restore stack from spec §4.5: a full frame captures cursor, clip, pen,
//! and translation; a pen-only frame captures just the pen. Grounded in spec §9's
//! "small tagged union" design note — the same two-variant shape
//! `dreg-core::input::InputContext` uses for its mode stack.

use crate::clip::Clip;
use crate::pen::Pen;

#[derive(Clone, Debug)]
enum Frame {
    Full {
        cursor: Option<(i32, i32)>,
        clip: Clip,
        base_pen: Option<Pen>,
    },
    PenOnly {
        base_pen: Option<Pen>,
    },
}

/// The result of popping a frame: the pen to restore, and — for a full frame — the
/// cursor and clip to restore alongside it.
pub struct Restored {
    pub pen: Option<Pen>,
    pub cursor_and_clip: Option<(Option<(i32, i32)>, Clip)>,
}

#[derive(Clone, Debug, Default)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, cursor: Option<(i32, i32)>, clip: Clip, base_pen: Option<Pen>) {
        self.frames.push(Frame::Full {
            cursor,
            clip,
            base_pen,
        });
    }

    pub fn save_pen(&mut self, base_pen: Option<Pen>) {
        self.frames.push(Frame::PenOnly { base_pen });
    }

    pub fn restore(&mut self) -> Option<Restored> {
        match self.frames.pop()? {
            Frame::Full {
                cursor,
                clip,
                base_pen,
            } => Some(Restored {
                pen: base_pen,
                cursor_and_clip: Some((cursor, clip)),
            }),
            Frame::PenOnly { base_pen } => Some(Restored {
                pen: base_pen,
                cursor_and_clip: None,
            }),
        }
    }

    /// The pen recorded by the top frame, used by `set_pen`'s merge rule (spec §4.5).
    pub fn top_base_pen(&self) -> Option<&Pen> {
        match self.frames.last()? {
            Frame::Full { base_pen, .. } | Frame::PenOnly { base_pen } => base_pen.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_frame_restores_cursor_and_clip() {
        let mut stack = Stack::new();
        let clip = Clip::full(10, 20);
        stack.save(Some((3, 4)), clip, None);
        let restored = stack.restore().unwrap();
        assert!(restored.cursor_and_clip.is_some());
        let (cursor, _clip) = restored.cursor_and_clip.unwrap();
        assert_eq!(cursor, Some((3, 4)));
    }

    #[test]
    fn pen_only_frame_has_no_cursor_or_clip() {
        let mut stack = Stack::new();
        stack.save_pen(Some(Pen::empty()));
        let restored = stack.restore().unwrap();
        assert!(restored.cursor_and_clip.is_none());
    }

    #[test]
    fn restore_on_empty_stack_is_none() {
        let mut stack = Stack::new();
        assert!(stack.restore().is_none());
    }
}
