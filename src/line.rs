//! Line engine
//!
//! Per-cell 8-bit direction/weight masks (spec §4.4), merged at flush time into a
//! Unicode box-drawing glyph via a 256-entry lookup table built once from a compact
//! literal list plus the documented fallback/degradation rules. No teacher file does
//! this kind of merge; the algorithm is built directly from spec §4.4 since this is
//! exactly the "core, non-derivable from a collaborator" logic the spec calls out.

use std::sync::OnceLock;

/// Line weight constants, exposed per spec §6.
pub const LINE_SINGLE: u8 = 1;
pub const LINE_DOUBLE: u8 = 2;
pub const LINE_THICK: u8 = 3;

bitflags::bitflags! {
    /// Which end(s) of a drawn line segment get a visible stub vs. a clean cut.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Cap: u8 {
        const START = 0b01;
        const END   = 0b10;
        const BOTH  = Self::START.bits() | Self::END.bits();
    }
}

/// One of the four directions a line segment can run in around a cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    fn shift(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 6,
        }
    }
}

/// The 8-bit encoding of line weights in four directions around one cell: four 2-bit
/// fields, `{0 = none, 1 = single, 2 = double, 3 = thick}`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct LineMask(pub u8);

impl LineMask {
    pub const EMPTY: Self = Self(0);

    pub fn weight(self, dir: Direction) -> u8 {
        (self.0 >> dir.shift()) & 0b11
    }

    /// Bits for setting `dir` to `weight`, suitable for OR-ing into an existing mask
    /// (spec §4.4 step 5: "OR `bits` into the mask").
    pub fn bits_for(dir: Direction, weight: u8) -> u8 {
        debug_assert!(weight <= 0b11);
        weight << dir.shift()
    }

    pub fn or_bits(self, bits: u8) -> Self {
        Self(self.0 | bits)
    }

    /// The mask with every THICK direction downgraded to [`LINE_SINGLE`], leaving
    /// `NONE`/`SINGLE`/`DOUBLE` directions untouched (spec §4.4 fallback step a: `mask
    /// & 0xAA`). Doubles survive this step so a mixed single/double glyph can still be
    /// found.
    fn thick_downgraded_to_single(self) -> Self {
        let mut out = 0u8;
        for dir in Direction::ALL {
            let w = self.weight(dir);
            out |= Self::bits_for(dir, if w == LINE_THICK { LINE_SINGLE } else { w });
        }
        Self(out)
    }

    /// The mask with every present direction forced down to [`LINE_SINGLE`]. Not part
    /// of the documented two-step fallback; used as a last-resort safety net below so
    /// a mask with no dedicated glyph for *any* subset of its directions (reachable
    /// only by setting [`LineMask`] bits directly, not through `hline_at`/`vline_at`)
    /// still resolves to something instead of panicking.
    fn fully_downgraded_to_single(self) -> Self {
        let mut out = 0u8;
        for dir in Direction::ALL {
            if self.weight(dir) != 0 {
                out |= Self::bits_for(dir, LINE_SINGLE);
            }
        }
        Self(out)
    }

    fn single_bits(dir: Direction) -> u8 {
        Self::bits_for(dir, LINE_SINGLE)
    }
}

/// Resolve a [`LineMask`] to the Unicode glyph that realizes it, applying the
/// documented fallback/degradation rules when the exact combination of weights has no
/// dedicated glyph.
pub fn glyph_for_mask(mask: LineMask) -> char {
    if mask.0 == 0 {
        return ' ';
    }
    let table = glyph_table();
    if let Some(c) = table[mask.0 as usize] {
        return c;
    }
    // Fallback (a): drop THICK directions to SINGLE, keep DOUBLE as-is.
    let thick_down = mask.thick_downgraded_to_single();
    if let Some(c) = table[thick_down.0 as usize] {
        return c;
    }
    // Fallback (b): downgrade one DOUBLE direction at a time to SINGLE, on top of (a).
    for dir in Direction::ALL {
        if thick_down.weight(dir) == LINE_DOUBLE {
            let candidate =
                LineMask(thick_down.0 & !(0b11 << dir.shift()) | LineMask::single_bits(dir));
            if let Some(c) = table[candidate.0 as usize] {
                return c;
            }
        }
    }
    // Safety net: drop every remaining direction to SINGLE. Not in the documented
    // algorithm, but guarantees resolution for masks with no Unicode glyph for any of
    // their mixed subsets (only reachable via hand-built LineMask bits).
    let all_single = mask.fully_downgraded_to_single();
    if let Some(c) = table[all_single.0 as usize] {
        return c;
    }
    unreachable!("embedded glyph table is incomplete for mask {:#010b}", mask.0)
}

fn mask_of(dirs: &[(Direction, u8)]) -> u8 {
    dirs.iter().fold(0u8, |acc, (d, w)| acc | LineMask::bits_for(*d, *w))
}

fn glyph_table() -> &'static [Option<char>; 256] {
    static TABLE: OnceLock<[Option<char>; 256]> = OnceLock::new();
    TABLE.get_or_init(build_glyph_table)
}

fn build_glyph_table() -> [Option<char>; 256] {
    use Direction::*;
    let mut table: [Option<char>; 256] = [None; 256];

    // The embedded glyph table: (character, direction/weight bit-or). This is the
    // literal mapping the spec requires implementations to reproduce exactly (§6).
    let entries: &[(char, &[(Direction, u8)])] = &[
        // -- single weight: half-line stubs --
        ('╵', &[(North, LINE_SINGLE)]),
        ('╶', &[(East, LINE_SINGLE)]),
        ('╷', &[(South, LINE_SINGLE)]),
        ('╴', &[(West, LINE_SINGLE)]),
        // -- single weight: corners, tees, cross --
        ('└', &[(North, LINE_SINGLE), (East, LINE_SINGLE)]),
        ('│', &[(North, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('┘', &[(North, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('┌', &[(East, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('─', &[(East, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('┐', &[(South, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('├', &[(North, LINE_SINGLE), (East, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('┴', &[(North, LINE_SINGLE), (East, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('┤', &[(North, LINE_SINGLE), (South, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('┬', &[(East, LINE_SINGLE), (South, LINE_SINGLE), (West, LINE_SINGLE)]),
        (
            '┼',
            &[
                (North, LINE_SINGLE),
                (East, LINE_SINGLE),
                (South, LINE_SINGLE),
                (West, LINE_SINGLE),
            ],
        ),
        // -- double weight: corners, tees, cross (no double half-lines in Unicode) --
        ('╚', &[(North, LINE_DOUBLE), (East, LINE_DOUBLE)]),
        ('║', &[(North, LINE_DOUBLE), (South, LINE_DOUBLE)]),
        ('╝', &[(North, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        ('╔', &[(East, LINE_DOUBLE), (South, LINE_DOUBLE)]),
        ('═', &[(East, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        ('╗', &[(South, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        ('╠', &[(North, LINE_DOUBLE), (East, LINE_DOUBLE), (South, LINE_DOUBLE)]),
        ('╩', &[(North, LINE_DOUBLE), (East, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        ('╣', &[(North, LINE_DOUBLE), (South, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        ('╦', &[(East, LINE_DOUBLE), (South, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        (
            '╬',
            &[
                (North, LINE_DOUBLE),
                (East, LINE_DOUBLE),
                (South, LINE_DOUBLE),
                (West, LINE_DOUBLE),
            ],
        ),
        // -- thick weight: half-line stubs --
        ('╹', &[(North, LINE_THICK)]),
        ('╺', &[(East, LINE_THICK)]),
        ('╻', &[(South, LINE_THICK)]),
        ('╸', &[(West, LINE_THICK)]),
        // -- thick weight: corners, tees, cross --
        ('┗', &[(North, LINE_THICK), (East, LINE_THICK)]),
        ('┃', &[(North, LINE_THICK), (South, LINE_THICK)]),
        ('┛', &[(North, LINE_THICK), (West, LINE_THICK)]),
        ('┏', &[(East, LINE_THICK), (South, LINE_THICK)]),
        ('━', &[(East, LINE_THICK), (West, LINE_THICK)]),
        ('┓', &[(South, LINE_THICK), (West, LINE_THICK)]),
        ('┣', &[(North, LINE_THICK), (East, LINE_THICK), (South, LINE_THICK)]),
        ('┻', &[(North, LINE_THICK), (East, LINE_THICK), (West, LINE_THICK)]),
        ('┫', &[(North, LINE_THICK), (South, LINE_THICK), (West, LINE_THICK)]),
        ('┳', &[(East, LINE_THICK), (South, LINE_THICK), (West, LINE_THICK)]),
        (
            '╋',
            &[
                (North, LINE_THICK),
                (East, LINE_THICK),
                (South, LINE_THICK),
                (West, LINE_THICK),
            ],
        ),
        // -- mixed single/double: corners --
        ('╒', &[(South, LINE_SINGLE), (East, LINE_DOUBLE)]),
        ('╓', &[(South, LINE_DOUBLE), (East, LINE_SINGLE)]),
        ('╕', &[(South, LINE_SINGLE), (West, LINE_DOUBLE)]),
        ('╖', &[(South, LINE_DOUBLE), (West, LINE_SINGLE)]),
        ('╘', &[(North, LINE_SINGLE), (East, LINE_DOUBLE)]),
        ('╙', &[(North, LINE_DOUBLE), (East, LINE_SINGLE)]),
        ('╛', &[(North, LINE_SINGLE), (West, LINE_DOUBLE)]),
        ('╜', &[(North, LINE_DOUBLE), (West, LINE_SINGLE)]),
        // -- mixed single/double: tees --
        ('╞', &[(North, LINE_SINGLE), (South, LINE_SINGLE), (East, LINE_DOUBLE)]),
        ('╟', &[(North, LINE_DOUBLE), (South, LINE_DOUBLE), (East, LINE_SINGLE)]),
        ('╡', &[(North, LINE_SINGLE), (South, LINE_SINGLE), (West, LINE_DOUBLE)]),
        ('╢', &[(North, LINE_DOUBLE), (South, LINE_DOUBLE), (West, LINE_SINGLE)]),
        ('╤', &[(East, LINE_DOUBLE), (South, LINE_SINGLE), (West, LINE_DOUBLE)]),
        ('╥', &[(East, LINE_SINGLE), (South, LINE_DOUBLE), (West, LINE_SINGLE)]),
        ('╧', &[(North, LINE_SINGLE), (East, LINE_DOUBLE), (West, LINE_DOUBLE)]),
        ('╨', &[(North, LINE_DOUBLE), (East, LINE_SINGLE), (West, LINE_SINGLE)]),
        // -- mixed single/double: crosses --
        (
            '╪',
            &[(North, LINE_SINGLE), (South, LINE_SINGLE), (East, LINE_DOUBLE), (West, LINE_DOUBLE)],
        ),
        (
            '╫',
            &[(North, LINE_DOUBLE), (South, LINE_DOUBLE), (East, LINE_SINGLE), (West, LINE_SINGLE)],
        ),
        // -- mixed single/thick: corners --
        ('┍', &[(South, LINE_SINGLE), (East, LINE_THICK)]),
        ('┎', &[(South, LINE_THICK), (East, LINE_SINGLE)]),
        ('┑', &[(South, LINE_SINGLE), (West, LINE_THICK)]),
        ('┒', &[(South, LINE_THICK), (West, LINE_SINGLE)]),
        ('┕', &[(North, LINE_SINGLE), (East, LINE_THICK)]),
        ('┖', &[(North, LINE_THICK), (East, LINE_SINGLE)]),
        ('┙', &[(North, LINE_SINGLE), (West, LINE_THICK)]),
        ('┚', &[(North, LINE_THICK), (West, LINE_SINGLE)]),
        // -- mixed single/thick: tees, east/west side --
        ('┝', &[(North, LINE_SINGLE), (South, LINE_SINGLE), (East, LINE_THICK)]),
        ('┞', &[(North, LINE_THICK), (East, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('┟', &[(South, LINE_THICK), (East, LINE_SINGLE), (North, LINE_SINGLE)]),
        ('┠', &[(North, LINE_THICK), (South, LINE_THICK), (East, LINE_SINGLE)]),
        ('┡', &[(South, LINE_SINGLE), (East, LINE_THICK), (North, LINE_THICK)]),
        ('┢', &[(North, LINE_SINGLE), (East, LINE_THICK), (South, LINE_THICK)]),
        ('┥', &[(North, LINE_SINGLE), (South, LINE_SINGLE), (West, LINE_THICK)]),
        ('┦', &[(North, LINE_THICK), (West, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('┧', &[(South, LINE_THICK), (West, LINE_SINGLE), (North, LINE_SINGLE)]),
        ('┨', &[(North, LINE_THICK), (South, LINE_THICK), (West, LINE_SINGLE)]),
        ('┩', &[(South, LINE_SINGLE), (West, LINE_THICK), (North, LINE_THICK)]),
        ('┪', &[(North, LINE_SINGLE), (West, LINE_THICK), (South, LINE_THICK)]),
        // -- mixed single/thick: tees, north/south side --
        ('┭', &[(West, LINE_THICK), (East, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('┮', &[(East, LINE_THICK), (West, LINE_SINGLE), (South, LINE_SINGLE)]),
        ('┯', &[(South, LINE_SINGLE), (East, LINE_THICK), (West, LINE_THICK)]),
        ('┰', &[(South, LINE_THICK), (East, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('┱', &[(East, LINE_SINGLE), (West, LINE_THICK), (South, LINE_THICK)]),
        ('┲', &[(West, LINE_SINGLE), (East, LINE_THICK), (South, LINE_THICK)]),
        ('┵', &[(West, LINE_THICK), (East, LINE_SINGLE), (North, LINE_SINGLE)]),
        ('┶', &[(East, LINE_THICK), (West, LINE_SINGLE), (North, LINE_SINGLE)]),
        ('┷', &[(North, LINE_SINGLE), (East, LINE_THICK), (West, LINE_THICK)]),
        ('┸', &[(North, LINE_THICK), (East, LINE_SINGLE), (West, LINE_SINGLE)]),
        ('┹', &[(East, LINE_SINGLE), (West, LINE_THICK), (North, LINE_THICK)]),
        ('┺', &[(West, LINE_SINGLE), (East, LINE_THICK), (North, LINE_THICK)]),
        // -- mixed single/thick: crosses --
        (
            '┽',
            &[(West, LINE_THICK), (East, LINE_SINGLE), (North, LINE_SINGLE), (South, LINE_SINGLE)],
        ),
        (
            '┾',
            &[(East, LINE_THICK), (West, LINE_SINGLE), (North, LINE_SINGLE), (South, LINE_SINGLE)],
        ),
        (
            '┿',
            &[(North, LINE_SINGLE), (South, LINE_SINGLE), (East, LINE_THICK), (West, LINE_THICK)],
        ),
        (
            '╀',
            &[(North, LINE_THICK), (South, LINE_SINGLE), (East, LINE_SINGLE), (West, LINE_SINGLE)],
        ),
        (
            '╁',
            &[(South, LINE_THICK), (North, LINE_SINGLE), (East, LINE_SINGLE), (West, LINE_SINGLE)],
        ),
        (
            '╂',
            &[(North, LINE_THICK), (South, LINE_THICK), (East, LINE_SINGLE), (West, LINE_SINGLE)],
        ),
        (
            '╃',
            &[(West, LINE_THICK), (North, LINE_THICK), (East, LINE_SINGLE), (South, LINE_SINGLE)],
        ),
        (
            '╄',
            &[(East, LINE_THICK), (North, LINE_THICK), (West, LINE_SINGLE), (South, LINE_SINGLE)],
        ),
        (
            '╅',
            &[(West, LINE_THICK), (South, LINE_THICK), (East, LINE_SINGLE), (North, LINE_SINGLE)],
        ),
        (
            '╆',
            &[(East, LINE_THICK), (South, LINE_THICK), (West, LINE_SINGLE), (North, LINE_SINGLE)],
        ),
        (
            '╇',
            &[(South, LINE_SINGLE), (North, LINE_THICK), (East, LINE_THICK), (West, LINE_THICK)],
        ),
        (
            '╈',
            &[(North, LINE_SINGLE), (South, LINE_THICK), (East, LINE_THICK), (West, LINE_THICK)],
        ),
        (
            '╉',
            &[(East, LINE_SINGLE), (West, LINE_THICK), (North, LINE_THICK), (South, LINE_THICK)],
        ),
        (
            '╊',
            &[(West, LINE_SINGLE), (East, LINE_THICK), (North, LINE_THICK), (South, LINE_THICK)],
        ),
    ];

    for (ch, dirs) in entries {
        let mask = mask_of(dirs);
        table[mask as usize] = Some(*ch);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_single_corner() {
        let mask = LineMask(0).or_bits(LineMask::bits_for(Direction::South, LINE_SINGLE));
        let mask = mask.or_bits(LineMask::bits_for(Direction::East, LINE_SINGLE));
        assert_eq!(glyph_for_mask(mask), '┌');
    }

    #[test]
    fn exact_cross_double() {
        let mut bits = 0u8;
        for d in Direction::ALL {
            bits |= LineMask::bits_for(d, LINE_DOUBLE);
        }
        assert_eq!(glyph_for_mask(LineMask(bits)), '╬');
    }

    #[test]
    fn mixed_single_double_corner_has_exact_glyph() {
        // North double, East single has its own glyph now that the mixed entries are
        // in the table — no fallback needed.
        let mut bits = LineMask::bits_for(Direction::North, LINE_DOUBLE);
        bits |= LineMask::bits_for(Direction::East, LINE_SINGLE);
        assert_eq!(glyph_for_mask(LineMask(bits)), '╙');
    }

    #[test]
    fn mixed_single_thick_corner_has_exact_glyph() {
        let mut bits = LineMask::bits_for(Direction::North, LINE_THICK);
        bits |= LineMask::bits_for(Direction::East, LINE_SINGLE);
        assert_eq!(glyph_for_mask(LineMask(bits)), '┖');
    }

    #[test]
    fn double_and_thick_mix_falls_back_through_thick_downgrade() {
        // Unicode has no glyph mixing DOUBLE and THICK directly. Fallback (a) drops
        // the THICK direction to SINGLE, which then lands on the mixed single/double
        // corner glyph rather than collapsing all the way to all-single.
        let mut bits = LineMask::bits_for(Direction::North, LINE_DOUBLE);
        bits |= LineMask::bits_for(Direction::East, LINE_THICK);
        assert_eq!(glyph_for_mask(LineMask(bits)), '╙');
    }

    #[test]
    fn every_mask_resolves() {
        for raw in 0u16..256 {
            let mask = LineMask(raw as u8);
            // Must not panic for any representable mask.
            let _ = glyph_for_mask(mask);
        }
    }

    #[test]
    fn empty_mask_is_space() {
        assert_eq!(glyph_for_mask(LineMask::EMPTY), ' ');
    }
}
