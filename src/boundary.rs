// src/boundary.rs - Chain-code boundary tracing over a binary mask

use serde::{Deserialize, Serialize};

use crate::mask::BinaryMask;

/// Side of a boundary pixel that faces the background.
///
/// Discriminants follow clockwise order (as displayed, rows growing downward),
/// so adding 1 modulo 4 rotates a direction by 90° clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    #[inline]
    fn rotate(self, quarter_turns: u8) -> Direction {
        Direction::ALL[(self.index() + quarter_turns as usize) % 4]
    }

    /// (row, col) offset of the neighbor on this side
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

/// Which member of each traced pair to keep.
///
/// The two members visit the same pixels in opposite order, so the choice only
/// fixes the orientation (and with it the curvature sign), never which corner
/// pixels are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceSelector {
    /// Clockwise traces (as displayed)
    First,
    /// Counter-clockwise traces (as displayed)
    Second,
}

/// A closed, ordered sequence of (row, col) pixel positions.
///
/// The first entry is repeated at the end and no two consecutive entries are equal.
/// An isolated pixel is the one-entry chain `[p]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelChain {
    pixels: Vec<(usize, usize)>,
}

impl PixelChain {
    /// All positions including the closing duplicate
    pub fn pixels(&self) -> &[(usize, usize)] {
        &self.pixels
    }

    /// Number of boundary pixels visited, not counting the closing duplicate
    pub fn pixel_count(&self) -> usize {
        match self.pixels.len() {
            0 | 1 => self.pixels.len(),
            n => n - 1,
        }
    }

    /// Pixel centers as points with x = row and y = col
    pub fn to_points(&self) -> Vec<crate::Point> {
        self.pixels
            .iter()
            .map(|&(row, col)| crate::Point::new(row as f64, col as f64))
            .collect()
    }

    pub fn into_pixels(self) -> Vec<(usize, usize)> {
        self.pixels
    }
}

/// Typed boundary masks: `has(d, r, c)` is true iff pixel (r, c) is foreground
/// and its neighbor towards `d` is background (the grid is zero padded).
pub struct DirectionMasks {
    height: usize,
    width: usize,
    typed: [Vec<bool>; 4],
}

impl DirectionMasks {
    pub fn from_mask(mask: &BinaryMask) -> Self {
        let (height, width) = (mask.height(), mask.width());
        let typed = Direction::ALL.map(|direction| {
            let (dr, dc) = direction.offset();
            let mut plane = vec![false; height * width];
            for row in 0..height {
                for col in 0..width {
                    plane[row * width + col] = mask.get(row, col)
                        && !mask.get_signed(row as isize + dr, col as isize + dc);
                }
            }
            plane
        });
        Self { height, width, typed }
    }

    #[inline]
    pub fn has(&self, direction: Direction, row: isize, col: isize) -> bool {
        row >= 0
            && col >= 0
            && (row as usize) < self.height
            && (col as usize) < self.width
            && self.typed[direction.index()][row as usize * self.width + col as usize]
    }
}

/// One automaton move: rotate the direction type by `turn` quarter turns
/// clockwise and displace the position by (`dr`, `dc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    turn: u8,
    dr: isize,
    dc: isize,
}

const fn step(turn: u8, dr: isize, dc: isize) -> Step {
    Step { turn, dr, dc }
}

/// Transitions for walking with the foreground on the right (clockwise as displayed).
///
/// Indexed by [direction type][preference rank]: corner continuation,
/// straight continuation, same-position alternate type.
const CLOCKWISE: [[Step; 3]; 4] = [
    // North: walk east
    [step(3, -1, 1), step(0, 0, 1), step(1, 0, 0)],
    // East: walk south
    [step(3, 1, 1), step(0, 1, 0), step(1, 0, 0)],
    // South: walk west
    [step(3, 1, -1), step(0, 0, -1), step(1, 0, 0)],
    // West: walk north
    [step(3, -1, -1), step(0, -1, 0), step(1, 0, 0)],
];

/// Transitions for walking with the foreground on the left (counter-clockwise as displayed).
const COUNTER_CLOCKWISE: [[Step; 3]; 4] = [
    // North: walk west
    [step(1, -1, -1), step(0, 0, -1), step(3, 0, 0)],
    // East: walk north
    [step(1, -1, 1), step(0, -1, 0), step(3, 0, 0)],
    // South: walk east
    [step(1, 1, 1), step(0, 0, 1), step(3, 0, 0)],
    // West: walk south
    [step(1, 1, -1), step(0, 1, 0), step(3, 0, 0)],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct State {
    direction: Direction,
    row: isize,
    col: isize,
}

/// Visited flags over (direction type, row, col), local to a single trace call
struct Visited {
    width: usize,
    plane: usize,
    flags: Vec<bool>,
}

impl Visited {
    fn new(height: usize, width: usize) -> Self {
        Self {
            width,
            plane: height * width,
            flags: vec![false; 4 * height * width],
        }
    }

    #[inline]
    fn slot(&self, state: State) -> usize {
        state.direction.index() * self.plane + state.row as usize * self.width + state.col as usize
    }

    #[inline]
    fn contains(&self, state: State) -> bool {
        self.flags[self.slot(state)]
    }

    #[inline]
    fn insert(&mut self, state: State) {
        let slot = self.slot(state);
        self.flags[slot] = true;
    }
}

fn next_state(masks: &DirectionMasks, table: &[[Step; 3]; 4], state: State) -> Option<State> {
    table[state.direction.index()].iter().find_map(|s| {
        let candidate = State {
            direction: state.direction.rotate(s.turn),
            row: state.row + s.dr,
            col: state.col + s.dc,
        };
        masks
            .has(candidate.direction, candidate.row, candidate.col)
            .then_some(candidate)
    })
}

/// Follow transitions from `start` until the walk returns to it, collecting positions
fn walk_cycle(
    masks: &DirectionMasks,
    table: &[[Step; 3]; 4],
    visited: &mut Visited,
    start: State,
) -> Vec<(usize, usize)> {
    let mut positions = Vec::new();
    let mut state = start;

    loop {
        visited.insert(state);
        positions.push((state.row as usize, state.col as usize));

        // Every boundary state has at least the same-position alternative, so
        // a missing transition can only mean the start was not a boundary state.
        state = match next_state(masks, table, state) {
            Some(next) => next,
            None => break,
        };

        if state == start {
            break;
        }
    }

    positions
}

/// Collapse consecutive repeats and close the sequence
fn close_chain(positions: Vec<(usize, usize)>) -> Option<PixelChain> {
    let mut pixels: Vec<(usize, usize)> = Vec::with_capacity(positions.len() + 1);
    for position in positions {
        if pixels.last() != Some(&position) {
            pixels.push(position);
        }
    }

    if pixels.len() > 1 && pixels.first() == pixels.last() {
        pixels.pop();
    }

    match pixels.len() {
        0 => None,
        1 => Some(PixelChain { pixels }),
        _ => {
            pixels.push(pixels[0]);
            Some(PixelChain { pixels })
        }
    }
}

/// Trace every boundary of the mask without filtering.
///
/// Each physical boundary yields a pair of chains, emitted next to each other:
/// the clockwise trace followed by the counter-clockwise trace from the same start.
/// Every foreground pixel with a background 4-neighbor appears in some chain,
/// isolated pixels included (as one-entry chains).
pub fn trace_all(mask: &BinaryMask) -> Vec<PixelChain> {
    let (height, width) = (mask.height(), mask.width());
    if mask.is_empty() {
        return Vec::new();
    }

    let masks = DirectionMasks::from_mask(mask);
    let mut visited_cw = Visited::new(height, width);
    let mut visited_ccw = Visited::new(height, width);
    let mut chains = Vec::new();

    for row in 0..height as isize {
        for col in 0..width as isize {
            for direction in Direction::ALL {
                if !masks.has(direction, row, col) {
                    continue;
                }
                let start = State { direction, row, col };
                if visited_cw.contains(start) {
                    continue;
                }

                let clockwise = walk_cycle(&masks, &CLOCKWISE, &mut visited_cw, start);
                let counter_clockwise =
                    walk_cycle(&masks, &COUNTER_CLOCKWISE, &mut visited_ccw, start);

                if let (Some(first), Some(second)) =
                    (close_chain(clockwise), close_chain(counter_clockwise))
                {
                    chains.push(first);
                    chains.push(second);
                }
            }
        }
    }

    chains
}

/// Trace the mask and keep one representative per boundary.
///
/// Chains with `pixel_count() <= min_length` or `>= max_length` are discarded,
/// then every first or every second survivor is kept according to `selector`.
pub fn trace(
    mask: &BinaryMask,
    min_length: usize,
    max_length: usize,
    selector: TraceSelector,
) -> Vec<PixelChain> {
    if min_length >= max_length {
        return Vec::new();
    }

    let offset = match selector {
        TraceSelector::First => 0,
        TraceSelector::Second => 1,
    };

    trace_all(mask)
        .into_iter()
        .filter(|chain| {
            let length = chain.pixel_count();
            length > min_length && length < max_length
        })
        .enumerate()
        .filter(|(index, _)| index % 2 == offset)
        .map(|(_, chain)| chain)
        .collect()
}
