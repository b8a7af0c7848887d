use crate::geometry::Point;

/// Cardinal direction a path leaves or enters an endpoint along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    /// Neighbour order used by the grid search.
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// Snaps a vector to the dominant axis; horizontal wins ties and the zero
    /// vector points right.
    pub fn from_vector(v: Point) -> Self {
        let (x, y) = v;
        if x.abs() >= y.abs() {
            if x >= 0.0 { Heading::Right } else { Heading::Left }
        } else if y > 0.0 {
            Heading::Down
        } else {
            Heading::Up
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Heading::Up => Heading::Down,
            Heading::Right => Heading::Left,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Heading::Left | Heading::Right)
    }

    pub fn unit(self) -> Point {
        match self {
            Heading::Up => (0.0, -1.0),
            Heading::Right => (1.0, 0.0),
            Heading::Down => (0.0, 1.0),
            Heading::Left => (-1.0, 0.0),
        }
    }

    /// Grid step `(dcol, drow)`.
    pub(crate) fn step(self) -> (isize, isize) {
        match self {
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Heading::Up => 0,
            Heading::Right => 1,
            Heading::Down => 2,
            Heading::Left => 3,
        }
    }
}

/// Per-side padding `[top, right, bottom, left]` with `head` on the side the
/// heading points at and `side` everywhere else.
pub fn offset_from_heading(heading: Heading, head: f64, side: f64) -> [f64; 4] {
    match heading {
        Heading::Up => [head, side, side, side],
        Heading::Right => [side, head, side, side],
        Heading::Down => [side, side, head, side],
        Heading::Left => [side, side, side, head],
    }
}
