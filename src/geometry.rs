/// A point in scene (global) or arrow-relative (local) coordinates.
pub type Point = (f64, f64);

/// Axis-aligned bounds in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Square box of half-size `pad` centered on `point`.
    pub fn around_point(point: Point, pad: f64) -> Self {
        Self::new(point.0 - pad, point.1 - pad, point.0 + pad, point.1 + pad)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        (
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Grows each side independently. Offsets are `[top, right, bottom, left]`.
    pub fn expand(&self, offsets: [f64; 4]) -> Self {
        let [top, right, bottom, left] = offsets;
        Self::new(
            self.min_x - left,
            self.min_y - top,
            self.max_x + right,
            self.max_y + bottom,
        )
    }

    /// Strict containment: points on the boundary are outside.
    pub fn contains_strict(&self, point: Point) -> bool {
        point.0 > self.min_x && point.0 < self.max_x && point.1 > self.min_y && point.1 < self.max_y
    }

    /// Union of all bounds, `None` for an empty slice.
    pub fn union(all: &[Bounds]) -> Option<Self> {
        let first = *all.first()?;
        Some(all.iter().skip(1).fold(first, |acc, b| {
            Self::new(
                acc.min_x.min(b.min_x),
                acc.min_y.min(b.min_y),
                acc.max_x.max(b.max_x),
                acc.max_y.max(b.max_y),
            )
        }))
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }
}

/// Rotates `point` around `center` by `angle` radians (clockwise on a y-down canvas).
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    let (sin, cos) = angle.sin_cos();
    let dx = point.0 - center.0;
    let dy = point.1 - center.1;
    (
        dx * cos - dy * sin + center.0,
        dx * sin + dy * cos + center.1,
    )
}

pub fn manhattan(a: Point, b: Point) -> f64 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

pub fn midpoint(a: Point, b: Point) -> Point {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

pub fn cross(a: Point, b: Point) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

/// True when the segment passes through the strict interior of `rect`.
///
/// Only meaningful for axis-aligned segments; running along an edge is allowed.
pub fn segment_enters_bounds(a: Point, b: Point, rect: &Bounds) -> bool {
    if a.1 == b.1 {
        let lo = a.0.min(b.0);
        let hi = a.0.max(b.0);
        a.1 > rect.min_y && a.1 < rect.max_y && hi > rect.min_x && lo < rect.max_x
    } else if a.0 == b.0 {
        let lo = a.1.min(b.1);
        let hi = a.1.max(b.1);
        a.0 > rect.min_x && a.0 < rect.max_x && hi > rect.min_y && lo < rect.max_y
    } else {
        rect.contains_strict(a) || rect.contains_strict(b) || rect.contains_strict(midpoint(a, b))
    }
}

/// Every consecutive pair shares exactly one coordinate.
pub fn is_orthogonal(points: &[Point]) -> bool {
    points
        .windows(2)
        .all(|pair| (pair[0].0 == pair[1].0) != (pair[0].1 == pair[1].1))
}
