use crate::geometry::{Bounds, Point, cross, rotate_point};
use crate::scene::Shape;

use super::heading::Heading;

/// Slack on the overlap test so touching regions are not split.
const REGION_OVERLAP_EPSILON: f64 = 0.000_000_000_01;

/// Axis-aligned envelope of the rotated shape, grown by `[top, right, bottom, left]`.
pub fn aabb_for_shape(shape: &Shape, offset: Option<[f64; 4]>) -> Bounds {
    let center = shape.center();
    let corners = shape
        .bounds()
        .corners()
        .map(|corner| rotate_point(corner, center, shape.angle));
    let mut envelope = Bounds::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for (x, y) in corners {
        envelope.min_x = envelope.min_x.min(x);
        envelope.min_y = envelope.min_y.min(y);
        envelope.max_x = envelope.max_x.max(x);
        envelope.max_y = envelope.max_y.max(y);
    }
    match offset {
        Some(offset) => envelope.expand(offset),
        None => envelope,
    }
}

/// Routing regions for the start (`a`) and end (`b`) obstacles.
///
/// Each region grows toward the other up to the midline between them, and
/// outward to the common bounds plus the per-side padding otherwise. Padding
/// arrays are `[top, right, bottom, left]`. When the grown regions overlap on
/// both axes they are split along their gap, unless `disable_side_hack`.
pub fn generate_dynamic_aabbs(
    a: Bounds,
    b: Bounds,
    common: Bounds,
    start_difference: [f64; 4],
    end_difference: [f64; 4],
    disable_side_hack: bool,
) -> [Bounds; 2] {
    let first = grow_region(a, b, common, start_difference);
    let second = grow_region(b, a, common, end_difference);

    if disable_side_hack {
        return [first, second];
    }
    let Some(c) = Bounds::union(&[first, second]) else {
        return [first, second];
    };
    let overlaps_x = first.width() + second.width() > c.width() + REGION_OVERLAP_EPSILON;
    let overlaps_y = first.height() + second.height() > c.height() + REGION_OVERLAP_EPSILON;
    if !(overlaps_x && overlaps_y) {
        return [first, second];
    }

    let end_center = second.center();
    let rel = |p: Point| (p.0 - end_center.0, p.1 - end_center.1);

    if b.min_x > a.max_x && a.min_y > b.max_y {
        // end is up and to the right
        let cx = first.max_x + (second.min_x - first.max_x) / 2.0;
        let cy = second.max_y + (first.min_y - second.max_y) / 2.0;
        if cross(rel((a.max_x, a.min_y)), rel((a.min_x, a.max_y))) > 0.0 {
            return split_vertically(first, second, cx);
        }
        return [
            Bounds::new(first.min_x, cy, first.max_x, first.max_y),
            Bounds::new(second.min_x, second.min_y, second.max_x, cy),
        ];
    } else if a.max_x < b.min_x && a.max_y < b.min_y {
        // end is down and to the right
        let cx = first.max_x + (second.min_x - first.max_x) / 2.0;
        let cy = first.max_y + (second.min_y - first.max_y) / 2.0;
        if cross(rel((a.min_x, a.min_y)), rel((a.max_x, a.max_y))) > 0.0 {
            return [
                Bounds::new(first.min_x, first.min_y, first.max_x, cy),
                Bounds::new(second.min_x, cy, second.max_x, second.max_y),
            ];
        }
        return split_vertically(first, second, cx);
    } else if a.min_x > b.max_x && a.max_y < b.min_y {
        // end is down and to the left
        let cx = second.max_x + (first.min_x - second.max_x) / 2.0;
        let cy = first.max_y + (second.min_y - first.max_y) / 2.0;
        if cross(rel((a.max_x, a.min_y)), rel((a.min_x, a.max_y))) > 0.0 {
            return [
                Bounds::new(cx, first.min_y, first.max_x, first.max_y),
                Bounds::new(second.min_x, second.min_y, cx, second.max_y),
            ];
        }
        return [
            Bounds::new(first.min_x, first.min_y, first.max_x, cy),
            Bounds::new(second.min_x, cy, second.max_x, second.max_y),
        ];
    } else if a.min_x > b.max_x && a.min_y > b.max_y {
        // end is up and to the left
        let cx = second.max_x + (first.min_x - second.max_x) / 2.0;
        let cy = second.max_y + (first.min_y - second.max_y) / 2.0;
        if cross(rel((a.min_x, a.min_y)), rel((a.max_x, a.max_y))) > 0.0 {
            return [
                Bounds::new(cx, first.min_y, first.max_x, first.max_y),
                Bounds::new(second.min_x, second.min_y, cx, second.max_y),
            ];
        }
        return [
            Bounds::new(first.min_x, cy, first.max_x, first.max_y),
            Bounds::new(second.min_x, second.min_y, second.max_x, cy),
        ];
    }

    [first, second]
}

fn split_vertically(first: Bounds, second: Bounds, cx: f64) -> [Bounds; 2] {
    [
        Bounds::new(first.min_x, first.min_y, cx, first.max_y),
        Bounds::new(cx, second.min_y, second.max_x, second.max_y),
    ]
}

/// Grows `own` toward `other`; `pad` is `[top, right, bottom, left]`.
fn grow_region(own: Bounds, other: Bounds, common: Bounds, pad: [f64; 4]) -> Bounds {
    let [up, right, down, left] = pad;
    let apart_y = own.min_y > other.max_y || own.max_y < other.min_y;
    let apart_x = own.min_x > other.max_x || own.max_x < other.min_x;

    let min_x = if own.min_x > other.max_x {
        let mid = (own.min_x + other.max_x) / 2.0;
        if apart_y { mid.min(own.min_x - left) } else { mid }
    } else if own.min_x > other.min_x {
        own.min_x - left
    } else {
        common.min_x - left
    };
    let min_y = if own.min_y > other.max_y {
        let mid = (own.min_y + other.max_y) / 2.0;
        if apart_x { mid.min(own.min_y - up) } else { mid }
    } else if own.min_y > other.min_y {
        own.min_y - up
    } else {
        common.min_y - up
    };
    let max_x = if own.max_x < other.min_x {
        let mid = (own.max_x + other.min_x) / 2.0;
        if apart_y { mid.max(own.max_x + right) } else { mid }
    } else if own.max_x < other.max_x {
        own.max_x + right
    } else {
        common.max_x + right
    };
    let max_y = if own.max_y < other.min_y {
        let mid = (own.max_y + other.min_y) / 2.0;
        if apart_x { mid.max(own.max_y + down) } else { mid }
    } else if own.max_y < other.max_y {
        own.max_y + down
    } else {
        common.max_y + down
    };

    Bounds::new(min_x, min_y, max_x, max_y)
}

/// Where the heading ray from `point` leaves `region`.
pub fn dongle_position(region: &Bounds, heading: Heading, point: Point) -> Point {
    match heading {
        Heading::Up => (point.0, region.min_y),
        Heading::Right => (region.max_x, point.1),
        Heading::Down => (point.0, region.max_y),
        Heading::Left => (region.min_x, point.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::heading::offset_from_heading;
    use crate::scene::ShapeId;

    fn rect(x: f64, y: f64, w: f64, h: f64, angle: f64) -> Shape {
        Shape {
            id: ShapeId(0),
            x,
            y,
            width: w,
            height: h,
            angle,
            is_deleted: false,
        }
    }

    #[test]
    fn unrotated_envelope_is_the_rectangle() {
        let shape = rect(-150.0, -150.0, 100.0, 100.0, 0.0);
        assert_eq!(
            aabb_for_shape(&shape, None),
            Bounds::new(-150.0, -150.0, -50.0, -50.0)
        );
        assert_eq!(
            aabb_for_shape(&shape, Some(offset_from_heading(Heading::Right, 10.0, 1.0))),
            Bounds::new(-151.0, -151.0, -40.0, -49.0)
        );
    }

    #[test]
    fn rotated_envelope_contains_every_corner() {
        let shape = rect(50.0, 50.0, 100.0, 100.0, 40f64.to_radians());
        let env = aabb_for_shape(&shape, None);
        let half = 50.0 * (40f64.to_radians().cos() + 40f64.to_radians().sin());
        assert!((env.min_x - (100.0 - half)).abs() < 1e-9);
        assert!((env.max_y - (100.0 + half)).abs() < 1e-9);
    }

    #[test]
    fn regions_meet_at_the_midline() {
        let a = Bounds::new(-151.0, -151.0, -40.0, -49.0);
        let b = Bounds::new(40.0, 49.0, 151.0, 151.0);
        let common = Bounds::union(&[a, b]).unwrap();
        let [first, second] = generate_dynamic_aabbs(
            a,
            b,
            common,
            offset_from_heading(Heading::Right, 30.0, 40.0),
            offset_from_heading(Heading::Left, 30.0, 40.0),
            false,
        );
        assert_eq!(first, Bounds::new(-191.0, -191.0, 0.0, 0.0));
        assert_eq!(second, Bounds::new(0.0, 0.0, 191.0, 191.0));
    }

    #[test]
    fn overlapping_regions_are_split() {
        let a = Bounds::new(-151.0, -151.0, -40.0, -49.0);
        let b = Bounds::new(-0.5, 28.5, 171.5, 171.5);
        let common = Bounds::union(&[a, b]).unwrap();
        let [first, second] = generate_dynamic_aabbs(
            a,
            b,
            common,
            offset_from_heading(Heading::Right, 30.0, 40.0),
            offset_from_heading(Heading::Left, 10.0, 40.0),
            false,
        );
        assert_eq!(first.max_y, second.min_y);
        assert!(first.max_y < -10.0 && first.max_y > -11.0);
        assert_eq!(first.max_x, -10.0);
    }

    #[test]
    fn dongles_sit_on_the_region_edge() {
        let region = Bounds::new(-191.0, -191.0, 0.0, 0.0);
        assert_eq!(dongle_position(&region, Heading::Right, (-45.0, -100.1)), (0.0, -100.1));
        assert_eq!(dongle_position(&region, Heading::Up, (-45.0, -100.1)), (-45.0, -191.0));
    }
}
