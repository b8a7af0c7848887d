use crate::geometry::Point;

use super::ElbowRoute;

/// Drops repeated points and interior points that continue along the same
/// axis as the segment before them.
pub fn simplify_elbow_points(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &point in points {
        if out.last() == Some(&point) {
            continue;
        }
        if let [.., a, b] = out.as_slice() {
            let same_column = a.0 == b.0 && b.0 == point.0;
            let same_row = a.1 == b.1 && b.1 == point.1;
            if same_column || same_row {
                if let Some(last) = out.last_mut() {
                    *last = point;
                }
                continue;
            }
        }
        out.push(point);
    }
    out
}

/// Re-expresses global points relative to their minimum corner.
///
/// The first point is only `(0, 0)` when it is that corner.
pub fn normalize(points: &[Point]) -> ElbowRoute {
    let Some(&first) = points.first() else {
        return ElbowRoute::default();
    };
    let (min_x, min_y) = points
        .iter()
        .fold(first, |(x, y), p| (x.min(p.0), y.min(p.1)));
    let local: Vec<Point> = points.iter().map(|p| (p.0 - min_x, p.1 - min_y)).collect();
    let (width, height) = local
        .iter()
        .fold((0.0_f64, 0.0_f64), |(w, h), p| (w.max(p.0), h.max(p.1)));
    ElbowRoute {
        points: local,
        x: min_x,
        y: min_y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_runs_collapse() {
        let points = [
            (0.0, 0.0),
            (0.0, 0.0),
            (0.0, 50.0),
            (0.0, 100.0),
            (45.0, 100.0),
            (90.0, 100.0),
            (90.0, 200.0),
        ];
        assert_eq!(
            simplify_elbow_points(&points),
            vec![(0.0, 0.0), (0.0, 100.0), (90.0, 100.0), (90.0, 200.0)]
        );
    }

    #[test]
    fn turns_are_kept() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0)];
        assert_eq!(simplify_elbow_points(&points), points.to_vec());
    }

    #[test]
    fn origin_is_the_minimum_corner() {
        let route = normalize(&[(-45.0, -100.1), (-45.0, -0.1), (45.0, -0.1), (45.0, 99.9)]);
        assert_eq!((route.x, route.y), (-45.0, -100.1));
        assert_eq!(route.points[0], (0.0, 0.0));
        assert_eq!(route.points[3].0, 90.0);
        assert!((route.points[3].1 - 200.0).abs() < 1e-9);
        assert_eq!(route.width, 90.0);
    }

    #[test]
    fn backtracking_start_is_not_at_the_origin() {
        let route = normalize(&[(10.0, 10.0), (0.0, 10.0), (0.0, 0.0), (30.0, 0.0)]);
        assert_eq!((route.x, route.y), (0.0, 0.0));
        assert_eq!(route.points[0], (10.0, 10.0));
        assert_eq!((route.width, route.height), (30.0, 10.0));
    }

    #[test]
    fn single_point_has_no_extent() {
        let route = normalize(&[(7.0, -3.0)]);
        assert_eq!(route.points, vec![(0.0, 0.0)]);
        assert_eq!((route.x, route.y, route.width, route.height), (7.0, -3.0, 0.0, 0.0));
    }
}
