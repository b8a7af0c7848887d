//! Orthogonal routing for elbow arrows.
//!
//! [`route_elbow_arrow`] is a pure function of the arrow, the scene snapshot
//! and the desired endpoints. It resolves bindings, grows a routing region
//! around each endpoint, searches a sparse grid built from the region edges
//! and hands back the simplified polyline in arrow-local coordinates.

pub mod astar;
pub mod grid;
pub mod heading;
pub mod obstacle;
pub mod simplify;

use serde::Serialize;

use crate::binding::{BoundShape, attachment_point, endpoint_heading};
use crate::config::RoutingConfig;
use crate::geometry::{Bounds, Point};
use crate::scene::{BindingEnd, ElbowArrow, SceneSnapshot, Shape};

use self::astar::astar;
use self::grid::RouteGrid;
use self::heading::{Heading, offset_from_heading};
use self::obstacle::{aabb_for_shape, dongle_position, generate_dynamic_aabbs};
use self::simplify::{normalize, simplify_elbow_points};

/// Padding of a bound shape's envelope on the sides the endpoint does not
/// leave from.
const SHAPE_SIDE_PADDING: f64 = 1.0;

/// Per-call routing knobs.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Default clearance for this call in place of `routing.binding_gap`.
    /// A binding's own gap still wins.
    pub gap: Option<f64>,
    pub routing: RoutingConfig,
}

impl RouteOptions {
    pub fn new(routing: RoutingConfig) -> Self {
        Self { gap: None, routing }
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = Some(gap);
        self
    }

    fn clearance(&self) -> f64 {
        self.gap.unwrap_or(self.routing.binding_gap)
    }
}

/// A routed arrow: local points plus the origin and extent they live in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElbowRoute {
    pub points: Vec<Point>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElbowRoute {
    pub fn global_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .map(|(px, py)| (self.x + px, self.y + py))
            .collect()
    }
}

/// How the returned path was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStrategy {
    /// Start and end coincide.
    Degenerate,
    /// Grid search around both routing regions.
    Regions,
    /// Grid search with the regions ignored.
    Relaxed,
    /// Two-turn path through the midline between the stubs.
    Fallback,
}

/// A route together with the decisions that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub route: ElbowRoute,
    pub start_heading: Heading,
    pub end_heading: Heading,
    pub strategy: SearchStrategy,
}

/// Computes the orthogonal route for `arrow` without touching it.
///
/// `next_points` are local to the arrow's current origin; only the first and
/// last are used. An empty slice reuses the arrow's own endpoints.
pub fn route_elbow_arrow<S: SceneSnapshot>(
    arrow: &ElbowArrow,
    scene: &S,
    next_points: &[Point],
    options: &RouteOptions,
) -> ElbowRoute {
    plan_elbow_route(arrow, scene, next_points, options).route
}

/// Routes `arrow` and stores the result on it.
pub fn mutate_elbow_arrow<S: SceneSnapshot>(
    arrow: &mut ElbowArrow,
    scene: &S,
    next_points: &[Point],
    options: &RouteOptions,
) {
    let route = route_elbow_arrow(arrow, scene, next_points, options);
    arrow.apply_route(route);
}

/// Same as [`route_elbow_arrow`], also reporting headings and the search
/// strategy that succeeded.
pub fn plan_elbow_route<S: SceneSnapshot>(
    arrow: &ElbowArrow,
    scene: &S,
    next_points: &[Point],
    options: &RouteOptions,
) -> RouteOutcome {
    let source = if next_points.is_empty() {
        arrow.points.as_slice()
    } else {
        next_points
    };
    let (Some(&first), Some(&last)) = (source.first(), source.last()) else {
        return RouteOutcome {
            route: normalize(&[(arrow.x, arrow.y)]),
            start_heading: Heading::Right,
            end_heading: Heading::Left,
            strategy: SearchStrategy::Degenerate,
        };
    };
    let desired_start = arrow.to_global(first);
    let desired_end = arrow.to_global(last);

    let start_bound = bound_shape(arrow, scene, BindingEnd::Start);
    let end_bound = bound_shape(arrow, scene, BindingEnd::End);
    let start = attachment_point(desired_start, desired_end, start_bound);
    let end = attachment_point(desired_end, desired_start, end_bound);
    let start_shape = start_bound.map(|(shape, _)| shape);
    let end_shape = end_bound.map(|(shape, _)| shape);
    let start_heading = endpoint_heading(start, end, start_shape);
    let end_heading = endpoint_heading(end, start, end_shape);

    if start == end {
        return RouteOutcome {
            route: normalize(&[start]),
            start_heading,
            end_heading,
            strategy: SearchStrategy::Degenerate,
        };
    }

    let config = &options.routing;
    let start_stub = endpoint_stub(arrow, BindingEnd::Start, start_bound, options);
    let end_stub = endpoint_stub(arrow, BindingEnd::End, end_bound, options);

    let start_point_bounds = Bounds::around_point(start, config.endpoint_padding);
    let end_point_bounds = Bounds::around_point(end, config.endpoint_padding);
    let start_element_bounds = shape_bounds(start_shape, start_heading, start_stub)
        .unwrap_or(start_point_bounds);
    let end_element_bounds =
        shape_bounds(end_shape, end_heading, end_stub).unwrap_or(end_point_bounds);

    let overlapping = endpoints_overlap(
        start,
        end,
        (start_shape, start_heading, start_point_bounds),
        (end_shape, end_heading, end_point_bounds),
        config.base_padding,
    );
    let (a, b) = if overlapping {
        (start_point_bounds, end_point_bounds)
    } else {
        (start_element_bounds, end_element_bounds)
    };
    let common = Bounds::union(&[a, b]).unwrap_or(a);

    let both_free = start_shape.is_none() && end_shape.is_none();
    let padding = |heading: Heading, stub: f64| {
        let base = config.base_padding;
        match (overlapping, both_free) {
            (true, true) => offset_from_heading(heading, 0.0, 0.0),
            (true, false) => offset_from_heading(heading, base, 0.0),
            (false, true) => offset_from_heading(heading, 0.0, base),
            (false, false) => offset_from_heading(heading, base - stub, base),
        }
    };
    let regions = generate_dynamic_aabbs(
        a,
        b,
        common,
        padding(start_heading, start_stub),
        padding(end_heading, end_stub),
        overlapping,
    );

    let start_dongle = dongle_position(&regions[0], start_heading, start);
    let end_dongle = dongle_position(&regions[1], end_heading, end);

    let mut grid = RouteGrid::build(
        start_dongle,
        start_heading,
        end_dongle,
        end_heading,
        &regions,
        &common,
    );
    for (shape, point) in [(start_shape, start), (end_shape, end)] {
        if shape.is_none() || point == start_dongle || point == end_dongle {
            continue;
        }
        if let Some(addr) = grid.node_at(point) {
            grid.close(addr);
        }
    }

    tracing::debug!(
        arrow = %arrow.id,
        ?start_heading,
        ?end_heading,
        overlapping,
        cols = grid.cols(),
        rows = grid.rows(),
        "routing elbow arrow"
    );

    let dongles_overlap =
        regions[1].contains_strict(start_dongle) || regions[0].contains_strict(end_dongle);
    let obstacles: &[Bounds] = if dongles_overlap { &[] } else { &regions };

    let routed = search(
        &grid,
        start_dongle,
        end_dongle,
        start_heading,
        end_heading,
        obstacles,
    );
    let (path, strategy) = match routed {
        Some(path) => {
            let strategy = if obstacles.is_empty() {
                SearchStrategy::Relaxed
            } else {
                SearchStrategy::Regions
            };
            (path, strategy)
        }
        None => match (!obstacles.is_empty())
            .then(|| search(&grid, start_dongle, end_dongle, start_heading, end_heading, &[]))
            .flatten()
        {
            Some(path) => (path, SearchStrategy::Relaxed),
            None => {
                tracing::warn!(
                    arrow = %arrow.id,
                    "no orthogonal path between the stubs, using the midline fallback"
                );
                (
                    fallback_path(start_dongle, start_heading, end_dongle),
                    SearchStrategy::Fallback,
                )
            }
        },
    };

    let mut points = Vec::with_capacity(path.len() + 2);
    points.push(start);
    points.extend(path);
    points.push(end);
    let points = simplify_elbow_points(&points);
    tracing::debug!(arrow = %arrow.id, ?strategy, points = points.len(), "routed elbow arrow");

    RouteOutcome {
        route: normalize(&points),
        start_heading,
        end_heading,
        strategy,
    }
}

/// Live shape bound at `end`. A binding to a shape the scene no longer has is
/// ignored for this call.
fn bound_shape<'a, S: SceneSnapshot>(
    arrow: &'a ElbowArrow,
    scene: &'a S,
    end: BindingEnd,
) -> Option<BoundShape<'a>> {
    let binding = arrow.binding(end)?;
    match scene.lookup(binding.element_id) {
        Some(shape) => Some((shape, binding)),
        None => {
            tracing::warn!(
                arrow = %arrow.id,
                ?end,
                element = binding.element_id.0,
                "bound shape is missing, routing the endpoint as free"
            );
            None
        }
    }
}

/// Clearance kept in front of one endpoint: the binding's own gap, or the
/// default clearance when the end is free or its binding has no positive gap.
fn endpoint_stub(
    arrow: &ElbowArrow,
    end: BindingEnd,
    bound: Option<BoundShape<'_>>,
    options: &RouteOptions,
) -> f64 {
    let gap = bound
        .map(|(_, binding)| binding.gap)
        .filter(|gap| *gap > 0.0)
        .unwrap_or_else(|| options.clearance());
    options
        .routing
        .stub_length(gap, arrow.arrowhead(end).is_some())
}

/// Envelope of a bound shape, with the stub length in front of the endpoint.
fn shape_bounds(shape: Option<&Shape>, heading: Heading, stub: f64) -> Option<Bounds> {
    shape.map(|shape| {
        aabb_for_shape(
            shape,
            Some(offset_from_heading(heading, stub, SHAPE_SIDE_PADDING)),
        )
    })
}

/// True when either endpoint sits inside the other side's padded envelope.
fn endpoints_overlap(
    start: Point,
    end: Point,
    (start_shape, start_heading, start_box): (Option<&Shape>, Heading, Bounds),
    (end_shape, end_heading, end_box): (Option<&Shape>, Heading, Bounds),
    base_padding: f64,
) -> bool {
    let padded = |shape: Option<&Shape>, heading: Heading, fallback: Bounds| match shape {
        Some(shape) => aabb_for_shape(
            shape,
            Some(offset_from_heading(heading, base_padding, base_padding)),
        ),
        None => fallback,
    };
    padded(end_shape, end_heading, end_box).contains_strict(start)
        || padded(start_shape, start_heading, start_box).contains_strict(end)
}

fn search(
    grid: &RouteGrid,
    from: Point,
    to: Point,
    start_heading: Heading,
    end_heading: Heading,
    obstacles: &[Bounds],
) -> Option<Vec<Point>> {
    let start = grid.node_at(from)?;
    let end = grid.node_at(to)?;
    astar(grid, start, end, start_heading, end_heading, obstacles)
}

/// Two turns through the midline between the stubs, ignoring clearance.
fn fallback_path(from: Point, heading: Heading, to: Point) -> Vec<Point> {
    if heading.is_horizontal() {
        let mid_x = (from.0 + to.0) / 2.0;
        vec![from, (mid_x, from.1), (mid_x, to.1), to]
    } else {
        let mid_y = (from.1 + to.1) / 2.0;
        vec![from, (from.0, mid_y), (to.0, mid_y), to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind_linear_element;
    use crate::geometry::is_orthogonal;
    use crate::scene::{Arrowhead, Binding, Scene, ShapeId};

    fn assert_close(actual: &[Point], expected: &[Point]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                (a.0 - e.0).abs() < 1e-9 && (a.1 - e.1).abs() < 1e-9,
                "{actual:?} != {expected:?}"
            );
        }
    }

    fn two_rectangles() -> (Scene, ShapeId, ShapeId) {
        let mut scene = Scene::new();
        let r1 = scene.insert_rectangle("r1", -150.0, -150.0, 100.0, 100.0);
        let r2 = scene.insert_rectangle("r2", 50.0, 50.0, 100.0, 100.0);
        (scene, r1, r2)
    }

    fn bound_arrow(scene: &Scene, r1: ShapeId, r2: ShapeId, arrow: ElbowArrow) -> ElbowArrow {
        let config = RoutingConfig::default();
        let mut arrow = arrow;
        bind_linear_element(&mut arrow, scene.lookup(r1).unwrap(), BindingEnd::Start, &config);
        bind_linear_element(&mut arrow, scene.lookup(r2).unwrap(), BindingEnd::End, &config);
        arrow
    }

    fn arrow() -> ElbowArrow {
        ElbowArrow::new("arrow", -45.0, -100.1, vec![(0.0, 0.0), (90.0, 200.0)])
    }

    #[test]
    fn free_arrow_bends_at_the_midline() {
        let scene = Scene::new();
        let mut arrow = arrow();
        mutate_elbow_arrow(
            &mut arrow,
            &scene,
            &[(0.0, 0.0), (90.0, 200.0)],
            &RouteOptions::default(),
        );
        assert_close(
            &arrow.points,
            &[(0.0, 0.0), (0.0, 100.0), (90.0, 100.0), (90.0, 200.0)],
        );
        assert_eq!((arrow.x, arrow.y), (-45.0, -100.1));
        assert_eq!((arrow.width, arrow.height), (90.0, 200.0));
    }

    #[test]
    fn bound_arrow_leaves_sideways() {
        let (scene, r1, r2) = two_rectangles();
        let mut arrow = bound_arrow(&scene, r1, r2, arrow());
        mutate_elbow_arrow(
            &mut arrow,
            &scene,
            &[(0.0, 0.0), (90.0, 200.0)],
            &RouteOptions::default(),
        );
        assert_close(
            &arrow.points,
            &[(0.0, 0.0), (45.0, 0.0), (45.0, 200.0), (90.0, 200.0)],
        );
    }

    #[test]
    fn arrowhead_lengthens_the_end_stub() {
        let (scene, r1, r2) = two_rectangles();
        let mut arrow = bound_arrow(&scene, r1, r2, arrow().with_end_arrowhead(Arrowhead::Arrow));
        mutate_elbow_arrow(&mut arrow, &scene, &[], &RouteOptions::default());
        assert_close(
            &arrow.points,
            &[(0.0, 0.0), (35.0, 0.0), (35.0, 200.0), (90.0, 200.0)],
        );
    }

    fn stacked_rectangles(start_gap: f64, end_gap: f64) -> (Scene, ElbowArrow) {
        let mut scene = Scene::new();
        let top = scene.insert_rectangle("top", 0.0, 0.0, 100.0, 100.0);
        let bottom = scene.insert_rectangle("bottom", 200.0, 400.0, 100.0, 100.0);
        let mut arrow = ElbowArrow::new("arrow", 50.0, 105.0, vec![(0.0, 0.0), (200.0, 290.0)]);
        arrow.start_binding = Some(Binding {
            element_id: top,
            focus: 0.0,
            gap: start_gap,
            fixed_point: Some([0.5, 1.05]),
        });
        arrow.end_binding = Some(Binding {
            element_id: bottom,
            focus: 0.0,
            gap: end_gap,
            fixed_point: Some([0.5, -0.05]),
        });
        (scene, arrow)
    }

    #[test]
    fn binding_gap_sizes_the_stub() {
        let (scene, arrow) = stacked_rectangles(5.0, 5.0);
        let route = route_elbow_arrow(&arrow, &scene, &[], &RouteOptions::default());
        assert_close(
            &route.points,
            &[(0.0, 0.0), (0.0, 145.0), (200.0, 145.0), (200.0, 290.0)],
        );

        // The wider start clearance pushes the start region, and the bend, down.
        let (scene, arrow) = stacked_rectangles(30.0, 5.0);
        let route = route_elbow_arrow(&arrow, &scene, &[], &RouteOptions::default());
        assert_close(
            &route.points,
            &[(0.0, 0.0), (0.0, 170.0), (200.0, 170.0), (200.0, 290.0)],
        );
        assert_eq!((route.x, route.y), (50.0, 105.0));
    }

    #[test]
    fn stub_length_follows_the_binding() {
        let (scene, arrow) = stacked_rectangles(30.0, 0.0);
        let arrow = arrow.with_start_arrowhead(Arrowhead::Triangle);
        let options = RouteOptions::default();
        let start = bound_shape(&arrow, &scene, BindingEnd::Start);
        let end = bound_shape(&arrow, &scene, BindingEnd::End);

        assert_eq!(endpoint_stub(&arrow, BindingEnd::Start, start, &options), 180.0);
        assert_eq!(endpoint_stub(&arrow, BindingEnd::End, end, &options), 10.0);
        assert_eq!(endpoint_stub(&arrow, BindingEnd::End, None, &options), 10.0);

        let options = options.with_gap(8.0);
        assert_eq!(endpoint_stub(&arrow, BindingEnd::Start, start, &options), 180.0);
        assert_eq!(endpoint_stub(&arrow, BindingEnd::End, end, &options), 16.0);
    }

    #[test]
    fn rotating_the_end_shape_reroutes() {
        let (mut scene, r1, r2) = two_rectangles();
        let mut arrow = bound_arrow(&scene, r1, r2, arrow().with_end_arrowhead(Arrowhead::Arrow));
        mutate_elbow_arrow(&mut arrow, &scene, &[], &RouteOptions::default());

        scene.shape_mut(r2).unwrap().angle = 40f64.to_radians();
        mutate_elbow_arrow(&mut arrow, &scene, &[], &RouteOptions::default());
        let rounded: Vec<(f64, f64)> = arrow
            .points
            .iter()
            .map(|(x, y)| (x.round(), y.round()))
            .collect();
        assert_eq!(
            rounded,
            vec![
                (0.0, 0.0),
                (35.0, 0.0),
                (35.0, 90.0),
                (25.0, 90.0),
                (25.0, 165.0),
                (103.0, 165.0)
            ]
        );
        assert!(is_orthogonal(&arrow.points));
    }

    #[test]
    fn rerouting_is_idempotent() {
        let (scene, r1, r2) = two_rectangles();
        let mut arrow = bound_arrow(&scene, r1, r2, arrow());
        let options = RouteOptions::default();
        mutate_elbow_arrow(&mut arrow, &scene, &[], &options);
        let once = arrow.clone();
        mutate_elbow_arrow(&mut arrow, &scene, &[], &options);
        assert_eq!(arrow, once);
    }

    #[test]
    fn unrelated_shapes_do_not_matter() {
        let (mut scene, r1, r2) = two_rectangles();
        let arrow = bound_arrow(&scene, r1, r2, arrow());
        let options = RouteOptions::default();
        let before = route_elbow_arrow(&arrow, &scene, &[], &options);
        let r3 = scene.insert_rectangle("r3", -20.0, -20.0, 40.0, 40.0);
        scene.shape_mut(r3).unwrap().x = 10.0;
        assert_eq!(route_elbow_arrow(&arrow, &scene, &[], &options), before);
    }

    #[test]
    fn missing_shape_routes_as_free() {
        let mut scene = Scene::new();
        let ghost = scene.intern("ghost");
        let mut arrow = arrow();
        arrow.start_binding = Some(Binding {
            element_id: ghost,
            focus: 0.0,
            gap: 5.0,
            fixed_point: Some([1.05, 0.5001]),
        });
        let route = route_elbow_arrow(&arrow, &scene, &[], &RouteOptions::default());
        assert_close(
            &route.points,
            &[(0.0, 0.0), (0.0, 100.0), (90.0, 100.0), (90.0, 200.0)],
        );
    }

    #[test]
    fn coincident_endpoints_collapse_to_a_point() {
        let scene = Scene::new();
        let arrow = ElbowArrow::new("dot", 10.0, 20.0, vec![(0.0, 0.0), (0.0, 0.0)]);
        let outcome = plan_elbow_route(&arrow, &scene, &[], &RouteOptions::default());
        assert_eq!(outcome.strategy, SearchStrategy::Degenerate);
        assert_eq!(outcome.route.points, vec![(0.0, 0.0)]);
        assert_eq!((outcome.route.x, outcome.route.y), (10.0, 20.0));
    }

    #[test]
    fn aligned_free_endpoints_route_straight() {
        let scene = Scene::new();
        let arrow = ElbowArrow::new("line", 0.0, 0.0, vec![(0.0, 0.0), (120.0, 0.0)]);
        let route = route_elbow_arrow(&arrow, &scene, &[], &RouteOptions::default());
        assert_eq!(route.points, vec![(0.0, 0.0), (120.0, 0.0)]);
    }

    #[test]
    fn next_points_replace_the_stored_endpoints() {
        let scene = Scene::new();
        let arrow = ElbowArrow::new("a", 0.0, 0.0, vec![(0.0, 0.0), (10.0, 10.0)]);
        let route = route_elbow_arrow(
            &arrow,
            &scene,
            &[(-45.0, -100.1), (45.0, 99.9)],
            &RouteOptions::default(),
        );
        assert_eq!((route.x, route.y), (-45.0, -100.1));
        assert_eq!(route.points.len(), 4);
    }

    #[test]
    fn larger_gap_widens_the_stub() {
        let (scene, r1, r2) = two_rectangles();
        let arrow = bound_arrow(&scene, r1, r2, arrow());
        let route = route_elbow_arrow(&arrow, &scene, &[], &RouteOptions::default().with_gap(10.0));
        assert!(is_orthogonal(&route.points));
        assert_eq!(route.points.first(), Some(&(0.0, 0.0)));
    }

    #[test]
    fn overlapping_shapes_still_produce_orthogonal_routes() {
        let mut scene = Scene::new();
        let r1 = scene.insert_rectangle("r1", 0.0, 0.0, 100.0, 100.0);
        let r2 = scene.insert_rectangle("r2", 60.0, 60.0, 100.0, 100.0);
        let arrow = bound_arrow(
            &scene,
            r1,
            r2,
            ElbowArrow::new("a", 105.0, 50.0, vec![(0.0, 0.0), (-50.0, 60.0)]),
        );
        let route = route_elbow_arrow(&arrow, &scene, &[], &RouteOptions::default());
        assert!(route.points.len() >= 2);
        assert!(is_orthogonal(&route.points));
    }

    #[test]
    fn fallback_bends_twice() {
        let path = fallback_path((0.0, 0.0), Heading::Right, (100.0, 50.0));
        assert_eq!(path, vec![(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (100.0, 50.0)]);
        assert!(is_orthogonal(&path));
    }
}
