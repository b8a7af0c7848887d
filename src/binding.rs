//! Binding resolution: where a bound endpoint sits on its shape and which way
//! the path must leave it.

use crate::config::RoutingConfig;
use crate::geometry::{Point, rotate_point};
use crate::routing::heading::Heading;
use crate::scene::{Binding, BindingEnd, ElbowArrow, Shape};

/// Nudge applied to the snapping center so an endpoint dropped on the exact
/// middle of a side never lands on a heading boundary.
const SNAP_CENTER_NUDGE: f64 = 0.1;
/// Fixed-point ratios this close to one half are pushed off it.
const FIXED_POINT_HALF_EPSILON: f64 = 0.0001;

/// A bound endpoint: the live shape and the binding that points at it.
pub type BoundShape<'a> = (&'a Shape, &'a Binding);

/// Attachment point and outward heading of one endpoint.
///
/// `point` is the endpoint's desired global position and `other` the opposite
/// endpoint's; a free endpoint heads toward `other`.
pub fn resolve_endpoint(point: Point, other: Point, bound: Option<BoundShape<'_>>) -> (Point, Heading) {
    let attachment = attachment_point(point, other, bound);
    let heading = endpoint_heading(attachment, other, bound.map(|(shape, _)| shape));
    (attachment, heading)
}

/// Global attachment point of an endpoint.
pub fn attachment_point(point: Point, other: Point, bound: Option<BoundShape<'_>>) -> Point {
    let Some((shape, binding)) = bound else {
        return point;
    };
    let center = shape.center();
    if let Some([fx, fy]) = binding.fixed_point {
        return rotate_point(
            (shape.x + shape.width * fx, shape.y + shape.height * fy),
            center,
            shape.angle,
        );
    }

    let local_other = rotate_point(other, center, -shape.angle);
    let side = side_facing(shape, local_other);
    rotate_point(point_on_side(shape, side, binding.focus, binding.gap), center, shape.angle)
}

/// Heading an endpoint leaves along: the bound side's outward normal snapped
/// to a cardinal direction, or toward `other` for a free endpoint.
pub fn endpoint_heading(point: Point, other: Point, shape: Option<&Shape>) -> Heading {
    match shape {
        Some(shape) => heading_for_point_on_shape(shape, point),
        None => Heading::from_vector((other.0 - point.0, other.1 - point.1)),
    }
}

/// Outward heading of the side of `shape` nearest to `point`, in global space.
pub fn heading_for_point_on_shape(shape: &Shape, point: Point) -> Heading {
    let center = shape.center();
    let local = rotate_point(point, center, -shape.angle);
    let side = side_facing(shape, local);
    let normal = rotate_point(side.unit(), (0.0, 0.0), shape.angle);
    Heading::from_vector(normal)
}

/// Side of the unrotated shape whose diagonal cone contains `local`.
fn side_facing(shape: &Shape, local: Point) -> Heading {
    let (cx, cy) = shape.center();
    let half_w = if shape.width > 0.0 { shape.width / 2.0 } else { 1.0 };
    let half_h = if shape.height > 0.0 { shape.height / 2.0 } else { 1.0 };
    let dx = (local.0 - cx) / half_w;
    let dy = (local.1 - cy) / half_h;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 { Heading::Right } else { Heading::Left }
    } else if dy > 0.0 {
        Heading::Down
    } else {
        Heading::Up
    }
}

/// Unrotated point `gap` outside `side`, `focus` of the way from its middle.
fn point_on_side(shape: &Shape, side: Heading, focus: f64, gap: f64) -> Point {
    let (cx, cy) = shape.center();
    let focus = focus.clamp(-1.0, 1.0);
    match side {
        Heading::Left => (shape.x - gap, cy + focus * shape.height / 2.0),
        Heading::Right => (shape.x + shape.width + gap, cy + focus * shape.height / 2.0),
        Heading::Up => (cx + focus * shape.width / 2.0, shape.y - gap),
        Heading::Down => (cx + focus * shape.width / 2.0, shape.y + shape.height + gap),
    }
}

/// Pulls `point` onto the middle of a side when it is close to it.
///
/// The snapped point sits `config.binding_gap` outside the side. Points away
/// from every side's middle band are returned unchanged.
pub fn snap_to_mid(shape: &Shape, point: Point, config: &RoutingConfig) -> Point {
    let center = (
        shape.x + shape.width / 2.0 - SNAP_CENTER_NUDGE,
        shape.y + shape.height / 2.0 - SNAP_CENTER_NUDGE,
    );
    let local = rotate_point(point, center, -shape.angle);
    let vertical = (config.snap_tolerance * shape.height).clamp(config.snap_min, config.snap_max);
    let horizontal = (config.snap_tolerance * shape.width).clamp(config.snap_min, config.snap_max);
    let gap = config.binding_gap;

    let in_vertical_band = local.1 > center.1 - vertical && local.1 < center.1 + vertical;
    let in_horizontal_band = local.0 > center.0 - horizontal && local.0 < center.0 + horizontal;

    let snapped = if local.0 <= shape.x + shape.width / 2.0 && in_vertical_band {
        (shape.x - gap, center.1)
    } else if local.1 <= shape.y + shape.height / 2.0 && in_horizontal_band {
        (center.0, shape.y - gap)
    } else if local.0 >= shape.x + shape.width / 2.0 && in_vertical_band {
        (shape.x + shape.width + gap, center.1)
    } else if local.1 >= shape.y + shape.height / 2.0 && in_horizontal_band {
        (center.0, shape.y + shape.height + gap)
    } else {
        return point;
    };
    rotate_point(snapped, center, shape.angle)
}

/// Keeps ratios off exactly one half so the heading cannot flip on rounding.
pub fn normalize_fixed_point(fixed: [f64; 2]) -> [f64; 2] {
    fixed.map(|ratio| {
        if (ratio - 0.5).abs() < FIXED_POINT_HALF_EPSILON {
            0.5001
        } else {
            ratio
        }
    })
}

/// Binds one end of `arrow` to `shape`.
///
/// The current endpoint is snapped to the nearest side middle when close
/// enough and recorded as a fixed point. Routing is left to the caller.
pub fn bind_linear_element(
    arrow: &mut ElbowArrow,
    shape: &Shape,
    end: BindingEnd,
    config: &RoutingConfig,
) {
    let Some(point) = arrow.endpoint(end) else {
        return;
    };
    let snapped = snap_to_mid(shape, point, config);
    let local = rotate_point(snapped, shape.center(), -shape.angle);
    let side = side_facing(shape, local);
    let (cx, cy) = shape.center();

    let focus = match side {
        Heading::Left | Heading::Right if shape.height > 0.0 => (local.1 - cy) / (shape.height / 2.0),
        Heading::Up | Heading::Down if shape.width > 0.0 => (local.0 - cx) / (shape.width / 2.0),
        _ => 0.0,
    };
    let fixed_point = (shape.width > 0.0 && shape.height > 0.0).then(|| {
        normalize_fixed_point([
            (local.0 - shape.x) / shape.width,
            (local.1 - shape.y) / shape.height,
        ])
    });

    tracing::debug!(arrow = %arrow.id, ?end, ?side, ?fixed_point, "bound arrow endpoint");
    arrow.set_binding(
        end,
        Some(Binding {
            element_id: shape.id,
            focus: focus.clamp(-1.0, 1.0),
            gap: config.binding_gap,
            fixed_point,
        }),
    );
}

pub fn unbind_linear_element(arrow: &mut ElbowArrow, end: BindingEnd) {
    arrow.set_binding(end, None);
}
