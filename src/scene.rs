use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};
use crate::routing::ElbowRoute;

/// Stable handle of a shape inside a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

/// A bindable rectangle. Read-only to the router.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians, clockwise on the y-down canvas.
    pub angle: f64,
    pub is_deleted: bool,
}

impl Shape {
    pub fn center(&self) -> Point {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Unrotated bounds.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrowhead {
    Arrow,
    Triangle,
    Bar,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingEnd {
    Start,
    End,
}

/// Attachment of an arrow endpoint to a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub element_id: ShapeId,
    /// Position along the bound side in `[-1, 1]`; `0` is the side's midpoint.
    pub focus: f64,
    /// Clearance between the shape outline and the endpoint.
    pub gap: f64,
    /// Attachment as a ratio of the unrotated width and height. Wins over `focus`.
    pub fixed_point: Option<[f64; 2]>,
}

/// An elbowed connector. `points` are relative to `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElbowArrow {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub points: Vec<Point>,
    pub elbowed: bool,
    pub start_binding: Option<Binding>,
    pub end_binding: Option<Binding>,
    pub start_arrowhead: Option<Arrowhead>,
    pub end_arrowhead: Option<Arrowhead>,
}

impl ElbowArrow {
    /// A free arrow at `(x, y)`; the extent is derived from `points`.
    pub fn new(id: impl Into<String>, x: f64, y: f64, points: Vec<Point>) -> Self {
        let (width, height) = points_extent(&points);
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            points,
            elbowed: true,
            start_binding: None,
            end_binding: None,
            start_arrowhead: None,
            end_arrowhead: None,
        }
    }

    pub fn with_end_arrowhead(mut self, arrowhead: Arrowhead) -> Self {
        self.end_arrowhead = Some(arrowhead);
        self
    }

    pub fn with_start_arrowhead(mut self, arrowhead: Arrowhead) -> Self {
        self.start_arrowhead = Some(arrowhead);
        self
    }

    pub fn binding(&self, end: BindingEnd) -> Option<&Binding> {
        match end {
            BindingEnd::Start => self.start_binding.as_ref(),
            BindingEnd::End => self.end_binding.as_ref(),
        }
    }

    pub fn set_binding(&mut self, end: BindingEnd, binding: Option<Binding>) {
        match end {
            BindingEnd::Start => self.start_binding = binding,
            BindingEnd::End => self.end_binding = binding,
        }
    }

    pub fn arrowhead(&self, end: BindingEnd) -> Option<Arrowhead> {
        match end {
            BindingEnd::Start => self.start_arrowhead,
            BindingEnd::End => self.end_arrowhead,
        }
    }

    /// Global position of the first or last point.
    pub fn endpoint(&self, end: BindingEnd) -> Option<Point> {
        let local = match end {
            BindingEnd::Start => self.points.first(),
            BindingEnd::End => self.points.last(),
        }?;
        Some(self.to_global(*local))
    }

    pub fn to_global(&self, local: Point) -> Point {
        (self.x + local.0, self.y + local.1)
    }

    /// Replaces points, origin and extent with a computed route.
    pub fn apply_route(&mut self, route: ElbowRoute) {
        self.points = route.points;
        self.x = route.x;
        self.y = route.y;
        self.width = route.width;
        self.height = route.height;
    }
}

/// Width and height of the box spanned by `points`.
pub fn points_extent(points: &[Point]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for (x, y) in points {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    (max_x - min_x, max_y - min_y)
}

/// Read-only view of the shapes an arrow can bind to.
pub trait SceneSnapshot {
    /// Live shape behind `id`; deleted or never-materialised shapes are `None`.
    fn lookup(&self, id: ShapeId) -> Option<&Shape>;

    fn non_deleted_shapes(&self) -> impl Iterator<Item = &Shape> + '_;
}

/// Arena of shapes addressed by [`ShapeId`].
///
/// Every slot keeps the string identifier it was created with so a document
/// can be written back unchanged. A slot can be empty when a binding names an
/// identifier that has no shape.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Option<Shape>>,
    names: Vec<String>,
    by_name: HashMap<String, ShapeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `name`, allocating an empty slot on first sight.
    pub fn intern(&mut self, name: &str) -> ShapeId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ShapeId(self.slots.len() as u32);
        self.slots.push(None);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Inserts (or replaces) the rectangle called `name` and returns its handle.
    pub fn insert_rectangle(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> ShapeId {
        let id = self.intern(name);
        self.slots[id.0 as usize] = Some(Shape {
            id,
            x,
            y,
            width,
            height,
            angle: 0.0,
            is_deleted: false,
        });
        id
    }

    /// Shape in `id`'s slot, deleted or not.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Marks the shape deleted. Bindings pointing at it stop resolving.
    pub fn delete(&mut self, id: ShapeId) {
        if let Some(shape) = self.shape_mut(id) {
            shape.is_deleted = true;
        }
    }

    pub fn name(&self, id: ShapeId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn id_for(&self, name: &str) -> Option<ShapeId> {
        self.by_name.get(name).copied()
    }

    /// All materialised shapes, deleted ones included, in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.slots.iter().flatten()
    }
}

impl SceneSnapshot for Scene {
    fn lookup(&self, id: ShapeId) -> Option<&Shape> {
        self.get(id).filter(|shape| !shape.is_deleted)
    }

    fn non_deleted_shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes().filter(|shape| !shape.is_deleted)
    }
}
