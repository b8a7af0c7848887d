//! Scene documents on disk.
//!
//! A document is `{ "elements": [...] }` with camelCase element records.
//! Loading builds the shape arena and the arrow list; saving writes both back
//! over the records they came from, so fields the router does not know about
//! survive a round trip.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DocumentError, Result};
use crate::routing::{RouteOptions, RouteOutcome, plan_elbow_route};
use crate::scene::{Arrowhead, Binding, ElbowArrow, Scene, ShapeId};

#[derive(Debug, Deserialize, Serialize)]
struct RawDocument {
    elements: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShapeRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    angle: f64,
    #[serde(default)]
    is_deleted: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArrowRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    x: f64,
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    angle: f64,
    #[serde(default)]
    is_deleted: bool,
    points: Vec<[f64; 2]>,
    #[serde(default = "default_elbowed")]
    elbowed: bool,
    #[serde(default)]
    start_binding: Option<BindingRecord>,
    #[serde(default)]
    end_binding: Option<BindingRecord>,
    #[serde(default)]
    start_arrowhead: Option<Arrowhead>,
    #[serde(default)]
    end_arrowhead: Option<Arrowhead>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn default_elbowed() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingRecord {
    element_id: String,
    #[serde(default)]
    focus: f64,
    #[serde(default)]
    gap: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_point: Option<[f64; 2]>,
}

#[derive(Debug, Clone)]
enum Element {
    Shape { id: ShapeId, record: ShapeRecord },
    Arrow { index: usize, record: ArrowRecord },
}

/// A loaded scene: the shape arena, the arrows, and the record order.
#[derive(Debug, Clone)]
pub struct Document {
    pub scene: Scene,
    pub arrows: Vec<ElbowArrow>,
    elements: Vec<Element>,
    extra: Map<String, Value>,
    deleted_arrows: HashSet<usize>,
}

impl Document {
    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(input)?;
        let mut scene = Scene::new();
        let mut arrows = Vec::new();
        let mut elements = Vec::with_capacity(raw.elements.len());
        let mut deleted_arrows = HashSet::new();
        let mut seen = HashSet::new();

        for value in raw.elements {
            let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            let kind = value.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
            if !seen.insert(id.clone()) {
                return Err(DocumentError::DuplicateId { id });
            }
            match kind.as_str() {
                "rectangle" => {
                    let record: ShapeRecord = serde_json::from_value(value)?;
                    let shape_id = scene.insert_rectangle(
                        &record.id,
                        record.x,
                        record.y,
                        record.width,
                        record.height,
                    );
                    if let Some(shape) = scene.shape_mut(shape_id) {
                        shape.angle = record.angle;
                        shape.is_deleted = record.is_deleted;
                    }
                    elements.push(Element::Shape {
                        id: shape_id,
                        record,
                    });
                }
                "arrow" => {
                    let record: ArrowRecord = serde_json::from_value(value)?;
                    if record.points.len() < 2 {
                        return Err(DocumentError::TooFewPoints {
                            id: record.id,
                            count: record.points.len(),
                        });
                    }
                    let index = arrows.len();
                    if record.is_deleted {
                        deleted_arrows.insert(index);
                    }
                    arrows.push(arrow_from_record(&record, &mut scene));
                    elements.push(Element::Arrow { index, record });
                }
                _ => return Err(DocumentError::UnknownType { id, kind }),
            }
        }

        Ok(Self {
            scene,
            arrows,
            elements,
            extra: raw.extra,
            deleted_arrows,
        })
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let raw = self.to_raw()?;
        let out = if pretty {
            serde_json::to_string_pretty(&raw)?
        } else {
            serde_json::to_string(&raw)?
        };
        Ok(out)
    }

    pub fn arrow(&self, id: &str) -> Option<&ElbowArrow> {
        self.arrows.iter().find(|arrow| arrow.id == id)
    }

    pub fn arrow_mut(&mut self, id: &str) -> Option<&mut ElbowArrow> {
        self.arrows.iter_mut().find(|arrow| arrow.id == id)
    }

    /// Re-routes every live elbowed arrow in document order and returns the
    /// outcome per arrow id.
    pub fn reroute_all(&mut self, options: &RouteOptions) -> Vec<(String, RouteOutcome)> {
        let mut outcomes = Vec::new();
        for (index, arrow) in self.arrows.iter_mut().enumerate() {
            if !arrow.elbowed || self.deleted_arrows.contains(&index) {
                continue;
            }
            let outcome = plan_elbow_route(arrow, &self.scene, &[], options);
            arrow.apply_route(outcome.route.clone());
            outcomes.push((arrow.id.clone(), outcome));
        }
        tracing::debug!(routed = outcomes.len(), "re-routed document arrows");
        outcomes
    }

    fn to_raw(&self) -> Result<RawDocument> {
        let mut elements = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let value = match element {
                Element::Shape { id, record } => {
                    let mut record = record.clone();
                    if let Some(shape) = self.scene.get(*id) {
                        record.x = shape.x;
                        record.y = shape.y;
                        record.width = shape.width;
                        record.height = shape.height;
                        record.angle = shape.angle;
                        record.is_deleted = shape.is_deleted;
                    }
                    serde_json::to_value(record)?
                }
                Element::Arrow { index, record } => {
                    let mut record = record.clone();
                    if let Some(arrow) = self.arrows.get(*index) {
                        self.write_arrow(arrow, &mut record);
                    }
                    serde_json::to_value(record)?
                }
            };
            elements.push(value);
        }
        Ok(RawDocument {
            elements,
            extra: self.extra.clone(),
        })
    }

    fn write_arrow(&self, arrow: &ElbowArrow, record: &mut ArrowRecord) {
        record.id = arrow.id.clone();
        record.x = arrow.x;
        record.y = arrow.y;
        record.width = arrow.width;
        record.height = arrow.height;
        record.points = arrow.points.iter().map(|(x, y)| [*x, *y]).collect();
        record.elbowed = arrow.elbowed;
        record.start_binding = arrow.start_binding.as_ref().map(|b| self.binding_record(b));
        record.end_binding = arrow.end_binding.as_ref().map(|b| self.binding_record(b));
        record.start_arrowhead = arrow.start_arrowhead;
        record.end_arrowhead = arrow.end_arrowhead;
    }

    fn binding_record(&self, binding: &Binding) -> BindingRecord {
        BindingRecord {
            element_id: self
                .scene
                .name(binding.element_id)
                .unwrap_or_default()
                .to_string(),
            focus: binding.focus,
            gap: binding.gap,
            fixed_point: binding.fixed_point,
        }
    }
}

fn arrow_from_record(record: &ArrowRecord, scene: &mut Scene) -> ElbowArrow {
    let mut binding = |record: &Option<BindingRecord>| {
        record.as_ref().map(|b| Binding {
            element_id: scene.intern(&b.element_id),
            focus: b.focus,
            gap: b.gap,
            fixed_point: b.fixed_point,
        })
    };
    let start_binding = binding(&record.start_binding);
    let end_binding = binding(&record.end_binding);
    ElbowArrow {
        id: record.id.clone(),
        x: record.x,
        y: record.y,
        width: record.width,
        height: record.height,
        points: record.points.iter().map(|[x, y]| (*x, *y)).collect(),
        elbowed: record.elbowed,
        start_binding,
        end_binding,
        start_arrowhead: record.start_arrowhead,
        end_arrowhead: record.end_arrowhead,
    }
}
