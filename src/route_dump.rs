use crate::routing::RouteOutcome;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub arrows: Vec<ArrowRouteDump>,
}

#[derive(Debug, Serialize)]
pub struct ArrowRouteDump {
    pub id: String,
    pub strategy: String,
    pub start_heading: String,
    pub end_heading: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub points: Vec<[f64; 2]>,
    pub bends: usize,
}

impl RouteDump {
    pub fn from_outcomes(outcomes: &[(String, RouteOutcome)]) -> Self {
        let arrows = outcomes
            .iter()
            .map(|(id, outcome)| {
                let route = &outcome.route;
                ArrowRouteDump {
                    id: id.clone(),
                    strategy: format!("{:?}", outcome.strategy),
                    start_heading: format!("{:?}", outcome.start_heading),
                    end_heading: format!("{:?}", outcome.end_heading),
                    x: route.x,
                    y: route.y,
                    width: route.width,
                    height: route.height,
                    points: route.points.iter().map(|(x, y)| [*x, *y]).collect(),
                    bends: route.points.len().saturating_sub(2),
                }
            })
            .collect();
        RouteDump { arrows }
    }
}

pub fn write_route_dump(path: &Path, outcomes: &[(String, RouteOutcome)]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = RouteDump::from_outcomes(outcomes);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{ElbowRoute, SearchStrategy, heading::Heading};

    #[test]
    fn dump_counts_bends() {
        let outcome = RouteOutcome {
            route: ElbowRoute {
                points: vec![(0.0, 0.0), (45.0, 0.0), (45.0, 200.0), (90.0, 200.0)],
                x: -45.0,
                y: -100.1,
                width: 90.0,
                height: 200.0,
            },
            start_heading: Heading::Right,
            end_heading: Heading::Left,
            strategy: SearchStrategy::Regions,
        };
        let dump = RouteDump::from_outcomes(&[("arrow".to_string(), outcome)]);
        let arrow = &dump.arrows[0];
        assert_eq!(arrow.bends, 2);
        assert_eq!(arrow.strategy, "Regions");
        assert_eq!(arrow.start_heading, "Right");
        assert_eq!(arrow.points[3], [90.0, 200.0]);
    }
}
