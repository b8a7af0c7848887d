use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::{Bounds, Point, manhattan};

use super::grid::{NodeAddr, RouteGrid};
use super::heading::Heading;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchState {
    addr: NodeAddr,
    heading: Heading,
}

#[derive(Clone, Copy, Debug)]
struct SearchEntry {
    est: f64,
    turns: u32,
    /// Path cost already spent when the latest turn was taken.
    last_turn: f64,
    seq: u64,
    state: SearchState,
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .est
            .total_cmp(&self.est)
            .then_with(|| other.turns.cmp(&self.turns))
            .then_with(|| other.last_turn.total_cmp(&self.last_turn))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchEntry {}

/// Lower bound on the segments still needed to reach `end` when moving along
/// `heading` and having to arrive moving along `arrival`.
fn estimate_segment_count(pos: Point, end: Point, heading: Heading, arrival: Heading) -> u32 {
    let along = |h: Heading| {
        let (ux, uy) = h.unit();
        (end.0 - pos.0) * ux + (end.1 - pos.1) * uy
    };
    let aligned = if heading.is_horizontal() {
        pos.1 == end.1
    } else {
        pos.0 == end.0
    };
    if heading == arrival {
        if along(heading) <= 0.0 {
            4
        } else if aligned {
            0
        } else {
            2
        }
    } else if heading == arrival.flip() {
        if aligned { 4 } else { 2 }
    } else if along(heading) > 0.0 && along(arrival) > 0.0 {
        1
    } else {
        3
    }
}

/// Cheapest orthogonal path between two grid nodes.
///
/// The path leaves `start` as if it had been travelling along
/// `start_heading` (no reversal on the first edge) and is steered to arrive
/// against `end_heading`. Cost is length plus `bend³` per turn, where `bend`
/// is the Manhattan distance between the endpoints. Ties go to fewer turns,
/// then to the path that took its latest turn sooner, then to the earliest
/// discovered one.
pub fn astar(
    grid: &RouteGrid,
    start: NodeAddr,
    end: NodeAddr,
    start_heading: Heading,
    end_heading: Heading,
    regions: &[Bounds],
) -> Option<Vec<Point>> {
    let start_pos = grid.pos(start);
    let end_pos = grid.pos(end);
    let bend = manhattan(start_pos, end_pos);
    let turn_penalty = bend.powi(3);
    let segment_weight = bend.powi(2);
    let arrival = end_heading.flip();

    let state_index = |state: SearchState| grid.index(state.addr) * 4 + state.heading.slot();
    let states = grid.cols() * grid.rows() * 4;
    let mut best_cost = vec![f64::INFINITY; states];
    let mut prev: Vec<Option<SearchState>> = vec![None; states];
    let mut done = vec![false; states];
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    let origin = SearchState {
        addr: start,
        heading: start_heading,
    };
    best_cost[state_index(origin)] = 0.0;
    heap.push(SearchEntry {
        est: 0.0,
        turns: 0,
        last_turn: 0.0,
        seq,
        state: origin,
    });

    while let Some(entry) = heap.pop() {
        let state = entry.state;
        let idx = state_index(state);
        if done[idx] {
            continue;
        }
        if state.addr == end {
            let mut points = vec![grid.pos(state.addr)];
            let mut cur = state;
            while let Some(parent) = prev[state_index(cur)] {
                points.push(grid.pos(parent.addr));
                cur = parent;
            }
            points.reverse();
            return Some(points);
        }
        done[idx] = true;

        let cost = best_cost[idx];
        let pos = grid.pos(state.addr);
        for heading in Heading::ALL {
            if heading == state.heading.flip() {
                continue;
            }
            let Some(next) = grid.neighbor(state.addr, heading) else {
                continue;
            };
            if grid.is_closed(next) || grid.edge_blocked(state.addr, next, regions) {
                continue;
            }
            let next_state = SearchState {
                addr: next,
                heading,
            };
            let next_idx = state_index(next_state);
            if done[next_idx] {
                continue;
            }
            let next_pos = grid.pos(next);
            let turned = heading != state.heading;
            let next_cost = cost + manhattan(pos, next_pos) + if turned { turn_penalty } else { 0.0 };
            if next_cost >= best_cost[next_idx] {
                continue;
            }
            best_cost[next_idx] = next_cost;
            prev[next_idx] = Some(state);
            let remaining = estimate_segment_count(next_pos, end_pos, heading, arrival) as f64;
            let est = next_cost + manhattan(end_pos, next_pos) + remaining * segment_weight;
            seq += 1;
            heap.push(SearchEntry {
                est,
                turns: entry.turns + u32::from(turned),
                last_turn: if turned { cost } else { entry.last_turn },
                seq,
                state: next_state,
            });
        }
    }

    None
}
