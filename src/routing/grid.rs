use crate::geometry::{Bounds, Point};

use super::heading::Heading;

/// Sparse orthogonal grid: every node is an intersection of a candidate
/// vertical line (`xs`) and horizontal line (`ys`).
#[derive(Debug, Clone)]
pub struct RouteGrid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    closed: Vec<bool>,
}

/// Address of a grid node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddr {
    pub col: usize,
    pub row: usize,
}

impl RouteGrid {
    /// Candidate lines come from the stubs along their heading's cross axis,
    /// every region edge, and the common bounds.
    pub fn build(
        start: Point,
        start_heading: Heading,
        end: Point,
        end_heading: Heading,
        regions: &[Bounds],
        common: &Bounds,
    ) -> Self {
        let mut xs: Vec<f64> = Vec::with_capacity(regions.len() * 2 + 4);
        let mut ys: Vec<f64> = Vec::with_capacity(regions.len() * 2 + 4);
        for (point, heading) in [(start, start_heading), (end, end_heading)] {
            if heading.is_horizontal() {
                ys.push(point.1);
            } else {
                xs.push(point.0);
            }
        }
        for region in regions.iter().chain(std::iter::once(common)) {
            xs.push(region.min_x);
            xs.push(region.max_x);
            ys.push(region.min_y);
            ys.push(region.max_y);
        }
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        ys.sort_by(f64::total_cmp);
        ys.dedup();
        let closed = vec![false; xs.len() * ys.len()];
        Self { xs, ys, closed }
    }

    pub fn cols(&self) -> usize {
        self.xs.len()
    }

    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    pub fn pos(&self, addr: NodeAddr) -> Point {
        (self.xs[addr.col], self.ys[addr.row])
    }

    pub(crate) fn index(&self, addr: NodeAddr) -> usize {
        addr.row * self.xs.len() + addr.col
    }

    /// Node sitting exactly on `point`, if any.
    pub fn node_at(&self, point: Point) -> Option<NodeAddr> {
        let col = self.xs.iter().position(|x| *x == point.0)?;
        let row = self.ys.iter().position(|y| *y == point.1)?;
        Some(NodeAddr { col, row })
    }

    /// Forbids the search from stepping on `addr`.
    pub fn close(&mut self, addr: NodeAddr) {
        let idx = self.index(addr);
        self.closed[idx] = true;
    }

    pub fn is_closed(&self, addr: NodeAddr) -> bool {
        self.closed[self.index(addr)]
    }

    /// Adjacent node one step along `heading`.
    pub fn neighbor(&self, addr: NodeAddr, heading: Heading) -> Option<NodeAddr> {
        let (dc, dr) = heading.step();
        let col = addr.col.checked_add_signed(dc)?;
        let row = addr.row.checked_add_signed(dr)?;
        (col < self.cols() && row < self.rows()).then_some(NodeAddr { col, row })
    }

    /// True when the edge between two adjacent nodes cuts through a region.
    ///
    /// Adjacent nodes have no line between them, so the midpoint test is exact.
    pub fn edge_blocked(&self, from: NodeAddr, to: NodeAddr, regions: &[Bounds]) -> bool {
        let a = self.pos(from);
        let b = self.pos(to);
        let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        regions.iter().any(|region| region.contains_strict(mid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RouteGrid {
        let regions = [
            Bounds::new(-191.0, -191.0, 0.0, 0.0),
            Bounds::new(0.0, 0.0, 191.0, 191.0),
        ];
        let common = Bounds::new(-151.0, -151.0, 151.0, 151.0);
        RouteGrid::build(
            (0.0, -100.1),
            Heading::Right,
            (0.0, 99.9),
            Heading::Left,
            &regions,
            &common,
        )
    }

    #[test]
    fn lines_are_sorted_and_distinct() {
        let grid = sample();
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.rows(), 7);
        assert_eq!(grid.pos(NodeAddr { col: 0, row: 0 }), (-191.0, -191.0));
    }

    #[test]
    fn finds_nodes_by_position() {
        let grid = sample();
        let addr = grid.node_at((0.0, -100.1)).unwrap();
        assert_eq!(grid.pos(addr), (0.0, -100.1));
        assert!(grid.node_at((1.0, -100.1)).is_none());
    }

    #[test]
    fn neighbors_stop_at_the_border() {
        let grid = sample();
        let corner = NodeAddr { col: 0, row: 0 };
        assert!(grid.neighbor(corner, Heading::Up).is_none());
        assert!(grid.neighbor(corner, Heading::Left).is_none());
        assert_eq!(
            grid.neighbor(corner, Heading::Right),
            Some(NodeAddr { col: 1, row: 0 })
        );
    }

    #[test]
    fn boundary_edges_are_open() {
        let grid = sample();
        let regions = [Bounds::new(-191.0, -191.0, 0.0, 0.0)];
        let on_edge = grid.node_at((0.0, -100.1)).unwrap();
        let below = grid.neighbor(on_edge, Heading::Down).unwrap();
        assert!(!grid.edge_blocked(on_edge, below, &regions));
        let inside = grid.neighbor(on_edge, Heading::Left).unwrap();
        assert!(grid.edge_blocked(on_edge, inside, &regions));
    }

    #[test]
    fn closing_a_node() {
        let mut grid = sample();
        let addr = NodeAddr { col: 2, row: 3 };
        assert!(!grid.is_closed(addr));
        grid.close(addr);
        assert!(grid.is_closed(addr));
    }
}
