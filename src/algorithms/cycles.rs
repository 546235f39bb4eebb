//! Bounded brute-force region extraction: enumerate simple cycles, then keep
//! the ones that enclose no other cycle.

use std::collections::{BTreeSet, HashSet};

use crate::geometry::math::{point_in_polygon, polygon_area};
use crate::geometry::tolerance::EPS_FACE_AREA;
use crate::model::{EdgeId, PointId, Vec2};
use crate::Graph;

/// All simple cycles of at most `max_len` vertices, one per vertex set.
/// Each cycle is reported starting at its smallest id.
pub fn find_cycles(g: &Graph, max_len: usize) -> Vec<Vec<PointId>> {
    let ids: Vec<&PointId> = g.points().keys().collect();
    let index_of = |id: &PointId| ids.binary_search(&id).ok();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    for e in g.edges() {
        if let (Some(i), Some(j)) = (index_of(e.a()), index_of(e.b())) {
            adj[i].push(j);
            adj[j].push(i);
        }
    }
    for lst in &mut adj {
        lst.sort_unstable();
    }

    struct Search<'a> {
        adj: &'a [Vec<usize>],
        max_len: usize,
        on_path: Vec<bool>,
        path: Vec<usize>,
        seen: HashSet<Vec<usize>>,
        out: Vec<Vec<usize>>,
    }

    impl Search<'_> {
        // Only vertices above `start` are entered, so every cycle is found
        // from its smallest vertex.
        fn dfs(&mut self, start: usize, node: usize) {
            self.on_path[node] = true;
            self.path.push(node);
            for k in 0..self.adj[node].len() {
                let next = self.adj[node][k];
                if next == start && self.path.len() > 2 {
                    let mut key = self.path.clone();
                    key.sort_unstable();
                    if self.seen.insert(key) {
                        self.out.push(self.path.clone());
                    }
                } else if next > start && !self.on_path[next] && self.path.len() < self.max_len {
                    self.dfs(start, next);
                }
            }
            self.path.pop();
            self.on_path[node] = false;
        }
    }

    let mut search = Search {
        adj: &adj,
        max_len,
        on_path: vec![false; ids.len()],
        path: Vec::new(),
        seen: HashSet::new(),
        out: Vec::new(),
    };
    for start in 0..ids.len() {
        search.dfs(start, start);
    }
    search
        .out
        .into_iter()
        .map(|c| c.into_iter().map(|i| ids[i].clone()).collect())
        .collect()
}

struct Candidate {
    points: Vec<PointId>,
    polygon: Vec<Vec2>,
    vertex_set: BTreeSet<PointId>,
    edges: BTreeSet<EdgeId>,
}

impl Candidate {
    fn new(g: &Graph, points: Vec<PointId>) -> Self {
        let polygon = points.iter().map(|id| g.point(id)).collect();
        let vertex_set = points.iter().cloned().collect();
        let edges = (0..points.len())
            .filter_map(|i| EdgeId::new(&points[i], &points[(i + 1) % points.len()]))
            .collect();
        Candidate { points, polygon, vertex_set, edges }
    }

    /// Whether `other` sits inside this cycle: every edge of `other` that is
    /// not also an edge here has its midpoint strictly inside this polygon,
    /// and `other` either has such an edge or uses a strict subset of our
    /// vertices.
    fn encloses(&self, g: &Graph, other: &Candidate) -> bool {
        let mut own_edges_only = true;
        for e in other.edges.difference(&self.edges) {
            own_edges_only = false;
            let (a, b) = g.edge_segment(e);
            if !point_in_polygon(a.lerp(b, 0.5), &self.polygon) {
                return false;
            }
        }
        !own_edges_only
            || (other.vertex_set.is_subset(&self.vertex_set)
                && other.vertex_set.len() < self.vertex_set.len())
    }
}

/// Minimal cycles: those that enclose no other discovered cycle.
pub fn minimal_cycles(g: &Graph, max_len: usize) -> Vec<Vec<PointId>> {
    let cands: Vec<Candidate> = find_cycles(g, max_len)
        .into_iter()
        .map(|c| Candidate::new(g, c))
        .filter(|c| polygon_area(&c.polygon) > EPS_FACE_AREA)
        .collect();
    cands
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            !cands
                .iter()
                .enumerate()
                .any(|(j, o)| *i != j && c.encloses(g, o))
        })
        .map(|(_, c)| c.points.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_chord() -> Graph {
        // square a b c d with chord a-c
        let mut g = Graph::new();
        let a = g.add_point(Vec2::new(0.0, 0.0), None);
        let b = g.add_point(Vec2::new(1.0, 0.0), None);
        let c = g.add_point(Vec2::new(1.0, 1.0), None);
        let d = g.add_point(Vec2::new(0.0, 1.0), None);
        g.add_edge(&a, &b);
        g.add_edge(&b, &c);
        g.add_edge(&c, &d);
        g.add_edge(&d, &a);
        g.add_edge(&a, &c);
        g
    }

    #[test]
    fn enumerates_each_cycle_once() {
        let g = grid_with_chord();
        let cycles = find_cycles(&g, 14);
        assert_eq!(cycles.len(), 3);
        assert!(cycles.iter().all(|c| c[0] == PointId::from(0)));
    }

    #[test]
    fn max_len_bounds_enumeration() {
        let g = grid_with_chord();
        assert_eq!(find_cycles(&g, 3).len(), 2);
    }

    #[test]
    fn outer_square_is_not_minimal() {
        let g = grid_with_chord();
        let min = minimal_cycles(&g, 14);
        assert_eq!(min.len(), 2);
        assert!(min.iter().all(|c| c.len() == 3));
    }

    #[test]
    fn open_paths_have_no_cycles() {
        let mut g = Graph::new();
        let a = g.add_point(Vec2::new(0.0, 0.0), None);
        let b = g.add_point(Vec2::new(1.0, 0.0), None);
        let c = g.add_point(Vec2::new(2.0, 1.0), None);
        g.add_edge(&a, &b);
        g.add_edge(&b, &c);
        assert!(find_cycles(&g, 14).is_empty());
    }
}
