use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::geometry::intersect::{intersect_segments, SegIntersection};
use crate::geometry::math::{dist_point_to_seg, seg_distance_sq};
use crate::geometry::tolerance::{EPS_DENOM, EPS_POINT, MAX_PLANARIZE_ITERATIONS};
use crate::model::{EdgeId, PointId, Vec2};
use crate::Graph;

/// What a planarization pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanarizeReport {
    pub iterations: usize,
    pub points_added: usize,
    pub edges_split: usize,
    pub hit_ceiling: bool,
}

/// A crossing between edges, for hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub at: Vec2,
    pub edges: BTreeSet<EdgeId>,
}

enum Contact {
    // Existing point lies on the interior of an edge
    OnEdge { edge: EdgeId, point: PointId },
    // Two edges cross away from every endpoint
    Crossing { e1: EdgeId, e2: EdgeId, at: Vec2 },
}

fn is_degenerate(g: &Graph, e: &EdgeId) -> bool {
    let (a, b) = g.edge_segment(e);
    a.dist(b) <= EPS_POINT
}

/// True when `p` touches the interior of segment `a`-`b`: within `tol` of the
/// segment but farther than `tol` from both ends.
fn on_interior(p: Vec2, a: Vec2, b: Vec2, tol: f64) -> bool {
    p.dist(a) > tol && p.dist(b) > tol && dist_point_to_seg(p, a, b) <= tol
}

fn proper_crossing(g: &Graph, e1: &EdgeId, e2: &EdgeId) -> Option<Vec2> {
    let (a, b) = g.edge_segment(e1);
    let (c, d) = g.edge_segment(e2);
    match intersect_segments(a, b, c, d, EPS_DENOM, EPS_DENOM) {
        SegIntersection::Proper { at, .. } => {
            let clear = [a, b, c, d].iter().all(|q| q.dist(at) > EPS_POINT);
            clear.then_some(at)
        }
        _ => None,
    }
}

fn first_contact(g: &Graph) -> Option<Contact> {
    let edges: Vec<&EdgeId> = g.edges().iter().filter(|e| !is_degenerate(g, e)).collect();
    for (i, e1) in edges.iter().enumerate() {
        let (a, b) = g.edge_segment(e1);
        for e2 in edges.iter().skip(i + 1) {
            let (c, d) = g.edge_segment(e2);
            for (q, qid) in [(c, e2.a()), (d, e2.b())] {
                if !e1.has(qid) && on_interior(q, a, b, EPS_POINT) {
                    return Some(Contact::OnEdge { edge: (*e1).clone(), point: qid.clone() });
                }
            }
            for (q, qid) in [(a, e1.a()), (b, e1.b())] {
                if !e2.has(qid) && on_interior(q, c, d, EPS_POINT) {
                    return Some(Contact::OnEdge { edge: (*e2).clone(), point: qid.clone() });
                }
            }
            if e1.shares_endpoint(e2) {
                continue;
            }
            if let Some(at) = proper_crossing(g, e1, e2) {
                return Some(Contact::Crossing { e1: (*e1).clone(), e2: (*e2).clone(), at });
            }
        }
    }
    None
}

/// Replaces `edge` by two edges through `point`. Does nothing (and returns
/// `false`) when the edge is already gone or `point` is one of its ends, so
/// repeated calls are harmless.
pub fn split_edge(g: &mut Graph, edge: &EdgeId, point: &PointId) -> bool {
    if !g.has_edge(edge) || edge.has(point) {
        return false;
    }
    g.remove_edge(edge);
    g.add_edge(edge.a(), point);
    g.add_edge(point, edge.b());
    true
}

/// Resolves every crossing, T-junction and collinear overlap by inserting
/// vertices, in place.
pub fn planarize_in_place(g: &mut Graph) -> PlanarizeReport {
    let mut report = PlanarizeReport::default();
    for e in g.edges().iter().filter(|e| is_degenerate(g, e)) {
        debug!(edge = %e, "skipping near-zero-length edge");
    }
    loop {
        if report.iterations >= MAX_PLANARIZE_ITERATIONS {
            warn!(iterations = report.iterations, "planarize: iteration ceiling reached, keeping current state");
            report.hit_ceiling = true;
            break;
        }
        let contact = match first_contact(g) {
            Some(c) => c,
            None => break,
        };
        report.iterations += 1;
        match contact {
            Contact::OnEdge { edge, point } => {
                if split_edge(g, &edge, &point) {
                    report.edges_split += 1;
                }
            }
            Contact::Crossing { e1, e2, at } => {
                let before = g.points().len();
                let pid = g.add_point(at, None);
                report.points_added += g.points().len() - before;
                for e in [&e1, &e2] {
                    if split_edge(g, e, &pid) {
                        report.edges_split += 1;
                    }
                }
            }
        }
    }
    debug!(
        iterations = report.iterations,
        points_added = report.points_added,
        "planarize done"
    );
    report
}

/// Planarized copy of `source`.
pub fn planarize(source: &Graph) -> Graph {
    let mut g = source.clone();
    planarize_in_place(&mut g);
    g
}

/// Proper crossings between edges that do not share an endpoint, merged by
/// location. Nothing is mutated.
pub fn find_intersections(g: &Graph) -> Vec<Intersection> {
    let edges: Vec<&EdgeId> = g.edges().iter().filter(|e| !is_degenerate(g, e)).collect();
    let mut out: Vec<Intersection> = Vec::new();
    for (i, e1) in edges.iter().enumerate() {
        for e2 in edges.iter().skip(i + 1) {
            if e1.shares_endpoint(e2) {
                continue;
            }
            let Some(at) = proper_crossing(g, e1, e2) else { continue };
            match out.iter_mut().find(|x| x.at.dist(at) <= EPS_POINT) {
                Some(x) => {
                    x.edges.insert((*e1).clone());
                    x.edges.insert((*e2).clone());
                }
                None => out.push(Intersection {
                    at,
                    edges: [(*e1).clone(), (*e2).clone()].into_iter().collect(),
                }),
            }
        }
    }
    out
}

/// Edges whose interior passes within `tol` of `pos` (endpoints excluded).
pub fn find_edges_split_by_point(g: &Graph, pos: Vec2, tol: f64) -> Vec<EdgeId> {
    g.edges()
        .iter()
        .filter(|e| {
            let (a, b) = g.edge_segment(e);
            on_interior(pos, a, b, tol)
        })
        .cloned()
        .collect()
}

/// Nearest edge within `tol` of `pos`, with the projection of `pos` onto it.
pub fn find_split_target(g: &Graph, pos: Vec2, tol: f64) -> Option<(Vec2, EdgeId)> {
    let mut best: Option<(f64, Vec2, &EdgeId)> = None;
    for e in g.edges() {
        let (a, b) = g.edge_segment(e);
        let (d2, t) = seg_distance_sq(pos, a, b);
        if d2 <= tol * tol && best.map_or(true, |(bd, _, _)| d2 < bd) {
            best = Some((d2, a.lerp(b, t), e));
        }
    }
    best.map(|(_, p, e)| (p, e.clone()))
}
