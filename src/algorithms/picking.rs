use std::collections::BTreeSet;

use serde::Serialize;

use crate::algorithms::planarize::{find_edges_split_by_point, find_intersections, find_split_target, split_edge};
use crate::model::{EdgeId, PointId, Vec2};
use crate::Graph;

/// What a cursor position would attach to, in priority order: an existing
/// point, an edge crossing, a spot on an edge, or empty space.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Point { id: PointId, pos: Vec2, edges_to_split: Vec<EdgeId> },
    Intersection { pos: Vec2, edges: Vec<EdgeId> },
    Split { pos: Vec2, edge: EdgeId },
    Floating { pos: Vec2 },
}

impl Target {
    pub fn pos(&self) -> Vec2 {
        match self {
            Target::Point { pos, .. }
            | Target::Intersection { pos, .. }
            | Target::Split { pos, .. }
            | Target::Floating { pos } => *pos,
        }
    }
}

/// Classifies `pos` against the graph. `None` when nothing lies within
/// `radius`.
pub fn find_target(g: &Graph, pos: Vec2, radius: f64) -> Option<Target> {
    // Prefer points when within radius
    if let Some(id) = g.find_point_near(pos, radius) {
        let p = g.point(&id);
        return Some(Target::Point {
            edges_to_split: find_edges_split_by_point(g, p, radius),
            id,
            pos: p,
        });
    }

    // Then crossings, nearest first
    let mut best: Option<(f64, Target)> = None;
    for x in find_intersections(g) {
        let d = x.at.dist(pos);
        if d <= radius && best.as_ref().map_or(true, |(bd, _)| d < *bd) {
            best = Some((d, Target::Intersection { pos: x.at, edges: x.edges.into_iter().collect() }));
        }
    }
    if let Some((_, t)) = best {
        return Some(t);
    }

    // Else edges
    find_split_target(g, pos, radius).map(|(at, edge)| Target::Split { pos: at, edge })
}

/// Like [`find_target`], for the far end of an edge being drawn from `start`.
/// Targets that would create a self-loop or duplicate an edge of `start` are
/// rejected (`None`); empty space becomes [`Target::Floating`].
pub fn find_target_for_new_edge(g: &Graph, start: &PointId, pos: Vec2, radius: f64) -> Option<Target> {
    let mut excluded_points: BTreeSet<PointId> = g.point_neighbors().remove(start).unwrap_or_default();
    excluded_points.insert(start.clone());
    let excluded_edges: BTreeSet<EdgeId> = g.point_edges().remove(start).unwrap_or_default();

    let target = match find_target(g, pos, radius) {
        Some(t) => t,
        None => return Some(Target::Floating { pos }),
    };
    let ok = match &target {
        Target::Point { id, .. } => !excluded_points.contains(id),
        Target::Intersection { edges, .. } => edges.iter().all(|e| !excluded_edges.contains(e)),
        Target::Split { edge, .. } => !excluded_edges.contains(edge),
        Target::Floating { .. } => true,
    };
    ok.then_some(target)
}

/// Materializes a target as a point of `g`, splitting whatever edges it sits
/// on, and returns the point id.
pub fn resolve_target(g: &mut Graph, target: &Target) -> PointId {
    match target {
        Target::Point { id, edges_to_split, .. } => {
            for e in edges_to_split {
                split_edge(g, e, id);
            }
            id.clone()
        }
        Target::Intersection { pos, edges } => {
            let id = g.add_point(*pos, None);
            for e in edges {
                split_edge(g, e, &id);
            }
            id
        }
        Target::Split { pos, edge } => {
            let id = g.add_point(*pos, None);
            split_edge(g, edge, &id);
            id
        }
        Target::Floating { pos } => g.add_point(*pos, None),
    }
}
