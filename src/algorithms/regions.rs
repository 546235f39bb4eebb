use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::algorithms::cycles::minimal_cycles;
use crate::geometry::math::{point_in_polygon, polygon_area, polygon_centroid, polygon_perimeter, polygon_signed_area};
use crate::geometry::tolerance::{EPS_FACE_AREA, EPS_POINT, MAX_CYCLE_LEN};
use crate::model::{PointId, Vec2};
use crate::Graph;

#[cfg(feature = "region_prof")]
use std::time::Instant;

/// Canonical region key: the sorted ids of the boundary points. Independent
/// of traversal start and direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(Vec<PointId>);

impl RegionId {
    pub fn from_points(points: &[PointId]) -> Self {
        let mut ids = points.to_vec();
        ids.sort();
        RegionId(ids)
    }

    pub fn points(&self) -> &[PointId] {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

/// Region id → boundary, counter-clockwise (y-up) and starting at the
/// smallest id.
pub type Regions = BTreeMap<RegionId, Vec<PointId>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionStrategy {
    /// Enumerate simple cycles up to `MAX_CYCLE_LEN` points and keep the minimal ones.
    BruteForce,
    /// Trace faces by rotational order; needs a planarized graph.
    #[default]
    FaceTrace,
    /// Run both, warn on disagreement, return the face trace.
    CrossCheck,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("region strategies disagree: {} only from brute force, {} only from face trace", .only_brute_force.len(), .only_face_trace.len())]
pub struct RegionMismatch {
    pub only_brute_force: Vec<RegionId>,
    pub only_face_trace: Vec<RegionId>,
}

/// Rotates to the smallest id and orients counter-clockwise.
pub(crate) fn normalize_cycle(g: &Graph, mut cycle: Vec<PointId>) -> Vec<PointId> {
    let poly: Vec<Vec2> = cycle.iter().map(|id| g.point(id)).collect();
    if polygon_signed_area(&poly) < 0.0 {
        cycle.reverse();
    }
    if let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    {
        cycle.rotate_left(min_pos);
    }
    cycle
}

fn collect(g: &Graph, cycles: Vec<Vec<PointId>>) -> Regions {
    cycles
        .into_iter()
        .map(|c| {
            let c = normalize_cycle(g, c);
            (RegionId::from_points(&c), c)
        })
        .collect()
}

pub fn brute_force(g: &Graph) -> Regions {
    collect(g, minimal_cycles(g, MAX_CYCLE_LEN))
}

/// Rotational face trace. At every vertex the walk leaves along the neighbor
/// reached by the smallest clockwise rotation from the edge it arrived on, so
/// bounded faces come out counter-clockwise and the outer face clockwise.
pub fn face_trace(g: &Graph) -> Regions {
    let ids: Vec<&PointId> = g.points().keys().collect();
    let pos: Vec<Vec2> = ids.iter().map(|id| g.point(id)).collect();
    let index_of = |id: &PointId| ids.binary_search(&id).ok();

    let mut links: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    for e in g.edges() {
        let (Some(u), Some(v)) = (index_of(e.a()), index_of(e.b())) else { continue };
        if pos[u].dist(pos[v]) > EPS_POINT {
            links[u].push(v);
            links[v].push(u);
        }
    }
    // Dangling chains bound no face but would make the walk around them
    // revisit vertices; strip them first.
    let mut stack: Vec<usize> = (0..links.len()).filter(|&u| links[u].len() == 1).collect();
    while let Some(u) = stack.pop() {
        if let Some(v) = links[u].pop() {
            links[v].retain(|&w| w != u);
            if links[v].len() == 1 {
                stack.push(v);
            }
        }
    }

    // Outgoing (bearing in degrees, neighbor) per vertex.
    let adj: Vec<Vec<(f64, usize)>> = links
        .iter()
        .enumerate()
        .map(|(u, vs)| {
            let mut out: Vec<(f64, usize)> = vs.iter().map(|&v| ((pos[v] - pos[u]).bearing_deg(), v)).collect();
            out.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            out
        })
        .collect();
    let slot_of = |u: usize, v: usize| adj[u].iter().position(|&(_, w)| w == v);

    let total: usize = adj.iter().map(|l| l.len()).sum();
    let mut used: Vec<Vec<bool>> = adj.iter().map(|l| vec![false; l.len()]).collect();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for u0 in 0..adj.len() {
        for k0 in 0..adj[u0].len() {
            if used[u0][k0] {
                continue;
            }
            let (mut u, mut k) = (u0, k0);
            let mut cycle: Vec<usize> = Vec::new();
            let mut on_cycle = vec![false; adj.len()];
            let mut simple = true;
            let mut closed = false;
            for _ in 0..=total {
                used[u][k] = true;
                if on_cycle[u] {
                    simple = false;
                }
                on_cycle[u] = true;
                cycle.push(u);
                let v = adj[u][k].1;
                let back = adj[v][slot_of(v, u).unwrap_or(0)].0;
                let next = (0..adj[v].len()).min_by(|&i, &j| {
                    let rot = |s: usize| {
                        let r = (back - adj[v][s].0).rem_euclid(360.0);
                        if r <= 0.0 { 360.0 } else { r }
                    };
                    rot(i).total_cmp(&rot(j))
                });
                let Some(kn) = next else { break };
                if v == u0 && kn == k0 {
                    closed = true;
                    break;
                }
                if used[v][kn] {
                    break;
                }
                u = v;
                k = kn;
            }
            if !closed || !simple || cycle.len() < 3 {
                continue;
            }
            let poly: Vec<Vec2> = cycle.iter().map(|&i| pos[i]).collect();
            if polygon_signed_area(&poly) > EPS_FACE_AREA {
                faces.push(cycle);
            }
        }
    }

    // A face around a detached component has that component's vertices
    // strictly inside it; drop it.
    let polys: Vec<Vec<Vec2>> = faces.iter().map(|f| f.iter().map(|&i| pos[i]).collect()).collect();
    let encloses = |outer: usize, inner: usize| {
        faces[inner]
            .iter()
            .any(|v| !faces[outer].contains(v) && point_in_polygon(pos[*v], &polys[outer]))
    };
    let kept: Vec<Vec<PointId>> = (0..faces.len())
        .filter(|&f| !(0..faces.len()).any(|o| o != f && encloses(f, o)))
        .map(|f| faces[f].iter().map(|&i| ids[i].clone()).collect())
        .collect();
    collect(g, kept)
}

/// Runs both strategies and reports any disagreement on region ids.
pub fn cross_check(g: &Graph) -> Result<Regions, RegionMismatch> {
    let bf = brute_force(g);
    let ft = face_trace(g);
    let only_brute_force: Vec<RegionId> = bf.keys().filter(|k| !ft.contains_key(*k)).cloned().collect();
    let only_face_trace: Vec<RegionId> = ft.keys().filter(|k| !bf.contains_key(*k)).cloned().collect();
    if only_brute_force.is_empty() && only_face_trace.is_empty() {
        Ok(ft)
    } else {
        Err(RegionMismatch { only_brute_force, only_face_trace })
    }
}

pub fn find_regions(g: &Graph, strategy: RegionStrategy) -> Regions {
    #[cfg(feature = "region_prof")]
    let t0 = Instant::now();
    let out = match strategy {
        RegionStrategy::BruteForce => brute_force(g),
        RegionStrategy::FaceTrace => face_trace(g),
        RegionStrategy::CrossCheck => match cross_check(g) {
            Ok(r) => r,
            Err(m) => {
                warn!(
                    only_brute_force = ?m.only_brute_force,
                    only_face_trace = ?m.only_face_trace,
                    "{}", m
                );
                face_trace(g)
            }
        },
    };
    #[cfg(feature = "region_prof")]
    tracing::debug!(
        ?strategy,
        regions = out.len(),
        ms = t0.elapsed().as_secs_f64() * 1000.0,
        "find_regions"
    );
    out
}

/// Geometry of one region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionInfo {
    pub id: RegionId,
    pub points: Vec<PointId>,
    pub polygon: Vec<Vec2>,
    pub area: f64,
    pub perimeter: f64,
    pub centroid: Vec2,
}

pub fn describe_regions(g: &Graph, regions: &Regions) -> Vec<RegionInfo> {
    regions
        .iter()
        .map(|(id, points)| {
            let polygon: Vec<Vec2> = points.iter().map(|p| g.point(p)).collect();
            RegionInfo {
                id: id.clone(),
                points: points.clone(),
                area: polygon_area(&polygon),
                perimeter: polygon_perimeter(&polygon),
                centroid: polygon_centroid(&polygon),
                polygon,
            }
        })
        .collect()
}

/// Regions in reading order on a y-down canvas: ascending centroid y, then x.
/// Face `i` of this order takes line `i` of the room weights.
pub fn sorted_regions(g: &Graph, regions: &Regions) -> Vec<RegionInfo> {
    let mut out = describe_regions(g, regions);
    out.sort_by(|a, b| {
        a.centroid
            .y
            .total_cmp(&b.centroid.y)
            .then(a.centroid.x.total_cmp(&b.centroid.x))
            .then(a.id.cmp(&b.id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::planarize::planarize;

    fn two_squares() -> Graph {
        let mut g = Graph::new();
        let pts: Vec<PointId> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]
            .iter()
            .map(|&(x, y)| g.add_point(Vec2::new(x, y), None))
            .collect();
        for (i, j) in [(0, 1), (1, 2), (2, 5), (5, 4), (4, 3), (3, 0), (1, 4)] {
            g.add_edge(&pts[i], &pts[j]);
        }
        g
    }

    #[test]
    fn face_trace_two_squares() {
        let g = two_squares();
        let r = face_trace(&g);
        assert_eq!(r.len(), 2);
        for boundary in r.values() {
            let poly: Vec<Vec2> = boundary.iter().map(|p| g.point(p)).collect();
            assert!((polygon_signed_area(&poly) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn strategies_agree_on_two_squares() {
        let g = two_squares();
        assert_eq!(cross_check(&g).expect("agree"), brute_force(&g));
    }

    #[test]
    fn boundary_is_normalized() {
        let g = two_squares();
        for (id, boundary) in face_trace(&g) {
            assert_eq!(&boundary[0], &id.points()[0]);
            assert_eq!(RegionId::from_points(&boundary), id);
        }
    }

    #[test]
    fn square_with_diagonals_has_four_triangles() {
        let mut g = Graph::new();
        let a = g.add_point(Vec2::new(0.0, 0.0), None);
        let b = g.add_point(Vec2::new(2.0, 0.0), None);
        let c = g.add_point(Vec2::new(2.0, 2.0), None);
        let d = g.add_point(Vec2::new(0.0, 2.0), None);
        for (p, q) in [(&a, &b), (&b, &c), (&c, &d), (&d, &a), (&a, &c), (&b, &d)] {
            g.add_edge(p, q);
        }
        let g = planarize(&g);
        let r = cross_check(&g).expect("agree");
        assert_eq!(r.len(), 4);
        for info in describe_regions(&g, &r) {
            assert_eq!(info.points.len(), 3);
            assert!((info.area - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn dangling_edges_do_not_create_faces() {
        let mut g = two_squares();
        let tip = g.add_point(Vec2::new(3.0, 3.0), None);
        let corner = g.find_point_near(Vec2::new(2.0, 1.0), 1e-9).unwrap();
        g.add_edge(&corner, &tip);
        assert_eq!(face_trace(&g).len(), 2);
        assert_eq!(brute_force(&g).len(), 2);
    }

    #[test]
    fn wall_stub_inside_a_face_is_ignored() {
        let mut g = two_squares();
        let corner = g.find_point_near(Vec2::new(0.0, 0.0), 1e-9).unwrap();
        let a = g.add_point(Vec2::new(0.3, 0.3), None);
        let b = g.add_point(Vec2::new(0.5, 0.6), None);
        g.add_edge(&corner, &a);
        g.add_edge(&a, &b);
        let r = cross_check(&g).expect("agree");
        assert_eq!(r, face_trace(&two_squares()));
    }

    #[test]
    fn detached_component_inside_a_face() {
        let mut g = Graph::new();
        let outer: Vec<PointId> = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
            .iter()
            .map(|&(x, y)| g.add_point(Vec2::new(x, y), None))
            .collect();
        let inner: Vec<PointId> = [(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]
            .iter()
            .map(|&(x, y)| g.add_point(Vec2::new(x, y), None))
            .collect();
        for ring in [&outer, &inner] {
            for i in 0..4 {
                g.add_edge(&ring[i], &ring[(i + 1) % 4]);
            }
        }
        let r = cross_check(&g).expect("agree");
        assert_eq!(r.len(), 1);
        assert!(r.contains_key(&RegionId::from_points(&inner)));
    }

    #[test]
    fn sorted_regions_follow_reading_order() {
        let g = two_squares();
        let r = face_trace(&g);
        let sorted = sorted_regions(&g, &r);
        assert!(sorted[0].centroid.x < sorted[1].centroid.x);
    }

    #[test]
    fn cached_regions_survive_moves() {
        let mut g = two_squares();
        let first = g.regions(RegionStrategy::FaceTrace);
        let p = g.find_point_near(Vec2::new(2.0, 1.0), 1e-9).unwrap();
        g.set_point(&p, Vec2::new(2.2, 1.1));
        assert_eq!(g.regions(RegionStrategy::FaceTrace), first);
    }
}
