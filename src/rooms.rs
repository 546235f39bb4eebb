//! Room partitioning: turn a vector of boundary offsets into chord cuts across
//! one face, then score the rooms that result.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::algorithms::planarize::{find_split_target, split_edge};
use crate::algorithms::regions::{describe_regions, find_regions, RegionId, RegionStrategy, Regions};
use crate::error::{check_range, Error, Result};
use crate::genetic::Fitness;
use crate::geometry::math::{polygon_perimeter, ray_segment, winding_sum};
use crate::geometry::tolerance::{near_zero, EPS_LEN, EPS_POINT};
use crate::model::{EdgeId, PointId, Vec2};
use crate::scoring::{score_rooms, RoomMetrics, Score, ScoreConfig};
use crate::Graph;

/// Target room weights, one list per face in [`sorted_regions`] order.
///
/// [`sorted_regions`]: crate::algorithms::regions::sorted_regions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomsDefinition {
    rooms_per_region: Vec<Vec<f64>>,
}

impl Default for RoomsDefinition {
    fn default() -> Self {
        RoomsDefinition::new(vec![vec![1.0, 1.0, 1.0, 1.0]])
    }
}

impl RoomsDefinition {
    pub fn new(rooms_per_region: Vec<Vec<f64>>) -> Self {
        RoomsDefinition { rooms_per_region }
    }

    /// Several faces with differing room counts.
    pub fn many_rooms() -> Self {
        RoomsDefinition::new(vec![
            vec![1.0, 1.0, 1.0, 1.0],
            vec![2.0, 1.0],
            vec![1.0],
            vec![3.0, 1.0, 1.0],
        ])
    }

    /// Weights for face `i`. Faces without a line, or with an empty one, get a
    /// single room.
    pub fn room_weights(&self, i: usize) -> &[f64] {
        match self.rooms_per_region.get(i) {
            Some(w) if !w.is_empty() => w,
            _ => &[1.0],
        }
    }

    pub fn num_rooms(&self, i: usize) -> usize {
        self.room_weights(i).len()
    }

    pub fn lines(&self) -> &[Vec<f64>] {
        &self.rooms_per_region
    }

    pub fn encode(&self) -> String {
        self.rooms_per_region
            .iter()
            .map(|w| w.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parses one line of whitespace-separated weights per face. Blank lines
    /// are skipped; tokens that are not finite positive numbers are dropped.
    pub fn decode(text: &str) -> Self {
        let rooms_per_region = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                l.split_whitespace()
                    .filter_map(|tok| tok.parse::<f64>().ok())
                    .filter(|x| x.is_finite() && *x > 0.0)
                    .collect()
            })
            .collect();
        RoomsDefinition { rooms_per_region }
    }
}

/// Orientation of a face boundary in y-up coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

pub fn winding_of_cycle(cycle: &[Vec2]) -> Winding {
    if winding_sum(cycle) > 0.0 {
        Winding::Clockwise
    } else {
        Winding::CounterClockwise
    }
}

/// Point at arc-length fraction `t` of the closed boundary, with the segment
/// it lies on. `t` wraps into `[0, 1)`.
pub fn point_along_cycle(cycle: &[Vec2], t: f64) -> Option<(Vec2, (Vec2, Vec2))> {
    let n = cycle.len();
    if n < 2 || !t.is_finite() {
        return None;
    }
    let target = t.rem_euclid(1.0) * polygon_perimeter(cycle);
    let mut start = 0.0;
    for i in 0..n {
        let (a, b) = (cycle[i], cycle[(i + 1) % n]);
        let len = a.dist(b);
        let end = start + len;
        if target <= end {
            let progress = if len > 0.0 { (target - start) / len } else { 0.0 };
            return Some((a.lerp(b, progress), (a, b)));
        }
        start = end;
    }
    // rounding pushed the target past the closing segment
    Some((cycle[0], (cycle[n - 1], cycle[0])))
}

/// Unit normal of `segment` pointing into a face of the given winding.
pub fn cut_direction(segment: (Vec2, Vec2), winding: Winding) -> Option<Vec2> {
    let d = segment.1 - segment.0;
    let len = d.length();
    if near_zero(len, EPS_LEN) {
        return None;
    }
    let d = d * (1.0 / len);
    Some(match winding {
        Winding::CounterClockwise => d.perp_ccw(),
        Winding::Clockwise => d.perp_cw(),
    })
}

/// Nearest edge hit by the ray from `origin` along `dir`, ignoring `skip` and
/// hits at the origin itself.
pub fn raycast(g: &Graph, origin: Vec2, dir: Vec2, skip: &EdgeId) -> Option<(Vec2, EdgeId)> {
    let mut best: Option<(f64, Vec2, &EdgeId)> = None;
    for e in g.edges() {
        if e == skip {
            continue;
        }
        let (a, b) = g.edge_segment(e);
        if let Some((r, at)) = ray_segment(origin, dir, a, b) {
            if r > EPS_POINT && best.map_or(true, |(br, _, _)| r < br) {
                best = Some((r, at, e));
            }
        }
    }
    best.map(|(_, at, e)| (at, e.clone()))
}

/// Per-call tally of [`apply_cuts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CutReport {
    pub applied: usize,
    pub skipped: usize,
}

/// One chord from the boundary point at offset `t` straight into the face.
/// Returns `false` (and leaves `g` untouched) when the cut has to be skipped:
/// a degenerate boundary segment, no edge under the start point, or a ray
/// that hits nothing. A start point that coincides with an existing vertex
/// is skipped as well, since the cut ends must be new points and a corner
/// has no single host edge to split.
pub fn make_cut(g: &mut Graph, index: usize, boundary: &[Vec2], winding: Winding, t: f64) -> bool {
    let Some((start, segment)) = point_along_cycle(boundary, t) else {
        warn!(cut = index, t, "cut offset does not resolve to a boundary point");
        return false;
    };
    let Some(dir) = cut_direction(segment, winding) else {
        warn!(cut = index, ?segment, "boundary segment too short to cut from");
        return false;
    };
    if g.find_point_near(start, EPS_POINT).is_some() {
        debug!(cut = index, ?start, "cut starts on an existing vertex");
        return false;
    }
    let Some((_, start_edge)) = find_split_target(g, start, EPS_POINT) else {
        warn!(cut = index, ?start, "no edge under cut start");
        return false;
    };
    let Some((end, end_edge)) = raycast(g, start, dir, &start_edge) else {
        debug!(cut = index, ?start, ?dir, ?winding, "cut ray hits nothing");
        return false;
    };

    let p = g.add_point(start, Some(PointId::tagged(index, &start_edge)));
    split_edge(g, &start_edge, &p);
    let q = g.add_point(end, Some(PointId::tagged(index, &end_edge)));
    split_edge(g, &end_edge, &q);
    g.add_edge(&p, &q);
    trace!(cut = index, from = %p, to = %q, "cut applied");
    true
}

/// Applies one cut per offset, in order, against the face `cycle` of `g`.
/// Positions and winding come from the face as it was before any cut.
pub fn apply_cuts(g: &mut Graph, cycle: &[PointId], offsets: &[f64]) -> CutReport {
    let boundary: Vec<Vec2> = cycle.iter().map(|id| g.point(id)).collect();
    let winding = winding_of_cycle(&boundary);
    let mut report = CutReport::default();
    for (i, &t) in offsets.iter().enumerate() {
        if make_cut(g, i, &boundary, winding, t) {
            report.applied += 1;
        } else {
            report.skipped += 1;
        }
    }
    report
}

/// One evaluated parameter vector.
#[derive(Clone, Debug)]
pub struct Partition {
    pub parameters: Vec<f64>,
    pub graph: Graph,
    pub regions: Regions,
    pub areas: BTreeMap<RegionId, f64>,
    pub score: Score,
    pub cuts: CutReport,
}

impl Partition {
    /// Target weight assigned to each room, see [`weight_for_region`].
    pub fn room_weights(&self, weights: &[f64]) -> BTreeMap<RegionId, f64> {
        weight_for_region(&self.areas, weights)
    }
}

/// Cuts one face of a graph into rooms. Each call to [`Partitioner::partition`]
/// works on a fresh copy of the isolated face, never on the source graph.
#[derive(Clone, Debug)]
pub struct Partitioner {
    face: Graph,
    cycle: Vec<PointId>,
    weights: Vec<f64>,
    config: ScoreConfig,
    strategy: RegionStrategy,
}

impl Partitioner {
    pub fn new(source: &Graph, cycle: &[PointId], weights: &[f64]) -> Result<Self> {
        if cycle.len() < 3 {
            return Err(Error::DegenerateFace(cycle.len()));
        }
        if weights.is_empty() {
            return Err(Error::NoWeights);
        }
        if let Some(id) = cycle.iter().find(|id| !source.contains_point(id)) {
            return Err(Error::UnknownPoint(id.clone()));
        }
        for &w in weights {
            check_range("weight", w, f64::MIN_POSITIVE, f64::MAX)?;
        }
        Ok(Partitioner {
            face: source.subset(cycle),
            cycle: cycle.to_vec(),
            weights: weights.to_vec(),
            config: ScoreConfig::default(),
            strategy: RegionStrategy::default(),
        })
    }

    pub fn with_config(mut self, config: ScoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: RegionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Cut parameters a full partition takes: one fewer than the room count.
    pub fn dimensions(&self) -> usize {
        self.weights.len() - 1
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn partition(&self, parameters: &[f64]) -> Partition {
        let mut graph = self.face.clone();
        let cuts = apply_cuts(&mut graph, &self.cycle, parameters);
        let regions = find_regions(&graph, self.strategy);
        let infos = describe_regions(&graph, &regions);
        let metrics: Vec<RoomMetrics> = infos.iter().map(RoomMetrics::from).collect();
        let score = score_rooms(&metrics, &self.weights, &self.config);
        let areas = infos.into_iter().map(|r| (r.id, r.area)).collect();
        trace!(?parameters, score = score.overall, rooms = regions.len(), "partition");
        Partition {
            parameters: parameters.to_vec(),
            graph,
            regions,
            areas,
            score,
            cuts,
        }
    }
}

impl Fitness<Partition> for Partitioner {
    fn evaluate(&mut self, parameters: &[f64]) -> (f64, Partition) {
        let p = self.partition(parameters);
        (p.score.overall, p)
    }
}

/// `population` vectors of `rooms - 1` offsets drawn uniformly from `[0, 1)`.
/// Hand the same `rng` to [`Evolution::with_rng`](crate::genetic::Evolution::with_rng)
/// so mutation continues the stream instead of replaying it.
pub fn random_cuts<R: Rng>(rng: &mut R, population: usize, rooms: usize) -> Vec<Vec<f64>> {
    (0..population)
        .map(|_| (1..rooms).map(|_| rng.gen::<f64>()).collect())
        .collect()
}

/// Pairs rooms with weights by rank: the largest room takes the largest
/// weight. Rooms beyond the weight count get no entry.
pub fn weight_for_region(areas: &BTreeMap<RegionId, f64>, weights: &[f64]) -> BTreeMap<RegionId, f64> {
    let mut rooms: Vec<(&RegionId, f64)> = areas.iter().map(|(id, a)| (id, *a)).collect();
    rooms.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut weights = weights.to_vec();
    weights.sort_by(|a, b| b.total_cmp(a));
    rooms
        .into_iter()
        .zip(weights)
        .map(|((id, _), w)| (id.clone(), w))
        .collect()
}
