pub mod error;
pub mod model;
pub mod geometry {
    pub mod intersect;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod cycles;
    pub mod picking;
    pub mod planarize;
    pub mod regions;
}
pub mod genetic;
pub mod layout;
pub mod rooms;
pub mod scoring;
mod codec;
mod json;

pub use algorithms::regions::{RegionId, RegionStrategy, Regions};
pub use error::{Error, Result};
pub use model::{EdgeId, PointId, Vec2};

use geometry::tolerance::EPS_POINT;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug)]
pub(crate) struct RegionCache {
    pub hash: u64,
    pub strategy: RegionStrategy,
    pub regions: Regions,
}

/// Mutable point/edge store.
///
/// Iteration order over points and edges is the id order, which makes every
/// derived computation (planarization, region extraction, cuts) deterministic.
/// Every mutating call bumps [`Graph::generation`], so consumers can detect
/// staleness by comparing a single integer.
#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) points: BTreeMap<PointId, Vec2>,
    pub(crate) edges: BTreeSet<EdgeId>,
    pub(crate) geom_ver: u64,
    pub(crate) next_id: u64,
    pub(crate) region_cache: RefCell<Option<RegionCache>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            points: BTreeMap::new(),
            edges: BTreeSet::new(),
            geom_ver: 1,
            next_id: 0,
            region_cache: RefCell::new(None),
        }
    }

    pub fn generation(&self) -> u64 {
        self.geom_ver
    }

    fn bump(&mut self) {
        self.geom_ver += 1;
    }

    // Points

    /// Inserts a point, or returns the id of an existing point within
    /// [`EPS_POINT`]. A requested id that is already taken by another point
    /// falls back to a fresh counter id.
    pub fn add_point(&mut self, pos: Vec2, id: Option<PointId>) -> PointId {
        assert!(pos.is_finite(), "non-finite point coordinate {:?}", pos);
        self.bump();
        if let Some(existing) = self.find_point_near(pos, EPS_POINT) {
            return existing;
        }
        self.insert_point(pos, id)
    }

    // No proximity dedup: the decoder must keep points that `set_point`
    // moved onto each other.
    pub(crate) fn insert_point(&mut self, pos: Vec2, id: Option<PointId>) -> PointId {
        let id = match id {
            Some(id) if !id.as_str().is_empty() && !self.points.contains_key(&id) => id,
            _ => self.fresh_id(),
        };
        if let Some(n) = id.as_counter() {
            self.next_id = self.next_id.max(n + 1);
        }
        self.points.insert(id.clone(), pos);
        id
    }

    fn fresh_id(&mut self) -> PointId {
        loop {
            let id = PointId::from(self.next_id);
            self.next_id += 1;
            if !self.points.contains_key(&id) {
                return id;
            }
        }
    }

    /// Nearest point within `tol` of `pos`.
    pub fn find_point_near(&self, pos: Vec2, tol: f64) -> Option<PointId> {
        let mut best: Option<(&PointId, f64)> = None;
        for (id, p) in &self.points {
            let d = p.dist(pos);
            if d <= tol && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id.clone())
    }

    /// Position of a point. Unknown ids are a caller bug and panic.
    pub fn point(&self, id: &PointId) -> Vec2 {
        match self.points.get(id) {
            Some(p) => *p,
            None => panic!("unknown point id {}", id),
        }
    }

    pub fn try_point(&self, id: &PointId) -> Option<Vec2> {
        self.points.get(id).copied()
    }

    pub fn contains_point(&self, id: &PointId) -> bool {
        self.points.contains_key(id)
    }

    pub fn set_point(&mut self, id: &PointId, pos: Vec2) {
        assert!(pos.is_finite(), "non-finite point coordinate {:?}", pos);
        match self.points.get_mut(id) {
            Some(p) => *p = pos,
            None => panic!("unknown point id {}", id),
        }
        self.bump();
    }

    /// Removes a point and every edge touching it.
    pub fn remove_point(&mut self, id: &PointId) -> bool {
        self.bump();
        if self.points.remove(id).is_none() {
            return false;
        }
        self.edges.retain(|e| !e.has(id));
        true
    }

    pub fn points(&self) -> &BTreeMap<PointId, Vec2> {
        &self.points
    }

    // Edges

    /// Adds the undirected edge `a`-`b`. Self-loops are ignored; re-adding an
    /// existing pair leaves the graph as it was.
    pub fn add_edge(&mut self, a: &PointId, b: &PointId) -> Option<EdgeId> {
        let id = EdgeId::new(a, b)?;
        assert!(self.points.contains_key(a), "unknown point id {}", a);
        assert!(self.points.contains_key(b), "unknown point id {}", b);
        self.edges.insert(id.clone());
        self.bump();
        Some(id)
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        self.bump();
        self.edges.remove(id)
    }

    pub fn has_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains(id)
    }

    pub fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    pub fn edge_segment(&self, id: &EdgeId) -> (Vec2, Vec2) {
        (self.point(id.a()), self.point(id.b()))
    }

    /// Neighbor ids per point; isolated points map to an empty set.
    pub fn point_neighbors(&self) -> BTreeMap<PointId, BTreeSet<PointId>> {
        let mut out: BTreeMap<PointId, BTreeSet<PointId>> =
            self.points.keys().map(|id| (id.clone(), BTreeSet::new())).collect();
        for e in &self.edges {
            out.entry(e.a().clone()).or_default().insert(e.b().clone());
            out.entry(e.b().clone()).or_default().insert(e.a().clone());
        }
        out
    }

    /// Incident edge ids per point.
    pub fn point_edges(&self) -> BTreeMap<PointId, BTreeSet<EdgeId>> {
        let mut out: BTreeMap<PointId, BTreeSet<EdgeId>> =
            self.points.keys().map(|id| (id.clone(), BTreeSet::new())).collect();
        for e in &self.edges {
            out.entry(e.a().clone()).or_default().insert(e.clone());
            out.entry(e.b().clone()).or_default().insert(e.clone());
        }
        out
    }

    // Derived graphs

    /// The closed cycle `cycle` as a graph of its own: only the cycle's points
    /// and the boundary edges between consecutive points. Ids are preserved.
    pub fn subset(&self, cycle: &[PointId]) -> Graph {
        let mut g = Graph::new();
        g.next_id = self.next_id;
        for id in cycle {
            g.points.insert(id.clone(), self.point(id));
        }
        for i in 0..cycle.len() {
            let j = (i + 1) % cycle.len();
            if let Some(e) = EdgeId::new(&cycle[i], &cycle[j]) {
                g.edges.insert(e);
            }
        }
        g
    }

    /// Order-independent FNV-1a hash over the edge ids. Coordinate moves leave
    /// it unchanged; any edge insertion or removal changes it.
    pub fn structural_hash(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let mut feed = |bytes: &[u8]| {
            for b in bytes {
                hash ^= *b as u64;
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
        };
        for e in &self.edges {
            feed(e.a().as_str().as_bytes());
            feed(&[0x1f]);
            feed(e.b().as_str().as_bytes());
            feed(&[0x1e]);
        }
        hash
    }

    /// Regions of this graph, cached by structural hash and strategy.
    pub fn regions(&self, strategy: RegionStrategy) -> Regions {
        let hash = self.structural_hash();
        if let Some(c) = self.region_cache.borrow().as_ref() {
            if c.hash == hash && c.strategy == strategy {
                return c.regions.clone();
            }
        }
        let regions = algorithms::regions::find_regions(self, strategy);
        self.region_cache.replace(Some(RegionCache {
            hash,
            strategy,
            regions: regions.clone(),
        }));
        regions
    }

    // Serialization

    pub fn encode(&self) -> String {
        codec::encode_impl(self)
    }

    pub fn decode(text: &str) -> Graph {
        codec::decode_impl(text)
    }

    pub fn to_json(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }

    /// Regions of this graph with their polygons and areas, for renderers.
    pub fn regions_to_json(&self, regions: &Regions) -> serde_json::Value {
        json::regions_to_json(self, regions)
    }
}
