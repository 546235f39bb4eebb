use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn dot(self, o: Vec2) -> f64 {
        self.x * o.x + self.y * o.y
    }

    pub fn cross(self, o: Vec2) -> f64 {
        self.x * o.y - self.y * o.x
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dist(self, o: Vec2) -> f64 {
        (self - o).length()
    }

    pub fn lerp(self, o: Vec2, t: f64) -> Vec2 {
        self + (o - self) * t
    }

    /// Bearing of this vector in degrees, in `[0, 360)`, counter-clockwise from +x.
    pub fn bearing_deg(self) -> f64 {
        self.y.atan2(self.x).to_degrees().rem_euclid(360.0)
    }

    /// Quarter turn counter-clockwise (y-up).
    pub fn perp_ccw(self) -> Vec2 {
        Vec2 { x: -self.y, y: self.x }
    }

    /// Quarter turn clockwise (y-up).
    pub fn perp_cw(self) -> Vec2 {
        Vec2 { x: self.y, y: -self.x }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x + o.x, y: self.y + o.y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x - o.x, y: self.y - o.y }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f64) -> Vec2 {
        Vec2 { x: self.x * s, y: self.y * s }
    }
}

/// Stable point identifier. Auto-assigned ids are decimal counters; callers
/// and the cut generator may supply tagged ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    /// Commas and whitespace would break the text codec, so they become `_`.
    pub fn new(raw: &str) -> Self {
        let id: String = raw
            .trim()
            .chars()
            .map(|c| if c == ',' || c.is_whitespace() { '_' } else { c })
            .collect();
        PointId(id)
    }

    /// Id for a point materialized by cut `cut` on edge `edge`.
    pub fn tagged(cut: usize, edge: &EdgeId) -> Self {
        PointId::new(&format!("c{}@{}", cut, edge))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_counter(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for PointId {
    fn from(n: u64) -> Self {
        PointId(n.to_string())
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId::new(s)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Undirected edge. The id is the sorted endpoint pair, so the same two
/// points always name the same edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId {
    a: PointId,
    b: PointId,
}

impl EdgeId {
    /// `None` for a self-loop.
    pub fn new(p: &PointId, q: &PointId) -> Option<Self> {
        match p.cmp(q) {
            std::cmp::Ordering::Less => Some(EdgeId { a: p.clone(), b: q.clone() }),
            std::cmp::Ordering::Greater => Some(EdgeId { a: q.clone(), b: p.clone() }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn a(&self) -> &PointId {
        &self.a
    }

    pub fn b(&self) -> &PointId {
        &self.b
    }

    pub fn has(&self, p: &PointId) -> bool {
        self.a == *p || self.b == *p
    }

    pub fn shares_endpoint(&self, o: &EdgeId) -> bool {
        self.has(&o.a) || self.has(&o.b)
    }

    pub fn other(&self, p: &PointId) -> Option<&PointId> {
        if self.a == *p {
            Some(&self.b)
        } else if self.b == *p {
            Some(&self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}
