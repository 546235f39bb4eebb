//! Partition quality: how well room areas match the target weights, and how
//! usable the room shapes are.

use serde::{Deserialize, Serialize};

use crate::algorithms::regions::RegionInfo;
use crate::geometry::math::angle_difference;
use crate::model::Vec2;

/// Hand-tuned scoring constants. The defaults are the values the layouts
/// were tuned with; they are not derived from anything.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Exponent applied to each per-room area match (below 1 softens near misses).
    pub area_exponent: f64,
    /// area / perimeter² of the ideal room shape (a square).
    pub ideal_roundness: f64,
    /// Corners at or above this many degrees are not penalized.
    pub acute_threshold_deg: f64,
    pub room_count_exponent: i32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        ScoreConfig {
            area_exponent: 0.75,
            ideal_roundness: 1.0 / 16.0,
            acute_threshold_deg: 80.0,
            room_count_exponent: 4,
        }
    }
}

/// Shape of one realized room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomMetrics {
    pub polygon: Vec<Vec2>,
    pub area: f64,
    pub perimeter: f64,
}

impl From<&RegionInfo> for RoomMetrics {
    fn from(r: &RegionInfo) -> Self {
        RoomMetrics {
            polygon: r.polygon.clone(),
            area: r.area,
            perimeter: r.perimeter,
        }
    }
}

/// Sub-scores, each roughly in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreParts {
    pub area: f64,
    pub roundness: f64,
    pub angles: f64,
    pub rooms: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// `ceil(area × (roundness + angles) × rooms × 100)`; 200 is a perfect layout.
    pub overall: f64,
    pub parts: ScoreParts,
}

fn relative_match(a: f64, b: f64) -> f64 {
    let m = a.max(b);
    if m <= 0.0 {
        return 1.0;
    }
    1.0 - (a - b).abs() / m
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn normalize_by_mean(xs: &[f64]) -> Vec<f64> {
    let m = mean(xs);
    xs.iter().map(|x| if m > 0.0 { x / m } else { 0.0 }).collect()
}

fn area_score(rooms: &[RoomMetrics], weights: &[f64], cfg: &ScoreConfig) -> f64 {
    let mut areas: Vec<f64> = rooms.iter().map(|r| r.area).collect();
    let mut weights = weights.to_vec();
    areas.sort_by(f64::total_cmp);
    weights.sort_by(f64::total_cmp);
    let areas = normalize_by_mean(&areas);
    let weights = normalize_by_mean(&weights);
    let per_pair: Vec<f64> = areas
        .iter()
        .zip(&weights)
        .map(|(a, w)| relative_match(*a, *w).max(0.0).powf(cfg.area_exponent))
        .collect();
    mean(&per_pair)
}

fn roundness_score(rooms: &[RoomMetrics], cfg: &ScoreConfig) -> f64 {
    rooms
        .iter()
        .map(|r| {
            let roundness = if r.perimeter > 0.0 { r.area / (r.perimeter * r.perimeter) } else { 0.0 };
            relative_match(roundness, cfg.ideal_roundness)
        })
        .product()
}

fn corner_score(polygon: &[Vec2], cfg: &ScoreConfig) -> f64 {
    let n = polygon.len();
    let mut score = 1.0;
    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];
        let p3 = polygon[(i + 2) % n];
        let diff = angle_difference((p1 - p2).bearing_deg(), (p3 - p2).bearing_deg());
        score *= diff.min(cfg.acute_threshold_deg) / cfg.acute_threshold_deg;
    }
    score
}

fn angles_score(rooms: &[RoomMetrics], cfg: &ScoreConfig) -> f64 {
    let per_room: Vec<f64> = rooms.iter().map(|r| corner_score(&r.polygon, cfg)).collect();
    mean(&per_room)
}

fn room_count_score(expected: usize, actual: usize, cfg: &ScoreConfig) -> f64 {
    relative_match(expected as f64, actual as f64).powi(cfg.room_count_exponent)
}

/// Scores realized rooms against target weights.
pub fn score_rooms(rooms: &[RoomMetrics], weights: &[f64], cfg: &ScoreConfig) -> Score {
    if rooms.is_empty() {
        return Score::default();
    }
    let parts = ScoreParts {
        area: area_score(rooms, weights, cfg),
        roundness: roundness_score(rooms, cfg),
        angles: angles_score(rooms, cfg),
        rooms: room_count_score(weights.len(), rooms.len(), cfg),
    };
    let overall = (parts.area * (parts.roundness + parts.angles) * parts.rooms * 100.0).ceil();
    Score { overall, parts }
}
