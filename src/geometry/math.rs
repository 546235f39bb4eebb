use super::tolerance::{clamp01, safe_div, EPS_DENOM, EPS_FACE_AREA};
use crate::model::Vec2;

/// Squared distance from `p` to segment `a`-`b`, and the clamped projection parameter.
pub fn seg_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = v.dot(v);
    let t = if vv > 0.0 { clamp01(w.dot(v) / vv) } else { 0.0 };
    let proj = a.lerp(b, t);
    let d = p - proj;
    (d.dot(d), t)
}

pub fn dist_point_to_seg(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    seg_distance_sq(p, a, b).0.sqrt()
}

/// Shoelace area; positive for counter-clockwise (y-up) boundaries.
pub fn polygon_signed_area(poly: &[Vec2]) -> f64 {
    let mut a = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        a += poly[i].cross(poly[j]);
    }
    0.5 * a
}

pub fn polygon_area(poly: &[Vec2]) -> f64 {
    polygon_signed_area(poly).abs()
}

pub fn polygon_perimeter(poly: &[Vec2]) -> f64 {
    (0..poly.len())
        .map(|i| poly[i].dist(poly[(i + 1) % poly.len()]))
        .sum()
}

pub fn polygon_centroid(poly: &[Vec2]) -> Vec2 {
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut a = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        let cross = poly[i].cross(poly[j]);
        a += cross;
        cx += (poly[i].x + poly[j].x) * cross;
        cy += (poly[i].y + poly[j].y) * cross;
    }
    let a = a * 0.5;
    if a.abs() < EPS_FACE_AREA {
        let n = poly.len().max(1) as f64;
        let sum = poly.iter().fold(Vec2::default(), |acc, p| acc + *p);
        return sum * (1.0 / n);
    }
    Vec2::new(cx / (6.0 * a), cy / (6.0 * a))
}

/// Σ(x2−x1)(y2+y1) over the closed boundary. Positive means clockwise in
/// y-up coordinates (counter-clockwise on a y-down screen).
pub fn winding_sum(poly: &[Vec2]) -> f64 {
    let mut sum = 0.0;
    for i in 0..poly.len() {
        let p1 = poly[i];
        let p2 = poly[(i + 1) % poly.len()];
        sum += (p2.x - p1.x) * (p2.y + p1.y);
    }
    sum
}

/// Even-odd ray crossing test. Points on the boundary may land either way.
pub fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let mut inside = false;
    let n = poly.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = poly[i];
        let b = poly[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Ray `origin + r * dir` (r ≥ 0) against segment `a`-`b`. Returns the ray
/// parameter and the hit point. Parallel segments never hit.
pub fn ray_segment(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<(f64, Vec2)> {
    let e = b - a;
    let d = dir.cross(e);
    if d.abs() <= EPS_DENOM {
        return None;
    }
    let w = a - origin;
    let r = safe_div(w.cross(e), d, -1.0);
    let s = safe_div(w.cross(dir), d, -1.0);
    if r >= 0.0 && (0.0..=1.0).contains(&s) {
        Some((r, origin + dir * r))
    } else {
        None
    }
}

/// Unsigned difference between two bearings in degrees, in `[0, 180]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let d = (a.rem_euclid(360.0) - b.rem_euclid(360.0)).abs();
    d.min(360.0 - d)
}
