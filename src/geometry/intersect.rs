// Segment/segment contact classification for wall graphs.

use crate::geometry::tolerance::near_zero;
use crate::model::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntersection {
    None,
    /// Walls cross away from all four endpoints.
    Proper { t: f64, u: f64, at: Vec2 },
    /// Contact at an endpoint of either wall; parameters clamped to [0,1].
    Touch { t: f64, u: f64, at: Vec2 },
    /// Shared span of two collinear walls, as parameter ranges on each.
    CollinearOverlap { t0: f64, t1: f64, u0: f64, u1: f64 },
}

fn side(a: Vec2, b: Vec2, p: Vec2) -> f64 {
    (b - a).cross(p - a)
}

// p and q lie on opposite sides of a line, or one of them on it
fn straddles(sp: f64, sq: f64, eps: f64) -> bool {
    near_zero(sp, eps) || near_zero(sq, eps) || sp.signum() != sq.signum()
}

fn overlap_on_axis(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> SegIntersection {
    let along_x = (b.x - a.x).abs() >= (b.y - a.y).abs();
    let coord = |p: Vec2| if along_x { p.x } else { p.y };
    let (start, span_ab) = (coord(a), coord(b) - coord(a));
    let (c0, span_cd) = (coord(c), coord(d) - coord(c));

    if near_zero(span_ab, eps) {
        let u = if near_zero(span_cd, eps) { 0.0 } else { (start - c0) / span_cd };
        return SegIntersection::Touch { t: 0.0, u, at: a };
    }
    let tc = (coord(c) - start) / span_ab;
    let td = (coord(d) - start) / span_ab;
    let (t0, t1) = (tc.min(td).max(0.0), tc.max(td).min(1.0));
    if t1 < t0 - eps {
        return SegIntersection::None;
    }
    let on_cd = |t: f64| {
        if near_zero(span_cd, eps) {
            0.0
        } else {
            (start + t * span_ab - c0) / span_cd
        }
    };
    let (ua, ub) = (on_cd(t0), on_cd(t1));
    SegIntersection::CollinearOverlap { t0, t1, u0: ua.min(ub), u1: ua.max(ub) }
}

/// Classifies how segment `a-b` meets segment `c-d`.
///
/// `eps` is the orientation/parameter slack, `eps_denom` guards the
/// parallel-lines solve.
pub fn intersect_segments(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64, eps_denom: f64) -> SegIntersection {
    let (sc, sd) = (side(a, b, c), side(a, b, d));
    let (sa, sb) = (side(c, d, a), side(c, d, b));

    if [sa, sb, sc, sd].iter().all(|s| near_zero(*s, eps)) {
        return overlap_on_axis(a, b, c, d, eps);
    }
    if !straddles(sc, sd, eps) || !straddles(sa, sb, eps) {
        return SegIntersection::None;
    }

    let r = b - a;
    let s = d - c;
    let denom = r.cross(s);
    if near_zero(denom, eps_denom) {
        return SegIntersection::None;
    }
    let t = (c - a).cross(s) / denom;
    let u = (c - a).cross(r) / denom;
    let inside = |x: f64| x >= -eps && x <= 1.0 + eps;
    if !inside(t) || !inside(u) {
        return SegIntersection::None;
    }
    let at = a + r * t;
    let at_end = |x: f64| near_zero(x, eps) || near_zero(1.0 - x, eps);
    if at_end(t) || at_end(u) {
        SegIntersection::Touch { t: t.clamp(0.0, 1.0), u: u.clamp(0.0, 1.0), at }
    } else {
        SegIntersection::Proper { t, u, at }
    }
}
