// Centralized tolerances and helpers for robust geometry

pub const EPS_POINT: f64 = 1e-6;          // point coincidence threshold (dedup, on-segment)
pub const EPS_LEN: f64 = 1e-9;            // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // denominator guard for ray/segment solves
pub const EPS_FACE_AREA: f64 = 1e-9;      // faces smaller than this are dropped

// Planarizer restart ceiling; never reached on well-formed input
pub const MAX_PLANARIZE_ITERATIONS: usize = 1000;

// Longest cycle the brute-force region strategy enumerates
pub const MAX_CYCLE_LEN: usize = 14;

#[inline] pub fn clamp01(x: f64) -> f64 { x.max(0.0).min(1.0) }
#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }

#[inline]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPS_DENOM { fallback } else { num/den }
}
