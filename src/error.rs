use thiserror::Error;

use crate::model::PointId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("face needs at least 3 boundary points, got {0}")]
    DegenerateFace(usize),

    #[error("no room weights given")]
    NoWeights,

    #[error("unknown point id {0}")]
    UnknownPoint(PointId),

    #[error("parameter '{name}' out of range: expected {min}..={max}, got {got}")]
    OutOfRange { name: &'static str, min: f64, max: f64, got: f64 },

    #[error("parameter '{0}' must be finite")]
    NonFinite(&'static str),

    #[error("population is empty")]
    EmptyPopulation,
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_range(name: &'static str, got: f64, min: f64, max: f64) -> Result<f64> {
    if !got.is_finite() {
        return Err(Error::NonFinite(name));
    }
    if got < min || got > max {
        return Err(Error::OutOfRange { name, min, max, got });
    }
    Ok(got)
}
