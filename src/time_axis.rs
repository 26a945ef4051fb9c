//! # Time-axis construction
//!
//! Resolves the recording time axis of every shot from partially specified timing
//! parameters. Callers provide any two of the sample interval `dt`, the recording
//! duration `t` and the sample count `nt` (scalars are broadcast to every shot, vectors
//! are taken per shot); the third one is derived and the triplet is checked for
//! consistency.
//!
//! ## Rules
//! -----------------
//! * `nt = round(t / dt) + 1` for every shot.
//! * `(dt, t)` only: `t / dt` must be an integer within [`TIME_AXIS_TOLERANCE`],
//!   otherwise `nt` is not derivable and the build fails.
//! * `(dt, nt)`: `t = (nt - 1) * dt`.
//! * `(t, nt)`: `dt = t / (nt - 1)`, requires `nt ≥ 2`.
//! * `(dt, t, nt)`: all three must agree.
//! * `t0` defaults to `0` when absent and must be finite. `nt` is never defaulted.
//!
//! All resolved values are stored in 32-bit precision, whatever the input type.
//!
//! ## Example
//! -----------------
//! ```rust
//! use shotgeom::time_axis::{build_time_axis, TimeAxisParams};
//!
//! let params = TimeAxisParams::builder().dt(2.0).t(1000.0).build().unwrap();
//! let axis = build_time_axis(&params, 3).unwrap();
//! assert_eq!(axis.nt(), &[501, 501, 501]);
//! assert_eq!(axis.t0(), &[0.0, 0.0, 0.0]);
//! ```
use crate::constants::{Millis, TIME_AXIS_TOLERANCE};
use crate::geometry_errors::GeometryError;

/// A parameter given either once for all shots or once per shot.
#[derive(Debug, Clone, PartialEq)]
pub enum ShotParam<T> {
    Scalar(T),
    PerShot(Vec<T>),
}

impl<T: Clone> ShotParam<T> {
    /// Number of shots implied by the parameter, `None` for scalars.
    pub fn shot_count(&self) -> Option<usize> {
        match self {
            ShotParam::Scalar(_) => None,
            ShotParam::PerShot(v) => Some(v.len()),
        }
    }

    /// Expand the parameter to exactly `nsrc` values.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::ShotCountMismatch`] if a per-shot vector does not hold `nsrc` values.
    pub fn broadcast(&self, nsrc: usize, what: &'static str) -> Result<Vec<T>, GeometryError> {
        match self {
            ShotParam::Scalar(v) => Ok(vec![v.clone(); nsrc]),
            ShotParam::PerShot(v) if v.len() == nsrc => Ok(v.clone()),
            ShotParam::PerShot(v) => Err(GeometryError::ShotCountMismatch {
                what,
                expected: nsrc,
                found: v.len(),
            }),
        }
    }
}

impl From<f64> for ShotParam<f64> {
    fn from(v: f64) -> Self {
        ShotParam::Scalar(v)
    }
}

impl From<f32> for ShotParam<f64> {
    fn from(v: f32) -> Self {
        ShotParam::Scalar(v.into())
    }
}

impl From<i32> for ShotParam<f64> {
    fn from(v: i32) -> Self {
        ShotParam::Scalar(v.into())
    }
}

impl From<Vec<f64>> for ShotParam<f64> {
    fn from(v: Vec<f64>) -> Self {
        ShotParam::PerShot(v)
    }
}

impl From<Vec<f32>> for ShotParam<f64> {
    fn from(v: Vec<f32>) -> Self {
        ShotParam::PerShot(v.into_iter().map(f64::from).collect())
    }
}

impl From<Vec<i32>> for ShotParam<f64> {
    fn from(v: Vec<i32>) -> Self {
        ShotParam::PerShot(v.into_iter().map(f64::from).collect())
    }
}

impl From<&[f64]> for ShotParam<f64> {
    fn from(v: &[f64]) -> Self {
        ShotParam::PerShot(v.to_vec())
    }
}

impl From<usize> for ShotParam<usize> {
    fn from(v: usize) -> Self {
        ShotParam::Scalar(v)
    }
}

impl From<Vec<usize>> for ShotParam<usize> {
    fn from(v: Vec<usize>) -> Self {
        ShotParam::PerShot(v)
    }
}

impl From<&[usize]> for ShotParam<usize> {
    fn from(v: &[usize]) -> Self {
        ShotParam::PerShot(v.to_vec())
    }
}

/// Timing of a single shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotTiming {
    pub nt: usize,
    pub dt: Millis,
    pub t: Millis,
    pub t0: Millis,
}

impl ShotTiming {
    /// Regular grid `t0, t0 + dt, ..., t0 + (nt - 1) dt`.
    pub fn time_grid(&self) -> Vec<Millis> {
        (0..self.nt).map(|k| self.t0 + k as Millis * self.dt).collect()
    }
}

/// Resolved time axis of every shot of a geometry.
///
/// Invariants
/// -----------------
/// * `nt`, `dt`, `t` and `t0` all have one entry per shot.
/// * `nt[i] == round(t[i] / dt[i]) + 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeAxis {
    nt: Vec<usize>,
    dt: Vec<Millis>,
    t: Vec<Millis>,
    t0: Vec<Millis>,
}

impl TimeAxis {
    pub fn nsrc(&self) -> usize {
        self.nt.len()
    }

    pub fn nt(&self) -> &[usize] {
        &self.nt
    }

    pub fn dt(&self) -> &[Millis] {
        &self.dt
    }

    pub fn t(&self) -> &[Millis] {
        &self.t
    }

    pub fn t0(&self) -> &[Millis] {
        &self.t0
    }

    /// Timing of shot `i`, `None` if out of range.
    pub fn shot(&self, i: usize) -> Option<ShotTiming> {
        (i < self.nsrc()).then(|| ShotTiming {
            nt: self.nt[i],
            dt: self.dt[i],
            t: self.t[i],
            t0: self.t0[i],
        })
    }

    pub(crate) fn from_shots(shots: impl IntoIterator<Item = ShotTiming>) -> Self {
        let mut axis = TimeAxis::default();
        for s in shots {
            axis.nt.push(s.nt);
            axis.dt.push(s.dt);
            axis.t.push(s.t);
            axis.t0.push(s.t0);
        }
        axis
    }

    /// Keep only the shots listed in `indices`, in that order. Indices must be in range.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        TimeAxis::from_shots(indices.iter().filter_map(|&i| self.shot(i)))
    }
}

/// Timing parameters accepted by [`build_time_axis`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAxisParams {
    pub dt: Option<ShotParam<f64>>,
    pub t: Option<ShotParam<f64>>,
    pub nt: Option<ShotParam<usize>>,
    pub t0: Option<ShotParam<f64>>,
}

impl TimeAxisParams {
    pub fn builder() -> TimeAxisParamsBuilder {
        TimeAxisParamsBuilder::default()
    }

    /// Number of shots implied by the per-shot parameters, if any.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::Configuration`] if two per-shot parameters disagree.
    pub fn shot_count(&self) -> Result<Option<usize>, GeometryError> {
        let counts = [
            self.dt.as_ref().and_then(ShotParam::shot_count),
            self.t.as_ref().and_then(ShotParam::shot_count),
            self.nt.as_ref().and_then(ShotParam::shot_count),
            self.t0.as_ref().and_then(ShotParam::shot_count),
        ];
        let mut found: Option<usize> = None;
        for n in counts.into_iter().flatten() {
            match found {
                Some(m) if m != n => {
                    return Err(GeometryError::config(format!(
                        "per-shot timing parameters disagree on the shot count ({m} vs {n})"
                    )))
                }
                _ => found = Some(n),
            }
        }
        Ok(found)
    }
}

/// Builder for [`TimeAxisParams`].
#[derive(Debug, Clone, Default)]
pub struct TimeAxisParamsBuilder {
    params: TimeAxisParams,
}

impl TimeAxisParamsBuilder {
    pub fn dt(mut self, v: impl Into<ShotParam<f64>>) -> Self {
        self.params.dt = Some(v.into());
        self
    }
    pub fn t(mut self, v: impl Into<ShotParam<f64>>) -> Self {
        self.params.t = Some(v.into());
        self
    }
    pub fn nt(mut self, v: impl Into<ShotParam<usize>>) -> Self {
        self.params.nt = Some(v.into());
        self
    }
    pub fn t0(mut self, v: impl Into<ShotParam<f64>>) -> Self {
        self.params.t0 = Some(v.into());
        self
    }

    /// Finalize the parameters.
    ///
    /// Only checks that the set is not under-specified; numeric consistency is checked
    /// per shot by [`build_time_axis`].
    pub fn build(self) -> Result<TimeAxisParams, GeometryError> {
        let p = &self.params;
        let given = [p.dt.is_some(), p.t.is_some(), p.nt.is_some()]
            .iter()
            .filter(|&&b| b)
            .count();
        if given < 2 {
            return Err(GeometryError::config(
                "at least two of dt, t and nt are required to build a time axis",
            ));
        }
        p.shot_count()?;
        Ok(self.params)
    }
}

/// Resolve the time axis of `nsrc` shots.
///
/// Arguments
/// -----------------
/// * `params`: timing parameters, scalars are broadcast to every shot.
/// * `nsrc`: number of shots.
///
/// Return
/// ----------
/// * the canonical `(nt, dt, t, t0)` per shot, in 32-bit precision.
///
/// Errors
/// ----------
/// * [`GeometryError::Configuration`] when fewer than two of `dt`, `t`, `nt` are given or
///   when they are inconsistent for some shot.
/// * [`GeometryError::ShotCountMismatch`] when a per-shot vector does not hold `nsrc` values.
pub fn build_time_axis(params: &TimeAxisParams, nsrc: usize) -> Result<TimeAxis, GeometryError> {
    let dt = params
        .dt
        .as_ref()
        .map(|p| p.broadcast(nsrc, "dt"))
        .transpose()?;
    let t = params
        .t
        .as_ref()
        .map(|p| p.broadcast(nsrc, "t"))
        .transpose()?;
    let nt = params
        .nt
        .as_ref()
        .map(|p| p.broadcast(nsrc, "nt"))
        .transpose()?;
    let t0 = match &params.t0 {
        Some(p) => p.broadcast(nsrc, "t0")?,
        None => vec![0.0; nsrc],
    };
    if let Some((i, t0)) = t0.iter().enumerate().find(|(_, t0)| !t0.is_finite()) {
        return Err(GeometryError::config(format!(
            "shot {i}: t0 must be finite, got {t0}"
        )));
    }

    let shots = (0..nsrc)
        .map(|i| {
            let (nt, dt, t) = resolve_shot(
                dt.as_ref().map(|v| v[i]),
                t.as_ref().map(|v| v[i]),
                nt.as_ref().map(|v| v[i]),
            )
            .map_err(|e| match e {
                GeometryError::Configuration(msg) => {
                    GeometryError::Configuration(format!("shot {i}: {msg}"))
                }
                other => other,
            })?;
            Ok(ShotTiming {
                nt,
                dt: dt as Millis,
                t: t as Millis,
                t0: t0[i] as Millis,
            })
        })
        .collect::<Result<Vec<_>, GeometryError>>()?;

    Ok(TimeAxis::from_shots(shots))
}

/// Derive `(nt, dt, t)` for one shot from at least two of them.
pub(crate) fn resolve_shot(
    dt: Option<f64>,
    t: Option<f64>,
    nt: Option<usize>,
) -> Result<(usize, f64, f64), GeometryError> {
    if let Some(dt) = dt {
        if !(dt.is_finite() && dt > 0.) {
            return Err(GeometryError::config(format!("dt must be > 0, got {dt}")));
        }
    }
    if let Some(t) = t {
        if !(t.is_finite() && t >= 0.) {
            return Err(GeometryError::config(format!("t must be >= 0, got {t}")));
        }
    }
    if nt == Some(0) {
        return Err(GeometryError::config("nt must be >= 1"));
    }

    match (dt, t, nt) {
        (Some(dt), Some(t), Some(nt)) => {
            let expected = (nt - 1) as f64 * dt;
            if (expected - t).abs() > TIME_AXIS_TOLERANCE * dt {
                return Err(GeometryError::config(format!(
                    "inconsistent timing: (nt - 1) * dt = {expected} but t = {t}"
                )));
            }
            Ok((nt, dt, t))
        }
        (Some(dt), Some(t), None) => {
            let ratio = t / dt;
            let steps = ratio.round();
            if (ratio - steps).abs() > TIME_AXIS_TOLERANCE {
                return Err(GeometryError::config(format!(
                    "cannot derive nt: t = {t} is not a multiple of dt = {dt}"
                )));
            }
            Ok((steps as usize + 1, dt, t))
        }
        (Some(dt), None, Some(nt)) => Ok((nt, dt, (nt - 1) as f64 * dt)),
        (None, Some(t), Some(nt)) => {
            if nt < 2 {
                return Err(GeometryError::config(
                    "cannot derive dt from t with a single sample",
                ));
            }
            let dt = t / (nt - 1) as f64;
            if !(dt.is_finite() && dt > 0.) {
                return Err(GeometryError::config(format!(
                    "derived dt = {dt} from t = {t} and nt = {nt}, must be > 0"
                )));
            }
            Ok((nt, dt, t))
        }
        _ => Err(GeometryError::config(
            "at least two of dt, t and nt are required to build a time axis",
        )),
    }
}
