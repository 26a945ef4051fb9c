//! # Coordinate normalization
//!
//! Source and receiver positions reach the crate in two shapes:
//!
//! * **flat** sequences, one value per shot (the usual point-source case) or, when the
//!   geometry holds a single shot, one value per element of that shot;
//! * **grouped** sequences, one inner sequence per shot.
//!
//! [`normalize_coords`] turns any combination of both into per-shot lists of 32-bit
//! positions and checks that the three axes agree on the shot count and on the number
//! of elements of every shot.
//!
//! ## 2D convention
//! -----------------
//! A shot's `y` list may hold a single value while `x` and `z` hold N; the `y` value is
//! then shared by every element (2D line acquisition).
use crate::constants::{Coord, CoordList};
use crate::geometry_errors::GeometryError;

/// Positions along one axis, flat or grouped by shot.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordInput {
    Flat(Vec<f64>),
    Grouped(Vec<Vec<f64>>),
}

impl CoordInput {
    pub fn flat<T: Copy + Into<f64>>(values: &[T]) -> Self {
        CoordInput::Flat(values.iter().map(|&v| v.into()).collect())
    }

    pub fn grouped<T: Copy + Into<f64>, S: AsRef<[T]>>(shots: &[S]) -> Self {
        CoordInput::Grouped(
            shots
                .iter()
                .map(|s| s.as_ref().iter().map(|&v| v.into()).collect())
                .collect(),
        )
    }

    /// Split into per-shot lists given an optional expected shot count.
    fn into_shots(self, nsrc: Option<usize>, what: &'static str) -> Result<CoordList, GeometryError> {
        let to_f32 = |v: Vec<f64>| v.into_iter().map(|c| c as Coord).collect::<Vec<_>>();
        match (self, nsrc) {
            (CoordInput::Grouped(g), Some(n)) if g.len() != n => {
                Err(GeometryError::ShotCountMismatch {
                    what,
                    expected: n,
                    found: g.len(),
                })
            }
            (CoordInput::Grouped(g), _) => Ok(g.into_iter().map(to_f32).collect()),
            (CoordInput::Flat(f), None) => Ok(f.into_iter().map(|c| vec![c as Coord]).collect()),
            (CoordInput::Flat(f), Some(n)) if f.len() == n => {
                Ok(f.into_iter().map(|c| vec![c as Coord]).collect())
            }
            (CoordInput::Flat(f), Some(1)) => Ok(vec![to_f32(f)]),
            (CoordInput::Flat(f), Some(n)) => Err(GeometryError::ShotCountMismatch {
                what,
                expected: n,
                found: f.len(),
            }),
        }
    }
}

impl From<f64> for CoordInput {
    fn from(v: f64) -> Self {
        CoordInput::Flat(vec![v])
    }
}

impl From<Vec<f64>> for CoordInput {
    fn from(v: Vec<f64>) -> Self {
        CoordInput::Flat(v)
    }
}

impl From<Vec<f32>> for CoordInput {
    fn from(v: Vec<f32>) -> Self {
        CoordInput::flat(&v)
    }
}

impl From<Vec<Vec<f64>>> for CoordInput {
    fn from(v: Vec<Vec<f64>>) -> Self {
        CoordInput::Grouped(v)
    }
}

impl From<Vec<Vec<f32>>> for CoordInput {
    fn from(v: Vec<Vec<f32>>) -> Self {
        CoordInput::grouped(&v)
    }
}

/// Per-shot positions along the three axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShotCoordinates {
    pub x: CoordList,
    pub y: CoordList,
    pub z: CoordList,
}

impl ShotCoordinates {
    pub fn nsrc(&self) -> usize {
        self.x.len()
    }
}

/// Normalize three coordinate inputs into per-shot lists.
///
/// Arguments
/// -----------------
/// * `x`, `y`, `z`: positions along each axis, flat or grouped by shot.
/// * `nsrc`: expected number of shots. When absent it is inferred from the inputs.
///
/// Return
/// ----------
/// * The positions of every shot, one list per shot and per axis.
///
/// Errors
/// ----------
/// * [`GeometryError::ShotCountMismatch`] if the axes (or `nsrc`) disagree on the shot count.
/// * [`GeometryError::Configuration`] if a shot has no element or if the axes of a shot
///   have incompatible lengths.
/// * [`GeometryError::EmptyGeometry`] if no shot is described.
pub fn normalize_coords(
    x: CoordInput,
    y: CoordInput,
    z: CoordInput,
    nsrc: Option<usize>,
) -> Result<ShotCoordinates, GeometryError> {
    if nsrc == Some(0) {
        return Err(GeometryError::EmptyGeometry);
    }
    let x = x.into_shots(nsrc, "xloc")?;
    let expected = x.len();
    let y = y.into_shots(nsrc, "yloc")?;
    let z = z.into_shots(nsrc, "zloc")?;

    for (what, list) in [("yloc", &y), ("zloc", &z)] {
        if list.len() != expected {
            return Err(GeometryError::ShotCountMismatch {
                what,
                expected,
                found: list.len(),
            });
        }
    }
    if expected == 0 {
        return Err(GeometryError::EmptyGeometry);
    }

    for (i, ((xs, ys), zs)) in x.iter().zip(&y).zip(&z).enumerate() {
        check_shot_shape(i, xs, ys, zs)?;
    }

    Ok(ShotCoordinates { x, y, z })
}

/// Elements of one shot: `x` and `z` of equal non-zero length, `y` of the same length or a
/// single shared value.
pub(crate) fn check_shot_shape(
    shot: usize,
    x: &[Coord],
    y: &[Coord],
    z: &[Coord],
) -> Result<(), GeometryError> {
    if x.is_empty() {
        return Err(GeometryError::config(format!("shot {shot} has no element")));
    }
    if z.len() != x.len() || (y.len() != x.len() && y.len() != 1) {
        return Err(GeometryError::config(format!(
            "shot {shot} has {} x, {} y and {} z positions",
            x.len(),
            y.len(),
            z.len()
        )));
    }
    Ok(())
}
