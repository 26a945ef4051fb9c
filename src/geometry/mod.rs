//! # Acquisition geometry
//!
//! Positions and timing of the sources or receivers of every shot of a survey.
//!
//! A geometry comes in two shapes sharing the accessor contract
//! [`AcquisitionGeometry`]:
//!
//! * [`InCoreGeometry`] – every coordinate of every shot is held in memory.
//! * [`OutOfCoreGeometry`] – only a per-shot summary is held (sample count, sample
//!   interval, number of elements) together with handles on the trace archive; the
//!   coordinates of a shot are read when asked for.
//!
//! [`Geometry`] is the tagged union of both, so that consumers never branch on the
//! representation.
//!
//! ## Operations
//! -----------------
//! * [`compare_geometry`] – equality, with a summary-level comparison across shapes.
//! * [`Geometry::subsample`] / [`subsample`] – restriction to a selection of shots.
//! * [`Geometry::to_in_core`] – materialization of an out-of-core geometry.
//! * [`super_shot::super_shot_geometry`] – merge every shot into one.
//! * [`get_nsrc`] – shot count.
//!
//! ## Invariants
//! -----------------
//! * Every per-shot attribute (`xloc`, `yloc`, `zloc`, `nt`, `dt`, `t`, `t0`) has one entry
//!   per shot.
//! * `nt[i] == round(t[i] / dt[i]) + 1`.
//! * Geometries are immutable; subsampling and merging allocate new, independent values.
//!
//! ## Example
//! -----------------
//! ```rust
//! use shotgeom::geometry::{compare_geometry, Geometry, AcquisitionGeometry};
//! use shotgeom::geometry::in_core::InCoreGeometry;
//!
//! let geometry: Geometry = InCoreGeometry::builder()
//!     .x(vec![0.0, 50.0, 100.0])
//!     .y(vec![0.0, 0.0, 0.0])
//!     .z(vec![10.0, 10.0, 10.0])
//!     .dt(2.0)
//!     .t(1000.0)
//!     .build()
//!     .unwrap()
//!     .into();
//!
//! let first_two = geometry.subsample(0..2).unwrap();
//! assert_eq!(first_two.nsrc(), 2);
//! assert!(compare_geometry(&geometry, &geometry));
//! ```
use std::{
    fmt,
    ops::{Range, RangeInclusive},
    str::FromStr,
};

use crate::constants::{Coord, Millis, DEFAULT_RECEIVER_DEPTH_KEY, DEFAULT_SOURCE_DEPTH_KEY};
use crate::geometry_errors::GeometryError;
use crate::time_axis::{ShotTiming, TimeAxis};
use crate::traces::HeaderField;

pub mod display;
pub mod in_core;
pub mod out_of_core;
pub mod super_shot;

use in_core::InCoreGeometry;
use out_of_core::OutOfCoreGeometry;

/// Whether coordinates describe the source or the receiver spread of every shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryKey {
    #[default]
    Source,
    Receiver,
}

impl GeometryKey {
    /// Depth header used when the caller does not name one.
    pub fn default_depth_key(&self) -> HeaderField {
        match self {
            GeometryKey::Source => DEFAULT_SOURCE_DEPTH_KEY,
            GeometryKey::Receiver => DEFAULT_RECEIVER_DEPTH_KEY,
        }
    }

    /// Resolve the depth header named by the caller, empty or absent meaning the default.
    pub fn depth_field(&self, depth_key: Option<&str>) -> Result<HeaderField, GeometryError> {
        match depth_key.map(str::trim) {
            None | Some("") => Ok(self.default_depth_key()),
            Some(name) => name.parse(),
        }
    }

    /// X and Y header words read for this key.
    pub(crate) fn position_fields(&self) -> (HeaderField, HeaderField) {
        match self {
            GeometryKey::Source => (HeaderField::SourceX, HeaderField::SourceY),
            GeometryKey::Receiver => (HeaderField::GroupX, HeaderField::GroupY),
        }
    }
}

impl FromStr for GeometryKey {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(GeometryKey::Source),
            "receiver" => Ok(GeometryKey::Receiver),
            _ => Err(GeometryError::InvalidGeometryKey(s.to_string())),
        }
    }
}

impl fmt::Display for GeometryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryKey::Source => f.write_str("source"),
            GeometryKey::Receiver => f.write_str("receiver"),
        }
    }
}

/// Coordinates and timing of one shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotGeometry {
    pub x: Vec<Coord>,
    pub y: Vec<Coord>,
    pub z: Vec<Coord>,
    pub timing: ShotTiming,
}

impl ShotGeometry {
    /// Number of elements (1 for a point source).
    pub fn nrec(&self) -> usize {
        self.x.len()
    }
}

/// Selection of shots, kept in the given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotSelection(Vec<usize>);

impl ShotSelection {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Check every index against the shot count.
    pub fn resolve(&self, nsrc: usize) -> Result<&[usize], GeometryError> {
        if let Some(&index) = self.0.iter().find(|&&i| i >= nsrc) {
            return Err(GeometryError::ShotIndexOutOfBounds { index, nsrc });
        }
        if self.0.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }
        Ok(&self.0)
    }
}

impl From<usize> for ShotSelection {
    fn from(i: usize) -> Self {
        ShotSelection(vec![i])
    }
}

impl From<Range<usize>> for ShotSelection {
    fn from(r: Range<usize>) -> Self {
        ShotSelection(r.collect())
    }
}

impl From<RangeInclusive<usize>> for ShotSelection {
    fn from(r: RangeInclusive<usize>) -> Self {
        ShotSelection(r.collect())
    }
}

impl From<Vec<usize>> for ShotSelection {
    fn from(v: Vec<usize>) -> Self {
        ShotSelection(v)
    }
}

impl From<&[usize]> for ShotSelection {
    fn from(v: &[usize]) -> Self {
        ShotSelection(v.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for ShotSelection {
    fn from(v: [usize; N]) -> Self {
        ShotSelection(v.to_vec())
    }
}

/// Accessors shared by every geometry representation.
pub trait AcquisitionGeometry {
    /// Time axis of every shot.
    fn time_axis(&self) -> &TimeAxis;

    /// Number of elements of every shot.
    fn nrec(&self) -> Vec<usize>;

    fn nsrc(&self) -> usize {
        self.time_axis().nsrc()
    }

    fn nt(&self) -> &[usize] {
        self.time_axis().nt()
    }

    fn dt(&self) -> &[Millis] {
        self.time_axis().dt()
    }

    fn t(&self) -> &[Millis] {
        self.time_axis().t()
    }

    fn t0(&self) -> &[Millis] {
        self.time_axis().t0()
    }

    /// Timing of shot `shot`.
    fn timing(&self, shot: usize) -> Result<ShotTiming, GeometryError> {
        self.time_axis()
            .shot(shot)
            .ok_or(GeometryError::ShotIndexOutOfBounds {
                index: shot,
                nsrc: self.nsrc(),
            })
    }

    /// Regular time grid of shot `shot`, from `t0` to `t0 + t`.
    fn time_grid(&self, shot: usize) -> Result<Vec<Millis>, GeometryError> {
        Ok(self.timing(shot)?.time_grid())
    }

    /// Number of recorded samples, `sum(nrec[i] * nt[i])`.
    fn n_samples(&self) -> usize {
        self.nrec()
            .iter()
            .zip(self.nt())
            .map(|(nrec, nt)| nrec * nt)
            .sum()
    }
}

/// Geometry of a survey, in memory or backed by a trace archive.
#[derive(Debug, Clone)]
pub enum Geometry {
    InCore(InCoreGeometry),
    OutOfCore(OutOfCoreGeometry),
}

impl From<InCoreGeometry> for Geometry {
    fn from(g: InCoreGeometry) -> Self {
        Geometry::InCore(g)
    }
}

impl From<OutOfCoreGeometry> for Geometry {
    fn from(g: OutOfCoreGeometry) -> Self {
        Geometry::OutOfCore(g)
    }
}

impl AcquisitionGeometry for Geometry {
    fn time_axis(&self) -> &TimeAxis {
        match self {
            Geometry::InCore(g) => g.time_axis(),
            Geometry::OutOfCore(g) => g.time_axis(),
        }
    }

    fn nrec(&self) -> Vec<usize> {
        match self {
            Geometry::InCore(g) => g.nrec(),
            Geometry::OutOfCore(g) => g.nrec(),
        }
    }
}

impl Geometry {
    pub fn is_in_core(&self) -> bool {
        matches!(self, Geometry::InCore(_))
    }

    pub fn as_in_core(&self) -> Option<&InCoreGeometry> {
        match self {
            Geometry::InCore(g) => Some(g),
            Geometry::OutOfCore(_) => None,
        }
    }

    pub fn as_out_of_core(&self) -> Option<&OutOfCoreGeometry> {
        match self {
            Geometry::InCore(_) => None,
            Geometry::OutOfCore(g) => Some(g),
        }
    }

    /// Coordinates and timing of shot `shot`. Reads the archive for out-of-core geometries.
    pub fn shot(&self, shot: usize) -> Result<ShotGeometry, GeometryError> {
        match self {
            Geometry::InCore(g) => g.shot(shot),
            Geometry::OutOfCore(g) => g.materialize_shot(shot),
        }
    }

    /// New geometry of the same shape restricted to `selection`, in selection order.
    pub fn subsample(&self, selection: impl Into<ShotSelection>) -> Result<Self, GeometryError> {
        let selection = selection.into();
        Ok(match self {
            Geometry::InCore(g) => Geometry::InCore(g.subsample(&selection)?),
            Geometry::OutOfCore(g) => Geometry::OutOfCore(g.subsample(&selection)?),
        })
    }

    /// In-memory copy of the geometry, materializing every shot if needed.
    pub fn to_in_core(&self) -> Result<InCoreGeometry, GeometryError> {
        match self {
            Geometry::InCore(g) => Ok(g.clone()),
            Geometry::OutOfCore(g) => InCoreGeometry::from_out_of_core(g),
        }
    }
}

/// Number of shots of a geometry.
pub fn get_nsrc(geometry: &impl AcquisitionGeometry) -> usize {
    geometry.nsrc()
}

/// Restrict `geometry` to the shots in `selection`.
pub fn subsample(
    geometry: &Geometry,
    selection: impl Into<ShotSelection>,
) -> Result<Geometry, GeometryError> {
    geometry.subsample(selection)
}

/// Compare two geometries.
///
/// * Two in-core geometries are equal when their coordinates and time axes are identical.
/// * Two out-of-core geometries are equal when they designate the same shots of the same
///   archive with identical summaries, key and depth key. Nothing is read.
/// * An in-core and an out-of-core geometry are compared on their summary projection:
///   shot count, time axis and number of elements per shot.
pub fn compare_geometry(a: &Geometry, b: &Geometry) -> bool {
    match (a, b) {
        (Geometry::InCore(a), Geometry::InCore(b)) => a == b,
        (Geometry::OutOfCore(a), Geometry::OutOfCore(b)) => a == b,
        _ => a.time_axis() == b.time_axis() && a.nrec() == b.nrec(),
    }
}
