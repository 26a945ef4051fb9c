//! # shotgeom
//!
//! Acquisition geometry for wave-equation imaging and inversion: positions and timing of
//! the sources or receivers of every shot of a survey, held in memory
//! ([`InCoreGeometry`]) or summarized from a lazily read trace archive
//! ([`OutOfCoreGeometry`]).
//!
//! ## Modules
//! -----------------
//! * [`time_axis`] – resolution of `(nt, dt, t, t0)` per shot.
//! * [`coordinates`] – normalization of flat or grouped coordinate inputs.
//! * [`traces`] – trace headers, resident blocks and lazily read scans.
//! * [`geometry`] – the [`Geometry`] union, comparison, subsampling and super-shot merge.
//! * [`geometry_errors`] – the crate error type.
//!
//! ## Quick start
//! -----------------
//! ```rust
//! use std::sync::Arc;
//! use shotgeom::{AcquisitionGeometry, Geometry, GeometryKey, OutOfCoreGeometry};
//! use shotgeom::traces::{memory_scan::MemoryScan, TraceBlock, TraceHeader, TraceScan};
//!
//! let headers = (0..4)
//!     .map(|k| TraceHeader { field_record: 1 + k / 2, group_x: 10 * k, ns: 501, dt: 2000, ..Default::default() })
//!     .collect();
//! let scan: Arc<dyn TraceScan> = Arc::new(MemoryScan::new(TraceBlock::headers_only(headers)));
//!
//! let rec: Geometry = OutOfCoreGeometry::from_scan(scan, GeometryKey::Receiver, None)?.into();
//! assert_eq!(rec.nsrc(), 2);
//! assert_eq!(rec.shot(1)?.x, vec![20.0, 30.0]);
//! # Ok::<(), shotgeom::GeometryError>(())
//! ```
pub mod constants;
pub mod coordinates;
pub mod geometry;
pub mod geometry_errors;
pub mod time_axis;
pub mod traces;

pub use crate::constants::{Coord, CoordList, Millis};
pub use crate::coordinates::{normalize_coords, CoordInput, ShotCoordinates};
pub use crate::geometry::{
    compare_geometry, get_nsrc, in_core::InCoreGeometry, out_of_core::OutOfCoreGeometry,
    subsample, super_shot::super_shot_geometry, AcquisitionGeometry, Geometry, GeometryKey,
    ShotGeometry, ShotSelection,
};
pub use crate::geometry_errors::GeometryError;
pub use crate::time_axis::{build_time_axis, ShotParam, ShotTiming, TimeAxis, TimeAxisParams};
