//! # Out-of-core geometry
//!
//! Geometry of a trace archive too large to be held in memory. Construction reads only the
//! per-shot header summaries of a [`TraceScan`]; the coordinates of a shot are read from
//! the archive when [`OutOfCoreGeometry::materialize_shot`] is called.
//!
//! ## Two phases
//! -----------------
//! 1. **Summary** ([`OutOfCoreGeometry::from_scan`], [`OutOfCoreGeometry::from_handles`]):
//!    per shot, the sample count `nt`, the sample interval `dt`, the duration `t` and the
//!    number of elements `nrec` (1 for sources, the number of traces for receivers), plus
//!    the `key` / depth key and one [`ScanHandle`] per shot.
//! 2. **Fetch** ([`OutOfCoreGeometry::materialize_shot`],
//!    [`InCoreGeometry::from_out_of_core`](super::in_core::InCoreGeometry::from_out_of_core)):
//!    full read of one shot through its handle.
//!
//! Handles are shared, never copied data: subsampling keeps handles on the same archive.
//! Equality works on the summaries only, so two scans of identical archives compare equal.
//! Shot `i` always refers to the same archive shot, whatever order shots are materialized in.
use std::sync::Arc;

use tracing::{debug, trace};

use super::{
    in_core::{extract_shot, timing_from_samples},
    AcquisitionGeometry, GeometryKey, ShotGeometry, ShotSelection,
};
use crate::geometry_errors::GeometryError;
use crate::time_axis::TimeAxis;
use crate::traces::{HeaderField, ScanHandle, TraceScan};

/// Summary of a trace archive with on-demand access to each shot.
#[derive(Debug, Clone)]
pub struct OutOfCoreGeometry {
    handles: Vec<ScanHandle>,
    time: TimeAxis,
    nrec: Vec<usize>,
    key: GeometryKey,
    segy_depth_key: HeaderField,
}

impl OutOfCoreGeometry {
    /// Summarize every shot of a scan.
    ///
    /// Arguments
    /// -----------------
    /// * `scan`: the archive, shared with the returned geometry.
    /// * `key`: whether shots are described by their source or their receiver spread.
    /// * `depth_key`: header providing the vertical coordinate, the key's default when
    ///   `None` or empty.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::EmptyGeometry`] if the scan holds no shot.
    /// * [`GeometryError::UnknownHeaderField`] for an unknown depth header.
    /// * [`GeometryError::Configuration`] for invalid sample counts or intervals, or for a
    ///   shot whose traces disagree on them.
    pub fn from_scan(
        scan: Arc<dyn TraceScan>,
        key: GeometryKey,
        depth_key: Option<&str>,
    ) -> Result<Self, GeometryError> {
        OutOfCoreGeometry::from_handles(ScanHandle::split(scan), key, depth_key)
    }

    /// Summarize an ordered list of per-shot handles, possibly from different scans.
    pub fn from_handles(
        handles: Vec<ScanHandle>,
        key: GeometryKey,
        depth_key: Option<&str>,
    ) -> Result<Self, GeometryError> {
        if handles.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }
        let segy_depth_key = key.depth_field(depth_key)?;

        let timings = handles
            .iter()
            .map(|h| {
                h.summary().ensure_uniform()?;
                timing_from_samples(h.summary().ns, h.summary().dt)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let nrec = handles
            .iter()
            .map(|h| match key {
                GeometryKey::Source => 1,
                GeometryKey::Receiver => h.summary().ntraces,
            })
            .collect();

        debug!(
            nsrc = handles.len(),
            %key,
            depth_key = %segy_depth_key,
            "built out-of-core geometry from scan summary"
        );

        Ok(OutOfCoreGeometry {
            handles,
            time: TimeAxis::from_shots(timings),
            nrec,
            key,
            segy_depth_key,
        })
    }

    pub fn key(&self) -> GeometryKey {
        self.key
    }

    /// Name of the header providing the vertical coordinate.
    pub fn segy_depth_key(&self) -> &'static str {
        self.segy_depth_key.name()
    }

    pub fn handles(&self) -> &[ScanHandle] {
        &self.handles
    }

    /// Read shot `shot` from the archive and extract its coordinates and timing.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::ShotIndexOutOfBounds`] for an unknown shot.
    /// * Archive read errors, propagated unchanged.
    pub fn materialize_shot(&self, shot: usize) -> Result<ShotGeometry, GeometryError> {
        let handle = self
            .handles
            .get(shot)
            .ok_or(GeometryError::ShotIndexOutOfBounds {
                index: shot,
                nsrc: self.handles.len(),
            })?;
        let traces = handle.read()?;
        trace!(shot, ntraces = traces.ntraces(), "materializing shot");
        extract_shot(&traces, self.key, self.segy_depth_key)
    }

    /// Geometry over the shots in `selection`, sharing the same archive.
    pub fn subsample(&self, selection: &ShotSelection) -> Result<Self, GeometryError> {
        let indices = selection.resolve(self.nsrc())?;
        debug!(
            from = self.nsrc(),
            to = indices.len(),
            "subsampled out-of-core geometry"
        );
        Ok(OutOfCoreGeometry {
            handles: indices.iter().map(|&i| self.handles[i].clone()).collect(),
            time: self.time.select(indices),
            nrec: indices.iter().map(|&i| self.nrec[i]).collect(),
            key: self.key,
            segy_depth_key: self.segy_depth_key,
        })
    }
}

impl AcquisitionGeometry for OutOfCoreGeometry {
    fn time_axis(&self) -> &TimeAxis {
        &self.time
    }

    fn nrec(&self) -> Vec<usize> {
        self.nrec.clone()
    }
}

/// Summary-level equality: key, depth key, time axis, elements and header summary of
/// every shot. Nothing is read, and the archives behind the handles may differ.
impl PartialEq for OutOfCoreGeometry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.segy_depth_key == other.segy_depth_key
            && self.time == other.time
            && self.nrec == other.nrec
            && self.handles.len() == other.handles.len()
            && self
                .handles
                .iter()
                .zip(&other.handles)
                .all(|(a, b)| a.summary() == b.summary())
    }
}
