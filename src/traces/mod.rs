//! # Trace headers, blocks and scans
//!
//! Interface with the trace-file layer. A seismic archive is a sequence of **traces**, each
//! one carrying a fixed set of header words (source and receiver positions, elevations,
//! sample count and interval, ...) and an optional payload of samples.
//!
//! Two access modes exist:
//!
//! * a [`TraceBlock`] holds fully resident traces (headers and, optionally, samples);
//! * a [`TraceScan`] is a lazily read archive: it exposes a per-shot [`ShotSummary`] built
//!   from headers only, and reads the traces of one shot on demand.
//!
//! [`ScanHandle`] splits a scan into independent per-shot handles sharing the same
//! underlying archive.
//!
//! Shots
//! -----------------
//! Traces sharing the same `FieldRecord` belong to the same shot. Shots are numbered in
//! order of first appearance in the archive, the traces of a shot need not be contiguous.
//!
//! A geometry needs the traces of a shot to share one sample count and interval
//! ([`ShotSummary::ensure_uniform`]). Scans accept mixed shots and report them, geometry
//! construction rejects them.
//!
//! Scalars
//! -----------------
//! Positions and elevations are stored as integers together with a scalar
//! (`RecSourceScalar` for X/Y, `ElevationScalar` for elevations and depths). A negative
//! scalar `s` divides the stored value by `|s|`, a positive one multiplies it, zero leaves
//! it unchanged. [`TraceHeader::value`] applies them.
//!
//! Implementations
//! -----------------
//! * [`memory_scan::MemoryScan`] – scan over a resident [`TraceBlock`].
//! * [`csv_reader::CsvHeaderScan`] – scan over a per-trace header dump on disk.
use std::{fmt, ops::Range, str::FromStr, sync::Arc};

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::Micros;
use crate::geometry_errors::GeometryError;

pub mod csv_reader;
pub mod memory_scan;

pub(crate) type FastHashMap<K, V> = HashMap<K, V, RandomState>;

/// Trace header words known to the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    FieldRecord,
    SourceX,
    SourceY,
    GroupX,
    GroupY,
    SourceSurfaceElevation,
    RecGroupElevation,
    SourceDepth,
    SourceWaterDepth,
    GroupWaterDepth,
    ElevationScalar,
    RecSourceScalar,
    /// Number of samples of the trace
    Ns,
    /// Sample interval in microseconds
    Dt,
}

impl HeaderField {
    pub const ALL: [HeaderField; 14] = [
        HeaderField::FieldRecord,
        HeaderField::SourceX,
        HeaderField::SourceY,
        HeaderField::GroupX,
        HeaderField::GroupY,
        HeaderField::SourceSurfaceElevation,
        HeaderField::RecGroupElevation,
        HeaderField::SourceDepth,
        HeaderField::SourceWaterDepth,
        HeaderField::GroupWaterDepth,
        HeaderField::ElevationScalar,
        HeaderField::RecSourceScalar,
        HeaderField::Ns,
        HeaderField::Dt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HeaderField::FieldRecord => "FieldRecord",
            HeaderField::SourceX => "SourceX",
            HeaderField::SourceY => "SourceY",
            HeaderField::GroupX => "GroupX",
            HeaderField::GroupY => "GroupY",
            HeaderField::SourceSurfaceElevation => "SourceSurfaceElevation",
            HeaderField::RecGroupElevation => "RecGroupElevation",
            HeaderField::SourceDepth => "SourceDepth",
            HeaderField::SourceWaterDepth => "SourceWaterDepth",
            HeaderField::GroupWaterDepth => "GroupWaterDepth",
            HeaderField::ElevationScalar => "ElevationScalar",
            HeaderField::RecSourceScalar => "RecSourceScalar",
            HeaderField::Ns => "ns",
            HeaderField::Dt => "dt",
        }
    }

    /// Scalar header applying to this field, if any.
    pub fn scalar(&self) -> Option<HeaderField> {
        match self {
            HeaderField::SourceX
            | HeaderField::SourceY
            | HeaderField::GroupX
            | HeaderField::GroupY => Some(HeaderField::RecSourceScalar),
            HeaderField::SourceSurfaceElevation
            | HeaderField::RecGroupElevation
            | HeaderField::SourceDepth
            | HeaderField::SourceWaterDepth
            | HeaderField::GroupWaterDepth => Some(HeaderField::ElevationScalar),
            _ => None,
        }
    }
}

impl FromStr for HeaderField {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| GeometryError::UnknownHeaderField(s.to_string()))
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply a SEG-Y scalar to a stored value.
pub fn apply_scalar(value: f64, scalar: i32) -> f64 {
    match scalar {
        0 => value,
        s if s < 0 => value / f64::from(s.unsigned_abs()),
        s => value * f64::from(s),
    }
}

/// Header words of one trace, as stored on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceHeader {
    #[serde(rename = "FieldRecord")]
    pub field_record: i32,
    #[serde(rename = "SourceX", default)]
    pub source_x: i32,
    #[serde(rename = "SourceY", default)]
    pub source_y: i32,
    #[serde(rename = "GroupX", default)]
    pub group_x: i32,
    #[serde(rename = "GroupY", default)]
    pub group_y: i32,
    #[serde(rename = "SourceSurfaceElevation", default)]
    pub source_surface_elevation: i32,
    #[serde(rename = "RecGroupElevation", default)]
    pub rec_group_elevation: i32,
    #[serde(rename = "SourceDepth", default)]
    pub source_depth: i32,
    #[serde(rename = "SourceWaterDepth", default)]
    pub source_water_depth: i32,
    #[serde(rename = "GroupWaterDepth", default)]
    pub group_water_depth: i32,
    #[serde(rename = "ElevationScalar", default)]
    pub elevation_scalar: i16,
    #[serde(rename = "RecSourceScalar", default)]
    pub rec_source_scalar: i16,
    pub ns: u16,
    /// Sample interval in microseconds
    pub dt: u16,
}

impl TraceHeader {
    /// Stored value of a header word.
    pub fn raw(&self, field: HeaderField) -> i32 {
        match field {
            HeaderField::FieldRecord => self.field_record,
            HeaderField::SourceX => self.source_x,
            HeaderField::SourceY => self.source_y,
            HeaderField::GroupX => self.group_x,
            HeaderField::GroupY => self.group_y,
            HeaderField::SourceSurfaceElevation => self.source_surface_elevation,
            HeaderField::RecGroupElevation => self.rec_group_elevation,
            HeaderField::SourceDepth => self.source_depth,
            HeaderField::SourceWaterDepth => self.source_water_depth,
            HeaderField::GroupWaterDepth => self.group_water_depth,
            HeaderField::ElevationScalar => self.elevation_scalar.into(),
            HeaderField::RecSourceScalar => self.rec_source_scalar.into(),
            HeaderField::Ns => self.ns.into(),
            HeaderField::Dt => self.dt.into(),
        }
    }

    /// Value of a header word with its scalar applied.
    pub fn value(&self, field: HeaderField) -> f64 {
        let raw = f64::from(self.raw(field));
        match field.scalar() {
            Some(scalar) => apply_scalar(raw, self.raw(scalar)),
            None => raw,
        }
    }

    pub fn sample_interval(&self) -> Micros {
        f64::from(self.dt)
    }
}

/// Fully resident traces.
///
/// Invariants
/// -----------------
/// * `data` is either empty (headers only) or holds one sample vector per header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceBlock {
    headers: Vec<TraceHeader>,
    data: Vec<Vec<f32>>,
}

impl TraceBlock {
    /// Build a block from headers and trace samples.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::Configuration`] if `data` is neither empty nor one vector per header.
    pub fn new(headers: Vec<TraceHeader>, data: Vec<Vec<f32>>) -> Result<Self, GeometryError> {
        if !data.is_empty() && data.len() != headers.len() {
            return Err(GeometryError::config(format!(
                "trace block holds {} headers but {} traces",
                headers.len(),
                data.len()
            )));
        }
        Ok(TraceBlock { headers, data })
    }

    pub fn headers_only(headers: Vec<TraceHeader>) -> Self {
        TraceBlock {
            headers,
            data: Vec::new(),
        }
    }

    pub fn ntraces(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[TraceHeader] {
        &self.headers
    }

    pub fn data(&self) -> &[Vec<f32>] {
        &self.data
    }

    /// Scaled values of one header word, indexed by trace.
    pub fn get_header(&self, field: HeaderField) -> Vec<f64> {
        self.headers.iter().map(|h| h.value(field)).collect()
    }

    /// Total number of samples described by the headers.
    pub fn total_samples(&self) -> usize {
        self.headers.iter().map(|h| usize::from(h.ns)).sum()
    }

    /// Trace indices of every shot, shots in order of first appearance.
    pub fn shot_groups(&self) -> Vec<Vec<usize>> {
        group_by_record(self.headers.iter().map(|h| h.field_record))
    }

    /// Copy of the traces at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> TraceBlock {
        let headers = indices
            .iter()
            .filter_map(|&i| self.headers.get(i).cloned())
            .collect();
        let data = if self.data.is_empty() {
            Vec::new()
        } else {
            indices
                .iter()
                .filter_map(|&i| self.data.get(i).cloned())
                .collect()
        };
        TraceBlock { headers, data }
    }

    pub fn slice(&self, range: Range<usize>) -> TraceBlock {
        self.select(&range.collect::<Vec<_>>())
    }
}

/// Group positions of equal records, groups in order of first appearance.
pub(crate) fn group_by_record(records: impl IntoIterator<Item = i32>) -> Vec<Vec<usize>> {
    let mut slot: FastHashMap<i32, usize> = FastHashMap::default();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (trace, record) in records.into_iter().enumerate() {
        let next = groups.len();
        let g = *slot.entry(record).or_insert(next);
        if g == next {
            groups.push(Vec::new());
        }
        groups[g].push(trace);
    }
    groups
}

/// Header-only description of one shot of a scan.
///
/// `ns` and `dt` are those of the first trace. `samples` counts the samples of every
/// trace, so it equals `ntraces * ns` only for a [uniform](ShotSummary::is_uniform) shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotSummary {
    pub field_record: i32,
    pub ntraces: usize,
    /// Samples per trace
    pub ns: usize,
    /// Sample interval in microseconds
    pub dt: Micros,
    /// Total number of samples of the shot
    pub samples: usize,
    /// Traces disagreeing with the first one on `ns` or `dt`
    pub mismatched: usize,
}

impl ShotSummary {
    pub(crate) fn start(first: &TraceHeader) -> Self {
        ShotSummary {
            field_record: first.field_record,
            ntraces: 1,
            ns: first.ns.into(),
            dt: first.sample_interval(),
            samples: first.ns.into(),
            mismatched: 0,
        }
    }

    pub(crate) fn add(&mut self, h: &TraceHeader) {
        self.ntraces += 1;
        self.samples += usize::from(h.ns);
        if usize::from(h.ns) != self.ns || h.sample_interval() != self.dt {
            self.mismatched += 1;
        }
    }

    pub(crate) fn report(&self) {
        if self.mismatched > 0 {
            tracing::warn!(
                field_record = self.field_record,
                mismatched = self.mismatched,
                "traces disagree on sample count or interval"
            );
        }
    }

    /// Summarize the headers of one shot, `None` when there is no trace.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a TraceHeader>) -> Option<Self> {
        let mut iter = headers.into_iter();
        let mut summary = ShotSummary::start(iter.next()?);
        for h in iter {
            summary.add(h);
        }
        summary.report();
        Some(summary)
    }

    /// Every trace shares the sample count and interval of the first one.
    pub fn is_uniform(&self) -> bool {
        self.mismatched == 0
    }

    /// Reject shots whose traces disagree on the sample count or interval.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::Configuration`] for a non-uniform shot.
    pub fn ensure_uniform(&self) -> Result<(), GeometryError> {
        if self.is_uniform() {
            return Ok(());
        }
        Err(GeometryError::config(format!(
            "shot {} mixes sample counts or intervals ({} of {} traces differ from the first)",
            self.field_record, self.mismatched, self.ntraces
        )))
    }
}

/// Lazily read trace archive.
pub trait TraceScan: fmt::Debug + Send + Sync {
    /// Header-only summary of every shot, in shot order.
    fn summaries(&self) -> &[ShotSummary];

    /// Read every trace of shot `shot`.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::ShotIndexOutOfBounds`] for an unknown shot.
    /// * I/O errors of the underlying storage, propagated as is.
    fn read_shot(&self, shot: usize) -> Result<TraceBlock, GeometryError>;

    fn nshots(&self) -> usize {
        self.summaries().len()
    }

    /// Total number of samples of the archive.
    fn total_samples(&self) -> usize {
        self.summaries().iter().map(|s| s.samples).sum()
    }
}

/// One shot of a shared scan.
#[derive(Debug, Clone)]
pub struct ScanHandle {
    scan: Arc<dyn TraceScan>,
    shot: usize,
}

impl ScanHandle {
    /// Handle on shot `shot` of `scan`.
    pub fn new(scan: Arc<dyn TraceScan>, shot: usize) -> Result<Self, GeometryError> {
        let nsrc = scan.nshots();
        if shot >= nsrc {
            return Err(GeometryError::ShotIndexOutOfBounds { index: shot, nsrc });
        }
        Ok(ScanHandle { scan, shot })
    }

    /// Split a scan into one handle per shot.
    pub fn split(scan: Arc<dyn TraceScan>) -> Vec<ScanHandle> {
        (0..scan.nshots())
            .map(|shot| ScanHandle {
                scan: Arc::clone(&scan),
                shot,
            })
            .collect()
    }

    pub fn shot_index(&self) -> usize {
        self.shot
    }

    pub fn summary(&self) -> &ShotSummary {
        &self.scan.summaries()[self.shot]
    }

    pub fn read(&self) -> Result<TraceBlock, GeometryError> {
        self.scan.read_shot(self.shot)
    }

    /// True when both handles designate the same shot of the same scan.
    pub fn same_shot(&self, other: &ScanHandle) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.scan) as *const (),
            Arc::as_ptr(&other.scan) as *const (),
        ) && self.shot == other.shot
    }
}
