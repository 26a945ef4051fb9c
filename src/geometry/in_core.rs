//! # In-core geometry
//!
//! Geometry holding the coordinates of every element of every shot in memory.
//!
//! ## Construction paths
//! -----------------
//! * [`InCoreGeometry::builder`] – from explicit coordinates and timing parameters, runs
//!   [`normalize_coords`] then [`build_time_axis`].
//! * [`InCoreGeometry::from_trace_block`] – from resident traces, reading positions and
//!   timing from the trace headers.
//! * [`InCoreGeometry::from_out_of_core`] – materializes every shot of an
//!   [`OutOfCoreGeometry`].
//!
//! The last two paths share the same per-shot header extraction, so that materializing an
//! out-of-core geometry gives the same result as reading the equivalent block directly.
//!
//! ## Header extraction
//! -----------------
//! For each shot (traces sharing a `FieldRecord`):
//! * `key = Source`: one element, `SourceX`/`SourceY` and the depth header of the first trace.
//! * `key = Receiver`: one element per trace, `GroupX`/`GroupY` and the depth header.
//! * `nt` is the trace sample count `ns`, `dt = dt_us / 1000` (ms), `t = (nt - 1) * dt`,
//!   `t0 = 0`. Every trace of the shot must share `ns` and `dt`.
use tracing::debug;

use super::{
    out_of_core::OutOfCoreGeometry, AcquisitionGeometry, GeometryKey, ShotGeometry,
    ShotSelection,
};
use crate::constants::{CoordList, Micros, US_TO_MS};
use crate::coordinates::{check_shot_shape, normalize_coords, CoordInput, ShotCoordinates};
use crate::geometry_errors::GeometryError;
use crate::time_axis::{
    build_time_axis, resolve_shot, ShotParam, ShotTiming, TimeAxis, TimeAxisParamsBuilder,
};
use crate::traces::{HeaderField, ShotSummary, TraceBlock};

/// Geometry with every coordinate in memory.
///
/// Invariants
/// -----------------
/// * `xloc`, `yloc`, `zloc` and the time axis all describe the same number of shots (≥ 1).
/// * Within a shot, `xloc` and `zloc` have the same length, `yloc` has that length or one
///   shared value.
#[derive(Debug, Clone, PartialEq)]
pub struct InCoreGeometry {
    coords: ShotCoordinates,
    time: TimeAxis,
}

impl InCoreGeometry {
    /// Fluent builder from explicit coordinates and timing parameters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shotgeom::geometry::in_core::InCoreGeometry;
    /// use shotgeom::geometry::AcquisitionGeometry;
    ///
    /// // a single shot recorded by a 4-receiver spread
    /// let rec = InCoreGeometry::builder()
    ///     .x(vec![0.0, 10.0, 20.0, 30.0])
    ///     .y(0.0)
    ///     .z(vec![5.0, 5.0, 5.0, 5.0])
    ///     .nsrc(1)
    ///     .dt(4.0)
    ///     .nt(251_usize)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(rec.nsrc(), 1);
    /// assert_eq!(rec.t(), &[1000.0]);
    /// ```
    pub fn builder() -> InCoreGeometryBuilder {
        InCoreGeometryBuilder::default()
    }

    /// Assemble a geometry from already normalized parts.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::ShotCountMismatch`] if coordinates and time axis disagree on the
    ///   shot count.
    /// * [`GeometryError::Configuration`] if a shot has incompatible coordinate lengths.
    pub fn new(coords: ShotCoordinates, time: TimeAxis) -> Result<Self, GeometryError> {
        let nsrc = coords.nsrc();
        if nsrc == 0 {
            return Err(GeometryError::EmptyGeometry);
        }
        for (what, n) in [
            ("yloc", coords.y.len()),
            ("zloc", coords.z.len()),
            ("time axis", time.nsrc()),
        ] {
            if n != nsrc {
                return Err(GeometryError::ShotCountMismatch {
                    what,
                    expected: nsrc,
                    found: n,
                });
            }
        }
        for i in 0..nsrc {
            check_shot_shape(i, &coords.x[i], &coords.y[i], &coords.z[i])?;
        }
        Ok(InCoreGeometry { coords, time })
    }

    /// Build a geometry from one [`ShotGeometry`] per shot.
    pub fn from_shots(shots: Vec<ShotGeometry>) -> Result<Self, GeometryError> {
        let mut coords = ShotCoordinates::default();
        let mut timings = Vec::with_capacity(shots.len());
        for shot in shots {
            coords.x.push(shot.x);
            coords.y.push(shot.y);
            coords.z.push(shot.z);
            timings.push(shot.timing);
        }
        InCoreGeometry::new(coords, TimeAxis::from_shots(timings))
    }

    /// Build a geometry from resident traces.
    ///
    /// Arguments
    /// -----------------
    /// * `block`: the traces, grouped into shots by `FieldRecord`.
    /// * `key`: whether to read source positions or receiver spreads.
    /// * `depth_key`: header providing the vertical coordinate, the key's default when
    ///   `None` or empty.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::UnknownHeaderField`] for an unknown depth header.
    /// * [`GeometryError::EmptyGeometry`] for a block without traces.
    /// * [`GeometryError::Configuration`] for invalid sample counts or intervals, or for a
    ///   shot whose traces disagree on them.
    pub fn from_trace_block(
        block: &TraceBlock,
        key: GeometryKey,
        depth_key: Option<&str>,
    ) -> Result<Self, GeometryError> {
        let depth = key.depth_field(depth_key)?;
        let shots = block
            .shot_groups()
            .iter()
            .map(|traces| extract_shot(&block.select(traces), key, depth))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            nsrc = shots.len(),
            ntraces = block.ntraces(),
            %key,
            %depth,
            "built in-core geometry from trace block"
        );
        InCoreGeometry::from_shots(shots)
    }

    /// Materialize every shot of an out-of-core geometry.
    ///
    /// Performs one archive read per shot, in shot order.
    pub fn from_out_of_core(geometry: &OutOfCoreGeometry) -> Result<Self, GeometryError> {
        let shots = (0..geometry.nsrc())
            .map(|i| geometry.materialize_shot(i))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(nsrc = shots.len(), "materialized out-of-core geometry");
        InCoreGeometry::from_shots(shots)
    }

    pub fn xloc(&self) -> &CoordList {
        &self.coords.x
    }

    pub fn yloc(&self) -> &CoordList {
        &self.coords.y
    }

    pub fn zloc(&self) -> &CoordList {
        &self.coords.z
    }

    pub fn coordinates(&self) -> &ShotCoordinates {
        &self.coords
    }

    pub fn shot(&self, shot: usize) -> Result<ShotGeometry, GeometryError> {
        let timing = self.timing(shot)?;
        Ok(ShotGeometry {
            x: self.coords.x[shot].clone(),
            y: self.coords.y[shot].clone(),
            z: self.coords.z[shot].clone(),
            timing,
        })
    }

    /// Copy of the shots in `selection`, in selection order.
    pub fn subsample(&self, selection: &ShotSelection) -> Result<Self, GeometryError> {
        let indices = selection.resolve(self.nsrc())?;
        let pick = |list: &CoordList| indices.iter().map(|&i| list[i].clone()).collect();
        let coords = ShotCoordinates {
            x: pick(&self.coords.x),
            y: pick(&self.coords.y),
            z: pick(&self.coords.z),
        };
        debug!(from = self.nsrc(), to = indices.len(), "subsampled in-core geometry");
        Ok(InCoreGeometry {
            coords,
            time: self.time.select(indices),
        })
    }
}

impl AcquisitionGeometry for InCoreGeometry {
    fn time_axis(&self) -> &TimeAxis {
        &self.time
    }

    fn nrec(&self) -> Vec<usize> {
        self.coords.x.iter().map(Vec::len).collect()
    }
}

/// Timing of a shot recorded with `ns` samples every `dt_us` microseconds.
pub(crate) fn timing_from_samples(ns: usize, dt_us: Micros) -> Result<ShotTiming, GeometryError> {
    let (nt, dt, t) = resolve_shot(Some(dt_us * US_TO_MS), None, Some(ns))?;
    Ok(ShotTiming {
        nt,
        dt: dt as f32,
        t: t as f32,
        t0: 0.,
    })
}

/// Coordinates and timing of the traces of a single shot.
pub(crate) fn extract_shot(
    traces: &TraceBlock,
    key: GeometryKey,
    depth: HeaderField,
) -> Result<ShotGeometry, GeometryError> {
    let summary = ShotSummary::from_headers(traces.headers()).ok_or(GeometryError::EmptyGeometry)?;
    summary.ensure_uniform()?;
    let timing = timing_from_samples(summary.ns, summary.dt)?;

    let (fx, fy) = key.position_fields();
    let read = |field: HeaderField| -> Vec<f32> {
        let values = traces.get_header(field);
        match key {
            GeometryKey::Source => values.into_iter().take(1).map(|v| v as f32).collect(),
            GeometryKey::Receiver => values.into_iter().map(|v| v as f32).collect(),
        }
    };

    Ok(ShotGeometry {
        x: read(fx),
        y: read(fy),
        z: read(depth),
        timing,
    })
}

/// Builder for [`InCoreGeometry`], validated at [`build`](InCoreGeometryBuilder::build).
#[derive(Debug, Clone, Default)]
pub struct InCoreGeometryBuilder {
    x: Option<CoordInput>,
    y: Option<CoordInput>,
    z: Option<CoordInput>,
    nsrc: Option<usize>,
    time: TimeAxisParamsBuilder,
}

impl InCoreGeometryBuilder {
    pub fn x(mut self, v: impl Into<CoordInput>) -> Self {
        self.x = Some(v.into());
        self
    }
    pub fn y(mut self, v: impl Into<CoordInput>) -> Self {
        self.y = Some(v.into());
        self
    }
    pub fn z(mut self, v: impl Into<CoordInput>) -> Self {
        self.z = Some(v.into());
        self
    }
    pub fn nsrc(mut self, v: usize) -> Self {
        self.nsrc = Some(v);
        self
    }
    pub fn dt(mut self, v: impl Into<ShotParam<f64>>) -> Self {
        self.time = self.time.dt(v);
        self
    }
    pub fn t(mut self, v: impl Into<ShotParam<f64>>) -> Self {
        self.time = self.time.t(v);
        self
    }
    pub fn nt(mut self, v: impl Into<ShotParam<usize>>) -> Self {
        self.time = self.time.nt(v);
        self
    }
    pub fn t0(mut self, v: impl Into<ShotParam<f64>>) -> Self {
        self.time = self.time.t0(v);
        self
    }

    /// Normalize the coordinates, resolve the time axis and assemble the geometry.
    ///
    /// Errors
    /// ----------
    /// * [`GeometryError::Configuration`] when a coordinate axis is missing, when timing is
    ///   under-specified or inconsistent, or when a shot has incompatible coordinate lengths.
    /// * [`GeometryError::ShotCountMismatch`] when inputs disagree on the shot count.
    pub fn build(self) -> Result<InCoreGeometry, GeometryError> {
        let missing = |axis: &str| GeometryError::config(format!("missing {axis} coordinates"));
        let x = self.x.ok_or_else(|| missing("x"))?;
        let y = self.y.ok_or_else(|| missing("y"))?;
        let z = self.z.ok_or_else(|| missing("z"))?;

        let coords = normalize_coords(x, y, z, self.nsrc)?;
        let params = self.time.build()?;
        let time = build_time_axis(&params, coords.nsrc())?;

        debug!(nsrc = coords.nsrc(), "built in-core geometry");
        InCoreGeometry::new(coords, time)
    }
}

#[cfg(test)]
mod in_core_test {
    use super::*;
    use crate::traces::TraceHeader;

    fn block() -> TraceBlock {
        let mut headers = Vec::new();
        for (record, sx) in [(1, 100), (2, 300)] {
            for gx in [0, 50, 100] {
                headers.push(TraceHeader {
                    field_record: record,
                    source_x: sx,
                    source_y: 7,
                    group_x: gx,
                    group_y: 7,
                    source_surface_elevation: 12,
                    rec_group_elevation: 3,
                    source_depth: 250,
                    elevation_scalar: -10,
                    ns: 501,
                    dt: 2000,
                    ..Default::default()
                });
            }
        }
        TraceBlock::headers_only(headers)
    }

    #[test]
    fn test_builder_point_sources() {
        let g = InCoreGeometry::builder()
            .x(vec![0.0, 10.0])
            .y(vec![0.0, 0.0])
            .z(vec![5.0, 5.0])
            .dt(2.0)
            .t(1000.0)
            .build()
            .unwrap();
        assert_eq!(g.nsrc(), 2);
        assert_eq!(g.xloc(), &vec![vec![0.0], vec![10.0]]);
        assert_eq!(g.nt(), &[501, 501]);
        assert_eq!(g.nrec(), vec![1, 1]);
        assert_eq!(g.n_samples(), 1002);
    }

    #[test]
    fn test_builder_missing_axis() {
        let err = InCoreGeometry::builder()
            .x(vec![0.0])
            .y(vec![0.0])
            .dt(2.0)
            .t(10.0)
            .build()
            .unwrap_err();
        assert_eq!(err, GeometryError::Configuration("missing z coordinates".into()));
    }

    #[test]
    fn test_builder_time_shot_count() {
        let err = InCoreGeometry::builder()
            .x(vec![0.0, 1.0])
            .y(vec![0.0, 0.0])
            .z(vec![0.0, 0.0])
            .dt(vec![1.0, 1.0, 1.0])
            .t(10.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, GeometryError::ShotCountMismatch { what: "dt", .. }));
    }

    #[test]
    fn test_from_trace_block_source() {
        let g = InCoreGeometry::from_trace_block(&block(), GeometryKey::Source, None).unwrap();
        assert_eq!(g.nsrc(), 2);
        assert_eq!(g.xloc(), &vec![vec![100.0], vec![300.0]]);
        assert_eq!(g.yloc(), &vec![vec![7.0], vec![7.0]]);
        assert_eq!(g.zloc(), &vec![vec![1.2], vec![1.2]]);
        assert_eq!(g.nt(), &[501, 501]);
        assert_eq!(g.dt(), &[2.0, 2.0]);
        assert_eq!(g.t(), &[1000.0, 1000.0]);

        let g = InCoreGeometry::from_trace_block(&block(), GeometryKey::Source, Some("SourceDepth"))
            .unwrap();
        assert_eq!(g.zloc()[0], vec![25.0]);
    }

    #[test]
    fn test_from_trace_block_receiver() {
        let g = InCoreGeometry::from_trace_block(&block(), GeometryKey::Receiver, Some(""))
            .unwrap();
        assert_eq!(g.nsrc(), 2);
        assert_eq!(g.xloc()[1], vec![0.0, 50.0, 100.0]);
        assert_eq!(g.zloc()[1], vec![0.3, 0.3, 0.3]);
        assert_eq!(g.nrec(), vec![3, 3]);
        assert_eq!(g.n_samples(), block().total_samples());
    }

    #[test]
    fn test_from_trace_block_errors() {
        assert_eq!(
            InCoreGeometry::from_trace_block(&block(), GeometryKey::Source, Some("Depth"))
                .unwrap_err(),
            GeometryError::UnknownHeaderField("Depth".into())
        );
        assert_eq!(
            InCoreGeometry::from_trace_block(&TraceBlock::default(), GeometryKey::Source, None)
                .unwrap_err(),
            GeometryError::EmptyGeometry
        );
    }

    #[test]
    fn test_from_trace_block_mixed_intervals() {
        let mut headers = block().headers().to_vec();
        headers[4].dt = 4000;
        let err = InCoreGeometry::from_trace_block(
            &TraceBlock::headers_only(headers),
            GeometryKey::Receiver,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::Configuration(msg) if msg.contains("shot 2")));
    }

    #[test]
    fn test_shot_and_subsample() {
        let g = InCoreGeometry::builder()
            .x(vec![0.0, 10.0, 20.0])
            .y(vec![0.0, 0.0, 0.0])
            .z(vec![1.0, 2.0, 3.0])
            .dt(vec![1.0, 2.0, 4.0])
            .t(100.0)
            .build()
            .unwrap();

        let shot = g.shot(2).unwrap();
        assert_eq!(shot.x, vec![20.0]);
        assert_eq!(shot.timing.nt, 26);

        let sub = g.subsample(&vec![2, 0].into()).unwrap();
        assert_eq!(sub.nsrc(), 2);
        assert_eq!(sub.zloc(), &vec![vec![3.0], vec![1.0]]);
        assert_eq!(sub.dt(), &[4.0, 1.0]);
        assert_eq!(g.nsrc(), 3);

        assert_eq!(
            g.subsample(&5_usize.into()).unwrap_err(),
            GeometryError::ShotIndexOutOfBounds { index: 5, nsrc: 3 }
        );
    }
}
