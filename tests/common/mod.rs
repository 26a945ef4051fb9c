#![allow(dead_code)]

use approx::assert_relative_eq;
use shotgeom::traces::{TraceBlock, TraceHeader};
use shotgeom::{AcquisitionGeometry, CoordList};

/// A marine-like survey: `nsrc` shots every 50 m, each recorded by `nrec` receivers every
/// 12.5 m, positions stored in centimeters (scalar -100).
pub fn synthetic_block(nsrc: i32, nrec: i32, ns: u16, dt_us: u16) -> TraceBlock {
    let mut headers = Vec::new();
    let mut data = Vec::new();
    for s in 0..nsrc {
        for r in 0..nrec {
            headers.push(TraceHeader {
                field_record: 1000 + s,
                source_x: 5000 * s,
                source_y: 0,
                group_x: 5000 * s + 1250 * r,
                group_y: 0,
                source_surface_elevation: -600,
                rec_group_elevation: -1200,
                source_depth: 600,
                elevation_scalar: -100,
                rec_source_scalar: -100,
                ns,
                dt: dt_us,
                ..Default::default()
            });
            data.push(vec![0.0_f32; usize::from(ns)]);
        }
    }
    TraceBlock::new(headers, data).unwrap()
}

pub fn assert_coords_close(actual: &CoordList, expected: &CoordList, epsilon: f32) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_eq!(a.len(), e.len());
        for (a, e) in a.iter().zip(e) {
            assert_relative_eq!(*a, *e, epsilon = epsilon);
        }
    }
}

pub fn assert_nt_consistent(g: &impl AcquisitionGeometry) {
    for i in 0..g.nsrc() {
        assert_eq!(
            g.nt()[i],
            (g.t()[i] / g.dt()[i]).round() as usize + 1,
            "shot {i}"
        );
    }
}
