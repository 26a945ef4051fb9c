mod common;

use std::sync::Arc;

use common::{assert_coords_close, assert_nt_consistent, synthetic_block};
use shotgeom::traces::{memory_scan::MemoryScan, TraceScan};
use shotgeom::{
    compare_geometry, get_nsrc, subsample, super_shot_geometry, AcquisitionGeometry, CoordInput,
    Geometry, GeometryError, GeometryKey, InCoreGeometry, OutOfCoreGeometry,
};

fn point_sources(dt: f64, t: f64) -> Result<InCoreGeometry, GeometryError> {
    InCoreGeometry::builder()
        .x(vec![0.0, 100.0, 200.0, 300.0])
        .y(vec![0.0; 4])
        .z(vec![6.0; 4])
        .dt(dt)
        .t(t)
        .build()
}

#[test]
fn test_nt_matches_duration_and_rate() {
    for (dt, t) in [(1.0, 1000.0), (2.0, 1000.0), (0.5, 3.0), (4.0, 4000.0), (0.25, 1.75)] {
        let g = point_sources(dt, t).unwrap();
        assert_nt_consistent(&g);
    }
}

#[test]
fn test_integer_and_float_timing_compare_equal() {
    let from_int: Geometry = InCoreGeometry::builder()
        .x(vec![0.0, 100.0])
        .y(vec![0.0, 0.0])
        .z(vec![6.0, 6.0])
        .dt(2_i32)
        .t(1000_i32)
        .build()
        .unwrap()
        .into();
    let from_float: Geometry = InCoreGeometry::builder()
        .x(vec![0.0_f32, 100.0])
        .y(vec![0.0_f32, 0.0])
        .z(vec![6.0_f32, 6.0])
        .dt(2.0)
        .t(1000.0)
        .build()
        .unwrap()
        .into();
    assert!(compare_geometry(&from_int, &from_float));
}

#[test]
fn test_inconsistent_timing_is_rejected() {
    assert!(matches!(
        point_sources(0.75, 70.0),
        Err(GeometryError::Configuration(_))
    ));

    let only_dt = InCoreGeometry::builder()
        .x(vec![0.0])
        .y(vec![0.0])
        .z(vec![0.0])
        .dt(0.75)
        .build();
    assert!(matches!(only_dt, Err(GeometryError::Configuration(_))));
}

#[test]
fn test_out_of_core_sample_count() {
    let block = synthetic_block(5, 24, 751, 4000);
    let scan: Arc<dyn TraceScan> = Arc::new(MemoryScan::new(block.clone()));
    let g = OutOfCoreGeometry::from_scan(scan.clone(), GeometryKey::Receiver, None).unwrap();

    let total: usize = g.nrec().iter().zip(g.nt()).map(|(n, nt)| n * nt).sum();
    assert_eq!(total, block.total_samples());
    assert_eq!(g.n_samples(), scan.total_samples());
    assert_eq!(g.nsrc(), 5);
}

#[test]
fn test_materialization_reproduces_direct_read() {
    let block = synthetic_block(3, 8, 501, 2000);
    let scan: Arc<dyn TraceScan> = Arc::new(MemoryScan::new(block.clone()));

    for (key, depth) in [
        (GeometryKey::Source, None),
        (GeometryKey::Source, Some("SourceDepth")),
        (GeometryKey::Receiver, None),
    ] {
        let ooc = OutOfCoreGeometry::from_scan(scan.clone(), key, depth).unwrap();
        let materialized = InCoreGeometry::from_out_of_core(&ooc).unwrap();
        let direct = InCoreGeometry::from_trace_block(&block, key, depth).unwrap();

        assert_eq!(materialized, direct);
        assert_coords_close(materialized.zloc(), direct.zloc(), 1e-6);
    }

    let rec = InCoreGeometry::from_trace_block(&block, GeometryKey::Receiver, None).unwrap();
    assert_coords_close(
        &vec![rec.xloc()[1].clone()],
        &vec![vec![50.0, 62.5, 75.0, 87.5, 100.0, 112.5, 125.0, 137.5]],
        1e-5,
    );
    assert_coords_close(&vec![rec.zloc()[0].clone()], &vec![vec![-12.0; 8]], 1e-6);
}

#[test]
fn test_subsample_selects_logical_shots() {
    let g: Geometry = InCoreGeometry::builder()
        .x(vec![0.0, 100.0, 200.0, 300.0])
        .y(vec![0.0; 4])
        .z(vec![1.0, 2.0, 3.0, 4.0])
        .dt(vec![1.0, 2.0, 1.0, 2.0])
        .t(100.0)
        .t0(vec![0.0, 0.0, 5.0, 0.0])
        .build()
        .unwrap()
        .into();

    let one = subsample(&g, 2).unwrap();
    assert_eq!(get_nsrc(&one), 1);
    let shot = one.shot(0).unwrap();
    assert_eq!(shot, g.shot(2).unwrap());
    assert_eq!(one.t0(), &[5.0]);

    let first_two = g.subsample(0..2).unwrap();
    let expected: Geometry = InCoreGeometry::builder()
        .x(vec![0.0, 100.0])
        .y(vec![0.0; 2])
        .z(vec![1.0, 2.0])
        .dt(vec![1.0, 2.0])
        .t(100.0)
        .build()
        .unwrap()
        .into();
    assert!(compare_geometry(&first_two, &expected));
    assert_eq!(get_nsrc(&g), 4);
}

#[test]
fn test_subsample_out_of_core() {
    let scan: Arc<dyn TraceScan> = Arc::new(MemoryScan::new(synthetic_block(4, 6, 201, 4000)));
    let g: Geometry = OutOfCoreGeometry::from_scan(scan, GeometryKey::Receiver, None)
        .unwrap()
        .into();

    let sub = g.subsample([3, 1]).unwrap();
    assert!(!sub.is_in_core());
    assert_eq!(sub.nsrc(), 2);
    assert_eq!(sub.shot(0).unwrap(), g.shot(3).unwrap());
    assert_eq!(sub.shot(1).unwrap(), g.shot(1).unwrap());
    assert!(compare_geometry(&g.subsample(0..4).unwrap(), &g));
}

#[test]
fn test_comparison_reflexive_and_across_shapes() {
    let g: Geometry = point_sources(2.0, 1000.0).unwrap().into();
    assert!(compare_geometry(&g, &g));

    let scan: Arc<dyn TraceScan> = Arc::new(MemoryScan::new(synthetic_block(3, 5, 301, 1000)));
    for key in [GeometryKey::Source, GeometryKey::Receiver] {
        let ooc: Geometry = OutOfCoreGeometry::from_scan(scan.clone(), key, None)
            .unwrap()
            .into();
        assert!(compare_geometry(&ooc, &ooc));
        let in_core: Geometry = ooc.to_in_core().unwrap().into();
        assert!(compare_geometry(&ooc, &in_core));
        assert!(compare_geometry(&in_core, &ooc));
    }

    let other: Geometry = point_sources(1.0, 1000.0).unwrap().into();
    assert!(!compare_geometry(&g, &other));
}

#[test]
fn test_super_shot_union() {
    let g: Geometry = InCoreGeometry::builder()
        .x(CoordInput::grouped(&[vec![1.0_f64, 2.0], vec![0.5, 1.75]]))
        .y(CoordInput::grouped(&[vec![0.0_f64], vec![0.0]]))
        .z(CoordInput::grouped(&[vec![0.0_f64, 0.0], vec![0.0, 0.0]]))
        .dt(vec![2.0, 2.0])
        .t(vec![1000.0, 1000.0])
        .build()
        .unwrap()
        .into();

    let merged = super_shot_geometry(&g).unwrap();
    let m = merged.as_in_core().unwrap();
    assert_eq!(m.nsrc(), 1);
    assert_eq!(m.xloc(), &vec![vec![0.5, 1.0, 1.75, 2.0]]);
    assert_eq!(m.yloc(), &vec![vec![0.0]]);
    assert_eq!(m.zloc(), &vec![vec![0.0; 4]]);
    assert_eq!(m.dt()[0], g.dt()[0]);
    assert_eq!(m.t()[0], g.t()[0]);
}

#[test]
fn test_super_shot_of_single_shot() {
    let g: Geometry = InCoreGeometry::builder()
        .x(vec![2.0, 1.0])
        .y(0.0)
        .z(vec![0.0, 3.0])
        .nsrc(1)
        .dt(1.0)
        .t(10.0)
        .build()
        .unwrap()
        .into();
    let merged = super_shot_geometry(&g).unwrap();
    assert!(compare_geometry(&merged, &g));
    assert_eq!(merged.nsrc(), 1);
}

#[test]
fn test_super_shot_out_of_core() {
    let block = synthetic_block(3, 8, 101, 4000);
    let scan: Arc<dyn TraceScan> = Arc::new(MemoryScan::new(block));
    let g: Geometry = OutOfCoreGeometry::from_scan(scan, GeometryKey::Receiver, None)
        .unwrap()
        .into();

    let merged = g.super_shot().unwrap();
    assert!(merged.is_in_core());
    // 3 shots every 50 m, 8 receivers every 12.5 m: overlapping spreads from 0 to 187.5 m
    assert_eq!(merged.nrec(), vec![16]);
    assert_eq!(merged.shot(0).unwrap().x.last(), Some(&187.5));
    assert_eq!(merged.nt(), &[101]);
}
