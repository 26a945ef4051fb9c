//! Super-shot merge: every shot of a geometry folded into a single synthesized shot, used
//! to approximate simultaneous-source acquisition.
//!
//! The merged shot holds the union of all `(x, z)` positions, deduplicated on `x` (first
//! occurrence wins) and sorted by ascending `x`. `y` and the timing come from the first
//! shot.
use itertools::Itertools;
use ordered_float::OrderedFloat;
use tracing::debug;

use super::{in_core::InCoreGeometry, AcquisitionGeometry, Geometry, ShotGeometry};
use crate::constants::Coord;
use crate::geometry_errors::GeometryError;

/// Merge every shot of `geometry` into one.
///
/// An out-of-core geometry is materialized first; the result is always in-core with a
/// single shot. A single-shot geometry is returned unchanged.
///
/// Errors
/// ----------
/// * Archive read errors when materializing an out-of-core geometry.
/// * [`GeometryError::Configuration`] if the first shot's `y` holds several distinct values
///   and its length differs from the number of merged elements. A single shared value is
///   kept as is (2D convention); a list matching the merged elements is kept element-wise.
pub fn super_shot_geometry(geometry: &Geometry) -> Result<Geometry, GeometryError> {
    let in_core = geometry.to_in_core()?;
    if in_core.nsrc() == 1 {
        return Ok(Geometry::InCore(in_core));
    }

    let (x, z): (Vec<Coord>, Vec<Coord>) = in_core
        .xloc()
        .iter()
        .flatten()
        .zip(in_core.zloc().iter().flatten())
        .map(|(&x, &z)| (x, z))
        .sorted_by_key(|&(x, _)| OrderedFloat(x))
        .dedup_by(|a, b| a.0 == b.0)
        .unzip();

    let first_y = &in_core.yloc()[0];
    let y = match first_y.iter().all_equal_value() {
        Ok(&y) => vec![y],
        Err(_) if first_y.len() == x.len() => first_y.clone(),
        Err(_) => {
            return Err(GeometryError::config(format!(
                "super-shot merge keeps the y of the first shot, but its {} values fit neither \
                 one shared position nor the {} merged elements",
                first_y.len(),
                x.len()
            )))
        }
    };

    debug!(
        nsrc = in_core.nsrc(),
        nrec = x.len(),
        "merged geometry into a super-shot"
    );

    let merged = ShotGeometry {
        x,
        y,
        z,
        timing: in_core.timing(0)?,
    };
    Ok(Geometry::InCore(InCoreGeometry::from_shots(vec![merged])?))
}

impl Geometry {
    /// See [`super_shot_geometry`].
    pub fn super_shot(&self) -> Result<Geometry, GeometryError> {
        super_shot_geometry(self)
    }
}

#[cfg(test)]
mod super_shot_test {
    use super::*;
    use crate::coordinates::CoordInput;
    use crate::geometry::compare_geometry;

    fn two_shots() -> Geometry {
        InCoreGeometry::builder()
            .x(CoordInput::grouped(&[vec![1.0_f64, 2.0], vec![0.5, 1.75]]))
            .y(CoordInput::grouped(&[vec![0.0_f64], vec![0.0]]))
            .z(CoordInput::grouped(&[vec![0.0_f64, 0.0], vec![0.0, 0.0]]))
            .dt(vec![1.0, 1.0])
            .t(vec![100.0, 100.0])
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn test_merge_two_shots() {
        let merged = super_shot_geometry(&two_shots()).unwrap();
        let g = merged.as_in_core().unwrap();
        assert_eq!(g.nsrc(), 1);
        assert_eq!(g.xloc(), &vec![vec![0.5, 1.0, 1.75, 2.0]]);
        assert_eq!(g.yloc(), &vec![vec![0.0]]);
        assert_eq!(g.zloc(), &vec![vec![0.0, 0.0, 0.0, 0.0]]);
        assert_eq!(g.dt(), &[1.0]);
        assert_eq!(g.t(), &[100.0]);
    }

    #[test]
    fn test_merge_deduplicates_first_wins() {
        let g: Geometry = InCoreGeometry::builder()
            .x(vec![3.0, 1.0, 3.0])
            .y(vec![0.0, 0.0, 0.0])
            .z(vec![10.0, 20.0, 30.0])
            .dt(2.0)
            .nt(11_usize)
            .build()
            .unwrap()
            .into();
        let merged = g.super_shot().unwrap();
        let m = merged.as_in_core().unwrap();
        assert_eq!(m.xloc()[0], vec![1.0, 3.0]);
        assert_eq!(m.zloc()[0], vec![20.0, 10.0]);
        assert_eq!(m.nt(), &[11]);
    }

    #[test]
    fn test_single_shot_unchanged() {
        let g = two_shots().subsample(1).unwrap();
        let merged = super_shot_geometry(&g).unwrap();
        assert!(compare_geometry(&merged, &g));
    }

    #[test]
    fn test_first_shot_y_list_kept() {
        let g: Geometry = InCoreGeometry::builder()
            .x(CoordInput::grouped(&[vec![2.0_f64, 1.0], vec![1.0, 2.0]]))
            .y(CoordInput::grouped(&[vec![0.0_f64, 5.0], vec![0.0, 5.0]]))
            .z(CoordInput::grouped(&[vec![0.0_f64, 0.0], vec![0.0, 0.0]]))
            .dt(1.0)
            .t(10.0)
            .build()
            .unwrap()
            .into();
        let merged = super_shot_geometry(&g).unwrap();
        let m = merged.as_in_core().unwrap();
        assert_eq!(m.xloc(), &vec![vec![1.0, 2.0]]);
        assert_eq!(m.yloc(), &vec![vec![0.0, 5.0]]);
    }

    #[test]
    fn test_conflicting_y() {
        let g: Geometry = InCoreGeometry::builder()
            .x(CoordInput::grouped(&[vec![1.0_f64, 2.0], vec![3.0]]))
            .y(CoordInput::grouped(&[vec![0.0_f64, 5.0], vec![0.0]]))
            .z(CoordInput::grouped(&[vec![0.0_f64, 0.0], vec![0.0]]))
            .dt(1.0)
            .t(10.0)
            .build()
            .unwrap()
            .into();
        assert!(matches!(
            super_shot_geometry(&g),
            Err(GeometryError::Configuration(_))
        ));
    }
}
