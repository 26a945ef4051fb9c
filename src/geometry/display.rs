//! Human-readable summaries of geometries.
//!
//! The default form prints one header line; the alternate form (`{:#}`) adds one line per
//! shot with its element count and timing.
use std::fmt;

use super::{
    in_core::InCoreGeometry, out_of_core::OutOfCoreGeometry, AcquisitionGeometry, Geometry,
};

fn write_shots(f: &mut fmt::Formatter<'_>, g: &impl AcquisitionGeometry) -> fmt::Result {
    for (i, nrec) in g.nrec().iter().enumerate() {
        writeln!(
            f,
            "  shot {i:>5}: nrec = {nrec:>6}, nt = {:>6}, dt = {:>8.4} ms, t = {:>10.3} ms, t0 = {:.3} ms",
            g.nt()[i],
            g.dt()[i],
            g.t()[i],
            g.t0()[i],
        )?;
    }
    Ok(())
}

impl fmt::Display for InCoreGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "InCoreGeometry: {} shots, {} samples",
            self.nsrc(),
            self.n_samples()
        )?;
        if f.alternate() {
            write_shots(f, self)?;
        }
        Ok(())
    }
}

impl fmt::Display for OutOfCoreGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OutOfCoreGeometry ({} / {}): {} shots, {} samples",
            self.key(),
            self.segy_depth_key(),
            self.nsrc(),
            self.n_samples()
        )?;
        if f.alternate() {
            write_shots(f, self)?;
        }
        Ok(())
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::InCore(g) => fmt::Display::fmt(g, f),
            Geometry::OutOfCore(g) => fmt::Display::fmt(g, f),
        }
    }
}
