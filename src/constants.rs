//! # Constants and type definitions for shotgeom
//!
//! This module centralizes the **type aliases**, **unit conversions**, and **default header
//! names** used throughout the crate.
//!
//! ## Overview
//!
//! - Precision of stored coordinates and timings (always 32-bit floats)
//! - Unit conversions (microseconds ↔ milliseconds)
//! - Default depth header names for source and receiver geometries
//! - Numeric tolerance of the time-axis consistency check

use crate::traces::HeaderField;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// A position along one axis, in the unit of the survey (usually meters)
pub type Coord = f32;

/// A time value in milliseconds
pub type Millis = f32;

/// A time value in microseconds (SEG-Y sample interval unit)
pub type Micros = f64;

/// Positions of every element of every shot along one axis.
///
/// The outer vector is indexed by shot, the inner vector by element
/// (one element for a point source, N for a receiver spread).
pub type CoordList = Vec<Vec<Coord>>;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Microseconds → milliseconds
pub const US_TO_MS: f64 = 1e-3;

// -------------------------------------------------------------------------------------------------
// Defaults and tolerances
// -------------------------------------------------------------------------------------------------

/// Depth header read for source geometries when the caller does not name one
pub const DEFAULT_SOURCE_DEPTH_KEY: HeaderField = HeaderField::SourceSurfaceElevation;

/// Depth header read for receiver geometries when the caller does not name one
pub const DEFAULT_RECEIVER_DEPTH_KEY: HeaderField = HeaderField::RecGroupElevation;

/// Maximum distance between `t / dt` and the nearest integer, in units of `dt`,
/// for a `(dt, t)` pair to be considered consistent.
pub const TIME_AXIS_TOLERANCE: f64 = 1e-4;
