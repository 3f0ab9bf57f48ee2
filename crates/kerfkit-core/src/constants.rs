//! Numeric constants shared across the geometry and compiler crates.

/// Values closer to zero than this are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Default tolerance for endpoint matching and closure checks (drawing units).
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Default chord tolerance used when curves must be approximated by points.
pub const DEFAULT_TESSELLATION_TOLERANCE: f64 = 0.01;

/// Upper bound on points generated for a single curve.
pub const MAX_TESSELLATION_SEGMENTS: usize = 4096;
