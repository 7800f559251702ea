//! Inverse trig that tolerates floating point round-off just past the edge
//! of its domain.

/// Arcsine with the argument clamped to `[-1, 1]`.
///
/// Products of unit quaternion components can land at `1.0000000000000002`,
/// which would make `f64::asin` return NaN.
pub fn asin(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}
