use crate::quaternion::{Quaternion, UnitQuaternion};
use crate::trig;
use serde::{Deserialize, Serialize};

/// Yaw-pitch-roll angles in radians, applied in the ZYX sequence.
///
/// The body frame is reached from the inertial frame by yawing about Z,
/// then pitching about the new Y, then rolling about the resulting X.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

impl From<&UnitQuaternion> for EulerAngles {
    /// Decomposes an attitude into ZYX angles.
    ///
    /// Pitch comes from an arcsine whose argument is clamped to `[-1, 1]`,
    /// so attitudes at (or numerically just past) ±90° pitch still produce
    /// finite angles. Roll and yaw are not unique there.
    fn from(q: &UnitQuaternion) -> Self {
        let Quaternion { s: e0, x: e1, y: e2, z: e3 } = q.quaternion();

        let roll = (2.0 * (e0 * e1 + e2 * e3)).atan2(e0 * e0 + e3 * e3 - e1 * e1 - e2 * e2);
        let pitch = trig::asin(2.0 * (e0 * e2 - e1 * e3));
        let yaw = (2.0 * (e0 * e3 + e1 * e2)).atan2(e0 * e0 + e1 * e1 - e2 * e2 - e3 * e3);

        EulerAngles { roll, pitch, yaw }
    }
}

impl From<&EulerAngles> for UnitQuaternion {
    /// Builds the attitude for a ZYX angle set.
    fn from(euler: &EulerAngles) -> Self {
        let (sr, cr) = (euler.roll / 2.0).sin_cos();
        let (sp, cp) = (euler.pitch / 2.0).sin_cos();
        let (sy, cy) = (euler.yaw / 2.0).sin_cos();

        // product of three unit half-angle rotations is already unit norm
        UnitQuaternion(Quaternion::new(
            cy * cp * cr + sy * sp * sr,
            cy * cp * sr - sy * sp * cr,
            cy * sp * cr + sy * cp * sr,
            sy * cp * cr - cy * sp * sr,
        ))
    }
}
