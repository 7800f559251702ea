pub mod euler_angles;
pub mod quaternion;
pub mod rotation_matrix;
pub mod trig;

use nalgebra::Vector3;

pub mod prelude {
    pub use crate::RotationTrait;
    pub use crate::euler_angles::*;
    pub use crate::quaternion::*;
    pub use crate::rotation_matrix::*;
}

/// Trait defining rotation and transformation operations.
///
/// An attitude describes the orientation of the body frame relative to the
/// inertial (earth) frame. `rotate` carries a vector expressed in the body
/// frame into the inertial frame, `transform` does the opposite.
pub trait RotationTrait {
    /// Rotates a body frame vector into the inertial frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The body frame vector.
    ///
    /// # Returns
    ///
    /// The same vector expressed in the inertial frame.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64>;

    /// Transforms an inertial frame vector into the body frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The inertial frame vector.
    ///
    /// # Returns
    ///
    /// The same vector expressed in the body frame.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64>;

    fn inv(&self) -> Self;

    fn identity() -> Self;
}
