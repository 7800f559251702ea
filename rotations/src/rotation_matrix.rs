use super::*;
use crate::quaternion::{Quaternion, UnitQuaternion};
use nalgebra::{Matrix3, Vector3};
use std::ops::Mul;

/// A 3x3 direction cosine matrix taking body frame vectors into the inertial frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationMatrix(pub(crate) Matrix3<f64>);

impl RotationMatrix {
    pub fn get_value(&self) -> Matrix3<f64> {
        self.0
    }

    /// The inverse rotation, inertial to body.
    pub fn transpose(&self) -> RotationMatrix {
        RotationMatrix(self.0.transpose())
    }
}

impl From<&UnitQuaternion> for RotationMatrix {
    /// Converts a `UnitQuaternion` into a `RotationMatrix`.
    ///
    /// Uses the bilinear form with diagonal terms `e_i² + e0² - e_j² - e_k²`
    /// and off-diagonal terms `2(e_i e_j ± e_k e0)`.
    ///
    /// # Arguments
    ///
    /// * `q` - The attitude to be converted.
    ///
    /// # Returns
    ///
    /// The body to inertial rotation matrix.
    fn from(q: &UnitQuaternion) -> Self {
        let Quaternion { s: e0, x: e1, y: e2, z: e3 } = q.quaternion();

        let e11 = e1 * e1 + e0 * e0 - e2 * e2 - e3 * e3;
        let e12 = 2.0 * (e1 * e2 - e3 * e0);
        let e13 = 2.0 * (e1 * e3 + e2 * e0);
        let e21 = 2.0 * (e1 * e2 + e3 * e0);
        let e22 = e2 * e2 + e0 * e0 - e1 * e1 - e3 * e3;
        let e23 = 2.0 * (e2 * e3 - e1 * e0);
        let e31 = 2.0 * (e1 * e3 - e2 * e0);
        let e32 = 2.0 * (e2 * e3 + e1 * e0);
        let e33 = e3 * e3 + e0 * e0 - e1 * e1 - e2 * e2;

        RotationMatrix(Matrix3::new(
            e11, e12, e13, e21, e22, e23, e31, e32, e33,
        ))
    }
}

impl RotationTrait for RotationMatrix {
    /// Rotates a vector by the rotation matrix.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    /// Transforms a vector by the transpose of the rotation matrix.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0.transpose() * v
    }

    fn inv(&self) -> Self {
        self.transpose()
    }

    fn identity() -> Self {
        RotationMatrix(Matrix3::identity())
    }
}

impl Mul<RotationMatrix> for RotationMatrix {
    type Output = RotationMatrix;

    fn mul(self, rhs: RotationMatrix) -> RotationMatrix {
        RotationMatrix(self.0 * rhs.0)
    }
}
