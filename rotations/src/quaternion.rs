use super::*;
use crate::euler_angles::EulerAngles;
use crate::rotation_matrix::RotationMatrix;
use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg};
use thiserror::Error;

/// A quaternion passes as unit norm when its magnitude is within this of 1.0
pub const UNIT_NORM_TOL: f64 = 1e-9;

/// A scalar-first quaternion `[e0, e1, e2, e3]`.
///
/// This is the raw 4-vector used for ODE arithmetic (derivatives, sums,
/// scaling). Attitudes are carried as [`UnitQuaternion`].
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Errors that can occur when creating a `Quaternion`.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum QuaternionErrors {
    #[error("a quaternion has 4 components, got {0}")]
    InvalidDimension(usize),
    #[error("quaternion has non-finite magnitude {0}")]
    NonFiniteMagnitude(f64),
    #[error("quaternion has norm {0}, expected a unit quaternion")]
    NotUnitNorm(f64),
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
}

impl Quaternion {
    /// Creates an identity quaternion.
    ///
    /// # Returns
    ///
    /// A `Quaternion` representing no rotation.
    pub const IDENTITY: Self = Self { s: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    /// Creates a new `Quaternion`, scalar part first. No normalization is applied.
    ///
    /// # Arguments
    ///
    /// * `s` - The scalar component `e0`.
    /// * `x` - The first vector component `e1`.
    /// * `y` - The second vector component `e2`.
    /// * `z` - The third vector component `e3`.
    pub fn new(s: f64, x: f64, y: f64, z: f64) -> Self {
        Self { s, x, y, z }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.s, self.x, self.y, self.z]
    }

    /// The vector part `[e1, e2, e3]`.
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    // Dot product of two quaternions
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.s * other.s + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn mag(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Negates the vector part.
    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(self.s, -self.x, -self.y, -self.z)
    }

    /// Divides every component by the 2-norm.
    ///
    /// # Returns
    ///
    /// The normalized quaternion, or `ZeroMagnitude` if the norm vanishes.
    pub fn normalize(&self) -> Result<Self, QuaternionErrors> {
        let mag = self.mag();
        if !mag.is_finite() {
            return Err(QuaternionErrors::NonFiniteMagnitude(mag));
        }
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.s / mag,
            self.x / mag,
            self.y / mag,
            self.z / mag,
        ))
    }

    /// Time derivative of the attitude quaternion for a body angular rate.
    ///
    /// Computes `0.5 * Ω(ω) * q` with
    ///
    /// ```text
    ///      | 0  -p  -q  -r |
    /// Ω =  | p   0   r  -q |
    ///      | q  -r   0   p |
    ///      | r   q  -p   0 |
    /// ```
    ///
    /// # Arguments
    ///
    /// * `omega` - Angular velocity `[p, q, r]` expressed in the body frame (rad/s).
    pub fn rate(&self, omega: &Vector3<f64>) -> Quaternion {
        let (p, q, r) = (omega[0], omega[1], omega[2]);
        Quaternion::new(
            0.5 * (-p * self.x - q * self.y - r * self.z),
            0.5 * (p * self.s + r * self.y - q * self.z),
            0.5 * (q * self.s - r * self.x + p * self.z),
            0.5 * (r * self.s + q * self.x - p * self.y),
        )
    }
}

impl Default for Quaternion {
    /// Provides the default value for a quaternion.
    ///
    /// # Returns
    ///
    /// The identity quaternion.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Hamilton product.
    ///
    /// The scalar part is `s1 s2 - v1·v2` and the vector part is
    /// `s1 v2 + s2 v1 + v1 × v2`, so `R(a * b) = R(a) R(b)`.
    ///
    /// # Arguments
    ///
    /// * `rhs` - The right-hand side quaternion.
    ///
    /// # Returns
    ///
    /// The product of the two quaternions.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.s * rhs.s - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.s * rhs.x + rhs.s * self.x + self.y * rhs.z - self.z * rhs.y,
            self.s * rhs.y + rhs.s * self.y + self.z * rhs.x - self.x * rhs.z,
            self.s * rhs.z + rhs.s * self.z + self.x * rhs.y - self.y * rhs.x,
        )
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;

    /// Component-wise sum.
    /// NOTE: Quaternion addition does not compose attitudes, use the
    /// product for that. This is only for adding scaled derivatives to a
    /// quaternion state in the integrator.
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.s + rhs.s,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

impl AddAssign<&Quaternion> for Quaternion {
    fn add_assign(&mut self, rhs: &Self) {
        self.s += rhs.s;
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(
            self.s * rhs,
            self.x * rhs,
            self.y * rhs,
            self.z * rhs,
        )
    }
}

impl MulAssign<f64> for Quaternion {
    fn mul_assign(&mut self, rhs: f64) {
        self.s *= rhs;
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.s, -self.x, -self.y, -self.z)
    }
}

impl From<Vector4<f64>> for Quaternion {
    /// Reads a scalar-first 4-vector.
    fn from(q: Vector4<f64>) -> Self {
        Self { s: q[0], x: q[1], y: q[2], z: q[3] }
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(q: [f64; 4]) -> Self {
        Self { s: q[0], x: q[1], y: q[2], z: q[3] }
    }
}

impl TryFrom<&[f64]> for Quaternion {
    type Error = QuaternionErrors;

    fn try_from(value: &[f64]) -> Result<Self, QuaternionErrors> {
        match value {
            [s, x, y, z] => Ok(Quaternion::new(*s, *x, *y, *z)),
            _ => Err(QuaternionErrors::InvalidDimension(value.len())),
        }
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quaternion ")?;
        writeln!(f, "   s: {: >10.6}", self.s)?;
        writeln!(f, "   x: {: >10.6}", self.x)?;
        writeln!(f, "   y: {: >10.6}", self.y)?;
        writeln!(f, "   z: {: >10.6}", self.z)
    }
}

/// A quaternion known to have unit norm, i.e. an attitude.
///
/// The attitude maps the body frame onto the inertial frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(try_from = "Quaternion", into = "Quaternion")]
pub struct UnitQuaternion(pub(crate) Quaternion);

impl UnitQuaternion {
    pub const IDENTITY: Self = Self(Quaternion::IDENTITY);

    /// Creates a `UnitQuaternion` by normalizing the given components.
    pub fn new(s: f64, x: f64, y: f64, z: f64) -> Result<Self, QuaternionErrors> {
        Ok(Self(Quaternion::new(s, x, y, z).normalize()?))
    }

    /// Normalizes an arbitrary quaternion into an attitude.
    pub fn from_normalized(q: &Quaternion) -> Result<Self, QuaternionErrors> {
        Ok(Self(q.normalize()?))
    }

    pub fn quaternion(&self) -> Quaternion {
        self.0
    }

    pub fn rotation_matrix(&self) -> RotationMatrix {
        RotationMatrix::from(self)
    }

    pub fn euler_angles(&self) -> EulerAngles {
        EulerAngles::from(self)
    }

    /// Attitude derivative for a body angular rate, see [`Quaternion::rate`].
    pub fn rate(&self, omega: &Vector3<f64>) -> Quaternion {
        self.0.rate(omega)
    }
}

impl TryFrom<Quaternion> for UnitQuaternion {
    type Error = QuaternionErrors;

    /// Accepts the quaternion only if it already has unit norm.
    /// Use [`UnitQuaternion::from_normalized`] to normalize instead.
    fn try_from(value: Quaternion) -> Result<Self, QuaternionErrors> {
        let mag = value.mag();
        if !((mag - 1.0).abs() <= UNIT_NORM_TOL) {
            return Err(QuaternionErrors::NotUnitNorm(mag));
        }
        Ok(Self(value))
    }
}

impl From<UnitQuaternion> for Quaternion {
    fn from(value: UnitQuaternion) -> Self {
        value.0
    }
}

impl From<&UnitQuaternion> for Quaternion {
    fn from(value: &UnitQuaternion) -> Self {
        value.0
    }
}

impl RotationTrait for UnitQuaternion {
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation_matrix().rotate(v)
    }

    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation_matrix().transform(v)
    }

    fn identity() -> Self {
        Self::IDENTITY
    }

    fn inv(&self) -> Self {
        // conjugate of a unit quaternion is still unit, no need to renormalize
        UnitQuaternion(self.0.conjugate())
    }
}

impl Mul<UnitQuaternion> for UnitQuaternion {
    type Output = Self;

    /// Composes two attitudes, `rhs` is applied first.
    fn mul(self, rhs: UnitQuaternion) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Neg for UnitQuaternion {
    type Output = Self;

    /// Same attitude, other hemisphere of the double cover.
    fn neg(self) -> Self {
        Self(-self.0)
    }
}
