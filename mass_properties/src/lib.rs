use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Off-diagonal inertia terms smaller than this are treated as zero
pub const DIAGONAL_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum MassPropertiesErrors {
    #[error("Ixx must be positive and finite, got {0}")]
    IxxLessThanOrEqualToZero(f64),
    #[error("Iyy must be positive and finite, got {0}")]
    IyyLessThanOrEqualToZero(f64),
    #[error("Izz must be positive and finite, got {0}")]
    IzzLessThanOrEqualToZero(f64),
    #[error("mass must be positive and finite, got {0}")]
    MassLessThanOrEqualToZero(f64),
    #[error("inertia tensor must be diagonal, element ({0}, {1}) is {2}")]
    NotDiagonal(usize, usize, f64),
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Principal moments of inertia about the body axes (kg m^2).
///
/// Products of inertia are not representable, so the tensor is diagonal
/// for the life of the value and its inverse is the reciprocal diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Inertia {
    ixx: f64,
    iyy: f64,
    izz: f64,
}

impl Inertia {
    pub fn new(ixx: f64, iyy: f64, izz: f64) -> Result<Self, MassPropertiesErrors> {
        if !is_positive(ixx) {
            return Err(MassPropertiesErrors::IxxLessThanOrEqualToZero(ixx));
        }
        if !is_positive(iyy) {
            return Err(MassPropertiesErrors::IyyLessThanOrEqualToZero(iyy));
        }
        if !is_positive(izz) {
            return Err(MassPropertiesErrors::IzzLessThanOrEqualToZero(izz));
        }
        Ok(Self { ixx, iyy, izz })
    }

    pub fn ixx(&self) -> f64 {
        self.ixx
    }

    pub fn iyy(&self) -> f64 {
        self.iyy
    }

    pub fn izz(&self) -> f64 {
        self.izz
    }

    pub fn diagonal(&self) -> Vector3<f64> {
        Vector3::new(self.ixx, self.iyy, self.izz)
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.diagonal())
    }

    pub fn inverse(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(
            1.0 / self.ixx,
            1.0 / self.iyy,
            1.0 / self.izz,
        ))
    }

    /// Angular momentum `I ω` for a body rate.
    pub fn momentum(&self, omega: &Vector3<f64>) -> Vector3<f64> {
        self.matrix() * omega
    }

    /// Euler's rigid body equation, `α = I⁻¹ (M - ω × (I ω))`.
    ///
    /// # Arguments
    ///
    /// * `moment` - Net moment about the centre of mass, body frame (N m).
    /// * `omega` - Body angular velocity (rad/s).
    ///
    /// # Returns
    ///
    /// The body angular acceleration (rad/s^2).
    pub fn angular_acceleration(&self, moment: &Vector3<f64>, omega: &Vector3<f64>) -> Vector3<f64> {
        let gyroscopic = omega.cross(&self.momentum(omega));
        self.inverse() * (moment - gyroscopic)
    }
}

impl TryFrom<Matrix3<f64>> for Inertia {
    type Error = MassPropertiesErrors;

    fn try_from(m: Matrix3<f64>) -> Result<Self, MassPropertiesErrors> {
        for row in 0..3 {
            for col in 0..3 {
                if row != col && !(m[(row, col)].abs() <= DIAGONAL_TOL) {
                    return Err(MassPropertiesErrors::NotDiagonal(row, col, m[(row, col)]));
                }
            }
        }
        Inertia::new(m[(0, 0)], m[(1, 1)], m[(2, 2)])
    }
}

impl TryFrom<[f64; 3]> for Inertia {
    type Error = MassPropertiesErrors;

    fn try_from(value: [f64; 3]) -> Result<Self, MassPropertiesErrors> {
        Inertia::new(value[0], value[1], value[2])
    }
}

impl From<Inertia> for [f64; 3] {
    fn from(inertia: Inertia) -> [f64; 3] {
        [inertia.ixx, inertia.iyy, inertia.izz]
    }
}

/// Represents the mass properties of a rigid body about its centre of mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MassPropertiesBuilder")]
pub struct MassProperties {
    mass: f64,
    inertia: Inertia,
}

/// Unvalidated mass properties as read from configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MassPropertiesBuilder {
    pub mass: f64,
    pub inertia: Inertia,
}

impl TryFrom<MassPropertiesBuilder> for MassProperties {
    type Error = MassPropertiesErrors;

    fn try_from(builder: MassPropertiesBuilder) -> Result<Self, MassPropertiesErrors> {
        MassProperties::new(builder.mass, builder.inertia)
    }
}

impl MassProperties {
    pub fn new(mass: f64, inertia: Inertia) -> Result<Self, MassPropertiesErrors> {
        if !is_positive(mass) {
            return Err(MassPropertiesErrors::MassLessThanOrEqualToZero(mass));
        }
        Ok(MassProperties { mass, inertia })
    }

    /// Mass plus the three principal moments.
    pub fn from_principal(
        mass: f64,
        ixx: f64,
        iyy: f64,
        izz: f64,
    ) -> Result<Self, MassPropertiesErrors> {
        MassProperties::new(mass, Inertia::new(ixx, iyy, izz)?)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inertia(&self) -> &Inertia {
        &self.inertia
    }
}
