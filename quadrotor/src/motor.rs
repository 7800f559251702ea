use frames::{Frame, FrameErrors, FrameVector, Kind};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_K_F: f64 = 3.13e-5; // N s^2
pub const DEFAULT_K_M: f64 = 7.5e-7; // N m s^2
pub const DEFAULT_RATE_RANGE: (f64, f64) = (0.0, 600.0); // rad/s

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum MotorErrors {
    #[error("{0}")]
    FrameErrors(#[from] FrameErrors),
    #[error("rate range must satisfy 0 <= min < max, got ({0}, {1})")]
    InvalidRateRange(f64, f64),
    #[error("thrust coefficient must be positive and finite, got {0}")]
    ThrustCoefficientNotPositive(f64),
    #[error("torque coefficient must be positive and finite, got {0}")]
    TorqueCoefficientNotPositive(f64),
}

/// Sense of propeller rotation about the body +Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinDirection {
    Positive,
    Negative,
}

impl SpinDirection {
    pub fn sign(&self) -> f64 {
        match self {
            SpinDirection::Positive => 1.0,
            SpinDirection::Negative => -1.0,
        }
    }

    /// Spin of the `i`th rotor when directions alternate starting positive.
    pub fn alternating(i: usize) -> Self {
        if i % 2 == 0 {
            SpinDirection::Positive
        } else {
            SpinDirection::Negative
        }
    }
}

fn default_k_f() -> f64 {
    DEFAULT_K_F
}

fn default_k_m() -> f64 {
    DEFAULT_K_M
}

fn default_rate_range() -> (f64, f64) {
    DEFAULT_RATE_RANGE
}

/// Aerodynamic coefficients and rate limits shared by motors of one type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorParameters {
    /// Thrust coefficient, thrust = k_f ω².
    #[serde(default = "default_k_f")]
    pub k_f: f64,
    /// Reaction torque coefficient, torque = k_m ω².
    #[serde(default = "default_k_m")]
    pub k_m: f64,
    /// Advisory `(min, max)` rotor rate in rad/s.
    #[serde(default = "default_rate_range")]
    pub rate_range: (f64, f64),
}

impl Default for MotorParameters {
    fn default() -> Self {
        Self {
            k_f: DEFAULT_K_F,
            k_m: DEFAULT_K_M,
            rate_range: DEFAULT_RATE_RANGE,
        }
    }
}

impl MotorParameters {
    pub fn new(k_f: f64, k_m: f64, rate_range: (f64, f64)) -> Result<Self, MotorErrors> {
        let parameters = Self {
            k_f,
            k_m,
            rate_range,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn validate(&self) -> Result<(), MotorErrors> {
        if !(self.k_f.is_finite() && self.k_f > 0.0) {
            return Err(MotorErrors::ThrustCoefficientNotPositive(self.k_f));
        }
        if !(self.k_m.is_finite() && self.k_m > 0.0) {
            return Err(MotorErrors::TorqueCoefficientNotPositive(self.k_m));
        }
        let (min, max) = self.rate_range;
        if !(min >= 0.0 && max > min && max.is_finite()) {
            return Err(MotorErrors::InvalidRateRange(min, max));
        }
        Ok(())
    }
}

/// A fixed pitch propeller and motor mounted on the airframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    position: FrameVector,
    spin: SpinDirection,
    parameters: MotorParameters,
}

impl Motor {
    /// Creates a motor.
    ///
    /// # Arguments
    ///
    /// * `position` - Body fixed mounting point relative to the centre of mass.
    /// * `spin` - Propeller rotation sense about body +Z.
    /// * `k_f` - Thrust coefficient.
    /// * `k_m` - Reaction torque coefficient.
    /// * `rate_range` - `(min, max)` rotor rate used by [`Motor::govern`].
    pub fn new(
        position: FrameVector,
        spin: SpinDirection,
        k_f: f64,
        k_m: f64,
        rate_range: (f64, f64),
    ) -> Result<Self, MotorErrors> {
        Self::with_parameters(position, spin, MotorParameters::new(k_f, k_m, rate_range)?)
    }

    pub fn with_defaults(position: FrameVector, spin: SpinDirection) -> Result<Self, MotorErrors> {
        Self::with_parameters(position, spin, MotorParameters::default())
    }

    pub fn with_parameters(
        position: FrameVector,
        spin: SpinDirection,
        parameters: MotorParameters,
    ) -> Result<Self, MotorErrors> {
        parameters.validate()?;
        let position = position.require(Frame::BodyFixed, Kind::Position)?;
        Ok(Self {
            position,
            spin,
            parameters,
        })
    }

    pub fn position(&self) -> FrameVector {
        self.position
    }

    pub fn spin(&self) -> SpinDirection {
        self.spin
    }

    pub fn parameters(&self) -> &MotorParameters {
        &self.parameters
    }

    /// Thrust and reaction torque at a rotor rate, both body fixed.
    ///
    /// Thrust points along body -Z with magnitude `k_f ω²`. The reaction
    /// torque acts about body Z with magnitude `k_m ω²` and the sign of the
    /// spin direction. The rate is not checked against the rate range.
    pub fn compute_forces(&self, rate: f64) -> (FrameVector, FrameVector) {
        let rate_squared = rate * rate;
        let thrust = FrameVector::new(
            Frame::BodyFixed,
            Kind::Force,
            Vector3::new(0.0, 0.0, -self.parameters.k_f * rate_squared),
        );
        let torque = FrameVector::new(
            Frame::BodyFixed,
            Kind::Moment,
            Vector3::new(0.0, 0.0, self.spin.sign() * self.parameters.k_m * rate_squared),
        );
        (thrust, torque)
    }

    /// Clamps a commanded rate into the motor's rate range.
    pub fn govern(&self, rate: f64) -> f64 {
        let (min, max) = self.parameters.rate_range;
        let governed = rate.clamp(min, max);
        if governed != rate {
            warn!(commanded = rate, governed, "rotor rate outside motor range");
        }
        governed
    }
}
