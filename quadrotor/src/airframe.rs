use crate::motor::{Motor, MotorErrors, MotorParameters, SpinDirection};
use frames::{Frame, FrameErrors, FrameVector, Kind};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, fmt};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ROTORS: usize = 4;
pub const DEFAULT_ARM_LENGTH: f64 = 0.30; // m

/// Layout components smaller than this are set to exactly zero.
pub const LAYOUT_SNAP_TOL: f64 = 1e-15;

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum AirframeErrors {
    #[error("{0}")]
    FrameErrors(#[from] FrameErrors),
    #[error("{0}")]
    MotorErrors(#[from] MotorErrors),
    #[error("arm length must be positive and finite, got {0}")]
    NonPositiveArmLength(f64),
    #[error("expected one rate per rotor ({expected}), got {found}")]
    RateCount { expected: usize, found: usize },
    #[error("an airframe needs at least 2 rotors, got {0}")]
    TooFewRotors(usize),
}

/// Motors evenly spaced on a circle in the body X-Y plane.
///
/// Motor `i` of `n` sits at angle `2πi/n` counter-clockwise from body +X,
/// with spin directions alternating from positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Airframe {
    arm_length: f64,
    motors: Vec<Motor>,
}

impl Airframe {
    pub fn new(rotor_count: usize, arm_length: f64) -> Result<Self, AirframeErrors> {
        Self::with_parameters(rotor_count, arm_length, MotorParameters::default())
    }

    /// Lays out `rotor_count` identical motors.
    ///
    /// # Arguments
    ///
    /// * `rotor_count` - Number of rotors, at least 2.
    /// * `arm_length` - Distance from the centre of mass to each rotor (m).
    /// * `parameters` - Coefficients shared by every motor.
    pub fn with_parameters(
        rotor_count: usize,
        arm_length: f64,
        parameters: MotorParameters,
    ) -> Result<Self, AirframeErrors> {
        if rotor_count < 2 {
            return Err(AirframeErrors::TooFewRotors(rotor_count));
        }
        if !(arm_length.is_finite() && arm_length > 0.0) {
            return Err(AirframeErrors::NonPositiveArmLength(arm_length));
        }

        let motors = (0..rotor_count)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / rotor_count as f64;
                let position = FrameVector::new(
                    Frame::BodyFixed,
                    Kind::Position,
                    snap(Vector3::new(
                        arm_length * angle.cos(),
                        arm_length * angle.sin(),
                        0.0,
                    )),
                );
                Motor::with_parameters(position, SpinDirection::alternating(i), parameters)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let airframe = Self { arm_length, motors };
        debug!(rotors = rotor_count, arm_length, "created airframe\n{airframe}");
        Ok(airframe)
    }

    pub fn arm_length(&self) -> f64 {
        self.arm_length
    }

    pub fn rotor_count(&self) -> usize {
        self.motors.len()
    }

    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    fn check_rates(&self, rates: &[f64]) -> Result<(), AirframeErrors> {
        if rates.len() != self.motors.len() {
            return Err(AirframeErrors::RateCount {
                expected: self.motors.len(),
                found: rates.len(),
            });
        }
        Ok(())
    }

    /// Clamps each commanded rate into its motor's range.
    pub fn govern(&self, rates: &[f64]) -> Result<Vec<f64>, AirframeErrors> {
        self.check_rates(rates)?;
        Ok(self
            .motors
            .iter()
            .zip(rates)
            .map(|(motor, rate)| motor.govern(*rate))
            .collect())
    }

    /// Net body fixed force and moment about the centre of mass.
    ///
    /// The force is the sum of the thrusts. The moment sums each reaction
    /// torque and the moment of each thrust about the centre of mass,
    /// `M = Σ (τᵢ + rᵢ × Tᵢ)`.
    ///
    /// # Arguments
    ///
    /// * `rates` - One rotor rate per motor, in motor order (rad/s).
    ///
    /// # Returns
    ///
    /// `(force, moment)`, both body fixed.
    pub fn loads(&self, rates: &[f64]) -> Result<(FrameVector, FrameVector), AirframeErrors> {
        self.check_rates(rates)?;

        let mut force = FrameVector::zeros(Frame::BodyFixed, Kind::Force);
        let mut moment = FrameVector::zeros(Frame::BodyFixed, Kind::Moment);
        for (motor, rate) in self.motors.iter().zip(rates) {
            let (thrust, torque) = motor.compute_forces(*rate);
            force = force.checked_add(&thrust)?;
            moment = moment
                .checked_add(&torque)?
                .checked_add(&motor.position().cross_physical(&thrust)?)?;
        }
        Ok((force, moment))
    }
}

fn snap(v: Vector3<f64>) -> Vector3<f64> {
    v.map(|x| if x.abs() < LAYOUT_SNAP_TOL { 0.0 } else { x })
}

impl fmt::Display for Airframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, motor) in self.motors.iter().enumerate() {
            let r = motor.position().vector();
            writeln!(
                f,
                "motor {i}: [{:.4}, {:.4}, {:.4}] {:?}",
                r[0],
                r[1],
                r[2],
                motor.spin()
            )?;
        }
        Ok(())
    }
}

fn default_rotors() -> usize {
    DEFAULT_ROTORS
}

fn default_arm_length() -> f64 {
    DEFAULT_ARM_LENGTH
}

/// Serializable airframe description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirframeBuilder {
    #[serde(default = "default_rotors")]
    pub rotors: usize,
    #[serde(default = "default_arm_length")]
    pub arm_length: f64,
    #[serde(default)]
    pub motor: MotorParameters,
}

impl Default for AirframeBuilder {
    fn default() -> Self {
        Self {
            rotors: DEFAULT_ROTORS,
            arm_length: DEFAULT_ARM_LENGTH,
            motor: MotorParameters::default(),
        }
    }
}

impl AirframeBuilder {
    pub fn new(rotors: usize, arm_length: f64) -> Self {
        Self {
            rotors,
            arm_length,
            motor: MotorParameters::default(),
        }
    }

    pub fn with_motor(mut self, motor: MotorParameters) -> Self {
        self.motor = motor;
        self
    }

    pub fn build(&self) -> Result<Airframe, AirframeErrors> {
        Airframe::with_parameters(self.rotors, self.arm_length, self.motor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_quad_layout() {
        let airframe = Airframe::new(4, 0.3).unwrap();
        let expected = [
            [0.3, 0.0, 0.0],
            [0.0, 0.3, 0.0],
            [-0.3, 0.0, 0.0],
            [0.0, -0.3, 0.0],
        ];
        for (motor, expected) in airframe.motors().iter().zip(expected) {
            // snapped components are exactly zero
            assert_eq!(motor.position().vector(), Vector3::from(expected));
        }
        let spins: Vec<f64> = airframe.motors().iter().map(|m| m.spin().sign()).collect();
        assert_eq!(spins, vec![1.0, -1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_tri_layout() {
        let airframe = Airframe::new(3, 1.0).unwrap();
        let r = airframe.motors()[1].position().vector();
        assert_abs_diff_eq!(r[0], -0.5, epsilon = TOL);
        assert_abs_diff_eq!(r[1], 3.0_f64.sqrt() / 2.0, epsilon = TOL);
        assert_eq!(r[2], 0.0);
        assert_eq!(airframe.motors()[2].spin(), SpinDirection::Positive);
    }

    #[test]
    fn test_layout_validation() {
        assert_eq!(Airframe::new(1, 0.3), Err(AirframeErrors::TooFewRotors(1)));
        assert_eq!(Airframe::new(0, 0.3), Err(AirframeErrors::TooFewRotors(0)));
        assert_eq!(
            Airframe::new(4, 0.0),
            Err(AirframeErrors::NonPositiveArmLength(0.0))
        );
        assert!(Airframe::new(4, f64::NAN).is_err());

        let airframe = Airframe::new(2, 0.5).unwrap();
        assert_eq!(airframe.motors()[1].position().vector(), Vector3::new(-0.5, 0.0, 0.0));
    }

    #[test]
    fn test_equal_rates_balance() {
        let airframe = Airframe::new(4, 0.3).unwrap();
        let (force, moment) = airframe.loads(&[400.0; 4]).unwrap();
        assert_abs_diff_eq!(force.vector()[2], -4.0 * 5.008, epsilon = 1e-9);
        assert_abs_diff_eq!(moment.vector()[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(moment.vector()[1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(moment.vector()[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_odd_rotor_count_leaves_yaw_moment() {
        let airframe = Airframe::new(3, 0.3).unwrap();
        let (_, moment) = airframe.loads(&[400.0; 3]).unwrap();
        assert_abs_diff_eq!(moment.vector()[2], 0.12, epsilon = 1e-9);
    }

    #[test]
    fn test_differential_thrust_pitches() {
        // more thrust on the +X rotor pitches the nose up, -Z thrust at +X gives +Y moment
        let airframe = Airframe::new(4, 0.3).unwrap();
        let (_, moment) = airframe.loads(&[500.0, 400.0, 400.0, 400.0]).unwrap();
        let extra = 3.13e-5 * (500.0 * 500.0 - 400.0 * 400.0);
        assert_abs_diff_eq!(moment.vector()[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moment.vector()[1], 0.3 * extra, epsilon = 1e-9);
        assert_eq!(moment.kind(), Kind::Moment);
    }

    #[test]
    fn test_rate_count() {
        let airframe = Airframe::new(4, 0.3).unwrap();
        assert_eq!(
            airframe.loads(&[400.0; 3]),
            Err(AirframeErrors::RateCount {
                expected: 4,
                found: 3
            })
        );
        assert!(airframe.govern(&[400.0; 5]).is_err());
    }

    #[test]
    fn test_govern_rates() {
        let airframe = Airframe::new(2, 0.3).unwrap();
        assert_eq!(airframe.govern(&[700.0, -5.0]).unwrap(), vec![600.0, 0.0]);
    }

    #[test]
    fn test_builder_from_ron() {
        let builder: AirframeBuilder = ron::from_str("(rotors: 6)").unwrap();
        assert_eq!(builder.arm_length, DEFAULT_ARM_LENGTH);
        let airframe = builder.build().unwrap();
        assert_eq!(airframe.rotor_count(), 6);

        let builder: AirframeBuilder =
            ron::from_str("(rotors: 4, arm_length: 0.25, motor: (k_f: 1e-5, rate_range: (100.0, 800.0)))")
                .unwrap();
        assert_eq!(builder.motor.rate_range, (100.0, 800.0));
        assert_eq!(builder.motor.k_m, 7.5e-7);
        assert_eq!(builder.build().unwrap().arm_length(), 0.25);
    }

    #[test]
    fn test_display_lists_motors() {
        let text = Airframe::new(2, 1.0).unwrap().to_string();
        assert_eq!(
            text,
            "motor 0: [1.0000, 0.0000, 0.0000] Positive\nmotor 1: [-1.0000, 0.0000, 0.0000] Negative\n"
        );
    }
}
