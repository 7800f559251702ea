pub mod integrator;
pub mod state;

use frames::{Frame, FrameErrors, FrameVector, Kind};
use mass_properties::{MassProperties, MassPropertiesErrors};
use rotations::{euler_angles::EulerAngles, quaternion::QuaternionErrors};
use thiserror::Error;
use tracing::{debug, trace};

use integrator::step_forward_euler;
use state::{BodyState, BodyStateErrors};

pub mod prelude {
    pub use crate::integrator::{Derivatives, step_forward_euler};
    pub use crate::state::{BodyState, BodyStateBuilder, BodyStateErrors, STATE_LENGTH};
    pub use crate::{RigidBody, RigidBodyErrors, StepInput};
}

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum RigidBodyErrors {
    #[error("{0}")]
    BodyStateErrors(#[from] BodyStateErrors),
    #[error("{0}")]
    FrameErrors(#[from] FrameErrors),
    #[error("time step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("applied {0} has non-finite components")]
    NonFiniteLoad(Kind),
    #[error("{0}")]
    MassPropertiesErrors(#[from] MassPropertiesErrors),
    #[error("{0}")]
    QuaternionErrors(#[from] QuaternionErrors),
}

/// Loads applied over one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    /// Simulation time at the start of the step (s).
    pub time: f64,
    /// Net force through the centre of mass, body fixed.
    pub force_body: FrameVector,
    /// Net moment about the centre of mass, body fixed.
    pub moment_body: FrameVector,
    pub dt: f64,
}

impl StepInput {
    pub fn new(time: f64, force_body: FrameVector, moment_body: FrameVector, dt: f64) -> Self {
        Self {
            time,
            force_body,
            moment_body,
            dt,
        }
    }

    /// No applied loads.
    pub fn unloaded(time: f64, dt: f64) -> Self {
        Self::new(
            time,
            FrameVector::zeros(Frame::BodyFixed, Kind::Force),
            FrameVector::zeros(Frame::BodyFixed, Kind::Moment),
            dt,
        )
    }
}

/// A single rigid body driven by body frame loads.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    mass_properties: MassProperties,
    state: BodyState,
    acceleration: FrameVector,
    angular_acceleration: FrameVector,
    time: f64,
}

impl RigidBody {
    /// Creates a body at rest at the origin with identity attitude.
    pub fn new(mass_properties: MassProperties) -> Self {
        debug!(
            mass = mass_properties.mass(),
            inertia = ?mass_properties.inertia().diagonal(),
            "created rigid body"
        );
        Self {
            mass_properties,
            state: BodyState::default(),
            acceleration: FrameVector::zeros(Frame::EarthFixed, Kind::Acceleration),
            angular_acceleration: FrameVector::zeros(Frame::BodyFixed, Kind::AngularAcceleration),
            time: 0.0,
        }
    }

    pub fn from_principal(
        mass: f64,
        ixx: f64,
        iyy: f64,
        izz: f64,
    ) -> Result<Self, RigidBodyErrors> {
        Ok(Self::new(MassProperties::from_principal(mass, ixx, iyy, izz)?))
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    /// Replaces the state. Mistagged vectors are rejected and the body is
    /// left untouched.
    pub fn set_state(&mut self, state: BodyState) -> Result<(), RigidBodyErrors> {
        state.validate()?;
        self.state = state;
        Ok(())
    }

    /// Earth fixed acceleration from the last step.
    pub fn acceleration(&self) -> FrameVector {
        self.acceleration
    }

    /// Body fixed angular acceleration from the last step.
    pub fn angular_acceleration(&self) -> FrameVector {
        self.angular_acceleration
    }

    /// Simulation time at the end of the last step.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn euler_angles(&self) -> EulerAngles {
        self.state.attitude.euler_angles()
    }

    /// Integrates the body over `input.dt` and caches the rates of the step.
    pub fn step(&mut self, input: &StepInput) -> Result<(), RigidBodyErrors> {
        let (state, derivatives) = step_forward_euler(&self.state, &self.mass_properties, input)?;
        let acceleration =
            derivatives
                .acceleration
                .to_frame(Frame::EarthFixed, &state.attitude, None)?;

        self.state = state;
        self.acceleration = acceleration;
        self.angular_acceleration = derivatives.angular_acceleration;
        self.time = input.time + input.dt;
        trace!(time = self.time, dt = input.dt, "stepped rigid body");
        Ok(())
    }

    /// Earth fixed position of a point fixed on the body.
    ///
    /// # Arguments
    ///
    /// * `r` - Body fixed position of the point relative to the centre of mass.
    pub fn position_of_point(&self, r: &FrameVector) -> Result<FrameVector, RigidBodyErrors> {
        let r = r.require(Frame::BodyFixed, Kind::Position)?;
        Ok(r.to_frame(
            Frame::EarthFixed,
            &self.state.attitude,
            Some(&self.state.position),
        )?)
    }

    /// Body fixed velocity of a point fixed on the body, `v + ω × r`.
    pub fn velocity_of_point(&self, r: &FrameVector) -> Result<FrameVector, RigidBodyErrors> {
        let r = r.require(Frame::BodyFixed, Kind::Position)?;
        let transport = self.state.angular_velocity.cross_physical(&r)?;
        Ok(self.state.velocity.checked_add(&transport)?)
    }

    /// Earth fixed acceleration of a point fixed on the body,
    /// `a + R (α × r + ω × (ω × r))`, using the rates of the last step.
    pub fn acceleration_of_point(&self, r: &FrameVector) -> Result<FrameVector, RigidBodyErrors> {
        let r = r.require(Frame::BodyFixed, Kind::Position)?;
        let omega = self.state.angular_velocity;
        let tangential = self.angular_acceleration.cross_physical(&r)?;
        let centripetal = omega.cross_physical(&omega.cross_physical(&r)?)?;
        let relative = tangential
            .checked_add(&centripetal)?
            .to_frame(Frame::EarthFixed, &self.state.attitude, None)?;
        Ok(self.acceleration.checked_add(&relative)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use rand::{Rng, SeedableRng, rngs::SmallRng};
    use rotations::{RotationTrait, quaternion::UnitQuaternion};
    const TOL: f64 = 1e-12;

    fn assert_vector_eq(result: &Vector3<f64>, expected: &Vector3<f64>, tol: f64) {
        for i in 0..3 {
            assert_abs_diff_eq!(result[i], expected[i], epsilon = tol);
        }
    }

    fn force(x: f64, y: f64, z: f64) -> FrameVector {
        FrameVector::from_components(Frame::BodyFixed, Kind::Force, x, y, z)
    }

    fn moment(x: f64, y: f64, z: f64) -> FrameVector {
        FrameVector::from_components(Frame::BodyFixed, Kind::Moment, x, y, z)
    }

    fn body_with_rates(velocity: Vector3<f64>, omega: Vector3<f64>) -> RigidBody {
        let mut body = RigidBody::from_principal(1.0, 1.0, 1.0, 1.0).unwrap();
        let mut state = body.state();
        state.velocity = FrameVector::new(Frame::BodyFixed, Kind::Velocity, velocity);
        state.angular_velocity = FrameVector::new(Frame::BodyFixed, Kind::AngularVelocity, omega);
        body.set_state(state).unwrap();
        body
    }

    #[test]
    fn test_rest_is_equilibrium() {
        for dt in [1e-6, 0.01, 0.5, 10.0] {
            let mut body = RigidBody::from_principal(1.2, 0.01, 0.02, 0.03).unwrap();
            let before = body.state();
            body.step(&StepInput::unloaded(0.0, dt)).unwrap();
            assert_eq!(body.state().to_array(), before.to_array());
            assert_eq!(body.time(), dt);
        }
    }

    #[test]
    fn test_invalid_step() {
        let mut body = RigidBody::from_principal(1.0, 1.0, 1.0, 1.0).unwrap();
        for dt in [0.0, -0.1, f64::INFINITY] {
            assert_eq!(
                body.step(&StepInput::unloaded(0.0, dt)),
                Err(RigidBodyErrors::InvalidStep(dt))
            );
        }
        assert!(matches!(
            body.step(&StepInput::unloaded(0.0, f64::NAN)),
            Err(RigidBodyErrors::InvalidStep(_))
        ));
    }

    #[test]
    fn test_non_finite_loads() {
        let mut body = RigidBody::from_principal(1.0, 1.0, 1.0, 1.0).unwrap();
        let input = StepInput::new(0.0, force(0.0, 0.0, 0.0), moment(f64::INFINITY, 0.0, 0.0), 0.1);
        assert_eq!(
            body.step(&input),
            Err(RigidBodyErrors::NonFiniteLoad(Kind::Moment))
        );
        let input = StepInput::new(0.0, force(0.0, f64::NAN, 0.0), moment(0.0, 0.0, 0.0), 0.1);
        assert_eq!(
            body.step(&input),
            Err(RigidBodyErrors::NonFiniteLoad(Kind::Force))
        );

        // rejected steps leave the body untouched
        assert_eq!(body.state(), BodyState::default());
        assert_eq!(body.time(), 0.0);
        body.step(&StepInput::unloaded(0.0, 0.1)).unwrap();
        assert_abs_diff_eq!(body.state().attitude.quaternion().mag(), 1.0, epsilon = TOL);
    }

    #[test]
    fn test_mistagged_loads() {
        let mut body = RigidBody::from_principal(1.0, 1.0, 1.0, 1.0).unwrap();
        let earth_force = FrameVector::zeros(Frame::EarthFixed, Kind::Force);
        let input = StepInput::new(0.0, earth_force, moment(0.0, 0.0, 0.0), 0.1);
        assert!(matches!(
            body.step(&input),
            Err(RigidBodyErrors::FrameErrors(FrameErrors::TypeMismatch { .. }))
        ));

        // a force passed as the moment
        let input = StepInput::new(0.0, force(0.0, 0.0, 0.0), force(0.0, 0.0, 0.0), 0.1);
        assert!(matches!(
            body.step(&input),
            Err(RigidBodyErrors::FrameErrors(FrameErrors::TypeMismatch { .. }))
        ));
        assert_eq!(body.time(), 0.0);
    }

    #[test]
    fn test_constant_force_accumulates_position() {
        let mut body = RigidBody::from_principal(2.0, 1.0, 1.0, 1.0).unwrap();
        let input = StepInput::new(0.0, force(2.0, 0.0, 0.0), moment(0.0, 0.0, 0.0), 0.5);
        body.step(&input).unwrap();
        assert_vector_eq(&body.state().velocity.vector(), &Vector3::new(0.5, 0.0, 0.0), TOL);
        assert_vector_eq(&body.state().position.vector(), &Vector3::new(0.25, 0.0, 0.0), TOL);

        body.step(&StepInput { time: 0.5, ..input }).unwrap();
        assert_vector_eq(&body.state().velocity.vector(), &Vector3::new(1.0, 0.0, 0.0), TOL);
        assert_vector_eq(&body.state().position.vector(), &Vector3::new(0.75, 0.0, 0.0), TOL);
        assert_vector_eq(&body.acceleration().vector(), &Vector3::new(1.0, 0.0, 0.0), TOL);
        assert_eq!(body.time(), 1.0);
    }

    #[test]
    fn test_gyroscopic_coupling() {
        let mut body = RigidBody::from_principal(1.0, 1.0, 2.0, 3.0).unwrap();
        let mut state = body.state();
        state.angular_velocity =
            FrameVector::from_components(Frame::BodyFixed, Kind::AngularVelocity, 1.0, 1.0, 0.0);
        body.set_state(state).unwrap();

        body.step(&StepInput::unloaded(0.0, 0.1)).unwrap();
        // ω × Iω = (0, 0, 1), so α = (0, 0, -1/3)
        assert_vector_eq(
            &body.angular_acceleration().vector(),
            &Vector3::new(0.0, 0.0, -1.0 / 3.0),
            TOL,
        );
        assert_vector_eq(
            &body.state().angular_velocity.vector(),
            &Vector3::new(1.0, 1.0, -1.0 / 30.0),
            TOL,
        );
    }

    #[test]
    fn test_attitude_updates_before_translation() {
        let mut body = body_with_rates(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        body.step(&StepInput::unloaded(0.0, 0.1)).unwrap();

        // q̇ = (0, 0, 0, 0.5) at identity, so q' ∝ (1, 0, 0, 0.05)
        let expected_q = UnitQuaternion::new(1.0, 0.0, 0.0, 0.05).unwrap();
        let q = body.state().attitude.quaternion();
        assert_abs_diff_eq!(q.s, expected_q.quaternion().s, epsilon = TOL);
        assert_abs_diff_eq!(q.z, expected_q.quaternion().z, epsilon = TOL);

        // -ω × v = (0, -1, 0)
        let expected_v = Vector3::new(1.0, -0.1, 0.0);
        assert_vector_eq(&body.state().velocity.vector(), &expected_v, TOL);

        // position moves along the new velocity seen through the new attitude
        let expected_p = expected_q.rotate(&expected_v) * 0.1;
        assert_vector_eq(&body.state().position.vector(), &expected_p, TOL);

        let expected_a = expected_q.rotate(&Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(body.acceleration().frame(), Frame::EarthFixed);
        assert_vector_eq(&body.acceleration().vector(), &expected_a, TOL);
    }

    #[test]
    fn test_attitude_stays_unit_norm() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let omega = Vector3::new(
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
            );
            let mut body = body_with_rates(Vector3::zeros(), omega);
            let dt = rng.random_range(1e-4..1.0);
            for i in 0..20 {
                let input = StepInput::new(
                    i as f64 * dt,
                    force(rng.random_range(-10.0..10.0), 0.0, -5.0),
                    moment(0.1, rng.random_range(-1.0..1.0), 0.0),
                    dt,
                );
                body.step(&input).unwrap();
                let mag = body.state().attitude.quaternion().mag();
                assert_abs_diff_eq!(mag, 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let mut body = body_with_rates(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.3, -0.2, 0.9));
            for i in 0..50 {
                let input = StepInput::new(
                    i as f64 * 0.01,
                    force(0.1, -0.2, -9.0),
                    moment(0.01, 0.02, -0.03),
                    0.01,
                );
                body.step(&input).unwrap();
            }
            body.state().to_array()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_set_state_rejects_mistagged() {
        let mut body = RigidBody::from_principal(1.0, 1.0, 1.0, 1.0).unwrap();
        let mut state = body.state();
        state.velocity = FrameVector::zeros(Frame::EarthFixed, Kind::Velocity);
        assert!(body.set_state(state).is_err());
        assert_eq!(body.state(), BodyState::default());
    }

    #[test]
    fn test_invalid_mass_properties() {
        assert!(matches!(
            RigidBody::from_principal(0.0, 1.0, 1.0, 1.0),
            Err(RigidBodyErrors::MassPropertiesErrors(_))
        ));
        assert!(matches!(
            RigidBody::from_principal(1.0, 1.0, -1.0, 1.0),
            Err(RigidBodyErrors::MassPropertiesErrors(_))
        ));
    }

    #[test]
    fn test_point_kinematics() {
        let mut body = body_with_rates(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 2.0));
        let mut state = body.state();
        state.position = FrameVector::from_components(Frame::EarthFixed, Kind::Position, 1.0, 2.0, 3.0);
        body.set_state(state).unwrap();

        let r = FrameVector::from_components(Frame::BodyFixed, Kind::Position, 1.0, 0.0, 0.0);

        let p = body.position_of_point(&r).unwrap();
        assert_eq!(p.tag(), frames::Tag::new(Frame::EarthFixed, Kind::Position));
        assert_vector_eq(&p.vector(), &Vector3::new(2.0, 2.0, 3.0), TOL);

        let v = body.velocity_of_point(&r).unwrap();
        assert_eq!(v.kind(), Kind::Velocity);
        assert_vector_eq(&v.vector(), &Vector3::new(1.0, 2.0, 0.0), TOL);

        // no step taken yet, only the centripetal term remains
        let a = body.acceleration_of_point(&r).unwrap();
        assert_eq!(a.frame(), Frame::EarthFixed);
        assert_vector_eq(&a.vector(), &Vector3::new(-4.0, 0.0, 0.0), TOL);

        let r_earth = FrameVector::zeros(Frame::EarthFixed, Kind::Position);
        assert!(body.position_of_point(&r_earth).is_err());
    }
}
