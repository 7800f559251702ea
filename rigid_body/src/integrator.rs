use crate::{RigidBodyErrors, StepInput, state::BodyState};
use frames::{Frame, FrameVector, Kind};
use mass_properties::MassProperties;
use rotations::{
    RotationTrait,
    quaternion::{Quaternion, UnitQuaternion},
};

/// Rates evaluated at the start of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives {
    /// Rate of change of the body frame velocity components.
    pub acceleration: FrameVector,
    pub angular_acceleration: FrameVector,
    pub attitude_rate: Quaternion,
}

/// Advances a rigid body state by one explicit Euler step.
///
/// The Newton-Euler equations are evaluated in the body frame,
///
/// ```text
/// a = F/m - ω × v
/// α = I⁻¹ (M - ω × (I ω))
/// ```
///
/// and the state is then updated rotation first: `ω`, then the attitude
/// (renormalized), then the body velocity, and finally the position using
/// the new velocity rotated by the new attitude.
///
/// # Arguments
///
/// * `state` - The state at `input.time`.
/// * `mass_properties` - Mass and principal inertia of the body.
/// * `input` - Body frame force and moment held constant over `input.dt`.
///
/// # Returns
///
/// The state at `input.time + input.dt` and the rates used to get there.
pub fn step_forward_euler(
    state: &BodyState,
    mass_properties: &MassProperties,
    input: &StepInput,
) -> Result<(BodyState, Derivatives), RigidBodyErrors> {
    let dt = input.dt;
    if !(dt.is_finite() && dt > 0.0) {
        return Err(RigidBodyErrors::InvalidStep(dt));
    }
    let force = input.force_body.require(Frame::BodyFixed, Kind::Force)?;
    let moment = input.moment_body.require(Frame::BodyFixed, Kind::Moment)?;
    for load in [&force, &moment] {
        if !load.vector().iter().all(|x| x.is_finite()) {
            return Err(RigidBodyErrors::NonFiniteLoad(load.kind()));
        }
    }
    state.validate()?;

    let omega = state.angular_velocity;

    let specific_force = FrameVector::new(
        Frame::BodyFixed,
        Kind::Acceleration,
        force.vector() / mass_properties.mass(),
    );
    let acceleration = specific_force.checked_sub(&omega.cross_physical(&state.velocity)?)?;

    let angular_acceleration = FrameVector::new(
        Frame::BodyFixed,
        Kind::AngularAcceleration,
        mass_properties
            .inertia()
            .angular_acceleration(&moment.vector(), &omega.vector()),
    );

    let attitude_rate = state.attitude.rate(&omega.vector());

    let angular_velocity = omega.add_vector(&(angular_acceleration.vector() * dt));
    let attitude =
        UnitQuaternion::from_normalized(&(state.attitude.quaternion() + attitude_rate * dt))?;
    let velocity = state.velocity.add_vector(&(acceleration.vector() * dt));
    let velocity_earth = attitude.rotate(&velocity.vector());
    let position = state.position.add_vector(&(velocity_earth * dt));

    Ok((
        BodyState {
            position,
            velocity,
            attitude,
            angular_velocity,
        },
        Derivatives {
            acceleration,
            angular_acceleration,
            attitude_rate,
        },
    ))
}
