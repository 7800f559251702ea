use frames::{Frame, FrameErrors, FrameVector, Kind};
use nalgebra::Vector3;
use rotations::quaternion::{Quaternion, QuaternionErrors, UnitQuaternion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of scalars in the flat state layout.
pub const STATE_LENGTH: usize = 13;

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum BodyStateErrors {
    #[error("{0}")]
    FrameErrors(#[from] FrameErrors),
    #[error("body state has 13 elements, got {0}")]
    InvalidDimension(usize),
    #[error("{0}")]
    QuaternionErrors(#[from] QuaternionErrors),
}

/// Kinematic state of a rigid body.
///
/// Position is measured in the earth frame, the rates in the body frame.
/// The flat layout is `[x, y, z, u, v, w, e0, e1, e2, e3, p, q, r]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BodyStateBuilder")]
pub struct BodyState {
    pub position: FrameVector,
    pub velocity: FrameVector,
    pub attitude: UnitQuaternion,
    pub angular_velocity: FrameVector,
}

/// Unvalidated body state as read from configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BodyStateBuilder {
    pub position: FrameVector,
    pub velocity: FrameVector,
    pub attitude: Quaternion,
    pub angular_velocity: FrameVector,
}

impl TryFrom<BodyStateBuilder> for BodyState {
    type Error = BodyStateErrors;

    fn try_from(builder: BodyStateBuilder) -> Result<Self, BodyStateErrors> {
        BodyState::new(
            builder.position,
            builder.velocity,
            builder.attitude,
            builder.angular_velocity,
        )
    }
}

impl Default for BodyState {
    /// At rest at the earth frame origin, body axes aligned with earth axes.
    fn default() -> Self {
        Self {
            position: FrameVector::zeros(Frame::EarthFixed, Kind::Position),
            velocity: FrameVector::zeros(Frame::BodyFixed, Kind::Velocity),
            attitude: UnitQuaternion::IDENTITY,
            angular_velocity: FrameVector::zeros(Frame::BodyFixed, Kind::AngularVelocity),
        }
    }
}

impl BodyState {
    /// Builds a state from tagged parts, rejecting mistagged vectors and
    /// attitudes that are not unit norm.
    pub fn new(
        position: FrameVector,
        velocity: FrameVector,
        attitude: Quaternion,
        angular_velocity: FrameVector,
    ) -> Result<Self, BodyStateErrors> {
        let state = Self {
            position,
            velocity,
            attitude: UnitQuaternion::try_from(attitude)?,
            angular_velocity,
        };
        state.validate()?;
        Ok(state)
    }

    /// Checks that every vector carries the tag its slot requires.
    pub fn validate(&self) -> Result<(), BodyStateErrors> {
        self.position.require(Frame::EarthFixed, Kind::Position)?;
        self.velocity.require(Frame::BodyFixed, Kind::Velocity)?;
        self.angular_velocity
            .require(Frame::BodyFixed, Kind::AngularVelocity)?;
        Ok(())
    }

    pub fn to_array(&self) -> [f64; STATE_LENGTH] {
        let p = self.position.vector();
        let v = self.velocity.vector();
        let q = self.attitude.quaternion();
        let w = self.angular_velocity.vector();
        [
            p[0], p[1], p[2], v[0], v[1], v[2], q.s, q.x, q.y, q.z, w[0], w[1], w[2],
        ]
    }
}

impl From<&BodyState> for [f64; STATE_LENGTH] {
    fn from(state: &BodyState) -> Self {
        state.to_array()
    }
}

impl TryFrom<&[f64]> for BodyState {
    type Error = BodyStateErrors;

    fn try_from(x: &[f64]) -> Result<Self, BodyStateErrors> {
        if x.len() != STATE_LENGTH {
            return Err(BodyStateErrors::InvalidDimension(x.len()));
        }
        Ok(Self {
            position: FrameVector::new(
                Frame::EarthFixed,
                Kind::Position,
                Vector3::new(x[0], x[1], x[2]),
            ),
            velocity: FrameVector::new(
                Frame::BodyFixed,
                Kind::Velocity,
                Vector3::new(x[3], x[4], x[5]),
            ),
            attitude: UnitQuaternion::try_from(Quaternion::new(x[6], x[7], x[8], x[9]))?,
            angular_velocity: FrameVector::new(
                Frame::BodyFixed,
                Kind::AngularVelocity,
                Vector3::new(x[10], x[11], x[12]),
            ),
        })
    }
}
