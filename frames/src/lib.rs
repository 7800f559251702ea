pub mod frame_vector;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use frame_vector::FrameVector;

pub mod prelude {
    pub use crate::frame_vector::FrameVector;
    pub use crate::{Frame, FrameErrors, Kind, Tag};
}

/// Reference frame a vector is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// Rigidly attached to and rotating with the vehicle.
    BodyFixed,
    /// Fixed, non-rotating world frame.
    EarthFixed,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::BodyFixed => write!(f, "body fixed"),
            Frame::EarthFixed => write!(f, "earth fixed"),
        }
    }
}

/// Physical quantity a vector represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Position,
    Velocity,
    Acceleration,
    AngularVelocity,
    AngularAcceleration,
    Force,
    Moment,
}

impl Kind {
    /// Kind of `lhs × rhs`, if the product is a quantity this crate tracks.
    ///
    /// Same-kind products keep their kind. The mixed products are the ones
    /// rigid body kinematics and load transport need.
    pub fn cross_product(lhs: Kind, rhs: Kind) -> Option<Kind> {
        match (lhs, rhs) {
            (lhs, rhs) if lhs == rhs => Some(lhs),
            (Kind::AngularVelocity, Kind::Position) => Some(Kind::Velocity),
            (Kind::AngularVelocity, Kind::Velocity) => Some(Kind::Acceleration),
            (Kind::AngularAcceleration, Kind::Position) => Some(Kind::Acceleration),
            (Kind::Position, Kind::Force) => Some(Kind::Moment),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Position => "position",
            Kind::Velocity => "velocity",
            Kind::Acceleration => "acceleration",
            Kind::AngularVelocity => "angular velocity",
            Kind::AngularAcceleration => "angular acceleration",
            Kind::Force => "force",
            Kind::Moment => "moment",
        };
        write!(f, "{name}")
    }
}

/// The (frame, kind) pair carried by every [`FrameVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub frame: Frame,
    pub kind: Kind,
}

impl Tag {
    pub fn new(frame: Frame, kind: Kind) -> Self {
        Self { frame, kind }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.frame, self.kind)
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum FrameErrors {
    #[error("a frame vector has 3 components, got {0}")]
    InvalidDimension(usize),
    #[error("converting a position between frames needs the earth fixed position of the body origin")]
    MissingOrigin,
    #[error("expected a {expected} vector, got a {found} vector")]
    TypeMismatch { expected: Tag, found: Tag },
}
