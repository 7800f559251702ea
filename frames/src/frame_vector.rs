use crate::{Frame, FrameErrors, Kind, Tag};
use nalgebra::Vector3;
use rotations::{RotationTrait, quaternion::UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Component tolerance used by `PartialEq`.
pub const EQUALITY_TOL: f64 = 1e-12;

/// A 3-vector tagged with the frame it is expressed in and the quantity it
/// represents.
///
/// Every binary operation between two `FrameVector`s checks the tags, so a
/// body fixed velocity can never be summed with an earth fixed one and a
/// force can never be added to a position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrameVector {
    frame: Frame,
    kind: Kind,
    value: Vector3<f64>,
}

impl FrameVector {
    pub fn new(frame: Frame, kind: Kind, value: Vector3<f64>) -> Self {
        Self { frame, kind, value }
    }

    pub fn zeros(frame: Frame, kind: Kind) -> Self {
        Self::new(frame, kind, Vector3::zeros())
    }

    pub fn from_components(frame: Frame, kind: Kind, x: f64, y: f64, z: f64) -> Self {
        Self::new(frame, kind, Vector3::new(x, y, z))
    }

    /// Builds a vector from a slice that must hold exactly 3 components.
    pub fn try_from_slice(frame: Frame, kind: Kind, slice: &[f64]) -> Result<Self, FrameErrors> {
        if slice.len() != 3 {
            return Err(FrameErrors::InvalidDimension(slice.len()));
        }
        Ok(Self::from_components(frame, kind, slice[0], slice[1], slice[2]))
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn tag(&self) -> Tag {
        Tag::new(self.frame, self.kind)
    }

    pub fn vector(&self) -> Vector3<f64> {
        self.value
    }

    pub fn norm(&self) -> f64 {
        self.value.norm()
    }

    /// Returns `self` if it carries the given tag, `TypeMismatch` otherwise.
    pub fn require(self, frame: Frame, kind: Kind) -> Result<Self, FrameErrors> {
        let expected = Tag::new(frame, kind);
        if self.tag() != expected {
            return Err(FrameErrors::TypeMismatch {
                expected,
                found: self.tag(),
            });
        }
        Ok(self)
    }

    fn same_tag(&self, other: &FrameVector) -> Result<(), FrameErrors> {
        other.require(self.frame, self.kind).map(|_| ())
    }

    fn with_value(&self, value: Vector3<f64>) -> Self {
        Self::new(self.frame, self.kind, value)
    }

    pub fn checked_add(&self, other: &FrameVector) -> Result<FrameVector, FrameErrors> {
        self.same_tag(other)?;
        Ok(self.with_value(self.value + other.value))
    }

    pub fn checked_sub(&self, other: &FrameVector) -> Result<FrameVector, FrameErrors> {
        self.same_tag(other)?;
        Ok(self.with_value(self.value - other.value))
    }

    /// Adds untagged components, keeping this vector's frame and kind.
    pub fn add_vector(&self, v: &Vector3<f64>) -> FrameVector {
        self.with_value(self.value + v)
    }

    /// Subtracts untagged components, keeping this vector's frame and kind.
    pub fn sub_vector(&self, v: &Vector3<f64>) -> FrameVector {
        self.with_value(self.value - v)
    }

    pub fn scale(&self, k: f64) -> FrameVector {
        self.with_value(self.value * k)
    }

    /// Cross product of two vectors with identical frame and kind.
    pub fn cross(&self, other: &FrameVector) -> Result<FrameVector, FrameErrors> {
        self.same_tag(other)?;
        Ok(self.with_value(self.value.cross(&other.value)))
    }

    /// Cross product with untagged components. The result keeps this
    /// vector's tag.
    pub fn cross_vector(&self, v: &Vector3<f64>) -> FrameVector {
        self.with_value(self.value.cross(v))
    }

    /// Cross product between physically related quantities.
    ///
    /// Both operands must share a frame. The result kind follows
    /// [`Kind::cross_product`], so `ω × r` is a velocity and `r × F` is a
    /// moment. Pairs without a physical meaning are a `TypeMismatch`.
    ///
    /// # Arguments
    ///
    /// * `other` - The right hand operand.
    ///
    /// # Returns
    ///
    /// `self × other` tagged with the product kind.
    pub fn cross_physical(&self, other: &FrameVector) -> Result<FrameVector, FrameErrors> {
        if self.frame != other.frame {
            return Err(FrameErrors::TypeMismatch {
                expected: Tag::new(self.frame, other.kind),
                found: other.tag(),
            });
        }
        let kind = Kind::cross_product(self.kind, other.kind).ok_or(FrameErrors::TypeMismatch {
            expected: self.tag(),
            found: other.tag(),
        })?;
        Ok(FrameVector::new(
            self.frame,
            kind,
            self.value.cross(&other.value),
        ))
    }

    /// Expresses this vector in `target`.
    ///
    /// Free vectors are rotated with the attitude. Positions are points, so
    /// they also need the earth fixed position of the body origin:
    /// body to earth is `origin + R v`, earth to body is `Rᵀ (v - origin)`.
    ///
    /// # Arguments
    ///
    /// * `target` - The frame to express the vector in.
    /// * `attitude` - Body attitude relative to the earth frame.
    /// * `origin` - Earth fixed position of the body origin, required for
    ///   positions and ignored for everything else.
    ///
    /// # Returns
    ///
    /// The converted vector, or `self` when it is already in `target`.
    pub fn to_frame(
        &self,
        target: Frame,
        attitude: &UnitQuaternion,
        origin: Option<&FrameVector>,
    ) -> Result<FrameVector, FrameErrors> {
        if self.frame == target {
            return Ok(*self);
        }

        let offset = match self.kind {
            Kind::Position => {
                let origin = origin.ok_or(FrameErrors::MissingOrigin)?;
                origin.require(Frame::EarthFixed, Kind::Position)?.value
            }
            _ => Vector3::zeros(),
        };

        let rm = attitude.rotation_matrix();
        let value = match target {
            Frame::EarthFixed => offset + rm.rotate(&self.value),
            Frame::BodyFixed => rm.transform(&(self.value - offset)),
        };
        Ok(FrameVector::new(target, self.kind, value))
    }
}

impl PartialEq for FrameVector {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
            && self.kind == other.kind
            && self
                .value
                .iter()
                .zip(other.value.iter())
                .all(|(a, b)| (a - b).abs() <= EQUALITY_TOL)
    }
}

impl Add<FrameVector> for FrameVector {
    type Output = Result<FrameVector, FrameErrors>;

    fn add(self, rhs: FrameVector) -> Self::Output {
        self.checked_add(&rhs)
    }
}

impl Sub<FrameVector> for FrameVector {
    type Output = Result<FrameVector, FrameErrors>;

    fn sub(self, rhs: FrameVector) -> Self::Output {
        self.checked_sub(&rhs)
    }
}

impl Mul<f64> for FrameVector {
    type Output = FrameVector;

    fn mul(self, rhs: f64) -> FrameVector {
        self.scale(rhs)
    }
}

impl Neg for FrameVector {
    type Output = FrameVector;

    fn neg(self) -> FrameVector {
        self.with_value(-self.value)
    }
}
