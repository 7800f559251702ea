use crate::airframe::{Airframe, AirframeBuilder, AirframeErrors};
use frames::FrameVector;
use mass_properties::{Inertia, MassProperties, MassPropertiesErrors};
use rigid_body::{RigidBody, RigidBodyErrors, StepInput, state::BodyState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum QuadcopterErrors {
    #[error("{0}")]
    AirframeErrors(#[from] AirframeErrors),
    #[error("{0}")]
    MassPropertiesErrors(#[from] MassPropertiesErrors),
    #[error("{0}")]
    RigidBodyErrors(#[from] RigidBodyErrors),
}

/// A rigid body carried by the thrust of an airframe's rotors.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadcopter {
    body: RigidBody,
    airframe: Airframe,
}

impl Quadcopter {
    pub fn new(body: RigidBody, airframe: Airframe) -> Self {
        debug!(
            mass = body.mass_properties().mass(),
            rotors = airframe.rotor_count(),
            "created quadcopter"
        );
        Self { body, airframe }
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn airframe(&self) -> &Airframe {
        &self.airframe
    }

    pub fn state(&self) -> BodyState {
        self.body.state()
    }

    pub fn set_state(&mut self, state: BodyState) -> Result<(), QuadcopterErrors> {
        Ok(self.body.set_state(state)?)
    }

    /// Advances the vehicle over `dt` with the commanded rotor rates.
    ///
    /// Rates are first clamped into each motor's range, then converted to
    /// a net body load that is held constant over the step.
    ///
    /// # Arguments
    ///
    /// * `time` - Simulation time at the start of the step (s).
    /// * `rates` - Commanded rate for each rotor, in motor order (rad/s).
    /// * `dt` - Step size (s).
    pub fn step(&mut self, time: f64, rates: &[f64], dt: f64) -> Result<(), QuadcopterErrors> {
        let rates = self.airframe.govern(rates)?;
        let (force, moment) = self.airframe.loads(&rates)?;
        self.body.step(&StepInput::new(time, force, moment, dt))?;
        Ok(())
    }

    /// Earth fixed position of each rotor hub.
    pub fn motor_positions_earth(&self) -> Result<Vec<FrameVector>, QuadcopterErrors> {
        self.airframe
            .motors()
            .iter()
            .map(|motor| {
                self.body
                    .position_of_point(&motor.position())
                    .map_err(QuadcopterErrors::from)
            })
            .collect()
    }

    /// Body fixed velocity of each rotor hub.
    pub fn motor_velocities(&self) -> Result<Vec<FrameVector>, QuadcopterErrors> {
        self.airframe
            .motors()
            .iter()
            .map(|motor| {
                self.body
                    .velocity_of_point(&motor.position())
                    .map_err(QuadcopterErrors::from)
            })
            .collect()
    }
}

/// Serializable vehicle description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadcopterBuilder {
    /// kg
    pub mass: f64,
    /// Principal moments `[ixx, iyy, izz]`, kg m^2.
    pub inertia: [f64; 3],
    #[serde(default)]
    pub airframe: AirframeBuilder,
}

impl QuadcopterBuilder {
    pub fn new(mass: f64, inertia: [f64; 3]) -> Self {
        Self {
            mass,
            inertia,
            airframe: AirframeBuilder::default(),
        }
    }

    pub fn with_airframe(mut self, airframe: AirframeBuilder) -> Self {
        self.airframe = airframe;
        self
    }

    pub fn build(&self) -> Result<Quadcopter, QuadcopterErrors> {
        let mass_properties = MassProperties::new(self.mass, Inertia::try_from(self.inertia)?)?;
        Ok(Quadcopter::new(
            RigidBody::new(mass_properties),
            self.airframe.build()?,
        ))
    }
}
