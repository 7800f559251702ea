pub mod airframe;
pub mod motor;
pub mod quadcopter;

pub mod prelude {
    pub use crate::airframe::{Airframe, AirframeBuilder, AirframeErrors};
    pub use crate::motor::{Motor, MotorErrors, MotorParameters, SpinDirection};
    pub use crate::quadcopter::{Quadcopter, QuadcopterBuilder, QuadcopterErrors};
}
