//! Unit definitions and conversions used at the input/output boundary.

pub mod angle;
pub mod length;
pub mod stress;
pub mod torque;

pub use angle::{convert_angle, AngleUnit};
pub use length::{convert_length, LengthUnit};
pub use stress::{convert_stress, from_pascal, to_pascal, StressUnit};
pub use torque::{convert_torque, TorqueUnit};
