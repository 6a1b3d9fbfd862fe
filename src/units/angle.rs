use serde::{Deserialize, Serialize};

/// Twist angle unit. Calculations run in radians; degrees only appear at the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    Radian,
    Degree,
}

impl AngleUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            AngleUnit::Radian => "rad",
            AngleUnit::Degree => "°",
        }
    }
}

/// Converts an angle between units.
pub fn convert_angle(value: f64, from: AngleUnit, to: AngleUnit) -> f64 {
    match (from, to) {
        (AngleUnit::Radian, AngleUnit::Degree) => value.to_degrees(),
        (AngleUnit::Degree, AngleUnit::Radian) => value.to_radians(),
        _ => value,
    }
}
