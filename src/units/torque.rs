use serde::{Deserialize, Serialize};

/// Torque unit. Base unit is N·m.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TorqueUnit {
    NewtonMeter,
    /// The laboratory hand-out tabulates torque in N·mm.
    NewtonMillimeter,
    KilonewtonMeter,
    PoundForceInch,
}

impl TorqueUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            TorqueUnit::NewtonMeter => "N·m",
            TorqueUnit::NewtonMillimeter => "N·mm",
            TorqueUnit::KilonewtonMeter => "kN·m",
            TorqueUnit::PoundForceInch => "lbf·in",
        }
    }
}

const N_M_PER_LBF_IN: f64 = 0.112_984_829;

fn to_newton_meter(value: f64, unit: TorqueUnit) -> f64 {
    match unit {
        TorqueUnit::NewtonMeter => value,
        TorqueUnit::NewtonMillimeter => value / 1000.0,
        TorqueUnit::KilonewtonMeter => value * 1000.0,
        TorqueUnit::PoundForceInch => value * N_M_PER_LBF_IN,
    }
}

fn from_newton_meter(value_n_m: f64, unit: TorqueUnit) -> f64 {
    match unit {
        TorqueUnit::NewtonMeter => value_n_m,
        TorqueUnit::NewtonMillimeter => value_n_m * 1000.0,
        TorqueUnit::KilonewtonMeter => value_n_m / 1000.0,
        TorqueUnit::PoundForceInch => value_n_m / N_M_PER_LBF_IN,
    }
}

/// Converts a torque between units.
pub fn convert_torque(value: f64, from: TorqueUnit, to: TorqueUnit) -> f64 {
    from_newton_meter(to_newton_meter(value, from), to)
}
