use serde::{Deserialize, Serialize};

/// Stress / shear modulus unit. Base unit is the pascal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressUnit {
    Pascal,
    KiloPascal,
    MegaPascal,
    GigaPascal,
    Psi,
}

impl StressUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            StressUnit::Pascal => "Pa",
            StressUnit::KiloPascal => "kPa",
            StressUnit::MegaPascal => "MPa",
            StressUnit::GigaPascal => "GPa",
            StressUnit::Psi => "psi",
        }
    }
}

const PA_PER_PSI: f64 = 6_894.757;

/// Converts a stress value to pascals.
pub fn to_pascal(value: f64, unit: StressUnit) -> f64 {
    match unit {
        StressUnit::Pascal => value,
        StressUnit::KiloPascal => value * 1.0e3,
        StressUnit::MegaPascal => value * 1.0e6,
        StressUnit::GigaPascal => value * 1.0e9,
        StressUnit::Psi => value * PA_PER_PSI,
    }
}

/// Converts pascals to the requested unit.
pub fn from_pascal(value_pa: f64, unit: StressUnit) -> f64 {
    match unit {
        StressUnit::Pascal => value_pa,
        StressUnit::KiloPascal => value_pa / 1.0e3,
        StressUnit::MegaPascal => value_pa / 1.0e6,
        StressUnit::GigaPascal => value_pa / 1.0e9,
        StressUnit::Psi => value_pa / PA_PER_PSI,
    }
}

/// Converts a stress between units.
pub fn convert_stress(value: f64, from: StressUnit, to: StressUnit) -> f64 {
    from_pascal(to_pascal(value, from), to)
}
