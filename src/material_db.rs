//! Reference data for the three laboratory materials.
//!
//! Moduli and ranges are in pascals, limit angles in degrees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Materials available for the torsion test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Steel,
    CastIron,
    Wood,
}

impl Material {
    pub const ALL: [Material; 3] = [Material::Steel, Material::CastIron, Material::Wood];

    pub fn name(self) -> &'static str {
        match self {
            Material::Steel => "Steel",
            Material::CastIron => "Cast Iron",
            Material::Wood => "Wood",
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Material {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_material(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialError {
    #[error("unknown material: {0}")]
    Unknown(String),
}

/// Typical shear modulus values, used only for plausibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModulusRange {
    pub min: f64,
    pub max: f64,
    pub typical: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialProfile {
    pub material: Material,
    /// Alternative spellings accepted by [`find_material`].
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    pub reference_shear_modulus: f64,
    /// Scales the ideal elastic modulus to real specimen stiffness, `0 < k <= 1`.
    pub stiffness_coefficient: f64,
    pub elastic_limit_deg: f64,
    pub failure_angle_deg: f64,
    pub typical_range: ModulusRange,
    pub failure_description: &'static str,
}

const MATERIALS: &[MaterialProfile] = &[
    MaterialProfile {
        material: Material::Steel,
        aliases: &["steel", "сталь"],
        reference_shear_modulus: 8.1e10,
        stiffness_coefficient: 1.0,
        elastic_limit_deg: 15.0,
        failure_angle_deg: 30.0,
        typical_range: ModulusRange {
            min: 75.0e9,
            max: 85.0e9,
            typical: 80.0e9,
        },
        failure_description: "Ductile failure: the specimen shears along a helical surface \
                              at about 45 degrees to the axis, following the planes of \
                              maximum shear stress.",
    },
    MaterialProfile {
        material: Material::CastIron,
        aliases: &["cast iron", "castiron", "cast_iron", "чугун"],
        reference_shear_modulus: 4.0e10,
        stiffness_coefficient: 0.95,
        elastic_limit_deg: 10.0,
        failure_angle_deg: 20.0,
        typical_range: ModulusRange {
            min: 30.0e9,
            max: 50.0e9,
            typical: 40.0e9,
        },
        failure_description: "Brittle failure: the fracture runs across a plane perpendicular \
                              to the axis, the specimen separating under normal stress with \
                              little visible twist.",
    },
    MaterialProfile {
        material: Material::Wood,
        aliases: &["wood", "дерево"],
        reference_shear_modulus: 0.5e9,
        stiffness_coefficient: 0.80,
        elastic_limit_deg: 8.0,
        failure_angle_deg: 16.0,
        typical_range: ModulusRange {
            min: 0.5e9,
            max: 2.0e9,
            typical: 1.0e9,
        },
        failure_description: "Fibrous failure: the specimen delaminates along the fibres, \
                              which split apart under shear parallel to the grain.",
    },
];

pub fn materials() -> &'static [MaterialProfile] {
    MATERIALS
}

pub fn profile_for(material: Material) -> &'static MaterialProfile {
    match material {
        Material::Steel => &MATERIALS[0],
        Material::CastIron => &MATERIALS[1],
        Material::Wood => &MATERIALS[2],
    }
}

/// Looks a material up by name, case-insensitively.
pub fn find_material(name: &str) -> Result<Material, MaterialError> {
    let key = name.trim().to_lowercase();
    MATERIALS
        .iter()
        .find(|p| p.material.name().eq_ignore_ascii_case(&key) || p.aliases.contains(&key.as_str()))
        .map(|p| p.material)
        .ok_or_else(|| MaterialError::Unknown(name.to_string()))
}

pub fn failure_description_for(material: Material) -> &'static str {
    profile_for(material).failure_description
}

/// Verdict of a plausibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Plausibility {
    Within,
    TooLow,
    TooHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModulusCheck {
    pub verdict: Plausibility,
    /// Lower bound after widening by the tolerance.
    pub lower: f64,
    pub upper: f64,
}

impl ModulusCheck {
    pub fn is_plausible(&self) -> bool {
        self.verdict == Plausibility::Within
    }
}

/// Checks a computed modulus against the material's typical range widened
/// by `tolerance` (0.2 means ±20 %).
pub fn validate_modulus(material: Material, modulus: f64, tolerance: f64) -> ModulusCheck {
    let range = profile_for(material).typical_range;
    let lower = range.min * (1.0 - tolerance);
    let upper = range.max * (1.0 + tolerance);
    let verdict = if modulus < lower {
        Plausibility::TooLow
    } else if modulus > upper {
        Plausibility::TooHigh
    } else {
        Plausibility::Within
    };
    ModulusCheck {
        verdict,
        lower,
        upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_respects_limits() {
        for p in materials() {
            assert!(p.elastic_limit_deg < p.failure_angle_deg, "{}", p.material);
            assert!(p.stiffness_coefficient > 0.0 && p.stiffness_coefficient <= 1.0);
            assert!(p.typical_range.min <= p.typical_range.typical);
            assert!(p.typical_range.typical <= p.typical_range.max);
        }
    }

    #[test]
    fn profile_for_matches_table_order() {
        for m in Material::ALL {
            assert_eq!(profile_for(m).material, m);
        }
    }

    #[test]
    fn lookup_accepts_aliases() {
        assert_eq!(find_material("steel"), Ok(Material::Steel));
        assert_eq!(find_material("  CAST IRON "), Ok(Material::CastIron));
        assert_eq!(find_material("Чугун"), Ok(Material::CastIron));
        assert_eq!(find_material("Дерево"), Ok(Material::Wood));
        assert!(matches!(find_material("brass"), Err(MaterialError::Unknown(n)) if n == "brass"));
    }

    #[test]
    fn validation_widens_range() {
        let check = validate_modulus(Material::Steel, 65.0e9, 0.2);
        assert!(check.is_plausible());
        assert_eq!(validate_modulus(Material::Steel, 55.0e9, 0.2).verdict, Plausibility::TooLow);
        assert_eq!(validate_modulus(Material::Wood, 3.0e9, 0.2).verdict, Plausibility::TooHigh);
    }
}
