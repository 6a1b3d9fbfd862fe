//! Piecewise effective-modulus model for the single-point calculator.
//!
//! The twist angle is given in degrees because the material limits are
//! tabulated in degrees. Up to the elastic limit the modulus follows Hooke's
//! law scaled by the stiffness coefficient; between the elastic limit and the
//! failure angle it decays linearly to zero; at and past failure it is zero.

use serde::Serialize;

use super::elastic::{max_shear_stress, relative_shear, shear_modulus};
use crate::material_db::MaterialProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Regime {
    Elastic,
    Plastic,
    Failed,
}

impl Regime {
    pub fn label(self) -> &'static str {
        match self {
            Regime::Elastic => "elastic",
            Regime::Plastic => "plastic",
            Regime::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveModulus {
    /// `None` only at zero twist in the elastic branch.
    pub effective_modulus: Option<f64>,
    /// Modulus before the stiffness coefficient is applied.
    pub baseline_modulus: Option<f64>,
    pub regime: Regime,
    /// Input angle clamped to the failure angle.
    pub effective_angle_deg: f64,
    pub max_shear_stress: Option<f64>,
    pub relative_shear: f64,
    pub warnings: Vec<String>,
}

/// Effective shear modulus for a single torque/angle reading.
pub fn effective_modulus(
    torque: f64,
    length: f64,
    diameter: f64,
    angle_deg: f64,
    profile: &MaterialProfile,
) -> EffectiveModulus {
    let elastic_limit = profile.elastic_limit_deg;
    let failure = profile.failure_angle_deg;
    let k = profile.stiffness_coefficient;
    let theta = angle_deg.min(failure);

    let mut warnings = Vec::new();
    if theta > elastic_limit {
        log::warn!(
            "{}: angle {angle_deg}° exceeds elastic limit {elastic_limit}°, plasticity model applied",
            profile.material
        );
        warnings.push(format!(
            "Angle {angle_deg}° exceeds the elastic limit of {elastic_limit}°: plasticity model applied."
        ));
    }

    let (regime, baseline) = if theta <= elastic_limit {
        (
            Regime::Elastic,
            shear_modulus(torque, length, diameter, theta.to_radians()),
        )
    } else if theta < failure {
        let decayed = shear_modulus(torque, length, diameter, elastic_limit.to_radians())
            .map(|g0| (g0 * (failure - theta) / (failure - elastic_limit)).max(0.0))
            .unwrap_or(0.0);
        (Regime::Plastic, Some(decayed))
    } else {
        (Regime::Failed, Some(0.0))
    };
    if regime == Regime::Failed {
        warnings.push(format!(
            "Angle reached the failure angle of {failure}°: the specimen is considered failed."
        ));
    }

    EffectiveModulus {
        effective_modulus: baseline.map(|g| k * g),
        baseline_modulus: baseline,
        regime,
        effective_angle_deg: theta,
        max_shear_stress: max_shear_stress(torque, diameter),
        relative_shear: relative_shear(theta.to_radians(), diameter, length),
        warnings,
    }
}

/// `G_eff` sampled over `(0, up_to_deg]` for the modulus-vs-angle chart.
///
/// Returns `(angle_deg, modulus)` pairs. Zero twist is skipped since the
/// modulus is undefined there.
pub fn modulus_curve(
    torque: f64,
    length: f64,
    diameter: f64,
    profile: &MaterialProfile,
    up_to_deg: f64,
    samples: usize,
) -> Vec<(f64, f64)> {
    let samples = samples.max(2);
    let step = up_to_deg / samples as f64;
    (1..=samples)
        .filter_map(|i| {
            let angle = step * i as f64;
            effective_modulus(torque, length, diameter, angle, profile)
                .effective_modulus
                .map(|g| (angle, g))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material_db::{profile_for, Material};

    #[test]
    fn steel_elastic_handout_case() {
        let r = effective_modulus(140_000.0, 100.0, 10.0, 10.0, profile_for(Material::Steel));
        assert_eq!(r.regime, Regime::Elastic);
        assert!(r.warnings.is_empty());
        assert!((r.effective_modulus.unwrap() - 81_705.0).abs() < 1.0);
    }

    #[test]
    fn plastic_branch_warns_and_decays() {
        let profile = profile_for(Material::Steel);
        let r = effective_modulus(140_000.0, 100.0, 10.0, 22.5, profile);
        assert_eq!(r.regime, Regime::Plastic);
        assert_eq!(r.warnings.len(), 1);
        let g0 = shear_modulus(140_000.0, 100.0, 10.0, 15f64.to_radians()).unwrap();
        assert!((r.effective_modulus.unwrap() - g0 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn continuous_at_elastic_limit() {
        let profile = profile_for(Material::CastIron);
        let at = effective_modulus(70_000.0, 100.0, 10.0, 10.0, profile)
            .effective_modulus
            .unwrap();
        let past = effective_modulus(70_000.0, 100.0, 10.0, 10.0 + 1e-9, profile)
            .effective_modulus
            .unwrap();
        assert!((at - past).abs() / at < 1e-6);
    }

    #[test]
    fn zero_at_and_beyond_failure() {
        let profile = profile_for(Material::Wood);
        for angle in [16.0, 20.0, 90.0] {
            let r = effective_modulus(2000.0, 100.0, 10.0, angle, profile);
            assert_eq!(r.effective_modulus, Some(0.0));
            assert_eq!(r.regime, Regime::Failed);
            assert_eq!(r.effective_angle_deg, 16.0);
        }
    }

    #[test]
    fn missing_baseline_gives_zero_in_plastic_branch() {
        let profile = MaterialProfile {
            elastic_limit_deg: 0.0,
            ..*profile_for(Material::Steel)
        };
        let r = effective_modulus(140_000.0, 100.0, 10.0, 5.0, &profile);
        assert_eq!(r.regime, Regime::Plastic);
        assert_eq!(r.effective_modulus, Some(0.0));
        assert_eq!(r.baseline_modulus, Some(0.0));
    }

    #[test]
    fn zero_angle_is_undefined() {
        let r = effective_modulus(1000.0, 100.0, 10.0, 0.0, profile_for(Material::Steel));
        assert!(r.effective_modulus.is_none());
    }

    #[test]
    fn curve_ends_at_zero() {
        let profile = profile_for(Material::Steel);
        let curve = modulus_curve(140_000.0, 100.0, 10.0, profile, 30.0, 60);
        assert_eq!(curve.len(), 60);
        assert_eq!(curve.last().map(|p| p.1), Some(0.0));
    }
}
