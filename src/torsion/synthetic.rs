//! Synthetic torque–twist experiments for demonstration runs.
//!
//! The curve has a linear elastic stage up to 70 % of the target torque and
//! a quadratic softening stage up to the target. With noise enabled the
//! modulus used to build the curve is perturbed and the angles are
//! scattered, so a reduced result differs slightly from the reference value
//! the way a real test would.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::specimen::{MeasurementPoint, MeasurementSeries};
use crate::material_db::MaterialProfile;

/// Share of the target torque carried by the elastic stage.
pub const ELASTIC_TORQUE_SHARE: f64 = 0.7;
/// Share of the points placed in the elastic stage.
pub const ELASTIC_POINT_SHARE: f64 = 0.7;

const ELASTIC_SCATTER: f64 = 0.01;
const PLASTIC_SCATTER: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    /// Uniform relative deviation of the modulus, in percent.
    pub error_percent: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self { error_percent: 2.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSettings {
    pub target_max_torque: f64,
    pub point_count: usize,
    /// `None` produces the ideal curve.
    pub noise: Option<NoiseSettings>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntheticError {
    #[error("target torque must be positive, got {0}")]
    NonPositiveTorque(f64),
    #[error("length and polar moment must be positive")]
    NonPositiveGeometry,
    #[error("at least 3 points are required, got {0}")]
    TooFewPoints(usize),
    #[error("error percent must be in [0, 100), got {0}")]
    InvalidErrorPercent(f64),
}

/// A generated series plus the parameters it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticExperiment {
    pub series: MeasurementSeries,
    /// Modulus actually used to build the curve.
    pub modulus_used: f64,
    pub elastic_torque: f64,
    /// Twist at the end of the elastic stage, radians.
    pub elastic_angle: f64,
}

/// Generates a noisy experiment, drawing from `rng`.
///
/// Noise is only applied when `settings.noise` is set; otherwise the output
/// equals [`generate_ideal`].
pub fn generate<R: Rng + ?Sized>(
    profile: &MaterialProfile,
    polar_moment: f64,
    length: f64,
    settings: &SyntheticSettings,
    rng: &mut R,
) -> Result<SyntheticExperiment, SyntheticError> {
    build(profile, polar_moment, length, settings, Some(rng))
}

/// The noise-free curve for the reference modulus.
pub fn generate_ideal(
    profile: &MaterialProfile,
    polar_moment: f64,
    length: f64,
    target_max_torque: f64,
    point_count: usize,
) -> Result<SyntheticExperiment, SyntheticError> {
    let settings = SyntheticSettings {
        target_max_torque,
        point_count,
        noise: None,
    };
    build::<StdRng>(profile, polar_moment, length, &settings, None)
}

fn build<R: Rng + ?Sized>(
    profile: &MaterialProfile,
    polar_moment: f64,
    length: f64,
    settings: &SyntheticSettings,
    rng: Option<&mut R>,
) -> Result<SyntheticExperiment, SyntheticError> {
    let t_max = settings.target_max_torque;
    if t_max.is_nan() || t_max <= 0.0 {
        return Err(SyntheticError::NonPositiveTorque(t_max));
    }
    if length <= 0.0 || polar_moment <= 0.0 {
        return Err(SyntheticError::NonPositiveGeometry);
    }
    if settings.point_count < 3 {
        return Err(SyntheticError::TooFewPoints(settings.point_count));
    }
    let mut noise = match (settings.noise, rng) {
        (Some(noise), Some(rng)) => {
            // the drawn modulus must stay positive
            if !(0.0..100.0).contains(&noise.error_percent) {
                return Err(SyntheticError::InvalidErrorPercent(noise.error_percent));
            }
            Some((noise, rng))
        }
        _ => None,
    };

    let reference = profile.reference_shear_modulus;
    let modulus = match noise.as_mut() {
        Some((n, rng)) => {
            let e = n.error_percent / 100.0;
            reference * (1.0 + rng.gen_range(-e..=e))
        }
        None => reference,
    };
    log::debug!("synthetic experiment for {} with G = {modulus:.4e}", profile.material);

    let elastic_torque = t_max * ELASTIC_TORQUE_SHARE;
    let elastic_angle = elastic_torque * length / (modulus * polar_moment);
    let elastic_count = (settings.point_count as f64 * ELASTIC_POINT_SHARE).floor() as usize;
    let plastic_count = settings.point_count - elastic_count;

    let mut elastic: Vec<MeasurementPoint> = linspace(0.0, elastic_torque, elastic_count)
        .into_iter()
        .map(|t| MeasurementPoint::new(t, t * length / (modulus * polar_moment)))
        .collect();
    let mut plastic: Vec<MeasurementPoint> = linspace(elastic_torque, t_max, plastic_count)
        .into_iter()
        .map(|t| {
            let x = (t - elastic_torque) / (t_max - elastic_torque);
            MeasurementPoint::new(t, elastic_angle + 2.0 * elastic_angle * x * x)
        })
        .collect();

    if let Some((_, rng)) = noise.as_mut() {
        // both standard deviations are finite and positive at this point
        if let Ok(scatter) = Normal::new(0.0, elastic_angle * ELASTIC_SCATTER) {
            for p in &mut elastic {
                p.angle = (p.angle + scatter.sample(rng)).max(0.0);
            }
        }
        if let Ok(scatter) = Normal::new(0.0, elastic_angle * PLASTIC_SCATTER) {
            for p in &mut plastic {
                p.angle += scatter.sample(rng);
            }
        }
    }

    elastic.extend(plastic);
    Ok(SyntheticExperiment {
        series: MeasurementSeries::from_points(elastic),
        modulus_used: modulus,
        elastic_torque,
        elastic_angle,
    })
}

/// `count` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material_db::{profile_for, Material};
    use crate::torsion::section::polar_moment_of_inertia;
    use rand::SeedableRng;

    const L: f64 = 0.1;
    const D: f64 = 0.01;

    #[test]
    fn linspace_hits_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn ideal_curve_shape() {
        let profile = profile_for(Material::Steel);
        let jp = polar_moment_of_inertia(D);
        let exp = generate_ideal(profile, jp, L, 100.0, 50).unwrap();
        let pts = exp.series.points();
        assert_eq!(pts.len(), 50);
        assert_eq!(exp.modulus_used, profile.reference_shear_modulus);
        // 35 elastic points, 15 plastic
        assert_eq!(pts[0], MeasurementPoint::new(0.0, 0.0));
        assert!((pts[34].torque - 70.0).abs() < 1e-12);
        assert!((pts[34].angle - exp.elastic_angle).abs() < 1e-15);
        assert_eq!(pts[35].torque, pts[34].torque);
        assert_eq!(pts[49].torque, 100.0);
        assert!((pts[49].angle - 3.0 * exp.elastic_angle).abs() < 1e-15);
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let profile = profile_for(Material::CastIron);
        let jp = polar_moment_of_inertia(D);
        let settings = SyntheticSettings {
            target_max_torque: 80.0,
            point_count: 40,
            noise: Some(NoiseSettings::default()),
        };
        let a = generate(profile, jp, L, &settings, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate(profile, jp, L, &settings, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        let dev = (a.modulus_used / profile.reference_shear_modulus - 1.0).abs();
        assert!(dev <= 0.02 + 1e-12);
        assert!(a.series.points()[..28].iter().all(|p| p.angle >= 0.0));
    }

    #[test]
    fn rejects_bad_settings() {
        let profile = profile_for(Material::Wood);
        let err = generate_ideal(profile, 1.0, 1.0, 0.0, 10).unwrap_err();
        assert_eq!(err, SyntheticError::NonPositiveTorque(0.0));
        assert_eq!(
            generate_ideal(profile, 0.0, 1.0, 1.0, 10).unwrap_err(),
            SyntheticError::NonPositiveGeometry
        );
        assert_eq!(
            generate_ideal(profile, 1.0, 1.0, 1.0, 2).unwrap_err(),
            SyntheticError::TooFewPoints(2)
        );
        let settings = SyntheticSettings {
            target_max_torque: 1.0,
            point_count: 10,
            noise: Some(NoiseSettings { error_percent: -1.0 }),
        };
        let err = generate(profile, 1.0, 1.0, &settings, &mut StdRng::seed_from_u64(1));
        assert_eq!(err.unwrap_err(), SyntheticError::InvalidErrorPercent(-1.0));
        for error_percent in [100.0, 250.0, f64::NAN] {
            let settings = SyntheticSettings {
                noise: Some(NoiseSettings { error_percent }),
                ..settings
            };
            let err = generate(profile, 1.0, 1.0, &settings, &mut StdRng::seed_from_u64(2));
            assert!(matches!(err, Err(SyntheticError::InvalidErrorPercent(_))));
        }
    }
}
