//! Closed-form relations of linear-elastic torsion (Coulomb's theory).
//!
//! Angles are in radians. Any consistent unit system works; the functions
//! never convert. Results that cannot be computed from the inputs (zero
//! twist, zero section) come back as `None` rather than as infinities.

use serde::{Deserialize, Serialize};

use super::section::{polar_moment_of_inertia, polar_section_modulus};

/// One point of the radial shear stress profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressSample {
    pub radius: f64,
    pub shear_stress: f64,
}

/// Surface shear strain `γ = φ·d / (2·L)`.
pub fn relative_shear(phi_rad: f64, diameter: f64, length: f64) -> f64 {
    phi_rad * diameter / (2.0 * length)
}

/// Shear modulus from one torque/twist pair, `G = T·L / (φ·Jp)`.
///
/// `None` at zero twist or zero diameter.
pub fn shear_modulus(torque: f64, length: f64, diameter: f64, phi_rad: f64) -> Option<f64> {
    let jp = polar_moment_of_inertia(diameter);
    if phi_rad == 0.0 || jp == 0.0 {
        return None;
    }
    Some(torque * length / (phi_rad * jp))
}

/// Maximum (surface) shear stress `τ = T / Wp`.
pub fn max_shear_stress(torque: f64, diameter: f64) -> Option<f64> {
    let wp = polar_section_modulus(diameter);
    if wp == 0.0 {
        return None;
    }
    Some(torque / wp)
}

/// Shear stress `τ(ρ) = T·ρ / Jp` sampled at `samples` evenly spaced radii
/// from the axis to the surface.
///
/// Fewer than two samples are raised to two. A zero section yields zero
/// stress everywhere.
pub fn shear_stress_distribution(torque: f64, diameter: f64, samples: usize) -> Vec<StressSample> {
    let samples = samples.max(2);
    let jp = polar_moment_of_inertia(diameter);
    let outer = diameter / 2.0;
    let step = outer / (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            // last sample sits exactly on the surface
            let radius = if i == samples - 1 { outer } else { step * i as f64 };
            let shear_stress = if jp == 0.0 { 0.0 } else { torque * radius / jp };
            StressSample {
                radius,
                shear_stress,
            }
        })
        .collect()
}

/// Torque predicted for a twist `φ` by the reference modulus, `T = G·Jp·φ/L`.
///
/// This is the theory line drawn next to a measured torsion diagram.
pub fn theoretical_torque(
    reference_modulus: f64,
    polar_moment: f64,
    length: f64,
    phi_rad: f64,
) -> Option<f64> {
    if length == 0.0 {
        return None;
    }
    Some(reference_modulus * polar_moment * phi_rad / length)
}

/// Safety factor `n = τ_u / τ_w`.
pub fn safety_factor(working_stress: f64, ultimate_stress: f64) -> Option<f64> {
    if working_stress == 0.0 {
        return None;
    }
    Some(ultimate_stress / working_stress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_scenario_values() {
        let phi = 10.0_f64.to_radians();
        let g = shear_modulus(1000.0, 100.0, 10.0, phi).unwrap();
        assert!((g - 583.61).abs() < 0.01);
        let tau = max_shear_stress(1000.0, 10.0).unwrap();
        assert!((tau - 5.093).abs() < 1e-3);
    }

    #[test]
    fn modulus_absent_for_zero_twist_or_diameter() {
        assert!(shear_modulus(1000.0, 100.0, 10.0, 0.0).is_none());
        assert!(shear_modulus(1000.0, 100.0, 0.0, 0.1).is_none());
        assert!(max_shear_stress(1000.0, 0.0).is_none());
    }

    #[test]
    fn distribution_is_linear_and_ends_at_surface_stress() {
        let samples = shear_stress_distribution(1000.0, 10.0, 11);
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0].radius, 0.0);
        assert_eq!(samples[0].shear_stress, 0.0);
        let last = samples[10];
        assert_eq!(last.radius, 5.0);
        assert!((last.shear_stress - max_shear_stress(1000.0, 10.0).unwrap()).abs() < 1e-9);
        let mid = samples[5];
        assert!((mid.shear_stress - last.shear_stress / 2.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_has_at_least_two_samples() {
        assert_eq!(shear_stress_distribution(10.0, 2.0, 0).len(), 2);
    }

    #[test]
    fn relative_shear_matches_geometry() {
        assert!((relative_shear(0.2, 10.0, 100.0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn theory_line_and_safety_factor() {
        let jp = polar_moment_of_inertia(10.0);
        let t = theoretical_torque(80_000.0, jp, 100.0, 0.01).unwrap();
        assert!((t - 80_000.0 * jp * 0.01 / 100.0).abs() < 1e-9);
        assert!(theoretical_torque(1.0, 1.0, 0.0, 1.0).is_none());
        assert_eq!(safety_factor(100.0, 250.0), Some(2.5));
        assert!(safety_factor(0.0, 250.0).is_none());
    }
}
