//! Section properties of a solid circular shaft.

use std::f64::consts::PI;

/// Polar moment of inertia `Jp = π·d⁴/32`.
pub fn polar_moment_of_inertia(diameter: f64) -> f64 {
    PI * diameter.powi(4) / 32.0
}

/// Polar section modulus `Wp = π·d³/16`.
pub fn polar_section_modulus(diameter: f64) -> f64 {
    PI * diameter.powi(3) / 16.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_millimetre_bar() {
        assert!((polar_moment_of_inertia(10.0) - 981.747_704).abs() < 1e-5);
        assert!((polar_section_modulus(10.0) - 196.349_541).abs() < 1e-5);
    }

    #[test]
    fn section_modulus_is_jp_over_radius() {
        for d in [0.5, 1.0, 7.5, 12.0, 40.0] {
            let jp = polar_moment_of_inertia(d);
            let wp = polar_section_modulus(d);
            assert!((wp - jp * 2.0 / d).abs() < 1e-9 * wp.max(1.0));
        }
    }

    #[test]
    fn zero_diameter_gives_zero() {
        assert_eq!(polar_moment_of_inertia(0.0), 0.0);
        assert_eq!(polar_section_modulus(0.0), 0.0);
    }
}
