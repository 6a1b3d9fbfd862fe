//! Reduction of measured torque–twist series to material properties.

use serde::{Deserialize, Serialize};

use super::elastic::{max_shear_stress, relative_shear};
use super::section::{polar_moment_of_inertia, polar_section_modulus};
use super::specimen::{CharacterizationResult, MeasurementSeries};
use crate::material_db::MaterialProfile;

/// How the presumed linear region is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReducerSettings {
    /// Leading share of the points treated as linear, by index.
    pub linear_fraction: f64,
    /// Lower bound on the linear region size.
    pub min_linear_points: usize,
    /// Permanent shear strain defining the yield limit.
    pub yield_offset: f64,
}

impl ReducerSettings {
    /// First 70 % of the points.
    pub const STANDARD: ReducerSettings = ReducerSettings {
        linear_fraction: 0.7,
        min_linear_points: 2,
        yield_offset: 0.003,
    };
    /// First third of the points, at least three.
    pub const QUICK: ReducerSettings = ReducerSettings {
        linear_fraction: 1.0 / 3.0,
        min_linear_points: 3,
        yield_offset: 0.003,
    };

    /// Number of leading points used for the fit.
    pub fn linear_len(&self, total: usize) -> usize {
        let by_fraction = (total as f64 * self.linear_fraction).floor() as usize;
        by_fraction.max(self.min_linear_points).min(total)
    }
}

impl Default for ReducerSettings {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Slope and intercept of the ordinary least-squares line `y = a·x + b`.
///
/// `None` for fewer than two points or when all `x` coincide.
pub fn least_squares_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let (sxy, sxx) = xs[..n]
        .iter()
        .zip(&ys[..n])
        .fold((0.0, 0.0), |(sxy, sxx), (&x, &y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Slope of the ordinary least-squares line, see [`least_squares_line`].
pub fn least_squares_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    least_squares_line(xs, ys).map(|(slope, _)| slope)
}

/// Characterizes a material from a measured series.
///
/// Angles are radians. `reference` supplies the modulus the result is
/// compared against. Invalid geometry, fewer than three points or negative
/// readings give [`CharacterizationResult::empty`].
pub fn reduce_experiment(
    series: &MeasurementSeries,
    length: f64,
    diameter: f64,
    reference: Option<&MaterialProfile>,
    settings: &ReducerSettings,
) -> CharacterizationResult {
    let geometry_ok = length > 0.0 && diameter > 0.0;
    if !geometry_ok {
        log::warn!("rejecting experiment: non-positive geometry (L = {length}, d = {diameter})");
        return CharacterizationResult::empty(series.clone());
    }
    if series.len() < MeasurementSeries::MIN_POINTS {
        log::warn!("rejecting experiment: {} points", series.len());
        return CharacterizationResult::empty(series.clone());
    }
    if series.has_negative_values() {
        log::warn!("rejecting experiment: negative readings");
        return CharacterizationResult::empty(series.clone());
    }

    let points = series.points();
    let jp = polar_moment_of_inertia(diameter);
    let wp = polar_section_modulus(diameter);

    let linear = &points[..settings.linear_len(points.len())];
    let angles: Vec<f64> = linear.iter().map(|p| p.angle).collect();
    let torques: Vec<f64> = linear.iter().map(|p| p.torque).collect();
    let line = least_squares_line(&angles, &torques);
    let slope = line.map(|(k, _)| k);
    log::debug!("linear region: {} of {} points, slope {slope:?}", linear.len(), points.len());

    let shear_modulus = slope.map(|k| k * length / jp);

    // first occurrence wins on ties
    let peak = points
        .iter()
        .fold(points[0], |best, p| if p.torque > best.torque { *p } else { best });

    let gamma = relative_shear(peak.angle, diameter, length);
    let max_residual_shear = if gamma < 0.1 { gamma } else { gamma.atan() };

    let reference_modulus = reference.map(|p| p.reference_shear_modulus);
    let relative_error_percent = match (shear_modulus, reference_modulus) {
        (Some(_), Some(g_ref)) if g_ref == 0.0 => Some(0.0),
        (Some(g), Some(g_ref)) => Some((g - g_ref).abs() / g_ref * 100.0),
        _ => None,
    };

    let proportionality_limit = linear
        .iter()
        .map(|p| p.torque)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |m| m.max(t))))
        .map(|t| t / wp);

    // fitted torque at the offset twist
    let yield_angle = settings.yield_offset * length / (diameter / 2.0);
    let yield_limit = line.map(|(k, b)| (k * yield_angle + b) / wp);

    CharacterizationResult {
        polar_moment: Some(jp),
        section_modulus: Some(wp),
        linear_slope: slope,
        shear_modulus,
        reference_modulus,
        relative_error_percent,
        max_torque: Some(peak.torque),
        angle_at_max_torque: Some(peak.angle),
        max_shear_stress: max_shear_stress(peak.torque, diameter),
        max_residual_shear: Some(max_residual_shear),
        proportionality_limit,
        yield_limit,
        series: series.clone(),
    }
}

/// Quick analysis of raw `(torque, angle in degrees)` readings.
///
/// Uses [`ReducerSettings::QUICK`] and no reference material. Like every
/// other angle in the result, the echoed series is converted to radians.
pub fn analyze_degrees(data: &[(f64, f64)], length: f64, diameter: f64) -> CharacterizationResult {
    let series = MeasurementSeries::from(data.to_vec()).map_angles(f64::to_radians);
    reduce_experiment(&series, length, diameter, None, &ReducerSettings::QUICK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material_db::{profile_for, Material};

    #[test]
    fn slope_of_exact_line_with_offset() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        assert!((least_squares_slope(&xs, &ys).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn line_keeps_intercept() {
        let (k, b) = least_squares_line(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert!((k - 2.0).abs() < 1e-12);
        assert!((b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn yield_uses_fitted_line() {
        // T = 2000·φ + 1 over the linear region
        let series = MeasurementSeries::from(vec![
            (1.0, 0.0),
            (3.0, 0.001),
            (5.0, 0.002),
            (7.0, 0.003),
        ]);
        let settings = ReducerSettings {
            linear_fraction: 1.0,
            ..ReducerSettings::STANDARD
        };
        let r = reduce_experiment(&series, 100.0, 10.0, None, &settings);
        let yield_angle = 0.003 * 100.0 / 5.0;
        let expected = (2000.0 * yield_angle + 1.0) / polar_section_modulus(10.0);
        assert!((r.yield_limit.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_reference_modulus_gives_zero_error() {
        let profile = MaterialProfile {
            reference_shear_modulus: 0.0,
            ..*profile_for(Material::Wood)
        };
        let series = MeasurementSeries::from(vec![(1.0, 0.1), (2.0, 0.2), (3.0, 0.3)]);
        let settings = ReducerSettings::STANDARD;
        let r = reduce_experiment(&series, 100.0, 10.0, Some(&profile), &settings);
        assert!(r.shear_modulus.unwrap() > 0.0);
        assert_eq!(r.reference_modulus, Some(0.0));
        assert_eq!(r.relative_error_percent, Some(0.0));
    }

    #[test]
    fn slope_degenerate_cases() {
        assert!(least_squares_slope(&[1.0], &[2.0]).is_none());
        assert!(least_squares_slope(&[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0]).is_none());
    }

    #[test]
    fn linear_len_bounds() {
        assert_eq!(ReducerSettings::STANDARD.linear_len(10), 7);
        assert_eq!(ReducerSettings::STANDARD.linear_len(2), 2);
        assert_eq!(ReducerSettings::QUICK.linear_len(5), 3);
        assert_eq!(ReducerSettings::QUICK.linear_len(30), 10);
        assert_eq!(ReducerSettings::QUICK.linear_len(2), 2);
    }

    #[test]
    fn peak_takes_first_of_ties() {
        let series = MeasurementSeries::from(vec![
            (1.0, 0.1),
            (2.0, 0.2),
            (5.0, 0.3),
            (5.0, 0.4),
            (4.0, 0.5),
        ]);
        let r = reduce_experiment(&series, 100.0, 10.0, None, &ReducerSettings::STANDARD);
        assert_eq!(r.max_torque, Some(5.0));
        assert_eq!(r.angle_at_max_torque, Some(0.3));
        assert!(r.relative_error_percent.is_none());
    }

    #[test]
    fn rejected_inputs_are_empty() {
        let good = MeasurementSeries::from(vec![(1.0, 0.1), (2.0, 0.2), (3.0, 0.3)]);
        let s = ReducerSettings::STANDARD;
        assert!(reduce_experiment(&good, 0.0, 10.0, None, &s).is_empty());
        assert!(reduce_experiment(&good, 100.0, -1.0, None, &s).is_empty());
        assert!(reduce_experiment(&MeasurementSeries::default(), 100.0, 10.0, None, &s).is_empty());
        let short = MeasurementSeries::from(vec![(1.0, 0.1), (2.0, 0.2)]);
        assert!(reduce_experiment(&short, 100.0, 10.0, None, &s).is_empty());
        let negative = MeasurementSeries::from(vec![(1.0, 0.1), (-2.0, 0.2), (3.0, 0.3)]);
        let r = reduce_experiment(&negative, 100.0, 10.0, None, &s);
        assert!(r.is_empty());
        assert_eq!(r.series, negative);
    }

    #[test]
    fn large_twist_uses_arctangent() {
        // γ = 4·10 / (2·100) = 0.2
        let series = MeasurementSeries::from(vec![(1.0, 1.0), (2.0, 2.0), (3.0, 4.0)]);
        let r = reduce_experiment(&series, 100.0, 10.0, None, &ReducerSettings::STANDARD);
        assert!((r.max_residual_shear.unwrap() - 0.2f64.atan()).abs() < 1e-12);
    }
}
