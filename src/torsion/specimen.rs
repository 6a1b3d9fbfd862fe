//! Value types shared by the models and the reducer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::section::{polar_moment_of_inertia, polar_section_modulus};
use crate::material_db::Material;

/// A cylindrical test specimen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specimen {
    pub diameter: f64,
    /// Gauge length.
    pub length: f64,
    pub material: Material,
}

impl Specimen {
    pub fn new(material: Material, diameter: f64, length: f64) -> Self {
        Self {
            diameter,
            length,
            material,
        }
    }

    pub fn polar_moment(&self) -> f64 {
        polar_moment_of_inertia(self.diameter)
    }

    pub fn section_modulus(&self) -> f64 {
        polar_section_modulus(self.diameter)
    }

    pub fn has_valid_geometry(&self) -> bool {
        self.diameter > 0.0 && self.length > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    pub torque: f64,
    /// Twist angle; radians unless the call site says otherwise.
    pub angle: f64,
}

impl MeasurementPoint {
    pub fn new(torque: f64, angle: f64) -> Self {
        Self { torque, angle }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("torque and angle columns differ in length ({torques} vs {angles})")]
    LengthMismatch { torques: usize, angles: usize },
    #[error("at least 3 measurements are required, got {0}")]
    TooFewPoints(usize),
    #[error("measurement {index} has a negative value")]
    NegativeValue { index: usize },
}

/// Measurements in recording order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSeries {
    points: Vec<MeasurementPoint>,
}

impl MeasurementSeries {
    pub const MIN_POINTS: usize = 3;

    /// Wraps points without validation. The reducer checks them itself.
    pub fn from_points(points: Vec<MeasurementPoint>) -> Self {
        Self { points }
    }

    /// Builds a series from user-entered columns.
    pub fn from_columns(torques: &[f64], angles: &[f64]) -> Result<Self, SeriesError> {
        if torques.len() != angles.len() {
            return Err(SeriesError::LengthMismatch {
                torques: torques.len(),
                angles: angles.len(),
            });
        }
        if torques.len() < Self::MIN_POINTS {
            return Err(SeriesError::TooFewPoints(torques.len()));
        }
        let mut points = Vec::with_capacity(torques.len());
        for (index, (&torque, &angle)) in torques.iter().zip(angles).enumerate() {
            if torque < 0.0 || angle < 0.0 {
                return Err(SeriesError::NegativeValue { index });
            }
            points.push(MeasurementPoint { torque, angle });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn torques(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.torque).collect()
    }

    pub fn angles(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.angle).collect()
    }

    /// Same series with every angle passed through `f`.
    pub fn map_angles(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| MeasurementPoint::new(p.torque, f(p.angle)))
                .collect(),
        }
    }

    pub fn has_negative_values(&self) -> bool {
        self.points.iter().any(|p| p.torque < 0.0 || p.angle < 0.0)
    }
}

impl From<Vec<(f64, f64)>> for MeasurementSeries {
    fn from(pairs: Vec<(f64, f64)>) -> Self {
        Self::from_points(
            pairs
                .into_iter()
                .map(|(torque, angle)| MeasurementPoint { torque, angle })
                .collect(),
        )
    }
}

/// Material characterization obtained from one experiment.
///
/// Every derived value is `None` when it could not be computed from the
/// input. A rejected input gives a result where all of them are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterizationResult {
    pub polar_moment: Option<f64>,
    pub section_modulus: Option<f64>,
    /// Torque per radian in the linear region.
    pub linear_slope: Option<f64>,
    pub shear_modulus: Option<f64>,
    pub reference_modulus: Option<f64>,
    pub relative_error_percent: Option<f64>,
    pub max_torque: Option<f64>,
    pub angle_at_max_torque: Option<f64>,
    pub max_shear_stress: Option<f64>,
    pub max_residual_shear: Option<f64>,
    pub proportionality_limit: Option<f64>,
    pub yield_limit: Option<f64>,
    /// Input series echoed back, with angles in radians.
    pub series: MeasurementSeries,
}

impl CharacterizationResult {
    pub fn empty(series: MeasurementSeries) -> Self {
        Self {
            polar_moment: None,
            section_modulus: None,
            linear_slope: None,
            shear_modulus: None,
            reference_modulus: None,
            relative_error_percent: None,
            max_torque: None,
            angle_at_max_torque: None,
            max_shear_stress: None,
            max_residual_shear: None,
            proportionality_limit: None,
            yield_limit: None,
            series,
        }
    }

    /// True when nothing was derived.
    pub fn is_empty(&self) -> bool {
        [
            self.polar_moment,
            self.section_modulus,
            self.linear_slope,
            self.shear_modulus,
            self.reference_modulus,
            self.relative_error_percent,
            self.max_torque,
            self.angle_at_max_torque,
            self.max_shear_stress,
            self.max_residual_shear,
            self.proportionality_limit,
            self.yield_limit,
        ]
        .iter()
        .all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_validated() {
        assert_eq!(
            MeasurementSeries::from_columns(&[1.0, 2.0], &[0.1]),
            Err(SeriesError::LengthMismatch {
                torques: 2,
                angles: 1
            })
        );
        assert_eq!(
            MeasurementSeries::from_columns(&[1.0, 2.0], &[0.1, 0.2]),
            Err(SeriesError::TooFewPoints(2))
        );
        assert_eq!(
            MeasurementSeries::from_columns(&[1.0, 2.0, 3.0], &[0.1, -0.2, 0.3]),
            Err(SeriesError::NegativeValue { index: 1 })
        );
        let ok = MeasurementSeries::from_columns(&[1.0, 2.0, 3.0], &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(ok.len(), 3);
        assert_eq!(ok.torques(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_result_reports_empty() {
        let r = CharacterizationResult::empty(MeasurementSeries::default());
        assert!(r.is_empty());
        let mut r2 = r.clone();
        r2.max_torque = Some(1.0);
        assert!(!r2.is_empty());
    }

    #[test]
    fn specimen_geometry() {
        let s = Specimen::new(Material::Steel, 10.0, 100.0);
        assert!(s.has_valid_geometry());
        assert!((s.polar_moment() - 981.747_704).abs() < 1e-5);
        assert!(!Specimen::new(Material::Wood, 0.0, 100.0).has_valid_geometry());
    }
}
