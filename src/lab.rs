//! Laboratory workflows shared by the command-line, desktop and web
//! front-ends: the single-point calculator, synthetic experiments and the
//! analysis of entered readings.
//!
//! Form inputs arrive in laboratory units (mm, N·mm, degrees) and are
//! converted here; the experiment core is always fed SI values.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::history::NewRecord;
use crate::material_db::{profile_for, Material};
use crate::torsion::{
    effective_modulus, generate, reduce_experiment, CharacterizationResult, EffectiveModulus,
    MeasurementSeries, ReducerSettings, SeriesError, Specimen, SyntheticError,
    SyntheticExperiment, SyntheticSettings,
};
use crate::units::{convert_angle, convert_length, convert_torque, AngleUnit, LengthUnit, TorqueUnit};

/// One reading entered in the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinglePointInput {
    pub material: Material,
    pub length_mm: f64,
    pub diameter_mm: f64,
    pub torque_n_mm: f64,
    pub angle_deg: f64,
}

impl SinglePointInput {
    /// Fails when a value is not positive, the way the form refuses to submit.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("length", self.length_mm),
            ("diameter", self.diameter_mm),
            ("torque", self.torque_n_mm),
            ("angle", self.angle_deg),
        ];
        for (name, value) in fields {
            if value.is_nan() || value <= 0.0 {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }
        Ok(())
    }

    /// Effective modulus in MPa (N/mm²).
    pub fn evaluate(&self) -> EffectiveModulus {
        effective_modulus(
            self.torque_n_mm,
            self.length_mm,
            self.diameter_mm,
            self.angle_deg,
            profile_for(self.material),
        )
    }

    pub fn to_record(&self, outcome: &EffectiveModulus) -> NewRecord {
        NewRecord {
            material: self.material,
            length: self.length_mm,
            diameter: self.diameter_mm,
            torque: self.torque_n_mm,
            angle: self.angle_deg,
            effective_modulus: outcome.effective_modulus,
        }
    }
}

/// Specimen geometry in millimetres converted to an SI specimen.
pub fn specimen_from_mm(material: Material, diameter_mm: f64, length_mm: f64) -> Specimen {
    Specimen::new(
        material,
        convert_length(diameter_mm, LengthUnit::Millimeter, LengthUnit::Meter),
        convert_length(length_mm, LengthUnit::Millimeter, LengthUnit::Meter),
    )
}

/// A generated experiment together with its reduction.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentOutcome {
    pub specimen: Specimen,
    pub experiment: SyntheticExperiment,
    pub result: CharacterizationResult,
}

/// Generates a synthetic experiment for an SI specimen and reduces it
/// against the material reference.
pub fn run_synthetic<R: Rng + ?Sized>(
    specimen: Specimen,
    settings: &SyntheticSettings,
    reducer: &ReducerSettings,
    rng: &mut R,
) -> Result<ExperimentOutcome, SyntheticError> {
    let profile = profile_for(specimen.material);
    let experiment = generate(
        profile,
        specimen.polar_moment(),
        specimen.length,
        settings,
        rng,
    )?;
    let result = reduce_experiment(
        &experiment.series,
        specimen.length,
        specimen.diameter,
        Some(profile),
        reducer,
    );
    Ok(ExperimentOutcome {
        specimen,
        experiment,
        result,
    })
}

/// Reduces entered readings for an SI specimen.
///
/// Torques are converted from `torque_unit` to N·m and angles from
/// `angle_unit` to radians before reduction.
pub fn analyze_readings(
    specimen: Specimen,
    torques: &[f64],
    angles: &[f64],
    torque_unit: TorqueUnit,
    angle_unit: AngleUnit,
    reducer: &ReducerSettings,
) -> Result<CharacterizationResult, SeriesError> {
    let series = MeasurementSeries::from_columns(torques, angles)?;
    let si: Vec<(f64, f64)> = series
        .points()
        .iter()
        .map(|p| {
            (
                convert_torque(p.torque, torque_unit, TorqueUnit::NewtonMeter),
                convert_angle(p.angle, angle_unit, AngleUnit::Radian),
            )
        })
        .collect();
    Ok(reduce_experiment(
        &MeasurementSeries::from(si),
        specimen.length,
        specimen.diameter,
        Some(profile_for(specimen.material)),
        reducer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_rejects_non_positive_values() {
        let input = SinglePointInput {
            material: Material::Steel,
            length_mm: 100.0,
            diameter_mm: 10.0,
            torque_n_mm: 0.0,
            angle_deg: 10.0,
        };
        assert!(input.validate().unwrap_err().contains("torque"));
    }

    #[test]
    fn specimen_is_converted_to_metres() {
        let s = specimen_from_mm(Material::Wood, 10.0, 100.0);
        assert!((s.diameter - 0.01).abs() < 1e-15);
        assert!((s.length - 0.1).abs() < 1e-15);
    }

    #[test]
    fn steel_preset_readings_give_positive_modulus() {
        let specimen = specimen_from_mm(Material::Steel, 10.0, 100.0);
        let torques = [100.0, 200.0, 300.0, 400.0, 500.0];
        let angles = [0.5, 1.0, 1.5, 2.0, 2.5];
        let r = analyze_readings(
            specimen,
            &torques,
            &angles,
            TorqueUnit::NewtonMillimeter,
            AngleUnit::Degree,
            &ReducerSettings::STANDARD,
        )
        .unwrap();
        assert!(r.shear_modulus.unwrap() > 0.0);
        assert!(r.max_shear_stress.is_some());
        assert_eq!(r.reference_modulus, Some(8.1e10));
    }
}
