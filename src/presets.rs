//! Worked examples from the laboratory hand-out.
//!
//! Geometry is in millimetres, torque in N·mm, angles in degrees and the
//! hand-out moduli in MPa, the units students fill the form in.

use serde::Serialize;

use crate::material_db::Material;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CalculationPreset {
    pub title: &'static str,
    pub description: &'static str,
    pub material: Material,
    pub length_mm: f64,
    pub diameter_mm: f64,
    pub torque_n_mm: f64,
    pub angle_deg: f64,
    /// Approximate value quoted in the hand-out.
    pub handout_modulus_mpa: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExperimentPreset {
    pub title: &'static str,
    pub material: Material,
    pub length_mm: f64,
    pub diameter_mm: f64,
    /// `(torque N·mm, angle °)` readings.
    pub readings: &'static [(f64, f64)],
}

const CALCULATIONS: &[CalculationPreset] = &[
    CalculationPreset {
        title: "Steel, elastic range",
        description: "Steel within the elastic limit (angle below 15°)",
        material: Material::Steel,
        length_mm: 100.0,
        diameter_mm: 10.0,
        torque_n_mm: 140_000.0,
        angle_deg: 10.0,
        handout_modulus_mpa: 81_705.0,
    },
    CalculationPreset {
        title: "Steel, plastic range",
        description: "Steel past the elastic limit (angle above 15°)",
        material: Material::Steel,
        length_mm: 120.0,
        diameter_mm: 12.0,
        torque_n_mm: 160_000.0,
        angle_deg: 20.0,
        handout_modulus_mpa: 38_000.0,
    },
    CalculationPreset {
        title: "Cast iron, elastic range",
        description: "Cast iron within the elastic limit (angle below 10°)",
        material: Material::CastIron,
        length_mm: 100.0,
        diameter_mm: 10.0,
        torque_n_mm: 70_000.0,
        angle_deg: 8.0,
        handout_modulus_mpa: 51_000.0,
    },
    CalculationPreset {
        title: "Cast iron, near failure",
        description: "Cast iron close to the failure angle (angle above 10°)",
        material: Material::CastIron,
        length_mm: 150.0,
        diameter_mm: 12.0,
        torque_n_mm: 80_000.0,
        angle_deg: 15.0,
        handout_modulus_mpa: 15_000.0,
    },
    CalculationPreset {
        title: "Wood, elastic range",
        description: "Wood within the elastic limit (angle below 8°)",
        material: Material::Wood,
        length_mm: 100.0,
        diameter_mm: 10.0,
        torque_n_mm: 1_400.0,
        angle_deg: 5.0,
        handout_modulus_mpa: 1_300.0,
    },
    CalculationPreset {
        title: "Wood, plastic range",
        description: "Wood past the elastic limit (angle above 8°)",
        material: Material::Wood,
        length_mm: 100.0,
        diameter_mm: 10.0,
        torque_n_mm: 2_000.0,
        angle_deg: 12.0,
        handout_modulus_mpa: 600.0,
    },
];

const EXPERIMENTS: &[ExperimentPreset] = &[
    ExperimentPreset {
        title: "Steel, linear response",
        material: Material::Steel,
        length_mm: 100.0,
        diameter_mm: 10.0,
        readings: &[
            (100.0, 0.5),
            (200.0, 1.0),
            (300.0, 1.5),
            (400.0, 2.0),
            (500.0, 2.5),
            (600.0, 3.0),
            (700.0, 3.5),
            (800.0, 4.0),
        ],
    },
    ExperimentPreset {
        title: "Cast iron with plasticity",
        material: Material::CastIron,
        length_mm: 100.0,
        diameter_mm: 10.0,
        readings: &[
            (50.0, 0.3),
            (100.0, 0.6),
            (150.0, 0.9),
            (200.0, 1.3),
            (250.0, 1.8),
            (300.0, 2.5),
            (320.0, 3.0),
            (330.0, 3.8),
        ],
    },
    ExperimentPreset {
        title: "Wood to failure",
        material: Material::Wood,
        length_mm: 100.0,
        diameter_mm: 10.0,
        readings: &[
            (50.0, 0.5),
            (100.0, 1.0),
            (150.0, 1.6),
            (200.0, 2.3),
            (250.0, 3.2),
            (280.0, 4.5),
            (290.0, 6.0),
            (285.0, 8.0),
        ],
    },
];

pub fn calculations() -> &'static [CalculationPreset] {
    CALCULATIONS
}

pub fn experiments() -> &'static [ExperimentPreset] {
    EXPERIMENTS
}
