//! Markdown lab reports.

use chrono::Local;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::DisplayUnits;
use crate::lab::SinglePointInput;
use crate::material_db::{failure_description_for, profile_for, validate_modulus, Plausibility};
use crate::torsion::{CharacterizationResult, EffectiveModulus, Regime, Specimen};
use crate::units::{
    convert_angle, convert_length, convert_torque, from_pascal, AngleUnit, LengthUnit, TorqueUnit,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub author: Option<String>,
    pub group: Option<String>,
    pub units: DisplayUnits,
    /// Widening of the typical modulus range for the plausibility verdict.
    pub tolerance: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Determination of the shear modulus in torsion".to_string(),
            author: None,
            group: None,
            units: DisplayUnits::default(),
            tolerance: 0.2,
        }
    }
}

fn row(out: &mut String, name: &str, value: impl std::fmt::Display) -> std::fmt::Result {
    writeln!(out, "| {name} | {value} |")
}

fn or_na(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| "n/a".to_string())
}

/// Full report of a reduced experiment. `specimen` and `result` are SI.
pub fn render_characterization(
    specimen: &Specimen,
    result: &CharacterizationResult,
    options: &ReportOptions,
) -> String {
    let mut out = String::new();
    // writing into a String does not fail
    let _ = write_characterization(&mut out, specimen, result, options);
    out
}

fn write_characterization(
    out: &mut String,
    specimen: &Specimen,
    result: &CharacterizationResult,
    options: &ReportOptions,
) -> std::fmt::Result {
    let u = &options.units;
    let len = |v: f64| convert_length(v, LengthUnit::Meter, u.length);
    let stress = |v: f64| from_pascal(v, u.stress);
    let torque = |v: f64| convert_torque(v, TorqueUnit::NewtonMeter, u.torque);
    let angle = |v: f64| convert_angle(v, AngleUnit::Radian, u.angle);
    let ls = u.length.symbol();
    let ss = u.stress.symbol();
    let in_stress = |v: f64, digits: usize| format!("{:.digits$} {ss}", stress(v));

    writeln!(out, "# {}", options.title)?;
    writeln!(out)?;
    if let Some(author) = &options.author {
        writeln!(out, "Performed by: {author}  ")?;
    }
    if let Some(group) = &options.group {
        writeln!(out, "Group: {group}  ")?;
    }
    writeln!(out, "Date: {}", Local::now().format("%d.%m.%Y"))?;
    writeln!(out)?;
    writeln!(out, "## Purpose")?;
    writeln!(out)?;
    writeln!(
        out,
        "Determine the shear modulus G of {} from a torsion test and compare it with the reference value.",
        specimen.material.name().to_lowercase()
    )?;
    writeln!(out)?;

    writeln!(out, "## Specimen")?;
    writeln!(out)?;
    writeln!(out, "| Quantity | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| Material | {} |", specimen.material)?;
    writeln!(out, "| Diameter D | {:.3} {ls} |", len(specimen.diameter))?;
    writeln!(out, "| Gauge length L | {:.3} {ls} |", len(specimen.length))?;
    let jp = or_na(result.polar_moment, |v| format!("{v:.4e} m⁴"));
    let wp = or_na(result.section_modulus, |v| format!("{v:.4e} m³"));
    row(out, "Polar moment Jp", jp)?;
    row(out, "Section modulus Wp", wp)?;
    row(out, "Readings", result.series.len())?;
    writeln!(out)?;

    writeln!(out, "## Formulas")?;
    writeln!(out)?;
    writeln!(out, "- Jp = π·D⁴/32, Wp = π·D³/16")?;
    writeln!(out, "- G = k·L/Jp, where k is the slope of T(φ) in the linear region")?;
    writeln!(out, "- τmax = Tmax/Wp")?;
    writeln!(out, "- γmax = φmax·D/(2L), or arctan of it when it reaches 0.1")?;
    writeln!(out)?;

    writeln!(out, "## Results")?;
    writeln!(out)?;
    writeln!(out, "| Quantity | Value |")?;
    writeln!(out, "|---|---|")?;
    let max_torque = or_na(result.max_torque, |v| {
        format!("{:.3} {}", torque(v), u.torque.symbol())
    });
    let peak_angle = or_na(result.angle_at_max_torque, |v| {
        format!("{:.4} {}", angle(v), u.angle.symbol())
    });
    let error = or_na(result.relative_error_percent, |v| format!("{v:.2} %"));
    let gamma = or_na(result.max_residual_shear, |v| format!("{v:.5} rad"));
    row(out, "G experimental", or_na(result.shear_modulus, |v| in_stress(v, 1)))?;
    row(out, "G reference", or_na(result.reference_modulus, |v| in_stress(v, 1)))?;
    row(out, "Relative error", error)?;
    row(out, "Tmax", max_torque)?;
    row(out, "φ at Tmax", peak_angle)?;
    row(out, "τmax", or_na(result.max_shear_stress, |v| in_stress(v, 2)))?;
    row(out, "γmax", gamma)?;
    row(
        out,
        "Proportionality limit",
        or_na(result.proportionality_limit, |v| in_stress(v, 2)),
    )?;
    row(out, "Yield limit (0.3 %)", or_na(result.yield_limit, |v| in_stress(v, 2)))?;
    writeln!(out)?;

    writeln!(out, "## Conclusions")?;
    writeln!(out)?;
    match result.shear_modulus {
        Some(g) => {
            let check = validate_modulus(specimen.material, g, options.tolerance);
            let verdict = match check.verdict {
                Plausibility::Within => "lies within",
                Plausibility::TooLow => "is below",
                Plausibility::TooHigh => "is above",
            };
            writeln!(
                out,
                "The measured modulus {verdict} the typical range for {} ({:.0} to {:.0} {ss}, ±{:.0} %).",
                specimen.material.name().to_lowercase(),
                stress(check.lower),
                stress(check.upper),
                options.tolerance * 100.0
            )?;
        }
        None => writeln!(
            out,
            "The shear modulus could not be determined from these readings."
        )?,
    }
    writeln!(out)?;
    writeln!(out, "Failure mode: {}", failure_description_for(specimen.material))?;
    Ok(())
}

/// Short report of one calculator reading (lab units, modulus in MPa).
pub fn render_single_point(input: &SinglePointInput, outcome: &EffectiveModulus) -> String {
    let mut out = String::new();
    let _ = write_single_point(&mut out, input, outcome);
    out
}

fn write_single_point(
    out: &mut String,
    input: &SinglePointInput,
    outcome: &EffectiveModulus,
) -> std::fmt::Result {
    let profile = profile_for(input.material);
    writeln!(out, "# Effective shear modulus in torsion")?;
    writeln!(out)?;
    writeln!(out, "Date: {}", Local::now().format("%d.%m.%Y"))?;
    writeln!(out)?;
    writeln!(out, "| Quantity | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| Material | {} |", input.material)?;
    writeln!(out, "| Length L | {:.2} mm |", input.length_mm)?;
    writeln!(out, "| Diameter D | {:.2} mm |", input.diameter_mm)?;
    writeln!(out, "| Torque T | {:.1} N·mm |", input.torque_n_mm)?;
    writeln!(out, "| Angle θ | {:.2}° |", input.angle_deg)?;
    let k = profile.stiffness_coefficient;
    writeln!(out, "| Stiffness coefficient k | {k:.2} |")?;
    writeln!(out, "| Elastic limit | {}° |", profile.elastic_limit_deg)?;
    writeln!(out, "| Failure angle | {}° |", profile.failure_angle_deg)?;
    writeln!(out, "| Regime | {} |", outcome.regime.label())?;
    let mpa = |v: f64| format!("{v:.2} MPa");
    row(out, "G_eff", or_na(outcome.effective_modulus, mpa))?;
    row(out, "τmax", or_na(outcome.max_shear_stress, mpa))?;
    writeln!(out)?;
    writeln!(out, "G = T·L/(Jp·θ), with Jp = π·D⁴/32 and θ in radians.")?;
    writeln!(
        out,
        "G_eff = k·G up to the elastic limit; beyond it G_eff falls linearly to zero at the failure angle."
    )?;
    for warning in &outcome.warnings {
        writeln!(out)?;
        writeln!(out, "> {warning}")?;
    }
    if outcome.regime == Regime::Failed {
        writeln!(out)?;
        writeln!(out, "Failure mode: {}", profile.failure_description)?;
    }
    Ok(())
}

/// Writes a report, creating the parent directory if needed.
pub fn save(path: &Path, text: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    log::info!("report saved to {}", path.display());
    Ok(())
}
