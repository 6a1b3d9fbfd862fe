use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::app::AppError;
use crate::config::{Config, DisplayUnits};
use crate::conversion;
use crate::history::HistoryStore;
use crate::lab::{self, SinglePointInput};
use crate::material_db::{self, Material};
use crate::presets;
use crate::quantity::QuantityKind;
use crate::torsion::{
    shear_stress_distribution, CharacterizationResult, EffectiveModulus, StressSample,
};
use crate::units::{
    convert_angle, convert_length, convert_torque, from_pascal, AngleUnit, LengthUnit, TorqueUnit,
};

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SinglePoint,
    Synthetic,
    Analyze,
    StressDistribution,
    Materials,
    Examples,
    History,
    UnitConversion,
    Settings,
    Exit,
}

pub fn main_menu() -> Result<MenuChoice, AppError> {
    println!("\n=== Torsion Lab ===");
    println!("1) Effective modulus (single reading)");
    println!("2) Synthetic experiment");
    println!("3) Analyze readings");
    println!("4) Shear stress distribution");
    println!("5) Materials");
    println!("6) Hand-out examples");
    println!("7) History");
    println!("8) Unit conversion");
    println!("9) Settings");
    println!("0) Exit");
    loop {
        let sel = read_line("Choice: ")?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::SinglePoint),
            "2" => return Ok(MenuChoice::Synthetic),
            "3" => return Ok(MenuChoice::Analyze),
            "4" => return Ok(MenuChoice::StressDistribution),
            "5" => return Ok(MenuChoice::Materials),
            "6" => return Ok(MenuChoice::Examples),
            "7" => return Ok(MenuChoice::History),
            "8" => return Ok(MenuChoice::UnitConversion),
            "9" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("Invalid choice, try again."),
        }
    }
}

pub fn handle_single_point(cfg: &Config, history: &HistoryStore) -> Result<(), AppError> {
    println!("\n-- Effective modulus --");
    let material = read_material(cfg.default_material)?;
    let input = SinglePointInput {
        material,
        length_mm: read_f64("Length L [mm]: ")?,
        diameter_mm: read_f64("Diameter D [mm]: ")?,
        torque_n_mm: read_f64("Torque T [N·mm]: ")?,
        angle_deg: read_f64("Twist angle θ [°]: ")?,
    };
    input.validate().map_err(AppError::Input)?;
    let outcome = input.evaluate();
    print_single_point(&input, &outcome);
    let stored = history.append(input.to_record(&outcome))?;
    println!("Saved to history as #{}.", stored.id);
    Ok(())
}

pub fn handle_synthetic(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- Synthetic experiment --");
    let material = read_material(cfg.default_material)?;
    let diameter = read_f64("Diameter D [mm]: ")?;
    let length = read_f64("Length L [mm]: ")?;
    let mut settings = cfg.synthetic_settings();
    settings.target_max_torque = read_f64("Maximum torque [N·m]: ")?;
    let specimen = lab::specimen_from_mm(material, diameter, length);
    let outcome = lab::run_synthetic(
        specimen,
        &settings,
        &cfg.reducer_settings(),
        &mut rand::thread_rng(),
    )?;
    println!(
        "Generated {} readings (G used: {:.1} MPa).",
        outcome.experiment.series.len(),
        outcome.experiment.modulus_used / 1.0e6
    );
    print_characterization(&outcome.result, &cfg.display_units);
    Ok(())
}

pub fn handle_analyze(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- Analyze readings --");
    let material = read_material(cfg.default_material)?;
    let diameter = read_f64("Diameter D [mm]: ")?;
    let length = read_f64("Length L [mm]: ")?;
    let path = read_line("CSV file with torque [N·mm], angle [°] rows: ")?;
    let (torques, angles) = read_readings_csv(Path::new(path.trim()))?;
    let result = lab::analyze_readings(
        lab::specimen_from_mm(material, diameter, length),
        &torques,
        &angles,
        TorqueUnit::NewtonMillimeter,
        AngleUnit::Degree,
        &cfg.reducer_settings(),
    )?;
    print_characterization(&result, &cfg.display_units);
    Ok(())
}

pub fn handle_stress_distribution(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- Shear stress distribution --");
    let torque = read_f64("Torque T [N·m]: ")?;
    let diameter_mm = read_f64("Diameter D [mm]: ")?;
    let diameter = convert_length(diameter_mm, LengthUnit::Millimeter, LengthUnit::Meter);
    let samples = shear_stress_distribution(torque, diameter, 11);
    print_distribution(&samples, &cfg.display_units);
    Ok(())
}

pub fn handle_unit_conversion() -> Result<(), AppError> {
    println!("\n-- Unit conversion --");
    println!("1) length  2) torque  3) angle  4) stress");
    let kind = loop {
        let sel = read_line("Quantity: ")?;
        if let Some(kind) = map_quantity(sel.trim()) {
            break kind;
        }
        println!("Unsupported choice.");
    };
    let value = read_f64("Value: ")?;
    let from_unit = read_line("From unit (e.g. mm, N*mm, deg, MPa): ")?;
    let to_unit = read_line("To unit (e.g. m, N*m, rad, GPa): ")?;
    let result = conversion::convert(kind, value, from_unit.trim(), to_unit.trim())?;
    println!("Result: {result} {}", to_unit.trim());
    Ok(())
}

fn map_quantity(s: &str) -> Option<QuantityKind> {
    match s {
        "1" => Some(QuantityKind::Length),
        "2" => Some(QuantityKind::Torque),
        "3" => Some(QuantityKind::Angle),
        "4" => Some(QuantityKind::Stress),
        _ => None,
    }
}

pub fn handle_settings(cfg: &mut Config) -> Result<(), AppError> {
    println!("\n-- Settings --");
    println!("Default material: {}", cfg.default_material);
    cfg.default_material = read_material(cfg.default_material)?;
    println!(
        "Linear region fraction: {} (enter to keep)",
        cfg.reducer.linear_fraction
    );
    let fraction = read_line("New fraction (0-1]: ")?;
    if !fraction.trim().is_empty() {
        match fraction.trim().parse::<f64>() {
            Ok(v) if v > 0.0 && v <= 1.0 => cfg.reducer.linear_fraction = v,
            _ => println!("Out of range, keeping the current value."),
        }
    }
    println!(
        "Synthetic noise is {}.",
        if cfg.synthetic.noise { "on" } else { "off" }
    );
    let noise = read_line("Noise on/off (enter to keep): ")?;
    match noise.trim() {
        "on" => cfg.synthetic.noise = true,
        "off" => cfg.synthetic.noise = false,
        _ => {}
    }
    Ok(())
}

pub fn print_single_point(input: &SinglePointInput, outcome: &EffectiveModulus) {
    for warning in &outcome.warnings {
        println!("Warning: {warning}");
    }
    println!("Material: {} ({})", input.material, outcome.regime.label());
    match outcome.effective_modulus {
        Some(g) => println!("Effective modulus G_eff: {g:.2} MPa"),
        None => println!("Effective modulus G_eff: n/a (zero twist)"),
    }
    if let Some(tau) = outcome.max_shear_stress {
        println!("Maximum shear stress: {tau:.2} MPa");
    }
    println!("Relative shear γ: {:.5}", outcome.relative_shear);
}

fn show(label: &str, value: Option<f64>, f: impl Fn(f64) -> String) {
    match value {
        Some(v) => println!("{label}: {}", f(v)),
        None => println!("{label}: n/a"),
    }
}

/// Prints an SI result in the configured display units.
pub fn print_characterization(result: &CharacterizationResult, units: &DisplayUnits) {
    if result.is_empty() {
        println!("No result: the readings or the geometry were rejected.");
        return;
    }
    let ss = units.stress.symbol();
    let stress = |v: f64| format!("{:.2} {ss}", from_pascal(v, units.stress));
    show("G experimental", result.shear_modulus, &stress);
    show("G reference", result.reference_modulus, &stress);
    show("Relative error", result.relative_error_percent, |v| format!("{v:.2} %"));
    show("Tmax", result.max_torque, |v| {
        format!(
            "{:.3} {}",
            convert_torque(v, TorqueUnit::NewtonMeter, units.torque),
            units.torque.symbol()
        )
    });
    show("φ at Tmax", result.angle_at_max_torque, |v| {
        format!(
            "{:.4} {}",
            convert_angle(v, AngleUnit::Radian, units.angle),
            units.angle.symbol()
        )
    });
    show("τmax", result.max_shear_stress, &stress);
    show("γmax", result.max_residual_shear, |v| format!("{v:.5} rad"));
    show("Proportionality limit", result.proportionality_limit, &stress);
    show("Yield limit (0.3 %)", result.yield_limit, &stress);
}

pub fn print_distribution(samples: &[StressSample], units: &DisplayUnits) {
    println!(
        "{:>12} {:>14}",
        format!("ρ [{}]", units.length.symbol()),
        format!("τ [{}]", units.stress.symbol())
    );
    for s in samples {
        println!(
            "{:>12.4} {:>14.3}",
            convert_length(s.radius, LengthUnit::Meter, units.length),
            from_pascal(s.shear_stress, units.stress)
        );
    }
}

pub fn print_materials() {
    for p in material_db::materials() {
        println!(
            "{:<10} G_ref = {:>7.1} GPa  k = {:.2}  elastic limit {:>4}°  failure {:>4}°  typical {:.1}-{:.1} GPa",
            p.material.name(),
            p.reference_shear_modulus / 1.0e9,
            p.stiffness_coefficient,
            p.elastic_limit_deg,
            p.failure_angle_deg,
            p.typical_range.min / 1.0e9,
            p.typical_range.max / 1.0e9
        );
    }
}

pub fn print_examples() {
    println!("Single readings (mm, N·mm, °):");
    for (idx, ex) in presets::calculations().iter().enumerate() {
        let input = SinglePointInput {
            material: ex.material,
            length_mm: ex.length_mm,
            diameter_mm: ex.diameter_mm,
            torque_n_mm: ex.torque_n_mm,
            angle_deg: ex.angle_deg,
        };
        let g = input
            .evaluate()
            .effective_modulus
            .map(|g| format!("{g:.0}"))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "{}) {}: L={} D={} T={} θ={} -> G_eff {g} MPa (hand-out ≈ {})",
            idx + 1,
            ex.title,
            ex.length_mm,
            ex.diameter_mm,
            ex.torque_n_mm,
            ex.angle_deg,
            ex.handout_modulus_mpa
        );
    }
    println!("\nExample series (N·mm, °):");
    for ex in presets::experiments() {
        let pairs: Vec<String> = ex
            .readings
            .iter()
            .map(|(t, a)| format!("({t}, {a})"))
            .collect();
        println!("{}: {}", ex.title, pairs.join(" "));
    }
}

pub fn print_history(store: &HistoryStore) -> Result<(), AppError> {
    let records = store.load_all()?;
    if records.is_empty() {
        println!("History is empty.");
        return Ok(());
    }
    for r in records {
        let g = r
            .effective_modulus
            .map(|g| format!("{g:.2}"))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "#{:<4} {}  {:<10} L={} D={} T={} θ={} G_eff={g}",
            r.id,
            r.timestamp.format("%Y-%m-%d %H:%M"),
            r.material.name(),
            r.length,
            r.diameter,
            r.torque,
            r.angle
        );
    }
    Ok(())
}

/// Parses `torque,angle` rows. A non-numeric first line is taken as a header;
/// blank lines and `#` comments are skipped.
pub fn parse_readings(text: &str) -> Result<(Vec<f64>, Vec<f64>), AppError> {
    let mut torques = Vec::new();
    let mut angles = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cols = line.split([',', ';', '\t']).map(str::trim);
        let parsed = match (cols.next(), cols.next()) {
            (Some(t), Some(a)) => t.parse::<f64>().ok().zip(a.parse::<f64>().ok()),
            _ => None,
        };
        match parsed {
            Some((t, a)) => {
                torques.push(t);
                angles.push(a);
            }
            None if idx == 0 => continue,
            None => {
                return Err(AppError::Input(format!(
                    "line {}: expected `torque,angle`, got `{line}`",
                    idx + 1
                )))
            }
        }
    }
    Ok((torques, angles))
}

pub fn read_readings_csv(path: &Path) -> Result<(Vec<f64>, Vec<f64>), AppError> {
    parse_readings(&fs::read_to_string(path)?)
}

fn read_material(default: Material) -> Result<Material, AppError> {
    loop {
        let s = read_line(&format!("Material (Steel / Cast Iron / Wood) [{default}]: "))?;
        if s.trim().is_empty() {
            return Ok(default);
        }
        match material_db::find_material(&s) {
            Ok(m) => return Ok(m),
            Err(e) => println!("{e}"),
        }
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

fn read_f64(prompt: &str) -> Result<f64, AppError> {
    loop {
        let s = read_line(prompt)?;
        match s.trim().parse::<f64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("Please enter a number."),
        }
    }
}
