use thiserror::Error;

use crate::quantity::QuantityKind;
use crate::units::*;

/// Errors raised while parsing unit strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unknown {kind} unit: {unit}")]
    UnknownUnit { kind: &'static str, unit: String },
}

fn unknown(kind: QuantityKind, s: &str) -> ConversionError {
    ConversionError::UnknownUnit {
        kind: kind.label(),
        unit: s.to_string(),
    }
}

/// Converts `value` between two units given as strings.
///
/// Accepts the spellings used in the laboratory forms, e.g. `mm`, `N*mm`,
/// `N·m`, `deg`, `rad`, `MPa`.
pub fn convert(
    kind: QuantityKind,
    value: f64,
    from_unit_str: &str,
    to_unit_str: &str,
) -> Result<f64, ConversionError> {
    match kind {
        QuantityKind::Length => {
            let from = parse_length_unit(from_unit_str)?;
            let to = parse_length_unit(to_unit_str)?;
            Ok(convert_length(value, from, to))
        }
        QuantityKind::Torque => {
            let from = parse_torque_unit(from_unit_str)?;
            let to = parse_torque_unit(to_unit_str)?;
            Ok(convert_torque(value, from, to))
        }
        QuantityKind::Angle => {
            let from = parse_angle_unit(from_unit_str)?;
            let to = parse_angle_unit(to_unit_str)?;
            Ok(convert_angle(value, from, to))
        }
        QuantityKind::Stress => {
            let from = parse_stress_unit(from_unit_str)?;
            let to = parse_stress_unit(to_unit_str)?;
            Ok(convert_stress(value, from, to))
        }
    }
}

pub fn parse_length_unit(s: &str) -> Result<LengthUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "m" | "meter" | "metre" => Ok(LengthUnit::Meter),
        "mm" | "millimeter" | "millimetre" | "мм" => Ok(LengthUnit::Millimeter),
        "cm" | "centimeter" | "centimetre" => Ok(LengthUnit::Centimeter),
        "in" | "inch" => Ok(LengthUnit::Inch),
        _ => Err(unknown(QuantityKind::Length, s)),
    }
}

pub fn parse_torque_unit(s: &str) -> Result<TorqueUnit, ConversionError> {
    let normalized: String = s
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '·' || c == '*' || c == '.' { '-' } else { c })
        .collect();
    match normalized.as_str() {
        "n-m" | "nm" => Ok(TorqueUnit::NewtonMeter),
        "n-mm" | "nmm" | "н-мм" => Ok(TorqueUnit::NewtonMillimeter),
        "kn-m" | "knm" => Ok(TorqueUnit::KilonewtonMeter),
        "lbf-in" | "lb-in" | "in-lb" => Ok(TorqueUnit::PoundForceInch),
        _ => Err(unknown(QuantityKind::Torque, s)),
    }
}

pub fn parse_angle_unit(s: &str) -> Result<AngleUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "rad" | "radian" | "radians" => Ok(AngleUnit::Radian),
        "deg" | "degree" | "degrees" | "°" => Ok(AngleUnit::Degree),
        _ => Err(unknown(QuantityKind::Angle, s)),
    }
}

pub fn parse_stress_unit(s: &str) -> Result<StressUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "pa" | "pascal" => Ok(StressUnit::Pascal),
        "kpa" => Ok(StressUnit::KiloPascal),
        "mpa" | "n/mm2" | "n/mm^2" => Ok(StressUnit::MegaPascal),
        "gpa" => Ok(StressUnit::GigaPascal),
        "psi" => Ok(StressUnit::Psi),
        _ => Err(unknown(QuantityKind::Stress, s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_units_convert_to_si() {
        let d = convert(QuantityKind::Length, 10.0, "mm", "m").unwrap();
        assert!((d - 0.01).abs() < 1e-12);
        let t = convert(QuantityKind::Torque, 140_000.0, "N*mm", "N·m").unwrap();
        assert!((t - 140.0).abs() < 1e-9);
        let a = convert(QuantityKind::Angle, 180.0, "deg", "rad").unwrap();
        assert!((a - std::f64::consts::PI).abs() < 1e-12);
        let g = convert(QuantityKind::Stress, 8.1e10, "Pa", "MPa").unwrap();
        assert!((g - 81_000.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_unit_is_reported_with_its_kind() {
        let err = convert(QuantityKind::Torque, 1.0, "ft", "N*m").unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnknownUnit {
                kind: "torque",
                unit: "ft".into()
            }
        );
    }
}
