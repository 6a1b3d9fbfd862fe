use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::material_db::Material;
use crate::torsion::{NoiseSettings, ReducerSettings, SyntheticSettings};
use crate::units::*;

pub const CONFIG_FILE: &str = "config.toml";

/// Units used when presenting results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayUnits {
    pub length: LengthUnit,
    pub torque: TorqueUnit,
    pub angle: AngleUnit,
    pub stress: StressUnit,
}

impl Default for DisplayUnits {
    fn default() -> Self {
        Self {
            length: LengthUnit::Millimeter,
            torque: TorqueUnit::NewtonMeter,
            angle: AngleUnit::Degree,
            stress: StressUnit::MegaPascal,
        }
    }
}

/// Defaults for synthetic experiments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticConfig {
    pub point_count: usize,
    pub max_torque_n_m: f64,
    pub noise: bool,
    pub error_percent: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            point_count: 50,
            max_torque_n_m: 100.0,
            noise: true,
            error_percent: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReducerConfig {
    pub linear_fraction: f64,
    pub min_linear_points: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            linear_fraction: ReducerSettings::STANDARD.linear_fraction,
            min_linear_points: ReducerSettings::STANDARD.min_linear_points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

/// Application settings stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_material: Material,
    pub history_path: PathBuf,
    pub report_dir: PathBuf,
    pub display_units: DisplayUnits,
    pub synthetic: SyntheticConfig,
    pub reducer: ReducerConfig,
    pub web: WebConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_material: Material::Steel,
            history_path: PathBuf::from("data/history.jsonl"),
            report_dir: PathBuf::from("reports"),
            display_units: DisplayUnits::default(),
            synthetic: SyntheticConfig::default(),
            reducer: ReducerConfig::default(),
            web: WebConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Loads `config.toml`, writing the defaults when it does not exist.
pub fn load_or_default() -> Result<Config, ConfigError> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        load_from(path)
    } else {
        let cfg = Config::default();
        cfg.save_to(path)?;
        log::info!("created default {CONFIG_FILE}");
        Ok(cfg)
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

impl Config {
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn reducer_settings(&self) -> ReducerSettings {
        ReducerSettings {
            linear_fraction: self.reducer.linear_fraction,
            min_linear_points: self.reducer.min_linear_points,
            ..ReducerSettings::STANDARD
        }
    }

    /// Synthetic settings in SI units (N·m).
    pub fn synthetic_settings(&self) -> SyntheticSettings {
        SyntheticSettings {
            target_max_torque: self.synthetic.max_torque_n_m,
            point_count: self.synthetic.point_count,
            noise: self.synthetic.noise.then_some(NoiseSettings {
                error_percent: self.synthetic.error_percent,
            }),
        }
    }
}
