use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use torsion_lab::app::{self, AppError};
use torsion_lab::config::{self, Config};
use torsion_lab::history::HistoryStore;
use torsion_lab::lab::{self, SinglePointInput};
use torsion_lab::material_db::{self, Material};
use torsion_lab::report::{self, ReportOptions};
use torsion_lab::torsion::{shear_stress_distribution, NoiseSettings, ReducerSettings};
use torsion_lab::ui_cli;
use torsion_lab::units::{convert_length, AngleUnit, LengthUnit, TorqueUnit};

/// Torsion test calculator. Runs the interactive menu without a subcommand.
#[derive(Debug, Parser)]
#[command(name = "torsion_lab_cli", version, about)]
struct Cli {
    /// Config file (created with defaults when missing).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AngleArg {
    Deg,
    Rad,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RegionArg {
    /// First 70 % of the readings.
    Standard,
    /// First third of the readings.
    Quick,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Effective modulus from one reading (mm, N·mm, degrees).
    Calc {
        #[arg(long, value_parser = parse_material)]
        material: Material,
        #[arg(long)]
        length: f64,
        #[arg(long)]
        diameter: f64,
        #[arg(long)]
        torque: f64,
        #[arg(long)]
        angle: f64,
        /// Do not append the run to the history.
        #[arg(long)]
        no_history: bool,
    },
    /// Generate a synthetic experiment and reduce it.
    Simulate {
        #[arg(long, value_parser = parse_material)]
        material: Material,
        /// Diameter in mm.
        #[arg(long)]
        diameter: f64,
        /// Gauge length in mm.
        #[arg(long)]
        length: f64,
        /// Target maximum torque in N·m.
        #[arg(long)]
        max_torque: Option<f64>,
        #[arg(long)]
        points: Option<usize>,
        #[arg(long)]
        no_noise: bool,
        #[arg(long)]
        error_percent: Option<f64>,
        /// Fixed random seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Reduce readings from a CSV file of `torque,angle` rows (torque in N·mm).
    Analyze {
        file: PathBuf,
        #[arg(long, value_parser = parse_material)]
        material: Material,
        /// Diameter in mm.
        #[arg(long)]
        diameter: f64,
        /// Gauge length in mm.
        #[arg(long)]
        length: f64,
        #[arg(long, value_enum, default_value = "deg")]
        angle_unit: AngleArg,
        #[arg(long, value_enum)]
        region: Option<RegionArg>,
        /// Write a Markdown report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Shear stress over the radius (torque in N·m, diameter in mm).
    Distribution {
        #[arg(long)]
        torque: f64,
        #[arg(long)]
        diameter: f64,
        #[arg(long, default_value_t = 11)]
        samples: usize,
    },
    /// List the material table.
    Materials,
    /// Show the hand-out examples.
    Examples,
    /// Show or clear the calculation history.
    History {
        #[arg(long)]
        clear: bool,
    },
    /// Write a Markdown report for one reading (mm, N·mm, degrees).
    Report {
        #[arg(long, value_parser = parse_material)]
        material: Material,
        #[arg(long)]
        length: f64,
        #[arg(long)]
        diameter: f64,
        #[arg(long)]
        torque: f64,
        #[arg(long)]
        angle: f64,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_material(s: &str) -> Result<Material, String> {
    material_db::find_material(s).map_err(|e| e.to_string())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = try_run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn try_run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) if path.exists() => config::load_from(path)?,
        Some(path) => {
            let cfg = Config::default();
            cfg.save_to(path)?;
            cfg
        }
        None => config::load_or_default()?,
    };
    match cli.command {
        None => app::run(&mut cfg),
        Some(command) => execute(command, &cfg),
    }
}

fn execute(command: Command, cfg: &Config) -> Result<(), AppError> {
    let history = HistoryStore::new(cfg.history_path.clone());
    match command {
        Command::Calc {
            material,
            length,
            diameter,
            torque,
            angle,
            no_history,
        } => {
            let input = SinglePointInput {
                material,
                length_mm: length,
                diameter_mm: diameter,
                torque_n_mm: torque,
                angle_deg: angle,
            };
            input.validate().map_err(AppError::Input)?;
            let outcome = input.evaluate();
            ui_cli::print_single_point(&input, &outcome);
            if !no_history {
                history.append(input.to_record(&outcome))?;
            }
        }
        Command::Simulate {
            material,
            diameter,
            length,
            max_torque,
            points,
            no_noise,
            error_percent,
            seed,
        } => {
            let mut settings = cfg.synthetic_settings();
            if let Some(t) = max_torque {
                settings.target_max_torque = t;
            }
            if let Some(n) = points {
                settings.point_count = n;
            }
            if no_noise {
                settings.noise = None;
            } else if let Some(e) = error_percent {
                settings.noise = Some(NoiseSettings { error_percent: e });
            }
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let specimen = lab::specimen_from_mm(material, diameter, length);
            let outcome =
                lab::run_synthetic(specimen, &settings, &cfg.reducer_settings(), &mut rng)?;
            println!(
                "{} readings, G used {:.1} MPa",
                outcome.experiment.series.len(),
                outcome.experiment.modulus_used / 1.0e6
            );
            ui_cli::print_characterization(&outcome.result, &cfg.display_units);
        }
        Command::Analyze {
            file,
            material,
            diameter,
            length,
            angle_unit,
            region,
            report: report_path,
        } => {
            let (torques, angles) = ui_cli::read_readings_csv(&file)?;
            let reducer = match region {
                Some(RegionArg::Standard) => ReducerSettings::STANDARD,
                Some(RegionArg::Quick) => ReducerSettings::QUICK,
                None => cfg.reducer_settings(),
            };
            let angle_unit = match angle_unit {
                AngleArg::Deg => AngleUnit::Degree,
                AngleArg::Rad => AngleUnit::Radian,
            };
            let specimen = lab::specimen_from_mm(material, diameter, length);
            let result = lab::analyze_readings(
                specimen,
                &torques,
                &angles,
                TorqueUnit::NewtonMillimeter,
                angle_unit,
                &reducer,
            )?;
            ui_cli::print_characterization(&result, &cfg.display_units);
            if let Some(path) = report_path {
                let options = ReportOptions {
                    units: cfg.display_units.clone(),
                    ..ReportOptions::default()
                };
                let text = report::render_characterization(&specimen, &result, &options);
                report::save(&path, &text)?;
                println!("Report written to {}", path.display());
            }
        }
        Command::Distribution {
            torque,
            diameter,
            samples,
        } => {
            let d = convert_length(diameter, LengthUnit::Millimeter, LengthUnit::Meter);
            let table = shear_stress_distribution(torque, d, samples);
            ui_cli::print_distribution(&table, &cfg.display_units);
        }
        Command::Materials => ui_cli::print_materials(),
        Command::Examples => ui_cli::print_examples(),
        Command::History { clear } => {
            if clear {
                history.clear()?;
                println!("History cleared.");
            } else {
                ui_cli::print_history(&history)?;
            }
        }
        Command::Report {
            material,
            length,
            diameter,
            torque,
            angle,
            output,
        } => {
            let input = SinglePointInput {
                material,
                length_mm: length,
                diameter_mm: diameter,
                torque_n_mm: torque,
                angle_deg: angle,
            };
            input.validate().map_err(AppError::Input)?;
            let text = report::render_single_point(&input, &input.evaluate());
            let path = output.unwrap_or_else(|| {
                cfg.report_dir.join(format!(
                    "torsion_{}.md",
                    chrono::Local::now().format("%Y%m%d_%H%M%S")
                ))
            });
            report::save(&path, &text)?;
            println!("Report written to {}", path.display());
        }
    }
    Ok(())
}
