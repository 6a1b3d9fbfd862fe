use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::conversion::ConversionError;
use crate::history::{HistoryError, HistoryStore};
use crate::material_db::MaterialError;
use crate::report::ReportError;
use crate::torsion::{SeriesError, SyntheticError};
use crate::ui_cli::{self, MenuChoice};

/// Errors surfaced to the command-line user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error("invalid readings: {0}")]
    Series(#[from] SeriesError),
    #[error("synthetic experiment: {0}")]
    Synthetic(#[from] SyntheticError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("invalid input: {0}")]
    Input(String),
}

/// Runs the interactive menu loop.
pub fn run(config: &mut Config) -> Result<(), AppError> {
    let history = HistoryStore::new(config.history_path.clone());
    loop {
        let outcome = match ui_cli::main_menu()? {
            MenuChoice::SinglePoint => ui_cli::handle_single_point(config, &history),
            MenuChoice::Synthetic => ui_cli::handle_synthetic(config),
            MenuChoice::Analyze => ui_cli::handle_analyze(config),
            MenuChoice::StressDistribution => ui_cli::handle_stress_distribution(config),
            MenuChoice::Materials => {
                ui_cli::print_materials();
                Ok(())
            }
            MenuChoice::Examples => {
                ui_cli::print_examples();
                Ok(())
            }
            MenuChoice::History => ui_cli::print_history(&history),
            MenuChoice::UnitConversion => ui_cli::handle_unit_conversion(),
            MenuChoice::Settings => {
                ui_cli::handle_settings(config)?;
                config.save().map_err(AppError::from)
            }
            MenuChoice::Exit => {
                config.save()?;
                println!("Bye.");
                break;
            }
        };
        // a bad entry should not end the session
        if let Err(err) = outcome {
            match err {
                AppError::Io(_) => return Err(err),
                other => println!("Error: {other}"),
            }
        }
    }
    Ok(())
}
