//! Torsion test calculator library shared by the command-line, desktop and
//! web front-ends.

pub mod app;
pub mod config;
pub mod conversion;
pub mod history;
pub mod lab;
pub mod material_db;
pub mod presets;
pub mod quantity;
pub mod report;
pub mod torsion;
pub mod ui_cli;
pub mod units;
