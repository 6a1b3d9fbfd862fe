#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui desktop front-end.

use eframe::{egui, App, Frame};
use image::GenericImageView;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rfd::FileDialog;
use std::{fs, path::Path};
use torsion_lab::{
    config, conversion,
    history::{HistoryRecord, HistoryStore},
    lab::{self, ExperimentOutcome, SinglePointInput},
    material_db::{self, Material},
    presets,
    quantity::QuantityKind,
    report::{self, ReportOptions},
    torsion::{
        self, CharacterizationResult, EffectiveModulus, NoiseSettings, ReducerSettings, Specimen,
        StressSample,
    },
    ui_cli,
    units::{from_pascal, AngleUnit, StressUnit, TorqueUnit},
};

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut viewport = egui::ViewportBuilder::default().with_inner_size([1100.0, 760.0]);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    // the desktop app keeps running on defaults if the file is broken
    let app_cfg = config::load_or_default().unwrap_or_else(|e| {
        log::warn!("using default settings: {e}");
        config::Config::default()
    });
    eframe::run_native(
        "Torsion Lab",
        options,
        Box::new(move |_cc| Box::new(GuiApp::new(app_cfg.clone()))),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

fn label_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.label(text).on_hover_text(tip)
}

fn heading_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.heading(text).on_hover_text(tip)
}

fn or_na(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| "n/a".to_string())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tab {
    Calculator,
    Experiment,
    Stress,
    History,
    Report,
    UnitConv,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ExperimentSource {
    Synthetic,
    Manual,
}

/// A line or scatter series for [`draw_plot`].
struct PlotSeries {
    points: Vec<[f64; 2]>,
    color: egui::Color32,
    markers: bool,
    label: String,
}

struct GuiApp {
    config: config::Config,
    history: HistoryStore,
    tab: Tab,
    show_settings_modal: bool,
    settings_status: Option<String>,
    // single reading
    calc_input: SinglePointInput,
    calc_outcome: Option<EffectiveModulus>,
    calc_status: Option<String>,
    // experiment
    exp_source: ExperimentSource,
    exp_material: Material,
    exp_diameter_mm: f64,
    exp_length_mm: f64,
    exp_max_torque: f64,
    exp_points: usize,
    exp_noise: bool,
    exp_error_percent: f64,
    exp_seed_text: String,
    exp_quick_region: bool,
    exp_readings_text: String,
    exp_specimen: Option<Specimen>,
    exp_result: Option<CharacterizationResult>,
    exp_status: Option<String>,
    // stress distribution
    stress_torque: f64,
    stress_diameter_mm: f64,
    stress_samples: Vec<StressSample>,
    // history
    history_records: Vec<HistoryRecord>,
    history_status: Option<String>,
    // report
    report_author: String,
    report_group: String,
    report_text: String,
    report_status: Option<String>,
    // unit conversion
    conv_kind: QuantityKind,
    conv_value: f64,
    conv_from: String,
    conv_to: String,
    conv_result: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let example = presets::calculations()[0];
        let (conv_from, conv_to) = default_units_for_kind(QuantityKind::Torque);
        let history = HistoryStore::new(config.history_path.clone());
        Self {
            history,
            tab: Tab::Calculator,
            show_settings_modal: false,
            settings_status: None,
            calc_input: SinglePointInput {
                material: config.default_material,
                length_mm: example.length_mm,
                diameter_mm: example.diameter_mm,
                torque_n_mm: example.torque_n_mm,
                angle_deg: example.angle_deg,
            },
            calc_outcome: None,
            calc_status: None,
            exp_source: ExperimentSource::Synthetic,
            exp_material: config.default_material,
            exp_diameter_mm: 10.0,
            exp_length_mm: 100.0,
            exp_max_torque: config.synthetic.max_torque_n_m,
            exp_points: config.synthetic.point_count,
            exp_noise: config.synthetic.noise,
            exp_error_percent: config.synthetic.error_percent,
            exp_seed_text: String::new(),
            exp_quick_region: false,
            exp_readings_text: readings_text(presets::experiments()[0].readings),
            exp_specimen: None,
            exp_result: None,
            exp_status: None,
            stress_torque: 100.0,
            stress_diameter_mm: 10.0,
            stress_samples: Vec::new(),
            history_records: Vec::new(),
            history_status: None,
            report_author: String::new(),
            report_group: String::new(),
            report_text: String::new(),
            report_status: None,
            conv_kind: QuantityKind::Torque,
            conv_value: 1.0,
            conv_from,
            conv_to,
            conv_result: None,
            config,
        }
    }

    fn ui_nav(&mut self, ui: &mut egui::Ui) {
        ui.style_mut().wrap = Some(false);
        ui.vertical_centered(|ui| {
            ui.heading("Menu");
            ui.add_space(8.0);
        });
        for (tab, label) in [
            (Tab::Calculator, "Effective modulus"),
            (Tab::Experiment, "Experiment"),
            (Tab::Stress, "Stress distribution"),
            (Tab::History, "History"),
            (Tab::Report, "Report"),
            (Tab::UnitConv, "Unit converter"),
        ] {
            let selected = self.tab == tab;
            let button = egui::Button::new(label)
                .fill(if selected {
                    ui.visuals().selection.bg_fill
                } else {
                    ui.visuals().extreme_bg_color
                })
                .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add(button).on_hover_text("Switch menu").clicked() {
                self.tab = tab;
                if tab == Tab::History {
                    self.reload_history();
                }
            }
            ui.add_space(4.0);
        }
    }

    fn ui_calculator(&mut self, ui: &mut egui::Ui) {
        heading_with_tip(
            ui,
            "Effective shear modulus",
            "One torque/angle reading. Past the elastic limit the modulus decays linearly to zero at the failure angle.",
        );
        ui.add_space(8.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("calc_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    label_with_tip(ui, "Material", "Selects k, elastic limit and failure angle");
                    material_combo(ui, "calc_material", &mut self.calc_input.material);
                    ui.end_row();
                    label_with_tip(ui, "Length L [mm]", "Gauge length");
                    ui.add(egui::DragValue::new(&mut self.calc_input.length_mm).speed(1.0).clamp_range(0.0..=f64::MAX));
                    ui.end_row();
                    label_with_tip(ui, "Diameter D [mm]", "Specimen diameter");
                    ui.add(egui::DragValue::new(&mut self.calc_input.diameter_mm).speed(0.1).clamp_range(0.0..=f64::MAX));
                    ui.end_row();
                    label_with_tip(ui, "Torque T [N·mm]", "Applied twisting moment");
                    ui.add(egui::DragValue::new(&mut self.calc_input.torque_n_mm).speed(100.0).clamp_range(0.0..=f64::MAX));
                    ui.end_row();
                    label_with_tip(ui, "Angle θ [°]", "Twist between the gauge marks");
                    ui.add(egui::DragValue::new(&mut self.calc_input.angle_deg).speed(0.1).clamp_range(0.0..=360.0));
                    ui.end_row();
                });
            ui.horizontal(|ui| {
                if ui.button("Calculate").clicked() {
                    self.run_calculator();
                }
                egui::ComboBox::from_id_source("calc_example")
                    .selected_text("Load example")
                    .show_ui(ui, |ui| {
                        for ex in presets::calculations() {
                            if ui.selectable_label(false, ex.title).clicked() {
                                self.calc_input = SinglePointInput {
                                    material: ex.material,
                                    length_mm: ex.length_mm,
                                    diameter_mm: ex.diameter_mm,
                                    torque_n_mm: ex.torque_n_mm,
                                    angle_deg: ex.angle_deg,
                                };
                                self.calc_outcome = None;
                            }
                        }
                    });
            });
        });
        if let Some(status) = &self.calc_status {
            ui.label(status);
        }
        let Some(outcome) = self.calc_outcome.clone() else {
            return;
        };
        ui.add_space(8.0);
        for warning in &outcome.warnings {
            ui.colored_label(egui::Color32::from_rgb(200, 120, 0), warning);
        }
        egui::Grid::new("calc_result").num_columns(2).show(ui, |ui| {
            ui.strong("Regime");
            ui.label(outcome.regime.label());
            ui.end_row();
            ui.strong("G_eff");
            ui.label(or_na(outcome.effective_modulus, |g| format!("{g:.2} MPa")));
            ui.end_row();
            ui.strong("τmax");
            ui.label(or_na(outcome.max_shear_stress, |t| format!("{t:.2} MPa")));
            ui.end_row();
            ui.strong("γ");
            ui.label(format!("{:.5}", outcome.relative_shear));
            ui.end_row();
        });
        let profile = material_db::profile_for(self.calc_input.material);
        let curve = torsion::modulus_curve(
            self.calc_input.torque_n_mm,
            self.calc_input.length_mm,
            self.calc_input.diameter_mm,
            profile,
            profile.failure_angle_deg * 1.1,
            120,
        );
        let mut series = vec![PlotSeries {
            points: curve.iter().map(|&(a, g)| [a, g]).collect(),
            color: egui::Color32::from_rgb(0, 128, 128),
            markers: false,
            label: "G_eff(θ)".into(),
        }];
        if let Some(g) = outcome.effective_modulus {
            series.push(PlotSeries {
                points: vec![[outcome.effective_angle_deg, g]],
                color: egui::Color32::RED,
                markers: true,
                label: "reading".into(),
            });
        }
        ui.add_space(8.0);
        draw_plot(ui, "θ [°]", "G_eff [MPa]", &series);
    }

    fn run_calculator(&mut self) {
        if let Err(e) = self.calc_input.validate() {
            self.calc_status = Some(e);
            self.calc_outcome = None;
            return;
        }
        let outcome = self.calc_input.evaluate();
        self.calc_status = match self.history.append(self.calc_input.to_record(&outcome)) {
            Ok(r) => Some(format!("Saved to history as #{}", r.id)),
            Err(e) => Some(format!("History error: {e}")),
        };
        self.report_text = report::render_single_point(&self.calc_input, &outcome);
        self.calc_outcome = Some(outcome);
    }

    fn ui_experiment(&mut self, ui: &mut egui::Ui) {
        heading_with_tip(
            ui,
            "Torsion experiment",
            "Generate a synthetic T–φ diagram or enter readings, then reduce them to G, τmax and γmax.",
        );
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.exp_source, ExperimentSource::Synthetic, "Synthetic");
            ui.selectable_value(&mut self.exp_source, ExperimentSource::Manual, "Readings");
        });
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("exp_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Material");
                    material_combo(ui, "exp_material", &mut self.exp_material);
                    ui.end_row();
                    ui.label("Diameter D [mm]");
                    ui.add(egui::DragValue::new(&mut self.exp_diameter_mm).speed(0.1).clamp_range(0.0..=f64::MAX));
                    ui.end_row();
                    ui.label("Length L [mm]");
                    ui.add(egui::DragValue::new(&mut self.exp_length_mm).speed(1.0).clamp_range(0.0..=f64::MAX));
                    ui.end_row();
                    label_with_tip(ui, "Quick linear region", "Fit over the first third of the points instead of 70 %");
                    ui.checkbox(&mut self.exp_quick_region, "");
                    ui.end_row();
                    if self.exp_source == ExperimentSource::Synthetic {
                        ui.label("Maximum torque [N·m]");
                        ui.add(egui::DragValue::new(&mut self.exp_max_torque).speed(1.0).clamp_range(0.0..=f64::MAX));
                        ui.end_row();
                        ui.label("Points");
                        ui.add(egui::DragValue::new(&mut self.exp_points).clamp_range(3..=1000));
                        ui.end_row();
                        label_with_tip(ui, "Noise", "Perturb the modulus and scatter the angles");
                        ui.checkbox(&mut self.exp_noise, "");
                        ui.end_row();
                        ui.label("Error [%]");
                        ui.add_enabled(
                            self.exp_noise,
                            egui::DragValue::new(&mut self.exp_error_percent).speed(0.1).clamp_range(0.0..=50.0),
                        );
                        ui.end_row();
                        label_with_tip(ui, "Seed", "Leave empty for a random run");
                        ui.text_edit_singleline(&mut self.exp_seed_text);
                        ui.end_row();
                    }
                });
            if self.exp_source == ExperimentSource::Manual {
                ui.label("Readings: one `torque [N·mm], angle [°]` pair per line");
                ui.add(
                    egui::TextEdit::multiline(&mut self.exp_readings_text)
                        .desired_rows(8)
                        .code_editor(),
                );
                ui.horizontal(|ui| {
                    if ui.button("Load CSV…").clicked() {
                        if let Some(path) = FileDialog::new().add_filter("CSV", &["csv", "txt"]).pick_file() {
                            match fs::read_to_string(&path) {
                                Ok(text) => self.exp_readings_text = text,
                                Err(e) => self.exp_status = Some(format!("Read error: {e}")),
                            }
                        }
                    }
                    egui::ComboBox::from_id_source("exp_example")
                        .selected_text("Load example")
                        .show_ui(ui, |ui| {
                            for ex in presets::experiments() {
                                if ui.selectable_label(false, ex.title).clicked() {
                                    self.exp_material = ex.material;
                                    self.exp_diameter_mm = ex.diameter_mm;
                                    self.exp_length_mm = ex.length_mm;
                                    self.exp_readings_text = readings_text(ex.readings);
                                }
                            }
                        });
                });
            }
            if ui.button("Run").clicked() {
                self.run_experiment();
            }
        });
        if let Some(status) = &self.exp_status {
            ui.label(status);
        }
        let (Some(specimen), Some(result)) = (self.exp_specimen, self.exp_result.clone()) else {
            return;
        };
        ui.add_space(8.0);
        result_grid(ui, &result, &self.config.display_units.stress);
        ui.add_space(8.0);
        draw_plot(ui, "φ [rad]", "T [N·m]", &diagram_series(&specimen, &result));
    }

    fn run_experiment(&mut self) {
        let specimen = lab::specimen_from_mm(self.exp_material, self.exp_diameter_mm, self.exp_length_mm);
        let reducer = if self.exp_quick_region {
            ReducerSettings::QUICK
        } else {
            self.config.reducer_settings()
        };
        let outcome = match self.exp_source {
            ExperimentSource::Synthetic => {
                let mut settings = self.config.synthetic_settings();
                settings.target_max_torque = self.exp_max_torque;
                settings.point_count = self.exp_points;
                settings.noise = self.exp_noise.then_some(NoiseSettings {
                    error_percent: self.exp_error_percent,
                });
                let mut rng = match self.exp_seed_text.trim().parse::<u64>() {
                    Ok(seed) => StdRng::seed_from_u64(seed),
                    Err(_) => StdRng::from_entropy(),
                };
                lab::run_synthetic(specimen, &settings, &reducer, &mut rng)
                    .map(|outcome: ExperimentOutcome| {
                        let status = format!(
                            "{} points generated, G used {:.1} MPa",
                            outcome.experiment.series.len(),
                            outcome.experiment.modulus_used / 1.0e6
                        );
                        (status, outcome.result)
                    })
                    .map_err(|e| e.to_string())
            }
            ExperimentSource::Manual => ui_cli::parse_readings(&self.exp_readings_text)
                .map_err(|e| e.to_string())
                .and_then(|(torques, angles)| {
                    lab::analyze_readings(
                        specimen,
                        &torques,
                        &angles,
                        TorqueUnit::NewtonMillimeter,
                        AngleUnit::Degree,
                        &reducer,
                    )
                    .map_err(|e| e.to_string())
                })
                .map(|result| (format!("{} readings reduced", result.series.len()), result)),
        };
        match outcome {
            Ok((status, result)) => {
                let options = ReportOptions {
                    author: non_empty(&self.report_author),
                    group: non_empty(&self.report_group),
                    units: self.config.display_units.clone(),
                    ..ReportOptions::default()
                };
                self.report_text = report::render_characterization(&specimen, &result, &options);
                self.exp_status = Some(if result.is_empty() {
                    "The readings or the geometry were rejected.".to_string()
                } else {
                    status
                });
                self.exp_specimen = Some(specimen);
                self.exp_result = Some(result);
            }
            Err(e) => {
                self.exp_status = Some(e);
                self.exp_result = None;
            }
        }
    }

    fn ui_stress(&mut self, ui: &mut egui::Ui) {
        heading_with_tip(ui, "Shear stress distribution", "τ(ρ) = T·ρ/Jp, zero on the axis and maximal at the surface");
        ui.add_space(8.0);
        egui::Grid::new("stress_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Torque T [N·m]");
                ui.add(egui::DragValue::new(&mut self.stress_torque).speed(1.0).clamp_range(0.0..=f64::MAX));
                ui.end_row();
                ui.label("Diameter D [mm]");
                ui.add(egui::DragValue::new(&mut self.stress_diameter_mm).speed(0.1).clamp_range(0.0..=f64::MAX));
                ui.end_row();
            });
        if ui.button("Compute").clicked() {
            let d = self.stress_diameter_mm / 1000.0;
            self.stress_samples = torsion::shear_stress_distribution(self.stress_torque, d, 50);
        }
        if self.stress_samples.is_empty() {
            return;
        }
        let unit = self.config.display_units.stress;
        let points = self
            .stress_samples
            .iter()
            .map(|s| [s.radius * 1000.0, from_pascal(s.shear_stress, unit)])
            .collect();
        ui.add_space(8.0);
        draw_plot(
            ui,
            "ρ [mm]",
            &format!("τ [{}]", unit.symbol()),
            &[PlotSeries {
                points,
                color: egui::Color32::from_rgb(180, 60, 60),
                markers: false,
                label: "τ(ρ)".into(),
            }],
        );
    }

    fn reload_history(&mut self) {
        match self.history.load_all() {
            Ok(records) => {
                self.history_records = records;
                self.history_status = None;
            }
            Err(e) => self.history_status = Some(format!("History error: {e}")),
        }
    }

    fn ui_history(&mut self, ui: &mut egui::Ui) {
        heading_with_tip(ui, "History", &format!("Stored in {}", self.history.path().display()));
        ui.horizontal(|ui| {
            if ui.button("Refresh").clicked() {
                self.reload_history();
            }
            if ui.button("Clear").clicked() {
                match self.history.clear() {
                    Ok(()) => self.history_records.clear(),
                    Err(e) => self.history_status = Some(format!("History error: {e}")),
                }
            }
        });
        if let Some(status) = &self.history_status {
            ui.label(status);
        }
        ui.add_space(8.0);
        egui::Grid::new("history_grid")
            .num_columns(8)
            .striped(true)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for h in ["#", "Time", "Material", "L [mm]", "D [mm]", "T [N·mm]", "θ [°]", "G_eff [MPa]"] {
                    ui.strong(h);
                }
                ui.end_row();
                for r in &self.history_records {
                    ui.label(r.id.to_string());
                    ui.label(r.timestamp.format("%Y-%m-%d %H:%M").to_string());
                    ui.label(r.material.name());
                    ui.label(format!("{}", r.length));
                    ui.label(format!("{}", r.diameter));
                    ui.label(format!("{}", r.torque));
                    ui.label(format!("{}", r.angle));
                    ui.label(or_na(r.effective_modulus, |g| format!("{g:.2}")));
                    ui.end_row();
                }
            });
    }

    fn ui_report(&mut self, ui: &mut egui::Ui) {
        heading_with_tip(ui, "Lab report", "Markdown report of the last calculation or experiment");
        egui::Grid::new("report_grid").num_columns(2).show(ui, |ui| {
            ui.label("Performed by");
            ui.text_edit_singleline(&mut self.report_author);
            ui.end_row();
            ui.label("Group");
            ui.text_edit_singleline(&mut self.report_group);
            ui.end_row();
        });
        ui.horizontal(|ui| {
            if ui.button("Rebuild from experiment").clicked() {
                if let (Some(specimen), Some(result)) = (self.exp_specimen, &self.exp_result) {
                    let options = ReportOptions {
                        author: non_empty(&self.report_author),
                        group: non_empty(&self.report_group),
                        units: self.config.display_units.clone(),
                        ..ReportOptions::default()
                    };
                    self.report_text = report::render_characterization(&specimen, result, &options);
                } else {
                    self.report_status = Some("Run an experiment first.".into());
                }
            }
            if ui.button("Save…").clicked() {
                self.save_report();
            }
        });
        if let Some(status) = &self.report_status {
            ui.label(status);
        }
        if self.report_text.is_empty() {
            ui.label("Nothing to report yet.");
            return;
        }
        ui.add(
            egui::TextEdit::multiline(&mut self.report_text)
                .desired_rows(24)
                .desired_width(f32::INFINITY)
                .code_editor(),
        );
    }

    fn save_report(&mut self) {
        let _ = fs::create_dir_all(&self.config.report_dir);
        let Some(path) = FileDialog::new()
            .set_directory(&self.config.report_dir)
            .set_file_name("torsion_report.md")
            .add_filter("Markdown", &["md"])
            .save_file()
        else {
            return;
        };
        self.report_status = Some(match report::save(&path, &self.report_text) {
            Ok(()) => format!("Saved to {}", path.display()),
            Err(e) => format!("Save error: {e}"),
        });
    }

    fn ui_unit_conv(&mut self, ui: &mut egui::Ui) {
        heading_with_tip(ui, "Unit converter", "Convert lab units, e.g. N·mm to N·m or MPa to GPa");
        ui.add_space(8.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("conv_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Quantity");
                    let before = self.conv_kind;
                    egui::ComboBox::from_id_source("conv_kind")
                        .selected_text(self.conv_kind.label())
                        .show_ui(ui, |ui| {
                            for kind in [
                                QuantityKind::Length,
                                QuantityKind::Torque,
                                QuantityKind::Angle,
                                QuantityKind::Stress,
                            ] {
                                ui.selectable_value(&mut self.conv_kind, kind, kind.label());
                            }
                        });
                    if before != self.conv_kind {
                        let (from, to) = default_units_for_kind(self.conv_kind);
                        self.conv_from = from;
                        self.conv_to = to;
                        self.conv_result = None;
                    }
                    ui.end_row();
                    ui.label("Value");
                    ui.add(egui::DragValue::new(&mut self.conv_value).speed(0.1));
                    ui.end_row();
                    ui.label("From");
                    unit_combo(ui, "conv_from", self.conv_kind, &mut self.conv_from);
                    ui.end_row();
                    ui.label("To");
                    unit_combo(ui, "conv_to", self.conv_kind, &mut self.conv_to);
                    ui.end_row();
                });
            if ui.button("Convert").clicked() {
                self.conv_result = Some(
                    match conversion::convert(self.conv_kind, self.conv_value, &self.conv_from, &self.conv_to) {
                        Ok(v) => format!("{v} {}", self.conv_to),
                        Err(e) => e.to_string(),
                    },
                );
            }
        });
        if let Some(r) = &self.conv_result {
            ui.strong(r);
        }
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings_modal;
        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Default material");
                material_combo(ui, "settings_material", &mut self.config.default_material);
                ui.separator();
                ui.label("Stress / modulus unit");
                egui::ComboBox::from_id_source("settings_stress")
                    .selected_text(self.config.display_units.stress.symbol())
                    .show_ui(ui, |ui| {
                        for unit in [
                            StressUnit::Pascal,
                            StressUnit::KiloPascal,
                            StressUnit::MegaPascal,
                            StressUnit::GigaPascal,
                            StressUnit::Psi,
                        ] {
                            ui.selectable_value(&mut self.config.display_units.stress, unit, unit.symbol());
                        }
                    });
                ui.separator();
                ui.label("Linear region fraction");
                ui.add(egui::Slider::new(&mut self.config.reducer.linear_fraction, 0.2..=1.0));
                ui.separator();
                if ui.button("Save settings").clicked() {
                    self.settings_status = Some(match self.config.save() {
                        Ok(()) => "Saved.".to_string(),
                        Err(e) => format!("Save error: {e}"),
                    });
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg);
                }
            });
        self.show_settings_modal = open;
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Torsion Lab");
                ui.label(" | shear modulus in torsion");
                ui.separator();
                if ui.button("Settings").clicked() {
                    self.show_settings_modal = true;
                }
            });
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        egui::SidePanel::left("nav")
            .resizable(true)
            .min_width(140.0)
            .default_width(200.0)
            .max_width(400.0)
            .show(ctx, |ui| {
                self.ui_nav(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.tab {
                    Tab::Calculator => self.ui_calculator(ui),
                    Tab::Experiment => self.ui_experiment(ui),
                    Tab::Stress => self.ui_stress(ui),
                    Tab::History => self.ui_history(ui),
                    Tab::Report => self.ui_report(ui),
                    Tab::UnitConv => self.ui_unit_conv(ui),
                });
        });
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn readings_text(readings: &[(f64, f64)]) -> String {
    readings
        .iter()
        .map(|(t, a)| format!("{t}, {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn material_combo(ui: &mut egui::Ui, id: &str, material: &mut Material) {
    egui::ComboBox::from_id_source(id)
        .selected_text(material.name())
        .show_ui(ui, |ui| {
            for m in Material::ALL {
                ui.selectable_value(material, m, m.name());
            }
        });
}

fn unit_options(kind: QuantityKind) -> &'static [&'static str] {
    match kind {
        QuantityKind::Length => &["m", "mm", "cm", "in"],
        QuantityKind::Torque => &["N*m", "N*mm", "kN*m", "lbf*in"],
        QuantityKind::Angle => &["rad", "deg"],
        QuantityKind::Stress => &["Pa", "kPa", "MPa", "GPa", "psi"],
    }
}

fn default_units_for_kind(kind: QuantityKind) -> (String, String) {
    let opts = unit_options(kind);
    (opts[0].to_string(), opts[1].to_string())
}

fn unit_combo(ui: &mut egui::Ui, id: &str, kind: QuantityKind, unit: &mut String) {
    egui::ComboBox::from_id_source(id)
        .selected_text(unit.as_str())
        .show_ui(ui, |ui| {
            for u in unit_options(kind) {
                ui.selectable_value(unit, u.to_string(), *u);
            }
        });
}

fn result_grid(ui: &mut egui::Ui, result: &CharacterizationResult, unit: &StressUnit) {
    let unit = *unit;
    let stress = move |v: f64| format!("{:.2} {}", from_pascal(v, unit), unit.symbol());
    egui::Grid::new("exp_result")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            let rows = [
                ("G experimental", or_na(result.shear_modulus, stress)),
                ("G reference", or_na(result.reference_modulus, stress)),
                ("Relative error", or_na(result.relative_error_percent, |v| format!("{v:.2} %"))),
                ("Tmax", or_na(result.max_torque, |v| format!("{v:.3} N·m"))),
                ("φ at Tmax", or_na(result.angle_at_max_torque, |v| format!("{v:.4} rad"))),
                ("τmax", or_na(result.max_shear_stress, stress)),
                ("γmax", or_na(result.max_residual_shear, |v| format!("{v:.5}"))),
                ("Proportionality limit", or_na(result.proportionality_limit, stress)),
                ("Yield limit (0.3 %)", or_na(result.yield_limit, stress)),
            ];
            for (name, value) in rows {
                ui.strong(name);
                ui.label(value);
                ui.end_row();
            }
        });
}

/// Measured points plus the reference line `T = G·Jp·φ/L` over the same span.
fn diagram_series(specimen: &Specimen, result: &CharacterizationResult) -> Vec<PlotSeries> {
    let measured: Vec<[f64; 2]> = result
        .series
        .points()
        .iter()
        .map(|p| [p.angle, p.torque])
        .collect();
    let mut series = vec![PlotSeries {
        points: measured.clone(),
        color: egui::Color32::from_rgb(0, 128, 128),
        markers: true,
        label: "experiment".into(),
    }];
    let phi_end = measured.iter().map(|p| p[0]).fold(0.0, f64::max);
    let g_ref = material_db::profile_for(specimen.material).reference_shear_modulus;
    let jp = specimen.polar_moment();
    let theory: Vec<[f64; 2]> = [0.0, phi_end]
        .iter()
        .filter_map(|&phi| torsion::theoretical_torque(g_ref, jp, specimen.length, phi).map(|t| [phi, t]))
        .collect();
    if theory.len() == 2 {
        series.push(PlotSeries {
            points: theory,
            color: egui::Color32::GRAY,
            markers: false,
            label: "theory".into(),
        });
    }
    series
}

/// Data bounds with a little headroom; `None` when there is nothing to draw.
fn plot_bounds(series: &[PlotSeries]) -> Option<([f64; 2], [f64; 2])> {
    let mut pts = series.iter().flat_map(|s| s.points.iter()).filter(|p| p[0].is_finite() && p[1].is_finite());
    let first = pts.next()?;
    let (mut x0, mut x1, mut y0, mut y1) = (first[0], first[0], first[1], first[1]);
    for p in pts {
        x0 = x0.min(p[0]);
        x1 = x1.max(p[0]);
        y0 = y0.min(p[1]);
        y1 = y1.max(p[1]);
    }
    x0 = x0.min(0.0);
    y0 = y0.min(0.0);
    if x1 <= x0 {
        x1 = x0 + 1.0;
    }
    if y1 <= y0 {
        y1 = y0 + 1.0;
    }
    Some(([x0, x1 * 1.05], [y0, y1 * 1.05]))
}

fn draw_plot(ui: &mut egui::Ui, x_label: &str, y_label: &str, series: &[PlotSeries]) {
    let Some(([x0, x1], [y0, y1])) = plot_bounds(series) else {
        return;
    };
    let width = ui.available_width().min(760.0);
    let (response, painter) = ui.allocate_painter(egui::vec2(width, 320.0), egui::Sense::hover());
    let outer = response.rect;
    let rect = egui::Rect::from_min_max(
        outer.min + egui::vec2(60.0, 10.0),
        outer.max - egui::vec2(10.0, 30.0),
    );
    let visuals = ui.visuals();
    let axis = egui::Stroke::new(1.0, visuals.text_color());
    let grid = egui::Stroke::new(0.5, visuals.weak_text_color());
    let font = egui::FontId::proportional(11.0);
    let to_screen = |x: f64, y: f64| {
        egui::pos2(
            rect.left() + ((x - x0) / (x1 - x0)) as f32 * rect.width(),
            rect.bottom() - ((y - y0) / (y1 - y0)) as f32 * rect.height(),
        )
    };

    for i in 0..=5 {
        let fx = x0 + (x1 - x0) * i as f64 / 5.0;
        let fy = y0 + (y1 - y0) * i as f64 / 5.0;
        let px = to_screen(fx, y0);
        let py = to_screen(x0, fy);
        painter.line_segment([px, egui::pos2(px.x, rect.top())], grid);
        painter.line_segment([py, egui::pos2(rect.right(), py.y)], grid);
        painter.text(px + egui::vec2(0.0, 4.0), egui::Align2::CENTER_TOP, format!("{fx:.3}"), font.clone(), visuals.text_color());
        painter.text(py - egui::vec2(4.0, 0.0), egui::Align2::RIGHT_CENTER, format!("{fy:.3e}"), font.clone(), visuals.text_color());
    }
    painter.rect_stroke(rect, 0.0, axis);
    painter.text(egui::pos2(rect.center().x, outer.bottom()), egui::Align2::CENTER_BOTTOM, x_label, font.clone(), visuals.text_color());
    painter.text(rect.left_top() + egui::vec2(4.0, 2.0), egui::Align2::LEFT_TOP, y_label, font.clone(), visuals.text_color());

    for (idx, s) in series.iter().enumerate() {
        let pts: Vec<egui::Pos2> = s.points.iter().map(|p| to_screen(p[0], p[1])).collect();
        if pts.len() > 1 {
            painter.add(egui::Shape::line(pts.clone(), egui::Stroke::new(1.5, s.color)));
        }
        if s.markers {
            for p in &pts {
                painter.circle_filled(*p, 2.5, s.color);
            }
        }
        painter.text(
            rect.right_top() + egui::vec2(-6.0, 4.0 + 14.0 * idx as f32),
            egui::Align2::RIGHT_TOP,
            &s.label,
            font.clone(),
            s.color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_first_handout_example() {
        let app = GuiApp::new(config::Config::default());
        assert_eq!(app.calc_input.material, Material::Steel);
        assert_eq!(app.calc_input.torque_n_mm, 140_000.0);
        assert_eq!(app.tab, Tab::Calculator);
    }

    #[test]
    fn example_readings_round_trip_through_text() {
        let text = readings_text(presets::experiments()[1].readings);
        let (t, a) = ui_cli::parse_readings(&text).unwrap();
        assert_eq!(t.len(), 8);
        assert_eq!(a[7], 3.8);
    }

    #[test]
    fn unit_options_are_all_parseable() {
        for kind in [QuantityKind::Length, QuantityKind::Torque, QuantityKind::Angle, QuantityKind::Stress] {
            let (from, to) = default_units_for_kind(kind);
            assert!(conversion::convert(kind, 1.0, &from, &to).is_ok());
            for u in unit_options(kind) {
                assert!(conversion::convert(kind, 1.0, u, u).is_ok(), "{u}");
            }
        }
    }

    #[test]
    fn plot_bounds_include_origin() {
        let s = PlotSeries {
            points: vec![[1.0, 2.0], [3.0, 4.0]],
            color: egui::Color32::RED,
            markers: false,
            label: String::new(),
        };
        let ([x0, x1], [y0, y1]) = plot_bounds(&[s]).unwrap();
        assert_eq!((x0, y0), (0.0, 0.0));
        assert!(x1 > 3.0 && y1 > 4.0);
        assert!(plot_bounds(&[]).is_none());
    }

    #[test]
    fn diagram_has_theory_line() {
        let specimen = lab::specimen_from_mm(Material::Steel, 10.0, 100.0);
        let exp = torsion::generate_ideal(
            material_db::profile_for(Material::Steel),
            specimen.polar_moment(),
            specimen.length,
            100.0,
            20,
        )
        .unwrap();
        let result = torsion::reduce_experiment(
            &exp.series,
            specimen.length,
            specimen.diameter,
            None,
            &ReducerSettings::STANDARD,
        );
        let series = diagram_series(&specimen, &result);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].points[0], [0.0, 0.0]);
    }
}
